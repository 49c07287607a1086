//! Render every scene, then combine them.

use scenecast_common::config::AppConfig;
use scenecast_render_engine::pipeline::build;
use scenecast_render_engine::runner::ToolRunner;
use scenecast_scene_model::{Quality, ResolutionToken};

pub fn run(
    config: &AppConfig,
    runner: &dyn ToolRunner,
    quality: String,
    token: Option<ResolutionToken>,
    report: bool,
) -> anyhow::Result<()> {
    let quality = Quality::parse(&quality);
    println!("Building video at quality {quality}");
    println!();

    let summary = build(runner, config, quality, token, report)?;

    println!();
    println!(
        "Rendered {} scene(s) in {:.1}s",
        summary.render.rendered.len(),
        summary.render.elapsed_secs
    );
    println!("Combined video: {}", summary.combine.output_path.display());
    if let Some(secs) = summary.combine.output_duration_secs {
        println!("  Duration: {secs:.2}s");
    }
    if let Some(path) = summary.combine.report_path {
        println!("  Report: {}", path.display());
    }
    Ok(())
}
