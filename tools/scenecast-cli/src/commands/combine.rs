//! Combine rendered scenes into one video.

use std::path::PathBuf;

use scenecast_common::config::AppConfig;
use scenecast_render_engine::combine::{combine, CombineJob};
use scenecast_render_engine::runner::ToolRunner;
use scenecast_scene_model::ResolutionToken;

pub fn run(
    config: &AppConfig,
    runner: &dyn ToolRunner,
    token: ResolutionToken,
    output: Option<PathBuf>,
    report: bool,
) -> anyhow::Result<()> {
    let mut job = CombineJob::from_config(config, token);
    if let Some(output) = output {
        job.output_path = output;
    }
    job.write_report = report;

    println!("Combining scenes from {}", job.layout.quality_dir(&job.token).display());
    println!("  Output: {}", job.output_path.display());

    let summary = combine(runner, &job)?;

    println!();
    println!("Combined {} scene(s): {}", summary.inputs.len(), summary.output_path.display());
    if let Some(secs) = summary.output_duration_secs {
        println!("  Duration: {secs:.2}s");
    }
    if let Some(path) = summary.report_path {
        println!("  Report: {}", path.display());
    }
    Ok(())
}
