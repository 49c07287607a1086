//! Render scenes with the animation renderer.

use std::path::PathBuf;

use scenecast_common::config::AppConfig;
use scenecast_render_engine::render::{render_all, RenderJob};
use scenecast_render_engine::runner::ToolRunner;
use scenecast_scene_model::{select_scenes, MediaLayout, Quality};

pub fn run(
    config: &AppConfig,
    runner: &dyn ToolRunner,
    quality: String,
    scenes: Vec<String>,
    scene_file: Option<PathBuf>,
) -> anyhow::Result<()> {
    let quality = Quality::parse(&quality);
    let job = RenderJob {
        renderer: config.tools.renderer.clone(),
        quality,
        scene_file: scene_file.unwrap_or_else(|| config.scene_file.clone()),
        scenes: select_scenes(&scenes)?,
    };

    println!("Rendering {} scene(s) at quality {}", job.scenes.len(), job.quality);
    println!("  Scene file: {}", job.scene_file.display());
    println!();

    let summary = render_all(runner, &job)?;

    println!();
    println!(
        "Rendered {} scene(s) in {:.1}s",
        summary.rendered.len(),
        summary.elapsed_secs
    );
    if let Some(token) = summary.quality.resolution_token() {
        let layout: MediaLayout = config.media.clone().into();
        println!("  Output: {}", layout.quality_dir(&token).display());
    }
    Ok(())
}
