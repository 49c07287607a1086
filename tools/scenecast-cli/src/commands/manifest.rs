//! Print the concat manifest.

use scenecast_common::config::AppConfig;
use scenecast_render_engine::combine::CombineJob;
use scenecast_scene_model::ResolutionToken;

pub fn run(config: &AppConfig, token: ResolutionToken) -> anyhow::Result<()> {
    let manifest = CombineJob::from_config(config, token).manifest()?;
    print!("{}", manifest.render());

    let missing = manifest.missing();
    if !missing.is_empty() {
        tracing::warn!(missing = missing.len(), "Manifest lists files that do not exist yet");
    }
    Ok(())
}
