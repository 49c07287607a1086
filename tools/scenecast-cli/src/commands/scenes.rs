//! List scenes in video order.

use scenecast_common::config::AppConfig;
use scenecast_scene_model::{MediaLayout, ResolutionToken, SCENES};

pub fn run(config: &AppConfig, token: ResolutionToken) -> anyhow::Result<()> {
    let layout: MediaLayout = config.media.clone().into();

    println!("Scenes ({}):", SCENES.len());
    for (index, scene) in SCENES.iter().enumerate() {
        let path = layout.scene_video_path(&token, scene);
        let marker = if path.is_file() { "[OK]" } else { "[--]" };
        println!("  {index}. {:<24} {}", scene.name, scene.title);
        println!("     {marker} {}", path.display());
    }
    Ok(())
}
