//! Check external tools.

use scenecast_common::config::AppConfig;
use scenecast_render_engine::pipeline::check_tools;
use scenecast_render_engine::runner::ProcessRunner;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("scenecast Tool Check");
    println!("{}", "=".repeat(50));

    let statuses = check_tools(&ProcessRunner, config);
    for status in &statuses {
        let marker = if status.available { "[OK]" } else { "[MISSING]" };
        println!("{marker} {:<9} {}", status.role, status.program);
    }

    if !config.scene_file.is_file() {
        println!("[WARN] Scene file not found: {}", config.scene_file.display());
    }

    println!();
    if statuses.iter().all(|s| s.available) {
        println!("All tools are available. scenecast is ready.");
        Ok(())
    } else {
        anyhow::bail!("some external tools are missing; see above")
    }
}
