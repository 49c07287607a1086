//! Render-then-combine, plus tool checks.

use scenecast_common::config::AppConfig;
use scenecast_common::error::{ScenecastError, ScenecastResult};
use scenecast_scene_model::{Quality, ResolutionToken};

use crate::combine::{combine, CombineJob, CombineSummary};
use crate::render::{render_all, RenderJob, RenderSummary};
use crate::runner::{tool_responds, ToolRunner};

/// Result of a full build.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub render: RenderSummary,
    pub combine: CombineSummary,
}

/// Render every scene at `quality`, then combine them.
///
/// The combine step reads from the directory the quality renders into; a
/// custom quality needs `token` to say which one that is.
pub fn build(
    runner: &dyn ToolRunner,
    config: &AppConfig,
    quality: Quality,
    token: Option<ResolutionToken>,
    write_report: bool,
) -> ScenecastResult<BuildSummary> {
    let token = match token.or_else(|| quality.resolution_token()) {
        Some(token) => token,
        None => {
            return Err(ScenecastError::invalid_argument(format!(
                "quality {quality:?} has no known output directory; pass a resolution token"
            )))
        }
    };

    let render_job = RenderJob::all(
        config.tools.renderer.clone(),
        quality,
        config.scene_file.clone(),
    );
    let render = render_all(runner, &render_job)?;

    let mut combine_job = CombineJob::from_config(config, token);
    combine_job.write_report = write_report;
    let combine = combine(runner, &combine_job)?;

    Ok(BuildSummary { render, combine })
}

/// Availability of one external tool.
#[derive(Debug, Clone)]
pub struct ToolStatus {
    pub role: &'static str,
    pub program: String,
    pub available: bool,
}

/// Check that the renderer, ffmpeg and ffprobe respond.
pub fn check_tools(runner: &dyn ToolRunner, config: &AppConfig) -> Vec<ToolStatus> {
    [
        ("renderer", config.tools.renderer.as_str(), "--version"),
        ("concat", config.tools.ffmpeg.as_str(), "-version"),
        ("probe", config.tools.ffprobe.as_str(), "-version"),
    ]
    .into_iter()
    .map(|(role, program, version_arg)| ToolStatus {
        role,
        program: program.to_string(),
        available: tool_responds(runner, program, version_arg),
    })
    .collect()
}
