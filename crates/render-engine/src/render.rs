//! Per-scene rendering through the external animation renderer.

use std::path::PathBuf;

use scenecast_common::error::{ScenecastError, ScenecastResult};
use scenecast_scene_model::{Quality, Scene, SCENES};

use crate::runner::{ToolInvocation, ToolRunner};

/// A render run: one renderer invocation per scene.
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// Renderer binary.
    pub renderer: String,

    pub quality: Quality,

    /// Scene-description source file.
    pub scene_file: PathBuf,

    /// Scenes to render, in video order.
    pub scenes: Vec<Scene>,
}

impl RenderJob {
    /// Render every scene of `scene_file` at `quality`.
    pub fn all(renderer: impl Into<String>, quality: Quality, scene_file: PathBuf) -> Self {
        Self {
            renderer: renderer.into(),
            quality,
            scene_file,
            scenes: SCENES.to_vec(),
        }
    }

    /// The invocation for one scene: `<renderer> -q<quality> <scene_file> <scene>`.
    pub fn invocation(&self, scene: &Scene) -> ToolInvocation {
        ToolInvocation::new(&self.renderer)
            .arg(self.quality.flag())
            .arg(&self.scene_file)
            .arg(scene.name)
    }
}

/// Outcome of a successful render run.
#[derive(Debug, Clone)]
pub struct RenderSummary {
    pub quality: Quality,
    pub rendered: Vec<&'static str>,
    pub elapsed_secs: f64,
}

/// Render the job's scenes one after another.
///
/// Stops at the first scene whose renderer invocation fails and returns
/// [`ScenecastError::RenderFailed`] for it; later scenes are not started.
pub fn render_all(runner: &dyn ToolRunner, job: &RenderJob) -> ScenecastResult<RenderSummary> {
    if job.scenes.is_empty() {
        return Err(ScenecastError::render("no scenes selected"));
    }
    if !runner.is_dry_run() && !job.scene_file.exists() {
        return Err(ScenecastError::FileNotFound {
            path: job.scene_file.clone(),
        });
    }

    tracing::info!(
        quality = %job.quality,
        scene_file = %job.scene_file.display(),
        scenes = job.scenes.len(),
        "Starting render"
    );

    let started = std::time::Instant::now();
    let mut rendered = Vec::with_capacity(job.scenes.len());
    for (index, scene) in job.scenes.iter().enumerate() {
        tracing::info!(
            scene = scene.name,
            step = index + 1,
            of = job.scenes.len(),
            "Rendering scene"
        );

        let output = runner.run(&job.invocation(scene))?;
        if !output.success {
            tracing::error!(scene = scene.name, status = %output.status, "Render failed");
            return Err(ScenecastError::RenderFailed {
                scene: scene.name.to_string(),
                status: output.status,
            });
        }
        rendered.push(scene.name);
    }

    let elapsed_secs = started.elapsed().as_secs_f64();
    tracing::info!(
        rendered = rendered.len(),
        elapsed_secs,
        "Render finished"
    );

    Ok(RenderSummary {
        quality: job.quality.clone(),
        rendered,
        elapsed_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::{failed, RecordingRunner};
    use crate::runner::ToolOutput;
    use scenecast_scene_model::select_scenes;

    fn job(quality: Quality) -> (tempfile::TempDir, RenderJob) {
        let dir = tempfile::tempdir().unwrap();
        let scene_file = dir.path().join("manim_flow_maps.py");
        std::fs::write(&scene_file, "# scenes\n").unwrap();
        (dir, RenderJob::all("manim", quality, scene_file))
    }

    #[test]
    fn test_renders_every_scene_in_order_for_each_quality() {
        for token in ["l", "m", "h", "k"] {
            let (_dir, job) = job(Quality::parse(token));
            let runner = RecordingRunner::succeeding();

            let summary = render_all(&runner, &job).unwrap();

            let calls = runner.calls();
            assert_eq!(calls.len(), 8);
            for (call, scene) in calls.iter().zip(SCENES.iter()) {
                assert_eq!(call.program, "manim");
                let args = call.arg_strings();
                assert_eq!(args[0], format!("-q{token}"));
                assert_eq!(args[1], job.scene_file.to_string_lossy());
                assert_eq!(args[2], scene.name);
            }
            assert_eq!(summary.rendered.len(), 8);
        }
    }

    #[test]
    fn test_default_quality_matches_high() {
        let (_dir, default_job) = job(Quality::default());
        let (_dir2, mut high_job) = job(Quality::parse("h"));
        high_job.scene_file = default_job.scene_file.clone();

        let a = RecordingRunner::succeeding();
        let b = RecordingRunner::succeeding();
        render_all(&a, &default_job).unwrap();
        render_all(&b, &high_job).unwrap();
        assert_eq!(a.calls(), b.calls());
    }

    #[test]
    fn test_stops_at_first_failure() {
        let (_dir, job) = job(Quality::High);
        let runner = RecordingRunner::with(|inv| {
            if inv.arg_strings().last().map(String::as_str) == Some("Part3_TangentCondition") {
                Ok(failed("exit status: 1", "LaTeX error"))
            } else {
                Ok(ToolOutput::ok())
            }
        });

        let err = render_all(&runner, &job).unwrap_err();
        match err {
            ScenecastError::RenderFailed { scene, .. } => {
                assert_eq!(scene, "Part3_TangentCondition")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(runner.calls().len(), 4);
    }

    #[test]
    fn test_spawn_error_propagates() {
        let (_dir, job) = job(Quality::High);
        let runner =
            RecordingRunner::with(|inv| Err(ScenecastError::tool_unavailable(inv.program.clone())));
        let err = render_all(&runner, &job).unwrap_err();
        assert!(matches!(err, ScenecastError::ToolUnavailable { .. }));
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_missing_scene_file_fails_before_running() {
        let job = RenderJob::all("manim", Quality::High, PathBuf::from("/nonexistent/scenes.py"));
        let runner = RecordingRunner::succeeding();
        let err = render_all(&runner, &job).unwrap_err();
        assert!(matches!(err, ScenecastError::FileNotFound { .. }));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_subset_renders_selected_scenes_only() {
        let (_dir, mut job) = job(Quality::Low);
        job.scenes = select_scenes(&["Part7_MethodComparison", "Part0_Introduction"]).unwrap();
        let runner = RecordingRunner::succeeding();

        let summary = render_all(&runner, &job).unwrap();
        assert_eq!(
            summary.rendered,
            vec!["Part0_Introduction", "Part7_MethodComparison"]
        );
    }
}
