//! Container metadata via ffprobe.

use std::path::Path;

use scenecast_common::error::{ScenecastError, ScenecastResult};

use crate::runner::{ToolInvocation, ToolRunner};

pub fn duration_invocation(ffprobe: &str, path: &Path) -> ToolInvocation {
    ToolInvocation::new(ffprobe)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .captured()
}

/// Read the container duration of `path` in seconds.
pub fn probe_duration(
    runner: &dyn ToolRunner,
    ffprobe: &str,
    path: &Path,
) -> ScenecastResult<f64> {
    let output = runner
        .run(&duration_invocation(ffprobe, path))?
        .into_result(ffprobe)?;
    parse_duration(&output.stdout).ok_or_else(|| {
        ScenecastError::probe(format!(
            "could not read duration of {} from ffprobe output {:?}",
            path.display(),
            output.stdout.trim()
        ))
    })
}

fn parse_duration(stdout: &str) -> Option<f64> {
    let secs = stdout.lines().next()?.trim().parse::<f64>().ok()?;
    (secs.is_finite() && secs >= 0.0).then_some(secs)
}
