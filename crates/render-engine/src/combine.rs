//! Stream-copy concatenation of the rendered scenes into one video.

use std::path::{Path, PathBuf};

use serde::Serialize;

use scenecast_common::config::AppConfig;
use scenecast_common::error::{ScenecastError, ScenecastResult};
use scenecast_scene_model::{MediaLayout, ResolutionToken};

use crate::manifest::ConcatManifest;
use crate::probe::probe_duration;
use crate::runner::{ToolInvocation, ToolRunner};

/// A combine run.
#[derive(Debug, Clone)]
pub struct CombineJob {
    pub ffmpeg: String,
    pub ffprobe: String,

    /// Resolution directory the inputs were rendered into.
    pub token: ResolutionToken,

    pub layout: MediaLayout,

    /// Combined output file.
    pub output_path: PathBuf,

    /// Where the temporary concat manifest is written.
    pub manifest_dir: PathBuf,

    /// Probe every input and write `<output>.report.json`.
    pub write_report: bool,

    /// Allowed gap between output duration and summed input durations.
    pub duration_tolerance_secs: f64,
}

impl CombineJob {
    pub fn from_config(config: &AppConfig, token: ResolutionToken) -> Self {
        Self {
            ffmpeg: config.tools.ffmpeg.clone(),
            ffprobe: config.tools.ffprobe.clone(),
            token,
            layout: config.media.clone().into(),
            output_path: config.output_path.clone(),
            manifest_dir: std::env::temp_dir(),
            write_report: false,
            duration_tolerance_secs: config.duration_tolerance_secs,
        }
    }

    /// Expected inputs, in video order.
    pub fn manifest(&self) -> ScenecastResult<ConcatManifest> {
        ConcatManifest::new(self.layout.scene_video_paths(&self.token))
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_path.with_extension("report.json")
    }

    fn concat_invocation(&self, manifest_path: &Path) -> ToolInvocation {
        ToolInvocation::new(&self.ffmpeg)
            .args(["-hide_banner", "-loglevel", "error", "-y"])
            .args(["-f", "concat", "-safe", "0", "-i"])
            .arg(manifest_path)
            .args(["-c", "copy", "-fflags", "+bitexact"])
            .arg(&self.output_path)
            .captured()
    }
}

/// Outcome of a successful combine run.
#[derive(Debug, Clone)]
pub struct CombineSummary {
    pub output_path: PathBuf,
    pub inputs: Vec<PathBuf>,

    /// `None` on dry runs or when the probe could not read it.
    pub output_duration_secs: Option<f64>,

    pub report_path: Option<PathBuf>,
}

/// Per-input line of the combine report.
#[derive(Debug, Clone, Serialize)]
pub struct InputReport {
    pub path: PathBuf,
    pub duration_secs: Option<f64>,
}

/// Contents of `<output>.report.json`.
#[derive(Debug, Clone, Serialize)]
pub struct CombineReport {
    pub created_at: String,
    pub token: ResolutionToken,
    pub output: PathBuf,
    pub output_duration_secs: Option<f64>,
    pub inputs: Vec<InputReport>,
    pub input_duration_sum_secs: Option<f64>,
    pub status: &'static str,
}

/// Concatenate the scene videos for `job.token` into `job.output_path`.
///
/// Missing inputs fail the run before ffmpeg is started. On either failure
/// any existing file at the output path is removed, so a stale video from an
/// earlier run is never left looking current. The manifest file is always
/// removed.
///
/// On dry runs the printed ffmpeg command names a manifest that is deleted
/// once this returns; the manifest contents are logged instead.
pub fn combine(runner: &dyn ToolRunner, job: &CombineJob) -> ScenecastResult<CombineSummary> {
    let manifest = job.manifest()?;
    tracing::info!(
        token = %job.token,
        inputs = manifest.entries().len(),
        output = %job.output_path.display(),
        "Starting combine"
    );

    let missing = manifest.missing();
    if !missing.is_empty() {
        if runner.is_dry_run() {
            tracing::warn!(missing = missing.len(), "Inputs missing (dry run, continuing)");
        } else {
            for path in &missing {
                tracing::error!(path = %path.display(), "Expected input is missing");
            }
            remove_partial_output(&job.output_path);
            return Err(ScenecastError::MissingInputs { paths: missing });
        }
    }

    if runner.is_dry_run() {
        tracing::info!(manifest = %manifest.render().trim_end(), "Concat manifest");
    } else if let Some(parent) = job.output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let manifest_file = manifest.write_to(&job.manifest_dir)?;
    let invocation = job.concat_invocation(manifest_file.path());
    let result = runner
        .run(&invocation)
        .and_then(|output| output.into_result(&job.ffmpeg));
    drop(manifest_file);

    if let Err(err) = result {
        remove_partial_output(&job.output_path);
        return Err(err);
    }

    let inputs = manifest.entries().to_vec();
    if runner.is_dry_run() {
        return Ok(CombineSummary {
            output_path: job.output_path.clone(),
            inputs,
            output_duration_secs: None,
            report_path: None,
        });
    }

    let output_duration_secs = match probe_duration(runner, &job.ffprobe, &job.output_path) {
        Ok(secs) => Some(secs),
        Err(err) => {
            tracing::warn!(error = %err, "Could not probe combined duration");
            None
        }
    };
    tracing::info!(
        output = %job.output_path.display(),
        duration_secs = ?output_duration_secs,
        "Combine finished"
    );

    let report_path = if job.write_report {
        let report = build_report(runner, job, &inputs, output_duration_secs);
        let path = job.report_path();
        std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
        tracing::info!(report = %path.display(), status = report.status, "Wrote combine report");
        Some(path)
    } else {
        None
    };

    Ok(CombineSummary {
        output_path: job.output_path.clone(),
        inputs,
        output_duration_secs,
        report_path,
    })
}

fn remove_partial_output(path: &Path) {
    if !path.exists() {
        return;
    }
    match std::fs::remove_file(path) {
        Ok(()) => tracing::warn!(path = %path.display(), "Removed output from failed combine"),
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "Failed to remove partial output")
        }
    }
}

fn build_report(
    runner: &dyn ToolRunner,
    job: &CombineJob,
    inputs: &[PathBuf],
    output_duration_secs: Option<f64>,
) -> CombineReport {
    let inputs: Vec<InputReport> = inputs
        .iter()
        .map(|path| InputReport {
            path: path.clone(),
            duration_secs: probe_duration(runner, &job.ffprobe, path)
                .map_err(|err| {
                    tracing::warn!(error = %err, path = %path.display(), "Could not probe input");
                })
                .ok(),
        })
        .collect();

    let input_duration_sum_secs = inputs
        .iter()
        .map(|i| i.duration_secs)
        .sum::<Option<f64>>();

    let status = match (output_duration_secs, input_duration_sum_secs) {
        (Some(out), Some(sum)) if (out - sum).abs() <= job.duration_tolerance_secs => "ok",
        (Some(out), Some(sum)) => {
            tracing::warn!(
                output_secs = out,
                inputs_secs = sum,
                tolerance_secs = job.duration_tolerance_secs,
                "Combined duration differs from the sum of its inputs"
            );
            "warn"
        }
        _ => "unknown",
    };

    CombineReport {
        created_at: chrono::Utc::now().to_rfc3339(),
        token: job.token.clone(),
        output: job.output_path.clone(),
        output_duration_secs,
        inputs,
        input_duration_sum_secs,
        status,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::manifest::parse_manifest;
    use crate::runner::testing::{failed, RecordingRunner};
    use crate::runner::{DryRunRunner, ToolOutput};
    use scenecast_scene_model::SCENES;

    struct Fixture {
        dir: tempfile::TempDir,
        job: CombineJob,
    }

    fn fixture(token: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let layout = MediaLayout::new(dir.path().join("media/videos"), "manim_flow_maps");
        let job = CombineJob {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            token: ResolutionToken::new(token).unwrap(),
            layout,
            output_path: dir.path().join("static/videos/flow_maps_method.mp4"),
            manifest_dir: dir.path().join("tmp"),
            write_report: false,
            duration_tolerance_secs: 0.5,
        };
        Fixture { dir, job }
    }

    fn write_inputs(job: &CombineJob) {
        for path in job.layout.scene_video_paths(&job.token) {
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, b"scene").unwrap();
        }
    }

    /// Fake ffmpeg/ffprobe: concat copies the manifest into the output file,
    /// probe answers with `probe_secs`.
    fn fake_tools(seen_manifest: Rc<RefCell<String>>, probe_secs: f64) -> RecordingRunner {
        RecordingRunner::with(move |inv| {
            let args = inv.arg_strings();
            if inv.program == "ffmpeg" {
                let manifest_idx = args.iter().position(|a| a == "-i").unwrap() + 1;
                let text = std::fs::read_to_string(&args[manifest_idx]).unwrap();
                std::fs::write(args.last().unwrap(), text.as_bytes()).unwrap();
                *seen_manifest.borrow_mut() = text;
                Ok(ToolOutput::ok())
            } else {
                Ok(ToolOutput {
                    stdout: format!("{probe_secs}\n"),
                    ..ToolOutput::ok()
                })
            }
        })
    }

    #[test]
    fn test_combine_passes_ordered_manifest_to_ffmpeg() {
        let Fixture { dir, job } = fixture("720p30");
        write_inputs(&job);
        let seen = Rc::new(RefCell::new(String::new()));
        let runner = fake_tools(seen.clone(), 1.5);

        let summary = combine(&runner, &job).unwrap();

        let listed = parse_manifest(&seen.borrow());
        assert_eq!(listed.len(), 8);
        let token_dir = dir.path().join("media/videos/manim_flow_maps/720p30");
        for (path, scene) in listed.iter().zip(SCENES.iter()) {
            assert_eq!(path, &token_dir.join(format!("{}.mp4", scene.name)));
        }

        assert!(job.output_path.is_file());
        let outputs: Vec<_> = std::fs::read_dir(job.output_path.parent().unwrap())
            .unwrap()
            .collect();
        assert_eq!(outputs.len(), 1);
        assert_eq!(summary.output_duration_secs, Some(1.5));

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        let concat_args = calls[0].arg_strings();
        assert!(concat_args.windows(2).any(|w| w == ["-c", "copy"]));
        assert!(concat_args.windows(2).any(|w| w == ["-f", "concat"]));
        assert_eq!(calls[1].program, "ffprobe");
    }

    #[test]
    fn test_manifest_removed_after_success() {
        let Fixture { dir: _dir, job } = fixture("1080p60");
        write_inputs(&job);
        let runner = fake_tools(Rc::new(RefCell::new(String::new())), 1.0);

        combine(&runner, &job).unwrap();
        assert_eq!(std::fs::read_dir(&job.manifest_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_input_fails_without_running_ffmpeg() {
        let Fixture { dir: _dir, job } = fixture("1080p60");
        write_inputs(&job);
        let gone = job.layout.scene_video_path(&job.token, &SCENES[5]);
        std::fs::remove_file(&gone).unwrap();
        let runner = RecordingRunner::succeeding();

        let err = combine(&runner, &job).unwrap_err();
        match err {
            ScenecastError::MissingInputs { paths } => assert_eq!(paths, vec![gone]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(runner.calls().is_empty());
        assert!(!job.output_path.exists());
    }

    #[test]
    fn test_missing_input_removes_stale_output() {
        let Fixture { dir: _dir, job } = fixture("1080p60");
        write_inputs(&job);
        std::fs::create_dir_all(job.output_path.parent().unwrap()).unwrap();
        std::fs::write(&job.output_path, b"previous run").unwrap();
        std::fs::remove_file(job.layout.scene_video_path(&job.token, &SCENES[2])).unwrap();
        let runner = RecordingRunner::succeeding();

        let err = combine(&runner, &job).unwrap_err();
        assert!(matches!(err, ScenecastError::MissingInputs { .. }));
        assert!(!job.output_path.exists());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_failed_concat_removes_partial_output_and_manifest() {
        let Fixture { dir: _dir, job } = fixture("1080p60");
        write_inputs(&job);
        let runner = RecordingRunner::with(|inv| {
            std::fs::write(inv.arg_strings().last().unwrap(), b"").unwrap();
            Ok(failed("exit status: 1", "Non-monotonous DTS"))
        });

        let err = combine(&runner, &job).unwrap_err();
        assert!(matches!(err, ScenecastError::ToolFailed { .. }));
        assert!(!job.output_path.exists());
        assert_eq!(std::fs::read_dir(&job.manifest_dir).unwrap().count(), 0);
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_report_sums_input_durations() {
        let Fixture { dir: _dir, mut job } = fixture("720p30");
        job.write_report = true;
        write_inputs(&job);
        // Each probe answers 1.5s, so the output looks 12x shorter than its inputs.
        let runner = fake_tools(Rc::new(RefCell::new(String::new())), 1.5);

        let summary = combine(&runner, &job).unwrap();
        let report_path = summary.report_path.unwrap();
        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();

        assert_eq!(report["inputs"].as_array().unwrap().len(), 8);
        assert_eq!(report["input_duration_sum_secs"].as_f64(), Some(12.0));
        assert_eq!(report["status"], "warn");
        assert_eq!(report["token"], "720p30");
        // one concat, one output probe, eight input probes
        assert_eq!(runner.calls().len(), 10);
    }

    #[test]
    fn test_dry_run_skips_checks_and_duration_query() {
        let Fixture { dir: _dir, job } = fixture("480p15");
        let summary = combine(&DryRunRunner, &job).unwrap();
        assert!(summary.output_duration_secs.is_none());
        assert!(!job.output_path.exists());
        assert_eq!(summary.inputs.len(), 8);
    }

    #[test]
    fn test_from_config_defaults() {
        let job = CombineJob::from_config(&AppConfig::default(), ResolutionToken::default());
        assert_eq!(
            job.output_path,
            PathBuf::from("static/videos/flow_maps_method.mp4")
        );
        assert_eq!(
            job.report_path(),
            PathBuf::from("static/videos/flow_maps_method.report.json")
        );
        assert_eq!(job.token.as_str(), "1080p60");
    }
}
