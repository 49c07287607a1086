//! External tool invocation.
//!
//! Every stage goes through [`ToolRunner`], one process at a time: each
//! invocation is spawned and waited on before `run` returns.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::ErrorKind;
use std::process::{Command, Stdio};

use scenecast_common::error::{ScenecastError, ScenecastResult};

/// A single external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<OsString>,

    /// Capture stdout/stderr instead of passing them through to the terminal.
    pub capture_output: bool,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            capture_output: false,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn captured(mut self) -> Self {
        self.capture_output = true;
        self
    }

    /// Arguments as (lossy) strings, for logging and assertions.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in self.arg_strings() {
            if needs_quoting(&arg) {
                write!(f, " '{}'", arg.replace('\'', r"'\''"))?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Anything beyond a conservative set of shell-inert characters is quoted.
fn needs_quoting(arg: &str) -> bool {
    arg.is_empty()
        || !arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:+,@%".contains(c))
}

/// Result of a finished invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub success: bool,

    /// Human-readable exit status.
    pub status: String,

    /// Empty unless the invocation was captured.
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// A successful, empty output.
    pub fn ok() -> Self {
        Self {
            success: true,
            status: "exit status: 0".to_string(),
            ..Self::default()
        }
    }

    /// Turn a non-zero exit into [`ScenecastError::ToolFailed`].
    pub fn into_result(self, program: &str) -> ScenecastResult<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(ScenecastError::ToolFailed {
                program: program.to_string(),
                status: self.status,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Seam between the orchestrators and the processes they start.
pub trait ToolRunner {
    /// Run the invocation to completion.
    ///
    /// A non-zero exit is reported through [`ToolOutput::success`]; `Err` is
    /// reserved for failing to start or wait on the process.
    fn run(&self, invocation: &ToolInvocation) -> ScenecastResult<ToolOutput>;

    /// Whether invocations are only being printed, not executed.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Runs invocations as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &ToolInvocation) -> ScenecastResult<ToolOutput> {
        tracing::debug!(command = %invocation, "Running external tool");

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).stdin(Stdio::null());

        let started = std::time::Instant::now();
        let spawn_error = |e: std::io::Error| {
            if e.kind() == ErrorKind::NotFound {
                ScenecastError::tool_unavailable(&invocation.program)
            } else {
                ScenecastError::Io(e)
            }
        };

        let output = if invocation.capture_output {
            let out = cmd.output().map_err(spawn_error)?;
            ToolOutput {
                success: out.status.success(),
                status: out.status.to_string(),
                stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            }
        } else {
            let status = cmd
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(spawn_error)?;
            ToolOutput {
                success: status.success(),
                status: status.to_string(),
                ..ToolOutput::default()
            }
        };

        tracing::debug!(
            program = %invocation.program,
            status = %output.status,
            elapsed_ms = started.elapsed().as_millis(),
            "External tool finished"
        );
        Ok(output)
    }
}

/// Prints each invocation instead of running it.
///
/// The printed commands are illustrative: temporary files they name, such as
/// the concat manifest, are removed once the step finishes.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunRunner;

impl ToolRunner for DryRunRunner {
    fn run(&self, invocation: &ToolInvocation) -> ScenecastResult<ToolOutput> {
        println!("{invocation}");
        Ok(ToolOutput::ok())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

/// Check that `program` starts and exits cleanly when asked for its version.
pub fn tool_responds(runner: &dyn ToolRunner, program: &str, version_arg: &str) -> bool {
    let invocation = ToolInvocation::new(program).arg(version_arg).captured();
    match runner.run(&invocation) {
        Ok(output) => output.success,
        Err(e) => {
            tracing::debug!(program, error = %e, "Tool did not respond");
            false
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording fake shared by the orchestrator tests.

    use std::cell::RefCell;

    use super::*;

    type Responder = Box<dyn Fn(&ToolInvocation) -> ScenecastResult<ToolOutput>>;

    /// Records every invocation and answers with a configurable responder.
    pub struct RecordingRunner {
        pub calls: RefCell<Vec<ToolInvocation>>,
        respond: Responder,
    }

    impl RecordingRunner {
        pub fn succeeding() -> Self {
            Self::with(|_| Ok(ToolOutput::ok()))
        }

        pub fn with(
            respond: impl Fn(&ToolInvocation) -> ScenecastResult<ToolOutput> + 'static,
        ) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                respond: Box::new(respond),
            }
        }

        pub fn calls(&self) -> Vec<ToolInvocation> {
            self.calls.borrow().clone()
        }
    }

    impl ToolRunner for RecordingRunner {
        fn run(&self, invocation: &ToolInvocation) -> ScenecastResult<ToolOutput> {
            self.calls.borrow_mut().push(invocation.clone());
            (self.respond)(invocation)
        }
    }

    pub fn failed(status: &str, stderr: &str) -> ToolOutput {
        ToolOutput {
            success: false,
            status: status.to_string(),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_display_quotes_awkward_args() {
        let inv = ToolInvocation::new("ffmpeg")
            .args(["-i", "my clip.mp4", "it's.mp4"])
            .arg("");
        assert_eq!(
            inv.to_string(),
            r"ffmpeg -i 'my clip.mp4' 'it'\''s.mp4' ''"
        );
    }

    #[test]
    fn test_display_quotes_shell_metacharacters() {
        let inv = ToolInvocation::new("ffmpeg").args([
            "$HOME.mp4",
            "a\"b",
            "x;rm",
            "a&b",
            "-c:v",
            "/media/videos/720p30/Part0_Introduction.mp4",
        ]);
        assert_eq!(
            inv.to_string(),
            "ffmpeg '$HOME.mp4' 'a\"b' 'x;rm' 'a&b' -c:v /media/videos/720p30/Part0_Introduction.mp4"
        );
    }

    #[test]
    fn test_into_result_reports_stderr() {
        let err = failed("exit status: 1", "  boom\n")
            .into_result("ffmpeg")
            .unwrap_err();
        assert_eq!(err.to_string(), "ffmpeg exited with status exit status: 1: boom");
    }

    #[test]
    fn test_tool_responds_false_on_spawn_error() {
        let runner = RecordingRunner::with(|inv| {
            Err(ScenecastError::tool_unavailable(inv.program.clone()))
        });
        assert!(!tool_responds(&runner, "manim", "--version"));
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].capture_output);
    }

    #[test]
    fn test_process_runner_missing_binary_is_unavailable() {
        let inv = ToolInvocation::new("scenecast-definitely-not-a-binary").captured();
        let err = ProcessRunner.run(&inv).unwrap_err();
        assert!(matches!(err, ScenecastError::ToolUnavailable { .. }));
    }
}
