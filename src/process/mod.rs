use async_trait::async_trait;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::ToolsConfig;

/// An external tool invocation: program plus arguments, no shell involved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Value following `flag`, if present
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

impl std::fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished tool invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    /// Short description of a failure for error messages
    pub fn failure_summary(&self) -> String {
        let stderr = self.stderr.trim();
        match (self.code, stderr.is_empty()) {
            (Some(code), true) => format!("exit code {}", code),
            (Some(code), false) => format!("exit code {}: {}", code, stderr),
            (None, true) => "terminated by signal".to_string(),
            (None, false) => format!("terminated by signal: {}", stderr),
        }
    }
}

/// Capability for running external tools
///
/// Everything that spawns a process goes through this trait so extraction
/// logic can be exercised with scripted runners.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion, capturing stdout and stderr.
    async fn run(&self, command: &ToolCommand) -> std::io::Result<CommandOutput>;

    /// Whether `program` can be found on this system.
    async fn is_available(&self, program: &str) -> bool {
        let program = program.to_string();
        tokio::task::spawn_blocking(move || which::which(program).is_ok())
            .await
            .unwrap_or(false)
    }
}

/// Runs tools as real child processes
///
/// Children are killed when the running future is dropped, which covers the
/// direct child on timeout. Grandchildren (ffmpeg spawned by yt-dlp) are not
/// reaped.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, command: &ToolCommand) -> std::io::Result<CommandOutput> {
        tracing::debug!("Running: {}", command);

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = cmd.output().await?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Presence of the external tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependencies {
    pub yt_dlp: bool,
    pub whisper: bool,
    pub ffmpeg: bool,
}

impl Dependencies {
    pub fn all_present(&self) -> bool {
        self.yt_dlp && self.whisper && self.ffmpeg
    }
}

/// Probe all three tools concurrently. Nothing is cached between calls.
pub async fn check_dependencies(runner: &dyn CommandRunner, tools: &ToolsConfig) -> Dependencies {
    let probes = [&tools.yt_dlp, &tools.whisper, &tools.ffmpeg].map(|program| runner.is_available(program));
    let results = join_all(probes).await;

    let deps = Dependencies {
        yt_dlp: results[0],
        whisper: results[1],
        ffmpeg: results[2],
    };
    tracing::debug!("Dependency check result: {:?}", deps);
    deps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_command_builder() {
        let cmd = ToolCommand::new("yt-dlp")
            .arg("--skip-download")
            .args(["--sub-format", "vtt"])
            .arg("https://youtu.be/x");

        assert_eq!(cmd.flag_value("--sub-format"), Some("vtt"));
        assert!(cmd.has_arg("--skip-download"));
        assert_eq!(cmd.flag_value("--missing"), None);
        assert_eq!(cmd.to_string(), "yt-dlp --skip-download --sub-format vtt https://youtu.be/x");
        assert_eq!(
            cmd,
            ToolCommand {
                program: "yt-dlp".to_string(),
                args: ["--skip-download", "--sub-format", "vtt", "https://youtu.be/x"]
                    .map(String::from)
                    .to_vec(),
            }
        );
    }

    #[test]
    fn test_failure_summary() {
        assert_eq!(CommandOutput::failed(1, "  boom \n").failure_summary(), "exit code 1: boom");
        assert_eq!(CommandOutput::failed(2, "").failure_summary(), "exit code 2");
    }

    #[tokio::test]
    async fn test_check_dependencies_probes_each_tool() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_is_available()
            .times(3)
            .returning(|program| program != "whisper");

        let deps = check_dependencies(&runner, &ToolsConfig::default()).await;
        assert_eq!(
            deps,
            Dependencies {
                yt_dlp: true,
                whisper: false,
                ffmpeg: true
            }
        );
        assert!(!deps.all_present());
    }

    #[tokio::test]
    async fn test_system_runner_reports_spawn_failure() {
        let runner = SystemCommandRunner::new();
        let result = runner
            .run(&ToolCommand::new("definitely-not-a-real-tool-7f3a"))
            .await;
        assert!(result.is_err());
    }
}
