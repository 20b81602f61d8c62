//! Typed external command execution.
//!
//! Commands are built as explicit argument vectors and spawned directly,
//! never through a shell.

use crate::error::{CliError, ReleaseError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// A program invocation with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl CommandSpec {
    /// Start building an invocation of `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run in `dir` instead of the process working directory.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Program name
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments, in order
    pub fn arg_list(&self) -> &[String] {
        &self.args
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        // Own process group: a terminal Ctrl-C cancels the run at the next
        // checkpoint instead of killing the in-flight command.
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Exit status and output of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, `None` if killed by a signal
    pub exit_code: Option<i32>,
    /// Whether the process exited successfully
    pub success: bool,
    /// Captured stdout (empty when streamed)
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
}

/// Locate a required tool in `PATH`.
pub fn require_tool(tool: &str) -> Result<PathBuf> {
    which::which(tool).map_err(|e| {
        log::debug!("{} not found in PATH: {}", tool, e);
        ReleaseError::Cli(CliError::ToolNotFound {
            tool: tool.to_string(),
        })
    })
}

/// Run to completion, capturing stdout and stderr.
pub async fn run_captured(spec: &CommandSpec) -> Result<CommandOutput> {
    log::debug!("Running: {}", spec);

    let output = spec
        .command()
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| spawn_failed(spec, e))?;

    Ok(CommandOutput {
        exit_code: output.status.code(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run to completion, handing each stdout line to `on_line` as it arrives.
///
/// Stderr is captured for error reporting.
pub async fn run_streaming<F>(spec: &CommandSpec, mut on_line: F) -> Result<CommandOutput>
where
    F: FnMut(&str),
{
    log::debug!("Running (streaming): {}", spec);

    let mut child = spec
        .command()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_failed(spec, e))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    // Drain both pipes together so neither can fill up and block the child.
    let (_, stderr) = tokio::join!(
        async {
            if let Some(stdout) = stdout {
                drain_lines(stdout, |line| on_line(&line)).await;
            }
        },
        async {
            let mut captured = Vec::new();
            if let Some(stderr) = stderr {
                drain_lines(stderr, |line| captured.push(line)).await;
            }
            captured
        }
    );

    let status = child.wait().await.map_err(|e| spawn_failed(spec, e))?;

    Ok(CommandOutput {
        exit_code: status.code(),
        success: status.success(),
        stdout: String::new(),
        stderr: stderr.join("\n"),
    })
}

/// Read `reader` to EOF, one line at a time. Invalid UTF-8 is replaced
/// rather than ending the read.
async fn drain_lines<R, F>(reader: R, mut on_line: F)
where
    R: AsyncRead + Unpin,
    F: FnMut(String),
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                on_line(line.trim_end_matches(['\n', '\r']).to_string());
            }
            Err(e) => {
                log::debug!("Stopped reading command output: {}", e);
                break;
            }
        }
    }
}

fn spawn_failed(spec: &CommandSpec, err: std::io::Error) -> ReleaseError {
    ReleaseError::Cli(CliError::ExecutionFailed {
        command: spec.to_string(),
        reason: err.to_string(),
    })
}
