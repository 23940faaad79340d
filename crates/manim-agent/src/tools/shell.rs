//! Shell execution for the `bash` tools.
//!
//! A [`ShellBackend`] runs one command and always reports the outcome as data. The
//! [`ShellSession`] wraps a backend for the duration of one agent run and carries the
//! working directory from one command to the next until it is restarted.
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::Mutex;

/// Wall clock limit for a single command
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum bytes captured per output stream
pub const MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Exit code reported when a command is killed for running too long
pub const TIMEOUT_EXIT_CODE: i32 = 124;

const CWD_MARKER: &str = "__MANIM_AGENT_CWD__:";

#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub command: String,
    pub working_dir: PathBuf,
    pub timeout: Duration,
    pub max_output: usize,
}

impl CommandRequest {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(command: S, working_dir: P) -> Self {
        Self {
            command: command.into(),
            working_dir: working_dir.into(),
            timeout: COMMAND_TIMEOUT,
            max_output: MAX_OUTPUT_BYTES,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_output(mut self, max_output: usize) -> Self {
        self.max_output = max_output;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    #[serde(skip)]
    pub timed_out: bool,
    #[serde(skip)]
    pub truncated: bool,
}

impl CommandOutput {
    /// A command that could not be run at all
    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self {
            stdout: String::new(),
            stderr: message.into(),
            exit_code: 1,
            timed_out: false,
            truncated: false,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Somewhere commands can be executed.
///
/// Implementations never fail: spawn errors, timeouts and non-zero exits are all
/// reported through the returned [`CommandOutput`].
#[async_trait]
pub trait ShellBackend: Send + Sync {
    async fn execute(&self, request: CommandRequest) -> CommandOutput;
}

/// Runs commands with `bash -c` on the local host
#[derive(Debug, Default, Clone)]
pub struct HostShell;

#[async_trait]
impl ShellBackend for HostShell {
    async fn execute(&self, request: CommandRequest) -> CommandOutput {
        let mut cmd = Command::new("bash");
        cmd.arg("-c")
            .arg(&request.command)
            .current_dir(&request.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Keep tools from waiting on a terminal
        cmd.env("TERM", "dumb");
        cmd.env("GIT_TERMINAL_PROMPT", "0");

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return CommandOutput::failure(format!("Failed to spawn process: {e}")),
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let max = request.max_output;

        let result = tokio::time::timeout(request.timeout, async {
            tokio::join!(
                read_capped(stdout, max),
                read_capped(stderr, max),
                child.wait()
            )
        })
        .await;

        match result {
            Ok(((stdout, out_truncated), (stderr, err_truncated), Ok(status))) => {
                let truncated = out_truncated || err_truncated;
                if truncated {
                    tracing::warn!(command = %request.command, "Output truncated to {} bytes", max);
                }
                CommandOutput {
                    stdout,
                    stderr,
                    exit_code: status.code().unwrap_or(-1),
                    timed_out: false,
                    truncated,
                }
            }
            Ok((_, _, Err(e))) => CommandOutput::failure(format!("Process error: {e}")),
            Err(_) => {
                let _ = child.kill().await;
                tracing::warn!(command = %request.command, "Command timed out");
                CommandOutput {
                    stdout: String::new(),
                    stderr: format!(
                        "Command timed out after {} seconds",
                        request.timeout.as_secs_f64()
                    ),
                    exit_code: TIMEOUT_EXIT_CODE,
                    timed_out: true,
                    truncated: false,
                }
            }
        }
    }
}

// Read up to `max` bytes, then drain the rest so the child never blocks on a full pipe
async fn read_capped<R: AsyncRead + Unpin>(reader: Option<R>, max: usize) -> (String, bool) {
    let Some(reader) = reader else {
        return (String::new(), false);
    };

    let mut buf = Vec::new();
    let mut limited = reader.take(max as u64);
    if limited.read_to_end(&mut buf).await.is_err() {
        return (String::from_utf8_lossy(&buf).into_owned(), false);
    }

    let mut rest = limited.into_inner();
    let extra = tokio::io::copy(&mut rest, &mut tokio::io::sink())
        .await
        .unwrap_or(0);
    (String::from_utf8_lossy(&buf).into_owned(), extra > 0)
}

/// A resettable shell owned by a single agent run
pub struct ShellSession {
    backend: Arc<dyn ShellBackend>,
    initial_dir: PathBuf,
    cwd: Mutex<PathBuf>,
}

impl ShellSession {
    pub fn new<P: Into<PathBuf>>(backend: Arc<dyn ShellBackend>, initial_dir: P) -> Self {
        let initial_dir = initial_dir.into();
        Self {
            backend,
            cwd: Mutex::new(initial_dir.clone()),
            initial_dir,
        }
    }

    pub async fn cwd(&self) -> PathBuf {
        self.cwd.lock().await.clone()
    }

    /// Run a command in the session's current directory.
    ///
    /// A trailing marker reports the shell's final `$PWD` so a `cd` carries over to the
    /// next command. The marker is stripped before the output is returned.
    pub async fn run(&self, command: &str) -> CommandOutput {
        let mut cwd = self.cwd.lock().await;
        let wrapped = format!(
            "{command}\n__rc=$?\nprintf '\\n{CWD_MARKER}%s\\n' \"$PWD\"\nexit $__rc"
        );

        let mut output = self
            .backend
            .execute(CommandRequest::new(wrapped, cwd.clone()))
            .await;

        if let Some((stdout, dir)) = split_marker(&output.stdout) {
            if Path::new(&dir).is_dir() {
                *cwd = PathBuf::from(dir);
            }
            output.stdout = stdout;
        }
        output
    }

    /// Forget any directory changes
    pub async fn restart(&self) {
        *self.cwd.lock().await = self.initial_dir.clone();
    }
}

fn split_marker(stdout: &str) -> Option<(String, String)> {
    let needle = format!("\n{CWD_MARKER}");
    let index = stdout.rfind(&needle)?;
    let dir = stdout[index + needle.len()..].trim_end_matches('\n');
    Some((stdout[..index].to_string(), dir.to_string()))
}
