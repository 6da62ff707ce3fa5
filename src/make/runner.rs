// src/make/runner.rs
// Subprocess execution for make invocations (argv, no shell)

use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Upper bound for any make execution (5 minutes)
pub const DEFAULT_EXEC_TIMEOUT: Duration = Duration::from_secs(300);

/// How long to keep draining pipes after the child is gone
pub const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// A fully resolved `make <target> KEY=value ...` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakeInvocation {
    pub target: String,
    pub args: Vec<(String, String)>,
    pub cwd: PathBuf,
}

impl MakeInvocation {
    pub fn new(target: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn with_args(mut self, args: Vec<(String, String)>) -> Self {
        self.args = args;
        self
    }

    /// Arguments handed to the make binary, one element per token
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.target.clone())
            .chain(self.args.iter().map(|(k, v)| format!("{k}={v}")))
            .collect()
    }

    /// Human-readable form, e.g. `make db-migrate-create NAME="add_users"`
    pub fn display(&self) -> String {
        let mut command = format!("make {}", self.target);
        for (k, v) in &self.args {
            command.push_str(&format!(" {k}=\"{v}\""));
        }
        command
    }
}

/// Raw result of a finished (or killed) process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    /// None when the process was killed or terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// Error text for a failed run, None on success
    pub fn failure_message(&self, command: &str, timeout: Duration) -> Option<String> {
        if self.timed_out {
            return Some(
                BridgeError::Timeout {
                    command: command.to_string(),
                    timeout,
                }
                .to_string(),
            );
        }
        let headline = match self.exit_code {
            Some(0) => return None,
            Some(code) => format!("Command failed: {command} (exit code {code})"),
            None => format!("Command failed: {command} (terminated by signal)"),
        };
        let stderr = self.stderr.trim();
        Some(if stderr.is_empty() {
            headline
        } else {
            format!("{headline}\n{stderr}")
        })
    }
}

/// Seam between the bridge and the operating system
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the invocation. `Err` means the process could not be started;
    /// timeouts and non-zero exits are reported through [`RunOutput`].
    async fn run(&self, invocation: &MakeInvocation, timeout: Duration) -> Result<RunOutput>;
}

/// Spawns a real process. The program defaults to `make`.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: String,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new("make")
    }
}

impl ProcessRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &MakeInvocation, timeout: Duration) -> Result<RunOutput> {
        let shown = invocation.display();
        debug!(program = %self.program, argv = ?invocation.argv(), cwd = %invocation.cwd.display(), "Spawning");

        let mut command = Command::new(&self.program);
        command
            .args(invocation.argv())
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own group, so recipe subprocesses can be killed with make
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|e| BridgeError::Spawn {
            command: shown.clone(),
            message: e.to_string(),
        })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let (exit_code, timed_out) = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) => (status.code(), false),
            Ok(Err(e)) => {
                warn!(command = %shown, error = %e, "Failed waiting on child");
                (None, false)
            }
            Err(_) => {
                warn!(command = %shown, timeout_ms = timeout.as_millis(), "Command timed out, killing");
                kill_process_group(&child);
                if let Err(e) = child.kill().await {
                    warn!(command = %shown, error = %e, "Failed to kill timed out child");
                }
                (None, true)
            }
        };

        let (stdout, stderr) = tokio::join!(collect(stdout), collect(stderr));
        Ok(RunOutput {
            exit_code,
            stdout,
            stderr,
            timed_out,
        })
    }
}

#[cfg(unix)]
fn kill_process_group(child: &Child) {
    let Some(pgid) = child.id().and_then(|pid| libc::pid_t::try_from(pid).ok()) else {
        return;
    };
    // SAFETY: killpg only sends a signal. The group was created for this child.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        debug!(pgid, error = %std::io::Error::last_os_error(), "killpg failed");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child) {}

/// Pipe reader whose bytes stay readable if the task never finishes
struct Drain {
    buf: Arc<Mutex<Vec<u8>>>,
    task: JoinHandle<()>,
}

fn drain<R>(pipe: Option<R>) -> Option<Drain>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    pipe.map(|mut pipe| {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = buf.clone();
        let task = tokio::spawn(async move {
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        let Ok(mut buf) = sink.lock() else { break };
                        buf.extend_from_slice(&chunk[..n]);
                    }
                }
            }
        });
        Drain { buf, task }
    })
}

/// Wait up to [`DRAIN_GRACE`] for EOF, then return whatever was read
async fn collect(drain: Option<Drain>) -> String {
    let Some(Drain { buf, mut task }) = drain else {
        return String::new();
    };
    if tokio::time::timeout(DRAIN_GRACE, &mut task).await.is_err() {
        task.abort();
    }
    let bytes = buf.lock().map(|b| b.clone()).unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}
