//! Tool invocation: the single place where Pacu is spawned
//!
//! # Safety Features
//!
//! - **Injection prevention**: arguments go through `tokio::process::Command`
//!   as a vector, never through a shell string
//! - **Isolated environment**: the child gets an explicit environment snapshot
//!   when one is supplied; the parent's environment is never mutated
//! - **Timeout control**: a hung module is killed and whatever it printed so
//!   far is kept
//!
//! Every outcome (exit, timeout, missing binary, spawn failure) is reported as
//! an [`InvocationOutcome`] value so call sites handle one contract.

use crate::security::credentials::ToolEnvironment;
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// How long to keep draining pipes after a timed-out child was killed
const PIPE_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// One call of the external tool
#[derive(Debug, Clone, Default)]
pub struct ToolInvocation<'a> {
    /// Arguments after the program name
    pub args: Vec<String>,
    /// Full environment for the child; `None` inherits the parent's
    pub env: Option<&'a ToolEnvironment>,
    /// Kill the child after this long; `None` waits forever
    pub timeout: Option<Duration>,
}

impl<'a> ToolInvocation<'a> {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            env: None,
            timeout: None,
        }
    }

    pub fn with_env(mut self, env: Option<&'a ToolEnvironment>) -> Self {
        self.env = env;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Result of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// The process exited on its own. `code` is `None` when it was killed by a signal.
    Completed {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// The timeout elapsed and the process was killed
    TimedOut { stdout: String, stderr: String },
    /// The executable could not be located
    NotFound,
    /// Anything else that prevented the process from running to completion
    Failed { detail: String },
}

impl InvocationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { code: Some(0), .. })
    }

    /// Exit code, or -1 when the tool did not exit normally
    pub fn return_code(&self) -> i32 {
        match self {
            Self::Completed { code, .. } => code.unwrap_or(-1),
            _ => -1,
        }
    }

    pub fn stdout(&self) -> &str {
        match self {
            Self::Completed { stdout, .. } | Self::TimedOut { stdout, .. } => stdout,
            _ => "",
        }
    }

    pub fn stderr(&self) -> &str {
        match self {
            Self::Completed { stderr, .. } | Self::TimedOut { stderr, .. } => stderr,
            Self::Failed { detail } => detail,
            Self::NotFound => "",
        }
    }
}

/// Anything that can run the external tool
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run the tool to completion (or timeout). Never panics, never errors.
    async fn invoke(&self, invocation: &ToolInvocation<'_>) -> InvocationOutcome;
}

/// Runs the tool as a real child process
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: String,
    leading_args: Vec<String>,
}

impl ProcessRunner {
    /// # Example
    ///
    /// ```rust
    /// use pacu_console::security::ProcessRunner;
    ///
    /// let runner = ProcessRunner::new("pacu");
    /// assert_eq!(runner.program(), "pacu");
    /// ```
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Arguments placed before every invocation's own arguments,
    /// e.g. `python3 -m pacu`
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn build_command(&self, invocation: &ToolInvocation<'_>) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(env) = invocation.env {
            command.env_clear().envs(env.iter());
        }

        command
    }
}

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn invoke(&self, invocation: &ToolInvocation<'_>) -> InvocationOutcome {
        let mut child = match self.build_command(invocation).spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(program = %self.program, "executable not found");
                return InvocationOutcome::NotFound;
            }
            Err(e) => {
                return InvocationOutcome::Failed {
                    detail: format!("failed to start {}: {}", self.program, e),
                };
            }
        };

        let stdout = PipeCapture::start(child.stdout.take());
        let stderr = PipeCapture::start(child.stderr.take());

        let waited = match invocation.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(result) => Some(result),
                Err(_) => {
                    if let Err(e) = child.kill().await {
                        tracing::warn!(program = %self.program, error = %e, "failed to kill timed-out process");
                    }
                    None
                }
            },
            None => Some(child.wait().await),
        };

        let stdout = stdout.finish().await;
        let stderr = stderr.finish().await;

        match waited {
            None => InvocationOutcome::TimedOut { stdout, stderr },
            Some(Ok(status)) => InvocationOutcome::Completed {
                code: status.code(),
                stdout,
                stderr,
            },
            Some(Err(e)) => InvocationOutcome::Failed {
                detail: format!("failed waiting for {}: {}", self.program, e),
            },
        }
    }
}

/// Drains a child pipe in the background so partial output survives a kill
struct PipeCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
    task: Option<JoinHandle<()>>,
}

impl PipeCapture {
    fn start<R>(pipe: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let task = pipe.map(|mut pipe| {
            let buffer = Arc::clone(&buffer);
            tokio::spawn(async move {
                let mut chunk = [0u8; 8192];
                loop {
                    match pipe.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buffer.lock().await.extend_from_slice(&chunk[..n]),
                    }
                }
            })
        });

        Self { buffer, task }
    }

    /// Wait for EOF (bounded by the drain grace) and return what was read
    async fn finish(mut self) -> String {
        if let Some(mut task) = self.task.take()
            && tokio::time::timeout(PIPE_DRAIN_GRACE, &mut task).await.is_err()
        {
            // a grandchild still holds the pipe open
            task.abort();
        }

        let bytes = self.buffer.lock().await;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        text
    }
}
