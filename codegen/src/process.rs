//! External process execution
//!
//! Every call to `dotnet` (and to the login shell during discovery) goes
//! through [`ProcessRunner`], so the invoker can be driven by a recording fake
//! in tests.

use crate::error::RunError;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// A fully described external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl ProcessInvocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: vec![],
            cwd: None,
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

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Number of times `flag` appears in the argument list
    pub fn count_flag(&self, flag: &str) -> usize {
        self.args.iter().filter(|a| a.as_str() == flag).count()
    }

    /// Value following the first occurrence of `flag`
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl fmt::Display for ProcessInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Exit status and captured output of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs external processes to completion
pub trait ProcessRunner: Send + Sync {
    fn run(&self, invocation: &ProcessInvocation) -> Result<ProcessOutput, RunError>;
}

/// [`ProcessRunner`] backed by `std::process`
///
/// Both output pipes are drained on their own threads while the child runs,
/// so a chatty child cannot block on a full pipe buffer. When a timeout is set
/// and the child outlives it, the child is killed and the run reported as
/// [`RunError::TimedOut`].
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self { timeout: None }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
        thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(mut pipe) = pipe {
                // A read error just truncates the captured text
                let _ = pipe.read_to_end(&mut buf);
            }
            String::from_utf8_lossy(&buf).into_owned()
        })
    }

    fn wait(&self, child: &mut Child, program: &str) -> Result<Option<i32>, RunError> {
        let started = Instant::now();
        loop {
            let status = child.try_wait().map_err(|source| RunError::Io {
                program: program.to_string(),
                source,
            })?;
            if let Some(status) = status {
                return Ok(status.code());
            }

            if let Some(timeout) = self.timeout
                && started.elapsed() >= timeout
            {
                warn!("`{}` exceeded {}s, killing it", program, timeout.as_secs());
                // The child may have exited between try_wait and kill
                let _ = child.kill();
                let _ = child.wait();
                return Err(RunError::TimedOut {
                    program: program.to_string(),
                    after: timeout,
                });
            }

            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &ProcessInvocation) -> Result<ProcessOutput, RunError> {
        let program = invocation.program.display().to_string();
        debug!("Running {}", invocation);

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }

        let mut child = command.spawn().map_err(|source| RunError::Spawn {
            program: program.clone(),
            source,
        })?;

        let stdout = Self::drain(child.stdout.take());
        let stderr = Self::drain(child.stderr.take());
        let exit_code = self.wait(&mut child, &program);

        // Pipes close once the child is gone, so the readers always finish
        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();
        let exit_code = exit_code?;

        debug!("`{}` exited with {:?}", program, exit_code);
        Ok(ProcessOutput {
            exit_code,
            stdout,
            stderr,
        })
    }
}
