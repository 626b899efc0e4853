//! Command execution.
//!
//! Commands are always run as a binary plus an argument vector. Nothing is
//! ever handed to a shell.

use std::io;
use std::path::PathBuf;
use std::process::Output;
use std::thread;
use std::time::{Duration, Instant};

use duct::cmd;
use serde::Serialize;

use crate::error::CommandError;
use crate::ui;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        }
    }
}

pub trait CommandRunner: Send + Sync {
    /// Run `binary` with `args` and capture its output. A non-zero exit is
    /// not an error at this level; it is reported through `exit_code`.
    fn run(&self, binary: &str, args: &[String]) -> Result<CommandOutput, CommandError>;
}

/// Runs commands on the local machine through `duct`.
#[derive(Debug, Default, Clone)]
pub struct DuctRunner {
    timeout: Option<Duration>,
}

impl DuctRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the child and fail with [`CommandError::TimedOut`] once `timeout` elapses.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

fn spawn_error(binary: &str, source: io::Error) -> CommandError {
    CommandError::Spawn {
        binary: binary.to_string(),
        source,
    }
}

/// Bare names are looked up on PATH; anything with a separator is used as is.
fn resolve_program(binary: &str) -> Result<PathBuf, CommandError> {
    if binary.contains(std::path::MAIN_SEPARATOR) {
        return Ok(PathBuf::from(binary));
    }
    which::which(binary)
        .map_err(|e| spawn_error(binary, io::Error::new(io::ErrorKind::NotFound, e.to_string())))
}

fn wait_with_timeout(
    expression: duct::Expression,
    binary: &str,
    timeout: Duration,
) -> Result<Output, CommandError> {
    let handle = expression.start().map_err(|e| spawn_error(binary, e))?;
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(output) = handle.try_wait().map_err(|e| spawn_error(binary, e))? {
            return Ok(output.clone());
        }
        if Instant::now() >= deadline {
            if let Err(e) = handle.kill() {
                ui::debug("command.kill_failed", &format!("Failed to kill '{binary}': {e}"));
            }
            return Err(CommandError::TimedOut {
                binary: binary.to_string(),
                timeout,
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

impl CommandRunner for DuctRunner {
    fn run(&self, binary: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        let program = resolve_program(binary)?;
        ui::debug(
            "command.run",
            &format!("Running {} {}", program.display(), shell_words::join(args)),
        );

        let expression = cmd(program, args)
            .stdout_capture()
            .stderr_capture()
            .unchecked();

        let output = match self.timeout {
            Some(timeout) => wait_with_timeout(expression, binary, timeout)?,
            None => expression.run().map_err(|e| spawn_error(binary, e))?,
        };

        Ok(CommandOutput::from(output))
    }
}
