use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OsError {
    #[error("Unable to detect OS")]
    Detection,

    #[error("Unable to create OS from distribution '{name}' (version '{version}')")]
    UnknownDistribution { name: String, version: String },

    #[error("Failed to query host information: {0}")]
    HostInfo(#[from] std::io::Error),

    #[error(transparent)]
    CommandExecution(#[from] CommandError),

    #[error("Invalid command line: {0}")]
    InvalidCommand(String),

    #[error("Invalid issue pattern for '{identifier}': {source}")]
    InvalidPattern {
        identifier: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to execute '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{binary}' exited with {}: {stderr}", describe_code(.code))]
    NonZeroExit {
        binary: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("'{binary}' did not finish within {}s", .timeout.as_secs())]
    TimedOut { binary: String, timeout: Duration },
}

impl CommandError {
    /// Exit code of the failed process, if it ran to completion.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CommandError::NonZeroExit { code, .. } => *code,
            _ => None,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "a signal".to_string(),
    }
}
