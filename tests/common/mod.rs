#![allow(dead_code)]

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use osdetect::{CommandError, CommandOutput, CommandRunner, HostInfo, Registry, Resolver};

/// Scratch directory holding a config file and a fake issue file.
pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    pub fn issue_path(&self) -> PathBuf {
        self.path().join("issue")
    }

    pub fn write_issue(&self, contents: &str) -> Result<()> {
        std::fs::write(self.issue_path(), contents)?;
        Ok(())
    }

    /// Write a config pointing at this environment's issue file, plus `extra`.
    pub fn write_config(&self, extra: &str) -> Result<()> {
        let contents = format!(
            "issue_file = {:?}\n{}",
            self.issue_path().display().to_string(),
            extra
        );
        std::fs::write(self.config_path(), contents)?;
        Ok(())
    }
}

/// Records every invocation and answers with a canned output.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<(String, Vec<String>)>>,
    output: CommandOutput,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::with_output(CommandOutput {
            exit_code: Some(0),
            ..Default::default()
        })
    }

    pub fn with_output(output: CommandOutput) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            output,
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, binary: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        self.calls
            .lock()
            .unwrap()
            .push((binary.to_string(), args.to_vec()));
        Ok(self.output.clone())
    }
}

pub fn resolver_for(
    registry: Arc<Registry>,
    host: impl HostInfo + 'static,
    runner: Arc<RecordingRunner>,
) -> Resolver {
    Resolver::new(registry, Arc::new(host), runner)
}
