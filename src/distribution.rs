use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::candidates;
use crate::command::{CommandOutput, CommandRunner};
use crate::error::{CommandError, OsError};
use crate::registry::PlatformFamily;
use crate::ui;

/// A binary and its argument vector, after translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreparedCommand {
    pub binary: String,
    pub args: Vec<String>,
}

/// A resolved operating system distribution.
#[derive(Clone, Serialize)]
pub struct Distribution {
    family: PlatformFamily,
    identifier: String,
    name: String,
    version: String,
    command_translations: BTreeMap<String, String>,
    #[serde(skip)]
    runner: Arc<dyn CommandRunner>,
}

impl Distribution {
    pub fn new(
        family: PlatformFamily,
        identifier: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        command_translations: BTreeMap<String, String>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            family,
            identifier: identifier.into(),
            name: name.into(),
            version: version.into(),
            command_translations,
            runner,
        }
    }

    pub fn family(&self) -> PlatformFamily {
        self.family
    }

    /// Registry identifier this distribution resolved to.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn command_translations(&self) -> &BTreeMap<String, String> {
        &self.command_translations
    }

    pub fn is_linux(&self) -> bool {
        self.family == PlatformFamily::Linux
    }

    pub fn is_darwin(&self) -> bool {
        self.family == PlatformFamily::Darwin
    }

    /// Candidate identifiers for this distribution's own name and version.
    pub fn possible_identifiers(&self) -> Vec<String> {
        candidates::generate(&self.name, &self.version)
    }

    /// The binary to run for `binary` on this distribution.
    pub fn translate<'a>(&'a self, binary: &'a str) -> &'a str {
        self.command_translations
            .get(binary)
            .map(String::as_str)
            .unwrap_or(binary)
    }

    /// Split a command line into a translated binary and its arguments.
    /// The line is tokenised with shell quoting rules, so a quoted binary
    /// path may contain spaces. Nothing is expanded or interpolated.
    pub fn prepare_command(&self, command_line: &str) -> Result<PreparedCommand, OsError> {
        let command_line = command_line.trim();
        let mut words = shell_words::split(command_line)
            .map_err(|e| OsError::InvalidCommand(format!("{command_line}: {e}")))?
            .into_iter();
        let Some(binary) = words.next() else {
            return Err(OsError::InvalidCommand("empty command".to_string()));
        };

        Ok(PreparedCommand {
            binary: self.translate(&binary).to_string(),
            args: words.collect(),
        })
    }

    /// Run a command line, translating the binary first. Stdout is returned
    /// untouched; a non-zero exit is an error.
    pub fn run_command(&self, command_line: &str) -> Result<CommandOutput, OsError> {
        let prepared = self.prepare_command(command_line)?;
        self.execute(prepared)
    }

    /// Run `binary` with an already split argument vector, translating the
    /// binary first.
    pub fn run(&self, binary: &str, args: &[String]) -> Result<CommandOutput, OsError> {
        if binary.trim().is_empty() {
            return Err(OsError::InvalidCommand("empty command".to_string()));
        }
        self.execute(PreparedCommand {
            binary: self.translate(binary).to_string(),
            args: args.to_vec(),
        })
    }

    fn execute(&self, prepared: PreparedCommand) -> Result<CommandOutput, OsError> {
        ui::debug(
            "distribution.run_command",
            &format!(
                "{} {}: running {} {}",
                self.name,
                self.version,
                prepared.binary,
                shell_words::join(&prepared.args)
            ),
        );

        let output = self.runner.run(&prepared.binary, &prepared.args)?;
        if !output.success() {
            return Err(CommandError::NonZeroExit {
                binary: prepared.binary,
                code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            }
            .into());
        }
        Ok(output)
    }
}

impl fmt::Debug for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Distribution")
            .field("family", &self.family)
            .field("identifier", &self.identifier)
            .field("name", &self.name)
            .field("version", &self.version)
            .field("command_translations", &self.command_translations)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.name)?;
        } else {
            write!(f, "{} {}", self.name, self.version)?;
        }
        write!(f, " ({}/{})", self.family, self.identifier)
    }
}
