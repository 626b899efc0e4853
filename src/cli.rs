use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;

use osdetect::ui::prelude::*;
use osdetect::{
    CommandError, Config, Distribution, OsError, PlatformFamily, Resolver, candidates,
};

/// Detect the OS distribution and run distribution-aware commands
#[derive(Parser, Debug)]
#[command(name = "osdetect", author, version, about, long_about = None)]
pub struct Cli {
    /// Activate debug mode
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Output format
    #[arg(long, value_enum, global = true, default_value_t = OutputArg::Text)]
    pub output: OutputArg,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputArg {
    Text,
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Text => OutputFormat::Text,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect the distribution of this machine
    Detect,

    /// Build a distribution from its name and version
    Resolve {
        /// Distribution name (e.g. Ubuntu)
        name: String,
        /// Distribution version (e.g. 14.04)
        version: Option<String>,
        /// Use this registry identifier instead of guessing one
        #[arg(short, long)]
        identifier: Option<String>,
    },

    /// Show the identifiers tried for a name and version, most specific first
    Candidates {
        name: String,
        version: Option<String>,
    },

    /// Translate and run a command for the detected (or named) distribution
    Run {
        /// Distribution name; detects the host when omitted
        #[arg(long)]
        name: Option<String>,
        /// Distribution version, used with --name
        #[arg(long = "os-version", requires = "name")]
        os_version: Option<String>,
        /// Command line to run
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// List the known distributions
    List {
        /// Only list this platform family
        #[arg(short, long)]
        family: Option<PlatformFamily>,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Run the selected command and return the process exit code.
pub fn dispatch(cli: &Cli) -> Result<i32> {
    let Some(command) = &cli.command else {
        emit(
            Level::Info,
            "cli.usage",
            "osdetect: run with --help for usage",
            None,
        );
        return Ok(0);
    };

    let config = load_config(cli)?;
    let resolver = config.system_resolver()?;

    match command {
        Commands::Detect => {
            let os = resolver.detect_os()?;
            print_distribution("detect.result", &os)?;
            Ok(0)
        }
        Commands::Resolve {
            name,
            version,
            identifier,
        } => {
            let os = resolver.from_distribution(
                name,
                version.as_deref().unwrap_or_default(),
                identifier.as_deref(),
            )?;
            print_distribution("resolve.result", &os)?;
            Ok(0)
        }
        Commands::Candidates { name, version } => {
            let list = candidates::generate(name, version.as_deref().unwrap_or_default());
            print_candidates(&list)?;
            Ok(0)
        }
        Commands::Run {
            name,
            os_version,
            command,
        } => run(&resolver, name.as_deref(), os_version.as_deref(), command),
        Commands::List { family } => {
            print_registry(&resolver, *family)?;
            Ok(0)
        }
    }
}

fn print_distribution(code: &str, os: &Distribution) -> Result<()> {
    if get_output_format() == OutputFormat::Json {
        let data = serde_json::to_value(os).context("serializing distribution")?;
        emit(Level::Success, code, &os.to_string(), Some(data));
        return Ok(());
    }

    emit(Level::Success, code, &os.to_string(), None);
    let rows = [
        ("Name", os.name()),
        ("Version", os.version()),
        ("Family", os.family().name()),
        ("Identifier", os.identifier()),
    ];
    for (label, value) in rows {
        emit(Level::Info, code, &format!("  {: <12}{}", label, value), None);
    }
    if !os.command_translations().is_empty() {
        emit(Level::Info, code, "  Commands:", None);
        for (from, to) in os.command_translations() {
            emit(Level::Info, code, &format!("    {from} -> {to}"), None);
        }
    }
    Ok(())
}

fn print_candidates(list: &[String]) -> Result<()> {
    if get_output_format() == OutputFormat::Json {
        let data = serde_json::to_value(list).context("serializing candidates")?;
        emit(Level::Info, "candidates.result", &list.join(", "), Some(data));
        return Ok(());
    }
    for candidate in list {
        emit(Level::Info, "candidates.result", candidate, None);
    }
    Ok(())
}

fn print_registry(resolver: &Resolver, only: Option<PlatformFamily>) -> Result<()> {
    let families: Vec<PlatformFamily> = match only {
        Some(family) => vec![family],
        None => PlatformFamily::PRIORITY.to_vec(),
    };

    if get_output_format() == OutputFormat::Json {
        let entries: Vec<serde_json::Value> = families
            .iter()
            .flat_map(|family| {
                resolver.registry().descriptors(*family).map(move |d| {
                    serde_json::json!({
                        "family": family,
                        "identifier": d.identifier(),
                        "match": d.describe(),
                        "commands": d.commands(),
                    })
                })
            })
            .collect();
        emit(
            Level::Info,
            "list.result",
            &format!("{} distributions", entries.len()),
            Some(serde_json::Value::Array(entries)),
        );
        return Ok(());
    }

    let header = format!(
        "{: <10} {: <14} {}",
        "Family".bold(),
        "Identifier".bold(),
        "Match".bold()
    );
    emit(Level::Info, "list.header", &header, None);
    for family in families {
        for descriptor in resolver.registry().descriptors(family) {
            let line = format!(
                "{: <10} {: <14} {}",
                family.name(),
                descriptor.identifier(),
                descriptor.describe()
            );
            emit(Level::Info, "list.row", &line, None);
        }
    }
    Ok(())
}

fn run(
    resolver: &Resolver,
    name: Option<&str>,
    version: Option<&str>,
    command: &[String],
) -> Result<i32> {
    let os = resolver.get_os(name, version)?;
    let command_line = shell_words::join(command);

    // A single word is a full command line; several words are already an argv
    let result = match command {
        [line] => os.run_command(line),
        [binary, args @ ..] => os.run(binary, args),
        [] => os.run_command(""),
    };

    match result {
        Ok(output) => {
            if get_output_format() == OutputFormat::Json {
                let data = serde_json::to_value(&output).context("serializing command output")?;
                emit(Level::Success, "run.result", &command_line, Some(data));
            } else {
                print!("{}", output.stdout);
                eprint!("{}", output.stderr);
            }
            Ok(0)
        }
        Err(OsError::CommandExecution(CommandError::NonZeroExit {
            binary,
            code,
            stdout,
            stderr,
        })) => {
            if get_output_format() == OutputFormat::Json {
                let data = serde_json::json!({
                    "binary": binary,
                    "exit_code": code,
                    "stdout": stdout,
                    "stderr": stderr,
                });
                emit(Level::Error, "run.failed", &command_line, Some(data));
            } else {
                print!("{stdout}");
                eprint!("{stderr}");
            }
            Ok(code.unwrap_or(1))
        }
        Err(e) => Err(e).with_context(|| format!("running '{command_line}' on {os}")),
    }
}
