//! User configuration.
//!
//! ```toml
//! issue_file = "/etc/issue"
//! linux_fallback = "fall-through"
//! darwin_fallback = "generic"
//! command_timeout_secs = 30
//!
//! [commands.linux]
//! ip = "/usr/sbin/ip"
//!
//! [[darwin]]
//! identifier = "Tahoe"
//! version = "25.0"
//!
//! [[linux]]
//! identifier = "Rocky"
//! name = "Rocky"
//! pattern = '^Rocky Linux release (?P<version>[\d.]+)'
//! commands = { service = "/usr/sbin/service" }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::command::DuctRunner;
use crate::host::SystemHost;
use crate::registry::{DistributionDescriptor, PlatformFamily, Registry};
use crate::resolver::{DEFAULT_ISSUE_FILE, FallbackPolicy, Resolver, ResolverOptions};

fn default_issue_file() -> String {
    DEFAULT_ISSUE_FILE.to_string()
}

fn default_darwin_fallback() -> FallbackPolicy {
    FallbackPolicy::Generic
}

/// Family-wide command translations, layered over the built-in defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FamilyCommands {
    #[serde(default)]
    pub linux: BTreeMap<String, String>,
    #[serde(default)]
    pub darwin: BTreeMap<String, String>,
}

impl FamilyCommands {
    pub fn is_empty(&self) -> bool {
        self.linux.is_empty() && self.darwin.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = (PlatformFamily, &BTreeMap<String, String>)> {
        [
            (PlatformFamily::Linux, &self.linux),
            (PlatformFamily::Darwin, &self.darwin),
        ]
        .into_iter()
    }
}

/// An extra Darwin release, matched on the kernel's major.minor.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DarwinRelease {
    pub identifier: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub commands: BTreeMap<String, String>,
}

/// An extra Linux distribution, recognised by a regex over the issue file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LinuxIssuePattern {
    pub identifier: String,
    pub name: String,
    pub pattern: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub commands: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_issue_file")]
    pub issue_file: String,
    #[serde(default)]
    pub linux_fallback: FallbackPolicy,
    #[serde(default = "default_darwin_fallback")]
    pub darwin_fallback: FallbackPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "FamilyCommands::is_empty")]
    pub commands: FamilyCommands,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub darwin: Vec<DarwinRelease>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linux: Vec<LinuxIssuePattern>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            issue_file: default_issue_file(),
            linux_fallback: FallbackPolicy::FallThrough,
            darwin_fallback: default_darwin_fallback(),
            command_timeout_secs: None,
            commands: FamilyCommands::default(),
            darwin: Vec::new(),
            linux: Vec::new(),
        }
    }
}

/// `<config dir>/osdetect/config.toml`
pub fn config_file_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Unable to determine user config directory")?;
    Ok(dir.join("osdetect").join("config.toml"))
}

impl Config {
    /// Load the user's config file, falling back to defaults when it does not exist.
    pub fn load() -> Result<Config> {
        let path = config_file_path()?;
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Config> {
        let s = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&s).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(s: &str) -> Result<Config> {
        toml::from_str(s).context("parsing config toml")
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serializing config to toml")
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }
        fs::write(path, self.to_toml()?)
            .with_context(|| format!("writing config {}", path.display()))
    }

    pub fn issue_file_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.issue_file).into_owned())
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            issue_file: self.issue_file_path(),
            linux_fallback: self.linux_fallback,
            darwin_fallback: self.darwin_fallback,
        }
    }

    /// Add the configured descriptors and translations to `registry`.
    /// Configured entries replace built-in ones with the same identifier.
    pub fn apply_to(&self, registry: &mut Registry) -> Result<()> {
        for (family, commands) in self.commands.iter() {
            for (from, to) in commands {
                registry.set_default_command(family, from, to);
            }
        }

        for release in &self.darwin {
            let descriptor = release.commands.iter().fold(
                DistributionDescriptor::versioned(&release.identifier, &release.version),
                |d, (from, to)| d.with_command(from, to),
            );
            registry.register(PlatformFamily::Darwin, descriptor);
        }

        for entry in &self.linux {
            let descriptor =
                DistributionDescriptor::issue_pattern(&entry.identifier, &entry.name, &entry.pattern)?;
            let descriptor = entry
                .commands
                .iter()
                .fold(descriptor, |d, (from, to)| d.with_command(from, to));
            registry.register(PlatformFamily::Linux, descriptor);
        }

        Ok(())
    }

    /// The built-in registry extended by this config.
    pub fn registry(&self) -> Result<Arc<Registry>> {
        if self.commands.is_empty() && self.darwin.is_empty() && self.linux.is_empty() {
            return Ok(Registry::builtin());
        }
        let mut registry = Registry::builtin().as_ref().clone();
        self.apply_to(&mut registry)?;
        Ok(Arc::new(registry))
    }

    /// A resolver for the local machine using this config.
    pub fn system_resolver(&self) -> Result<Resolver> {
        let runner = match self.command_timeout() {
            Some(timeout) => DuctRunner::with_timeout(timeout),
            None => DuctRunner::new(),
        };
        Ok(
            Resolver::new(self.registry()?, Arc::new(SystemHost), Arc::new(runner))
                .with_options(self.resolver_options()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.resolver_options(), ResolverOptions::default());
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
issue_file = "/tmp/issue"
linux_fallback = "generic"
darwin_fallback = "fall-through"
command_timeout_secs = 5

[commands.linux]
ip = "/usr/sbin/ip"

[[darwin]]
identifier = "Future"
version = "30.0"

[[linux]]
identifier = "Rocky"
name = "Rocky"
pattern = '^Rocky Linux release (?P<version>[\d.]+)'
commands = { service = "/usr/sbin/service" }
"#,
        )
        .unwrap();

        assert_eq!(config.linux_fallback, FallbackPolicy::Generic);
        assert_eq!(config.darwin_fallback, FallbackPolicy::FallThrough);
        assert_eq!(config.command_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.issue_file_path(), PathBuf::from("/tmp/issue"));

        let registry = config.registry().unwrap();
        assert_eq!(
            registry
                .get(PlatformFamily::Darwin, "Future")
                .and_then(|d| d.version()),
            Some("30.0")
        );
        let rocky = registry.get(PlatformFamily::Linux, "Rocky").unwrap();
        let parsed = rocky.parse_issue_file("Rocky Linux release 9.3 (Blue Onyx)").unwrap();
        assert_eq!(parsed.version, "9.3");

        let translations = registry.command_translations(PlatformFamily::Linux, rocky);
        assert_eq!(translations.get("ip").map(String::as_str), Some("/usr/sbin/ip"));
        assert_eq!(
            translations.get("service").map(String::as_str),
            Some("/usr/sbin/service")
        );
        // Built-ins are still there
        assert!(registry.get(PlatformFamily::Linux, "Ubuntu").is_some());
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let config = Config::parse(
            r#"
[[linux]]
identifier = "Broken"
name = "Broken"
pattern = "(unclosed"
"#,
        )
        .unwrap();
        let err = config.registry().unwrap_err();
        assert!(err.to_string().contains("Broken"));
    }

    #[test]
    fn test_unknown_fallback_rejected() {
        assert!(Config::parse("linux_fallback = \"sometimes\"").is_err());
    }

    #[test]
    fn test_unknown_command_family_rejected() {
        assert!(Config::parse("[commands.windows]\nipconfig = \"ipconfig.exe\"").is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.darwin.push(DarwinRelease {
            identifier: "Future".to_string(),
            version: "30.0".to_string(),
            commands: BTreeMap::new(),
        });
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_tilde_issue_file() {
        let config = Config {
            issue_file: "~/issue".to_string(),
            ..Default::default()
        };
        let path = config.issue_file_path();
        assert!(!path.starts_with("~"));
        assert!(path.ends_with("issue"));
    }
}
