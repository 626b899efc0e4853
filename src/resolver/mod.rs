//! Distribution resolution.
//!
//! Families are probed in [`PlatformFamily::PRIORITY`] order and the first one
//! that recognises the host wins. A family that does not recognise the host
//! reports `Ok(None)`; only "no family matched" surfaces as an error.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::candidates;
use crate::command::{CommandRunner, DuctRunner};
use crate::distribution::Distribution;
use crate::error::OsError;
use crate::host::{HostInfo, SystemHost};
use crate::registry::{DistributionDescriptor, PlatformFamily, Registry};
use crate::ui;

mod darwin;
mod linux;

pub const DEFAULT_ISSUE_FILE: &str = "/etc/issue";

/// What a present family does when none of its descriptors match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Report the family as not present so the next family is tried.
    #[default]
    FallThrough,
    /// Resolve to the family's `Generic` descriptor.
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    pub issue_file: PathBuf,
    pub linux_fallback: FallbackPolicy,
    pub darwin_fallback: FallbackPolicy,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            issue_file: PathBuf::from(DEFAULT_ISSUE_FILE),
            linux_fallback: FallbackPolicy::FallThrough,
            darwin_fallback: FallbackPolicy::Generic,
        }
    }
}

impl ResolverOptions {
    pub fn fallback(&self, family: PlatformFamily) -> FallbackPolicy {
        match family {
            PlatformFamily::Linux => self.linux_fallback,
            PlatformFamily::Darwin => self.darwin_fallback,
        }
    }
}

pub struct Resolver {
    registry: Arc<Registry>,
    host: Arc<dyn HostInfo>,
    runner: Arc<dyn CommandRunner>,
    options: ResolverOptions,
}

impl Resolver {
    pub fn new(
        registry: Arc<Registry>,
        host: Arc<dyn HostInfo>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            registry,
            host,
            runner,
            options: ResolverOptions::default(),
        }
    }

    /// Built-in registry, the local machine and a `duct` runner.
    pub fn system() -> Self {
        Self::new(
            Registry::builtin(),
            Arc::new(SystemHost),
            Arc::new(DuctRunner::new()),
        )
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Build the named distribution, or detect the host when no name is given.
    pub fn get_os(&self, name: Option<&str>, version: Option<&str>) -> Result<Distribution, OsError> {
        match name {
            Some(name) if !name.is_empty() => {
                self.from_distribution(name, version.unwrap_or_default(), None)
            }
            _ => self.detect_os(),
        }
    }

    pub fn detect_os(&self) -> Result<Distribution, OsError> {
        for family in PlatformFamily::PRIORITY {
            if let Some(distribution) = self.detect_family(family)? {
                ui::debug(
                    "detect.resolved",
                    &format!("Detected {distribution}"),
                );
                return Ok(distribution);
            }
            ui::debug("detect.family.absent", &format!("{family} not present"));
        }
        Err(OsError::Detection)
    }

    /// `Ok(None)` when the family does not recognise the host.
    pub fn detect_family(&self, family: PlatformFamily) -> Result<Option<Distribution>, OsError> {
        match family {
            PlatformFamily::Linux => self.detect_linux(),
            PlatformFamily::Darwin => self.detect_darwin(),
        }
    }

    /// Build a distribution from a name and version.
    ///
    /// With an explicit `identifier` only that identifier is tried; otherwise
    /// the candidates from [`candidates::generate`] are tried most specific
    /// first. Every family is searched for each candidate, in priority order.
    pub fn from_distribution(
        &self,
        name: &str,
        version: &str,
        identifier: Option<&str>,
    ) -> Result<Distribution, OsError> {
        let possible = match identifier {
            Some(identifier) => vec![identifier.to_string()],
            None => candidates::generate(name, version),
        };

        for candidate in &possible {
            if let Some((family, descriptor)) = self.registry.find(candidate) {
                ui::debug(
                    "resolve.candidate.hit",
                    &format!("{name} {version}: using {family}/{candidate}"),
                );
                return Ok(self.build(family, descriptor, name, version));
            }
        }

        ui::debug(
            "resolve.candidate.miss",
            &format!("{name} {version}: none of {possible:?} is registered"),
        );
        Err(OsError::UnknownDistribution {
            name: name.to_string(),
            version: version.to_string(),
        })
    }

    fn build(
        &self,
        family: PlatformFamily,
        descriptor: &DistributionDescriptor,
        name: &str,
        version: &str,
    ) -> Distribution {
        Distribution::new(
            family,
            descriptor.identifier(),
            name,
            version,
            self.registry.command_translations(family, descriptor),
            Arc::clone(&self.runner),
        )
    }

    /// Resolve to the family's generic descriptor, if the registry has one.
    fn generic(&self, family: PlatformFamily, name: &str, version: &str) -> Option<Distribution> {
        match self.registry.generic(family) {
            Some(descriptor) => {
                ui::debug(
                    "detect.generic",
                    &format!("{family}: no known release matches {version:?}, using generic"),
                );
                Some(self.build(family, descriptor, name, version))
            }
            None => {
                ui::debug(
                    "detect.generic.missing",
                    &format!("{family}: no generic descriptor registered"),
                );
                None
            }
        }
    }
}
