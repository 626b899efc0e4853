//! Known distributions, keyed by platform family and identifier.
//!
//! Iteration within a family is lexicographic by identifier, which keeps
//! first-match detection reproducible.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

mod builtin;
mod descriptor;

pub use descriptor::{
    DescriptorKind, DistributionDescriptor, GENERIC_IDENTIFIER, IssueFileMatcher, IssuePattern,
    ParsedIssue,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformFamily {
    Linux,
    Darwin,
}

impl PlatformFamily {
    /// Order in which families are probed during detection and lookup.
    pub const PRIORITY: [PlatformFamily; 2] = [PlatformFamily::Linux, PlatformFamily::Darwin];

    pub fn name(self) -> &'static str {
        match self {
            PlatformFamily::Linux => "Linux",
            PlatformFamily::Darwin => "Darwin",
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlatformFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(PlatformFamily::Linux),
            "darwin" | "macos" => Ok(PlatformFamily::Darwin),
            other => Err(format!("unknown platform family '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct FamilyTable {
    default_commands: BTreeMap<String, String>,
    descriptors: BTreeMap<String, DistributionDescriptor>,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    families: BTreeMap<PlatformFamily, FamilyTable>,
}

lazy_static! {
    static ref BUILTIN: Arc<Registry> = Arc::new(builtin::registry());
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled-in table of known distributions.
    pub fn builtin() -> Arc<Registry> {
        Arc::clone(&BUILTIN)
    }

    /// Add a descriptor, replacing any with the same identifier in that family.
    pub fn register(
        &mut self,
        family: PlatformFamily,
        descriptor: DistributionDescriptor,
    ) -> Option<DistributionDescriptor> {
        self.families
            .entry(family)
            .or_default()
            .descriptors
            .insert(descriptor.identifier().to_string(), descriptor)
    }

    pub fn with(mut self, family: PlatformFamily, descriptor: DistributionDescriptor) -> Self {
        self.register(family, descriptor);
        self
    }

    pub fn set_default_command(
        &mut self,
        family: PlatformFamily,
        from: impl Into<String>,
        to: impl Into<String>,
    ) {
        self.families
            .entry(family)
            .or_default()
            .default_commands
            .insert(from.into(), to.into());
    }

    pub fn with_default_command(
        mut self,
        family: PlatformFamily,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.set_default_command(family, from, to);
        self
    }

    pub fn get(&self, family: PlatformFamily, identifier: &str) -> Option<&DistributionDescriptor> {
        self.families.get(&family)?.descriptors.get(identifier)
    }

    pub fn descriptors(
        &self,
        family: PlatformFamily,
    ) -> impl Iterator<Item = &DistributionDescriptor> + '_ {
        self.families
            .get(&family)
            .into_iter()
            .flat_map(|table| table.descriptors.values())
    }

    pub fn generic(&self, family: PlatformFamily) -> Option<&DistributionDescriptor> {
        self.get(family, GENERIC_IDENTIFIER)
            .filter(|descriptor| descriptor.is_generic())
    }

    /// Look an identifier up in every family, in priority order.
    pub fn find(&self, identifier: &str) -> Option<(PlatformFamily, &DistributionDescriptor)> {
        PlatformFamily::PRIORITY
            .into_iter()
            .find_map(|family| self.get(family, identifier).map(|d| (family, d)))
    }

    /// Family defaults overlaid with the descriptor's own translations.
    pub fn command_translations(
        &self,
        family: PlatformFamily,
        descriptor: &DistributionDescriptor,
    ) -> BTreeMap<String, String> {
        let mut translations = self
            .families
            .get(&family)
            .map(|table| table.default_commands.clone())
            .unwrap_or_default();
        translations.extend(
            descriptor
                .commands()
                .iter()
                .map(|(from, to)| (from.clone(), to.clone())),
        );
        translations
    }

    pub fn len(&self) -> usize {
        self.families.values().map(|t| t.descriptors.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
