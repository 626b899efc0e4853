use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};

use crate::error::OsError;

/// Identifier of the fallback descriptor of a family.
pub const GENERIC_IDENTIFIER: &str = "Generic";

/// Name and version read out of an issue file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedIssue {
    pub name: String,
    pub version: String,
}

impl ParsedIssue {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Recognises one distribution from the contents of its issue file.
pub trait IssueFileMatcher: fmt::Debug + Send + Sync {
    fn matches(&self, contents: &str) -> bool {
        self.parse(contents).is_some()
    }

    fn parse(&self, contents: &str) -> Option<ParsedIssue>;

    /// Short human readable form, used when listing the registry.
    fn describe(&self) -> String {
        "custom matcher".to_string()
    }
}

/// Regex based matcher. The pattern may capture `version` and `name`; when
/// `name` is not captured the fixed name is used, and a missing `version`
/// yields an empty version.
#[derive(Debug, Clone)]
pub struct IssuePattern {
    name: String,
    pattern: Regex,
}

impl IssuePattern {
    /// `^` and `$` match at line boundaries.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern).multi_line(true).build()?;
        Ok(Self {
            name: name.into(),
            pattern,
        })
    }
}

impl IssueFileMatcher for IssuePattern {
    fn matches(&self, contents: &str) -> bool {
        self.pattern.is_match(contents)
    }

    fn parse(&self, contents: &str) -> Option<ParsedIssue> {
        let caps = self.pattern.captures(contents)?;
        let name = caps
            .name("name")
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| self.name.clone());
        let version = caps
            .name("version")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        Some(ParsedIssue { name, version })
    }

    fn describe(&self) -> String {
        format!("/{}/", self.pattern.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum DescriptorKind {
    /// Matched by exact equality with the kernel's major.minor release.
    Versioned(String),
    /// Matched against the issue file contents.
    IssueFile(Arc<dyn IssueFileMatcher>),
    /// Fallback for a family; never matched structurally.
    Generic,
}

/// One known distribution within a platform family.
#[derive(Debug, Clone)]
pub struct DistributionDescriptor {
    identifier: String,
    kind: DescriptorKind,
    commands: BTreeMap<String, String>,
}

impl DistributionDescriptor {
    fn with_kind(identifier: impl Into<String>, kind: DescriptorKind) -> Self {
        Self {
            identifier: identifier.into(),
            kind,
            commands: BTreeMap::new(),
        }
    }

    pub fn versioned(identifier: impl Into<String>, version: impl Into<String>) -> Self {
        Self::with_kind(identifier, DescriptorKind::Versioned(version.into()))
    }

    pub fn issue_file(
        identifier: impl Into<String>,
        matcher: impl IssueFileMatcher + 'static,
    ) -> Self {
        Self::with_kind(identifier, DescriptorKind::IssueFile(Arc::new(matcher)))
    }

    /// Issue file descriptor backed by an [`IssuePattern`].
    pub fn issue_pattern(
        identifier: impl Into<String>,
        name: impl Into<String>,
        pattern: &str,
    ) -> Result<Self, OsError> {
        let identifier = identifier.into();
        let matcher = IssuePattern::new(name, pattern).map_err(|source| OsError::InvalidPattern {
            identifier: identifier.clone(),
            source,
        })?;
        Ok(Self::issue_file(identifier, matcher))
    }

    pub fn generic() -> Self {
        Self::with_kind(GENERIC_IDENTIFIER, DescriptorKind::Generic)
    }

    /// Add a command translation that applies on top of the family defaults.
    pub fn with_command(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.commands.insert(from.into(), to.into());
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn commands(&self) -> &BTreeMap<String, String> {
        &self.commands
    }

    /// Fixed version of a versioned descriptor.
    pub fn version(&self) -> Option<&str> {
        match &self.kind {
            DescriptorKind::Versioned(version) => Some(version),
            _ => None,
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(self.kind, DescriptorKind::Generic)
    }

    pub fn matches_issue_file(&self, contents: &str) -> bool {
        match &self.kind {
            DescriptorKind::IssueFile(matcher) => matcher.matches(contents),
            _ => false,
        }
    }

    pub fn parse_issue_file(&self, contents: &str) -> Option<ParsedIssue> {
        match &self.kind {
            DescriptorKind::IssueFile(matcher) => matcher.parse(contents),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        match &self.kind {
            DescriptorKind::Versioned(version) => format!("release {version}"),
            DescriptorKind::IssueFile(matcher) => matcher.describe(),
            DescriptorKind::Generic => "fallback".to_string(),
        }
    }
}
