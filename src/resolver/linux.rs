use crate::candidates;
use crate::distribution::Distribution;
use crate::error::OsError;
use crate::registry::PlatformFamily;
use crate::ui;

use super::{FallbackPolicy, Resolver};

impl Resolver {
    /// Recognise a Linux host from its issue file.
    pub(super) fn detect_linux(&self) -> Result<Option<Distribution>, OsError> {
        let issue_file = &self.options.issue_file;
        let Some(contents) = self.host.read_file(issue_file)? else {
            ui::debug(
                "detect.linux.no_issue_file",
                &format!("{} does not exist", issue_file.display()),
            );
            return Ok(None);
        };

        // First structural match wins; later descriptors are not consulted
        let matched = self
            .registry
            .descriptors(PlatformFamily::Linux)
            .find(|descriptor| descriptor.matches_issue_file(&contents));

        if let Some(descriptor) = matched
            && let Some(parsed) = descriptor.parse_issue_file(&contents)
        {
            ui::debug(
                "detect.linux.matched",
                &format!(
                    "{} matched as {} {:?}",
                    issue_file.display(),
                    descriptor.identifier(),
                    parsed.version
                ),
            );
            return match self.from_distribution(&parsed.name, &parsed.version, None) {
                Ok(distribution) => Ok(Some(distribution)),
                Err(OsError::UnknownDistribution { .. }) => Ok(Some(self.build(
                    PlatformFamily::Linux,
                    descriptor,
                    &parsed.name,
                    &parsed.version,
                ))),
                Err(e) => Err(e),
            };
        }

        match self.options.fallback(PlatformFamily::Linux) {
            FallbackPolicy::FallThrough => {
                ui::debug(
                    "detect.linux.unrecognised",
                    &format!("No known distribution matches {}", issue_file.display()),
                );
                Ok(None)
            }
            FallbackPolicy::Generic => {
                let version = candidates::major_minor(&self.host.kernel_release()?);
                Ok(self.generic(PlatformFamily::Linux, PlatformFamily::Linux.name(), &version))
            }
        }
    }
}
