use crate::candidates;
use crate::distribution::Distribution;
use crate::error::OsError;
use crate::registry::PlatformFamily;
use crate::ui;

use super::{FallbackPolicy, Resolver};

const DARWIN_KERNEL: &str = "Darwin";

impl Resolver {
    /// Recognise a Darwin host from its kernel release (major.minor only).
    pub(super) fn detect_darwin(&self) -> Result<Option<Distribution>, OsError> {
        let kernel_name = self.host.kernel_name()?;
        if kernel_name != DARWIN_KERNEL {
            return Ok(None);
        }

        let version = candidates::major_minor(&self.host.kernel_release()?);

        let matched = self
            .registry
            .descriptors(PlatformFamily::Darwin)
            .find(|descriptor| descriptor.version() == Some(version.as_str()));

        if let Some(descriptor) = matched {
            ui::debug(
                "detect.darwin.matched",
                &format!("Darwin {version} is {}", descriptor.identifier()),
            );
            return Ok(Some(self.build(
                PlatformFamily::Darwin,
                descriptor,
                DARWIN_KERNEL,
                &version,
            )));
        }

        match self.options.fallback(PlatformFamily::Darwin) {
            FallbackPolicy::Generic => Ok(self.generic(PlatformFamily::Darwin, DARWIN_KERNEL, &version)),
            FallbackPolicy::FallThrough => {
                ui::debug(
                    "detect.darwin.unrecognised",
                    &format!("No known Darwin release matches {version}"),
                );
                Ok(None)
            }
        }
    }
}
