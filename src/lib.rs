//! Detect the operating system distribution a process runs on.
//!
//! ```no_run
//! let os = osdetect::get_os(None, None)?;
//! println!("{} {}", os.name(), os.version());
//! let interfaces = os.run_command("ifconfig -a")?;
//! print!("{}", interfaces.stdout);
//! # Ok::<(), osdetect::OsError>(())
//! ```

pub mod candidates;
pub mod command;
pub mod config;
pub mod distribution;
pub mod error;
pub mod host;
pub mod registry;
pub mod resolver;
pub mod ui;

pub use command::{CommandOutput, CommandRunner, DuctRunner};
pub use config::Config;
pub use distribution::{Distribution, PreparedCommand};
pub use error::{CommandError, OsError};
pub use host::{HostInfo, StaticHost, SystemHost};
pub use registry::{DistributionDescriptor, PlatformFamily, Registry};
pub use resolver::{FallbackPolicy, Resolver, ResolverOptions};

/// Build the named distribution, or detect the local machine when `name` is `None`.
pub fn get_os(name: Option<&str>, version: Option<&str>) -> Result<Distribution, OsError> {
    Resolver::system().get_os(name, version)
}

/// Detect the local machine's distribution with the built-in registry.
pub fn detect_os() -> Result<Distribution, OsError> {
    Resolver::system().detect_os()
}
