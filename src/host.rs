//! Host information providers.
//!
//! The resolver never talks to the OS directly. It asks a [`HostInfo`] for the
//! kernel name, the kernel release and the contents of release files.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

pub trait HostInfo: Send + Sync {
    /// Kernel name as reported by `uname -s` (e.g. "Linux", "Darwin").
    fn kernel_name(&self) -> io::Result<String>;

    /// Kernel release as reported by `uname -r` (e.g. "22.1.0").
    fn kernel_release(&self) -> io::Result<String>;

    /// Read a file as text. `Ok(None)` means the file does not exist.
    fn read_file(&self, path: &Path) -> io::Result<Option<String>>;
}

/// The machine this process runs on.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl HostInfo for SystemHost {
    fn kernel_name(&self) -> io::Result<String> {
        let uts = nix::sys::utsname::uname()?;
        Ok(uts.sysname().to_string_lossy().into_owned())
    }

    fn kernel_release(&self) -> io::Result<String> {
        let uts = nix::sys::utsname::uname()?;
        Ok(uts.release().to_string_lossy().into_owned())
    }

    fn read_file(&self, path: &Path) -> io::Result<Option<String>> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// A host described entirely by data. Useful for tests and for resolving a
/// machine from captured `uname` output and release files.
#[derive(Debug, Default, Clone)]
pub struct StaticHost {
    kernel_name: String,
    kernel_release: String,
    files: HashMap<PathBuf, String>,
}

impl StaticHost {
    pub fn new(kernel_name: impl Into<String>, kernel_release: impl Into<String>) -> Self {
        Self {
            kernel_name: kernel_name.into(),
            kernel_release: kernel_release.into(),
            files: HashMap::new(),
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }
}

impl HostInfo for StaticHost {
    fn kernel_name(&self) -> io::Result<String> {
        Ok(self.kernel_name.clone())
    }

    fn kernel_release(&self) -> io::Result<String> {
        Ok(self.kernel_release.clone())
    }

    fn read_file(&self, path: &Path) -> io::Result<Option<String>> {
        Ok(self.files.get(path).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_host_missing_file() {
        let host = StaticHost::new("Linux", "6.1.0");
        assert_eq!(host.read_file(Path::new("/etc/issue")).unwrap(), None);
    }

    #[test]
    fn test_static_host_file() {
        let host = StaticHost::new("Linux", "6.1.0").with_file("/etc/issue", "Debian GNU/Linux 12");
        assert_eq!(
            host.read_file(Path::new("/etc/issue")).unwrap().as_deref(),
            Some("Debian GNU/Linux 12")
        );
        assert_eq!(host.kernel_name().unwrap(), "Linux");
        assert_eq!(host.kernel_release().unwrap(), "6.1.0");
    }

    #[test]
    fn test_system_host_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issue");
        std::fs::write(&path, "Ubuntu 22.04.3 LTS \\n \\l\n").unwrap();

        let contents = SystemHost.read_file(&path).unwrap();
        assert_eq!(contents.as_deref(), Some("Ubuntu 22.04.3 LTS \\n \\l\n"));
        assert_eq!(SystemHost.read_file(&dir.path().join("missing")).unwrap(), None);
    }

    #[test]
    fn test_system_host_kernel_name() {
        let name = SystemHost.kernel_name().unwrap();
        assert!(!name.is_empty());
    }
}
