mod common;

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use common::{RecordingRunner, resolver_for};
use osdetect::{
    CommandError, CommandOutput, Config, DistributionDescriptor, HostInfo, OsError,
    PlatformFamily, Registry, StaticHost,
};

/// A Darwin-looking host whose issue file cannot be read.
#[derive(Default)]
struct UnreadableIssueHost {
    kernel_queries: AtomicUsize,
}

impl HostInfo for UnreadableIssueHost {
    fn kernel_name(&self) -> io::Result<String> {
        self.kernel_queries.fetch_add(1, Ordering::SeqCst);
        Ok("Darwin".to_string())
    }

    fn kernel_release(&self) -> io::Result<String> {
        self.kernel_queries.fetch_add(1, Ordering::SeqCst);
        Ok("24.0.0".to_string())
    }

    fn read_file(&self, _path: &Path) -> io::Result<Option<String>> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"))
    }
}

#[test]
fn test_builtin_ubuntu_host() {
    let host = StaticHost::new("Linux", "5.15.0-91-generic")
        .with_file("/etc/issue", "Ubuntu 22.04.3 LTS \\n \\l\n\n");
    let resolver = resolver_for(Registry::builtin(), host, Arc::new(RecordingRunner::new()));

    let os = resolver.detect_os().unwrap();
    assert_eq!(os.family(), PlatformFamily::Linux);
    assert_eq!(os.identifier(), "Ubuntu");
    assert_eq!(os.name(), "Ubuntu");
    assert_eq!(os.version(), "22.04.3");
}

#[test]
fn test_builtin_darwin_hosts() {
    let runner = Arc::new(RecordingRunner::new());

    let mavericks = resolver_for(Registry::builtin(), StaticHost::new("Darwin", "13.0.0"), runner.clone())
        .detect_os()
        .unwrap();
    assert_eq!(mavericks.identifier(), "Mavericks");
    assert_eq!(mavericks.version(), "13.0");

    let unmapped = resolver_for(Registry::builtin(), StaticHost::new("Darwin", "22.1.0"), runner)
        .detect_os()
        .unwrap();
    assert_eq!(unmapped.identifier(), "Generic");
    assert_eq!(unmapped.name(), "Darwin");
    assert_eq!(unmapped.version(), "22.1");
    assert_eq!(unmapped.translate("md5sum"), "/sbin/md5");
}

#[test]
fn test_unrecognised_linux_is_not_detected_by_default() {
    let host = StaticHost::new("Linux", "6.1.0").with_file("/etc/issue", "Welcome to SomethingOS\n");
    let resolver = resolver_for(Registry::builtin(), host, Arc::new(RecordingRunner::new()));
    assert!(matches!(resolver.detect_os(), Err(OsError::Detection)));
}

#[test]
fn test_config_generic_linux_fallback() {
    let config = Config::parse("linux_fallback = \"generic\"\n").unwrap();
    let host = StaticHost::new("Linux", "6.1.0").with_file("/etc/issue", "Welcome to SomethingOS\n");
    let resolver = resolver_for(config.registry().unwrap(), host, Arc::new(RecordingRunner::new()))
        .with_options(config.resolver_options());

    let os = resolver.detect_os().unwrap();
    assert_eq!(os.identifier(), "Generic");
    assert_eq!(os.name(), "Linux");
    assert_eq!(os.version(), "6.1");
}

#[test]
fn test_run_command_uses_translation() {
    let registry = Registry::new()
        .with_default_command(PlatformFamily::Linux, "ifconfig", "/sbin/ifconfig")
        .with(PlatformFamily::Linux, DistributionDescriptor::versioned("Test", "1.0"));
    let runner = Arc::new(RecordingRunner::new());
    let resolver = resolver_for(Arc::new(registry), StaticHost::default(), runner.clone());

    let os = resolver.from_distribution("Test", "1.0", None).unwrap();
    os.run_command("ifconfig -a").unwrap();

    assert_eq!(
        runner.calls(),
        vec![("/sbin/ifconfig".to_string(), vec!["-a".to_string()])]
    );
}

#[test]
fn test_run_command_returns_output_verbatim() {
    let runner = Arc::new(RecordingRunner::with_output(CommandOutput {
        stdout: "  eth0: flags=4163<UP>\n\n".to_string(),
        stderr: String::new(),
        exit_code: Some(0),
    }));
    let resolver = resolver_for(Registry::builtin(), StaticHost::default(), runner);

    let os = resolver.from_distribution("Debian", "12", None).unwrap();
    let output = os.run_command("ifconfig").unwrap();
    assert_eq!(output.stdout, "  eth0: flags=4163<UP>\n\n");
}

#[test]
fn test_run_command_surfaces_failure() {
    let runner = Arc::new(RecordingRunner::with_output(CommandOutput {
        stdout: String::new(),
        stderr: "ifconfig: interface eth9 does not exist\n".to_string(),
        exit_code: Some(1),
    }));
    let resolver = resolver_for(Registry::builtin(), StaticHost::default(), runner);

    let os = resolver.from_distribution("Debian", "12", None).unwrap();
    let err = os.run_command("ifconfig eth9").unwrap_err();
    match err {
        OsError::CommandExecution(e @ CommandError::NonZeroExit { .. }) => {
            assert_eq!(e.exit_code(), Some(1));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_concurrent_detection() {
    let host = StaticHost::new("Darwin", "24.0.0");
    let resolver = Arc::new(resolver_for(
        Registry::builtin(),
        host,
        Arc::new(RecordingRunner::new()),
    ));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            thread::spawn(move || resolver.detect_os().map(|os| os.identifier().to_string()))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), "Sequoia");
    }
}

#[test]
fn test_unreadable_issue_file_is_an_error() {
    let host = Arc::new(UnreadableIssueHost::default());
    let resolver = osdetect::Resolver::new(
        Registry::builtin(),
        host.clone(),
        Arc::new(RecordingRunner::new()),
    );

    match resolver.detect_os() {
        Err(OsError::HostInfo(e)) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
        other => panic!("unexpected result: {other:?}"),
    }
    // Darwin must not be tried after a Linux read failure
    assert_eq!(host.kernel_queries.load(Ordering::SeqCst), 0);
}
