use super::{DistributionDescriptor, PlatformFamily, Registry};

const DARWIN_RELEASES: &[(&str, &str)] = &[
    ("Mavericks", "13.0"),
    ("Yosemite", "14.0"),
    ("ElCapitan", "15.0"),
    ("Sierra", "16.0"),
    ("HighSierra", "17.0"),
    ("Mojave", "18.0"),
    ("Catalina", "19.0"),
    ("BigSur", "20.0"),
    ("Monterey", "21.0"),
    ("Ventura", "22.0"),
    ("Sonoma", "23.0"),
    ("Sequoia", "24.0"),
    ("Tahoe", "25.0"),
];

// (identifier, name, pattern)
const LINUX_ISSUE_PATTERNS: &[(&str, &str, &str)] = &[
    ("Alpine", "Alpine", r"^Welcome to Alpine Linux (?P<version>\d+(?:\.\d+)*)"),
    ("ArchLinux", "ArchLinux", r"^Arch Linux\b"),
    (
        "CentOS",
        "CentOS",
        r"^CentOS(?: Linux| Stream)? release (?P<version>\d+(?:\.\d+)*)",
    ),
    ("Debian", "Debian", r"^Debian GNU/Linux(?: (?P<version>\d+(?:\.\d+)*))?"),
    ("Fedora", "Fedora", r"^Fedora(?: Linux)? release (?P<version>\d+)"),
    (
        "OpenSUSE",
        "OpenSUSE",
        r"^Welcome to openSUSE(?: Leap| Tumbleweed)?(?: (?P<version>\d+(?:\.\d+)*))?",
    ),
    (
        "RedHat",
        "RedHat",
        r"^Red Hat Enterprise Linux(?: \w+)? release (?P<version>\d+(?:\.\d+)*)",
    ),
    ("Ubuntu", "Ubuntu", r"^Ubuntu (?P<version>\d+(?:\.\d+)*)"),
];

fn issue_pattern(identifier: &str, name: &str, pattern: &str) -> DistributionDescriptor {
    DistributionDescriptor::issue_pattern(identifier, name, pattern)
        .expect("built-in issue patterns are valid")
}

pub(super) fn registry() -> Registry {
    let mut registry = Registry::new()
        .with_default_command(PlatformFamily::Linux, "ifconfig", "/sbin/ifconfig")
        .with_default_command(PlatformFamily::Linux, "route", "/sbin/route")
        .with_default_command(PlatformFamily::Darwin, "ifconfig", "/sbin/ifconfig")
        .with_default_command(PlatformFamily::Darwin, "route", "/sbin/route")
        .with_default_command(PlatformFamily::Darwin, "md5sum", "/sbin/md5")
        .with(PlatformFamily::Linux, DistributionDescriptor::generic())
        .with(PlatformFamily::Darwin, DistributionDescriptor::generic());

    for (identifier, version) in DARWIN_RELEASES {
        registry.register(
            PlatformFamily::Darwin,
            DistributionDescriptor::versioned(*identifier, *version),
        );
    }

    for (identifier, name, pattern) in LINUX_ISSUE_PATTERNS {
        let mut descriptor = issue_pattern(identifier, name, pattern);
        if matches!(*identifier, "CentOS" | "Fedora" | "RedHat") {
            descriptor = descriptor.with_command("service", "/sbin/service");
        }
        if *identifier == "ArchLinux" {
            descriptor = descriptor.with_command("ifconfig", "/usr/bin/ifconfig");
        }
        registry.register(PlatformFamily::Linux, descriptor);
    }

    // Release specific entries, reachable through candidate lookup
    registry.register(
        PlatformFamily::Linux,
        DistributionDescriptor::versioned("Ubuntu14", "14.04")
            .with_command("initctl", "/sbin/initctl"),
    );
    registry.register(
        PlatformFamily::Linux,
        DistributionDescriptor::versioned("CentOS6", "6")
            .with_command("service", "/sbin/service")
            .with_command("chkconfig", "/sbin/chkconfig"),
    );

    registry
}
