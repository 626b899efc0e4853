//! Candidate distribution identifiers, most specific first.

/// Build the identifiers to try for a distribution name and version.
///
/// Always returns three entries: name plus the version without dots, name
/// plus the major version, then the bare name. Duplicates are kept; the first
/// registry hit wins, so they only cost an extra lookup.
///
/// ```
/// assert_eq!(
///     osdetect::candidates::generate("Ubuntu", "14.04"),
///     vec!["Ubuntu1404", "Ubuntu14", "Ubuntu"]
/// );
/// ```
pub fn generate(name: &str, version: &str) -> Vec<String> {
    let full_version = version.replace('.', "");
    let major_version = version.split('.').next().unwrap_or_default();

    vec![
        format!("{name}{full_version}"),
        format!("{name}{major_version}"),
        name.to_string(),
    ]
}

/// Keep the first two dot-separated segments of a release string.
/// "22.1.0" becomes "22.1"; a release without dots is returned unchanged.
pub fn major_minor(release: &str) -> String {
    release
        .trim()
        .splitn(3, '.')
        .take(2)
        .collect::<Vec<_>>()
        .join(".")
}
