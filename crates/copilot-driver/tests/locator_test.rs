use copilot_driver::{CandidateSource, ExecutableLocator, RegistryLookup};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

struct NoRegistry;

impl RegistryLookup for NoRegistry {
    fn open_command_values(&self) -> Vec<String> {
        Vec::new()
    }
}

struct CannedRegistry(Vec<String>);

impl RegistryLookup for CannedRegistry {
    fn open_command_values(&self) -> Vec<String> {
        self.0.clone()
    }
}

/// Put an executable `code` launcher into `dir`.
fn install_alias(dir: &Path) -> PathBuf {
    #[cfg(windows)]
    let path = dir.join("code.cmd");
    #[cfg(not(windows))]
    let path = dir.join("code");

    fs::write(&path, "@echo off\n").unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }
    path
}

#[test]
fn test_path_alias_beats_known_install() {
    let bin = tempfile::tempdir().unwrap();
    let alias = install_alias(bin.path());

    let locator = ExecutableLocator::new(
        Some(OsString::from(bin.path())),
        bin.path().to_path_buf(),
        Some("alice".into()),
        NoRegistry,
    )
    // every fixed path "exists", yet PATH must still win
    .with_exists_check(|_| true);

    let found = locator.locate().unwrap();
    assert_eq!(found.source, CandidateSource::PathAlias);
    assert_eq!(
        fs::canonicalize(found.path).unwrap(),
        fs::canonicalize(alias).unwrap()
    );
}

// Real install paths may exist on a Windows host
#[cfg(not(windows))]
#[test]
fn test_empty_path_falls_through_to_registry() {
    let bin = tempfile::tempdir().unwrap();
    let exe = bin.path().join("Code.exe");
    fs::write(&exe, b"").unwrap();

    let registry = CannedRegistry(vec![format!("\"{}\" \"%1\"", exe.display())]);
    let locator = ExecutableLocator::new(
        Some(OsString::from(bin.path())),
        bin.path().to_path_buf(),
        Some("nobody-with-this-name".into()),
        registry,
    );

    // no `code` alias in the directory and no fixed path on this host
    let found = locator.locate().unwrap();
    assert_eq!(found.source, CandidateSource::Registry);
    assert_eq!(found.path, exe);
}

#[test]
fn test_manual_path_must_exist_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let exe = dir.path().join("Code.exe");
    fs::write(&exe, b"").unwrap();

    let locator = ExecutableLocator::new(None, dir.path().to_path_buf(), None, NoRegistry);
    let found = locator
        .accept_manual(&format!("\"{}\"", exe.display()))
        .unwrap();
    assert_eq!(found.source, CandidateSource::Manual);
    assert!(locator
        .accept_manual(&dir.path().join("nope.exe").display().to_string())
        .is_none());
}
