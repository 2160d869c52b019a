//! Finding the VS Code executable
//!
//! Search order is fixed: the `code` alias on PATH, then well-known install
//! locations, then the registry "open with" command. The first candidate
//! that exists wins.

use crate::platforms;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Command alias VS Code installs on PATH
pub const EDITOR_ALIAS: &str = "code";

/// Where an executable path came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    PathAlias,
    KnownInstall,
    Registry,
    /// Typed in by the operator
    Manual,
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CandidateSource::PathAlias => "PATH",
            CandidateSource::KnownInstall => "install path",
            CandidateSource::Registry => "registry",
            CandidateSource::Manual => "manual",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedExecutable {
    pub path: PathBuf,
    pub source: CandidateSource,
}

/// Source of registry open-command values (HKCU first, then HKLM)
pub trait RegistryLookup {
    fn open_command_values(&self) -> Vec<String>;
}

/// Reads the real registry on Windows, nothing elsewhere
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRegistry;

impl RegistryLookup for SystemRegistry {
    fn open_command_values(&self) -> Vec<String> {
        platforms::read_open_command_values()
    }
}

/// Reduce a registry command line to its executable.
///
/// `"C:\x\Code.exe" "%1"` and `C:\x\Code.exe %1` both give `C:\x\Code.exe`.
pub fn command_line_executable(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.contains('"') {
        value.split('"').nth(1).filter(|s| !s.is_empty())
    } else {
        value.split_whitespace().next()
    }
}

type ExistsCheck = Box<dyn Fn(&Path) -> bool + Send + Sync>;

/// Executable search with injectable sources
pub struct ExecutableLocator<R: RegistryLookup = SystemRegistry> {
    alias: String,
    path_var: Option<OsString>,
    cwd: PathBuf,
    username: Option<String>,
    registry: R,
    exists: ExistsCheck,
}

impl ExecutableLocator<SystemRegistry> {
    /// Locator over the real PATH, `USERNAME`, filesystem and registry
    pub fn from_env() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(
            std::env::var_os("PATH"),
            cwd,
            std::env::var("USERNAME").ok(),
            SystemRegistry,
        )
    }
}

impl<R: RegistryLookup> ExecutableLocator<R> {
    pub fn new(
        path_var: Option<OsString>,
        cwd: PathBuf,
        username: Option<String>,
        registry: R,
    ) -> Self {
        Self {
            alias: EDITOR_ALIAS.to_string(),
            path_var,
            cwd,
            username,
            registry,
            exists: Box::new(|p: &Path| p.exists()),
        }
    }

    /// Replace the existence check used for install paths and registry values
    pub fn with_exists_check<F>(mut self, exists: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.exists = Box::new(exists);
        self
    }

    fn user(&self) -> &str {
        self.username.as_deref().unwrap_or("")
    }

    /// Well-known install locations, in search order
    pub fn known_install_paths(&self) -> Vec<PathBuf> {
        let user = self.user();
        vec![
            // User installation
            format!(r"C:\Users\{user}\AppData\Local\Programs\Microsoft VS Code\Code.exe"),
            format!(r"C:\Users\{user}\AppData\Local\Programs\Microsoft VS Code\bin\code.cmd"),
            // System-wide installation
            r"C:\Program Files\Microsoft VS Code\Code.exe".to_string(),
            r"C:\Program Files\Microsoft VS Code\bin\code.cmd".to_string(),
            r"C:\Program Files (x86)\Microsoft VS Code\Code.exe".to_string(),
            r"C:\Program Files (x86)\Microsoft VS Code\bin\code.cmd".to_string(),
            // Insiders
            format!(
                r"C:\Users\{user}\AppData\Local\Programs\Microsoft VS Code Insiders\Code - Insiders.exe"
            ),
            r"C:\Program Files\Microsoft VS Code Insiders\Code - Insiders.exe".to_string(),
        ]
        .into_iter()
        .map(PathBuf::from)
        .collect()
    }

    /// The three primary install paths with whether each exists, for operator diagnostics
    pub fn diagnostic_paths(&self) -> Vec<(PathBuf, bool)> {
        let user = self.user();
        [
            format!(r"C:\Users\{user}\AppData\Local\Programs\Microsoft VS Code\Code.exe"),
            r"C:\Program Files\Microsoft VS Code\Code.exe".to_string(),
            r"C:\Program Files (x86)\Microsoft VS Code\Code.exe".to_string(),
        ]
        .into_iter()
        .map(PathBuf::from)
        .map(|p| {
            let exists = (self.exists)(&p);
            (p, exists)
        })
        .collect()
    }

    fn find_alias(&self) -> Option<PathBuf> {
        let path_var = self.path_var.as_ref()?;
        which::which_in(&self.alias, Some(path_var), &self.cwd).ok()
    }

    fn find_known_install(&self) -> Option<PathBuf> {
        self.known_install_paths()
            .into_iter()
            .find(|p| (self.exists)(p))
    }

    fn find_registry(&self) -> Option<PathBuf> {
        self.registry
            .open_command_values()
            .iter()
            .filter_map(|value| command_line_executable(value))
            .map(PathBuf::from)
            .find(|p| (self.exists)(p))
    }

    /// First existing candidate, or `None`
    pub fn locate(&self) -> Option<LocatedExecutable> {
        let found = self
            .find_alias()
            .map(|path| (path, CandidateSource::PathAlias))
            .or_else(|| {
                debug!("[locator] '{}' not on PATH", self.alias);
                self.find_known_install()
                    .map(|path| (path, CandidateSource::KnownInstall))
            })
            .or_else(|| {
                debug!("[locator] No known install path exists");
                self.find_registry().map(|path| (path, CandidateSource::Registry))
            });

        match found {
            Some((path, source)) => {
                info!("[locator] Found VS Code via {}: {}", source, path.display());
                Some(LocatedExecutable { path, source })
            }
            None => {
                info!("[locator] VS Code executable not found");
                None
            }
        }
    }

    /// Accept a path typed by the operator if it exists
    pub fn accept_manual(&self, input: &str) -> Option<LocatedExecutable> {
        let trimmed = input.trim().trim_matches('"');
        if trimmed.is_empty() {
            return None;
        }
        let path = PathBuf::from(trimmed);
        (self.exists)(&path).then_some(LocatedExecutable {
            path,
            source: CandidateSource::Manual,
        })
    }
}
