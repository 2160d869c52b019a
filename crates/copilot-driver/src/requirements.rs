//! The project's `requirements.txt`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Number of requirement lines, ignoring blanks and `#` comments.
pub fn count_packages(text: &str) -> usize {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .count()
}

/// What the requirements step should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementsStatus {
    Missing(PathBuf),
    /// Exists but contains only whitespace
    Empty(PathBuf),
    /// Non-empty; install should run
    Present { path: PathBuf, package_count: usize },
}

/// Look at `folder/requirements.txt`.
///
/// A file holding only comments still counts as present, since `pip` will
/// happily run on it.
pub fn inspect_requirements(folder: &Path) -> io::Result<RequirementsStatus> {
    let path = folder.join(REQUIREMENTS_FILE);
    if !path.exists() {
        return Ok(RequirementsStatus::Missing(path));
    }

    let text = fs::read_to_string(&path)?;
    let text = text.trim();
    if text.is_empty() {
        return Ok(RequirementsStatus::Empty(path));
    }

    Ok(RequirementsStatus::Present {
        package_count: count_packages(text),
        path,
    })
}
