//! Starting the editor on a project folder

use crate::errors::DriverError;
use std::path::Path;
use std::process::{Child, Command};
use tracing::info;

/// Check if the path is a Windows batch file
pub fn is_batch_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("bat") || e.eq_ignore_ascii_case("cmd"))
        .unwrap_or(false)
}

/// Command that opens `folder` in the editor at `executable`.
///
/// Batch launchers such as `bin\code.cmd` cannot be spawned directly and go
/// through `cmd /c`.
pub fn build_launch_command(executable: &Path, folder: &Path) -> Command {
    let mut cmd = if cfg!(windows) && is_batch_file(executable) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/c");
        cmd.arg(executable);
        cmd
    } else {
        Command::new(executable)
    };
    cmd.arg(folder);
    cmd
}

/// Spawn the editor and return without waiting for it.
pub fn launch_editor(executable: &Path, folder: &Path) -> Result<Child, DriverError> {
    let child = build_launch_command(executable, folder)
        .spawn()
        .map_err(|source| DriverError::LaunchFailed {
            path: executable.to_path_buf(),
            source,
        })?;
    info!(
        "[launcher] Launching VS Code (pid {}) with folder: {}",
        child.id(),
        folder.display()
    );
    Ok(child)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_is_batch_file() {
        assert!(is_batch_file(Path::new(r"C:\VS Code\bin\code.cmd")));
        assert!(is_batch_file(Path::new("run.BAT")));
        assert!(!is_batch_file(Path::new(r"C:\VS Code\Code.exe")));
        assert!(!is_batch_file(Path::new("code")));
    }

    #[test]
    fn test_launch_command_passes_folder() {
        let cmd = build_launch_command(Path::new("Code.exe"), Path::new("project1"));
        let args: Vec<&OsStr> = cmd.get_args().collect();
        assert_eq!(args.last().copied(), Some(OsStr::new("project1")));
    }

    #[cfg(windows)]
    #[test]
    fn test_batch_launch_goes_through_cmd() {
        let cmd = build_launch_command(Path::new(r"C:\VS Code\bin\code.cmd"), Path::new("p"));
        assert_eq!(cmd.get_program(), OsStr::new("cmd"));
        let args: Vec<&OsStr> = cmd.get_args().collect();
        assert_eq!(args[0], OsStr::new("/c"));
    }

    #[test]
    fn test_launch_missing_executable_fails() {
        let err = launch_editor(
            Path::new("/definitely/not/here/code-binary"),
            Path::new("."),
        )
        .unwrap_err();
        assert!(matches!(err, DriverError::LaunchFailed { .. }));
    }
}
