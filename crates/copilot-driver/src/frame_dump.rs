//! Optional on-disk copies of captured frames, for debugging a run
//!
//! Files are named `YYYYMMDD_HHMMSS_<poll>_<index>.png`.

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct FrameDump {
    dir: PathBuf,
}

/// Keep only characters that are safe in a file name
fn sanitize(name: &str) -> String {
    name.replace("::", "_")
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

impl FrameDump {
    /// Create the directory; on failure dumping is simply off.
    pub fn create(dir: impl Into<PathBuf>) -> Option<Self> {
        let dir = dir.into();
        match fs::create_dir_all(&dir) {
            Ok(()) => {
                info!("[frames] Frames will be saved to: {}", dir.display());
                Some(Self { dir })
            }
            Err(e) => {
                warn!("[frames] Failed to create {}: {}", dir.display(), e);
                None
            }
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name(poll: &str, index: u32) -> String {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        format!("{}_{}_{:03}.png", timestamp, sanitize(poll), index)
    }

    /// Write one PNG. Failures are logged and otherwise ignored.
    pub fn save(&self, poll: &str, index: u32, png: &[u8]) -> Option<PathBuf> {
        let path = self.dir.join(Self::file_name(poll, index));
        match fs::write(&path, png) {
            Ok(()) => {
                debug!("[frames] Saved frame {} to {}", index, path.display());
                Some(path)
            }
            Err(e) => {
                warn!("[frames] Failed to save frame {}: {}", index, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("keep button::v2"), "keep_button_v2");
        assert_eq!(sanitize("a/b\\c"), "abc");
    }

    #[test]
    fn test_file_name_shape() {
        let name = FrameDump::file_name("keep_button", 4);
        assert!(name.ends_with("_keep_button_004.png"));
        // YYYYMMDD_HHMMSS_
        assert_eq!(name.as_bytes()[8], b'_');
        assert_eq!(name.as_bytes()[15], b'_');
    }

    #[test]
    fn test_save_writes_file() {
        let root = tempfile::tempdir().unwrap();
        let dump = FrameDump::create(root.path().join("frames")).unwrap();
        let path = dump.save("install", 1, b"png-bytes").unwrap();
        assert_eq!(fs::read(path).unwrap(), b"png-bytes");
    }
}
