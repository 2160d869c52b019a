use std::path::PathBuf;
use thiserror::Error;

/// Setup and OS-level failures.
///
/// These are fatal when they happen during setup (locating or launching the
/// editor). During polling, capture failures are wrapped in
/// [`crate::PollError::Capture`] and retried.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("Failed to launch '{}': {source}", path.display())]
    LaunchFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input error: {0}")]
    Input(String),

    #[error("Window error: {0}")]
    Window(String),

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Not supported on this platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Invalid key combination: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),
}
