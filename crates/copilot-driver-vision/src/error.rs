//! Error types for the vision classifier

use thiserror::Error;

/// Failures of a single classification request.
///
/// Everything except [`ClassifyError::Config`] is scoped to one frame; the
/// poll loop logs it and tries again on the next iteration.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Network or TLS failure, including the client's own timeout
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Vision backend error ({status}): {body}")]
    Status { status: u16, body: String },

    /// No JSON object could be found in the model output
    #[error("Unparseable model output: {text}")]
    Unparseable { text: String },

    /// Missing endpoint or credentials
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClassifyError {
    /// Whether the poll loop may swallow this error and continue.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ClassifyError::Config(_))
    }
}
