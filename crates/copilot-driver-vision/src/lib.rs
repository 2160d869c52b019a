//! Vision classifier client
//!
//! Sends a screenshot and a natural-language question to a multimodal model
//! and reads back a small JSON verdict such as `{"button": "enabled"}`.
//!
//! The poll loop in `copilot-driver` only sees the [`Classifier`] trait, so
//! tests can script verdicts without a network.

use async_trait::async_trait;
use serde_json::{Map, Value};

pub mod client;
pub mod error;
pub mod prompt;
pub mod verdict;

pub use client::{
    build_request_body, extract_output_text, VisionAuth, VisionClient, VisionConfig, VisionEndpoint,
};
pub use error::ClassifyError;
pub use prompt::{INSTALLATION_PROMPT, KEEP_BUTTON_PROMPT};
pub use verdict::{extract_braced_span, parse_verdict_object, Verdict};

/// Anything that can turn an encoded frame plus a question into a JSON object.
#[async_trait]
pub trait Classifier {
    /// Classify one frame.
    ///
    /// # Arguments
    /// * `base64_png` - Base64 encoded PNG screenshot
    /// * `prompt` - Instruction describing the expected JSON shape
    ///
    /// # Returns
    /// * `Ok(object)` - The JSON object found in the model output
    /// * `Err(e)` - Transport, status, parse or configuration failure
    async fn classify(
        &self,
        base64_png: &str,
        prompt: &str,
    ) -> Result<Map<String, Value>, ClassifyError>;
}

/// Shorten a string for logging without splitting a UTF-8 character.
pub fn truncate_for_log(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_ascii() {
        assert_eq!(truncate_for_log("abcdef", 3), "abc");
        assert_eq!(truncate_for_log("abc", 10), "abc");
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        // Each of these is more than one byte; slicing by bytes would panic.
        assert_eq!(truncate_for_log("⏳⏳⏳⏳", 2), "⏳⏳");
    }
}
