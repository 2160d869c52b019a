//! Reading a verdict out of free-form model text
//!
//! The model is asked for pure JSON but often wraps it in prose or a code
//! fence. Parsing is two-stage: the whole text first, then the span from the
//! first `{` to the last `}`. If neither is a JSON object the result is
//! [`ClassifyError::Unparseable`].

use crate::error::ClassifyError;
use crate::truncate_for_log;
use serde_json::{Map, Value};

/// Return the substring from the first `{` to the last `}` (inclusive).
pub fn extract_braced_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Parse model output into a JSON object.
pub fn parse_verdict_object(text: &str) -> Result<Map<String, Value>, ClassifyError> {
    let trimmed = text.trim();

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        return Ok(map);
    }

    if let Some(span) = extract_braced_span(trimmed) {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(span) {
            return Ok(map);
        }
    }

    Err(ClassifyError::Unparseable {
        text: truncate_for_log(trimmed, 200).to_string(),
    })
}

/// The value of one recognized field in a classifier response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Field that was looked up, e.g. `button`
    pub field: String,
    /// Normalized value, or `None` when the field is absent
    pub value: Option<String>,
}

impl Verdict {
    /// Reduce a classifier object to the field a call-site cares about.
    ///
    /// String values are trimmed and lowercased. Non-string values are kept
    /// in their JSON form so they surface as "unexpected" rather than missing.
    pub fn read(object: &Map<String, Value>, field: &str) -> Self {
        let value = object.get(field).and_then(|v| match v {
            Value::Null => None,
            Value::String(s) => Some(s.trim().to_lowercase()),
            other => Some(other.to_string()),
        });
        Self {
            field: field.to_string(),
            value,
        }
    }

    pub fn is(&self, expected: &str) -> bool {
        self.value.as_deref() == Some(expected)
    }
}
