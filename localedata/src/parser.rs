//! Content parsers: raw file bytes to structured values.

use serde_json::Value;

use crate::error::{LocaleDataError, Result};

/// Turns the bytes of a data file into a structured value.
pub trait ContentParser: Send + Sync {
    /// Parse `bytes` read from `path`.
    ///
    /// Malformed content is an error, never an empty result.
    fn parse(&self, path: &str, bytes: &[u8]) -> Result<Value>;
}

/// JSON parser backed by serde_json.
///
/// A leading UTF-8 byte order mark is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

impl ContentParser for JsonParser {
    fn parse(&self, path: &str, bytes: &[u8]) -> Result<Value> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        serde_json::from_slice(bytes).map_err(|e| LocaleDataError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

/// Check if file contents carry no data (empty or whitespace only).
pub(crate) fn is_blank(bytes: &[u8]) -> bool {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    bytes.iter().all(u8::is_ascii_whitespace)
}
