//! Shared types for logsieve
//!
//! This crate contains data structures used across multiple logsieve crates.

use chrono::{DateTime, FixedOffset};

// ============================================================================
// Log Types
// ============================================================================

/// A single line of text as produced by the log source. May be empty or malformed.
pub type RawLogLine = String;

/// strftime-style format of the bracketed access log timestamp,
/// e.g. `10/Oct/2023 13:55:36 +0000`
pub const TIMESTAMP_FORMAT: &str = "%d/%b/%Y %H:%M:%S %z";

/// A structurally valid access log line
///
/// Only produced by the parser when the line matched the expected shape.
/// The timestamp is kept as text and parsed on demand, since only entries
/// that survive filtering need an instant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedLogEntry {
    /// Original raw log line
    pub raw: RawLogLine,

    /// Client address (first field)
    pub remote_host: String,

    /// Authenticated user, `-` when unknown
    pub authenticated_user: String,

    /// Bracketed timestamp text, without the brackets
    pub timestamp_text: String,

    /// Quoted request line, without the quotes, e.g. `GET /path HTTP/1.1`
    pub request_line: String,

    /// Leading non-whitespace token of the request line
    pub http_method: String,

    /// Status code digits
    pub status_code: String,
}

impl ParsedLogEntry {
    /// Parse the timestamp text as an instant with its UTC offset.
    ///
    /// A literal `Z` is accepted in place of the numeric offset and means UTC.
    pub fn timestamp(&self) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
        match self.timestamp_text.strip_suffix('Z') {
            Some(local) => DateTime::parse_from_str(&format!("{local}+0000"), TIMESTAMP_FORMAT),
            None => DateTime::parse_from_str(&self.timestamp_text, TIMESTAMP_FORMAT),
        }
    }
}

// ============================================================================
// Query Types
// ============================================================================

/// Unvalidated query parameters as received by the outer request layer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub code: Option<String>,
    pub method: Option<String>,
    pub user: Option<String>,
}

impl QueryParams {
    /// Build from ordered key/value pairs. The first occurrence of a key wins
    /// and unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "code" => &mut params.code,
                "method" => &mut params.method,
                "user" => &mut params.user,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        params
    }
}
