//! Field codec for persisted component columns
//!
//! Composite values (pairs, repo, artifacts, operations) are stored as
//! individually encoded JSON strings. Decoding is done element by element:
//! an element that does not match its target shape is skipped and recorded
//! in a [`DecodeReport`] instead of failing the whole row.
//!
//! ```text
//! inputs     = ["{\"key\":\"domain\",\"value\":\"megam.io\"}", ...]
//! repo       = "{\"rtype\":\"source\",\"source\":\"github\",\"oneclick\":\"\",\"url\":\"...\"}"
//! operations = ["{\"operation_type\":\"ci\",\"description\":\"...\",\"properties\":[],\"status\":\"\"}"]
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// An element that was dropped while decoding a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedField {
    /// Column name (`inputs`, `repo`, ...)
    pub field: String,
    /// Position in the column for list columns
    pub index: Option<usize>,
    /// Decoder message
    pub reason: String,
}

impl std::fmt::Display for SkippedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{}]: {}", self.field, i, self.reason),
            None => write!(f, "{}: {}", self.field, self.reason),
        }
    }
}

/// Everything that was skipped while decoding one row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    skipped: Vec<SkippedField>,
}

impl DecodeReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing was skipped
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Number of skipped elements
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Skipped elements, in decode order
    pub fn skipped(&self) -> &[SkippedField] {
        &self.skipped
    }

    /// Skipped elements for a single column
    pub fn skipped_in<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a SkippedField> + 'a {
        self.skipped.iter().filter(move |s| s.field == field)
    }

    pub(crate) fn push(&mut self, field: &str, index: Option<usize>, reason: impl Into<String>) {
        self.skipped.push(SkippedField {
            field: field.to_string(),
            index,
            reason: reason.into(),
        });
    }

    /// Append another report (used when a nested value reports on its own)
    pub fn extend(&mut self, other: DecodeReport) {
        self.skipped.extend(other.skipped);
    }
}

/// Encode a single value into its stored string form
pub fn encode<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Encode each value of a list column
pub fn encode_each<'a, T, I>(values: I) -> Result<Vec<String>>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    values.into_iter().map(encode).collect()
}

/// Strictly decode a single stored string
///
/// Returns [`Error::Decode`] naming the column when the value does not match.
pub fn decode<T: DeserializeOwned>(field: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| Error::decode(field, e.to_string()))
}

/// Decode every element of a list column, skipping malformed elements
///
/// Order of the successfully decoded elements is preserved.
pub fn decode_each<T: DeserializeOwned>(
    field: &str,
    raw: &[String],
    report: &mut DecodeReport,
) -> Vec<T> {
    let mut out = Vec::with_capacity(raw.len());
    for (i, item) in raw.iter().enumerate() {
        match serde_json::from_str::<T>(item) {
            Ok(v) => out.push(v),
            Err(e) => report.push(field, Some(i), e.to_string()),
        }
    }
    out
}

/// Decode a single-valued column that may legitimately be empty
///
/// An empty (or whitespace-only) string means "not configured" and yields
/// `None` without a report entry. A malformed value yields `None` and is
/// recorded.
pub fn decode_optional<T: DeserializeOwned>(
    field: &str,
    raw: &str,
    report: &mut DecodeReport,
) -> Option<T> {
    if raw.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<T>(raw) {
        Ok(v) => Some(v),
        Err(e) => {
            report.push(field, None, e.to_string());
            None
        }
    }
}
