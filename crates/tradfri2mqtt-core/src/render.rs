//! Canonical string rendering for attribute values.
//!
//! Every device field is published as a string. The rendering rules are
//! a closed set: absent values become the empty string, booleans become
//! `"true"`/`"false"`, numbers use their natural display form, and
//! last-seen timestamps (epoch seconds) become ISO-8601 UTC.

use chrono::{DateTime, Utc};

/// A single scalar device field, paired with its rendering rule.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Free-form text (name, firmware version, ...)
    Text(Option<String>),
    /// Boolean state
    Bool(Option<bool>),
    /// Unsigned integer
    Uint(Option<u64>),
    /// Floating point measurement
    Float(Option<f64>),
    /// Seconds since the Unix epoch, rendered as ISO-8601 UTC
    Timestamp(Option<u64>),
}

impl FieldValue {
    /// Render to the canonical published string form.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Text(Some(text)) => text.clone(),
            Self::Bool(Some(flag)) => flag.to_string(),
            Self::Uint(Some(n)) => n.to_string(),
            Self::Float(Some(x)) => x.to_string(),
            Self::Timestamp(Some(secs)) => render_epoch_seconds(*secs),
            _ => String::new(),
        }
    }
}

/// Render epoch seconds as an ISO-8601 UTC string with second precision.
///
/// Values outside chrono's representable range fall back to the raw
/// number so the attribute is still published deterministically.
fn render_epoch_seconds(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
        .map_or_else(
            || secs.to_string(),
            |dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        )
}
