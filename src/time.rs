//! Shared timestamp and identifier helpers.
//!
//! All timestamps in the kernel are RFC 3339 strings; this module owns
//! parsing and minting so every validator agrees on the format.

use crate::error::MandateError;
use chrono::{DateTime, FixedOffset, Utc};

/// Current instant as an RFC 3339 string (e.g. `2026-08-25T14:03:07+00:00`).
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Parse an RFC 3339 date-time, reporting the offending field on failure.
pub fn parse_rfc3339(field: &str, value: &str) -> Result<DateTime<FixedOffset>, MandateError> {
    DateTime::parse_from_rfc3339(value).map_err(|e| {
        MandateError::invalid(format!("{} is not a valid RFC 3339 date-time: {}", field, e))
    })
}

/// Mint a fresh version-4 UUID for a decision record.
pub fn new_decision_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
