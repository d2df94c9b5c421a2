//! Shared normalization for identifiers taken from paths and query strings.

use crate::error::HttpError;
use lyricsmith_core::text::normalize_optional_nonempty;

/// Require a non-blank identifier.
///
/// # Errors
/// A `400` naming `field` when the value is missing or whitespace-only.
pub(super) fn require_id(value: Option<String>, field: &str) -> Result<String, HttpError> {
    normalize_optional_nonempty(value)
        .ok_or_else(|| HttpError::bad_request(format!("{} is required", field)))
}
