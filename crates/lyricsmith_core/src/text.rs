//! Shared text normalization helpers.

/// Trim an optional string and drop empty values.
///
/// # Returns
/// `None` when the input is missing or whitespace-only; otherwise the trimmed
/// string.
pub fn normalize_optional_nonempty(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Number of Unicode scalar values in `text`.
///
/// Chord columns index code points, not bytes, so every width calculation in
/// the renderer goes through here.
pub fn code_point_len(text: &str) -> usize {
    text.chars().count()
}

/// Upper-case a section title for display without touching stored content.
pub fn header_case(text: &str) -> String {
    text.to_uppercase()
}
