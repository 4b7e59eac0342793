//! Input validation for caller-supplied filters and identifiers.

use crate::error::SearchError;

pub const MAX_KEYWORDS_LENGTH: usize = 200;
pub const MAX_ID_LENGTH: usize = 256;

/// Strip ASCII control characters (except space), trim whitespace,
/// and enforce a character-length limit.
pub fn sanitize_text(input: &str, max_len: usize) -> Result<String, SearchError> {
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.chars().count() > max_len {
        return Err(SearchError::InvalidInput(format!(
            "input exceeds maximum length of {} characters",
            max_len
        )));
    }
    if sanitized.is_empty() {
        return Err(SearchError::InvalidInput(
            "input is empty after sanitization".to_string(),
        ));
    }
    Ok(sanitized)
}

/// Validate a keyword filter: strip control chars, trim, at most 200 chars.
pub fn validate_keywords(input: &str) -> Result<String, SearchError> {
    sanitize_text(input, MAX_KEYWORDS_LENGTH)
}

/// Validate a NAICS code: 2 to 6 ASCII digits (sector through national industry).
pub fn validate_naics(input: &str) -> Result<String, SearchError> {
    let trimmed = input.trim();
    if (2..=6).contains(&trimmed.len()) && trimmed.chars().all(|c| c.is_ascii_digit()) {
        Ok(trimmed.to_string())
    } else {
        Err(SearchError::InvalidInput(format!(
            "invalid NAICS code '{}'. Expected 2 to 6 digits (e.g., 541511)",
            input
        )))
    }
}

/// Validate a notice ID, opportunity ID or view URL.
pub fn validate_id(input: &str) -> Result<String, SearchError> {
    sanitize_text(input, MAX_ID_LENGTH).map_err(|_| {
        SearchError::InvalidInput(format!(
            "invalid identifier '{}'. Expected a notice ID, opportunity ID or SAM.gov link",
            input.trim()
        ))
    })
}
