//! Person names and the normalization used for name-based lookups.

use std::fmt;

/// Maximum accepted length for a person name, in characters.
pub const PERSON_NAME_MAX: usize = 120;

/// Validation errors for person names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    Empty,
    TooLong { max: usize },
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "name must not be empty"),
            Self::TooLong { max } => write!(f, "name must be at most {max} characters"),
        }
    }
}

impl std::error::Error for NameError {}

/// Trim, lowercase and collapse internal whitespace.
///
/// # Examples
/// ```
/// use backend::domain::normalize_name;
///
/// assert_eq!(normalize_name("  Maria   DELA  Cruz "), "maria dela cruz");
/// ```
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Validate a display name and return it with whitespace collapsed.
pub fn clean_person_name(raw: &str) -> Result<String, NameError> {
    let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return Err(NameError::Empty);
    }
    if cleaned.chars().count() > PERSON_NAME_MAX {
        return Err(NameError::TooLong {
            max: PERSON_NAME_MAX,
        });
    }
    Ok(cleaned)
}

/// Canonical form for stored email addresses.
#[must_use]
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}
