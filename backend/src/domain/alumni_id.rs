//! Institution-issued Alumni ID (`######-A`).

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Domain suffix used for records imported without a real email address.
pub const PLACEHOLDER_EMAIL_DOMAIN: &str = "placeholder.alumni.invalid";

/// Validation errors returned by [`AlumniId::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlumniIdError {
    Empty,
    InvalidFormat { value: String },
}

impl fmt::Display for AlumniIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "alumni id must not be empty"),
            Self::InvalidFormat { value } => {
                write!(f, "alumni id '{value}' must look like 123456-A")
            }
        }
    }
}

impl std::error::Error for AlumniIdError {}

static ALUMNI_ID_RE: OnceLock<Regex> = OnceLock::new();

fn alumni_id_regex() -> &'static Regex {
    ALUMNI_ID_RE.get_or_init(|| {
        // ASCII digits and letters only.
        Regex::new(r"^[0-9]{6}-[A-Za-z]$")
            .unwrap_or_else(|error| panic!("alumni id regex failed to compile: {error}"))
    })
}

/// Validated Alumni ID, stored upper-case.
///
/// # Examples
/// ```
/// use backend::domain::AlumniId;
///
/// let id = AlumniId::parse(" 123456-a ").expect("valid id");
/// assert_eq!(id.as_ref(), "123456-A");
/// assert!(AlumniId::parse("12345-A").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "123456-A")]
pub struct AlumniId(String);

impl AlumniId {
    /// Validate `raw` after trimming surrounding whitespace.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, AlumniIdError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AlumniIdError::Empty);
        }
        if !alumni_id_regex().is_match(trimmed) {
            return Err(AlumniIdError::InvalidFormat {
                value: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Whether `raw` would be accepted by [`AlumniId::parse`].
    #[must_use]
    pub fn is_valid(raw: &str) -> bool {
        Self::parse(raw).is_ok()
    }

    /// Email address assigned to records that have no real one.
    #[must_use]
    pub fn placeholder_email(&self) -> String {
        format!(
            "{}@{PLACEHOLDER_EMAIL_DOMAIN}",
            self.0.to_ascii_lowercase()
        )
    }
}

/// Whether `email` was generated by [`AlumniId::placeholder_email`].
#[must_use]
pub fn is_placeholder_email(email: &str) -> bool {
    email
        .trim()
        .to_ascii_lowercase()
        .ends_with(&format!("@{PLACEHOLDER_EMAIL_DOMAIN}"))
}

impl AsRef<str> for AlumniId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AlumniId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<AlumniId> for String {
    fn from(value: AlumniId) -> Self {
        value.0
    }
}

impl TryFrom<String> for AlumniId {
    type Error = AlumniIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("123456-A", true)]
    #[case("123456-a", true)]
    #[case("12345-A", false)]
    #[case("123456-1", false)]
    #[case("1234567-A", false)]
    #[case("123456-AB", false)]
    #[case("123456A", false)]
    #[case("", false)]
    #[case("\u{661}\u{662}\u{663}\u{664}\u{665}\u{666}-A", false)]
    #[case("\u{ff11}\u{ff12}\u{ff13}\u{ff14}\u{ff15}\u{ff16}-A", false)]
    #[case("123456-\u{212a}", false)]
    #[case("123456-\u{17f}", false)]
    #[case("123456-\u{e9}", false)]
    fn accepts_only_six_digits_dash_letter(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(AlumniId::is_valid(raw), valid);
    }

    #[test]
    fn normalises_to_upper_case() {
        let id = AlumniId::parse("654321-z").expect("valid");
        assert_eq!(id.to_string(), "654321-Z");
    }

    #[test]
    fn placeholder_email_is_lower_case_and_recognised() {
        let id = AlumniId::parse("200101-B").expect("valid");
        let email = id.placeholder_email();
        assert_eq!(email, "200101-b@placeholder.alumni.invalid");
        assert!(is_placeholder_email(&email));
        assert!(!is_placeholder_email("someone@example.com"));
    }

    #[test]
    fn deserialisation_rejects_malformed_ids() {
        let result: Result<AlumniId, _> = serde_json::from_str("\"12-A\"");
        assert!(result.is_err());
    }
}
