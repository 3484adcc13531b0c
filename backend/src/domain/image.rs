//! Inline images carried inside documents as base64 data URLs.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Largest accepted decoded image, in bytes.
pub const INLINE_IMAGE_MAX_BYTES: usize = 700 * 1024;

const ACCEPTED_TYPES: [&str; 4] = ["png", "jpeg", "gif", "webp"];

/// Validation errors for inline images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineImageError {
    NotADataUrl,
    UnsupportedType { media_type: String },
    InvalidBase64,
    TooLarge { bytes: usize, max: usize },
}

impl fmt::Display for InlineImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotADataUrl => write!(f, "image must be a base64 data URL"),
            Self::UnsupportedType { media_type } => {
                write!(f, "image type '{media_type}' is not supported")
            }
            Self::InvalidBase64 => write!(f, "image payload is not valid base64"),
            Self::TooLarge { bytes, max } => {
                write!(f, "image is {bytes} bytes; the limit is {max} bytes")
            }
        }
    }
}

impl std::error::Error for InlineImageError {}

/// Base64 data URL holding a png, jpeg, gif or webp image.
///
/// # Examples
/// ```
/// use backend::domain::InlineImage;
///
/// let image = InlineImage::parse("data:image/png;base64,iVBORw0KGgo=").expect("valid");
/// assert_eq!(image.media_type(), "image/png");
/// assert!(InlineImage::parse("https://example.com/cat.png").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "data:image/png;base64,iVBORw0KGgo=")]
pub struct InlineImage(String);

impl InlineImage {
    /// Validate a data URL.
    pub fn parse(raw: impl Into<String>) -> Result<Self, InlineImageError> {
        let raw = raw.into();
        let rest = raw
            .strip_prefix("data:image/")
            .ok_or(InlineImageError::NotADataUrl)?;
        let (subtype, payload) = rest
            .split_once(";base64,")
            .ok_or(InlineImageError::NotADataUrl)?;
        if !ACCEPTED_TYPES.contains(&subtype) {
            return Err(InlineImageError::UnsupportedType {
                media_type: format!("image/{subtype}"),
            });
        }
        let bytes = STANDARD
            .decode(payload)
            .map_err(|_| InlineImageError::InvalidBase64)?;
        if bytes.len() > INLINE_IMAGE_MAX_BYTES {
            return Err(InlineImageError::TooLarge {
                bytes: bytes.len(),
                max: INLINE_IMAGE_MAX_BYTES,
            });
        }
        Ok(Self(raw))
    }

    /// MIME type declared by the data URL.
    #[must_use]
    pub fn media_type(&self) -> &str {
        self.0
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(';'))
            .map_or("", |(media_type, _)| media_type)
    }
}

impl AsRef<str> for InlineImage {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<InlineImage> for String {
    fn from(value: InlineImage) -> Self {
        value.0
    }
}

impl TryFrom<String> for InlineImage {
    type Error = InlineImageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
