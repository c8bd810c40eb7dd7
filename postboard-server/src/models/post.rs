//! Post record and validated post text

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::ValidationError;

/// Minimum post length in characters
pub const MIN_TEXT_LEN: usize = 1;

/// Maximum post length in characters
pub const MAX_TEXT_LEN: usize = 255;

/// Post record from database
///
/// `id` and `created_at` are assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Validated post text
///
/// The only way to hand text to the repository, so nothing that breaks the
/// length rule can be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostText(String);

impl PostText {
    /// Create post text, validating its length.
    ///
    /// # Rules
    /// - 1 to 255 characters (Unicode scalar values, not bytes)
    /// - Whitespace-only text is rejected
    /// - NUL (`\0`) is rejected; PostgreSQL text columns cannot store it
    /// - Accepted text is kept exactly as given, never trimmed
    ///
    /// # Example
    /// ```
    /// use postboard_server::models::PostText;
    ///
    /// assert!(PostText::new("Hello").is_ok());
    /// assert!(PostText::new("").is_err());
    /// assert!(PostText::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let len = s.chars().count();
        if len < MIN_TEXT_LEN || len > MAX_TEXT_LEN || s.trim().is_empty() {
            return Err(ValidationError::TextLength {
                min: MIN_TEXT_LEN,
                max: MAX_TEXT_LEN,
            });
        }
        if s.contains('\0') {
            return Err(ValidationError::NulCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Get the text as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_text() {
        assert!(PostText::new("a").is_ok());
        assert!(PostText::new("Hello world").is_ok());
    }

    #[test]
    fn keeps_text_verbatim() {
        let text = PostText::new("  padded\n").unwrap();
        assert_eq!(text.as_str(), "  padded\n");
    }

    #[test]
    fn rejects_empty() {
        let err = PostText::new("").unwrap_err();
        assert_eq!(err, ValidationError::TextLength { min: 1, max: 255 });
    }

    #[test]
    fn rejects_whitespace_only() {
        assert!(PostText::new(" ").is_err());
        assert!(PostText::new("\t\n  ").is_err());
    }

    #[test]
    fn rejects_nul_character() {
        assert_eq!(
            PostText::new("a\0b").unwrap_err(),
            ValidationError::NulCharacter
        );
        assert!(PostText::new("\0").is_err());
        assert!(PostText::new("a\u{1}b").is_ok());
    }

    #[test]
    fn max_length() {
        // 255 chars should work
        let text_255 = "a".repeat(255);
        assert!(PostText::new(&text_255).is_ok());

        // 256 chars should fail
        let text_256 = "a".repeat(256);
        assert!(PostText::new(&text_256).is_err());
    }

    #[test]
    fn counts_characters_not_bytes() {
        // 255 three-byte characters is 765 bytes but still within the limit
        let text = "あ".repeat(255);
        assert!(PostText::new(&text).is_ok());
        assert!(PostText::new(&"あ".repeat(256)).is_err());
    }
}
