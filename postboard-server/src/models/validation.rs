//! Validation error types

use std::fmt;

/// Validation error for domain models
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Post text is empty, whitespace-only, or longer than allowed
    TextLength { min: usize, max: usize },
    /// Post text contains U+0000, which the store cannot hold
    NulCharacter,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextLength { min, max } => {
                write!(f, "Text must be between {} and {} characters", min, max)
            }
            Self::NulCharacter => write!(f, "Text must not contain NUL characters"),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TextLength { min: 1, max: 255 };
        assert_eq!(err.to_string(), "Text must be between 1 and 255 characters");
        assert_eq!(
            ValidationError::NulCharacter.to_string(),
            "Text must not contain NUL characters"
        );
    }
}
