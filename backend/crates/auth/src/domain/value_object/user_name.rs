//! User Name Value Object
//!
//! The user name is the login handle. It is also the key a session points
//! back to, so its stored form must be stable.
//!
//! ## Normalization
//! NFKC → trim → validate → (lowercase, under `CaseInsensitive`)
//!
//! ## Invariants
//! - Non-empty after normalization
//! - At most `USER_NAME_MAX_LENGTH` characters
//! - No control characters

use std::fmt;

use unicode_normalization::UnicodeNormalization;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 64;

/// Whether `Alice` and `alice` name the same account. Fixed for the
/// lifetime of a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsernameCase {
    #[default]
    CaseSensitive,
    CaseInsensitive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    Empty,
    TooLong { length: usize, max: usize },
    InvalidCharacter { position: usize },
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "User name cannot be empty"),
            Self::TooLong { length, max } => {
                write!(f, "User name is too long ({length} chars, maximum {max})")
            }
            Self::InvalidCharacter { position } => {
                write!(f, "User name contains a control character at position {position}")
            }
        }
    }
}

impl std::error::Error for UserNameError {}

/// Validated, canonical user name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserName(String);

impl UserName {
    pub fn new(input: impl AsRef<str>, case: UsernameCase) -> Result<Self, UserNameError> {
        let normalized: String = input.as_ref().nfkc().collect();
        let trimmed = normalized.trim();
        Self::validate(trimmed)?;

        let canonical = match case {
            UsernameCase::CaseSensitive => trimmed.to_string(),
            UsernameCase::CaseInsensitive => trimmed.to_lowercase(),
        };
        Ok(Self(canonical))
    }

    /// Rebuild from a stored row. Stored names were validated on insert.
    pub fn from_db(stored: impl Into<String>) -> Self {
        Self(stored.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(name: &str) -> Result<(), UserNameError> {
        if name.is_empty() {
            return Err(UserNameError::Empty);
        }

        let length = name.chars().count();
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        if let Some(position) = name.chars().position(char::is_control) {
            return Err(UserNameError::InvalidCharacter { position });
        }

        Ok(())
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
