//! User Password Value Object
//!
//! Domain wrappers around `platform::password`.
//!
//! ## Usage
//! ```rust
//! use auth::domain::value_object::user_password::{RawPassword, UserPassword};
//! use platform::password::HashingParams;
//!
//! let params = HashingParams::minimal();
//! let raw = RawPassword::new("s3cr3t".to_string()).unwrap();
//! let stored = UserPassword::from_raw(&raw, &params, None).unwrap();
//! assert!(stored.verify(&raw, None));
//! ```

use std::fmt;

use platform::password::{ClearTextPassword, HashedPassword, HashingParams, PasswordPolicyError};

use crate::error::{AuthError, AuthResult};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Password as typed by the user. Zeroized on drop.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    pub fn new(raw: String) -> AuthResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(|e| match e {
            PasswordPolicyError::TooLong { max, .. } => {
                AuthError::Validation(format!("Password must be at most {max} characters"))
            }
            PasswordPolicyError::EmptyOrWhitespace => {
                AuthError::Validation("Password cannot be empty".to_string())
            }
            PasswordPolicyError::InvalidCharacter => {
                AuthError::Validation("Password contains invalid characters".to_string())
            }
        })?;

        Ok(Self(clear_text))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, safe to store)
// ============================================================================

/// Argon2id PHC string of a user's password
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub fn from_raw(
        raw: &RawPassword,
        params: &HashingParams,
        pepper: Option<&[u8]>,
    ) -> AuthResult<Self> {
        raw.inner()
            .hash(params, pepper)
            .map(Self)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    pub fn from_db(phc: impl Into<String>) -> AuthResult<Self> {
        HashedPassword::from_phc_string(phc)
            .map(Self)
            .map_err(|e| AuthError::Internal(format!("Stored password hash: {e}")))
    }

    /// Hash nobody knows the password for, with the given costs
    pub fn decoy(params: &HashingParams) -> AuthResult<Self> {
        HashedPassword::decoy(params)
            .map(Self)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }

    pub fn needs_rehash(&self, params: &HashingParams) -> bool {
        self.0.needs_rehash(params)
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserPassword").field(&"[HASH]").finish()
    }
}
