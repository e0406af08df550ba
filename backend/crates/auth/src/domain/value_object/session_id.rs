//! Session Identifier Value Objects
//!
//! A [`SessionId`] is the bearer secret handed to the client. Only its
//! SHA-256 digest, the [`SessionKey`], is ever stored.

use std::fmt;

use platform::crypto;

/// Random bytes per session id (256 bits)
pub const SESSION_ID_BYTES: usize = 32;

/// Opaque, unguessable session id. Debug output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    /// Mint a fresh id from the OS CSPRNG
    pub fn generate() -> Self {
        Self(crypto::generate_token(SESSION_ID_BYTES))
    }

    /// Accept a client-supplied id only if it has the shape of one we mint
    pub fn parse(raw: &str) -> Option<Self> {
        let bytes = crypto::from_base64_url(raw).ok()?;
        (bytes.len() == SESSION_ID_BYTES).then(|| Self(raw.to_string()))
    }

    /// Storage key for this id
    pub fn key(&self) -> SessionKey {
        SessionKey(crypto::sha256_hex(self.0.as_bytes()))
    }

    /// Raw value, for the cookie only
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionId").field(&"[REDACTED]").finish()
    }
}

/// Hex SHA-256 of a session id, the primary key of the sessions table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn from_db(stored: impl Into<String>) -> Self {
        Self(stored.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
