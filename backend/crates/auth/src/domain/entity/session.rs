//! Session Entity
//!
//! Server-side record behind a session cookie. Stored under the digest of
//! the session id, never the id itself.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::value_object::{session_id::SessionKey, user_name::UserName};

#[derive(Debug, Clone)]
pub struct Session {
    /// Digest of the session id
    pub session_key: SessionKey,
    /// Back-reference to the owning user
    pub user_name: UserName,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Expiration (Unix timestamp ms). `None` lives until logout.
    pub expires_at_ms: Option<i64>,
}

impl Session {
    /// TTL is provided by the application layer (config), not hard-coded here.
    pub fn new(session_key: SessionKey, user_name: UserName, ttl: Option<Duration>) -> Self {
        let now = Utc::now();
        let expires_at_ms = ttl.map(|ttl| {
            let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
            now.timestamp_millis().saturating_add(ttl_ms)
        });

        Self {
            session_key,
            user_name,
            created_at: now,
            expires_at_ms,
        }
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expires_at_ms.is_some_and(|expires| now_ms >= expires)
    }
}
