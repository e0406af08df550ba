//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entity::{session::Session, user::User};
use crate::domain::value_object::{
    session_id::SessionKey, user_id::UserId, user_name::UserName, user_password::UserPassword,
};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user. A taken user name fails with `DuplicateUsername`,
    /// decided by the store's unique index.
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by canonical user name
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>>;

    /// Replace the stored password hash
    async fn update_password_hash(
        &self,
        user_id: &UserId,
        password_hash: &UserPassword,
    ) -> AuthResult<()>;
}

/// Session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Persist a new session
    async fn create(&self, session: &Session) -> AuthResult<()>;

    /// Find a session that has not expired at `now_ms`
    async fn find_active(&self, key: &SessionKey, now_ms: i64) -> AuthResult<Option<Session>>;

    /// Delete a session. Returns whether a row was removed.
    async fn delete(&self, key: &SessionKey) -> AuthResult<bool>;

    /// Delete every session expired at `now_ms`
    async fn purge_expired(&self, now_ms: i64) -> AuthResult<u64>;
}
