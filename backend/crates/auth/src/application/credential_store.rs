//! Credential Store
//!
//! Owns user records: validated creation with hash-at-rest, lookup by user
//! name, and re-hashing when configured costs change.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    user_id::UserId,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

pub struct CredentialStore<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> Clone for CredentialStore<U>
where
    U: UserRepository,
{
    fn clone(&self) -> Self {
        Self {
            user_repo: Arc::clone(&self.user_repo),
            config: Arc::clone(&self.config),
        }
    }
}

impl<U> CredentialStore<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Provision a user. Uniqueness is decided by the store, so concurrent
    /// creates for one name yield exactly one success.
    pub async fn create_user(&self, user_name: &str, password: String) -> AuthResult<UserId> {
        let user_name = UserName::new(user_name, self.config.username_case)
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        let raw = RawPassword::new(password)?;
        let password_hash =
            UserPassword::from_raw(&raw, &self.config.password_hashing, self.config.pepper())?;

        let user = User::new(user_name, password_hash);
        self.user_repo.create(&user).await?;

        tracing::info!(user_id = %user.user_id, "User created");

        Ok(user.user_id)
    }

    /// `NotFound` is for internal callers only; login turns it into
    /// `InvalidCredentials`. A name no user could have is also `NotFound`,
    /// after the same store round-trip an unknown valid name costs.
    pub async fn find_by_username(&self, user_name: &str) -> AuthResult<User> {
        let (user_name, valid) = match UserName::new(user_name, self.config.username_case) {
            Ok(user_name) => (user_name, true),
            // Empty never matches a stored row
            Err(_) => (UserName::from_db(String::new()), false),
        };

        let found = self.user_repo.find_by_user_name(&user_name).await?;
        found.filter(|_| valid).ok_or(AuthError::NotFound)
    }

    /// Store a fresh hash if `user`'s hash was made with other costs. Call
    /// only after `password` verified. Returns whether a new hash was stored.
    pub async fn rehash_if_needed(&self, user: &User, password: &RawPassword) -> AuthResult<bool> {
        let params = &self.config.password_hashing;
        if !user.password_hash.needs_rehash(params) {
            return Ok(false);
        }

        let password_hash = UserPassword::from_raw(password, params, self.config.pepper())?;
        self.user_repo
            .update_password_hash(&user.user_id, &password_hash)
            .await?;

        tracing::info!(user_id = %user.user_id, "Password re-hashed with current parameters");

        Ok(true)
    }
}
