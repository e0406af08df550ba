//! Authenticator / Session Manager
//!
//! Verifies credentials and drives the session lifecycle.
//!
//! ## States
//! - `Anonymous`
//! - `Authenticated { username, session_id }`
//!
//! Every transition into `Authenticated` mints a new session id and
//! invalidates the one the caller presented. Unknown users and wrong
//! passwords cost one Argon2 verification each and fail identically.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::application::credential_store::CredentialStore;
use crate::domain::entity::session::Session;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{
    session_id::SessionId,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Outcome of every session operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated {
        username: UserName,
        session_id: SessionId,
    },
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }

    pub fn username(&self) -> Option<&UserName> {
        match self {
            AuthState::Authenticated { username, .. } => Some(username),
            AuthState::Anonymous => None,
        }
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            AuthState::Authenticated { session_id, .. } => Some(session_id),
            AuthState::Anonymous => None,
        }
    }
}

pub struct Authenticator<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    credentials: CredentialStore<U>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
    /// Verified against when the user does not exist
    decoy: UserPassword,
}

impl<U, S> Authenticator<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> AuthResult<Self> {
        let decoy = UserPassword::decoy(&config.password_hashing)?;
        Ok(Self {
            credentials: CredentialStore::new(user_repo, Arc::clone(&config)),
            session_repo,
            config,
            decoy,
        })
    }

    pub fn credentials(&self) -> &CredentialStore<U> {
        &self.credentials
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Verify credentials and open a new session.
    ///
    /// `current_session` is whatever id the caller held before; it is
    /// deleted on success so a planted id never becomes authenticated.
    pub async fn login(
        &self,
        current_session: Option<&str>,
        username: &str,
        password: String,
    ) -> AuthResult<AuthState> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Username and password are required".to_string(),
            ));
        }
        let password = RawPassword::new(password)?;
        let pepper = self.config.pepper();

        let user = match self.credentials.find_by_username(username).await {
            Ok(user) => user,
            Err(AuthError::NotFound) => {
                // Same cost as a real verification
                self.decoy.verify(&password, pepper);
                tracing::debug!(reason = "unknown user", "Login rejected");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        if !user.password_hash.verify(&password, pepper) {
            tracing::debug!(reason = "wrong password", "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        if let Err(e) = self.credentials.rehash_if_needed(&user, &password).await {
            tracing::warn!(error = %e, user_id = %user.user_id, "Password re-hash failed, continuing anyway");
        }

        if let Some(previous) = current_session.and_then(SessionId::parse) {
            self.session_repo.delete(&previous.key()).await?;
        }

        let state = self.start_session(user.user_name).await?;
        tracing::info!(user_id = %user.user_id, "User logged in");
        Ok(state)
    }

    /// Destroy the caller's session, if any. Always ends `Anonymous`.
    pub async fn logout(&self, current_session: Option<&str>) -> AuthResult<AuthState> {
        if let Some(session_id) = current_session.and_then(SessionId::parse) {
            if self.session_repo.delete(&session_id.key()).await? {
                tracing::info!("User logged out");
            }
        }
        Ok(AuthState::Anonymous)
    }

    /// Look up a session id. Never mutates anything.
    pub async fn resolve(&self, session_id: &str) -> AuthResult<AuthState> {
        let Some(session_id) = SessionId::parse(session_id) else {
            return Ok(AuthState::Anonymous);
        };

        let now_ms = Utc::now().timestamp_millis();
        let state = match self.session_repo.find_active(&session_id.key(), now_ms).await? {
            Some(session) => AuthState::Authenticated {
                username: session.user_name,
                session_id,
            },
            None => AuthState::Anonymous,
        };
        Ok(state)
    }

    /// Replace a valid session with a fresh id bound to the same user
    pub async fn regenerate(&self, session_id: &str) -> AuthResult<AuthState> {
        let Some(session_id) = SessionId::parse(session_id) else {
            return Err(AuthError::InvalidCredentials);
        };
        let key = session_id.key();

        let now_ms = Utc::now().timestamp_millis();
        let Some(session) = self.session_repo.find_active(&key, now_ms).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        // Lost a race with logout or another regenerate
        if !self.session_repo.delete(&key).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let state = self.start_session(session.user_name).await?;
        tracing::info!("Session regenerated");
        Ok(state)
    }

    /// Delete expired session rows
    pub async fn purge_expired(&self) -> AuthResult<u64> {
        self.session_repo
            .purge_expired(Utc::now().timestamp_millis())
            .await
    }

    async fn start_session(&self, username: UserName) -> AuthResult<AuthState> {
        let session_id = SessionId::generate();
        let session = Session::new(session_id.key(), username, self.config.session_ttl);
        self.session_repo.create(&session).await?;

        Ok(AuthState::Authenticated {
            username: session.user_name,
            session_id,
        })
    }
}
