//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Credential Store and Authenticator
//! - `infra/` - SQL repository and schema on top of `query`
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - User provisioning with username + password
//! - Login / logout / session lookup / session regeneration
//! - Server-side sessions with cookie-borne ids
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional pepper, re-hashed when costs change
//! - Session ids are 256 random bits; only their SHA-256 digest is stored
//! - Fresh session id on every login (no fixation)
//! - Unknown users and wrong passwords are indistinguishable, including in cost

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::{AuthConfig, AuthState, Authenticator, ConfigError, CredentialStore};
pub use error::{AuthError, AuthResult};
pub use infra::SqlAuthRepository;
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
