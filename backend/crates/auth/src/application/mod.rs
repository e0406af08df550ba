//! Application Layer
//!
//! Use cases and application services.

pub mod authenticator;
pub mod config;
pub mod credential_store;

// Re-exports
pub use authenticator::{AuthState, Authenticator};
pub use config::{AuthConfig, ConfigError};
pub use credential_store::CredentialStore;
