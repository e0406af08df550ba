//! Auth Router

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::application::Authenticator;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router for any repository implementation.
/// Mount it under `/api/auth`.
pub fn auth_router<R>(authenticator: Authenticator<R, R>) -> Router
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
{
    let state = AuthAppState {
        authenticator: Arc::new(authenticator),
    };

    Router::new()
        .route("/login", post(handlers::login::<R>))
        .route("/logout", post(handlers::logout::<R>))
        .route("/session", get(handlers::session::<R>))
        .with_state(state)
}
