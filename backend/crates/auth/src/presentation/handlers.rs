//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;

use platform::cookie::{delete_cookie_header, extract_cookie, set_cookie_header};

use crate::application::{AuthState, Authenticator};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{LoginRequest, SessionResponse};

/// Shared state for auth handlers
pub struct AuthAppState<R>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
{
    pub authenticator: Arc<Authenticator<R, R>>,
}

impl<R> Clone for AuthAppState<R>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            authenticator: Arc::clone(&self.authenticator),
        }
    }
}

impl<R> AuthAppState<R>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
{
    fn session_cookie(&self, headers: &HeaderMap) -> Option<String> {
        extract_cookie(headers, &self.authenticator.config().session_cookie_name)
    }
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
{
    let current = state.session_cookie(&headers);

    let auth_state = state
        .authenticator
        .login(current.as_deref(), &req.username, req.password)
        .await?;

    let session_id = auth_state
        .session_id()
        .ok_or_else(|| AuthError::Internal("login produced no session".to_string()))?;
    let cookie = set_cookie_header(&state.authenticator.config().cookie(), session_id.as_str());

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SessionResponse::from(&auth_state)),
    ))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/auth/logout
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
{
    let current = state.session_cookie(&headers);
    state.authenticator.logout(current.as_deref()).await?;

    let cookie = delete_cookie_header(&state.authenticator.config().cookie());

    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

// ============================================================================
// Session Status
// ============================================================================

/// GET /api/auth/session
pub async fn session<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<Json<SessionResponse>>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
{
    let auth_state = match state.session_cookie(&headers) {
        Some(session_id) => state.authenticator.resolve(&session_id).await?,
        None => AuthState::Anonymous,
    };

    Ok(Json(SessionResponse::from(&auth_state)))
}
