//! Credential Store and Authenticator tests against in-memory SQLite

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use platform::password::HashingParams;
use query::{Column, Params, PoolSettings, QueryExecutor, SqliteExecutor, Statement};
use tower::ServiceExt;

use crate::application::{AuthConfig, AuthState, Authenticator};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::session_id::SessionId;
use crate::domain::value_object::user_name::{UserName, UsernameCase};
use crate::error::AuthError;
use crate::infra::SqlAuthRepository;
use crate::presentation::router::auth_router;

type Repo = SqlAuthRepository<SqliteExecutor>;

async fn repo() -> Arc<Repo> {
    let executor = SqliteExecutor::in_memory().await.unwrap();
    let repo = SqlAuthRepository::new(executor).unwrap();
    repo.initialize().await.unwrap();
    Arc::new(repo)
}

fn authenticator(repo: &Arc<Repo>, config: AuthConfig) -> Authenticator<Repo, Repo> {
    Authenticator::new(repo.clone(), repo.clone(), Arc::new(config)).unwrap()
}

async fn setup() -> Authenticator<Repo, Repo> {
    authenticator(&repo().await, AuthConfig::for_tests())
}

fn session_of(state: &AuthState) -> String {
    state.session_id().unwrap().as_str().to_string()
}

// ============================================================================
// Credential Store
// ============================================================================

#[tokio::test]
async fn test_create_then_login_resolves_to_user() {
    let auth = setup().await;
    auth.credentials()
        .create_user("alice", "correct horse".to_string())
        .await
        .unwrap();

    let state = auth
        .login(None, "alice", "correct horse".to_string())
        .await
        .unwrap();
    assert!(state.is_authenticated());
    assert_eq!(state.username().unwrap().as_str(), "alice");

    let resolved = auth.resolve(&session_of(&state)).await.unwrap();
    assert_eq!(resolved, state);
}

#[tokio::test]
async fn test_duplicate_create_keeps_original_hash() {
    let auth = setup().await;
    auth.credentials()
        .create_user("alice", "first".to_string())
        .await
        .unwrap();

    let err = auth
        .credentials()
        .create_user("alice", "second".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::DuplicateUsername));

    assert!(auth.login(None, "alice", "first".to_string()).await.is_ok());
    assert!(matches!(
        auth.login(None, "alice", "second".to_string()).await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_concurrent_duplicate_creates_yield_one_success() {
    let auth = setup().await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = auth.credentials().clone();
            tokio::spawn(async move { store.create_user("carol", format!("password-{i}")).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(AuthError::DuplicateUsername) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(created, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unique_index_arbitrates_parallel_creates_on_pooled_file() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("auth.db").display());
    let settings = PoolSettings::default();
    assert!(settings.max_connections > 1);

    let executor = SqliteExecutor::connect(&url, &settings).await.unwrap();
    let repo = SqlAuthRepository::new(executor).unwrap();
    repo.initialize().await.unwrap();
    let auth = authenticator(&Arc::new(repo), AuthConfig::for_tests());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let store = auth.credentials().clone();
            tokio::spawn(async move { store.create_user("dave", format!("password-{i}")).await })
        })
        .collect();

    let mut created = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(AuthError::DuplicateUsername) => duplicates += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(duplicates, 15);

    assert!(auth.credentials().find_by_username("dave").await.is_ok());
}

#[tokio::test]
async fn test_create_user_validates_input() {
    let auth = setup().await;
    let store = auth.credentials();

    assert!(matches!(
        store.create_user("   ", "pw".to_string()).await,
        Err(AuthError::Validation(_))
    ));
    assert!(matches!(
        store.create_user("dave", "".to_string()).await,
        Err(AuthError::Validation(_))
    ));
    assert!(matches!(
        store.create_user("da\u{7}ve", "pw".to_string()).await,
        Err(AuthError::Validation(_))
    ));
}

#[tokio::test]
async fn test_find_by_username_not_found() {
    let auth = setup().await;
    assert!(matches!(
        auth.credentials().find_by_username("nobody").await,
        Err(AuthError::NotFound)
    ));
}

#[tokio::test]
async fn test_password_hash_is_argon2id_not_plaintext() {
    let auth = setup().await;
    auth.credentials()
        .create_user("alice", "plaintext-secret".to_string())
        .await
        .unwrap();

    let user = auth.credentials().find_by_username("alice").await.unwrap();
    let phc = user.password_hash.as_phc_string();
    assert!(phc.starts_with("$argon2id$"));
    assert!(!phc.contains("plaintext-secret"));
}

#[tokio::test]
async fn test_rehash_on_login_when_costs_change() {
    let repo = repo().await;
    let old = authenticator(&repo, AuthConfig::for_tests());
    old.credentials()
        .create_user("alice", "pw".to_string())
        .await
        .unwrap();

    let stronger = HashingParams {
        memory_kib: 16,
        ..HashingParams::minimal()
    };
    let new = authenticator(
        &repo,
        AuthConfig {
            password_hashing: stronger,
            ..AuthConfig::for_tests()
        },
    );

    let before = new.credentials().find_by_username("alice").await.unwrap();
    assert!(before.password_hash.needs_rehash(&stronger));

    new.login(None, "alice", "pw".to_string()).await.unwrap();

    let after = new.credentials().find_by_username("alice").await.unwrap();
    assert!(!after.password_hash.needs_rehash(&stronger));
    assert!(new.login(None, "alice", "pw".to_string()).await.is_ok());
}

#[tokio::test]
async fn test_pepper_must_match() {
    let repo = repo().await;
    let peppered = authenticator(
        &repo,
        AuthConfig {
            password_pepper: Some(b"pepper-one".to_vec()),
            ..AuthConfig::for_tests()
        },
    );
    peppered
        .credentials()
        .create_user("alice", "pw".to_string())
        .await
        .unwrap();
    assert!(peppered.login(None, "alice", "pw".to_string()).await.is_ok());

    let unpeppered = authenticator(&repo, AuthConfig::for_tests());
    assert!(matches!(
        unpeppered.login(None, "alice", "pw".to_string()).await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_case_insensitive_usernames() {
    let auth = authenticator(
        &repo().await,
        AuthConfig {
            username_case: UsernameCase::CaseInsensitive,
            ..AuthConfig::for_tests()
        },
    );
    auth.credentials()
        .create_user("Bob", "pw".to_string())
        .await
        .unwrap();

    assert!(matches!(
        auth.credentials().create_user("BOB", "pw".to_string()).await,
        Err(AuthError::DuplicateUsername)
    ));

    let state = auth.login(None, "bOb", "pw".to_string()).await.unwrap();
    assert_eq!(state.username().unwrap().as_str(), "bob");
}

#[tokio::test]
async fn test_case_sensitive_usernames_are_distinct() {
    let auth = setup().await;
    auth.credentials()
        .create_user("Bob", "upper".to_string())
        .await
        .unwrap();
    auth.credentials()
        .create_user("bob", "lower".to_string())
        .await
        .unwrap();

    assert!(auth.login(None, "Bob", "upper".to_string()).await.is_ok());
    assert!(auth.login(None, "bob", "lower".to_string()).await.is_ok());
    assert!(auth.login(None, "bob", "upper".to_string()).await.is_err());
}

// ============================================================================
// Authenticator
// ============================================================================

#[tokio::test]
async fn test_wrong_password_and_unknown_user_are_indistinguishable() {
    let auth = setup().await;
    auth.credentials()
        .create_user("alice", "right".to_string())
        .await
        .unwrap();

    let wrong = auth
        .login(None, "alice", "wrong".to_string())
        .await
        .unwrap_err();
    let unknown = auth
        .login(None, "mallory", "wrong".to_string())
        .await
        .unwrap_err();

    assert!(matches!(wrong, AuthError::InvalidCredentials));
    assert!(matches!(unknown, AuthError::InvalidCredentials));
    assert_eq!(wrong.to_string(), unknown.to_string());
    assert_eq!(wrong.kind(), unknown.kind());
    assert_eq!(
        wrong.to_app_error().problem_body(),
        unknown.to_app_error().problem_body()
    );
}

#[tokio::test]
async fn test_empty_input_is_validation_error() {
    let auth = setup().await;
    assert!(matches!(
        auth.login(None, "", "pw".to_string()).await,
        Err(AuthError::Validation(_))
    ));
    assert!(matches!(
        auth.login(None, "alice", "".to_string()).await,
        Err(AuthError::Validation(_))
    ));
}

#[tokio::test]
async fn test_login_mints_fresh_id_and_invalidates_previous() {
    let auth = setup().await;
    auth.credentials()
        .create_user("alice", "pw".to_string())
        .await
        .unwrap();

    let first = auth.login(None, "alice", "pw".to_string()).await.unwrap();
    let first_id = session_of(&first);

    let second = auth
        .login(Some(&first_id), "alice", "pw".to_string())
        .await
        .unwrap();
    let second_id = session_of(&second);

    assert_ne!(first_id, second_id);
    assert_eq!(auth.resolve(&first_id).await.unwrap(), AuthState::Anonymous);
    assert!(auth.resolve(&second_id).await.unwrap().is_authenticated());
}

#[tokio::test]
async fn test_planted_session_id_is_never_authenticated() {
    let auth = setup().await;
    auth.credentials()
        .create_user("alice", "pw".to_string())
        .await
        .unwrap();

    let planted = SessionId::generate();
    let state = auth
        .login(Some(planted.as_str()), "alice", "pw".to_string())
        .await
        .unwrap();

    assert_ne!(state.session_id().unwrap(), &planted);
    assert_eq!(
        auth.resolve(planted.as_str()).await.unwrap(),
        AuthState::Anonymous
    );
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let auth = setup().await;
    auth.credentials()
        .create_user("alice", "pw".to_string())
        .await
        .unwrap();
    let state = auth.login(None, "alice", "pw".to_string()).await.unwrap();
    let id = session_of(&state);

    assert_eq!(auth.logout(Some(&id)).await.unwrap(), AuthState::Anonymous);
    assert_eq!(auth.resolve(&id).await.unwrap(), AuthState::Anonymous);
    assert_eq!(auth.logout(Some(&id)).await.unwrap(), AuthState::Anonymous);
    assert_eq!(auth.logout(None).await.unwrap(), AuthState::Anonymous);
}

#[tokio::test]
async fn test_bob_scenario() {
    let auth = setup().await;
    auth.credentials()
        .create_user("bob", "s3cr3t".to_string())
        .await
        .unwrap();

    assert!(matches!(
        auth.login(None, "bob", "S3CR3T".to_string()).await,
        Err(AuthError::InvalidCredentials)
    ));

    let state = auth.login(None, "bob", "s3cr3t".to_string()).await.unwrap();
    let id = session_of(&state);
    let resolved = auth.resolve(&id).await.unwrap();
    assert_eq!(resolved.username().unwrap().as_str(), "bob");

    auth.logout(Some(&id)).await.unwrap();
    assert_eq!(auth.resolve(&id).await.unwrap(), AuthState::Anonymous);
}

#[tokio::test]
async fn test_resolve_malformed_ids_are_anonymous() {
    let auth = setup().await;
    for raw in ["", "garbage", "' OR '1'='1", "%00", &"A".repeat(10_000)] {
        assert_eq!(auth.resolve(raw).await.unwrap(), AuthState::Anonymous);
    }
}

#[tokio::test]
async fn test_regenerate_carries_identity_and_kills_old_id() {
    let auth = setup().await;
    auth.credentials()
        .create_user("alice", "pw".to_string())
        .await
        .unwrap();
    let state = auth.login(None, "alice", "pw".to_string()).await.unwrap();
    let old_id = session_of(&state);

    let regenerated = auth.regenerate(&old_id).await.unwrap();
    let new_id = session_of(&regenerated);

    assert_ne!(old_id, new_id);
    assert_eq!(regenerated.username(), state.username());
    assert_eq!(auth.resolve(&old_id).await.unwrap(), AuthState::Anonymous);
    assert!(auth.resolve(&new_id).await.unwrap().is_authenticated());

    assert!(matches!(
        auth.regenerate(&old_id).await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        auth.regenerate("garbage").await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_expired_sessions_resolve_anonymous_and_are_purged() {
    let repo = repo().await;
    let short = authenticator(
        &repo,
        AuthConfig {
            session_ttl: Some(Duration::from_millis(1)),
            ..AuthConfig::for_tests()
        },
    );
    short
        .credentials()
        .create_user("alice", "pw".to_string())
        .await
        .unwrap();
    let state = short.login(None, "alice", "pw".to_string()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;

    let id = session_of(&state);
    assert_eq!(short.resolve(&id).await.unwrap(), AuthState::Anonymous);
    assert!(matches!(
        short.regenerate(&id).await,
        Err(AuthError::InvalidCredentials)
    ));

    // Resolve never deletes; purge does
    assert_eq!(short.purge_expired().await.unwrap(), 1);
    assert_eq!(short.purge_expired().await.unwrap(), 0);
}

#[tokio::test]
async fn test_sessions_without_ttl_survive_purge() {
    let auth = authenticator(
        &repo().await,
        AuthConfig {
            session_ttl: None,
            ..AuthConfig::for_tests()
        },
    );
    auth.credentials()
        .create_user("alice", "pw".to_string())
        .await
        .unwrap();
    let state = auth.login(None, "alice", "pw".to_string()).await.unwrap();

    assert_eq!(auth.purge_expired().await.unwrap(), 0);
    assert!(auth.resolve(&session_of(&state)).await.unwrap().is_authenticated());
}

#[tokio::test]
async fn test_session_table_stores_digest_only() {
    let repo = repo().await;
    let auth = authenticator(&repo, AuthConfig::for_tests());
    auth.credentials()
        .create_user("alice", "pw".to_string())
        .await
        .unwrap();
    let state = auth.login(None, "alice", "pw".to_string()).await.unwrap();
    let id = state.session_id().unwrap();

    let all = Statement::new("SELECT session_id FROM sessions")
        .unwrap()
        .returning([Column::text("session_id")]);
    let rows = repo.executor().execute(&all, &Params::new()).await.unwrap();

    assert_eq!(rows.rows().len(), 1);
    let stored = rows.rows()[0].text("session_id").unwrap();
    assert_eq!(stored, id.key().as_str());
    assert_ne!(stored, id.as_str());
}

#[tokio::test]
async fn test_injection_strings_are_data() {
    let repo = repo().await;
    let auth = authenticator(&repo, AuthConfig::for_tests());
    auth.credentials()
        .create_user("alice", "pw".to_string())
        .await
        .unwrap();

    assert!(matches!(
        auth.login(None, "' OR '1'='1", "' OR '1'='1".to_string())
            .await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        auth.login(None, "alice' --", "anything".to_string()).await,
        Err(AuthError::InvalidCredentials)
    ));

    // A user literally named like an injection is just a user
    auth.credentials()
        .create_user("' OR '1'='1", "pw".to_string())
        .await
        .unwrap();
    let state = auth
        .login(None, "' OR '1'='1", "pw".to_string())
        .await
        .unwrap();
    assert_eq!(state.username().unwrap().as_str(), "' OR '1'='1");

    // Both rows are intact
    let name = UserName::new("alice", UsernameCase::CaseSensitive).unwrap();
    assert!(repo.find_by_user_name(&name).await.unwrap().is_some());
}

#[tokio::test]
async fn test_closed_store_is_connection_error() {
    let repo = repo().await;
    let auth = authenticator(&repo, AuthConfig::for_tests());
    repo.executor().pool().close().await;

    let err = auth
        .login(None, "alice", "pw".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Connection(_)));
}

#[tokio::test]
async fn test_unusable_name_still_queries_the_store() {
    let repo = repo().await;
    let auth = authenticator(&repo, AuthConfig::for_tests());
    let too_long = "x".repeat(65);

    assert!(matches!(
        auth.login(None, &too_long, "pw".to_string()).await,
        Err(AuthError::InvalidCredentials)
    ));

    repo.executor().pool().close().await;

    // Same outcome as an unknown valid name: the lookup ran and failed
    let unknown = auth.login(None, "nobody", "pw".to_string()).await.unwrap_err();
    let unusable = auth.login(None, &too_long, "pw".to_string()).await.unwrap_err();
    assert!(matches!(unknown, AuthError::Connection(_)));
    assert!(matches!(unusable, AuthError::Connection(_)));
}

// ============================================================================
// HTTP surface
// ============================================================================

fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().to_string()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn login_request(username: &str, password: &str) -> Request<Body> {
    Request::post("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({"username": username, "password": password}).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_http_login_session_logout() {
    let auth = setup().await;
    auth.credentials()
        .create_user("bob", "s3cr3t".to_string())
        .await
        .unwrap();
    let app = auth_router(auth);

    let response = app
        .clone()
        .oneshot(login_request("bob", "s3cr3t"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("sid="));
    assert!(set_cookie.contains("HttpOnly"));
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"authenticated": true, "username": "bob"})
    );
    let cookie = cookie_pair(&set_cookie);

    let response = app
        .clone()
        .oneshot(
            Request::get("/session")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"authenticated": true, "username": "bob"})
    );

    let response = app
        .clone()
        .oneshot(
            Request::post("/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));

    let response = app
        .oneshot(
            Request::get("/session")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"authenticated": false, "username": null})
    );
}

#[tokio::test]
async fn test_http_failed_logins_look_identical() {
    let auth = setup().await;
    auth.credentials()
        .create_user("bob", "s3cr3t".to_string())
        .await
        .unwrap();
    let app = auth_router(auth);

    let wrong = app
        .clone()
        .oneshot(login_request("bob", "S3CR3T"))
        .await
        .unwrap();
    let unknown = app
        .oneshot(login_request("nobody", "s3cr3t"))
        .await
        .unwrap();

    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert!(wrong.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_json(wrong).await, body_json(unknown).await);
}
