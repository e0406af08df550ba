//! SQL Repository Implementations
//!
//! One repository for both tables, generic over the query executor so the
//! same statements run on SQLite and PostgreSQL.

use std::sync::Arc;

use query::{Column, Params, QueryExecutor, Row, Statement};

use crate::domain::entity::{session::Session, user::User};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{
    session_id::SessionKey, user_id::UserId, user_name::UserName, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};
use crate::infra::schema;

/// Statements compiled once per repository
struct Statements {
    insert_user: Statement,
    find_user: Statement,
    update_password_hash: Statement,
    insert_session: Statement,
    insert_session_without_expiry: Statement,
    find_active_session: Statement,
    delete_session: Statement,
    purge_expired: Statement,
}

impl Statements {
    fn compile() -> AuthResult<Self> {
        Ok(Self {
            insert_user: Statement::new(
                "INSERT INTO users (id, username, password_hash, created_at) \
                 VALUES (:id, :username, :password_hash, :created_at)",
            )?,
            find_user: Statement::new(
                "SELECT id, username, password_hash, created_at \
                 FROM users WHERE username = :username",
            )?
            .returning([
                Column::text("id"),
                Column::text("username"),
                Column::text("password_hash"),
                Column::timestamp("created_at"),
            ]),
            update_password_hash: Statement::new(
                "UPDATE users SET password_hash = :password_hash WHERE id = :id",
            )?,
            insert_session: Statement::new(
                "INSERT INTO sessions (session_id, username, created_at, expires_at_ms) \
                 VALUES (:session_id, :username, :created_at, :expires_at_ms)",
            )?,
            insert_session_without_expiry: Statement::new(
                "INSERT INTO sessions (session_id, username, created_at, expires_at_ms) \
                 VALUES (:session_id, :username, :created_at, NULL)",
            )?,
            find_active_session: Statement::new(
                "SELECT session_id, username, created_at, expires_at_ms \
                 FROM sessions \
                 WHERE session_id = :session_id \
                 AND (expires_at_ms IS NULL OR expires_at_ms > :now_ms)",
            )?
            .returning([
                Column::text("session_id"),
                Column::text("username"),
                Column::timestamp("created_at"),
                Column::integer("expires_at_ms").nullable(),
            ]),
            delete_session: Statement::new("DELETE FROM sessions WHERE session_id = :session_id")?,
            purge_expired: Statement::new(
                "DELETE FROM sessions WHERE expires_at_ms IS NOT NULL AND expires_at_ms <= :now_ms",
            )?,
        })
    }
}

/// SQL-backed auth repository
pub struct SqlAuthRepository<E> {
    executor: E,
    statements: Arc<Statements>,
}

impl<E: Clone> Clone for SqlAuthRepository<E> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            statements: Arc::clone(&self.statements),
        }
    }
}

impl<E> SqlAuthRepository<E>
where
    E: QueryExecutor + Sync,
{
    pub fn new(executor: E) -> AuthResult<Self> {
        Ok(Self {
            executor,
            statements: Arc::new(Statements::compile()?),
        })
    }

    /// Create tables and indexes if missing. Call once at startup.
    pub async fn initialize(&self) -> AuthResult<()> {
        schema::initialize(&self.executor).await
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}

fn user_from_row(row: &Row) -> AuthResult<User> {
    let user_id = row
        .text("id")?
        .parse::<UserId>()
        .map_err(|e| AuthError::Internal(format!("Stored user id: {e}")))?;

    Ok(User {
        user_id,
        user_name: UserName::from_db(row.text("username")?),
        password_hash: UserPassword::from_db(row.text("password_hash")?)?,
        created_at: row.timestamp("created_at")?,
    })
}

fn session_from_row(row: &Row) -> AuthResult<Session> {
    Ok(Session {
        session_key: SessionKey::from_db(row.text("session_id")?),
        user_name: UserName::from_db(row.text("username")?),
        created_at: row.timestamp("created_at")?,
        expires_at_ms: row.opt_integer("expires_at_ms")?,
    })
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl<E> UserRepository for SqlAuthRepository<E>
where
    E: QueryExecutor + Sync,
{
    async fn create(&self, user: &User) -> AuthResult<()> {
        let params = Params::new()
            .bind("id", user.user_id.to_string())
            .bind("username", user.user_name.as_str())
            .bind("password_hash", user.password_hash.as_phc_string())
            .bind("created_at", user.created_at);

        match self
            .executor
            .execute(&self.statements.insert_user, &params)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.is_constraint_violation() => Err(AuthError::DuplicateUsername),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        let params = Params::new().bind("username", user_name.as_str());
        let result = self
            .executor
            .execute(&self.statements.find_user, &params)
            .await?;

        result.first().map(user_from_row).transpose()
    }

    async fn update_password_hash(
        &self,
        user_id: &UserId,
        password_hash: &UserPassword,
    ) -> AuthResult<()> {
        let params = Params::new()
            .bind("id", user_id.to_string())
            .bind("password_hash", password_hash.as_phc_string());
        let result = self
            .executor
            .execute(&self.statements.update_password_hash, &params)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound);
        }
        Ok(())
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl<E> SessionRepository for SqlAuthRepository<E>
where
    E: QueryExecutor + Sync,
{
    async fn create(&self, session: &Session) -> AuthResult<()> {
        let params = Params::new()
            .bind("session_id", session.session_key.as_str())
            .bind("username", session.user_name.as_str())
            .bind("created_at", session.created_at);

        let (statement, params) = match session.expires_at_ms {
            Some(expires_at_ms) => (
                &self.statements.insert_session,
                params.bind("expires_at_ms", expires_at_ms),
            ),
            None => (&self.statements.insert_session_without_expiry, params),
        };

        self.executor.execute(statement, &params).await?;
        Ok(())
    }

    async fn find_active(&self, key: &SessionKey, now_ms: i64) -> AuthResult<Option<Session>> {
        let params = Params::new()
            .bind("session_id", key.as_str())
            .bind("now_ms", now_ms);
        let result = self
            .executor
            .execute(&self.statements.find_active_session, &params)
            .await?;

        result.first().map(session_from_row).transpose()
    }

    async fn delete(&self, key: &SessionKey) -> AuthResult<bool> {
        let params = Params::new().bind("session_id", key.as_str());
        let result = self
            .executor
            .execute(&self.statements.delete_session, &params)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self, now_ms: i64) -> AuthResult<u64> {
        let params = Params::new().bind("now_ms", now_ms);
        let deleted = self
            .executor
            .execute(&self.statements.purge_expired, &params)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired auth sessions");

        Ok(deleted)
    }
}
