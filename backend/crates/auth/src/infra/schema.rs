//! Schema Setup
//!
//! Idempotent DDL, run once at startup. Column types differ per dialect
//! only where SQLite and PostgreSQL disagree on timestamps and 64-bit
//! integers.

use query::{Dialect, Params, QueryExecutor, Statement};

use crate::error::AuthResult;

const SQLITE: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMP NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sessions (
        session_id TEXT PRIMARY KEY,
        username TEXT NOT NULL,
        created_at TIMESTAMP NOT NULL,
        expires_at_ms INTEGER NULL
    )",
    "CREATE INDEX IF NOT EXISTS sessions_expires_at_ms_idx ON sessions (expires_at_ms)",
];

const POSTGRES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sessions (
        session_id TEXT PRIMARY KEY,
        username TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        expires_at_ms BIGINT NULL
    )",
    "CREATE INDEX IF NOT EXISTS sessions_expires_at_ms_idx ON sessions (expires_at_ms)",
];

pub async fn initialize<E: QueryExecutor>(executor: &E) -> AuthResult<()> {
    let ddl = match executor.dialect() {
        Dialect::Sqlite => SQLITE,
        Dialect::Postgres => POSTGRES,
    };

    for &template in ddl {
        let statement = Statement::new(template)?;
        executor.execute(&statement, &Params::new()).await?;
    }

    tracing::info!(dialect = ?executor.dialect(), "Auth schema ready");
    Ok(())
}
