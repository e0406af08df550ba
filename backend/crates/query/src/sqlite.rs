//! SQLite Executor

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::error::QueryResult;
use crate::executor::{Dialect, PoolSettings, QueryExecutor, with_deadline};
use crate::result::{ResultSet, decode_row};
use crate::statement::Statement;
use crate::value::{Params, Value};

type SqliteQuery<'q> = sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>>;

/// SQLite-backed executor
#[derive(Clone)]
pub struct SqliteExecutor {
    pool: SqlitePool,
    timeout: Duration,
}

impl SqliteExecutor {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            timeout: PoolSettings::default().acquire_timeout,
        }
    }

    /// Open (creating if missing) a database file in WAL mode
    pub async fn connect(url: &str, settings: &PoolSettings) -> QueryResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(settings.acquire_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_with(options)
            .await?;

        tracing::info!(url = %url, "Connected to SQLite");

        Ok(Self {
            pool,
            timeout: settings.acquire_timeout,
        })
    }

    /// Private in-memory database. A single connection that is never
    /// recycled, since each connection would otherwise see its own empty
    /// database.
    pub async fn in_memory() -> QueryResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Ok(Self::new(pool))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn bind_all<'q>(mut query: SqliteQuery<'q>, values: Vec<&Value>) -> SqliteQuery<'q> {
    for value in values {
        query = match value {
            Value::Text(s) => query.bind(s.clone()),
            Value::Integer(i) => query.bind(*i),
            Value::Timestamp(t) => query.bind(*t),
        };
    }
    query
}

impl SqliteExecutor {
    async fn run(&self, statement: &Statement, query: SqliteQuery<'_>) -> QueryResult<ResultSet> {
        if statement.columns().is_empty() {
            let done = query.execute(&self.pool).await?;
            return Ok(ResultSet::new(Vec::new(), done.rows_affected()));
        }

        let raw = query.fetch_all(&self.pool).await?;
        let rows = raw
            .iter()
            .map(|r| decode_row(r, statement.columns()))
            .collect::<QueryResult<Vec<_>>>()?;
        let count = rows.len() as u64;
        Ok(ResultSet::new(rows, count))
    }
}

impl QueryExecutor for SqliteExecutor {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn execute(&self, statement: &Statement, params: &Params) -> QueryResult<ResultSet> {
        let values = statement.bind_order(params)?;
        let query = bind_all(sqlx::query(statement.sql()), values);

        tracing::debug!(template = statement.template(), "Executing statement");

        with_deadline(self.timeout, self.run(statement, query)).await
    }
}
