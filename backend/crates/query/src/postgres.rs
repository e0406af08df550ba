//! PostgreSQL Executor

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::{PgArguments, PgPoolOptions};

use crate::error::QueryResult;
use crate::executor::{Dialect, PoolSettings, QueryExecutor, with_deadline};
use crate::result::{ResultSet, decode_row};
use crate::statement::Statement;
use crate::value::{Params, Value};

type PgQuery<'q> = sqlx::query::Query<'q, sqlx::Postgres, PgArguments>;

/// PostgreSQL-backed executor
#[derive(Clone)]
pub struct PgExecutor {
    pool: PgPool,
    timeout: Duration,
}

impl PgExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: PoolSettings::default().acquire_timeout,
        }
    }

    pub async fn connect(url: &str, settings: &PoolSettings) -> QueryResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect(url)
            .await?;

        tracing::info!("Connected to PostgreSQL");

        Ok(Self {
            pool,
            timeout: settings.acquire_timeout,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn bind_all<'q>(mut query: PgQuery<'q>, values: Vec<&Value>) -> PgQuery<'q> {
    for value in values {
        query = match value {
            Value::Text(s) => query.bind(s.clone()),
            Value::Integer(i) => query.bind(*i),
            Value::Timestamp(t) => query.bind(*t),
        };
    }
    query
}

impl PgExecutor {
    async fn run(&self, statement: &Statement, query: PgQuery<'_>) -> QueryResult<ResultSet> {
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

impl QueryExecutor for PgExecutor {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn execute(&self, statement: &Statement, params: &Params) -> QueryResult<ResultSet> {
        let values = statement.bind_order(params)?;
        let query = bind_all(sqlx::query(statement.sql()), values);

        tracing::debug!(template = statement.template(), "Executing statement");

        with_deadline(self.timeout, self.run(statement, query)).await
    }
}
