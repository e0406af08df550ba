//! Executor chosen from a database URL at runtime

use crate::error::{QueryError, QueryResult};
use crate::executor::{Dialect, PoolSettings, QueryExecutor};
use crate::postgres::PgExecutor;
use crate::result::ResultSet;
use crate::sqlite::SqliteExecutor;
use crate::statement::Statement;
use crate::value::Params;

#[derive(Clone)]
pub enum AnyExecutor {
    Sqlite(SqliteExecutor),
    Postgres(PgExecutor),
}

impl AnyExecutor {
    /// `sqlite:` URLs open SQLite, `postgres:`/`postgresql:` URLs open PostgreSQL
    pub async fn connect(url: &str, settings: &PoolSettings) -> QueryResult<Self> {
        let scheme = url.split(':').next().unwrap_or_default();
        match scheme {
            "sqlite" => Ok(Self::Sqlite(SqliteExecutor::connect(url, settings).await?)),
            "postgres" | "postgresql" => Ok(Self::Postgres(PgExecutor::connect(url, settings).await?)),
            _ => Err(QueryError::Connection(format!(
                "unsupported database URL scheme '{scheme}'"
            ))),
        }
    }
}

impl QueryExecutor for AnyExecutor {
    fn dialect(&self) -> Dialect {
        match self {
            Self::Sqlite(_) => Dialect::Sqlite,
            Self::Postgres(_) => Dialect::Postgres,
        }
    }

    async fn execute(&self, statement: &Statement, params: &Params) -> QueryResult<ResultSet> {
        match self {
            Self::Sqlite(executor) => executor.execute(statement, params).await,
            Self::Postgres(executor) => executor.execute(statement, params).await,
        }
    }
}
