//! Executor Trait

use std::future::Future;
use std::time::Duration;

use crate::error::{QueryError, QueryResult};
use crate::result::ResultSet;
use crate::statement::Statement;
use crate::value::Params;

/// SQL dialect of the backing store, for the few statements that differ
/// (DDL column types)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

/// Connection pool settings shared by both executors
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    /// Bounds both connection acquisition and each statement
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Runs compiled statements with named parameters against a backing store
///
/// Implementations must send every [`Params`] value as a bound parameter
/// and never splice it into SQL text.
#[trait_variant::make(QueryExecutor: Send)]
pub trait LocalQueryExecutor {
    fn dialect(&self) -> Dialect;

    async fn execute(&self, statement: &Statement, params: &Params) -> QueryResult<ResultSet>;
}

/// Bound a store round-trip. Elapsed deadlines surface as connection errors.
pub(crate) async fn with_deadline<T>(
    limit: Duration,
    fut: impl Future<Output = QueryResult<T>>,
) -> QueryResult<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(QueryError::Connection(format!(
            "statement timed out after {}ms",
            limit.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deadline_elapsed_is_connection_error() {
        let result: QueryResult<()> = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(result.unwrap_err().is_connection());
    }

    #[tokio::test]
    async fn test_deadline_passes_result_through() {
        let result = with_deadline(Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
