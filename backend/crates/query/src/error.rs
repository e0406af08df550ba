//! Query Error Types

use thiserror::Error;

pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Error)]
pub enum QueryError {
    /// Backing store unreachable, pool exhausted or closed, or timed out.
    /// Fatal to the calling operation; never retried here.
    #[error("Backing store unavailable: {0}")]
    Connection(String),

    /// Unique, foreign key, not-null or check constraint rejected the write
    #[error("Constraint violation: {constraint}")]
    ConstraintViolation { constraint: String },

    /// Template could not be compiled
    #[error("Invalid statement template: {0}")]
    Template(String),

    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Unexpected parameter: {0}")]
    UnexpectedParameter(String),

    /// Result column missing, NULL where not allowed, or of another type
    #[error("Column '{column}': {reason}")]
    Column { column: String, reason: String },

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl QueryError {
    pub fn is_connection(&self) -> bool {
        matches!(self, QueryError::Connection(_))
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, QueryError::ConstraintViolation { .. })
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => match db_err.kind() {
                sqlx::error::ErrorKind::UniqueViolation
                | sqlx::error::ErrorKind::ForeignKeyViolation
                | sqlx::error::ErrorKind::NotNullViolation
                | sqlx::error::ErrorKind::CheckViolation => {
                    // SQLite reports no constraint name, only the message
                    let constraint = db_err
                        .constraint()
                        .map(str::to_owned)
                        .unwrap_or_else(|| db_err.message().to_owned());
                    QueryError::ConstraintViolation { constraint }
                }
                _ => QueryError::Database(sqlx::Error::Database(db_err)),
            },
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => QueryError::Connection(err.to_string()),
            sqlx::Error::ColumnNotFound(column) => QueryError::Column {
                column,
                reason: "not found in result".to_string(),
            },
            sqlx::Error::ColumnDecode { index, source } => QueryError::Column {
                column: index,
                reason: source.to_string(),
            },
            other => QueryError::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_connection_errors() {
        assert!(QueryError::from(sqlx::Error::PoolTimedOut).is_connection());
        assert!(QueryError::from(sqlx::Error::PoolClosed).is_connection());

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(QueryError::from(sqlx::Error::Io(io)).is_connection());
    }

    #[test]
    fn test_column_not_found() {
        let err = QueryError::from(sqlx::Error::ColumnNotFound("username".to_string()));
        assert!(matches!(err, QueryError::Column { ref column, .. } if column == "username"));
    }

    #[test]
    fn test_row_not_found_is_database_error() {
        let err = QueryError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, QueryError::Database(_)));
        assert!(!err.is_connection());
    }
}
