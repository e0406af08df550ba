//! Typed Result Rows

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{ColumnIndex, Decode, Type};

use crate::error::{QueryError, QueryResult};
use crate::statement::{Column, ColumnType};
use crate::value::Value;

/// One decoded result row. NULL columns are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: HashMap<&'static str, Value>,
}

impl Row {
    pub(crate) fn insert(&mut self, column: &'static str, value: Value) {
        self.values.insert(column, value);
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn text(&self, column: &str) -> QueryResult<&str> {
        match self.required(column)? {
            Value::Text(s) => Ok(s),
            other => Err(mismatch(column, "text", other)),
        }
    }

    pub fn integer(&self, column: &str) -> QueryResult<i64> {
        match self.required(column)? {
            Value::Integer(i) => Ok(*i),
            other => Err(mismatch(column, "integer", other)),
        }
    }

    pub fn timestamp(&self, column: &str) -> QueryResult<DateTime<Utc>> {
        match self.required(column)? {
            Value::Timestamp(t) => Ok(*t),
            other => Err(mismatch(column, "timestamp", other)),
        }
    }

    pub fn opt_integer(&self, column: &str) -> QueryResult<Option<i64>> {
        match self.values.get(column) {
            None => Ok(None),
            Some(Value::Integer(i)) => Ok(Some(*i)),
            Some(other) => Err(mismatch(column, "integer", other)),
        }
    }

    fn required(&self, column: &str) -> QueryResult<&Value> {
        self.values.get(column).ok_or_else(|| QueryError::Column {
            column: column.to_string(),
            reason: "missing or NULL".to_string(),
        })
    }
}

fn mismatch(column: &str, expected: &str, actual: &Value) -> QueryError {
    QueryError::Column {
        column: column.to_string(),
        reason: format!("expected {expected}, found {}", actual.type_name()),
    }
}

/// Decode the declared columns of a driver row
pub(crate) fn decode_row<R>(raw: &R, columns: &[Column]) -> QueryResult<Row>
where
    R: sqlx::Row,
    for<'c> &'c str: ColumnIndex<R>,
    for<'r> String: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> i64: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> DateTime<Utc>: Decode<'r, R::Database> + Type<R::Database>,
{
    let mut row = Row::default();
    for column in columns {
        let value = match column.kind {
            ColumnType::Text => raw.try_get::<Option<String>, _>(column.name)?.map(Value::Text),
            ColumnType::Integer => raw.try_get::<Option<i64>, _>(column.name)?.map(Value::Integer),
            ColumnType::Timestamp => raw
                .try_get::<Option<DateTime<Utc>>, _>(column.name)?
                .map(Value::Timestamp),
        };

        match value {
            Some(value) => row.insert(column.name, value),
            None if column.nullable => {}
            None => {
                return Err(QueryError::Column {
                    column: column.name.to_string(),
                    reason: "unexpected NULL".to_string(),
                });
            }
        }
    }
    Ok(row)
}

/// Outcome of one statement execution
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    rows: Vec<Row>,
    rows_affected: u64,
}

impl ResultSet {
    pub(crate) fn new(rows: Vec<Row>, rows_affected: u64) -> Self {
        Self {
            rows,
            rows_affected,
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn into_first(self) -> Option<Row> {
        self.rows.into_iter().next()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows written by INSERT/UPDATE/DELETE, or rows returned by a query
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }
}
