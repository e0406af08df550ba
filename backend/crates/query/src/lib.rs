//! Parameterized Query Executor
//!
//! Every statement is a `'static` template with named `:placeholders`.
//! Variable data only ever travels through [`Params`], so no API in this
//! crate accepts query text assembled at runtime.
//!
//! - `statement` - Template compilation and typed result columns
//! - `value` - Bound parameter values
//! - `result` - Decoded rows
//! - `executor` - The [`QueryExecutor`] trait
//! - `sqlite` / `postgres` - sqlx-backed executors
//! - `any` - Executor picked from a database URL

pub mod any;
pub mod error;
pub mod executor;
pub mod postgres;
pub mod result;
pub mod sqlite;
pub mod statement;
pub mod value;


pub use any::AnyExecutor;
pub use error::{QueryError, QueryResult};
pub use executor::{Dialect, PoolSettings, QueryExecutor};
pub use postgres::PgExecutor;
pub use result::{ResultSet, Row};
pub use sqlite::SqliteExecutor;
pub use statement::{Column, ColumnType, Statement};
pub use value::{Params, Value};
