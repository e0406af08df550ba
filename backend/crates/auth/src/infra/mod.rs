//! Infrastructure Layer
//!
//! SQL repository and schema setup on top of the `query` executors.

pub mod schema;
pub mod sql;

pub use sql::SqlAuthRepository;
