//! Database module
//!
//! Connection pooling, schema introspection and guarded query execution.

pub mod connection;
pub mod gateway;
pub mod schema;

// Re-exports
pub use connection::{DatabaseBackend, DatabasePool};
pub use gateway::{DatabaseGateway, QueryResult};
pub use schema::{ColumnInfo, TableSchema};
