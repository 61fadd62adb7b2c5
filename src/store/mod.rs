mod mapping;
mod query;
pub mod schema;
mod sqlite;
mod value;

pub use mapping::{Model, ModelStore, PrimaryKey};
pub use query::{Filter, Op, Query};
pub use schema::{Column, ColumnType, TableSchema};
pub use sqlite::SqliteStore;
pub use value::{Row, Value, truncate_timestamp};

use crate::error::Result;

/// Store defines the wide-column table interface.
///
/// Keys are passed as values in partition-then-clustering order. Writes are
/// upserts. Reads that no partition key or index can serve must opt into
/// filtering through [`Query::allow_filtering`].
pub trait Store: Send + Sync {
    /// Creates every table and index if missing.
    fn initialize(&self) -> Result<()>;

    fn insert(&self, table: &TableSchema, row: &Row) -> Result<()>;
    fn get(&self, table: &TableSchema, key: &[Value]) -> Result<Option<Row>>;
    fn select(&self, table: &TableSchema, query: &Query) -> Result<Vec<Row>>;
    /// Counting always scans, so the query must allow filtering.
    fn count(&self, table: &TableSchema, query: &Query) -> Result<i64>;
    /// Overwrites the non-key columns present in `row`; fails with
    /// `NotFound` when no row has its key.
    fn update(&self, table: &TableSchema, row: &Row) -> Result<()>;
    fn delete(&self, table: &TableSchema, key: &[Value]) -> Result<bool>;
    fn truncate(&self, table: &TableSchema) -> Result<()>;

    fn close(&self) -> Result<()>;
}
