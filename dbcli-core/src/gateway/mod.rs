//! Database gateway: one method per supported operation.
//!
//! Each call is a self-contained unit of work. The PostgreSQL implementation
//! opens a connection, runs one statement (or one script), and closes the
//! connection before returning, whether the statement succeeded or not.
//! Nothing is cached between calls.

use crate::Result;
use crate::models::{FieldUpdate, NewRecord, ProductionRecord, TableName};
use async_trait::async_trait;
use std::path::Path;

pub mod postgres;
mod queries;

pub use postgres::PostgresGateway;

/// Operations the command dispatcher can perform against the database.
///
/// The trait is object-safe so the dispatcher can be exercised against an
/// in-memory implementation.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Connects and returns the server version string.
    async fn check_connection(&self) -> Result<String>;

    /// Executes the SQL script at `path` verbatim and returns the public
    /// tables that exist afterwards.
    ///
    /// A script with several statements may be partially applied when a
    /// later statement fails.
    async fn create_tables(&self, path: &Path) -> Result<Vec<String>>;

    /// Drops `table`.
    async fn delete_table(&self, table: &TableName) -> Result<()>;

    /// Lists the public tables ordered by name.
    async fn view_tables(&self) -> Result<Vec<String>>;

    /// Inserts a record into `table` and returns its assigned id.
    async fn create_record(&self, table: &TableName, record: &NewRecord) -> Result<i32>;

    /// Returns every record in `table` ordered by id.
    async fn view_all_records(&self, table: &TableName) -> Result<Vec<ProductionRecord>>;

    /// Returns the record with `id`, or `None` if there is none.
    async fn view_record(&self, table: &TableName, id: i32) -> Result<Option<ProductionRecord>>;

    /// Deletes the record with `id` and returns the number of rows removed.
    ///
    /// Deleting an id that does not exist is not an error.
    async fn delete_record(&self, table: &TableName, id: i32) -> Result<u64>;

    /// Sets one field of the record with `id` and returns the number of rows
    /// changed.
    ///
    /// Updating an id that does not exist is not an error.
    async fn update_field(&self, table: &TableName, id: i32, update: &FieldUpdate) -> Result<u64>;
}
