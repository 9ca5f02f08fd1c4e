//! Core library for dbcli.
//!
//! dbcli manages one PostgreSQL database holding dairy production records:
//! it checks connectivity, applies a table script, drops and lists tables,
//! and creates, reads, updates, and deletes records in the production table.
//!
//! # Architecture
//! - [`config`]: connection parameters read from an `.ini` section
//! - [`gateway`]: the [`Gateway`] trait and its PostgreSQL implementation,
//!   one connection per operation
//! - [`presenter`]: colored, human-readable rendering of results and errors
//! - [`models`]: record, table-name, and field types
//!
//! All statements bind values through placeholders. Table names are
//! restricted to plain identifiers before they reach SQL text.

pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod presenter;

// Re-export commonly used types
pub use config::ConnectionConfig;
pub use error::{DbCliError, Result};
pub use gateway::{Gateway, PostgresGateway};
pub use logging::init_logging;
pub use models::{
    FieldUpdate, FieldValue, NewRecord, ProductionRecord, RecordField, TableName,
};
pub use presenter::{Presenter, Report};
