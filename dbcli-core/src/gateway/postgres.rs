//! PostgreSQL gateway with one connection per operation.
//!
//! No pool is kept. Every public method connects, runs its statement, and
//! closes the connection again before returning, on the failure path too.

use super::{Gateway, queries};
use crate::config::ConnectionConfig;
use crate::models::{FieldUpdate, NewRecord, ProductionRecord, TableName};
use crate::{DbCliError, Result};
use async_trait::async_trait;
use sqlx::{Connection, PgConnection};
use std::path::Path;
use tracing::{debug, info, warn};

/// Gateway to a single PostgreSQL database.
#[derive(Debug, Clone)]
pub struct PostgresGateway {
    config: ConnectionConfig,
}

impl PostgresGateway {
    /// Creates a gateway for `config`. No connection is opened yet.
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    /// Opens a fresh connection.
    ///
    /// # Errors
    /// Returns a configuration error when the parameters cannot be turned
    /// into driver options, or a connection error when the server cannot be
    /// reached or rejects the credentials.
    async fn connect(&self) -> Result<PgConnection> {
        let options = self.config.to_connect_options()?;
        debug!("Opening connection to {}", self.config);
        PgConnection::connect_with(&options).await.map_err(|e| {
            DbCliError::connection_failed(format!("Unable to connect to {}", self.config), e)
        })
    }

    /// Closes a connection, logging rather than returning a failed close.
    async fn release(conn: PgConnection) {
        if let Err(e) = conn.close().await {
            warn!("Failed to close database connection cleanly: {}", e);
        } else {
            debug!("Connection closed");
        }
    }
}

#[async_trait]
impl Gateway for PostgresGateway {
    async fn check_connection(&self) -> Result<String> {
        let mut conn = self.connect().await?;
        let result = queries::server_version(&mut conn).await;
        Self::release(conn).await;

        let version = result?;
        info!("Connected to {}", version);
        Ok(version)
    }

    async fn create_tables(&self, path: &Path) -> Result<Vec<String>> {
        let script = tokio::fs::read_to_string(path).await.map_err(|e| {
            DbCliError::io(format!("Failed to read table script {}", path.display()), e)
        })?;

        let mut conn = self.connect().await?;
        let result = match queries::run_script(&mut conn, &script).await {
            Ok(()) => queries::list_tables(&mut conn).await,
            Err(e) => Err(e),
        };
        Self::release(conn).await;

        let tables = result?;
        info!("Applied {} ({} tables present)", path.display(), tables.len());
        Ok(tables)
    }

    async fn delete_table(&self, table: &TableName) -> Result<()> {
        let mut conn = self.connect().await?;
        let result = queries::drop_table(&mut conn, table).await;
        Self::release(conn).await;

        result?;
        info!("Dropped table {}", table);
        Ok(())
    }

    async fn view_tables(&self) -> Result<Vec<String>> {
        let mut conn = self.connect().await?;
        let result = queries::list_tables(&mut conn).await;
        Self::release(conn).await;
        result
    }

    async fn create_record(&self, table: &TableName, record: &NewRecord) -> Result<i32> {
        let mut conn = self.connect().await?;
        let result = queries::insert_record(&mut conn, table, record).await;
        Self::release(conn).await;

        let id = result?;
        info!("Inserted record {} into {}", id, table);
        Ok(id)
    }

    async fn view_all_records(&self, table: &TableName) -> Result<Vec<ProductionRecord>> {
        let mut conn = self.connect().await?;
        let result = queries::select_records(&mut conn, table).await;
        Self::release(conn).await;
        result
    }

    async fn view_record(&self, table: &TableName, id: i32) -> Result<Option<ProductionRecord>> {
        let mut conn = self.connect().await?;
        let result = queries::select_record(&mut conn, table, id).await;
        Self::release(conn).await;
        result
    }

    async fn delete_record(&self, table: &TableName, id: i32) -> Result<u64> {
        let mut conn = self.connect().await?;
        let result = queries::delete_record(&mut conn, table, id).await;
        Self::release(conn).await;

        let deleted = result?;
        if deleted == 0 {
            info!("No record with id {} in {}; nothing deleted", id, table);
        }
        Ok(deleted)
    }

    async fn update_field(&self, table: &TableName, id: i32, update: &FieldUpdate) -> Result<u64> {
        let mut conn = self.connect().await?;
        let result = queries::update_field(&mut conn, table, id, update).await;
        Self::release(conn).await;

        let updated = result?;
        if updated == 0 {
            info!("No record with id {} in {}; nothing updated", id, table);
        }
        Ok(updated)
    }
}
