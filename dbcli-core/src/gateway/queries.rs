//! Statements run by the PostgreSQL gateway.
//!
//! Every value is bound through a `$n` placeholder. Table names are spliced
//! only as [`TableName::quoted`] identifiers and column names only from
//! [`RecordField::column`](crate::models::RecordField::column).

use crate::models::{FieldUpdate, FieldValue, NewRecord, ProductionRecord, TableName};
use crate::{DbCliError, Result};
use sqlx::PgConnection;
use tracing::debug;

const RECORD_COLUMNS: &str = "id, animal, morning_production, afternoon_production, \
     evening_production, production_unit, production_date";

pub(crate) async fn server_version(conn: &mut PgConnection) -> Result<String> {
    sqlx::query_scalar::<_, String>("SELECT version()")
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| DbCliError::statement_failed("Failed to query server version", e))
}

pub(crate) async fn run_script(conn: &mut PgConnection, script: &str) -> Result<()> {
    debug!("Executing table script ({} bytes)", script.len());
    sqlx::Executor::execute(&mut *conn, sqlx::raw_sql(script))
        .await
        .map_err(|e| DbCliError::statement_failed("Failed to execute table script", e))?;
    Ok(())
}

pub(crate) async fn list_tables(conn: &mut PgConnection) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        "SELECT table_name::text
         FROM information_schema.tables
         WHERE table_schema = 'public'
         AND table_type = 'BASE TABLE'
         ORDER BY table_name",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| DbCliError::statement_failed("Failed to list tables", e))
}

pub(crate) async fn drop_table(conn: &mut PgConnection, table: &TableName) -> Result<()> {
    let sql = format!("DROP TABLE {}", table.quoted());
    debug!("{}", sql);
    sqlx::query(&sql)
        .execute(&mut *conn)
        .await
        .map_err(|e| DbCliError::statement_failed(format!("Failed to drop table {}", table), e))?;
    Ok(())
}

pub(crate) async fn insert_record(
    conn: &mut PgConnection,
    table: &TableName,
    record: &NewRecord,
) -> Result<i32> {
    let sql = format!(
        "INSERT INTO {} (animal, morning_production, afternoon_production, \
         evening_production, production_unit, production_date) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        table.quoted()
    );
    debug!("{}", sql);
    sqlx::query_scalar::<_, i32>(&sql)
        .bind(&record.animal)
        .bind(&record.morning_production)
        .bind(&record.afternoon_production)
        .bind(&record.evening_production)
        .bind(&record.production_unit)
        .bind(record.production_date)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            DbCliError::statement_failed(format!("Failed to insert record into {}", table), e)
        })
}

pub(crate) async fn select_records(
    conn: &mut PgConnection,
    table: &TableName,
) -> Result<Vec<ProductionRecord>> {
    let sql = format!("SELECT {} FROM {} ORDER BY id", RECORD_COLUMNS, table.quoted());
    debug!("{}", sql);
    sqlx::query_as::<_, ProductionRecord>(&sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DbCliError::statement_failed(format!("Failed to read records from {}", table), e))
}

pub(crate) async fn select_record(
    conn: &mut PgConnection,
    table: &TableName,
    id: i32,
) -> Result<Option<ProductionRecord>> {
    let sql = format!("SELECT {} FROM {} WHERE id = $1", RECORD_COLUMNS, table.quoted());
    debug!("{} [id = {}]", sql, id);
    sqlx::query_as::<_, ProductionRecord>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            DbCliError::statement_failed(format!("Failed to read record {} from {}", id, table), e)
        })
}

pub(crate) async fn delete_record(
    conn: &mut PgConnection,
    table: &TableName,
    id: i32,
) -> Result<u64> {
    let sql = format!("DELETE FROM {} WHERE id = $1", table.quoted());
    debug!("{} [id = {}]", sql, id);
    let result = sqlx::query(&sql)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            DbCliError::statement_failed(format!("Failed to delete record {} from {}", id, table), e)
        })?;
    Ok(result.rows_affected())
}

pub(crate) async fn update_field(
    conn: &mut PgConnection,
    table: &TableName,
    id: i32,
    update: &FieldUpdate,
) -> Result<u64> {
    let sql = format!(
        "UPDATE {} SET {} = $1 WHERE id = $2",
        table.quoted(),
        update.field.column()
    );
    debug!("{} [id = {}]", sql, id);

    let query = sqlx::query(&sql);
    let query = match &update.value {
        FieldValue::Text(text) => query.bind(text),
        FieldValue::Amount(amount) => query.bind(amount),
        FieldValue::Date(date) => query.bind(*date),
    };

    let result = query.bind(id).execute(&mut *conn).await.map_err(|e| {
        DbCliError::statement_failed(
            format!("Failed to update {} of record {} in {}", update.field, id, table),
            e,
        )
    })?;
    Ok(result.rows_affected())
}
