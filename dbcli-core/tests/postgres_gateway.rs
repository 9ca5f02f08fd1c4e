//! PostgreSQL gateway tests against a real server started with testcontainers.
//!
//! These need a Docker daemon; run them with `cargo test -- --ignored`.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::uninlined_format_args)]

use dbcli_core::{
    ConnectionConfig, DbCliError, FieldUpdate, Gateway, NewRecord, PostgresGateway, RecordField,
    TableName,
    models::{parse_amount, parse_date},
};
use std::path::PathBuf;
use testcontainers_modules::{
    postgres::Postgres,
    testcontainers::{ContainerAsync, runners::AsyncRunner},
};

fn table_script() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("tables.sql")
}

async fn start_postgres() -> (ContainerAsync<Postgres>, PostgresGateway) {
    let container = Postgres::default()
        .start()
        .await
        .expect("Failed to start PostgreSQL container");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");

    let config = ConnectionConfig::from_pairs([
        ("host", "localhost".to_string()),
        ("port", port.to_string()),
        ("dbname", "postgres".to_string()),
        ("user", "postgres".to_string()),
        ("password", "postgres".to_string()),
    ]);
    (container, PostgresGateway::new(config))
}

fn cow_one() -> NewRecord {
    NewRecord {
        animal: "Cow 1".to_string(),
        morning_production: parse_amount("10.5").unwrap(),
        afternoon_production: parse_amount("12.3").unwrap(),
        evening_production: parse_amount("9.2").unwrap(),
        production_unit: "Litres".to_string(),
        production_date: parse_date("2023-06-25").unwrap(),
    }
}

#[tokio::test]
#[ignore = "PostgreSQL requires running container, run with --ignored flag"]
async fn test_postgres_check_connection_reports_version() {
    let (_container, gateway) = start_postgres().await;

    let version = gateway.check_connection().await.unwrap();
    assert!(version.starts_with("PostgreSQL"), "unexpected version {}", version);
}

#[tokio::test]
#[ignore = "PostgreSQL requires running container, run with --ignored flag"]
async fn test_postgres_create_and_delete_tables() {
    let (_container, gateway) = start_postgres().await;

    assert!(gateway.view_tables().await.unwrap().is_empty());

    let created = gateway.create_tables(&table_script()).await.unwrap();
    assert_eq!(created, vec!["milk_production".to_string()]);

    let tables = gateway.view_tables().await.unwrap();
    assert_eq!(
        tables.iter().filter(|t| t.as_str() == "milk_production").count(),
        1
    );

    gateway.delete_table(&TableName::default()).await.unwrap();
    assert!(
        !gateway
            .view_tables()
            .await
            .unwrap()
            .contains(&"milk_production".to_string())
    );

    // Dropping it again is a statement error, not a panic.
    let error = gateway.delete_table(&TableName::default()).await.unwrap_err();
    assert!(matches!(error, DbCliError::Statement { .. }));
}

#[tokio::test]
#[ignore = "PostgreSQL requires running container, run with --ignored flag"]
async fn test_postgres_record_lifecycle() {
    let (_container, gateway) = start_postgres().await;
    let table = TableName::default();
    gateway.create_tables(&table_script()).await.unwrap();

    let id = gateway.create_record(&table, &cow_one()).await.unwrap();
    assert_eq!(id, 1);

    let records = gateway.view_all_records(&table).await.unwrap();
    assert_eq!(records, vec![cow_one().with_id(1)]);
    assert_eq!(records[0].morning_production.to_string(), "10.5");

    let update = FieldUpdate::parse(RecordField::Morning, "5.8").unwrap();
    assert_eq!(gateway.update_field(&table, 1, &update).await.unwrap(), 1);

    let record = gateway.view_record(&table, 1).await.unwrap().unwrap();
    let mut expected = cow_one().with_id(1);
    expected.morning_production = parse_amount("5.8").unwrap();
    assert_eq!(record, expected);

    let update = FieldUpdate::parse(RecordField::Date, "2023-8-12").unwrap();
    gateway.update_field(&table, 1, &update).await.unwrap();
    let record = gateway.view_record(&table, 1).await.unwrap().unwrap();
    assert_eq!(record.production_date, parse_date("2023-08-12").unwrap());

    assert_eq!(gateway.delete_record(&table, 1).await.unwrap(), 1);
    assert!(gateway.view_record(&table, 1).await.unwrap().is_none());
    assert!(gateway.view_all_records(&table).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "PostgreSQL requires running container, run with --ignored flag"]
async fn test_postgres_missing_ids_are_not_errors() {
    let (_container, gateway) = start_postgres().await;
    let table = TableName::default();
    gateway.create_tables(&table_script()).await.unwrap();

    assert!(gateway.view_record(&table, 99).await.unwrap().is_none());
    assert_eq!(gateway.delete_record(&table, 99).await.unwrap(), 0);

    let update = FieldUpdate::parse(RecordField::Animal, "Cow 2").unwrap();
    assert_eq!(gateway.update_field(&table, 99, &update).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "PostgreSQL requires running container, run with --ignored flag"]
async fn test_postgres_values_are_bound_not_interpolated() {
    let (_container, gateway) = start_postgres().await;
    let table = TableName::default();
    gateway.create_tables(&table_script()).await.unwrap();

    let mut record = cow_one();
    record.animal = "Daisy'); DROP TABLE milk_production; --".to_string();
    let id = gateway.create_record(&table, &record).await.unwrap();

    let stored = gateway.view_record(&table, id).await.unwrap().unwrap();
    assert_eq!(stored.animal, record.animal);
    assert!(
        gateway
            .view_tables()
            .await
            .unwrap()
            .contains(&"milk_production".to_string())
    );
}

#[tokio::test]
#[ignore = "PostgreSQL requires running container, run with --ignored flag"]
async fn test_postgres_failing_script_is_statement_error() {
    let (_container, gateway) = start_postgres().await;
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("broken.sql");
    std::fs::write(
        &script,
        "CREATE TABLE herd (id SERIAL PRIMARY KEY);\nCREATE TABLE broken (;\n",
    )
    .unwrap();

    let error = gateway.create_tables(&script).await.unwrap_err();
    assert!(matches!(error, DbCliError::Statement { .. }));

    // The connection was released; the next call still works.
    gateway.check_connection().await.unwrap();
}

#[tokio::test]
#[ignore = "PostgreSQL requires running container, run with --ignored flag"]
async fn test_postgres_wrong_password_is_connection_error() {
    let (container, _gateway) = start_postgres().await;
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let gateway = PostgresGateway::new(ConnectionConfig::from_pairs([
        ("host", "localhost".to_string()),
        ("port", port.to_string()),
        ("user", "postgres".to_string()),
        ("password", "definitely-wrong".to_string()),
    ]));

    let error = gateway.check_connection().await.unwrap_err();
    assert!(matches!(error, DbCliError::Connection { .. }));
    assert!(!error.to_string().contains("definitely-wrong"));
}
