//! Command dispatcher for dbcli.
//!
//! The CLI definition and the mapping from a parsed [`Command`] to one
//! [`Gateway`] call live here so they can be exercised without a database.
//! `main.rs` only wires configuration, logging, and the presenter together.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use dbcli_core::{
    FieldUpdate, Gateway, NewRecord, Presenter, RecordField, Report, Result, TableName,
    config::DEFAULT_CONFIG_PATH,
    models::{DEFAULT_TABLE, parse_amount, parse_date},
};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, warn};

/// CLI argument structure
#[derive(Debug, Parser)]
#[command(name = "dbcli")]
#[command(about = "Manage a PostgreSQL database of dairy production records")]
#[command(version)]
#[command(long_about = "
dbcli - PostgreSQL dairy production records

Connection parameters are read from the [postgresql] section of an .ini
file (database.ini by default):

  [postgresql]
  host = localhost
  port = 5432
  dbname = dairy
  user = postgres
  password = secret

Each command opens its own connection, runs one statement, prints the
result, and closes the connection. Failures are printed; the exit status
is 0 unless --strict-exit is given.

EXAMPLES:
  dbcli check-connection
  dbcli create-tables --path tables.sql
  dbcli create-record --animal 'Cow 1' --morning-production 10.5 \\
      --afternoon-production 12.3 --evening-production 9.2 \\
      --production-unit Litres --production-date 2023-06-25
  dbcli update-morning --id 1 --value 5.8
  dbcli view-all-records
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags accepted by every command.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Configuration file with a [postgresql] section
    #[arg(
        long,
        global = true,
        env = "DBCLI_CONFIG",
        value_name = "FILE",
        default_value = DEFAULT_CONFIG_PATH
    )]
    pub config: PathBuf,

    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase log verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress logs
    #[arg(short, long, global = true, help = "Only log errors")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, help = "Print without ANSI colors")]
    pub no_color: bool,

    /// Exit non-zero when the operation fails
    #[arg(
        long,
        global = true,
        help = "Exit with status 1 when the operation fails instead of always 0"
    )]
    pub strict_exit: bool,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the database is reachable
    CheckConnection,
    /// Run a SQL script to create tables
    CreateTables(CreateTablesArgs),
    /// Drop a table
    DeleteTables(TableArgs),
    /// List the tables in the database
    ViewTables,
    /// Insert a production record
    CreateRecord(CreateRecordArgs),
    /// List every record of a table
    ViewAllRecords(TableArgs),
    /// Show one record
    ViewRecord(RecordArgs),
    /// Delete one record
    DeleteRecord(RecordArgs),
    /// Change the animal of a record
    UpdateName(UpdateArgs),
    /// Change the morning production of a record
    UpdateMorning(UpdateArgs),
    /// Change the afternoon production of a record
    UpdateNoon(UpdateArgs),
    /// Change the evening production of a record
    UpdateEvening(UpdateArgs),
    /// Change the production date of a record
    UpdateDate(UpdateArgs),
    /// Change the production unit of a record
    UpdateUnit(UpdateArgs),
    /// Change any single field of a record
    UpdateRecord(UpdateRecordArgs),
}

/// Arguments for `create-tables`
#[derive(Debug, Args)]
pub struct CreateTablesArgs {
    /// SQL script to execute
    #[arg(
        long,
        default_value = "tables.sql",
        help = "A \".sql\" file whose statements create the tables"
    )]
    pub path: PathBuf,
}

/// Target table
#[derive(Debug, Args)]
pub struct TableArgs {
    /// Table name
    #[arg(long, default_value = DEFAULT_TABLE)]
    pub table: String,
}

/// Target record
#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Table name
    #[arg(long, default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Record id
    #[arg(long)]
    pub id: i32,
}

/// Arguments for `create-record`
#[derive(Debug, Args)]
pub struct CreateRecordArgs {
    /// Table name
    #[arg(long, default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Animal name
    #[arg(long)]
    pub animal: String,

    /// Morning production amount
    #[arg(long, value_parser = parse_amount)]
    pub morning_production: BigDecimal,

    /// Afternoon production amount
    #[arg(long, value_parser = parse_amount)]
    pub afternoon_production: BigDecimal,

    /// Evening production amount
    #[arg(long, value_parser = parse_amount)]
    pub evening_production: BigDecimal,

    /// Unit of the amounts, e.g. Litres
    #[arg(long)]
    pub production_unit: String,

    /// Production date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub production_date: NaiveDate,
}

/// Arguments for the single-field update aliases
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Table name
    #[arg(long, default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Record id
    #[arg(long)]
    pub id: i32,

    /// New value
    #[arg(long)]
    pub value: String,
}

/// Arguments for `update-record`
#[derive(Debug, Args)]
pub struct UpdateRecordArgs {
    #[command(flatten)]
    pub target: UpdateArgs,

    /// Field to change: animal, morning, afternoon, evening, unit, or date
    #[arg(long, value_parser = RecordField::from_str)]
    pub field: RecordField,
}

/// How operation failures map to the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Exit 0 whether or not the operation succeeded.
    AlwaysSuccess,
    /// Exit 1 when the operation failed.
    FailOnError,
}

impl ExitPolicy {
    /// Policy selected by `--strict-exit`.
    pub const fn from_flag(strict_exit: bool) -> Self {
        if strict_exit {
            Self::FailOnError
        } else {
            Self::AlwaysSuccess
        }
    }

    /// Exit status for an operation outcome.
    pub const fn status(self, succeeded: bool) -> u8 {
        match (self, succeeded) {
            (Self::FailOnError, false) => 1,
            _ => 0,
        }
    }
}

/// Performs the gateway call for `command`.
///
/// # Errors
/// Returns the gateway's error, or an invalid input error when the table
/// name is not a plain identifier or an update value does not parse for
/// its field.
pub async fn execute<G>(command: &Command, gateway: &G) -> Result<Report>
where
    G: Gateway + ?Sized,
{
    let report = match command {
        Command::CheckConnection => Report::Connected {
            version: gateway.check_connection().await?,
        },
        Command::CreateTables(args) => Report::TablesCreated {
            tables: gateway.create_tables(&args.path).await?,
        },
        Command::DeleteTables(args) => {
            let table = TableName::new(&args.table)?;
            gateway.delete_table(&table).await?;
            Report::TableDeleted { table }
        }
        Command::ViewTables => Report::Tables {
            tables: gateway.view_tables().await?,
        },
        Command::CreateRecord(args) => {
            let record = NewRecord {
                animal: args.animal.clone(),
                morning_production: args.morning_production.clone(),
                afternoon_production: args.afternoon_production.clone(),
                evening_production: args.evening_production.clone(),
                production_unit: args.production_unit.clone(),
                production_date: args.production_date,
            };
            let table = TableName::new(&args.table)?;
            let id = gateway.create_record(&table, &record).await?;
            Report::RecordCreated { table, id }
        }
        Command::ViewAllRecords(args) => {
            let table = TableName::new(&args.table)?;
            let records = gateway.view_all_records(&table).await?;
            Report::Records { table, records }
        }
        Command::ViewRecord(args) => {
            let table = TableName::new(&args.table)?;
            let record = gateway.view_record(&table, args.id).await?;
            Report::Record {
                table,
                id: args.id,
                record,
            }
        }
        Command::DeleteRecord(args) => {
            let table = TableName::new(&args.table)?;
            gateway.delete_record(&table, args.id).await?;
            Report::RecordDeleted { table, id: args.id }
        }
        Command::UpdateName(args) => update(gateway, RecordField::Animal, args).await?,
        Command::UpdateMorning(args) => update(gateway, RecordField::Morning, args).await?,
        Command::UpdateNoon(args) => update(gateway, RecordField::Afternoon, args).await?,
        Command::UpdateEvening(args) => update(gateway, RecordField::Evening, args).await?,
        Command::UpdateDate(args) => update(gateway, RecordField::Date, args).await?,
        Command::UpdateUnit(args) => update(gateway, RecordField::Unit, args).await?,
        Command::UpdateRecord(args) => update(gateway, args.field, &args.target).await?,
    };

    Ok(report)
}

/// Parses the new value for `field` and applies it.
async fn update<G>(gateway: &G, field: RecordField, args: &UpdateArgs) -> Result<Report>
where
    G: Gateway + ?Sized,
{
    let table = TableName::new(&args.table)?;
    let update = FieldUpdate::parse(field, &args.value)?;
    gateway.update_field(&table, args.id, &update).await?;
    Ok(Report::RecordUpdated {
        table,
        id: args.id,
        field,
    })
}

/// Executes `command` and prints its outcome.
///
/// Returns whether the operation succeeded. A failure is printed, never
/// propagated; whether it affects the exit status is up to the caller's
/// [`ExitPolicy`].
pub async fn run<G, W>(command: &Command, gateway: &G, presenter: &mut Presenter<W>) -> bool
where
    G: Gateway + ?Sized,
    W: Write,
{
    let (succeeded, printed) = match execute(command, gateway).await {
        Ok(report) => {
            debug!("Command succeeded: {:?}", command);
            (true, presenter.report(&report))
        }
        Err(error) => {
            debug!("Command failed: {:?}", error);
            (false, presenter.error(&error))
        }
    };

    if let Err(e) = printed {
        warn!("Failed to write output: {}", e);
        return false;
    }
    succeeded
}
