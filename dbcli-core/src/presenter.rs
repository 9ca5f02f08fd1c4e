//! Human-readable rendering of operation results.
//!
//! Every message is framed by a blank line before and after. Listings are
//! numbered from 1 and each entry is followed by a blank line. Colors are
//! plain ANSI escapes and can be switched off entirely.

use crate::DbCliError;
use crate::models::{DATE_FORMAT, ProductionRecord, RecordField, TableName};
use std::io::{self, IsTerminal, Write};

/// Outcome of one successful command, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The server answered; carries its version string.
    Connected { version: String },
    /// The table script ran; carries the tables now present.
    TablesCreated { tables: Vec<String> },
    /// A table was dropped.
    TableDeleted { table: TableName },
    /// Tables currently present.
    Tables { tables: Vec<String> },
    /// A record was inserted.
    RecordCreated { table: TableName, id: i32 },
    /// Every record of a table.
    Records {
        table: TableName,
        records: Vec<ProductionRecord>,
    },
    /// Lookup of one record; `None` when the id is absent.
    Record {
        table: TableName,
        id: i32,
        record: Option<ProductionRecord>,
    },
    /// A delete statement ran.
    RecordDeleted { table: TableName, id: i32 },
    /// An update statement ran.
    RecordUpdated {
        table: TableName,
        id: i32,
        field: RecordField,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Green,
    Cyan,
    Yellow,
    Red,
}

impl Color {
    const fn code(self) -> &'static str {
        match self {
            Self::Green => "32",
            Self::Cyan => "36",
            Self::Yellow => "33",
            Self::Red => "31",
        }
    }
}

/// Decides whether output should carry ANSI styling.
///
/// Styling is off when `--no-color` was given, when `NO_COLOR` is set to a
/// non-empty value, or when stdout is not a terminal.
pub fn color_enabled(no_color_flag: bool) -> bool {
    let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    !no_color_flag && !no_color_env && io::stdout().is_terminal()
}

/// Formats one record line with its listing ordinal.
pub fn format_record(ordinal: usize, record: &ProductionRecord) -> String {
    format!(
        "{}. | id: {} | animal: {} | morning: {} | afternoon: {} | evening: {} | unit: {} | date: {}",
        ordinal,
        record.id,
        record.animal,
        record.morning_production,
        record.afternoon_production,
        record.evening_production,
        record.production_unit,
        record.production_date.format(DATE_FORMAT)
    )
}

/// Writes reports and errors to an output stream.
pub struct Presenter<W: Write> {
    out: W,
    color: bool,
}

impl Presenter<io::Stdout> {
    /// Presenter on stdout.
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> Presenter<W> {
    /// Presenter writing to `out`, with or without ANSI styling.
    pub const fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    /// Consumes the presenter and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Renders a successful outcome.
    ///
    /// # Errors
    /// Returns any error from the underlying writer.
    pub fn report(&mut self, report: &Report) -> io::Result<()> {
        match report {
            Report::Connected { version } => {
                writeln!(self.out)?;
                let line = self.paint("Connection successful.", Color::Green, false);
                writeln!(self.out, "{}", line)?;
                let line = self.paint(&format!("Server version: {}", version), Color::Green, false);
                writeln!(self.out, "{}", line)?;
                writeln!(self.out)?;
                self.out.flush()
            }
            Report::TablesCreated { tables } => self.listing(
                "The following tables have been created:",
                "No tables found in the database.",
                tables.iter().map(String::as_str),
                Color::Green,
            ),
            Report::TableDeleted { table } => self.message(
                &format!("Table {} has been deleted successfully.", table),
                Color::Green,
            ),
            Report::Tables { tables } => self.listing(
                "List of all the tables in the database:",
                "No tables found in the database.",
                tables.iter().map(String::as_str),
                Color::Cyan,
            ),
            Report::RecordCreated { .. } => {
                self.message("Record has been created successfully.", Color::Green)
            }
            Report::Records { table, records } => {
                let lines: Vec<String> = (1..)
                    .zip(records)
                    .map(|(ordinal, record)| format_record(ordinal, record))
                    .collect();
                self.lines(
                    &format!("List of all the records in table '{}':", table),
                    &format!("No records found in table '{}'.", table),
                    &lines,
                    Color::Cyan,
                )
            }
            Report::Record { table, id, record } => {
                let lines: Vec<String> = record.iter().map(|r| format_record(1, r)).collect();
                self.lines(
                    &format!("Record of id '{}' in table '{}':", id, table),
                    &format!("No record of id '{}' found in table '{}'.", id, table),
                    &lines,
                    Color::Cyan,
                )
            }
            Report::RecordDeleted { .. } => {
                self.message("Record has been deleted successfully.", Color::Green)
            }
            Report::RecordUpdated { .. } => {
                self.message("Record has been updated successfully.", Color::Green)
            }
        }
    }

    /// Renders a failed operation.
    ///
    /// # Errors
    /// Returns any error from the underlying writer.
    pub fn error(&mut self, error: &DbCliError) -> io::Result<()> {
        self.message(&error.to_string(), Color::Red)
    }

    fn paint(&self, text: &str, color: Color, underline: bool) -> String {
        if !self.color {
            return text.to_string();
        }
        let underline = if underline { ";4" } else { "" };
        format!("\x1b[1;{}{}m{}\x1b[0m", color.code(), underline, text)
    }

    fn message(&mut self, text: &str, color: Color) -> io::Result<()> {
        let line = self.paint(text, color, false);
        writeln!(self.out)?;
        writeln!(self.out, "{}", line)?;
        writeln!(self.out)?;
        self.out.flush()
    }

    fn listing<'a>(
        &mut self,
        header: &str,
        empty: &str,
        items: impl Iterator<Item = &'a str>,
        color: Color,
    ) -> io::Result<()> {
        let lines: Vec<String> = (1..)
            .zip(items)
            .map(|(ordinal, item): (usize, &str)| format!("{}. {}", ordinal, item))
            .collect();
        self.lines(header, empty, &lines, color)
    }

    fn lines(&mut self, header: &str, empty: &str, lines: &[String], color: Color) -> io::Result<()> {
        if lines.is_empty() {
            return self.message(empty, Color::Yellow);
        }

        let header = self.paint(header, color, true);
        writeln!(self.out)?;
        writeln!(self.out, "{}", header)?;
        writeln!(self.out)?;
        for line in lines {
            let line = self.paint(line, color, false);
            writeln!(self.out, "{}", line)?;
            writeln!(self.out)?;
        }
        self.out.flush()
    }
}
