//! Domain types for the production table.

use crate::{DbCliError, Result};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::str::FromStr;
use std::sync::OnceLock;

/// Table targeted when `--table` is not given.
pub const DEFAULT_TABLE: &str = "milk_production";

/// Date format accepted on the command line and printed in listings.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One row of the production table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProductionRecord {
    pub id: i32,
    pub animal: String,
    pub morning_production: BigDecimal,
    pub afternoon_production: BigDecimal,
    pub evening_production: BigDecimal,
    pub production_unit: String,
    pub production_date: NaiveDate,
}

/// Insert payload; the id is assigned by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub animal: String,
    pub morning_production: BigDecimal,
    pub afternoon_production: BigDecimal,
    pub evening_production: BigDecimal,
    pub production_unit: String,
    pub production_date: NaiveDate,
}

impl NewRecord {
    /// Attaches a database-assigned id.
    pub fn with_id(self, id: i32) -> ProductionRecord {
        ProductionRecord {
            id,
            animal: self.animal,
            morning_production: self.morning_production,
            afternoon_production: self.afternoon_production,
            evening_production: self.evening_production,
            production_unit: self.production_unit,
            production_date: self.production_date,
        }
    }
}

/// A table identifier that is safe to splice into SQL text.
///
/// Only plain identifiers are accepted: a letter or underscore followed by
/// up to 62 letters, digits, or underscores. The name is folded to lower
/// case, matching how PostgreSQL stores the unquoted names used in the
/// table script, and is always emitted quoted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

#[allow(clippy::expect_used)]
fn identifier_pattern() -> &'static regex::Regex {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        regex::Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("Invalid identifier pattern")
    })
}

impl TableName {
    /// Validates and normalizes a table name.
    ///
    /// # Errors
    /// Returns an invalid input error when `name` is not a plain identifier.
    pub fn new(name: &str) -> Result<Self> {
        if !identifier_pattern().is_match(name) {
            return Err(DbCliError::invalid_input(format!(
                "'{}' is not a valid table name (letters, digits and underscores only, \
                 starting with a letter or underscore, at most 63 characters)",
                name
            )));
        }
        Ok(Self(name.to_ascii_lowercase()))
    }

    /// The normalized name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as a double-quoted SQL identifier.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self(DEFAULT_TABLE.to_string())
    }
}

impl FromStr for TableName {
    type Err = DbCliError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Updatable columns of the production table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Animal,
    Morning,
    Afternoon,
    Evening,
    Unit,
    Date,
}

impl RecordField {
    /// All fields in listing order.
    pub const ALL: [Self; 6] = [
        Self::Animal,
        Self::Morning,
        Self::Afternoon,
        Self::Evening,
        Self::Unit,
        Self::Date,
    ];

    /// Column backing the field.
    pub const fn column(self) -> &'static str {
        match self {
            Self::Animal => "animal",
            Self::Morning => "morning_production",
            Self::Afternoon => "afternoon_production",
            Self::Evening => "evening_production",
            Self::Unit => "production_unit",
            Self::Date => "production_date",
        }
    }

    /// Short name used on the command line and in listings.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Animal => "animal",
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Unit => "unit",
            Self::Date => "date",
        }
    }

    /// Parses a raw command-line value into the field's type.
    ///
    /// # Errors
    /// Returns an invalid input error when the value does not parse.
    pub fn parse_value(self, raw: &str) -> Result<FieldValue> {
        match self {
            Self::Animal | Self::Unit => {
                let text = raw.trim();
                if text.is_empty() {
                    return Err(DbCliError::invalid_input(format!(
                        "{} cannot be empty",
                        self.label()
                    )));
                }
                Ok(FieldValue::Text(text.to_string()))
            }
            Self::Morning | Self::Afternoon | Self::Evening => {
                parse_amount(raw).map(FieldValue::Amount)
            }
            Self::Date => parse_date(raw).map(FieldValue::Date),
        }
    }
}

impl FromStr for RecordField {
    type Err = DbCliError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.label() == wanted || field.column() == wanted)
            .ok_or_else(|| {
                DbCliError::invalid_input(format!(
                    "unknown field '{}' (expected one of: animal, morning, afternoon, evening, unit, date)",
                    s
                ))
            })
    }
}

impl std::fmt::Display for RecordField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A typed value for one [`RecordField`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Amount(BigDecimal),
    Date(NaiveDate),
}

/// Single-field update applied to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUpdate {
    pub field: RecordField,
    pub value: FieldValue,
}

impl FieldUpdate {
    /// Parses `raw` for `field`.
    ///
    /// # Errors
    /// Returns an invalid input error when the value does not parse.
    pub fn parse(field: RecordField, raw: &str) -> Result<Self> {
        Ok(Self {
            field,
            value: field.parse_value(raw)?,
        })
    }
}

/// Parses a production amount such as `10.5`.
///
/// # Errors
/// Returns an invalid input error for anything that is not a decimal number.
pub fn parse_amount(raw: &str) -> Result<BigDecimal> {
    BigDecimal::from_str(raw.trim()).map_err(|_| {
        DbCliError::invalid_input(format!("'{}' is not a decimal amount", raw))
    })
}

/// Parses a production date in `YYYY-MM-DD` form; month and day may omit
/// the leading zero.
///
/// # Errors
/// Returns an invalid input error for anything that is not a calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        DbCliError::invalid_input(format!("'{}' is not a date in YYYY-MM-DD form", raw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_table_name_is_folded_and_quoted() {
        let table = TableName::new("Milk_Production").unwrap();
        assert_eq!(table.as_str(), "milk_production");
        assert_eq!(table.quoted(), "\"milk_production\"");
        assert_eq!(TableName::default().as_str(), DEFAULT_TABLE);
    }

    #[test]
    fn test_table_name_rejects_sql() {
        for name in [
            "",
            "milk; DROP TABLE milk",
            "\"quoted\"",
            "1table",
            "schema.table",
            "milk production",
        ] {
            assert!(TableName::new(name).is_err(), "accepted {:?}", name);
        }
        assert!(TableName::new(&"a".repeat(64)).is_err());
        assert!(TableName::new(&"a".repeat(63)).is_ok());
    }

    #[test]
    fn test_record_field_from_str() {
        assert_eq!("morning".parse::<RecordField>().unwrap(), RecordField::Morning);
        assert_eq!(
            "evening_production".parse::<RecordField>().unwrap(),
            RecordField::Evening
        );
        assert_eq!("DATE".parse::<RecordField>().unwrap(), RecordField::Date);
        assert!("id".parse::<RecordField>().is_err());
    }

    #[test]
    fn test_parse_value_types() {
        assert_eq!(
            RecordField::Morning.parse_value("5.8").unwrap(),
            FieldValue::Amount(BigDecimal::from_str("5.8").unwrap())
        );
        assert_eq!(
            RecordField::Date.parse_value("2023-8-12").unwrap(),
            FieldValue::Date(NaiveDate::from_ymd_opt(2023, 8, 12).unwrap())
        );
        assert_eq!(
            RecordField::Animal.parse_value(" Cow 2 ").unwrap(),
            FieldValue::Text("Cow 2".to_string())
        );
        assert!(RecordField::Evening.parse_value("lots").is_err());
        assert!(RecordField::Date.parse_value("2023-13-01").is_err());
        assert!(RecordField::Unit.parse_value("   ").is_err());
    }

    #[test]
    fn test_amount_keeps_scale() {
        assert_eq!(parse_amount("10.5").unwrap().to_string(), "10.5");
    }

    #[test]
    fn test_new_record_with_id() {
        let record = NewRecord {
            animal: "Cow 1".to_string(),
            morning_production: parse_amount("10.5").unwrap(),
            afternoon_production: parse_amount("12.3").unwrap(),
            evening_production: parse_amount("9.2").unwrap(),
            production_unit: "Litres".to_string(),
            production_date: parse_date("2023-06-25").unwrap(),
        }
        .with_id(7);
        assert_eq!(record.id, 7);
        assert_eq!(record.animal, "Cow 1");
    }

    proptest! {
        #[test]
        fn prop_valid_identifiers_are_accepted(name in "[A-Za-z_][A-Za-z0-9_]{0,62}") {
            let table = TableName::new(&name).unwrap();
            prop_assert_eq!(table.as_str(), name.to_ascii_lowercase());
        }

        #[test]
        fn prop_quote_characters_are_rejected(prefix in "[a-z]{1,10}", suffix in "[a-z]{0,10}") {
            for bad in ['"', '\'', ';', ' ', '-', '.'] {
                let name = format!("{}{}{}", prefix, bad, suffix);
                prop_assert!(TableName::new(&name).is_err());
            }
        }
    }
}
