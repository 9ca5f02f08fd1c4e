//! Connection configuration loaded from an `.ini` file.
//!
//! The file holds one section (by default `[postgresql]`) whose keys are
//! PostgreSQL connection parameters:
//!
//! ```ini
//! [postgresql]
//! host = localhost
//! port = 5432
//! dbname = dairy
//! user = postgres
//! password = secret
//! ```
//!
//! Values are not validated when the file is read. A bad port or SSL mode
//! is reported when the driver options are built, and a wrong host or
//! credential is reported when the connection is attempted.

use crate::{DbCliError, Result};
use ini::Ini;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "database.ini";

/// Section holding the connection parameters.
pub const DEFAULT_SECTION: &str = "postgresql";

/// Connection parameters for the target database.
///
/// The password is kept apart from the other parameters in a zeroizing
/// buffer. Neither `Debug` nor `Display` print it.
#[derive(Clone, Default)]
pub struct ConnectionConfig {
    params: BTreeMap<String, String>,
    password: Option<Zeroizing<String>>,
}

impl ConnectionConfig {
    /// Reads `section` from the `.ini` file at `path`.
    ///
    /// # Errors
    /// Returns a configuration error if the file cannot be read or parsed,
    /// or if it has no such section.
    pub fn from_ini_file(path: impl AsRef<Path>, section: &str) -> Result<Self> {
        let path = path.as_ref();
        // Backslashes in passwords are kept literally.
        let ini = Ini::load_from_file_noescape(path).map_err(|e| {
            DbCliError::configuration(format!(
                "Unable to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;

        let properties = ini.section(Some(section)).ok_or_else(|| {
            DbCliError::configuration(format!(
                "Section {} not found in the {} file.",
                section,
                path.display()
            ))
        })?;

        let config = Self::from_pairs(properties.iter());
        debug!("Loaded connection configuration {}", config);
        Ok(config)
    }

    /// Builds a configuration from key/value pairs.
    ///
    /// Keys are matched case-insensitively; a later duplicate wins.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut config = Self::default();
        for (key, value) in pairs {
            let key = key.as_ref().trim().to_ascii_lowercase();
            let value = value.as_ref().trim().to_string();
            if key == "password" {
                config.password = Some(Zeroizing::new(value));
            } else {
                config.params.insert(key, value);
            }
        }
        config
    }

    /// Returns a non-secret parameter by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Whether a password was configured.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Converts the parameters into sqlx connect options.
    ///
    /// Options start from the driver's environment defaults (`PGHOST`,
    /// `PGUSER`, ...) and are overridden by the configured keys. Unknown
    /// keys are logged and skipped.
    ///
    /// # Errors
    /// Returns a configuration error for an unparsable `port` or `sslmode`.
    pub fn to_connect_options(&self) -> Result<PgConnectOptions> {
        let mut options = PgConnectOptions::new();

        for (key, value) in &self.params {
            options = match key.as_str() {
                "host" => options.host(value),
                "port" => {
                    let port = value.parse::<u16>().map_err(|_| {
                        DbCliError::configuration(format!(
                            "Invalid port '{}': expected a number between 0 and 65535",
                            value
                        ))
                    })?;
                    options.port(port)
                }
                "user" => options.username(value),
                "dbname" | "database" => options.database(value),
                "sslmode" => {
                    let mode = value.parse::<PgSslMode>().map_err(|e| {
                        DbCliError::configuration(format!("Invalid sslmode '{}': {}", value, e))
                    })?;
                    options.ssl_mode(mode)
                }
                "application_name" => options.application_name(value),
                other => {
                    warn!("Ignoring unsupported connection parameter '{}'", other);
                    options
                }
            };
        }

        if let Some(password) = &self.password {
            options = options.password(password);
        }

        Ok(options)
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ConnectionConfig({}{}{})",
            self.get("host").unwrap_or("<default host>"),
            self.get("port").map_or_else(String::new, |p| format!(":{}", p)),
            self.get("dbname")
                .or_else(|| self.get("database"))
                .map_or_else(String::new, |db| format!("/{}", db))
        )
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("params", &self.params)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}
