//! Which thermodynamic database an engine loads.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment variable naming the default database directory.
pub const DATABASE_DIR_ENV: &str = "PHREEQC_DATABASE_DIR";

/// Database file name used when none is given.
pub const DEFAULT_DATABASE: &str = "phreeqc.dat";

/// A database file name plus the directory to find it in.
///
/// The directory resolves, in order, to the explicit `directory`, the
/// `PHREEQC_DATABASE_DIR` environment variable, then `./database`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub database: String,
    pub directory: Option<PathBuf>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            database: DEFAULT_DATABASE.to_string(),
            directory: None,
        }
    }
}

impl DatabaseConfig {
    pub fn new(database: impl Into<String>) -> Self {
        DatabaseConfig {
            database: database.into(),
            directory: None,
        }
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// The directory the database is looked up in.
    pub fn directory(&self) -> PathBuf {
        self.directory
            .clone()
            .or_else(|| std::env::var_os(DATABASE_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("database"))
    }

    /// Full path of the database file. Not checked for existence.
    pub fn path(&self) -> PathBuf {
        self.directory().join(&self.database)
    }
}
