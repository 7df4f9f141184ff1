//! Configuration type definitions.

use serde::{Deserialize, Serialize};

use crate::core::schema::TableLoadSpec;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target database configuration (MySQL).
    pub target: TargetConfig,

    /// Load behavior configuration.
    #[serde(default)]
    pub load: LoadConfig,

    /// Load manifest, in foreign-key dependency order (parents first).
    pub tables: Vec<TableLoadSpec>,
}

impl Config {
    /// Keep only the named tables, preserving manifest order.
    ///
    /// Returns the names that matched no manifest entry.
    pub fn retain_tables(&mut self, names: &[String]) -> Vec<String> {
        let unknown = names
            .iter()
            .filter(|n| !self.tables.iter().any(|t| &t.table == *n))
            .cloned()
            .collect();
        self.tables.retain(|t| names.contains(&t.table));
        unknown
    }
}

/// Target database (MySQL) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Database host.
    pub host: String,

    /// Database port (default: 3306).
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// SSL mode (default: "disable").
    #[serde(default = "default_disable")]
    pub ssl_mode: String,
}

/// Load behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Folder the manifest's CSV file names are resolved against (default: "dados").
    #[serde(default = "default_csv_folder")]
    pub csv_folder: String,

    /// Rows per flush-and-commit (default: 10000).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Field delimiter (default: ",").
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Source file encoding (default: "utf-8"). Only UTF-8 is read.
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            csv_folder: default_csv_folder(),
            batch_size: default_batch_size(),
            delimiter: default_delimiter(),
            encoding: default_encoding(),
        }
    }
}

impl LoadConfig {
    /// Delimiter as the single byte the CSV reader expects.
    ///
    /// Validation guarantees the delimiter is ASCII.
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            b','
        }
    }

    pub fn is_utf8(&self) -> bool {
        matches!(
            self.encoding.to_lowercase().replace('_', "-").as_str(),
            "utf-8" | "utf8" | "utf-8-sig"
        )
    }
}

/// Default batch size, in rows.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

// Default value functions for serde
fn default_mysql_port() -> u16 {
    3306
}

fn default_disable() -> String {
    "disable".to_string()
}

fn default_csv_folder() -> String {
    "dados".to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_delimiter() -> char {
    ','
}

fn default_encoding() -> String {
    "utf-8".to_string()
}
