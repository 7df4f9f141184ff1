//! # csv-mysql-load
//!
//! Transactional CSV to MySQL batch loader.
//!
//! This library loads a manifest of CSV extracts into existing relational
//! tables with:
//!
//! - **Keyword type coercion** driven by column names
//! - **Bounded batches** written as multi-row INSERTs, committed per flush
//! - **One scoped connection** per run, rolled back and closed on failure
//! - **Strict manifest order**: the first failure stops the run
//!
//! ## Example
//!
//! ```rust,no_run
//! use csv_mysql_load::{Config, MysqlConnector, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> csv_mysql_load::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let connector = MysqlConnector::new(config.target.clone());
//!     let mut orchestrator = Orchestrator::from_config(connector, &config);
//!     let result = orchestrator.run(&config.tables).await?;
//!     println!("Loaded {} rows", result.rows_loaded);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod orchestrator;
pub mod session;
pub mod source;
pub mod transfer;
pub mod typemap;

#[cfg(test)]
mod testing;

// Re-exports for convenient access
pub use config::{Config, LoadConfig, TargetConfig};
pub use crate::core::{
    Batch, Connector, InsertStatement, Row, ScalarKind, SinkConnection, SqlValue, TableLoadSpec,
};
pub use drivers::{MysqlConnector, NoOpConnector};
pub use error::{LoadError, Result};
pub use orchestrator::{
    health_check, HealthCheckResult, LoadResult, Orchestrator, RunPhase, TableLoadStats,
};
pub use session::ConnectionManager;
pub use source::CsvSource;
pub use transfer::{BatchInserter, InsertSummary};
pub use typemap::{coerce, TypeCoercer};
