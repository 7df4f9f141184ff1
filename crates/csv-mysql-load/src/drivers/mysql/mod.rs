//! MySQL/MariaDB sink driver.
//!
//! - [`MysqlConnector`]: opens connections from [`crate::config::TargetConfig`]
//! - [`MysqlConnection`]: multi-row INSERT, COMMIT, ROLLBACK over one session
//!
//! # Supported Versions
//!
//! - MySQL 5.7+, 8.0+
//! - MariaDB 10.2+

mod writer;

pub use writer::{MysqlConnection, MysqlConnector};
