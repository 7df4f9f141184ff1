//! Sink driver implementations.
//!
//! Each driver implements [`crate::core::Connector`] and
//! [`crate::core::SinkConnection`]:
//!
//! - [`mysql`]: MySQL/MariaDB over mysql_async
//! - [`noop`]: discards rows, used for dry runs

pub mod mysql;
pub mod noop;

pub use mysql::{MysqlConnection, MysqlConnector};
pub use noop::{NoOpConnection, NoOpConnector};
