//! Core abstractions for the load engine.
//!
//! - [`schema`]: manifest entries and generated INSERT statements
//! - [`value`]: typed values, rows and bounded batches
//! - [`traits`]: connector and connection traits implemented by sink drivers
//! - [`identifier`]: identifier validation and quoting

pub mod identifier;
pub mod schema;
pub mod traits;
pub mod value;

pub use schema::{InsertStatement, TableLoadSpec};
pub use traits::{Connector, SinkConnection};
pub use value::{Batch, Row, ScalarKind, SqlValue};
