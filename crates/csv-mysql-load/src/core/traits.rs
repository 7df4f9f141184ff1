//! Sink abstractions used by the load engine.
//!
//! - [`Connector`]: opens a connection to the relational sink
//! - [`SinkConnection`]: the capability set the engine needs from that
//!   connection (multi-row insert, commit, rollback, close)
//!
//! The engine never talks to a database driver directly, which keeps the
//! batching and transaction logic testable against an in-memory sink.

use async_trait::async_trait;

use super::schema::InsertStatement;
use super::value::Row;
use crate::error::Result;

/// Factory for sink connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connection type produced by this connector.
    type Conn: SinkConnection;

    /// Establish a new connection.
    ///
    /// Failures are reported as `LoadError::Connection`.
    async fn connect(&self) -> Result<Self::Conn>;

    /// Get the database type identifier (e.g., "mysql", "noop").
    fn db_type(&self) -> &str;
}

/// An open connection with an implicit, uncommitted transaction.
///
/// Work written through [`SinkConnection::execute_many`] stays pending
/// until [`SinkConnection::commit`]; [`SinkConnection::rollback`] discards
/// only what is still pending.
#[async_trait]
pub trait SinkConnection: Send {
    /// Execute one multi-row insert for `rows`, in order.
    ///
    /// Returns the number of rows written. Rejections are reported as
    /// `LoadError::BatchInsert`.
    async fn execute_many(&mut self, stmt: &InsertStatement, rows: &[Row]) -> Result<u64>;

    /// Make all pending work durable.
    async fn commit(&mut self) -> Result<()>;

    /// Discard pending (uncommitted) work.
    async fn rollback(&mut self) -> Result<()>;

    /// Close the connection.
    async fn close(self) -> Result<()>;
}
