//! No-op sink for dry runs.
//!
//! Accepts every batch and discards it, so a manifest and its CSV extracts
//! can be checked end to end (read, coerce, batch) without a database.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::core::schema::InsertStatement;
use crate::core::traits::{Connector, SinkConnection};
use crate::core::value::Row;
use crate::error::Result;

/// Connector producing [`NoOpConnection`]s.
#[derive(Debug, Default, Clone)]
pub struct NoOpConnector;

impl NoOpConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for NoOpConnector {
    type Conn = NoOpConnection;

    async fn connect(&self) -> Result<NoOpConnection> {
        warn!("Dry run: rows will be read and coerced but not written to any database");
        Ok(NoOpConnection::default())
    }

    fn db_type(&self) -> &str {
        "noop"
    }
}

/// Connection that counts rows and drops them.
#[derive(Debug, Default)]
pub struct NoOpConnection {
    pending: u64,
    committed: u64,
}

impl NoOpConnection {
    /// Rows accepted and committed so far.
    pub fn committed(&self) -> u64 {
        self.committed
    }
}

#[async_trait]
impl SinkConnection for NoOpConnection {
    async fn execute_many(&mut self, stmt: &InsertStatement, rows: &[Row]) -> Result<u64> {
        debug!("Dry run: discarding {} rows for {}", rows.len(), stmt.table());
        self.pending += rows.len() as u64;
        Ok(rows.len() as u64)
    }

    async fn commit(&mut self) -> Result<()> {
        self.committed += self.pending;
        self.pending = 0;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.pending = 0;
        Ok(())
    }

    async fn close(self) -> Result<()> {
        debug!("Dry run: {} rows accepted", self.committed);
        Ok(())
    }
}
