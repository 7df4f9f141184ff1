//! Batched inserts with a commit per flush.
//!
//! [`BatchInserter`] buffers coerced rows for one table. When the buffer
//! reaches the configured batch size it is written as a single multi-row
//! INSERT and committed straight away. Every flush is durable on its own, so
//! a failure later in the same file cannot undo batches already flushed; a
//! rollback only discards the batch in flight.
//!
//! A rejected flush is final: the inserter drops the batch and every later
//! call returns the same error. Batches are never retried.

use tracing::{debug, error, info};

use crate::core::schema::{InsertStatement, TableLoadSpec};
use crate::core::traits::SinkConnection;
use crate::core::value::{Batch, Row};
use crate::error::{LoadError, Result};

/// Totals for one table once its inserter is finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertSummary {
    /// Rows written and committed.
    pub rows: u64,

    /// Flushes (INSERT + COMMIT) performed.
    pub batches: u64,
}

/// Accumulates rows for one table and flushes them in bounded batches.
pub struct BatchInserter<'c, C: SinkConnection> {
    conn: &'c mut C,
    stmt: InsertStatement,
    batch: Batch,
    summary: InsertSummary,
    /// Message of the flush that failed, once one has.
    failed: Option<String>,
}

impl<'c, C: SinkConnection> BatchInserter<'c, C> {
    /// Create an inserter writing `spec`'s table through `conn`.
    pub fn new(conn: &'c mut C, spec: &TableLoadSpec, batch_size: usize) -> Result<Self> {
        Ok(Self {
            conn,
            stmt: InsertStatement::for_spec(spec)?,
            batch: Batch::with_capacity(batch_size),
            summary: InsertSummary::default(),
            failed: None,
        })
    }

    fn check_usable(&self) -> Result<()> {
        match &self.failed {
            Some(message) => Err(LoadError::batch_insert(self.stmt.table(), message)),
            None => Ok(()),
        }
    }

    /// Buffer a row, flushing once the batch is full.
    pub async fn add(&mut self, row: Row) -> Result<()> {
        self.check_usable()?;
        if row.len() != self.stmt.num_columns() {
            return Err(LoadError::batch_insert(
                self.stmt.table(),
                format!(
                    "row has {} values, expected {}",
                    row.len(),
                    self.stmt.num_columns()
                ),
            ));
        }

        if self.batch.push(row) {
            self.flush().await?;
            info!("{} rows processed...", self.summary.rows);
        }
        Ok(())
    }

    /// Write the buffered rows as one INSERT and commit them.
    ///
    /// Returns the number of rows written; an empty batch is a no-op.
    pub async fn flush(&mut self) -> Result<u64> {
        self.check_usable()?;
        if self.batch.is_empty() {
            return Ok(0);
        }

        let written = match self.conn.execute_many(&self.stmt, self.batch.rows()).await {
            Ok(n) => self.conn.commit().await.map(|()| n),
            Err(e) => Err(e),
        };

        match written {
            Ok(n) => {
                self.batch.clear();
                self.summary.rows += n;
                self.summary.batches += 1;
                debug!(
                    "Committed batch {} ({} rows) into {}",
                    self.summary.batches,
                    n,
                    self.stmt.table()
                );
                Ok(n)
            }
            Err(e) => {
                let message = match e {
                    LoadError::BatchInsert { message, .. } => message,
                    other => other.to_string(),
                };
                error!(
                    "Error inserting batch into {}: {}",
                    self.stmt.table(),
                    message
                );
                self.batch.clear();
                self.failed = Some(message.clone());
                Err(LoadError::batch_insert(self.stmt.table(), message))
            }
        }
    }

    /// Rows waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    /// Totals so far.
    pub fn summary(&self) -> InsertSummary {
        self.summary
    }

    /// Flush the final partial batch and return the table totals.
    pub async fn finish(mut self) -> Result<InsertSummary> {
        self.flush().await?;
        Ok(self.summary)
    }
}
