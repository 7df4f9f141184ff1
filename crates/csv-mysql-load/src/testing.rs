//! In-memory recording sink shared by unit tests.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::core::schema::InsertStatement;
use crate::core::traits::{Connector, SinkConnection};
use crate::core::value::Row;
use crate::error::{LoadError, Result};

/// Everything the sink observed, readable after the connection is gone.
#[derive(Debug, Default)]
pub struct SinkLog {
    /// Durable rows, keyed by table, in insert order.
    pub committed: Vec<(String, Row)>,
    /// Rows written since the last commit or rollback.
    pub pending: Vec<(String, Row)>,
    /// Row count of every `execute_many` call that succeeded.
    pub flush_sizes: Vec<usize>,
    pub connects: usize,
    pub commits: usize,
    pub rollbacks: usize,
    pub closes: usize,
}

impl SinkLog {
    pub fn committed_for(&self, table: &str) -> Vec<Row> {
        self.committed
            .iter()
            .filter(|(t, _)| t == table)
            .map(|(_, r)| r.clone())
            .collect()
    }
}

/// Connector whose connections record into a shared [`SinkLog`].
#[derive(Debug, Clone, Default)]
pub struct RecordingConnector {
    log: Arc<Mutex<SinkLog>>,
    fail_connect: bool,
    reject_execute_call: Option<usize>,
    fail_commit: bool,
    fail_rollback: bool,
    fail_close: bool,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Reject the n-th `execute_many` call (1-based) as a constraint violation.
    pub fn rejecting_execute(mut self, call: usize) -> Self {
        self.reject_execute_call = Some(call);
        self
    }

    pub fn failing_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    pub fn failing_rollback(mut self) -> Self {
        self.fail_rollback = true;
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn log(&self) -> MutexGuard<'_, SinkLog> {
        self.log.lock().unwrap()
    }
}

#[async_trait]
impl Connector for RecordingConnector {
    type Conn = RecordingConnection;

    async fn connect(&self) -> Result<RecordingConnection> {
        if self.fail_connect {
            return Err(LoadError::connection("connection refused", "connecting to test sink"));
        }
        self.log().connects += 1;
        Ok(RecordingConnection {
            connector: self.clone(),
            execute_calls: 0,
        })
    }

    fn db_type(&self) -> &str {
        "recording"
    }
}

pub struct RecordingConnection {
    connector: RecordingConnector,
    execute_calls: usize,
}

#[async_trait]
impl SinkConnection for RecordingConnection {
    async fn execute_many(&mut self, stmt: &InsertStatement, rows: &[Row]) -> Result<u64> {
        self.execute_calls += 1;
        if self.connector.reject_execute_call == Some(self.execute_calls) {
            return Err(LoadError::batch_insert(
                stmt.table(),
                "Duplicate entry for key 'PRIMARY'",
            ));
        }
        let mut log = self.connector.log();
        log.flush_sizes.push(rows.len());
        for row in rows {
            log.pending.push((stmt.table().to_string(), row.clone()));
        }
        Ok(rows.len() as u64)
    }

    async fn commit(&mut self) -> Result<()> {
        if self.connector.fail_commit {
            return Err(LoadError::connection("server has gone away", "committing"));
        }
        let mut log = self.connector.log();
        let pending = std::mem::take(&mut log.pending);
        log.committed.extend(pending);
        log.commits += 1;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        let mut log = self.connector.log();
        log.rollbacks += 1;
        if self.connector.fail_rollback {
            return Err(LoadError::connection("server has gone away", "rolling back"));
        }
        log.pending.clear();
        Ok(())
    }

    async fn close(self) -> Result<()> {
        self.connector.log().closes += 1;
        if self.connector.fail_close {
            return Err(LoadError::connection("broken pipe", "closing"));
        }
        Ok(())
    }
}
