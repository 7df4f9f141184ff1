//! Load orchestrator - main workflow coordinator.
//!
//! Runs a manifest of table specs, strictly in the given order, over one
//! scoped sink connection:
//!
//! ```text
//! Idle -> Connecting -> LoadingTable(0..n) -> Committing -> Closed
//!                 \___________ any error ___________/
//!                              RollingBack -> ClosedWithError
//! ```
//!
//! There is no resume: a failed run starts again from the first spec.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, info_span, Instrument, Span};

use crate::config::Config;
use crate::core::schema::TableLoadSpec;
use crate::core::traits::{Connector, SinkConnection};
use crate::error::Result;
use crate::session::ConnectionManager;
use crate::source::CsvSource;
use crate::transfer::BatchInserter;
use crate::typemap::TypeCoercer;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Connecting,
    /// Loading the manifest entry at this index.
    LoadingTable(usize),
    Committing,
    RollingBack,
    /// Terminal: every spec loaded and committed.
    Closed,
    /// Terminal: the run failed.
    ClosedWithError,
}

/// Per-table outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableLoadStats {
    /// Target table.
    pub table: String,

    /// Source file the rows came from.
    pub source: String,

    /// Rows inserted and committed.
    pub rows: u64,

    /// Flushes performed.
    pub batches: u64,

    /// When loading of this table began.
    pub started_at: DateTime<Utc>,

    /// Time spent on this table in seconds.
    pub duration_seconds: f64,
}

/// Result of a load run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadResult {
    /// Unique run identifier.
    pub run_id: String,

    /// Final status.
    pub status: String,

    /// Sink type the run wrote to ("mysql", "noop").
    pub target: String,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run completed.
    pub completed_at: DateTime<Utc>,

    /// Tables loaded.
    pub tables_total: usize,

    /// Total rows loaded across all tables.
    pub rows_loaded: u64,

    /// Average throughput (rows/second).
    pub rows_per_second: u64,

    /// Per-table statistics, in load order.
    pub tables: Vec<TableLoadStats>,
}

impl LoadResult {
    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of a sink health check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Sink type checked.
    pub target: String,

    pub connected: bool,

    /// Time to open and close one connection.
    pub latency_ms: u64,

    pub error: Option<String>,

    pub healthy: bool,
}

/// Open one connection through `connector` and close it again.
pub async fn health_check<K: Connector>(connector: &K) -> HealthCheckResult {
    let timer = Instant::now();
    let outcome = match connector.connect().await {
        Ok(conn) => conn.close().await,
        Err(e) => Err(e),
    };
    let latency_ms = timer.elapsed().as_millis() as u64;

    match outcome {
        Ok(()) => {
            info!("{} sink reachable ({}ms)", connector.db_type(), latency_ms);
            HealthCheckResult {
                target: connector.db_type().to_string(),
                connected: true,
                latency_ms,
                error: None,
                healthy: true,
            }
        }
        Err(e) => {
            error!("{} sink health check failed: {}", connector.db_type(), e);
            HealthCheckResult {
                target: connector.db_type().to_string(),
                connected: false,
                latency_ms,
                error: Some(e.to_string()),
                healthy: false,
            }
        }
    }
}

/// Load orchestrator.
pub struct Orchestrator<K: Connector> {
    connector: K,
    source: CsvSource,
    batch_size: usize,
    run_id: String,
    span: Span,
    phase: RunPhase,
}

impl<K: Connector> Orchestrator<K> {
    /// Create an orchestrator writing through `connector`.
    pub fn new(connector: K, source: CsvSource, batch_size: usize) -> Self {
        let run_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!("load", run_id = %run_id);
        Self {
            connector,
            source,
            batch_size: batch_size.max(1),
            run_id,
            span,
            phase: RunPhase::Idle,
        }
    }

    /// Create an orchestrator from the `load` section of a configuration.
    pub fn from_config(connector: K, config: &Config) -> Self {
        Self::new(
            connector,
            CsvSource::from_config(&config.load),
            config.load.batch_size,
        )
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Load every spec, in order, over a single connection.
    ///
    /// The first failure stops the run: remaining specs are skipped, the
    /// in-flight batch is rolled back, and the connection is closed.
    pub async fn run(&mut self, specs: &[TableLoadSpec]) -> Result<LoadResult> {
        let span = self.span.clone();
        self.run_inner(specs).instrument(span).await
    }

    async fn run_inner(&mut self, specs: &[TableLoadSpec]) -> Result<LoadResult> {
        let started_at = Utc::now();
        let timer = Instant::now();
        info!(
            "Starting load run {}: {} tables, batch size {}",
            self.run_id,
            specs.len(),
            self.batch_size
        );

        self.phase = RunPhase::Connecting;
        let mut session = match ConnectionManager::open(&self.connector).await {
            Ok(session) => session,
            Err(e) => {
                self.phase = RunPhase::ClosedWithError;
                error!("Fatal error during load: {}", e);
                return Err(e);
            }
        };

        let mut tables = Vec::with_capacity(specs.len());
        let outcome = self
            .load_all(session.connection(), specs, &mut tables)
            .await;

        self.phase = if outcome.is_ok() {
            RunPhase::Committing
        } else {
            RunPhase::RollingBack
        };
        let outcome = session.finish(outcome).await;

        if let Err(e) = outcome {
            self.phase = RunPhase::ClosedWithError;
            error!("Fatal error during load: {}", e);
            return Err(e);
        }
        self.phase = RunPhase::Closed;

        let completed_at = Utc::now();
        let duration = timer.elapsed().as_secs_f64();
        let rows_loaded: u64 = tables.iter().map(|t: &TableLoadStats| t.rows).sum();
        let rows_per_second = if duration > 0.0 {
            (rows_loaded as f64 / duration) as u64
        } else {
            0
        };

        let result = LoadResult {
            run_id: self.run_id.clone(),
            status: "completed".to_string(),
            target: self.connector.db_type().to_string(),
            duration_seconds: duration,
            started_at,
            completed_at,
            tables_total: tables.len(),
            rows_loaded,
            rows_per_second,
            tables,
        };

        info!(
            "Load {}: {} tables, {} rows in {:.1}s ({} rows/s)",
            result.status,
            result.tables_total,
            result.rows_loaded,
            result.duration_seconds,
            result.rows_per_second
        );

        Ok(result)
    }

    async fn load_all(
        &mut self,
        conn: &mut K::Conn,
        specs: &[TableLoadSpec],
        tables: &mut Vec<TableLoadStats>,
    ) -> Result<()> {
        for (idx, spec) in specs.iter().enumerate() {
            self.phase = RunPhase::LoadingTable(idx);
            let stats = self.load_table(conn, spec).await.map_err(|e| {
                error!("Error during load of {}: {}", spec.table, e);
                e
            })?;
            tables.push(stats);
        }
        Ok(())
    }

    /// Stream one CSV file through coercion and batching into its table.
    async fn load_table(&self, conn: &mut K::Conn, spec: &TableLoadSpec) -> Result<TableLoadStats> {
        let started_at = Utc::now();
        let timer = Instant::now();
        info!(
            "Starting load of table {} from {}",
            spec.table,
            self.source.resolve(spec).display()
        );

        let coercer = TypeCoercer::new(&spec.columns);
        let records = self.source.open(spec)?;
        let mut inserter = BatchInserter::new(conn, spec, self.batch_size)?;

        for record in records {
            let record = record?;
            let row = coercer.coerce_row(|column| record.get(column)).map_err(|e| {
                error!(
                    "Coercion failed for {} at line {}: {}",
                    spec.table,
                    record.line(),
                    e
                );
                e
            })?;
            inserter.add(row).await?;
        }

        let summary = inserter.finish().await?;
        let elapsed = timer.elapsed();
        info!(
            "Load of {} completed in {:.2?}. Total rows: {}",
            spec.table, elapsed, summary.rows
        );

        Ok(TableLoadStats {
            table: spec.table.clone(),
            source: spec.csv.clone(),
            rows: summary.rows,
            batches: summary.batches,
            started_at,
            duration_seconds: elapsed.as_secs_f64(),
        })
    }
}
