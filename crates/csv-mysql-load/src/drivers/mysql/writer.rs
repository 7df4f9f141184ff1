//! MySQL/MariaDB sink implementation.
//!
//! Implements [`Connector`] and [`SinkConnection`] on top of mysql_async.
//! Connections are opened with autocommit disabled, so every INSERT joins an
//! implicit transaction that stays pending until `COMMIT`.

use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Conn, Opts, OptsBuilder, SslOpts};
use tracing::{debug, info, warn};

use crate::config::TargetConfig;
use crate::core::schema::InsertStatement;
use crate::core::traits::{Connector, SinkConnection};
use crate::core::value::{Row, SqlValue};
use crate::error::{LoadError, Result};

/// MySQL max placeholders per prepared statement.
const MYSQL_MAX_PLACEHOLDERS: usize = 65535;

/// Opens MySQL connections from the target configuration.
#[derive(Debug, Clone)]
pub struct MysqlConnector {
    config: TargetConfig,
}

impl MysqlConnector {
    pub fn new(config: TargetConfig) -> Self {
        Self { config }
    }

    fn opts(&self) -> Opts {
        let config = &self.config;
        let ssl_opts = match config.ssl_mode.to_lowercase().as_str() {
            "disable" => {
                warn!("MySQL TLS is disabled. Credentials will be transmitted in plaintext.");
                None
            }
            "prefer" | "require" => Some(SslOpts::default().with_danger_accept_invalid_certs(true)),
            "verify-ca" | "verify_ca" | "verify-full" | "verify_identity" => {
                Some(SslOpts::default())
            }
            _ => {
                warn!(
                    "Unknown ssl_mode '{}', defaulting to Preferred",
                    config.ssl_mode
                );
                Some(SslOpts::default().with_danger_accept_invalid_certs(true))
            }
        };

        let mut builder = OptsBuilder::default()
            .ip_or_hostname(config.host.clone())
            .tcp_port(config.port)
            .db_name(Some(config.database.clone()))
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()))
            // utf8mb4 for full Unicode; autocommit off so batches commit explicitly
            .init(vec!["SET NAMES utf8mb4", "SET autocommit = 0"]);

        if let Some(ssl) = ssl_opts {
            builder = builder.ssl_opts(ssl);
        }

        builder.into()
    }
}

#[async_trait]
impl Connector for MysqlConnector {
    type Conn = MysqlConnection;

    async fn connect(&self) -> Result<MysqlConnection> {
        let mut conn = Conn::new(self.opts())
            .await
            .map_err(|e| {
                LoadError::connection(e, format!("connecting to {}", self.config.display_url()))
            })?;

        conn.query_drop("SELECT 1")
            .await
            .map_err(|e| LoadError::connection(e, "testing MySQL connection"))?;

        info!(
            "Connected to MySQL target: {}:{}/{}",
            self.config.host, self.config.port, self.config.database
        );

        Ok(MysqlConnection { conn })
    }

    fn db_type(&self) -> &str {
        "mysql"
    }
}

/// One open MySQL session.
pub struct MysqlConnection {
    conn: Conn,
}

#[async_trait]
impl SinkConnection for MysqlConnection {
    async fn execute_many(&mut self, stmt: &InsertStatement, rows: &[Row]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let num_cols = stmt.num_columns();
        if num_cols == 0 {
            return Err(LoadError::batch_insert(stmt.table(), "no columns to insert"));
        }

        // Oversized flushes go out as several statements in the same transaction.
        let max_rows_per_stmt = MYSQL_MAX_PLACEHOLDERS / num_cols;
        for chunk in rows.chunks(max_rows_per_stmt) {
            if let Some(bad) = chunk.iter().find(|row| row.len() != num_cols) {
                return Err(LoadError::batch_insert(
                    stmt.table(),
                    format!("row has {} values, expected {}", bad.len(), num_cols),
                ));
            }

            let params: Vec<mysql_async::Value> = chunk
                .iter()
                .flat_map(|row| row.iter().map(sql_value_to_mysql))
                .collect();

            self.conn
                .exec_drop(stmt.sql(chunk.len()), params)
                .await
                .map_err(|e| {
                    LoadError::batch_insert(stmt.table(), format!("INSERT batch: {}", e))
                })?;
        }

        debug!("MySQL: wrote {} rows to {}", rows.len(), stmt.table());
        Ok(rows.len() as u64)
    }

    async fn commit(&mut self) -> Result<()> {
        self.conn
            .query_drop("COMMIT")
            .await
            .map_err(|e| LoadError::connection(e, "committing transaction"))
    }

    async fn rollback(&mut self) -> Result<()> {
        self.conn
            .query_drop("ROLLBACK")
            .await
            .map_err(|e| LoadError::connection(e, "rolling back transaction"))
    }

    async fn close(self) -> Result<()> {
        self.conn
            .disconnect()
            .await
            .map_err(|e| LoadError::connection(e, "closing MySQL connection"))
    }
}

/// Convert SqlValue to mysql_async::Value.
fn sql_value_to_mysql(value: &SqlValue) -> mysql_async::Value {
    match value {
        SqlValue::Null => mysql_async::Value::NULL,
        SqlValue::Int(i) => mysql_async::Value::from(*i),
        SqlValue::Float(f) => mysql_async::Value::from(*f),
        SqlValue::Text(s) => mysql_async::Value::from(s.as_str()),
    }
}
