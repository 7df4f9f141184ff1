//! Scoped sink connections.
//!
//! [`ConnectionManager`] owns the single connection of a load run. Work is
//! done through [`ConnectionManager::connection`]; the run then hands its
//! outcome to [`ConnectionManager::finish`], which commits on success or
//! rolls back on failure, and closes the connection exactly once either way.

use tracing::{error, info, warn};

use crate::core::traits::{Connector, SinkConnection};
use crate::error::Result;

/// Guard around an open sink connection.
pub struct ConnectionManager<C: SinkConnection> {
    conn: Option<C>,
    db_type: String,
}

impl<C: SinkConnection> ConnectionManager<C> {
    /// Establish the connection. Failures surface before any work is done.
    pub async fn open<K>(connector: &K) -> Result<Self>
    where
        K: Connector<Conn = C>,
    {
        let conn = connector.connect().await.map_err(|e| {
            error!("Failed to connect to {} sink: {}", connector.db_type(), e);
            e
        })?;
        info!("Database connection established ({})", connector.db_type());

        Ok(Self {
            conn: Some(conn),
            db_type: connector.db_type().to_string(),
        })
    }

    /// The open connection.
    pub fn connection(&mut self) -> &mut C {
        match self.conn.as_mut() {
            Some(conn) => conn,
            None => unreachable!("connection is only taken by finish, which consumes the guard"),
        }
    }

    /// End the scope with the outcome of the work done inside it.
    ///
    /// - `Ok`: commit pending work, then close. A commit failure becomes the
    ///   result (pending work is rolled back first).
    /// - `Err`: roll back pending work, then close. The original error is
    ///   returned; a rollback failure is only logged.
    ///
    /// Close failures are logged and never replace the returned outcome.
    pub async fn finish<T>(mut self, outcome: Result<T>) -> Result<T> {
        let Some(mut conn) = self.conn.take() else {
            return outcome;
        };

        let outcome = match outcome {
            Ok(value) => match conn.commit().await {
                Ok(()) => {
                    info!("Transaction completed successfully");
                    Ok(value)
                }
                Err(e) => {
                    error!("Final commit failed: {}", e);
                    if let Err(rb) = conn.rollback().await {
                        warn!("Rollback after failed commit also failed: {}", rb);
                    }
                    Err(e)
                }
            },
            Err(e) => {
                match conn.rollback().await {
                    Ok(()) => error!("Error during load. Rollback executed: {}", e),
                    Err(rb) => error!("Error during load: {}. Rollback failed: {}", e, rb),
                }
                Err(e)
            }
        };

        match conn.close().await {
            Ok(()) => info!("Database connection closed ({})", self.db_type),
            Err(e) => warn!("Error closing {} connection: {}", self.db_type, e),
        }

        outcome
    }
}

impl<C: SinkConnection> Drop for ConnectionManager<C> {
    fn drop(&mut self) {
        if self.conn.is_some() {
            warn!(
                "{} connection dropped without finish; uncommitted work is left to the server to discard",
                self.db_type
            );
        }
    }
}
