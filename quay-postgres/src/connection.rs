//! Live PostgreSQL connection handle.

use std::fmt;

use tokio::task::JoinHandle;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Row, SimpleQueryMessage, SimpleQueryRow};
use tracing::{debug, info};

use crate::error::{PgError, PgResult};

/// A connected client plus the task driving its socket.
///
/// The caller owns the handle. Dropping it closes the connection; [`close`]
/// additionally waits for the server session to end.
///
/// [`close`]: PgConnection::close
pub struct PgConnection {
    client: Client,
    driver: JoinHandle<()>,
    simple_protocol: bool,
    diagnostics: bool,
}

impl PgConnection {
    pub(crate) fn new(
        client: Client,
        driver: JoinHandle<()>,
        simple_protocol: bool,
        diagnostics: bool,
    ) -> Self {
        Self {
            client,
            driver,
            simple_protocol,
            diagnostics,
        }
    }

    /// Whether statements are restricted to the simple query protocol.
    pub fn simple_protocol(&self) -> bool {
        self.simple_protocol
    }

    /// Whether protocol tracing is enabled.
    pub fn diagnostics(&self) -> bool {
        self.diagnostics
    }

    /// Run one or more statements with the simple protocol and return the
    /// result rows as text.
    pub async fn simple_query(&self, sql: &str) -> PgResult<Vec<SimpleQueryRow>> {
        self.trace("Q", sql);

        let rows = self
            .client
            .simple_query(sql)
            .await?
            .into_iter()
            .filter_map(|message| match message {
                SimpleQueryMessage::Row(row) => Some(row),
                _ => None,
            })
            .collect();
        Ok(rows)
    }

    /// Execute a batch of statements in a single round-trip.
    pub async fn batch_execute(&self, sql: &str) -> PgResult<()> {
        self.trace("Q", sql);
        self.client.batch_execute(sql).await?;
        Ok(())
    }

    /// Execute a query with the extended protocol and return all rows.
    ///
    /// Fails with [`PgError::Protocol`] on connections restricted to the
    /// simple protocol.
    pub async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> PgResult<Vec<Row>> {
        self.require_extended(sql)?;
        self.trace("P/B/E", sql);
        Ok(self.client.query(sql, params).await?)
    }

    /// Execute a statement with the extended protocol and return the number
    /// of affected rows.
    ///
    /// Fails with [`PgError::Protocol`] on connections restricted to the
    /// simple protocol.
    pub async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> PgResult<u64> {
        self.require_extended(sql)?;
        self.trace("P/B/E", sql);
        Ok(self.client.execute(sql, params).await?)
    }

    /// Get the underlying tokio-postgres client.
    ///
    /// This is useful for advanced operations not covered by this wrapper.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Close the connection and wait for the driver task to finish.
    pub async fn close(self) -> PgResult<()> {
        let Self { client, driver, .. } = self;
        drop(client);
        driver
            .await
            .map_err(|e| PgError::protocol(format!("connection task failed: {}", e)))
    }

    fn require_extended(&self, sql: &str) -> PgResult<()> {
        if self.simple_protocol {
            debug!(sql = %sql, "Rejecting extended-protocol statement");
            return Err(PgError::protocol(
                "connection is restricted to the simple query protocol; use simple_query or batch_execute",
            ));
        }
        Ok(())
    }

    fn trace(&self, messages: &str, sql: &str) {
        if self.diagnostics {
            info!(target: "quay::wire", messages = messages, sql = %sql, "Sending");
        } else {
            debug!(sql = %sql, "Executing");
        }
    }
}

impl fmt::Debug for PgConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgConnection")
            .field("closed", &self.client.is_closed())
            .field("simple_protocol", &self.simple_protocol)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}
