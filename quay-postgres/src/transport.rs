//! The wire-level half of a connection attempt.
//!
//! A [`Transport`] turns a fully-configured [`ClientConfig`] into a live
//! connection and reports failures already classified as
//! [`PgError::Timeout`], [`PgError::Dial`] or [`PgError::Unclassified`].

use std::io;
use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_postgres::{AsyncMessage, NoTls};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::connection::PgConnection;
use crate::error::{PgError, PgResult};
use crate::resolver::{HostResolver, NativeResolver};

/// Establishes connections from a [`ClientConfig`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// The live connection handle.
    type Connection: Send;

    /// Perform a single connection attempt.
    ///
    /// Implementations must enforce `config.connect_timeout` themselves and
    /// must classify failures that happen before a session exists as
    /// [`PgError::Timeout`] or [`PgError::Dial`].
    async fn connect(&self, config: &ClientConfig) -> PgResult<Self::Connection>;
}

/// Transport backed by `tokio-postgres` over plain TCP.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgTransport;

impl PgTransport {
    /// Create a new transport.
    pub fn new() -> Self {
        Self
    }

    async fn attempt(&self, config: &ClientConfig, addr: &str) -> PgResult<PgConnection> {
        let addrs = match &config.resolver {
            Some(resolver) => resolver.lookup(&config.host).await,
            None => NativeResolver.lookup(&config.host).await,
        }
        .map_err(|e| PgError::dial(addr, e))?;

        let stream = dial(&addrs, config.port, addr).await?;

        let pg_config = config.to_pg_config();
        let (client, connection) = pg_config
            .connect_raw(stream, NoTls)
            .await
            .map_err(PgError::unclassified)?;

        let driver = if config.diagnostics {
            let mut connection = connection;
            let mut messages = futures::stream::poll_fn(move |cx| connection.poll_message(cx));
            tokio::spawn(async move {
                while let Some(message) = messages.next().await {
                    match message {
                        Ok(AsyncMessage::Notice(notice)) => {
                            info!(
                                target: "quay::wire",
                                severity = %notice.severity(),
                                code = %notice.code().code(),
                                "{}",
                                notice.message()
                            );
                        }
                        Ok(AsyncMessage::Notification(notification)) => {
                            info!(
                                target: "quay::wire",
                                channel = %notification.channel(),
                                pid = notification.process_id(),
                                "{}",
                                notification.payload()
                            );
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!(target: "quay::wire", error = %e, "Connection closed with error");
                            break;
                        }
                    }
                }
            })
        } else {
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    warn!(error = %e, "Connection closed with error");
                }
            })
        };

        Ok(PgConnection::new(
            client,
            driver,
            config.simple_protocol,
            config.diagnostics,
        ))
    }
}

#[async_trait]
impl Transport for PgTransport {
    type Connection = PgConnection;

    async fn connect(&self, config: &ClientConfig) -> PgResult<PgConnection> {
        let addr = config.address();
        debug!(
            addr = %addr,
            user = %config.user,
            database = %config.database,
            simple_protocol = config.simple_protocol,
            resolver = config.resolver.as_ref().map(|r| r.name()).unwrap_or("native"),
            "Connecting"
        );

        match config.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.attempt(config, &addr))
                .await
                .map_err(|_| PgError::timeout(&addr))?,
            None => self.attempt(config, &addr).await,
        }
    }
}

/// Open a TCP session to the first reachable address.
async fn dial(addrs: &[IpAddr], port: u16, addr: &str) -> PgResult<TcpStream> {
    let mut last_error = None;

    for ip in addrs {
        match TcpStream::connect(SocketAddr::new(*ip, port)).await {
            Ok(stream) => {
                stream.set_nodelay(true).map_err(|e| PgError::dial(addr, e))?;
                return Ok(stream);
            }
            Err(e) => {
                debug!(ip = %ip, port = port, error = %e, "Dial failed");
                last_error = Some(e);
            }
        }
    }

    Err(classify_dial_error(
        addr,
        last_error.unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses to dial")),
    ))
}

fn classify_dial_error(addr: &str, err: io::Error) -> PgError {
    match err.kind() {
        io::ErrorKind::TimedOut => PgError::Timeout {
            addr: addr.to_string(),
            source: Some(Box::new(err)),
        },
        _ => PgError::dial(addr, err),
    }
}
