//! Error types for connection establishment.

use thiserror::Error;

/// Boxed source error carried by classified failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for PostgreSQL operations.
pub type PgResult<T> = Result<T, PgError>;

/// Errors that can occur while connecting to or talking with PostgreSQL.
///
/// The connectivity variants ([`PgError::Timeout`] and [`PgError::Dial`]) are
/// produced by the transport itself, so callers never need to inspect nested
/// error chains to decide whether a failure was network-level.
#[derive(Error, Debug)]
pub enum PgError {
    /// The connection string could not be parsed.
    #[error("invalid connection string: {0}")]
    Parse(String),

    /// The connect timeout elapsed before a session was established.
    #[error("timed out connecting to {addr}")]
    Timeout {
        /// `host:port` of the attempt.
        addr: String,
        /// Underlying cause, if the transport reported one.
        #[source]
        source: Option<BoxError>,
    },

    /// A network-level failure establishing the transport session
    /// (name resolution, connection refused, host unreachable, ...).
    #[error("failed to dial {addr}: {source}")]
    Dial {
        /// `host:port` of the attempt.
        addr: String,
        /// Underlying cause.
        #[source]
        source: BoxError,
    },

    /// Any failure after the transport session was established:
    /// authentication, TLS negotiation, protocol mismatch.
    #[error("{0}")]
    Unclassified(#[source] BoxError),

    /// Statement execution error on a live connection.
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// The connection was configured in a way that forbids the requested operation.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl PgError {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Create a timeout error without a specific cause.
    pub fn timeout(addr: impl Into<String>) -> Self {
        Self::Timeout {
            addr: addr.into(),
            source: None,
        }
    }

    /// Create a dial error.
    pub fn dial(addr: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Dial {
            addr: addr.into(),
            source: source.into(),
        }
    }

    /// Wrap an error that is not a connectivity failure.
    pub fn unclassified(source: impl Into<BoxError>) -> Self {
        Self::Unclassified(source.into())
    }

    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Check if this is a parse error.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this is a dial failure.
    pub fn is_dial_error(&self) -> bool {
        matches!(self, Self::Dial { .. })
    }

    /// Check if this failure happened before a session existed, i.e. it is
    /// safe to retry against another endpoint.
    pub fn is_connectivity_error(&self) -> bool {
        self.is_timeout() || self.is_dial_error()
    }
}
