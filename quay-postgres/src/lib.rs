//! # quay-postgres
//!
//! Connection establishment for PostgreSQL databases running either locally
//! or on a managed host behind a connection pooler.
//!
//! This crate provides:
//! - Rendering of connection descriptors into canonical connection strings
//! - Ordered connect options (simple protocol, resolver override, diagnostics)
//! - Local and remote connection strategies with a host-based dispatcher
//! - A single fallback from the pooler port to the direct port when a
//!   managed pooler is unreachable
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quay_postgres::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = ConnectContext::builder().local_port(54322).build()?;
//!     let connector = Connector::new(Arc::new(ctx));
//!
//!     let descriptor = ConnectionDescriptor::new("db.abcdefghijklmnopqrst.supabase.co")
//!         .port(6543)
//!         .password("secret");
//!     let conn = connector.connect(descriptor, &[]).await?;
//!     conn.simple_query("SELECT 1").await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod connector;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod options;
pub mod resolver;
pub mod transport;

pub use config::{ClientConfig, SslMode};
pub use connection::PgConnection;
pub use connector::{Connector, DIRECT_PORT, POOLER_PORT};
pub use context::{ConnectContext, ConnectContextBuilder, Notify, StderrNotifier};
pub use descriptor::ConnectionDescriptor;
pub use error::{PgError, PgResult};
pub use options::ConnectOption;
pub use resolver::{DohResolver, HostResolver, NativeResolver, ResolveError, ResolverMode};
pub use transport::{PgTransport, Transport};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::ClientConfig;
    pub use crate::connection::PgConnection;
    pub use crate::connector::Connector;
    pub use crate::context::{ConnectContext, Notify};
    pub use crate::descriptor::ConnectionDescriptor;
    pub use crate::error::{PgError, PgResult};
    pub use crate::options::ConnectOption;
    pub use crate::resolver::ResolverMode;
}
