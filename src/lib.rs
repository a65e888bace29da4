//! # Quay
//!
//! Connection establishment for Postgres databases that run either locally
//! or on a managed host behind a connection pooler.
//!
//! Quay provides:
//! - Canonical connection strings with guaranteed timeouts
//! - Local and remote connection strategies chosen from the target host
//! - Simple-protocol tuning and DNS-over-HTTPS resolution for remote links
//! - One automatic retry on the direct port when a managed pooler is down
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quay::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), quay::PgError> {
//!     let ctx = ConnectContext::builder()
//!         .local_port(54322)
//!         .resolver_mode(ResolverMode::Native)
//!         .build()?;
//!     let connector = Connector::new(Arc::new(ctx));
//!
//!     let conn = connector
//!         .connect(ConnectionDescriptor::new("localhost"), &[])
//!         .await?;
//!     let rows = conn.simple_query("SELECT current_user").await?;
//!
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use quay_postgres::*;

/// Common imports.
pub mod prelude {
    pub use quay_postgres::prelude::*;
}
