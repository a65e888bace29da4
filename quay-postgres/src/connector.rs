//! Connection strategies.
//!
//! Every path funnels through [`Connector::connect_by_url`], which parses the
//! connection string, applies connect options in order, installs diagnostics
//! when debugging, and hands the result to the [`Transport`].
//!
//! ```text
//! connect ─┬─ localhost ─▶ connect_local ──┐
//!          └─ otherwise ─▶ connect_remote ─┴─▶ connect_by_url ─▶ Transport
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::context::ConnectContext;
use crate::descriptor::ConnectionDescriptor;
use crate::error::PgResult;
use crate::options::{ConnectOption, apply_all};
use crate::resolver::ResolverMode;
use crate::transport::{PgTransport, Transport};

/// Port of the connection pooler in front of managed databases.
pub const POOLER_PORT: u16 = 6543;

/// Port the database itself listens on.
pub const DIRECT_PORT: u16 = 5432;

/// Host name that selects the local strategy.
pub const LOCAL_HOST: &str = "localhost";

/// Default role and database name.
pub const DEFAULT_USER: &str = "postgres";

/// Connect timeout applied to local connections.
pub const LOCAL_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Selects and runs a connection strategy.
#[derive(Clone)]
pub struct Connector<T = PgTransport> {
    ctx: Arc<ConnectContext>,
    transport: T,
}

impl Connector<PgTransport> {
    /// Create a connector using the `tokio-postgres` transport.
    pub fn new(ctx: Arc<ConnectContext>) -> Self {
        Self::with_transport(ctx, PgTransport::new())
    }
}

impl<T: Transport> Connector<T> {
    /// Create a connector over a custom transport.
    pub fn with_transport(ctx: Arc<ConnectContext>, transport: T) -> Self {
        Self { ctx, transport }
    }

    /// The shared context.
    pub fn context(&self) -> &ConnectContext {
        &self.ctx
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Connect using an explicit connection string.
    ///
    /// Errors from the transport are returned as-is.
    pub async fn connect_by_url(
        &self,
        url: &str,
        options: &[ConnectOption],
    ) -> PgResult<T::Connection> {
        let mut config = ClientConfig::parse(url)?;
        apply_all(&mut config, options);
        if self.ctx.debug() {
            ConnectOption::DiagnosticHook.apply(&mut config);
        }

        debug!(
            addr = %config.address(),
            options = options.len(),
            diagnostics = config.diagnostics,
            "Opening connection"
        );
        self.transport.connect(&config).await
    }

    /// Connect to the locally running database.
    ///
    /// Unset descriptor fields get local defaults. No protocol options are
    /// forced and failures are never retried.
    pub async fn connect_local(
        &self,
        mut descriptor: ConnectionDescriptor,
        options: &[ConnectOption],
    ) -> PgResult<T::Connection> {
        self.apply_local_defaults(&mut descriptor);
        self.connect_by_url(&descriptor.to_url(), options).await
    }

    /// Connect to a database over the network.
    ///
    /// Statements are forced onto the simple query protocol, and the
    /// fallback resolver is installed when the resolver mode asks for it.
    /// If the pooler port of a managed host cannot be reached, one more
    /// attempt is made against [`DIRECT_PORT`] and its result is final.
    pub async fn connect_remote(
        &self,
        mut descriptor: ConnectionDescriptor,
        options: &[ConnectOption],
    ) -> PgResult<T::Connection> {
        apply_remote_defaults(&mut descriptor);

        let mut options = options.to_vec();
        options.push(ConnectOption::ForceSimpleProtocol);
        if self.ctx.resolver_mode() == ResolverMode::Https {
            options.push(ConnectOption::ResolverOverride(self.ctx.fallback_resolver()));
        }

        let err = match self.connect_by_url(&descriptor.to_url(), &options).await {
            Ok(conn) => return Ok(conn),
            Err(err) => err,
        };

        if !err.is_connectivity_error()
            || descriptor.port != POOLER_PORT
            || !self.ctx.is_managed_host(&descriptor.host)
        {
            return Err(err);
        }

        info!(
            host = %descriptor.host,
            error = %err,
            "Connection pooler unavailable, falling back to direct port"
        );
        descriptor.port = DIRECT_PORT;
        self.ctx.notice(&format!(
            "Retrying... {} {}",
            descriptor.host, descriptor.port
        ));
        self.connect_by_url(&descriptor.to_url(), &options).await
    }

    /// Connect with the strategy matching the descriptor's host.
    pub async fn connect(
        &self,
        descriptor: ConnectionDescriptor,
        options: &[ConnectOption],
    ) -> PgResult<T::Connection> {
        if is_local_host(&descriptor.host) {
            self.ctx.notice("Connecting to local database...");
            self.connect_local(descriptor, options).await
        } else {
            self.ctx.notice("Connecting to remote database...");
            self.connect_remote(descriptor, options).await
        }
    }

    fn apply_local_defaults(&self, descriptor: &mut ConnectionDescriptor) {
        if descriptor.host.is_empty() {
            descriptor.host = LOCAL_HOST.to_string();
        }
        if descriptor.port == 0 {
            descriptor.port = self.ctx.local_port();
        }
        if descriptor.user.is_empty() {
            descriptor.user = DEFAULT_USER.to_string();
        }
        if descriptor.password.is_empty() {
            descriptor.password = self.ctx.local_password().to_string();
        }
        if descriptor.database.is_empty() {
            descriptor.database = DEFAULT_USER.to_string();
        }
        if descriptor.connect_timeout.is_zero() {
            descriptor.connect_timeout = LOCAL_CONNECT_TIMEOUT;
        }
    }
}

// The timeout is left for the URL builder to default.
fn apply_remote_defaults(descriptor: &mut ConnectionDescriptor) {
    if descriptor.port == 0 {
        descriptor.port = POOLER_PORT;
    }
    if descriptor.user.is_empty() {
        descriptor.user = DEFAULT_USER.to_string();
    }
    if descriptor.database.is_empty() {
        descriptor.database = DEFAULT_USER.to_string();
    }
}

/// Whether `host` selects the local strategy.
pub fn is_local_host(host: &str) -> bool {
    host.eq_ignore_ascii_case(LOCAL_HOST)
}
