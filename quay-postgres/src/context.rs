//! Process-wide connection settings.

use std::fmt;
use std::sync::Arc;

use regex_lite::Regex;

use crate::error::{PgError, PgResult};
use crate::resolver::{DohResolver, HostResolver, ResolverMode};

/// Default pattern for hosts served behind the managed connection pooler.
pub const DEFAULT_MANAGED_HOST_PATTERN: &str = r"^(db\.)?[a-z]{20}\.supabase\.(co|com|red)$";

/// Default port of the locally running database.
pub const DEFAULT_LOCAL_PORT: u16 = 54322;

/// Default password of the locally running database.
pub const DEFAULT_LOCAL_PASSWORD: &str = "postgres";

/// Receives operator-facing notices (strategy selection, retries).
pub trait Notify: Send + Sync {
    /// Emit a notice.
    fn notice(&self, message: &str);
}

/// Writes notices to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrNotifier;

impl Notify for StderrNotifier {
    fn notice(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Settings shared by every connector, built once at startup.
///
/// Nothing in this crate mutates a context after it is built.
#[derive(Clone)]
pub struct ConnectContext {
    local_port: u16,
    local_password: String,
    resolver_mode: ResolverMode,
    debug: bool,
    managed_hosts: Regex,
    fallback_resolver: Arc<dyn HostResolver>,
    notifier: Arc<dyn Notify>,
}

impl ConnectContext {
    /// Create a builder.
    pub fn builder() -> ConnectContextBuilder {
        ConnectContextBuilder::new()
    }

    /// Port of the locally running database.
    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// Password of the locally running database.
    pub fn local_password(&self) -> &str {
        &self.local_password
    }

    /// Active resolver mode.
    pub fn resolver_mode(&self) -> ResolverMode {
        self.resolver_mode
    }

    /// Whether protocol diagnostics are enabled.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Whether `host` is served behind the managed connection pooler.
    ///
    /// Host names are case-insensitive, so the pattern sees `host` lowercased.
    pub fn is_managed_host(&self, host: &str) -> bool {
        self.managed_hosts.is_match(&host.to_ascii_lowercase())
    }

    /// Resolver installed on remote connections when the mode is
    /// [`ResolverMode::Https`].
    pub fn fallback_resolver(&self) -> Arc<dyn HostResolver> {
        Arc::clone(&self.fallback_resolver)
    }

    /// Emit an operator-facing notice.
    pub fn notice(&self, message: &str) {
        self.notifier.notice(message);
    }
}

impl fmt::Debug for ConnectContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectContext")
            .field("local_port", &self.local_port)
            .field("local_password", &"<redacted>")
            .field("resolver_mode", &self.resolver_mode)
            .field("debug", &self.debug)
            .field("managed_hosts", &self.managed_hosts.as_str())
            .field("fallback_resolver", &self.fallback_resolver.name())
            .finish()
    }
}

/// Builder for [`ConnectContext`].
#[derive(Default)]
pub struct ConnectContextBuilder {
    local_port: Option<u16>,
    local_password: Option<String>,
    resolver_mode: Option<ResolverMode>,
    debug: bool,
    managed_host_pattern: Option<String>,
    fallback_resolver: Option<Arc<dyn HostResolver>>,
    notifier: Option<Arc<dyn Notify>>,
}

impl ConnectContextBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the local database port.
    pub fn local_port(mut self, port: u16) -> Self {
        self.local_port = Some(port);
        self
    }

    /// Set the local database password.
    pub fn local_password(mut self, password: impl Into<String>) -> Self {
        self.local_password = Some(password.into());
        self
    }

    /// Set the resolver mode.
    pub fn resolver_mode(mut self, mode: ResolverMode) -> Self {
        self.resolver_mode = Some(mode);
        self
    }

    /// Enable or disable protocol diagnostics.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the regular expression matching managed hosts.
    pub fn managed_host_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.managed_host_pattern = Some(pattern.into());
        self
    }

    /// Set the resolver used in [`ResolverMode::Https`].
    pub fn fallback_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.fallback_resolver = Some(resolver);
        self
    }

    /// Set the notice sink.
    pub fn notifier(mut self, notifier: Arc<dyn Notify>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Build the context.
    ///
    /// Fails with [`PgError::Parse`] if the managed host pattern is not a
    /// valid regular expression, and with [`PgError::Unclassified`] if the
    /// default DNS-over-HTTPS resolver cannot be created.
    pub fn build(self) -> PgResult<ConnectContext> {
        let pattern = self
            .managed_host_pattern
            .as_deref()
            .unwrap_or(DEFAULT_MANAGED_HOST_PATTERN);
        let managed_hosts = Regex::new(pattern)
            .map_err(|e| PgError::parse(format!("invalid managed host pattern: {}", e)))?;

        let fallback_resolver = match self.fallback_resolver {
            Some(resolver) => resolver,
            None => Arc::new(DohResolver::cloudflare().map_err(PgError::unclassified)?),
        };

        Ok(ConnectContext {
            local_port: self.local_port.unwrap_or(DEFAULT_LOCAL_PORT),
            local_password: self
                .local_password
                .unwrap_or_else(|| DEFAULT_LOCAL_PASSWORD.to_string()),
            resolver_mode: self.resolver_mode.unwrap_or_default(),
            debug: self.debug,
            managed_hosts,
            fallback_resolver,
            notifier: self.notifier.unwrap_or_else(|| Arc::new(StderrNotifier)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let ctx = ConnectContext::builder().build().unwrap();
        assert_eq!(ctx.local_port(), DEFAULT_LOCAL_PORT);
        assert_eq!(ctx.local_password(), DEFAULT_LOCAL_PASSWORD);
        assert_eq!(ctx.resolver_mode(), ResolverMode::Native);
        assert!(!ctx.debug());
    }

    #[test]
    fn test_default_managed_hosts() {
        let ctx = ConnectContext::builder().build().unwrap();
        assert!(ctx.is_managed_host("db.abcdefghijklmnopqrst.supabase.co"));
        assert!(ctx.is_managed_host("abcdefghijklmnopqrst.supabase.co"));
        assert!(!ctx.is_managed_host("db.short.supabase.co"));
        assert!(!ctx.is_managed_host("db.example.com"));
        assert!(!ctx.is_managed_host("localhost"));
    }

    #[test]
    fn test_managed_hosts_ignore_case() {
        let ctx = ConnectContext::builder().build().unwrap();
        assert!(ctx.is_managed_host("DB.ABCDEFGHIJKLMNOPQRST.Supabase.CO"));
        assert!(ctx.is_managed_host("Abcdefghijklmnopqrst.supabase.com"));
    }

    #[test]
    fn test_custom_managed_pattern() {
        let ctx = ConnectContext::builder()
            .managed_host_pattern(r"\.internal\.example$")
            .build()
            .unwrap();
        assert!(ctx.is_managed_host("pg.internal.example"));
        assert!(!ctx.is_managed_host("db.abcdefghijklmnopqrst.supabase.co"));
    }

    #[test]
    fn test_invalid_managed_pattern() {
        let err = ConnectContext::builder()
            .managed_host_pattern("(unclosed")
            .build()
            .unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_debug_hides_password() {
        let ctx = ConnectContext::builder()
            .local_password("hunter2")
            .build()
            .unwrap();
        assert!(!format!("{:?}", ctx).contains("hunter2"));
    }
}
