//! Connect options: ordered mutations of a [`ClientConfig`].

use std::fmt;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::resolver::HostResolver;

/// A single mutation applied to a parsed [`ClientConfig`] before connecting.
///
/// Options are applied in the order given by the caller. Every built-in
/// option is idempotent.
#[derive(Clone)]
pub enum ConnectOption {
    /// Use the simple query protocol: one round trip per statement, no
    /// prepare/bind, no server-side statement cache.
    ForceSimpleProtocol,
    /// Resolve the host with this resolver instead of the platform one.
    ResolverOverride(Arc<dyn HostResolver>),
    /// Trace protocol-level activity on the connection.
    DiagnosticHook,
    /// Arbitrary caller-supplied mutation.
    Custom(Arc<dyn Fn(&mut ClientConfig) + Send + Sync>),
}

impl ConnectOption {
    /// Build a [`ConnectOption::ResolverOverride`] from a resolver value.
    pub fn resolver(resolver: impl HostResolver + 'static) -> Self {
        Self::ResolverOverride(Arc::new(resolver))
    }

    /// Build a [`ConnectOption::Custom`] from a closure.
    pub fn custom(f: impl Fn(&mut ClientConfig) + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Apply this option to `config`.
    pub fn apply(&self, config: &mut ClientConfig) {
        match self {
            Self::ForceSimpleProtocol => config.simple_protocol = true,
            Self::ResolverOverride(resolver) => config.resolver = Some(Arc::clone(resolver)),
            Self::DiagnosticHook => config.diagnostics = true,
            Self::Custom(f) => f(config),
        }
    }
}

impl fmt::Debug for ConnectOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForceSimpleProtocol => f.write_str("ForceSimpleProtocol"),
            Self::ResolverOverride(resolver) => f
                .debug_tuple("ResolverOverride")
                .field(&resolver.name())
                .finish(),
            Self::DiagnosticHook => f.write_str("DiagnosticHook"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Apply `options` to `config` in order.
pub fn apply_all(config: &mut ClientConfig, options: &[ConnectOption]) {
    for option in options {
        option.apply(config);
    }
}
