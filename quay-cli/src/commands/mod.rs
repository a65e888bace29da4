//! CLI command implementations.

pub mod db;

use std::path::PathBuf;
use std::sync::Arc;

use quay_postgres::{ConnectContext, Connector, ResolverMode};

use crate::cli::Cli;
use crate::config::Config;
use crate::error::{CliError, CliResult};
use crate::output::CliNotifier;

/// State shared by every command: the project directory, its configuration
/// and a connector built from both.
pub struct Session {
    /// Project directory
    pub workdir: PathBuf,
    /// Loaded `quay.toml`
    pub config: Config,
    /// Connector for the configured environment
    pub connector: Connector,
}

impl Session {
    /// Load the project configuration and build the connect context.
    pub fn from_cli(cli: &Cli) -> CliResult<Self> {
        let workdir = match &cli.workdir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        let config = Config::load_or_default(&workdir)?;
        let ctx = build_context(cli, &config)?;

        Ok(Self {
            workdir,
            config,
            connector: Connector::new(Arc::new(ctx)),
        })
    }
}

/// Build the connect context. Command-line flags take precedence over `quay.toml`.
pub fn build_context(cli: &Cli, config: &Config) -> CliResult<ConnectContext> {
    let resolver_mode = match (cli.dns_resolver, config.network.dns_resolver.as_deref()) {
        (Some(flag), _) => flag.into(),
        (None, Some(name)) => ResolverMode::from_name(name).ok_or_else(|| {
            CliError::Config(format!(
                "invalid dns_resolver '{}': expected 'native' or 'https'",
                name
            ))
        })?,
        (None, None) => ResolverMode::default(),
    };

    let mut builder = ConnectContext::builder()
        .local_port(config.db.port)
        .local_password(config.db.password.clone())
        .resolver_mode(resolver_mode)
        .debug(cli.debug)
        .notifier(Arc::new(CliNotifier));
    if let Some(pattern) = &config.network.managed_host_pattern {
        builder = builder.managed_host_pattern(pattern.clone());
    }

    builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}
