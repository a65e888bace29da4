//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use quay_postgres::ResolverMode;

/// Quay CLI - Manage local and hosted Postgres databases
#[derive(Parser, Debug)]
#[command(name = "quay")]
#[command(version)]
#[command(about = "Quay CLI - Manage local and hosted Postgres databases", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output protocol-level debug logs
    #[arg(long, global = true, env = "QUAY_DEBUG")]
    pub debug: bool,

    /// Name resolver used for remote connections
    #[arg(long, global = true, value_enum, env = "QUAY_DNS_RESOLVER")]
    pub dns_resolver: Option<DnsResolver>,

    /// Project directory containing quay.toml
    #[arg(long, global = true, env = "QUAY_WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage Postgres databases
    Db(DbArgs),
}

/// Name resolution mechanisms
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsResolver {
    /// Operating system resolver
    Native,
    /// DNS-over-HTTPS
    Https,
}

impl From<DnsResolver> for ResolverMode {
    fn from(resolver: DnsResolver) -> Self {
        match resolver {
            DnsResolver::Native => ResolverMode::Native,
            DnsResolver::Https => ResolverMode::Https,
        }
    }
}

// =============================================================================
// Db Command
// =============================================================================

/// Arguments for the `db` command
#[derive(Args, Debug)]
pub struct DbArgs {
    #[command(subcommand)]
    pub command: DbSubcommand,
}

/// Db subcommands
#[derive(Subcommand, Debug)]
pub enum DbSubcommand {
    /// Check that a database accepts connections
    Ping(DbPingArgs),

    /// Manage remote database connections
    Remote(DbRemoteArgs),
}

/// Arguments for `db ping`
#[derive(Args, Debug)]
pub struct DbPingArgs {
    /// Connect with this connection string instead of the configured target
    #[arg(long, env = "QUAY_DB_URL", conflicts_with = "local")]
    pub db_url: Option<String>,

    /// Ping the local database
    #[arg(long)]
    pub local: bool,
}

/// Arguments for `db remote`
#[derive(Args, Debug)]
pub struct DbRemoteArgs {
    #[command(subcommand)]
    pub command: DbRemoteSubcommand,
}

/// Db remote subcommands
#[derive(Subcommand, Debug)]
pub enum DbRemoteSubcommand {
    /// Set the remote database to push migrations to
    Set(DbRemoteSetArgs),
}

/// Arguments for `db remote set`
#[derive(Args, Debug)]
pub struct DbRemoteSetArgs {
    /// Remote database URL
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "quay",
            "db",
            "ping",
            "--local",
            "--debug",
            "--dns-resolver",
            "https",
        ])
        .unwrap();

        assert!(cli.debug);
        assert_eq!(cli.dns_resolver, Some(DnsResolver::Https));
        match cli.command {
            Command::Db(DbArgs {
                command: DbSubcommand::Ping(args),
            }) => assert!(args.local),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_db_url_conflicts_with_local() {
        let result = Cli::try_parse_from([
            "quay",
            "db",
            "ping",
            "--local",
            "--db-url",
            "postgresql://localhost/postgres",
        ]);
        assert!(result.is_err());
    }
}
