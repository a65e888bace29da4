//! `quay db` commands - Database connectivity.

use std::time::Instant;

use quay_postgres::connector::LOCAL_HOST;
use quay_postgres::{ConnectOption, ConnectionDescriptor, PgConnection};

use crate::cli::{DbArgs, DbPingArgs, DbRemoteSetArgs, DbRemoteSubcommand, DbSubcommand};
use crate::commands::Session;
use crate::config::CONFIG_FILE_NAME;
use crate::error::{CliError, CliResult};
use crate::output::{self, success};

/// Run the db command
pub async fn run(args: DbArgs, session: &Session) -> CliResult<()> {
    match args.command {
        DbSubcommand::Ping(ping_args) => run_ping(ping_args, session).await,
        DbSubcommand::Remote(remote_args) => match remote_args.command {
            DbRemoteSubcommand::Set(set_args) => run_remote_set(set_args, session).await,
        },
    }
}

/// Run `quay db ping` - Connect and report server details
async fn run_ping(args: DbPingArgs, session: &Session) -> CliResult<()> {
    output::header("Database Ping");

    let started = Instant::now();
    let conn = connect_target(&args, session).await?;
    let latency = started.elapsed();

    let rows = conn.simple_query("SHOW server_version").await?;
    let version = rows
        .first()
        .and_then(|row| row.get(0))
        .unwrap_or("unknown")
        .to_string();

    success("Database is reachable");
    output::kv("Server version", &version);
    output::kv("Connect latency", &format!("{} ms", latency.as_millis()));
    output::kv(
        "Query protocol",
        if conn.simple_protocol() {
            "simple"
        } else {
            "extended"
        },
    );

    conn.close().await?;
    Ok(())
}

async fn connect_target(args: &DbPingArgs, session: &Session) -> CliResult<PgConnection> {
    if let Some(url) = &args.db_url {
        return Ok(session.connector.connect_by_url(url, &[]).await?);
    }

    let descriptor = if args.local {
        ConnectionDescriptor::new(LOCAL_HOST)
    } else {
        let url = session.config.db.remote_url.as_deref().ok_or_else(|| {
            CliError::Command(
                "No remote database set. Run `quay db remote set <url>`, or pass --local or --db-url"
                    .to_string(),
            )
        })?;
        ConnectionDescriptor::from_url(url)?
    };

    Ok(session.connector.connect(descriptor, &[]).await?)
}

/// Run `quay db remote set` - Verify and store the remote database URL
async fn run_remote_set(args: DbRemoteSetArgs, session: &Session) -> CliResult<()> {
    output::header("Set Remote Database");

    let descriptor = ConnectionDescriptor::from_url(&args.url)?;
    output::info(&format!("Checking {}", descriptor.to_redacted_url()));

    let conn = session
        .connector
        .connect_by_url(&args.url, &[ConnectOption::ForceSimpleProtocol])
        .await?;
    conn.batch_execute("SELECT 1").await?;
    conn.close().await?;

    let mut config = session.config.clone();
    config.db.remote_url = Some(args.url);
    let config_path = session.workdir.join(CONFIG_FILE_NAME);
    config.save(&config_path)?;

    output::newline();
    success(&format!(
        "Remote database set in {}",
        config_path.display()
    ));

    Ok(())
}
