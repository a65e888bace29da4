//! Quay CLI - Manage local and hosted Postgres databases.

use clap::Parser;
use miette::Diagnostic;

use quay_cli::cli::{Cli, Command};
use quay_cli::commands::{self, Session};
use quay_cli::error::CliResult;
use quay_cli::{logging, output};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.debug);

    // Run the CLI and handle errors
    if let Err(e) = run(cli).await {
        output::newline();
        output::error(&e.to_string());
        if let Some(help) = e.help() {
            output::info(&help.to_string());
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let session = Session::from_cli(&cli)?;

    match cli.command {
        Command::Db(args) => commands::db::run(args, &session).await,
    }
}
