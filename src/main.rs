//! flyway-validate
//!
//! Gatekeeper run before Flyway:
//! - Loads and checks a `.env`-style config file
//! - Lints migration filenames (`lint`)
//! - Writes `flyway.conf` from static or secrets-store credentials (`flyway-conf`)

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

mod cli;
mod commands;
mod config;
mod error;
mod files;
mod secrets;
mod ui;

use cli::Cli;
use commands::{flyway_conf, lint, validate_command, Command};
use config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // LOGGING=debug,info,warn,error or just LOGGING=debug
    let log_level = std::env::var("LOGGING")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| {
            if cli.verbose {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Reported here only; returning the error would print it again
            error!("flyway-validate failed: {:#}", e);
            ui::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let command = validate_command(&cli.command)?;

    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;
    info!(
        "Loaded {} (CONN_TYPE={}, MODE={:?})",
        cli.config.display(),
        config.conn_type,
        config.mode
    );

    ui::print_header(&format!("flyway-validate {}", command));

    match command {
        Command::Lint => {
            lint::execute(&config).await?;
            ui::print_success("Migration names valid");
        }
        Command::FlywayConf => {
            let path = flyway_conf::execute(&config).await?;
            ui::print_success(&format!("Flyway configuration ready: {}", path.display()));
        }
        Command::Validate | Command::SendLog => {
            ui::print_warning(&format!("'{}' has no actions configured", command));
        }
    }

    Ok(())
}
