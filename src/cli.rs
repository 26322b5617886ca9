//! CLI definitions for flyway-validate

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "flyway-validate",
    version,
    about = "Pre-migration linter and Flyway configuration generator",
    long_about = "Checks a migration workflow before Flyway runs.\n\n\
    Commands: lint, flyway-conf, validate, send-log"
)]
pub struct Cli {
    /// Path to the .env-style configuration file
    pub config: PathBuf,

    /// Action to run (lint, flyway-conf, validate, send-log)
    pub command: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
