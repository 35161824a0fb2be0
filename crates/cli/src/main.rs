//! AntenkaYume CLI - Seeding and diagnostics tools.
//!
//! # Usage
//!
//! ```bash
//! # Seed the document store with a sample catalog, users, and orders
//! antenka-cli seed
//!
//! # Fetch and print the dashboard statistics once
//! antenka-cli stats
//!
//! # Force a refresh past the cache
//! antenka-cli stats --force
//! ```
//!
//! # Commands
//!
//! - `seed` - Write sample data through the document API
//! - `stats` - One-shot stats aggregation (for smoke-testing quotas)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "antenka-cli")]
#[command(author, version, about = "AntenkaYume Shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the document store with sample data
    Seed {
        /// Remove previously seeded documents first
        #[arg(long)]
        fresh: bool,
    },
    /// Fetch and print dashboard statistics
    Stats {
        /// Bypass the cache and re-aggregate
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed { fresh } => commands::seed::run(fresh).await?,
        Commands::Stats { force } => commands::stats::run(force).await?,
    }
    Ok(())
}
