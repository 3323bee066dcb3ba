//! Qwerty Town CLI - Database migrations and data maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Create or update the companies table
//! qt-cli migrate
//!
//! # Copy panel-config menus into businesses.json
//! qt-cli sync-configs --data-dir data
//!
//! # Insert companies rows for JSON records that lack one
//! qt-cli backfill-companies
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `sync-configs` - Reconcile record menus with their panel configurations
//! - `backfill-companies` - Link JSON records to `companies` rows

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "qt-cli")]
#[command(author, version, about = "Qwerty Town CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Copy each panel configuration's menu into its business record
    SyncConfigs {
        /// Directory holding businesses.json and configs/ (default: SITE_DATA_DIR)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Insert a companies row for every record without a company id
    BackfillCompanies {
        /// Directory holding businesses.json (default: SITE_DATA_DIR)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
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
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::SyncConfigs { data_dir } => {
            let report = commands::sync::run(data_dir).await?;
            if report.failed > 0 {
                tracing::warn!(failed = report.failed, "Some configs could not be read");
            }
        }
        Commands::BackfillCompanies { data_dir } => {
            commands::backfill::run(data_dir).await?;
        }
    }
    Ok(())
}
