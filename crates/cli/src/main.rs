//! ecom-cart CLI - Database migrations and catalog management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! ecom-cli migrate
//!
//! # Load products from a YAML catalog
//! ecom-cli seed products --file crates/cli/catalog.yaml
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed products` - Insert catalog products
//!
//! Both commands read `DATABASE_URL` from the environment (or `.env`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ecom-cli")]
#[command(author, version, about = "ecom-cart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products from a YAML catalog file
    Products {
        /// Path to the catalog file
        #[arg(short, long)]
        file: String,

        /// Validate the file without touching the database
        #[arg(long)]
        dry_run: bool,
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Products { file, dry_run } => {
                commands::seed::products(&file, dry_run).await?;
            }
        },
    }
    Ok(())
}
