//! Hearth CLI - Session table migration and catalog inspection.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table in the storefront database
//! hearth-cli migrate
//!
//! # List WooCommerce categories
//! hearth-cli categories
//!
//! # List products, resolving category slugs the way the storefront does
//! hearth-cli products --category hoodies --sort price-asc
//! ```
//!
//! # Commands
//!
//! - `migrate` - Create the tower-sessions table
//! - `categories` - Print the category listing
//! - `products` - Print one page of filtered products

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hearth-cli")]
#[command(author, version, about = "Hearth CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the session table in the storefront database
    Migrate,
    /// List product categories
    Categories,
    /// List products
    Products {
        /// Category slug or numeric ID (repeatable)
        #[arg(short, long)]
        category: Vec<String>,

        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Sort order (`newest`, `price-asc`, `price-desc`, `popular`, `rating`, `name`)
        #[arg(long)]
        sort: Option<String>,

        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u32,
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
        Commands::Migrate => commands::migrate::sessions().await?,
        Commands::Categories => commands::catalog::categories().await?,
        Commands::Products {
            category,
            search,
            sort,
            page,
        } => commands::catalog::products(category, search, sort.as_deref(), page).await?,
    }
    Ok(())
}
