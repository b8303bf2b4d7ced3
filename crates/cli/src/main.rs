//! Ivy Lane CLI - Database migrations and catalog administration.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! ivy-cli migrate
//!
//! # Seed the catalog from a YAML fixture
//! ivy-cli seed -f fixtures/demo.yaml
//!
//! # Soft delete / restore catalog entries
//! ivy-cli catalog soft-delete products 3 7
//! ivy-cli catalog restore categories 2
//!
//! # Toggle free delivery
//! ivy-cli catalog free-delivery --on 3 7
//!
//! # Export tables as CSV
//! ivy-cli export products -o products.csv
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(name = "ivy-cli")]
#[command(author, version, about = "Ivy Lane CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed the catalog from a YAML fixture
    Seed {
        /// Path to the fixture file
        #[arg(short, long, default_value = "fixtures/demo.yaml")]
        file: String,
    },
    /// Catalog administration
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Export a table as CSV
    Export {
        /// What to export
        #[arg(value_enum)]
        table: ExportTable,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Flag products or categories as deleted (hidden from the storefront)
    SoftDelete {
        #[arg(value_enum)]
        target: CatalogTarget,

        /// IDs to flag
        #[arg(required = true)]
        ids: Vec<i32>,
    },
    /// Clear the deleted flag
    Restore {
        #[arg(value_enum)]
        target: CatalogTarget,

        /// IDs to restore
        #[arg(required = true)]
        ids: Vec<i32>,
    },
    /// Toggle free delivery for products
    FreeDelivery {
        /// Enable free delivery (disables without this flag)
        #[arg(long)]
        on: bool,

        /// Product IDs
        #[arg(required = true)]
        ids: Vec<i32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CatalogTarget {
    Products,
    Categories,
    Orders,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportTable {
    Products,
    Categories,
    Tags,
    Orders,
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
        Commands::Seed { file } => commands::seed::run(&file).await?,
        Commands::Catalog { action } => match action {
            CatalogAction::SoftDelete { target, ids } => {
                commands::catalog::set_deleted(target.into(), &ids, true).await?;
            }
            CatalogAction::Restore { target, ids } => {
                commands::catalog::set_deleted(target.into(), &ids, false).await?;
            }
            CatalogAction::FreeDelivery { on, ids } => {
                commands::catalog::set_free_delivery(&ids, on).await?;
            }
        },
        Commands::Export { table, output } => {
            commands::export::run(table.into(), output.as_deref()).await?;
        }
    }
    Ok(())
}

impl From<CatalogTarget> for commands::catalog::Target {
    fn from(target: CatalogTarget) -> Self {
        match target {
            CatalogTarget::Products => Self::Products,
            CatalogTarget::Categories => Self::Categories,
            CatalogTarget::Orders => Self::Orders,
        }
    }
}

impl From<ExportTable> for commands::export::Table {
    fn from(table: ExportTable) -> Self {
        match table {
            ExportTable::Products => Self::Products,
            ExportTable::Categories => Self::Categories,
            ExportTable::Tags => Self::Tags,
            ExportTable::Orders => Self::Orders,
        }
    }
}
