mod context;
mod custom;
mod edit;
mod overlay;
mod sync;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::context::AppContext;
use crate::custom::CustomCommands;
use crate::edit::OverrideCommands;
use crate::overlay::OverlayCommands;

#[derive(Debug, Parser)]
#[command(name = "hemcat-cli")]
#[command(about = "Product catalogue merger command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Merge every catalogue source with the overlay and media assets
    Sync {
        /// Write the merged products to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,
        /// Resolve image URLs without downloading the images
        #[arg(long)]
        skip_images: bool,
    },
    /// Print the stable id of a spreadsheet product
    Id {
        catalogue: String,
        category: String,
        item: String,
        /// SKU code; an absent SKU hashes as an empty string
        #[arg(long, default_value = "")]
        sku: String,
    },
    /// Edit field overrides of spreadsheet products
    Override {
        #[command(subcommand)]
        command: OverrideCommands,
    },
    /// Soft-delete a spreadsheet product
    Delete { product_id: String },
    /// Undo a soft delete
    Restore { product_id: String },
    /// Manage products that exist only in the overlay
    Custom {
        #[command(subcommand)]
        command: CustomCommands,
    },
    /// Inspect or migrate the overlay document
    Overlay {
        #[command(subcommand)]
        command: OverlayCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = hemcat_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("hemcat-cli ready; run with --help for commands");
        return Ok(());
    };

    if let Commands::Id {
        catalogue,
        category,
        item,
        sku,
    } = &command
    {
        println!(
            "{}",
            hemcat_core::stable_product_id(catalogue, category, item, sku)
        );
        return Ok(());
    }

    let ctx = AppContext::new(config)?;
    match command {
        Commands::Sync { json, skip_images } => {
            sync::run_sync(&ctx, json.as_deref(), skip_images).await?;
        }
        Commands::Override { command } => edit::run_override(&ctx, command).await?,
        Commands::Delete { product_id } => edit::run_delete(&ctx, &product_id).await?,
        Commands::Restore { product_id } => edit::run_restore(&ctx, &product_id).await?,
        Commands::Custom { command } => custom::run_custom(&ctx, command).await?,
        Commands::Overlay { command } => overlay::run_overlay(&ctx, command).await?,
        Commands::Id { .. } => {}
    }

    Ok(())
}
