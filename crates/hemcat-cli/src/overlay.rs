use std::path::PathBuf;

use clap::Subcommand;

use crate::context::AppContext;

/// Sub-commands available under `overlay`.
#[derive(Debug, Subcommand)]
pub enum OverlayCommands {
    /// Print the overlay document, or one product's status and overrides
    Show {
        #[arg(long)]
        product_id: Option<String>,
    },
    /// Import the pre-overlay custom products file
    MigrateLegacy {
        /// Defaults to HEMCAT_LEGACY_CUSTOM_PATH
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

pub(crate) async fn run_overlay(ctx: &AppContext, command: OverlayCommands) -> anyhow::Result<()> {
    match command {
        OverlayCommands::Show { product_id: None } => {
            let overlay = ctx.store.load().await;
            println!("{}", serde_json::to_string_pretty(&overlay)?);
        }
        OverlayCommands::Show {
            product_id: Some(product_id),
        } => {
            let overlay = ctx.store.load().await;
            println!("{product_id}: {}", overlay.status(&product_id));
            if let Some(patch) = overlay.overrides_for(&product_id) {
                for (field, value) in patch {
                    println!("  {field} = {value}");
                }
            }
        }
        OverlayCommands::MigrateLegacy { path } => {
            let path = path.unwrap_or_else(|| ctx.config.legacy_custom_path.clone());
            if ctx.store.migrate_legacy_custom_items(&path).await? {
                println!("migrated custom products from {}", path.display());
            } else {
                println!("nothing to migrate");
            }
        }
    }
    Ok(())
}
