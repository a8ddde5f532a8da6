use clap::Subcommand;
use hemcat_catalog::NewCustomProduct;

use crate::context::AppContext;

/// Sub-commands available under `custom`.
#[derive(Debug, Subcommand)]
pub enum CustomCommands {
    /// Add a product that is not in any spreadsheet
    Add {
        #[arg(long)]
        catalogue: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        item: String,
        /// Defaults to "N/A"
        #[arg(long)]
        subcategory: Option<String>,
        #[arg(long, default_value = "")]
        fragrance: String,
        #[arg(long, default_value = "")]
        sku: String,
        /// Mark the product as new
        #[arg(long)]
        new: bool,
        /// Ready image URL, downloaded on sync
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Remove a custom product
    Remove { product_id: String },
    /// List custom products
    List,
}

pub(crate) async fn run_custom(ctx: &AppContext, command: CustomCommands) -> anyhow::Result<()> {
    match command {
        CustomCommands::Add {
            catalogue,
            category,
            item,
            subcategory,
            fragrance,
            sku,
            new,
            image_url,
        } => {
            let product = NewCustomProduct {
                catalogue,
                category,
                subcategory,
                item_name: item,
                fragrance,
                sku_code: sku,
                is_new: new,
                image_url,
            };
            product.validate()?;

            let overlay = ctx.store.load().await;
            let existing = ctx.local_products(&overlay).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "could not read catalogue sources for duplicate check");
                Vec::new()
            });

            let added = ctx.store.add_custom_product(product, &existing).await?;
            if !added.duplicates.is_empty() {
                println!(
                    "warning: similar product already exists: {}",
                    added.duplicates.join(", ")
                );
            }
            println!("{}: added", added.product.product_id);
        }
        CustomCommands::Remove { product_id } => {
            if ctx.store.remove_custom(&product_id).await? {
                println!("{product_id}: removed");
            } else {
                anyhow::bail!("custom product '{product_id}' not found");
            }
        }
        CustomCommands::List => {
            let overlay = ctx.store.load().await;
            if overlay.custom_products.is_empty() {
                println!("no custom products");
                return Ok(());
            }
            println!(
                "{:<15}{:<24}{:<18}{:<14}ITEM",
                "ID", "CATALOGUE", "CATEGORY", "SKU"
            );
            for product in &overlay.custom_products {
                println!(
                    "{:<15}{:<24}{:<18}{:<14}{}",
                    product.product_id,
                    product.catalogue,
                    product.category,
                    product.sku_code,
                    product.item_name
                );
            }
        }
    }
    Ok(())
}
