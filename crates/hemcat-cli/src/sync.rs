use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context as _;
use hemcat_catalog::CatalogSnapshot;

use crate::context::AppContext;

/// Runs a full refresh and prints a summary; optionally writes the merged
/// products as JSON.
///
/// Unreadable sources and media failures are reported, not fatal.
///
/// # Errors
///
/// Returns an error if the catalogue list cannot be loaded or the JSON file
/// cannot be written.
pub(crate) async fn run_sync(
    ctx: &AppContext,
    json_out: Option<&Path>,
    skip_images: bool,
) -> anyhow::Result<()> {
    let pipeline = ctx.pipeline(skip_images)?;
    let overlay = ctx.store.load().await;
    let snapshot = pipeline.refresh(overlay).await;

    print_summary(&snapshot);

    if let Some(path) = json_out {
        let body = serde_json::to_string_pretty(&snapshot.products)?;
        tokio::fs::write(path, body)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("wrote {} products to {}", snapshot.products.len(), path.display());
    }

    Ok(())
}

fn print_summary(snapshot: &CatalogSnapshot) {
    for failure in &snapshot.failures {
        println!("skipped {}: {}", failure.catalogue, failure.error);
    }

    let mut per_catalogue: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for product in &snapshot.products {
        let entry = per_catalogue.entry(product.catalogue.as_str()).or_default();
        entry.0 += 1;
        if product.image_url.is_some() || product.has_image() {
            entry.1 += 1;
        }
    }

    println!("{:<32}{:>10}{:>10}", "CATALOGUE", "PRODUCTS", "IMAGES");
    for (catalogue, (products, images)) in &per_catalogue {
        println!("{catalogue:<32}{products:>10}{images:>10}");
    }
    println!();

    let stats = &snapshot.stats;
    println!(
        "{} rows read, {} deleted, {} overridden, {} custom",
        stats.rows_read, stats.deleted, stats.overridden, stats.custom
    );
    println!("{} assets indexed", snapshot.asset_count);
    for (tier, count) in &stats.matched {
        println!("  {tier:<34}{count:>6}");
    }
    if stats.image_overrides > 0 {
        println!("  {:<34}{:>6}", "image set by override", stats.image_overrides);
    }
    println!("  {:<34}{:>6}", "no image", stats.unmatched);
    if snapshot.hydration.fetched + snapshot.hydration.failed > 0 {
        println!(
            "{} images downloaded, {} failed",
            snapshot.hydration.fetched, snapshot.hydration.failed
        );
    }
}
