//! Fills image payloads for records that carry an `image_url`.

use std::collections::{HashMap, HashSet};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use futures::stream::{self, StreamExt};
use hemcat_core::ProductRecord;

use crate::remote::ImageFetcher;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HydrationStats {
    /// Distinct URLs fetched successfully.
    pub fetched: usize,
    /// Distinct URLs that failed; their products keep an empty image.
    pub failed: usize,
}

/// Downloads each distinct image URL once and stores the base64 payload on
/// every record that references it.
///
/// At most `concurrency` fetches are in flight. Results are applied in record
/// order, so the output does not depend on completion order.
pub async fn hydrate_images<F>(
    products: &mut [ProductRecord],
    fetcher: &F,
    concurrency: usize,
) -> HydrationStats
where
    F: ImageFetcher + Sync,
{
    let urls: Vec<String> = {
        let mut seen = HashSet::new();
        products
            .iter()
            .filter_map(|p| p.image_url.as_deref())
            .filter(|url| seen.insert(*url))
            .map(str::to_string)
            .collect()
    };
    if urls.is_empty() {
        return HydrationStats::default();
    }

    let results: Vec<(String, Option<String>)> = stream::iter(urls)
        .map(|url| async move {
            match fetcher.fetch_image(&url).await {
                Ok(bytes) => {
                    let payload = STANDARD.encode(bytes);
                    (url, Some(payload))
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "image fetch failed");
                    (url, None)
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut stats = HydrationStats::default();
    let mut payloads: HashMap<String, String> = HashMap::with_capacity(results.len());
    for (url, payload) in results {
        match payload {
            Some(payload) => {
                stats.fetched += 1;
                payloads.insert(url, payload);
            }
            None => stats.failed += 1,
        }
    }

    for product in products.iter_mut() {
        if let Some(payload) = product.image_url.as_ref().and_then(|u| payloads.get(u)) {
            product.image.clone_from(payload);
        }
    }

    tracing::info!(
        fetched = stats.fetched,
        failed = stats.failed,
        "images hydrated"
    );
    stats
}
