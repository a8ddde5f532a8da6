//! One full refresh: list assets, index them, merge, hydrate images.

use std::sync::Arc;

use hemcat_core::{AppConfig, CataloguesFile, ProductRecord};
use hemcat_media::DEFAULT_IMAGE_TRANSFORM;

use crate::columns::ColumnMap;
use crate::hydrate::{hydrate_images, HydrationStats};
use crate::index::AssetIndex;
use crate::merge::{MergeStats, Merger, SourceFailure};
use crate::overlay::OverlayDocument;
use crate::remote::{AssetSource, ImageFetcher};
use crate::sheet::{SheetReader, SpreadsheetSource, WorkbookReader};

const DEFAULT_IMAGE_CONCURRENCY: usize = 4;

/// The result of one refresh, handed to consumers as a finished artifact.
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    pub products: Vec<ProductRecord>,
    /// The overlay the products were merged against.
    pub overlay: OverlayDocument,
    pub failures: Vec<SourceFailure>,
    pub stats: MergeStats,
    pub asset_count: usize,
    pub hydration: HydrationStats,
}

impl CatalogSnapshot {
    #[must_use]
    pub fn product(&self, product_id: &str) -> Option<&ProductRecord> {
        self.products.iter().find(|p| p.product_id == product_id)
    }
}

pub struct CatalogPipeline<M, R = WorkbookReader> {
    media: Arc<M>,
    merger: Merger<R>,
    sources: Vec<SpreadsheetSource>,
    image_concurrency: usize,
    fetch_images: bool,
}

impl<M> CatalogPipeline<M, WorkbookReader>
where
    M: AssetSource + ImageFetcher + Send + Sync,
{
    /// Builds a pipeline reading workbooks from disk, configured from the
    /// catalogue list and environment settings.
    ///
    /// # Errors
    ///
    /// Returns [`hemcat_core::ConfigError`] when a column alias is invalid.
    pub fn from_config(
        media: Arc<M>,
        catalogues: &CataloguesFile,
        config: &AppConfig,
    ) -> Result<Self, hemcat_core::ConfigError> {
        let columns = ColumnMap::new(catalogues.column_aliases()?);
        let sources = catalogues
            .catalogues
            .iter()
            .map(SpreadsheetSource::from)
            .collect();
        Ok(Self::new(media, WorkbookReader, sources)
            .with_columns(columns)
            .with_image_transform(config.image_transform.clone())
            .with_image_concurrency(config.image_concurrency))
    }
}

impl<M, R> CatalogPipeline<M, R>
where
    M: AssetSource + ImageFetcher + Send + Sync,
    R: SheetReader,
{
    pub fn new(media: Arc<M>, reader: R, sources: Vec<SpreadsheetSource>) -> Self {
        Self {
            media,
            merger: Merger::new(reader).with_image_transform(DEFAULT_IMAGE_TRANSFORM),
            sources,
            image_concurrency: DEFAULT_IMAGE_CONCURRENCY,
            fetch_images: true,
        }
    }

    #[must_use]
    pub fn with_columns(mut self, columns: ColumnMap) -> Self {
        self.merger = self.merger.with_columns(columns);
        self
    }

    #[must_use]
    pub fn with_image_transform(mut self, transform: impl Into<String>) -> Self {
        self.merger = self.merger.with_image_transform(transform);
        self
    }

    #[must_use]
    pub fn with_image_concurrency(mut self, concurrency: usize) -> Self {
        self.image_concurrency = concurrency.max(1);
        self
    }

    /// Leaves `image` empty and only resolves `image_url`.
    #[must_use]
    pub fn without_images(mut self) -> Self {
        self.fetch_images = false;
        self
    }

    #[must_use]
    pub fn sources(&self) -> &[SpreadsheetSource] {
        &self.sources
    }

    /// Lists and indexes the remote assets. A listing failure yields an empty
    /// index, so every product resolves to no image.
    pub async fn build_index(&self) -> AssetIndex {
        match self.media.list_assets().await {
            Ok(resources) => {
                let index = AssetIndex::build(&resources);
                tracing::info!(
                    assets = resources.len(),
                    paths = index.path_count(),
                    filenames = index.filename_count(),
                    "asset index built"
                );
                index
            }
            Err(e) => {
                tracing::warn!(error = %e, "asset listing failed, continuing without images");
                AssetIndex::empty()
            }
        }
    }

    /// Runs a full refresh against `overlay`. Never fails; degraded inputs are
    /// logged and reported on the snapshot.
    pub async fn refresh(&self, overlay: OverlayDocument) -> CatalogSnapshot {
        let index = self.build_index().await;
        let outcome = self.merger.merge(&self.sources, &overlay, &index);

        let mut products = outcome.products;
        let hydration = if self.fetch_images {
            hydrate_images(&mut products, self.media.as_ref(), self.image_concurrency).await
        } else {
            HydrationStats::default()
        };

        CatalogSnapshot {
            products,
            overlay,
            failures: outcome.failures,
            stats: outcome.stats,
            asset_count: index.path_count(),
            hydration,
        }
    }
}
