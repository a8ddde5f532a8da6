//! Shared handles built once per CLI invocation.

use std::sync::Arc;

use anyhow::Context as _;
use hemcat_catalog::{
    AssetIndex, CatalogPipeline, ColumnMap, MediaBackup, Merger, OverlayDocument, OverlayStore,
    SpreadsheetSource, WorkbookReader,
};
use hemcat_core::{AppConfig, CataloguesFile, ProductRecord};
use hemcat_media::MediaClient;

pub(crate) struct AppContext {
    pub(crate) config: AppConfig,
    pub(crate) media: Arc<MediaClient>,
    pub(crate) store: OverlayStore<MediaBackup>,
}

impl AppContext {
    pub(crate) fn new(config: AppConfig) -> anyhow::Result<Self> {
        match &config.media {
            None => tracing::warn!(
                "CLOUDINARY_CLOUD_NAME / CLOUDINARY_API_KEY not set; running without media assets or backup"
            ),
            Some(credentials) if credentials.api_secret.is_none() => tracing::warn!(
                "CLOUDINARY_API_SECRET not set; asset listing and overlay backup are disabled"
            ),
            Some(_) => {}
        }

        let media = Arc::new(
            MediaClient::from_config(&config).context("failed to build media client")?,
        );
        let store = OverlayStore::new(
            config.overlay_path.clone(),
            MediaBackup::new(Arc::clone(&media), config.backup_public_id.clone()),
        );
        Ok(Self {
            config,
            media,
            store,
        })
    }

    pub(crate) fn catalogues(&self) -> anyhow::Result<CataloguesFile> {
        let path = &self.config.catalogues_path;
        hemcat_core::load_catalogues(path)
            .with_context(|| format!("failed to load catalogues from {}", path.display()))
    }

    pub(crate) fn pipeline(&self, skip_images: bool) -> anyhow::Result<CatalogPipeline<MediaClient>> {
        let pipeline =
            CatalogPipeline::from_config(Arc::clone(&self.media), &self.catalogues()?, &self.config)?;
        Ok(if skip_images {
            pipeline.without_images()
        } else {
            pipeline
        })
    }

    /// Merges local sources only: no asset listing and no image downloads.
    pub(crate) fn local_products(&self, overlay: &OverlayDocument) -> anyhow::Result<Vec<ProductRecord>> {
        let catalogues = self.catalogues()?;
        let sources: Vec<SpreadsheetSource> = catalogues
            .catalogues
            .iter()
            .map(SpreadsheetSource::from)
            .collect();
        let merger = Merger::new(WorkbookReader)
            .with_columns(ColumnMap::new(catalogues.column_aliases()?))
            .with_image_transform(self.config.image_transform.clone());
        Ok(merger
            .merge(&sources, overlay, &AssetIndex::empty())
            .products)
    }
}
