//! Seams to the remote collaborators: the asset listing, image bytes, and the
//! overlay backup. [`MediaClient`] implements all three; tests use fakes.

use std::future::Future;
use std::sync::Arc;

use hemcat_media::{MediaClient, MediaError, MediaResource};
use serde_json::Value;

/// Lists every uploaded asset.
pub trait AssetSource {
    fn list_assets(&self) -> impl Future<Output = Result<Vec<MediaResource>, MediaError>> + Send;
}

/// Downloads image bytes from a URL.
pub trait ImageFetcher {
    fn fetch_image(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, MediaError>> + Send;
}

/// Fallback copy of the overlay document. Never the primary store.
pub trait DocumentBackup {
    /// `Ok(None)` when no backup exists yet.
    fn fetch_document(&self) -> impl Future<Output = Result<Option<Value>, MediaError>> + Send;

    fn store_document(&self, document: &Value)
        -> impl Future<Output = Result<(), MediaError>> + Send;
}

impl AssetSource for MediaClient {
    async fn list_assets(&self) -> Result<Vec<MediaResource>, MediaError> {
        self.list_all_resources().await
    }
}

impl ImageFetcher for MediaClient {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, MediaError> {
        self.fetch_bytes(url).await
    }
}

/// Overlay backup stored as a raw document in the media store.
pub struct MediaBackup {
    client: Arc<MediaClient>,
    public_id: String,
}

impl MediaBackup {
    #[must_use]
    pub fn new(client: Arc<MediaClient>, public_id: impl Into<String>) -> Self {
        Self {
            client,
            public_id: public_id.into(),
        }
    }
}

impl DocumentBackup for MediaBackup {
    async fn fetch_document(&self) -> Result<Option<Value>, MediaError> {
        if !self.client.has_admin_access() {
            tracing::debug!("media credentials incomplete, skipping backup fetch");
            return Ok(None);
        }
        self.client.fetch_raw_document(&self.public_id).await
    }

    async fn store_document(&self, document: &Value) -> Result<(), MediaError> {
        if !self.client.has_admin_access() {
            tracing::debug!("media credentials incomplete, skipping backup mirror");
            return Ok(());
        }
        let uploaded = self
            .client
            .store_raw_document(&self.public_id, document)
            .await?;
        tracing::info!(public_id = %uploaded.public_id, "overlay backed up to media store");
        Ok(())
    }
}

/// Backup that holds nothing and accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBackup;

impl DocumentBackup for NoBackup {
    async fn fetch_document(&self) -> Result<Option<Value>, MediaError> {
        Ok(None)
    }

    async fn store_document(&self, _document: &Value) -> Result<(), MediaError> {
        Ok(())
    }
}
