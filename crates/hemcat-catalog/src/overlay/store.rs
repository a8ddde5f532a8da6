//! Local persistence of the overlay document with a remote mirror.
//!
//! Every mutating helper reloads the full document, changes one collection and
//! saves the whole document again. Within one process those steps are
//! serialized by an async mutex. Separate processes sharing the same file are
//! not coordinated: the last full-document save wins.

use std::path::{Path, PathBuf};

use hemcat_core::{custom_product_id, CustomProduct, ProductRecord};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::error::CatalogError;
use crate::remote::DocumentBackup;

use super::custom::{find_duplicates, NewCustomProduct};
use super::document::OverlayDocument;

/// Outcome of [`OverlayStore::add_custom_product`].
#[derive(Debug, Clone)]
pub struct CustomProductAdded {
    pub product: CustomProduct,
    /// Ids of existing products with the same catalogue, category and name.
    pub duplicates: Vec<String>,
}

pub struct OverlayStore<B> {
    path: PathBuf,
    backup: B,
    write_lock: Mutex<()>,
}

impl<B: DocumentBackup> OverlayStore<B> {
    pub fn new(path: impl Into<PathBuf>, backup: B) -> Self {
        Self {
            path: path.into(),
            backup,
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn backup(&self) -> &B {
        &self.backup
    }

    /// Loads the document: the local file first, then the remote backup, then
    /// an empty document. Never fails.
    pub async fn load(&self) -> OverlayDocument {
        if let Some(document) = self.load_local().await {
            return document;
        }

        match self.backup.fetch_document().await {
            Ok(Some(value)) => match OverlayDocument::migrate(value) {
                Ok((document, filled)) => {
                    tracing::info!(
                        path = %self.path.display(),
                        filled = ?filled,
                        "overlay restored from remote backup"
                    );
                    if let Err(e) = self.write_local(&document).await {
                        tracing::warn!(error = %e, "failed to write restored overlay locally");
                    }
                    return document;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "remote overlay backup is malformed");
                }
            },
            Ok(None) => {
                tracing::debug!("no remote overlay backup available");
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch remote overlay backup");
            }
        }

        tracing::info!(path = %self.path.display(), "starting with an empty overlay");
        OverlayDocument::empty()
    }

    async fn load_local(&self) -> Option<OverlayDocument> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no local overlay document");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read local overlay");
                return None;
            }
        };

        let parsed = serde_json::from_str::<Value>(&raw)
            .map_err(|e| CatalogError::OverlayParse {
                path: self.path.display().to_string(),
                source: e,
            })
            .and_then(OverlayDocument::migrate);

        match parsed {
            Ok((document, filled)) => {
                if !filled.is_empty() {
                    tracing::info!(filled = ?filled, "migrated overlay document keys");
                }
                Some(document)
            }
            Err(e) => {
                tracing::warn!(error = %e, "local overlay unreadable, falling back");
                None
            }
        }
    }

    /// Stamps `last_updated`, writes the local file, then mirrors to the
    /// remote backup. A mirror failure is logged and does not fail the save.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the document cannot be serialized or the
    /// local file cannot be written.
    pub async fn save(&self, document: &mut OverlayDocument) -> Result<(), CatalogError> {
        document.last_updated =
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        self.write_local(document).await?;

        let value = serde_json::to_value(&*document).map_err(CatalogError::OverlaySerialize)?;
        if let Err(e) = self.backup.store_document(&value).await {
            tracing::warn!(error = %e, "remote overlay mirror failed; local save kept");
        }
        Ok(())
    }

    async fn write_local(&self, document: &OverlayDocument) -> Result<(), CatalogError> {
        let io_err = |source| CatalogError::OverlayIo {
            path: self.path.display().to_string(),
            source,
        };

        let body = serde_json::to_string_pretty(document).map_err(CatalogError::OverlaySerialize)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let tmp = tmp_path(&self.path);
        tokio::fs::write(&tmp, body).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        tracing::debug!(path = %self.path.display(), "overlay written");
        Ok(())
    }

    async fn update<T>(
        &self,
        mutate: impl FnOnce(&mut OverlayDocument) -> T,
    ) -> Result<(OverlayDocument, T), CatalogError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load().await;
        let outcome = mutate(&mut document);
        self.save(&mut document).await?;
        Ok((document, outcome))
    }

    /// # Errors
    ///
    /// Returns [`CatalogError`] when the local save fails.
    pub async fn set_override(
        &self,
        product_id: &str,
        changes: Map<String, Value>,
    ) -> Result<OverlayDocument, CatalogError> {
        let (document, ()) = self
            .update(|doc| doc.set_override(product_id, changes))
            .await?;
        tracing::info!(product_id, "override saved");
        Ok(document)
    }

    /// Returns whether an override was removed.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the local save fails.
    pub async fn clear_override(
        &self,
        product_id: &str,
        field: Option<&str>,
    ) -> Result<bool, CatalogError> {
        let (_, removed) = self
            .update(|doc| doc.clear_override(product_id, field))
            .await?;
        Ok(removed)
    }

    /// # Errors
    ///
    /// Returns [`CatalogError`] when the local save fails.
    pub async fn mark_deleted(&self, product_id: &str) -> Result<bool, CatalogError> {
        let (_, added) = self.update(|doc| doc.mark_deleted(product_id)).await?;
        Ok(added)
    }

    /// # Errors
    ///
    /// Returns [`CatalogError`] when the local save fails.
    pub async fn unmark_deleted(&self, product_id: &str) -> Result<bool, CatalogError> {
        let (_, removed) = self.update(|doc| doc.unmark_deleted(product_id)).await?;
        Ok(removed)
    }

    /// # Errors
    ///
    /// Returns [`CatalogError`] when the local save fails.
    pub async fn add_custom(&self, product: CustomProduct) -> Result<(), CatalogError> {
        self.update(|doc| doc.add_custom(product)).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`CatalogError`] when the local save fails.
    pub async fn remove_custom(&self, product_id: &str) -> Result<bool, CatalogError> {
        let (_, removed) = self.update(|doc| doc.remove_custom(product_id)).await?;
        Ok(removed)
    }

    /// Validates `new`, stores it as a custom product and reports products in
    /// `existing` it appears to duplicate. Duplicates do not block the save.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidCustomProduct`] on invalid input, or the
    /// save error.
    pub async fn add_custom_product(
        &self,
        new: NewCustomProduct,
        existing: &[ProductRecord],
    ) -> Result<CustomProductAdded, CatalogError> {
        let duplicates: Vec<String> = find_duplicates(&new, existing)
            .into_iter()
            .map(|p| p.product_id.clone())
            .collect();
        if !duplicates.is_empty() {
            tracing::warn!(
                item = %new.item_name,
                duplicates = ?duplicates,
                "custom product looks like an existing product"
            );
        }

        let product = new.into_custom_product()?;
        self.add_custom(product.clone()).await?;
        tracing::info!(product_id = %product.product_id, "custom product added");
        Ok(CustomProductAdded {
            product,
            duplicates,
        })
    }

    /// Imports a pre-overlay custom products file when the overlay has none
    /// yet, then renames the file to `<name>.migrated.bak`.
    ///
    /// Returns whether anything was imported.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the legacy file exists but cannot be read
    /// or parsed, or the save fails.
    pub async fn migrate_legacy_custom_items(&self, legacy: &Path) -> Result<bool, CatalogError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load().await;
        if !document.custom_products.is_empty() {
            tracing::debug!("overlay already has custom products, legacy import skipped");
            return Ok(false);
        }

        let raw = match tokio::fs::read_to_string(legacy).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => {
                return Err(CatalogError::OverlayIo {
                    path: legacy.display().to_string(),
                    source: e,
                })
            }
        };
        let mut items: Vec<CustomProduct> =
            serde_json::from_str(&raw).map_err(|e| CatalogError::OverlayParse {
                path: legacy.display().to_string(),
                source: e,
            })?;
        if items.is_empty() {
            return Ok(false);
        }

        for item in &mut items {
            if item.product_id.trim().is_empty() {
                item.product_id = custom_product_id();
            }
        }
        let count = items.len();
        document.custom_products = items;
        self.save(&mut document).await?;

        let backup = legacy_backup_path(legacy);
        tokio::fs::rename(legacy, &backup)
            .await
            .map_err(|e| CatalogError::OverlayIo {
                path: legacy.display().to_string(),
                source: e,
            })?;
        tracing::info!(count, backup = %backup.display(), "legacy custom products migrated");
        Ok(true)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn legacy_backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".migrated.bak");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_paths_append_suffix() {
        let path = Path::new("/data/products_db.json");
        assert_eq!(tmp_path(path), Path::new("/data/products_db.json.tmp"));
        assert_eq!(
            legacy_backup_path(Path::new("custom_products.json")),
            Path::new("custom_products.json.migrated.bak")
        );
    }
}
