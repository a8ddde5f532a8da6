//! Cursor loop over the asset listing.

use crate::error::MediaError;
use crate::types::MediaResource;

use super::MediaClient;
use super::MAX_PAGES;

impl MediaClient {
    /// Lists every uploaded image asset, following `next_cursor` until the
    /// store stops returning one.
    ///
    /// All-or-nothing: a failure on any page discards the pages already
    /// fetched. Callers treat a failed listing as an empty index.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::list_resources_page`].
    /// Returns [`MediaError::PaginationLimit`] past [`MAX_PAGES`] pages.
    pub async fn list_all_resources(&self) -> Result<Vec<MediaResource>, MediaError> {
        let mut all_resources: Vec<MediaResource> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(MediaError::PaginationLimit {
                    max_pages: MAX_PAGES,
                });
            }

            let page = self.list_resources_page(cursor.as_deref()).await?;
            all_resources.extend(page.resources);

            cursor = page.next_cursor.filter(|c| !c.is_empty());
            if cursor.is_none() {
                break;
            }
        }

        tracing::info!(count = all_resources.len(), pages = page_count, "fetched media asset listing");
        Ok(all_resources)
    }
}
