//! Name-keyed lookup maps over the media store's flat asset listing.
//!
//! Rebuilt once per refresh. Building performs no matching; see
//! [`crate::resolve`] for that.

use std::collections::HashMap;

use hemcat_core::normalize_key;
use hemcat_media::MediaResource;

/// Lookup structure built from one asset listing.
///
/// - `path_map`: normalized full `public_id` → URL. A later asset with the
///   same key replaces an earlier one.
/// - filename map: normalized last path segment → URL. The first asset with a
///   given key wins; later collisions are ignored. Entries keep insertion
///   order, which is the scan order of the partial-match tier.
#[derive(Debug, Clone, Default)]
pub struct AssetIndex {
    path_map: HashMap<String, String>,
    filename_entries: Vec<(String, String)>,
    filename_positions: HashMap<String, usize>,
}

impl AssetIndex {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Indexes `resources` in listing order.
    #[must_use]
    pub fn build<'a, I>(resources: I) -> Self
    where
        I: IntoIterator<Item = &'a MediaResource>,
    {
        let mut index = Self::default();
        for resource in resources {
            index.insert(&resource.public_id, &resource.secure_url);
        }
        index
    }

    fn insert(&mut self, public_id: &str, url: &str) {
        self.path_map
            .insert(normalize_key(public_id), url.to_owned());

        let filename = public_id.rsplit('/').next().unwrap_or(public_id);
        let file_key = normalize_key(filename);
        if !self.filename_positions.contains_key(&file_key) {
            self.filename_positions
                .insert(file_key.clone(), self.filename_entries.len());
            self.filename_entries.push((file_key, url.to_owned()));
        }
    }

    #[must_use]
    pub fn by_path(&self, key: &str) -> Option<&str> {
        self.path_map.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn by_filename(&self, key: &str) -> Option<&str> {
        self.filename_positions
            .get(key)
            .map(|&i| self.filename_entries[i].1.as_str())
    }

    /// Filename entries in first-seen order, as `(key, url)`.
    pub fn filename_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filename_entries
            .iter()
            .map(|(k, u)| (k.as_str(), u.as_str()))
    }

    #[must_use]
    pub fn path_count(&self) -> usize {
        self.path_map.len()
    }

    #[must_use]
    pub fn filename_count(&self) -> usize {
        self.filename_entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path_map.is_empty()
    }
}
