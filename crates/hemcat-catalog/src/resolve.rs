//! Tiered image resolution.
//!
//! Each tier is a matcher returning an optional hit; [`resolve`] runs them in
//! priority order and stops at the first success.
//!
//! The partial tier scans filename entries in index order and takes the first
//! acceptable candidate, not the longest or closest one. An empty item key is
//! a prefix of every asset key, so it takes the first entry long enough.

use hemcat_core::{normalize_key, ProductRecord};

use crate::index::AssetIndex;

/// Minimum asset key length considered by the partial tier.
const MIN_PARTIAL_KEY_LEN: usize = 4;

/// Which tier produced an image match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchTier {
    /// `path_map[catalogue + category + item]`.
    ExactPath,
    /// `path_map[category + item]`.
    CategoryPath,
    /// `filename_map[item]`.
    ExactFilename,
    /// The item key starts with an asset filename key.
    PartialItemStartsWithFile,
    /// An asset filename key starts with the item key.
    PartialFileStartsWithItem,
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MatchTier::ExactPath => "exact path",
            MatchTier::CategoryPath => "category path",
            MatchTier::ExactFilename => "exact filename",
            MatchTier::PartialItemStartsWithFile => "partial (item starts with file)",
            MatchTier::PartialFileStartsWithItem => "partial (file starts with item)",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMatch {
    pub url: String,
    pub tier: MatchTier,
}

/// Normalized keys of the three product fields that take part in matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductKeys {
    pub catalogue: String,
    pub category: String,
    pub item: String,
}

impl ProductKeys {
    #[must_use]
    pub fn new(catalogue: &str, category: &str, item_name: &str) -> Self {
        Self {
            catalogue: normalize_key(catalogue),
            category: normalize_key(category),
            item: normalize_key(item_name),
        }
    }

    #[must_use]
    pub fn of(product: &ProductRecord) -> Self {
        Self::new(&product.catalogue, &product.category, &product.item_name)
    }
}

type Matcher = fn(&ProductKeys, &AssetIndex) -> Option<ImageMatch>;

/// Tiers in priority order.
const MATCHERS: [Matcher; 4] = [
    match_exact_path,
    match_category_path,
    match_exact_filename,
    match_partial,
];

/// Finds the best-effort image for `product`, or `None` when no tier matches.
#[must_use]
pub fn resolve(product: &ProductRecord, index: &AssetIndex) -> Option<ImageMatch> {
    resolve_keys(&ProductKeys::of(product), index)
}

#[must_use]
pub fn resolve_keys(keys: &ProductKeys, index: &AssetIndex) -> Option<ImageMatch> {
    MATCHERS.iter().find_map(|matcher| matcher(keys, index))
}

fn hit(url: &str, tier: MatchTier) -> ImageMatch {
    ImageMatch {
        url: url.to_owned(),
        tier,
    }
}

fn match_exact_path(keys: &ProductKeys, index: &AssetIndex) -> Option<ImageMatch> {
    let key = format!("{}{}{}", keys.catalogue, keys.category, keys.item);
    index.by_path(&key).map(|url| hit(url, MatchTier::ExactPath))
}

fn match_category_path(keys: &ProductKeys, index: &AssetIndex) -> Option<ImageMatch> {
    let key = format!("{}{}", keys.category, keys.item);
    index
        .by_path(&key)
        .map(|url| hit(url, MatchTier::CategoryPath))
}

fn match_exact_filename(keys: &ProductKeys, index: &AssetIndex) -> Option<ImageMatch> {
    index
        .by_filename(&keys.item)
        .map(|url| hit(url, MatchTier::ExactFilename))
}

fn match_partial(keys: &ProductKeys, index: &AssetIndex) -> Option<ImageMatch> {
    index.filename_entries().find_map(|(asset_key, url)| {
        if asset_key.chars().count() < MIN_PARTIAL_KEY_LEN {
            None
        } else if keys.item.starts_with(asset_key) {
            Some(hit(url, MatchTier::PartialItemStartsWithFile))
        } else if asset_key.starts_with(keys.item.as_str()) {
            Some(hit(url, MatchTier::PartialFileStartsWithItem))
        } else {
            None
        }
    })
}
