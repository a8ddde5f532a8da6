//! Combines spreadsheet rows, the overlay and the asset index into one
//! product list.
//!
//! Merging is synchronous and pure over its inputs: the same sheets, overlay
//! and index always give the same products in the same order. Image bytes are
//! not fetched here; records only carry the resolved `image_url`. See
//! [`crate::hydrate`].

use std::collections::{BTreeMap, HashSet};

use hemcat_core::products::{
    coerce_flag, DEFAULT_CUSTOM_PACKAGING, DEFAULT_SPREADSHEET_PACKAGING, DEFAULT_SUBCATEGORY,
};
use hemcat_core::{stable_product_id, CustomProduct, ProductField, ProductRecord};
use hemcat_media::{optimized_url, DEFAULT_IMAGE_TRANSFORM};
use serde_json::{Map, Value};

use crate::columns::{ColumnMap, SheetLayout};
use crate::error::CatalogError;
use crate::index::AssetIndex;
use crate::overlay::OverlayDocument;
use crate::resolve::{resolve, MatchTier};
use crate::sheet::{RawSheet, SheetReader, SpreadsheetSource};

/// A source that was skipped.
#[derive(Debug)]
pub struct SourceFailure {
    pub catalogue: String,
    pub error: CatalogError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub sources_read: usize,
    pub rows_read: usize,
    pub deleted: usize,
    pub overridden: usize,
    pub custom: usize,
    /// Spreadsheet rows matched per resolver tier.
    pub matched: BTreeMap<MatchTier, usize>,
    /// Spreadsheet rows with no index match that kept an overridden image.
    pub image_overrides: usize,
    /// Spreadsheet rows left without an image.
    pub unmatched: usize,
}

impl MergeStats {
    #[must_use]
    pub fn matched_total(&self) -> usize {
        self.matched.values().sum()
    }
}

#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub products: Vec<ProductRecord>,
    pub failures: Vec<SourceFailure>,
    pub stats: MergeStats,
}

pub struct Merger<R> {
    reader: R,
    columns: ColumnMap,
    image_transform: String,
}

impl<R: SheetReader> Merger<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            columns: ColumnMap::default(),
            image_transform: DEFAULT_IMAGE_TRANSFORM.to_string(),
        }
    }

    #[must_use]
    pub fn with_columns(mut self, columns: ColumnMap) -> Self {
        self.columns = columns;
        self
    }

    #[must_use]
    pub fn with_image_transform(mut self, transform: impl Into<String>) -> Self {
        self.image_transform = transform.into();
        self
    }

    /// Builds the catalogue: every readable source's surviving rows in source
    /// order, followed by the overlay's custom products.
    ///
    /// A source that is missing or unreadable is skipped and reported in
    /// [`MergeOutcome::failures`].
    pub fn merge(
        &self,
        sources: &[SpreadsheetSource],
        overlay: &OverlayDocument,
        index: &AssetIndex,
    ) -> MergeOutcome {
        let deleted = overlay.deleted_set();
        let mut outcome = MergeOutcome::default();

        for source in sources {
            let sheet = match self.reader.read_sheet(source) {
                Ok(sheet) => sheet,
                Err(error) => {
                    tracing::warn!(
                        catalogue = %source.catalogue,
                        error = %error,
                        "skipping catalogue source"
                    );
                    outcome.failures.push(SourceFailure {
                        catalogue: source.catalogue.clone(),
                        error,
                    });
                    continue;
                }
            };
            outcome.stats.sources_read += 1;
            self.merge_sheet(source, &sheet, overlay, &deleted, index, &mut outcome);
        }

        for custom in &overlay.custom_products {
            outcome
                .products
                .push(custom_record(custom));
            outcome.stats.custom += 1;
        }

        tracing::info!(
            products = outcome.products.len(),
            failed_sources = outcome.failures.len(),
            matched = outcome.stats.matched_total(),
            unmatched = outcome.stats.unmatched,
            "catalogue merged"
        );
        outcome
    }

    fn merge_sheet(
        &self,
        source: &SpreadsheetSource,
        sheet: &RawSheet,
        overlay: &OverlayDocument,
        deleted: &HashSet<&str>,
        index: &AssetIndex,
        outcome: &mut MergeOutcome,
    ) {
        let layout = self.columns.layout(&sheet.headers);
        if !layout.has(ProductField::ItemName) {
            tracing::warn!(catalogue = %source.catalogue, "sheet has no item name column");
        }

        for row in &sheet.rows {
            outcome.stats.rows_read += 1;
            let mut record = row_record(&source.catalogue, &layout, row);

            if deleted.contains(record.product_id.as_str()) {
                outcome.stats.deleted += 1;
                continue;
            }

            let mut image_overridden = false;
            if let Some(patch) = overlay.overrides_for(&record.product_id) {
                image_overridden = apply_overrides(&mut record, patch);
                outcome.stats.overridden += 1;
            }

            // An index hit replaces any overridden image.
            if let Some(found) = resolve(&record, index) {
                tracing::debug!(
                    product_id = %record.product_id,
                    tier = ?found.tier,
                    "image matched"
                );
                record.image.clear();
                record.image_url = Some(optimized_url(&found.url, &self.image_transform));
                *outcome.stats.matched.entry(found.tier).or_default() += 1;
            } else if image_overridden && !record.image.trim().is_empty() {
                take_image_url(&mut record);
                outcome.stats.image_overrides += 1;
            } else {
                outcome.stats.unmatched += 1;
            }

            outcome.products.push(record);
        }
    }
}

fn row_record(catalogue: &str, layout: &SheetLayout, row: &[String]) -> ProductRecord {
    let text = |field| layout.cell(row, field).to_string();
    let category = text(ProductField::Category);
    let item_name = text(ProductField::ItemName);
    let sku_code = text(ProductField::SkuCode);
    let product_id = stable_product_id(catalogue, &category, &item_name, &sku_code);

    ProductRecord {
        catalogue: catalogue.to_string(),
        category,
        subcategory: text(ProductField::Subcategory),
        item_name,
        fragrance: text(ProductField::Fragrance),
        sku_code,
        is_new: coerce_flag(layout.cell(row, ProductField::IsNew)),
        packaging: DEFAULT_SPREADSHEET_PACKAGING.to_string(),
        image: String::new(),
        image_url: None,
        product_id,
    }
}

/// Applies a sparse patch. Returns whether the patch set the image.
fn apply_overrides(record: &mut ProductRecord, patch: &Map<String, Value>) -> bool {
    let mut image_set = false;
    for (key, value) in patch {
        match ProductField::from_name(key) {
            Some(field) => {
                record.apply_field(field, value);
                image_set |= field == ProductField::Image;
            }
            None => {
                tracing::debug!(
                    product_id = %record.product_id,
                    field = %key,
                    "ignoring override for unknown field"
                );
            }
        }
    }
    image_set
}

/// Moves an image URL stored in the payload slot into `image_url`, unchanged.
fn take_image_url(record: &mut ProductRecord) {
    if record.image.starts_with("http://") || record.image.starts_with("https://") {
        record.image_url = Some(std::mem::take(&mut record.image));
    }
}

fn or_default(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

fn custom_record(custom: &CustomProduct) -> ProductRecord {
    let mut record = ProductRecord {
        catalogue: custom.catalogue.clone(),
        category: custom.category.clone(),
        subcategory: or_default(&custom.subcategory, DEFAULT_SUBCATEGORY),
        item_name: custom.item_name.clone(),
        fragrance: custom.fragrance.clone(),
        sku_code: custom.sku_code.clone(),
        is_new: custom.is_new,
        packaging: or_default(&custom.packaging, DEFAULT_CUSTOM_PACKAGING),
        image: custom.image.clone(),
        image_url: None,
        product_id: custom.product_id.clone(),
    };
    take_image_url(&mut record);
    record
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use hemcat_media::MediaResource;
    use serde_json::json;

    use super::*;

    struct StaticSheets(HashMap<String, RawSheet>);

    impl SheetReader for StaticSheets {
        fn read_sheet(&self, source: &SpreadsheetSource) -> Result<RawSheet, CatalogError> {
            self.0
                .get(&source.catalogue)
                .cloned()
                .ok_or_else(|| CatalogError::SourceMissing {
                    catalogue: source.catalogue.clone(),
                    path: source.path.display().to_string(),
                })
        }
    }

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| (*s).to_string()).collect()
    }

    fn incense_sheet() -> RawSheet {
        RawSheet {
            headers: strings(&["Category", "Item Name", "Description", "SKU Code", "New Product ( Indication )"]),
            rows: vec![
                strings(&["Incense", "Rose Agarbatti", "Rose", "", "1"]),
                strings(&["Incense", "Sandal Agarbatti", "Sandal", "SA-02", "no"]),
            ],
        }
    }

    fn merger() -> Merger<StaticSheets> {
        let mut sheets = HashMap::new();
        sheets.insert("Line A".to_string(), incense_sheet());
        Merger::new(StaticSheets(sheets))
    }

    fn sources() -> Vec<SpreadsheetSource> {
        vec![SpreadsheetSource::new("Line A", "a.xlsx")]
    }

    #[test]
    fn rows_get_stamped_fields_and_stable_ids() {
        let outcome = merger().merge(&sources(), &OverlayDocument::empty(), &AssetIndex::empty());
        let rose = &outcome.products[0];
        assert_eq!(rose.product_id, "PID_bfa1be1bbd8b");
        assert_eq!(rose.catalogue, "Line A");
        assert_eq!(rose.packaging, DEFAULT_SPREADSHEET_PACKAGING);
        assert_eq!(rose.fragrance, "Rose");
        assert!(rose.is_new);
        assert!(!outcome.products[1].is_new);
        assert_eq!(outcome.stats.unmatched, 2);
    }

    fn image_patch(value: &str) -> Map<String, Value> {
        json!({ "ImageB64": value }).as_object().cloned().unwrap()
    }

    #[test]
    fn index_match_replaces_overridden_image() {
        let mut overlay = OverlayDocument::empty();
        overlay.set_override(
            "PID_bfa1be1bbd8b",
            image_patch("https://res.cloudinary.com/x/image/upload/v1/rose.jpg"),
        );
        let index = AssetIndex::build(&[MediaResource {
            public_id: "LineA/Incense/RoseAgarbatti".to_string(),
            secure_url: "https://res.cloudinary.com/x/image/upload/v1/indexed.jpg".to_string(),
        }]);
        let outcome = merger().merge(&sources(), &overlay, &index);
        let rose = &outcome.products[0];
        assert_eq!(rose.image, "");
        assert_eq!(
            rose.image_url.as_deref(),
            Some("https://res.cloudinary.com/x/image/upload/w_800,q_auto/v1/indexed.jpg")
        );
        assert_eq!(outcome.stats.matched[&MatchTier::ExactPath], 1);
        assert_eq!(outcome.stats.image_overrides, 0);
    }

    #[test]
    fn overridden_image_survives_an_index_miss() {
        let mut overlay = OverlayDocument::empty();
        overlay.set_override(
            "PID_bfa1be1bbd8b",
            image_patch("https://res.cloudinary.com/x/image/upload/v1/rose.jpg"),
        );
        overlay.set_override("PID_2aa4272e5eda", image_patch("aGVsbG8="));
        let outcome = merger().merge(&sources(), &overlay, &AssetIndex::empty());
        let rose = &outcome.products[0];
        assert_eq!(rose.image, "");
        assert_eq!(
            rose.image_url.as_deref(),
            Some("https://res.cloudinary.com/x/image/upload/v1/rose.jpg")
        );
        let sandal = &outcome.products[1];
        assert_eq!(sandal.image, "aGVsbG8=");
        assert!(sandal.image_url.is_none());
        assert_eq!(outcome.stats.image_overrides, 2);
        assert_eq!(outcome.stats.unmatched, 0);
    }

    #[test]
    fn unknown_override_keys_are_ignored() {
        let mut overlay = OverlayDocument::empty();
        overlay.set_override(
            "PID_bfa1be1bbd8b",
            json!({"ProductID": "PID_hijacked", "Price": 10})
                .as_object()
                .cloned()
                .unwrap(),
        );
        let outcome = merger().merge(&sources(), &overlay, &AssetIndex::empty());
        assert_eq!(outcome.products[0].product_id, "PID_bfa1be1bbd8b");
    }

    #[test]
    fn custom_products_get_defaults_and_url_split() {
        let mut overlay = OverlayDocument::empty();
        overlay.add_custom(CustomProduct {
            product_id: "CUST_0a1b2c3d".to_string(),
            catalogue: "Line A".to_string(),
            item_name: "Lavender Hexa".to_string(),
            image: "https://res.cloudinary.com/x/image/upload/v1/lav.jpg".to_string(),
            ..CustomProduct::default()
        });
        overlay.add_custom(CustomProduct {
            product_id: "CUST_11112222".to_string(),
            image: "aGVsbG8=".to_string(),
            ..CustomProduct::default()
        });
        let outcome = merger().merge(&sources(), &overlay, &AssetIndex::empty());
        assert_eq!(outcome.products.len(), 4);
        let lavender = &outcome.products[2];
        assert_eq!(lavender.subcategory, DEFAULT_SUBCATEGORY);
        assert_eq!(lavender.packaging, DEFAULT_CUSTOM_PACKAGING);
        assert_eq!(lavender.image, "");
        assert_eq!(
            lavender.image_url.as_deref(),
            Some("https://res.cloudinary.com/x/image/upload/v1/lav.jpg")
        );
        assert_eq!(outcome.products[3].image, "aGVsbG8=");
        assert_eq!(outcome.stats.custom, 2);
    }

    #[test]
    fn missing_source_is_reported_not_fatal() {
        let sources = vec![
            SpreadsheetSource::new("Gone", "gone.xlsx"),
            SpreadsheetSource::new("Line A", "a.xlsx"),
        ];
        let outcome = merger().merge(&sources, &OverlayDocument::empty(), &AssetIndex::empty());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].catalogue, "Gone");
        assert_eq!(outcome.products.len(), 2);
        assert_eq!(outcome.stats.sources_read, 1);
    }
}
