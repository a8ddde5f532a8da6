use std::collections::{BTreeMap, HashSet};

use hemcat_core::products::value_to_text;
use hemcat_core::{is_custom_product_id, CustomProduct};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::CatalogError;

/// Schema version written into fresh documents.
pub const OVERLAY_VERSION: i64 = 1;

/// Top-level keys every document carries, in the order they are written.
pub const TOP_LEVEL_KEYS: [&str; 6] = [
    "version",
    "last_updated",
    "product_overrides",
    "deleted_products",
    "custom_products",
    "saved_cart",
];

/// The persisted layer of user edits applied on top of spreadsheet rows.
///
/// Keys this type does not know about are kept in `extra` and written back
/// unchanged on save. The scalar keys are read leniently: an off-type
/// `version` or `last_updated` is coerced or defaulted rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayDocument {
    #[serde(deserialize_with = "lenient_version")]
    pub version: i64,
    #[serde(deserialize_with = "lenient_text")]
    pub last_updated: String,
    /// Sparse per-product patches: product id → field name → value.
    pub product_overrides: BTreeMap<String, Map<String, Value>>,
    /// Soft-deleted spreadsheet product ids, without duplicates.
    pub deleted_products: Vec<String>,
    pub custom_products: Vec<CustomProduct>,
    /// Carried opaquely.
    pub saved_cart: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for OverlayDocument {
    fn default() -> Self {
        Self {
            version: OVERLAY_VERSION,
            last_updated: String::new(),
            product_overrides: BTreeMap::new(),
            deleted_products: Vec::new(),
            custom_products: Vec::new(),
            saved_cart: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// How a product id relates to the overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProductStatus {
    pub edited: bool,
    pub custom: bool,
    pub deleted: bool,
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut labels = Vec::new();
        if self.custom {
            labels.push("custom");
        }
        if self.edited {
            labels.push("edited");
        }
        if self.deleted {
            labels.push("deleted");
        }
        if labels.is_empty() {
            f.write_str("unchanged")
        } else {
            f.write_str(&labels.join(", "))
        }
    }
}

impl OverlayDocument {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a stored document, filling any missing or `null` top-level key
    /// with its empty default first.
    ///
    /// Returns the document and the keys that had to be filled in.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::OverlayShape`] when `value` is not an object or a
    /// known key holds the wrong type.
    pub fn migrate(value: Value) -> Result<(Self, Vec<&'static str>), CatalogError> {
        let Value::Object(mut object) = value else {
            return Err(CatalogError::OverlayShape(
                "top-level value is not an object".to_string(),
            ));
        };

        let mut filled = Vec::new();
        for key in TOP_LEVEL_KEYS {
            if object.get(key).is_none_or(Value::is_null) {
                object.insert(key.to_string(), default_for(key));
                filled.push(key);
            }
        }

        let document = serde_json::from_value(Value::Object(object))
            .map_err(|e| CatalogError::OverlayShape(e.to_string()))?;
        Ok((document, filled))
    }

    /// Merges `changes` into the product's patch; repeated keys are replaced,
    /// never appended.
    pub fn set_override(&mut self, product_id: &str, changes: Map<String, Value>) {
        self.product_overrides
            .entry(product_id.to_string())
            .or_default()
            .extend(changes);
    }

    /// Removes one overridden field, or the whole patch when `field` is
    /// `None`. An entry left empty is dropped. Returns whether anything changed.
    pub fn clear_override(&mut self, product_id: &str, field: Option<&str>) -> bool {
        let Some(field) = field else {
            return self.product_overrides.remove(product_id).is_some();
        };
        let Some(patch) = self.product_overrides.get_mut(product_id) else {
            return false;
        };
        let removed = patch.remove(field).is_some();
        if patch.is_empty() {
            self.product_overrides.remove(product_id);
        }
        removed
    }

    /// Returns `false` when the id was already deleted.
    pub fn mark_deleted(&mut self, product_id: &str) -> bool {
        if self.is_deleted(product_id) {
            return false;
        }
        self.deleted_products.push(product_id.to_string());
        true
    }

    pub fn unmark_deleted(&mut self, product_id: &str) -> bool {
        let before = self.deleted_products.len();
        self.deleted_products.retain(|id| id != product_id);
        self.deleted_products.len() != before
    }

    pub fn add_custom(&mut self, product: CustomProduct) {
        self.custom_products.push(product);
    }

    pub fn remove_custom(&mut self, product_id: &str) -> bool {
        let before = self.custom_products.len();
        self.custom_products.retain(|p| p.product_id != product_id);
        self.custom_products.len() != before
    }

    #[must_use]
    pub fn is_deleted(&self, product_id: &str) -> bool {
        self.deleted_products.iter().any(|id| id == product_id)
    }

    #[must_use]
    pub fn deleted_set(&self) -> HashSet<&str> {
        self.deleted_products.iter().map(String::as_str).collect()
    }

    #[must_use]
    pub fn overrides_for(&self, product_id: &str) -> Option<&Map<String, Value>> {
        self.product_overrides.get(product_id)
    }

    #[must_use]
    pub fn status(&self, product_id: &str) -> ProductStatus {
        ProductStatus {
            edited: self.product_overrides.contains_key(product_id),
            custom: is_custom_product_id(product_id),
            deleted: self.is_deleted(product_id),
        }
    }
}

fn lenient_version<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let version = match &value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(version.unwrap_or(OVERLAY_VERSION))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value))
}

fn default_for(key: &str) -> Value {
    match key {
        "version" => Value::from(OVERLAY_VERSION),
        "last_updated" => Value::String(String::new()),
        "product_overrides" => Value::Object(Map::new()),
        _ => Value::Array(Vec::new()),
    }
}
