use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::identity::is_custom_product_id;
use crate::CoreError;

/// Packaging stamped on every spreadsheet row.
pub const DEFAULT_SPREADSHEET_PACKAGING: &str = "Default Packaging";

/// Packaging stamped on custom products at creation time.
pub const DEFAULT_CUSTOM_PACKAGING: &str = "Default";

/// Subcategory used when a custom product is created without one.
pub const DEFAULT_SUBCATEGORY: &str = "N/A";

/// Canonical product fields that overlay overrides may target.
///
/// `ProductID` is intentionally absent: an id is derived, never edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProductField {
    Catalogue,
    Category,
    Subcategory,
    ItemName,
    Fragrance,
    SkuCode,
    IsNew,
    Packaging,
    Image,
}

impl ProductField {
    pub const ALL: [ProductField; 9] = [
        ProductField::Catalogue,
        ProductField::Category,
        ProductField::Subcategory,
        ProductField::ItemName,
        ProductField::Fragrance,
        ProductField::SkuCode,
        ProductField::IsNew,
        ProductField::Packaging,
        ProductField::Image,
    ];

    /// The column / JSON key this field is stored under.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProductField::Catalogue => "Catalogue",
            ProductField::Category => "Category",
            ProductField::Subcategory => "Subcategory",
            ProductField::ItemName => "ItemName",
            ProductField::Fragrance => "Fragrance",
            ProductField::SkuCode => "SKU Code",
            ProductField::IsNew => "IsNew",
            ProductField::Packaging => "Packaging",
            ProductField::Image => "ImageB64",
        }
    }

    /// Looks up a field by its exact column name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl std::fmt::Display for ProductField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| CoreError::UnknownField(s.to_string()))
    }
}

/// One entry of the merged catalogue.
///
/// Built fresh on every refresh, either from a spreadsheet row or from a
/// persisted [`CustomProduct`]. User edits live in the overlay and are applied
/// while the record is being built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "Catalogue")]
    pub catalogue: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Subcategory")]
    pub subcategory: String,
    #[serde(rename = "ItemName")]
    pub item_name: String,
    /// Fragrance or free-form description.
    #[serde(rename = "Fragrance")]
    pub fragrance: String,
    #[serde(rename = "SKU Code")]
    pub sku_code: String,
    /// Serialized as `0`/`1`.
    #[serde(rename = "IsNew", with = "flag")]
    pub is_new: bool,
    #[serde(rename = "Packaging")]
    pub packaging: String,
    /// Base64 image payload, empty when no image is available.
    #[serde(rename = "ImageB64")]
    pub image: String,
    /// Source URL of the image (already transform-rewritten for indexed assets).
    #[serde(rename = "ImageURL", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "ProductID")]
    pub product_id: String,
}

impl ProductRecord {
    /// Returns `true` for products that came from the overlay's custom list.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        is_custom_product_id(&self.product_id)
    }

    #[must_use]
    pub fn has_image(&self) -> bool {
        !self.image.is_empty()
    }

    /// Current value of `field` as text (`IsNew` renders as `0`/`1`).
    #[must_use]
    pub fn field(&self, field: ProductField) -> String {
        match field {
            ProductField::Catalogue => self.catalogue.clone(),
            ProductField::Category => self.category.clone(),
            ProductField::Subcategory => self.subcategory.clone(),
            ProductField::ItemName => self.item_name.clone(),
            ProductField::Fragrance => self.fragrance.clone(),
            ProductField::SkuCode => self.sku_code.clone(),
            ProductField::IsNew => u8::from(self.is_new).to_string(),
            ProductField::Packaging => self.packaging.clone(),
            ProductField::Image => self.image.clone(),
        }
    }

    /// Overwrites one field with an overlay value while the record is built.
    ///
    /// Non-string values are rendered as text; `IsNew` is coerced to a flag.
    pub fn apply_field(&mut self, field: ProductField, value: &Value) {
        let slot = match field {
            ProductField::IsNew => {
                self.is_new = flag_from_value(value);
                return;
            }
            ProductField::Catalogue => &mut self.catalogue,
            ProductField::Category => &mut self.category,
            ProductField::Subcategory => &mut self.subcategory,
            ProductField::ItemName => &mut self.item_name,
            ProductField::Fragrance => &mut self.fragrance,
            ProductField::SkuCode => &mut self.sku_code,
            ProductField::Packaging => &mut self.packaging,
            ProductField::Image => &mut self.image,
        };
        *slot = value_to_text(value);
    }
}

/// A fully user-defined product persisted in the overlay document.
///
/// Every known field is optional on disk (older documents may lack some);
/// unknown keys are kept in `extra` so they survive a load/save cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomProduct {
    #[serde(rename = "ProductID", default, deserialize_with = "lenient_text")]
    pub product_id: String,
    #[serde(rename = "Catalogue", default, deserialize_with = "lenient_text")]
    pub catalogue: String,
    #[serde(rename = "Category", default, deserialize_with = "lenient_text")]
    pub category: String,
    #[serde(rename = "Subcategory", default, deserialize_with = "lenient_text")]
    pub subcategory: String,
    #[serde(rename = "ItemName", default, deserialize_with = "lenient_text")]
    pub item_name: String,
    #[serde(rename = "Fragrance", default, deserialize_with = "lenient_text")]
    pub fragrance: String,
    #[serde(rename = "SKU Code", default, deserialize_with = "lenient_text")]
    pub sku_code: String,
    #[serde(rename = "IsNew", default, with = "flag")]
    pub is_new: bool,
    #[serde(rename = "Packaging", default, deserialize_with = "lenient_text")]
    pub packaging: String,
    /// Either a ready image URL, an already-encoded payload, or empty.
    #[serde(rename = "ImageB64", default, deserialize_with = "lenient_text")]
    pub image: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields read from spreadsheet columns. The rest are stamped during merge.
pub const SHEET_FIELDS: [ProductField; 6] = [
    ProductField::Category,
    ProductField::Subcategory,
    ProductField::ItemName,
    ProductField::Fragrance,
    ProductField::SkuCode,
    ProductField::IsNew,
];

/// Coerces a spreadsheet cell into a flag: numeric values truncate toward
/// zero and are `true` when non-zero; anything non-numeric is `false`.
#[must_use]
pub fn coerce_flag(raw: &str) -> bool {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .is_some_and(|v| v.trunc() != 0.0)
}

/// Coerces an arbitrary JSON value into a flag.
#[must_use]
pub fn flag_from_value(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v.trunc() != 0.0),
        Value::String(s) => coerce_flag(s),
        _ => false,
    }
}

/// Renders a JSON value as a plain cell string; `null` becomes empty.
#[must_use]
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value))
}

mod flag {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(super::flag_from_value(&value))
    }
}
