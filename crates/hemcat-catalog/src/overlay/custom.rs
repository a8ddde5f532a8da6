use hemcat_core::products::{DEFAULT_CUSTOM_PACKAGING, DEFAULT_SUBCATEGORY};
use hemcat_core::{custom_product_id, CustomProduct, ProductRecord};
use serde_json::Map;

use crate::error::CatalogError;

/// User input for a product that exists only in the overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCustomProduct {
    pub catalogue: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub item_name: String,
    pub fragrance: String,
    pub sku_code: String,
    pub is_new: bool,
    /// A ready image URL; fetched when the catalogue is hydrated.
    pub image_url: Option<String>,
}

impl NewCustomProduct {
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidCustomProduct`] when catalogue, category or
    /// item name is blank, or the image URL is not http(s).
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (label, value) in [
            ("catalogue", &self.catalogue),
            ("category", &self.category),
            ("item name", &self.item_name),
        ] {
            if value.trim().is_empty() {
                return Err(CatalogError::InvalidCustomProduct(format!(
                    "{label} must not be blank"
                )));
            }
        }
        if let Some(url) = self.image_url.as_deref() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CatalogError::InvalidCustomProduct(format!(
                    "image URL must be http(s): {url}"
                )));
            }
        }
        Ok(())
    }

    /// Validates and builds the stored form with a fresh custom id.
    ///
    /// # Errors
    ///
    /// See [`NewCustomProduct::validate`].
    pub fn into_custom_product(self) -> Result<CustomProduct, CatalogError> {
        self.validate()?;
        let subcategory = self
            .subcategory
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SUBCATEGORY.to_string());

        Ok(CustomProduct {
            product_id: custom_product_id(),
            catalogue: self.catalogue.trim().to_string(),
            category: self.category.trim().to_string(),
            subcategory,
            item_name: self.item_name.trim().to_string(),
            fragrance: self.fragrance.trim().to_string(),
            sku_code: self.sku_code.trim().to_string(),
            is_new: self.is_new,
            packaging: DEFAULT_CUSTOM_PACKAGING.to_string(),
            image: self.image_url.unwrap_or_default(),
            extra: Map::new(),
        })
    }
}

/// Products in `existing` with the same catalogue, category and item name as
/// `candidate`, compared case-insensitively after trimming.
#[must_use]
pub fn find_duplicates<'a>(
    candidate: &NewCustomProduct,
    existing: &'a [ProductRecord],
) -> Vec<&'a ProductRecord> {
    let same = |a: &str, b: &str| a.trim().to_lowercase() == b.trim().to_lowercase();
    existing
        .iter()
        .filter(|p| {
            same(&p.catalogue, &candidate.catalogue)
                && same(&p.category, &candidate.category)
                && same(&p.item_name, &candidate.item_name)
        })
        .collect()
}
