//! Product identity.
//!
//! Spreadsheet rows carry no id column, so spreadsheet products get a
//! content-derived id that survives reloads. Custom products get a random id
//! under a different prefix so the two id spaces never collide.

use md5::{Digest, Md5};

/// Prefix of ids derived from spreadsheet content.
pub const STABLE_ID_PREFIX: &str = "PID_";

/// Prefix of ids generated for custom (non-spreadsheet) products.
pub const CUSTOM_ID_PREFIX: &str = "CUST_";

const STABLE_ID_HEX_LEN: usize = 12;
const CUSTOM_ID_HEX_LEN: usize = 8;

/// Derives the deterministic id of a spreadsheet product.
///
/// `PID_` followed by the first 12 hex digits of
/// `md5(lowercase(trim("{catalogue}|{category}|{item_name}|{sku_code}")))`.
///
/// An empty `sku_code` still takes part in the hash, so a product with and
/// without a SKU get different ids.
#[must_use]
pub fn stable_product_id(
    catalogue: &str,
    category: &str,
    item_name: &str,
    sku_code: &str,
) -> String {
    let raw = format!("{catalogue}|{category}|{item_name}|{sku_code}");
    let canonical = raw.trim().to_lowercase();
    let digest = format!("{:x}", Md5::digest(canonical.as_bytes()));
    format!("{STABLE_ID_PREFIX}{}", &digest[..STABLE_ID_HEX_LEN])
}

/// Generates a fresh random id for a custom product, e.g. `CUST_1a2b3c4d`.
#[must_use]
pub fn custom_product_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{CUSTOM_ID_PREFIX}{}", &hex[..CUSTOM_ID_HEX_LEN])
}

/// Returns `true` when `product_id` belongs to the custom id space.
#[must_use]
pub fn is_custom_product_id(product_id: &str) -> bool {
    product_id.starts_with(CUSTOM_ID_PREFIX)
}
