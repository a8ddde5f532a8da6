//! The overlay: user overrides, soft deletions and custom products.

mod custom;
mod document;
mod store;

pub use custom::{find_duplicates, NewCustomProduct};
pub use document::{OverlayDocument, ProductStatus, OVERLAY_VERSION, TOP_LEVEL_KEYS};
pub use store::{CustomProductAdded, OverlayStore};
