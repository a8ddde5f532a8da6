//! Delivery-URL rewriting.
//!
//! The media store applies transformations encoded as a path segment right
//! after `/upload/`, e.g. `.../image/upload/w_800,q_auto/v17/a.jpg`.

const UPLOAD_SEGMENT: &str = "/upload/";

/// Resize to 800px wide with automatic quality.
pub const DEFAULT_IMAGE_TRANSFORM: &str = "w_800,q_auto";

/// Inserts `transform` after the first `/upload/` segment of `url`.
///
/// URLs without an `/upload/` segment, and empty transforms, are returned
/// unchanged.
#[must_use]
pub fn optimized_url(url: &str, transform: &str) -> String {
    let transform = transform.trim_matches('/');
    if transform.is_empty() {
        return url.to_owned();
    }
    url.replacen(UPLOAD_SEGMENT, &format!("{UPLOAD_SEGMENT}{transform}/"), 1)
}
