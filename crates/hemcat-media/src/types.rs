use serde::{Deserialize, Serialize};

/// One uploaded asset as reported by the media store's listing endpoint.
///
/// Only the two fields the catalogue needs are kept; the store sends many more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaResource {
    /// Folder-qualified name, e.g. `"LineA/Incense/RoseAgarbatti"`.
    pub public_id: String,
    pub secure_url: String,
}

/// One page of the asset listing. `next_cursor` is absent on the last page.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourcesPage {
    #[serde(default)]
    pub resources: Vec<MediaResource>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Metadata of a single raw resource; used to locate backup documents.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawResourceInfo {
    pub secure_url: String,
}

/// Response of an upload call.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResult {
    pub public_id: String,
    #[serde(default)]
    pub secure_url: String,
}
