use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("spreadsheet for catalogue '{catalogue}' not found at {path}")]
    SourceMissing { catalogue: String, path: String },

    #[error("failed to read spreadsheet {path}: {reason}")]
    SheetRead { path: String, reason: String },

    #[error("overlay I/O error at {path}: {source}")]
    OverlayIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("overlay document at {path} is not valid JSON: {source}")]
    OverlayParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("overlay document is malformed: {0}")]
    OverlayShape(String),

    #[error("overlay serialization error: {0}")]
    OverlaySerialize(#[source] serde_json::Error),

    #[error("invalid custom product: {0}")]
    InvalidCustomProduct(String),
}
