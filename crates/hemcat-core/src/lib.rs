pub mod app_config;
pub mod catalogues;
pub mod config;
pub mod identity;
pub mod normalize;
pub mod products;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, MediaCredentials};
pub use catalogues::{load_catalogues, CatalogueConfig, CataloguesFile};
pub use config::{load_app_config, load_app_config_from_env};
pub use identity::{custom_product_id, is_custom_product_id, stable_product_id};
pub use normalize::{normalize_key, normalize_optional_key};
pub use products::{CustomProduct, ProductField, ProductRecord};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown product field: {0}")]
    UnknownField(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalogues file {path}: {source}")]
    CataloguesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalogues file: {0}")]
    CataloguesFileParse(#[from] serde_yaml::Error),

    #[error("catalogues validation failed: {0}")]
    Validation(String),
}
