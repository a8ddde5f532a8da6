use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Account credentials for the remote media store.
#[derive(Clone)]
pub struct MediaCredentials {
    pub cloud_name: String,
    pub api_key: String,
    /// Needed for listing assets and writing backups; reads of public URLs work without it.
    pub api_secret: Option<String>,
}

impl std::fmt::Debug for MediaCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &"[redacted]")
            .field(
                "api_secret",
                &self.api_secret.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub catalogues_path: PathBuf,
    pub overlay_path: PathBuf,
    pub legacy_custom_path: PathBuf,
    /// `None` when no media account is configured; listing and backup are then skipped.
    pub media: Option<MediaCredentials>,
    pub media_api_base: String,
    pub media_request_timeout_secs: u64,
    pub image_timeout_secs: u64,
    pub media_max_retries: u32,
    pub media_retry_backoff_ms: u64,
    pub media_page_size: u32,
    pub media_user_agent: String,
    pub image_transform: String,
    pub image_concurrency: usize,
    pub backup_public_id: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("catalogues_path", &self.catalogues_path)
            .field("overlay_path", &self.overlay_path)
            .field("legacy_custom_path", &self.legacy_custom_path)
            .field("media", &self.media)
            .field("media_api_base", &self.media_api_base)
            .field(
                "media_request_timeout_secs",
                &self.media_request_timeout_secs,
            )
            .field("image_timeout_secs", &self.image_timeout_secs)
            .field("media_max_retries", &self.media_max_retries)
            .field("media_retry_backoff_ms", &self.media_retry_backoff_ms)
            .field("media_page_size", &self.media_page_size)
            .field("media_user_agent", &self.media_user_agent)
            .field("image_transform", &self.image_transform)
            .field("image_concurrency", &self.image_concurrency)
            .field("backup_public_id", &self.backup_public_id)
            .finish()
    }
}
