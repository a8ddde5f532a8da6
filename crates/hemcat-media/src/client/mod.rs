//! HTTP client for the remote media store.
//!
//! Speaks the Cloudinary Admin and Upload API shapes: a paginated asset
//! listing, raw-document storage used for overlay backups, and plain GETs of
//! delivery URLs for image bytes. The client only reads images; it never
//! uploads or deletes them.

mod backup;
mod fetch_all;
mod images;
mod sign;

use std::time::Duration;

use hemcat_core::{AppConfig, MediaCredentials};
use reqwest::{Client, RequestBuilder, Response};

use crate::error::MediaError;
use crate::retry::retry_with_backoff;
use crate::types::ResourcesPage;

pub use sign::sign_params;

/// Maximum number of listing pages before giving up.
/// Guards against a store that keeps returning the same cursor.
pub(super) const MAX_PAGES: usize = 400;

/// Tunables for [`MediaClient`]; defaults match the application config defaults.
#[derive(Debug, Clone)]
pub struct MediaClientOptions {
    pub api_base: String,
    pub request_timeout_secs: u64,
    pub image_timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure on retriable errors.
    pub max_retries: u32,
    /// Base delay for exponential back-off, in milliseconds.
    pub backoff_base_ms: u64,
    pub page_size: u32,
}

impl Default for MediaClientOptions {
    fn default() -> Self {
        Self {
            api_base: "https://api.cloudinary.com/v1_1".to_owned(),
            request_timeout_secs: 10,
            image_timeout_secs: 8,
            user_agent: "hemcat/0.1 (catalogue-sync)".to_owned(),
            max_retries: 2,
            backoff_base_ms: 500,
            page_size: 500,
        }
    }
}

impl From<&AppConfig> for MediaClientOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            api_base: config.media_api_base.clone(),
            request_timeout_secs: config.media_request_timeout_secs,
            image_timeout_secs: config.image_timeout_secs,
            user_agent: config.media_user_agent.clone(),
            max_retries: config.media_max_retries,
            backoff_base_ms: config.media_retry_backoff_ms,
            page_size: config.media_page_size,
        }
    }
}

/// HTTP client for the media store.
///
/// 404 is surfaced as [`MediaError::NotFound`] and never retried. 429, 5xx and
/// network timeouts are retried with exponential back-off up to
/// `max_retries` additional attempts.
pub struct MediaClient {
    pub(super) client: Client,
    pub(super) credentials: Option<MediaCredentials>,
    pub(super) api_base: String,
    pub(super) image_timeout: Duration,
    pub(super) max_retries: u32,
    pub(super) backoff_base_ms: u64,
    pub(super) page_size: u32,
}

impl MediaClient {
    /// Creates a client. Without `credentials` only public URL fetches work;
    /// listing and backup calls fail with [`MediaError::MissingCredentials`].
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        credentials: Option<MediaCredentials>,
        options: MediaClientOptions,
    ) -> Result<Self, MediaError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&options.user_agent)
            .build()?;
        Ok(Self {
            client,
            credentials,
            api_base: options.api_base.trim_end_matches('/').to_owned(),
            image_timeout: Duration::from_secs(options.image_timeout_secs),
            max_retries: options.max_retries,
            backoff_base_ms: options.backoff_base_ms,
            page_size: options.page_size.max(1),
        })
    }

    /// Builds a client from the application config.
    ///
    /// # Errors
    ///
    /// See [`MediaClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, MediaError> {
        Self::new(config.media.clone(), MediaClientOptions::from(config))
    }

    /// Returns `true` when listing and backup calls can be made.
    #[must_use]
    pub fn has_admin_access(&self) -> bool {
        self.credentials
            .as_ref()
            .is_some_and(|c| c.api_secret.is_some())
    }

    /// Fetches one page of uploaded image assets.
    ///
    /// # Errors
    ///
    /// - [`MediaError::MissingCredentials`]: no account or secret configured.
    /// - [`MediaError::RateLimited`] / [`MediaError::Http`]: after retries.
    /// - [`MediaError::UnexpectedStatus`]: other non-2xx status.
    /// - [`MediaError::Deserialize`]: body is not a listing page.
    pub async fn list_resources_page(
        &self,
        cursor: Option<&str>,
    ) -> Result<ResourcesPage, MediaError> {
        let url = self.admin_url("resources/image/upload")?;
        let page_size = self.page_size.to_string();
        let cursor = cursor.map(str::to_owned);

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            let page_size = page_size.clone();
            let cursor = cursor.clone();
            async move {
                let mut request = self
                    .authorized(self.client.get(&url))?
                    .query(&[("max_results", page_size.as_str())]);
                if let Some(cursor) = &cursor {
                    request = request.query(&[("next_cursor", cursor.as_str())]);
                }

                let response = check_status(request.send().await?, &url)?;
                let body = response.text().await?;
                serde_json::from_str::<ResourcesPage>(&body).map_err(|e| {
                    MediaError::Deserialize {
                        context: format!("resource listing from {url}"),
                        source: e,
                    }
                })
            }
        })
        .await
    }

    /// `{api_base}/{cloud_name}/{path}`.
    pub(super) fn admin_url(&self, path: &str) -> Result<String, MediaError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(MediaError::MissingCredentials("cloud name and API key"))?;
        Ok(format!(
            "{}/{}/{}",
            self.api_base,
            credentials.cloud_name,
            path.trim_start_matches('/')
        ))
    }

    /// Attaches basic auth with the API key and secret.
    pub(super) fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, MediaError> {
        let (credentials, secret) = self.admin_credentials()?;
        Ok(request.basic_auth(&credentials.api_key, Some(secret)))
    }

    pub(super) fn admin_credentials(&self) -> Result<(&MediaCredentials, &str), MediaError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(MediaError::MissingCredentials("cloud name and API key"))?;
        let secret = credentials
            .api_secret
            .as_deref()
            .ok_or(MediaError::MissingCredentials("API secret"))?;
        Ok((credentials, secret))
    }
}

/// Maps non-2xx responses onto typed errors.
pub(super) fn check_status(response: Response, url: &str) -> Result<Response, MediaError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(MediaError::RateLimited { retry_after_secs });
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(MediaError::NotFound {
            url: url.to_owned(),
        });
    }

    if !status.is_success() {
        return Err(MediaError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    Ok(response)
}
