//! Image byte fetches.

use crate::error::MediaError;
use crate::retry::retry_with_backoff;

use super::{check_status, MediaClient};

impl MediaClient {
    /// Downloads the bytes at `url` using the image timeout.
    ///
    /// Timeouts and 5xx are retried; a 404 returns immediately.
    ///
    /// # Errors
    ///
    /// - [`MediaError::InvalidUrl`]: `url` is not an absolute http(s) URL.
    /// - [`MediaError::NotFound`]: HTTP 404.
    /// - [`MediaError::UnexpectedStatus`] / [`MediaError::Http`]: after retries.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, MediaError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| MediaError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(MediaError::InvalidUrl {
                url: url.to_owned(),
                reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
            });
        }

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let parsed = parsed.clone();
            async move {
                let response = self
                    .client
                    .get(parsed.clone())
                    .timeout(self.image_timeout)
                    .send()
                    .await?;
                let response = check_status(response, parsed.as_str())?;
                let bytes = response.bytes().await?;
                Ok(bytes.to_vec())
            }
        })
        .await
    }
}
