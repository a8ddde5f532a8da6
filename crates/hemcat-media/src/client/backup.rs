//! Raw-document storage used to mirror the overlay document off-box.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;

use crate::error::MediaError;
use crate::retry::retry_with_backoff;
use crate::types::{RawResourceInfo, UploadResult};

use super::{check_status, sign_params, MediaClient};

impl MediaClient {
    /// Downloads the JSON document stored as raw resource `public_id`.
    ///
    /// Returns `Ok(None)` when the store has no such resource (first run).
    ///
    /// # Errors
    ///
    /// Returns [`MediaError`] on credential, network, status or decode failures.
    pub async fn fetch_raw_document(&self, public_id: &str) -> Result<Option<Value>, MediaError> {
        let info_url = self.admin_url(&format!("resources/raw/upload/{public_id}"))?;

        let info = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let info_url = info_url.clone();
            async move {
                let response = self.authorized(self.client.get(&info_url))?.send().await?;
                let response = check_status(response, &info_url)?;
                let body = response.text().await?;
                serde_json::from_str::<RawResourceInfo>(&body).map_err(|e| {
                    MediaError::Deserialize {
                        context: format!("raw resource info for {public_id}"),
                        source: e,
                    }
                })
            }
        })
        .await;

        let info = match info {
            Ok(info) => info,
            Err(MediaError::NotFound { .. }) => {
                tracing::info!(public_id, "no remote backup document found");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let document_url = info.secure_url;
        let document = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let document_url = document_url.clone();
            async move {
                let response = self.client.get(&document_url).send().await?;
                let response = check_status(response, &document_url)?;
                let body = response.text().await?;
                serde_json::from_str::<Value>(&body).map_err(|e| MediaError::Deserialize {
                    context: format!("raw document {public_id}"),
                    source: e,
                })
            }
        })
        .await?;

        Ok(Some(document))
    }

    /// Uploads `document` as raw resource `public_id`, overwriting any previous copy.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError`] on credential, network, status or decode failures.
    pub async fn store_raw_document(
        &self,
        public_id: &str,
        document: &Value,
    ) -> Result<UploadResult, MediaError> {
        let upload_url = self.admin_url("raw/upload")?;
        let (credentials, secret) = self.admin_credentials()?;
        let api_key = credentials.api_key.clone();

        let body = serde_json::to_vec_pretty(document).map_err(|e| MediaError::Deserialize {
            context: format!("encoding raw document {public_id}"),
            source: e,
        })?;
        let file = format!("data:application/json;base64,{}", STANDARD.encode(body));

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let upload_url = upload_url.clone();
            let file = file.clone();
            let api_key = api_key.clone();
            async move {
                let timestamp = chrono::Utc::now().timestamp().to_string();
                let signature = sign_params(
                    &[
                        ("overwrite", "true"),
                        ("public_id", public_id),
                        ("timestamp", &timestamp),
                    ],
                    secret,
                );
                let form = [
                    ("file", file.as_str()),
                    ("public_id", public_id),
                    ("overwrite", "true"),
                    ("timestamp", timestamp.as_str()),
                    ("api_key", api_key.as_str()),
                    ("signature", signature.as_str()),
                ];

                let response = self.client.post(&upload_url).form(&form).send().await?;
                let response = check_status(response, &upload_url)?;
                let body = response.text().await?;
                serde_json::from_str::<UploadResult>(&body).map_err(|e| MediaError::Deserialize {
                    context: format!("upload response for {public_id}"),
                    source: e,
                })
            }
        })
        .await
    }
}
