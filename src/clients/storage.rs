use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::ApiError;

use super::ObjectStore;

/// Client for the managed object store's REST surface. Uploads land under
/// `{base}/object/{bucket}/{key}` and are served from the public path.
pub struct StorageClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl StorageClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to create HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl ObjectStore for StorageClient {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ApiError> {
        let url = format!("{}/object/{}/{}", self.base_url, bucket, key);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("content-type", content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream {
                status: Some(status),
                detail,
            });
        }

        Ok(format!(
            "{}/object/public/{}/{}",
            self.base_url, bucket, key
        ))
    }
}
