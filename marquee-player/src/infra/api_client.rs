use anyhow::{Context, Result};
use log::{info, warn};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use marquee_config::ServerConfig;

/// HTTP client for a Jellyfin-compatible server.
///
/// Every request carries the `MediaBrowser` authorization header built from
/// the configured client and device identity.
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) client: Client,
    base_url: String,
    access_token: Option<String>,
    auth_header: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_token", &self.access_token.is_some())
            .finish()
    }
}

impl ApiClient {
    /// Build a client from server settings
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let base_url = config.base_url.as_str().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        info!(
            "[ApiClient] Creating new API client with base URL: {}",
            base_url
        );

        Ok(Self {
            client,
            base_url,
            access_token: config.access_token.clone(),
            auth_header: authorization_header(config),
        })
    }

    /// Absolute URL for a server path
    pub fn build_url(&self, path: impl AsRef<str>) -> String {
        let p = path.as_ref();
        if p.starts_with("http://") || p.starts_with("https://") {
            return p.to_string();
        }
        format!("{}/{}", self.base_url, p.trim_start_matches('/'))
    }

    /// Token appended as `api_key` to URLs handed to the video backend,
    /// which cannot send headers.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    fn build_request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("Authorization", &self.auth_header)
    }

    async fn execute_request<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = request.send().await?;

        match response.status() {
            status if status.is_success() => {
                if status == StatusCode::NO_CONTENT {
                    return Err(anyhow::anyhow!(
                        "Empty response from server (204 No Content)"
                    ));
                }
                Ok(response.json::<T>().await?)
            }
            StatusCode::UNAUTHORIZED => {
                warn!("[ApiClient] Server rejected the access token");
                Err(anyhow::anyhow!("Unauthorized - check the access token"))
            }
            status => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(anyhow::anyhow!(
                    "Request failed with status {}: {}",
                    status,
                    error_text
                ))
            }
        }
    }

    async fn execute_no_content(&self, request: RequestBuilder) -> Result<()> {
        let response = request.send().await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => {
                warn!("[ApiClient] Server rejected the access token");
                Err(anyhow::anyhow!("Unauthorized - check the access token"))
            }
            status => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(anyhow::anyhow!(
                    "Request failed with status {}: {}",
                    status,
                    error_text
                ))
            }
        }
    }

    /// GET `path` and decode the JSON body
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.build_url(path);
        let request = self.build_request(self.client.get(&url));
        self.execute_request(request).await
    }

    /// POST `body` as JSON and decode the reply
    pub async fn post<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R> {
        let url = self.build_url(path);
        let request = self.build_request(self.client.post(&url).json(body));
        self.execute_request(request).await
    }

    /// POST for endpoints that answer 204 No Content
    pub async fn post_no_content<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<()> {
        let url = self.build_url(path);
        let request = self.build_request(self.client.post(&url).json(body));
        self.execute_no_content(request).await
    }

    /// POST with no body, expecting no content back
    pub async fn post_empty(&self, path: &str) -> Result<()> {
        let url = self.build_url(path);
        let request = self.build_request(self.client.post(&url));
        self.execute_no_content(request).await
    }

    /// DELETE `path`, expecting no content back
    pub async fn delete_no_content(&self, path: &str) -> Result<()> {
        let url = self.build_url(path);
        let request = self.build_request(self.client.delete(&url));
        self.execute_no_content(request).await
    }
}

/// `MediaBrowser Client="..", Device="..", DeviceId="..", Version="..",
/// Token=".."`
pub fn authorization_header(config: &ServerConfig) -> String {
    let mut header = format!(
        "MediaBrowser Client=\"{}\", Device=\"{}\", DeviceId=\"{}\", Version=\"{}\"",
        config.client_name,
        config.device_name,
        config.device_id,
        config.client_version
    );
    if let Some(token) = &config.access_token {
        header.push_str(&format!(", Token=\"{}\"", token));
    }
    header
}
