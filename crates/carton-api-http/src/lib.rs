// # HTTP Request Authority
//
// This crate provides the REST gateway implementation of
// `carton_core::traits::RequestAuthority`.
//
// ## Behavior
//
// - One `GET {base}/requests/{id}` per call
// - Optional account headers (`X-Megam-EMAIL`, `X-Megam-APIKEY`)
// - Non-2xx statuses map to typed errors (404, 401/403, everything else)
// - The raw body is returned; envelope decoding lives in the resolver
//
// ## Not Here
//
// - NO retry or backoff (a failure goes straight back to the resolver)
// - NO caching of responses
// - NO fallback to the payload's own fields
//
// ## Security
//
// The API key never appears in logs or in the Debug output.

use async_trait::async_trait;
use carton_core::config::ApiConfig;
use carton_core::traits::RequestAuthority;
use carton_core::{Error, Result};
use std::time::Duration;

/// Header carrying the account email
pub const EMAIL_HEADER: &str = "X-Megam-EMAIL";

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-Megam-APIKEY";

/// Request authority backed by the REST gateway
pub struct HttpRequestAuthority {
    /// Base URL without trailing slash
    base_url: String,

    email: Option<String>,

    /// ⚠️ NEVER log this value
    api_key: Option<String>,

    client: reqwest::Client,
}

impl std::fmt::Debug for HttpRequestAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequestAuthority")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_key", &self.api_key.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

impl HttpRequestAuthority {
    /// Build an authority from validated API settings
    ///
    /// # Errors
    ///
    /// - `Error::Config` if the settings are invalid
    /// - `Error::Http` if the HTTP client cannot be built
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            email: config.email.clone().filter(|s| !s.is_empty()),
            api_key: config.api_key.clone().filter(|s| !s.is_empty()),
            client,
        })
    }

    /// Full URL for request `id`
    pub fn request_url(&self, id: &str) -> String {
        format!("{}/requests/{}", self.base_url, id)
    }
}

#[async_trait]
impl RequestAuthority for HttpRequestAuthority {
    /// Fetch request `id` from the gateway
    ///
    /// ```http
    /// GET /requests/:id
    /// X-Megam-EMAIL: <email>
    /// X-Megam-APIKEY: <key>
    /// ```
    async fn fetch_request(&self, id: &str) -> Result<Vec<u8>> {
        if id.is_empty() {
            return Err(Error::invalid_input("request id cannot be empty"));
        }

        let url = self.request_url(id);
        tracing::debug!("GET {}", url);

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/json");
        if let Some(email) = &self.email {
            request = request.header(EMAIL_HEADER, email);
        }
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            tracing::warn!("Request {} lookup failed with {}", id, status);

            return match status.as_u16() {
                401 | 403 => Err(Error::auth(format!(
                    "Gateway rejected credentials. Status: {}",
                    status
                ))),
                404 => Err(Error::not_found(format!("Request not found: {}", id))),
                500..=599 => Err(Error::http(format!(
                    "Gateway server error: {} - {}",
                    status, error_text
                ))),
                _ => Err(Error::http(format!(
                    "Request lookup failed: {} - {}",
                    status, error_text
                ))),
            };
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::http(format!("Failed to read response body: {}", e)))?;

        tracing::debug!("Request {} fetched ({} bytes)", id, body.len());
        Ok(body.to_vec())
    }

    fn authority_name(&self) -> &'static str {
        "http"
    }
}
