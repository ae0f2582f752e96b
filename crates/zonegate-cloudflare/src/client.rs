//! Main Cloudflare API client implementation.

use crate::api::RecordsApi;
use crate::config::{RetryConfig, ZoneConfig};
use crate::types::{ApiEnvelope, ApiError};
use crate::{CloudflareError, Result};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// The Cloudflare API base URL
const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Cloudflare DNS API client, scoped to one zone
#[derive(Clone)]
pub struct CloudflareClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    api_token: String,
    base_url: String,
    timeout: Duration,
    zone: ZoneConfig,
    zone_id: OnceCell<String>,
    retry: RetryConfig,
}

/// Zone entry from the by-name lookup endpoint
#[derive(Debug, Deserialize)]
struct ZoneInfo {
    id: String,
}

impl CloudflareClient {
    /// Create a client with default settings for the given zone
    #[must_use]
    pub fn new(api_token: impl Into<String>, zone: ZoneConfig) -> Self {
        CloudflareClientBuilder::new(api_token).zone(zone).build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(api_token: impl Into<String>) -> CloudflareClientBuilder {
        CloudflareClientBuilder::new(api_token)
    }

    /// Create a client from `CF_API_TOKEN` and `CF_ZONE_ID`/`CF_ZONE_NAME`
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("CF_API_TOKEN")
            .map_err(|_| CloudflareError::Config("CF_API_TOKEN is required".to_string()))?;
        let zone = ZoneConfig {
            id: std::env::var("CF_ZONE_ID").ok(),
            name: std::env::var("CF_ZONE_NAME").ok(),
        };
        if !zone.is_configured() {
            return Err(CloudflareError::Config(
                "either CF_ZONE_ID or CF_ZONE_NAME is required".to_string(),
            ));
        }
        Ok(Self::new(token, zone))
    }

    /// Access DNS record endpoints
    #[must_use]
    pub fn records(&self) -> RecordsApi<'_> {
        RecordsApi::new(self)
    }

    /// The id of the configured zone, resolving and caching a by-name
    /// lookup on first use.
    pub(crate) async fn zone_id(&self) -> Result<String> {
        let id = self
            .inner
            .zone_id
            .get_or_try_init(|| self.resolve_zone_id())
            .await?;
        Ok(id.clone())
    }

    async fn resolve_zone_id(&self) -> Result<String> {
        if let Some(id) = &self.inner.zone.id {
            return Ok(id.clone());
        }
        let Some(name) = &self.inner.zone.name else {
            return Err(CloudflareError::Config(
                "zone id or zone name is required".to_string(),
            ));
        };

        debug!(zone = %name, "resolving zone id by name");
        let envelope: ApiEnvelope<Vec<ZoneInfo>> =
            self.get("/zones", &[("name", name.as_str())]).await?;
        envelope
            .result
            .and_then(|zones| zones.into_iter().next())
            .map(|zone| zone.id)
            .ok_or_else(|| CloudflareError::ZoneLookup(format!("no zone named {name:?}")))
    }

    /// Perform a GET request, retrying transient failures.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<ApiEnvelope<T>> {
        let url = self.build_url(path, params);
        let mut attempt = 0;
        loop {
            debug!(url = %url, attempt, "GET request");
            let result = self
                .dispatch(self.inner.http.get(&url))
                .await;
            match result {
                Err(err) if attempt < self.inner.retry.max_retries && self.should_retry(&err) => {
                    let backoff = self.inner.retry.backoff_for(attempt);
                    warn!(%err, ?backoff, "retrying GET");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Perform a POST request with a JSON body
    pub(crate) async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiEnvelope<T>> {
        let url = self.build_url(path, &[]);
        debug!(url = %url, "POST request");
        self.dispatch(self.inner.http.post(&url).json(body)).await
    }

    /// Perform a PATCH request with a JSON body
    pub(crate) async fn patch<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiEnvelope<T>> {
        let url = self.build_url(path, &[]);
        debug!(url = %url, "PATCH request");
        self.dispatch(self.inner.http.patch(&url).json(body)).await
    }

    /// Perform a DELETE request
    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiEnvelope<T>> {
        let url = self.build_url(path, &[]);
        debug!(url = %url, "DELETE request");
        self.dispatch(self.inner.http.delete(&url)).await
    }

    fn should_retry(&self, err: &CloudflareError) -> bool {
        if matches!(err, CloudflareError::RateLimited { .. }) {
            return self.inner.retry.retry_on_rate_limit;
        }
        err.is_retryable()
    }

    /// Build a URL with query parameters
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}{}", self.inner.base_url, path);

        let mut separator = '?';
        for (key, value) in params {
            url.push(separator);
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
            separator = '&';
        }

        url
    }

    /// Send a request and decode the response envelope
    async fn dispatch<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiEnvelope<T>> {
        let response = request
            .bearer_auth(&self.inner.api_token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CloudflareError::Timeout(self.inner.timeout.as_secs())
                } else {
                    CloudflareError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CloudflareError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::error_from_status(status.as_u16(), &body));
        }

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body)?;
        if envelope.success {
            Ok(envelope)
        } else {
            let (code, message) = first_error(&envelope.errors);
            warn!(code, %message, "provider reported failure");
            Err(CloudflareError::Provider { code, message })
        }
    }

    /// Map a non-2xx response to an error
    fn error_from_status(status: u16, body: &str) -> CloudflareError {
        // The envelope error message is more useful than the raw body
        // when we can decode it.
        let message = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body)
            .ok()
            .map(|env| first_error(&env.errors).1)
            .unwrap_or_else(|| body.to_string());

        match status {
            401 | 403 => CloudflareError::Unauthorized,
            404 => CloudflareError::NotFound { resource: message },
            429 => {
                warn!("rate limited by Cloudflare API");
                CloudflareError::RateLimited { retry_after: None }
            }
            _ => CloudflareError::Provider {
                code: i64::from(status),
                message,
            },
        }
    }
}

fn first_error(errors: &[ApiError]) -> (i64, String) {
    errors.first().map_or_else(
        || (0, "unknown provider error".to_string()),
        |e| (e.code, e.message.clone()),
    )
}

/// Builder for configuring a [`CloudflareClient`]
pub struct CloudflareClientBuilder {
    api_token: String,
    base_url: String,
    timeout: Duration,
    user_agent: String,
    zone: ZoneConfig,
    retry: RetryConfig,
}

impl CloudflareClientBuilder {
    /// Create a new builder with the given API token
    #[must_use]
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("zonegate/{}", env!("CARGO_PKG_VERSION")),
            zone: ZoneConfig::default(),
            retry: RetryConfig::default(),
        }
    }

    /// Set the base URL (useful for testing)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the zone configuration
    #[must_use]
    pub fn zone(mut self, zone: ZoneConfig) -> Self {
        self.zone = zone;
        self
    }

    /// Set the zone by id
    #[must_use]
    pub fn zone_id(mut self, id: impl Into<String>) -> Self {
        self.zone.id = Some(id.into());
        self
    }

    /// Set the zone by name (id resolved lazily)
    #[must_use]
    pub fn zone_name(mut self, name: impl Into<String>) -> Self {
        self.zone.name = Some(name.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set retry configuration
    #[must_use]
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Build the client
    #[must_use]
    pub fn build(self) -> CloudflareClient {
        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .expect("Failed to build HTTP client");

        CloudflareClient {
            inner: Arc::new(ClientInner {
                http,
                api_token: self.api_token,
                base_url: self.base_url,
                timeout: self.timeout,
                zone: self.zone,
                zone_id: OnceCell::new(),
                retry: self.retry,
            }),
        }
    }
}

// URL encoding helper
mod urlencoding {
    pub fn encode(s: &str) -> String {
        url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
    }
}
