//! LogicMonitor API client.
//!
//! Low-level HTTP client that signs requests and retries transient failures.
//! Higher-level operations are implemented via traits on entity types.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::auth;
use crate::config::{self, Credentials};
use crate::error::{LmError, Result};
use crate::retry::RetryPolicy;

const USER_AGENT: &str = concat!("lmexport/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Low-level LogicMonitor API client.
///
/// Every request is signed with LMv1 and retried according to the client's
/// [`RetryPolicy`]. Entity-specific operations are implemented via the `Get`
/// and `List` traits on model types.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use lmexport::{Credentials, LmClient};
///
/// # fn example() -> lmexport::Result<()> {
/// // Create from ACCESS_ID / ACCESS_KEY / COMPANY
/// let client = LmClient::from_env()?;
///
/// // Or configure manually
/// let creds = Credentials::new("id", "key", "acme");
/// let client = LmClient::new(creds, "https://acme.logicmonitor.com/santaba/rest")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LmClient {
    http: Client,
    base_url: Arc<Url>,
    credentials: Arc<Credentials>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for LmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LmClient")
            .field("base_url", &self.base_url.as_str())
            .field("access_id", &self.credentials.access_id)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl LmClient {
    /// Create a client from environment variables.
    ///
    /// Uses `ACCESS_ID`, `ACCESS_KEY` and `COMPANY` for authentication and
    /// optionally `LM_API_URL` for the base URL (defaults to
    /// `https://<COMPANY>.logicmonitor.com/santaba/rest`).
    ///
    /// # Errors
    ///
    /// Returns an error if any credential variable is not set.
    pub fn from_env() -> Result<Self> {
        let credentials = Credentials::from_env()?;
        let base_url =
            config::base_url_override().unwrap_or_else(|| credentials.default_base_url());

        Self::new(credentials, &base_url)
    }

    /// Create a new client with the provided credentials and base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(credentials: Credentials, base_url: &str) -> Result<Self> {
        // Ensure base URL ends with /
        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base_url = Url::parse(&base_url_str)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(LmError::HttpError)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            credentials: Arc::new(credentials),
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the retry policy.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Make a signed GET request and parse the JSON body.
    ///
    /// `resource_path` is the path below the REST root, e.g.
    /// `/setting/datasources`. Transient failures are retried per the
    /// client's [`RetryPolicy`]; the last error is returned once retries are
    /// exhausted.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json<Q: Serialize + ?Sized>(
        &self,
        resource_path: &str,
        query: &Q,
    ) -> Result<Value> {
        let mut retries = 0;

        loop {
            match self.send_get(resource_path, query).await {
                Ok(value) => return Ok(value),
                Err(err) => match self.retry.next_delay(&err, retries) {
                    Some(delay) => {
                        retries += 1;
                        tracing::warn!(
                            error = %err,
                            retry = retries,
                            max_retries = self.retry.max_retries,
                            delay_ms = delay.as_millis() as u64,
                            "Request failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => return Err(err),
                },
            }
        }
    }

    /// One signed GET attempt, no retries.
    async fn send_get<Q: Serialize + ?Sized>(&self, resource_path: &str, query: &Q) -> Result<Value> {
        let url = self.url_for(resource_path)?;
        let resource_path = Self::signed_path(resource_path);
        let authorization = auth::authorization(
            &self.credentials.access_id,
            &self.credentials.access_key,
            "GET",
            &resource_path,
            "",
            Utc::now().timestamp_millis(),
        );

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, "application/json")
            .header("X-Version", API_VERSION)
            .query(query)
            .send()
            .await
            .map_err(LmError::HttpError)?;

        let response = Self::check_response(response).await?;
        let value: Value = response.json().await.map_err(LmError::HttpError)?;
        Self::check_envelope(value)
    }

    fn url_for(&self, resource_path: &str) -> Result<Url> {
        Ok(self.base_url.join(resource_path.trim_start_matches('/'))?)
    }

    /// The path as it enters the signature: always with a leading `/`.
    fn signed_path(resource_path: &str) -> String {
        if resource_path.starts_with('/') {
            resource_path.to_string()
        } else {
            format!("/{resource_path}")
        }
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        // Handle rate limiting
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            return Err(LmError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let message = Self::extract_error_message(response, status).await;
        Err(LmError::ApiError {
            message,
            status_code: Some(status.as_u16()),
        })
    }

    /// Older API versions report failures inside a 200 body as
    /// `{"status": <code>, "errmsg": "..."}`.
    fn check_envelope(value: Value) -> Result<Value> {
        let status = value.get("status").and_then(Value::as_i64);
        let errmsg = value.get("errmsg").and_then(Value::as_str);

        match (status, errmsg) {
            (Some(code), Some(msg)) if code != 200 => Err(LmError::ApiError {
                message: format!("{msg} (status {code})"),
                status_code: None,
            }),
            _ => Ok(value),
        }
    }

    /// Extract error message from a failed response.
    async fn extract_error_message(response: Response, status: reqwest::StatusCode) -> String {
        let body = match response.text().await {
            Ok(b) => b,
            Err(_) => return format!("HTTP {status}"),
        };

        // Try to parse as JSON and extract message field
        if let Ok(json) = serde_json::from_str::<Value>(&body) {
            for key in ["errorMessage", "errmsg", "message"] {
                if let Some(msg) = json.get(key).and_then(|m| m.as_str()) {
                    return format!("HTTP {status}: {msg}");
                }
            }
        }

        if body.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {body}")
        }
    }
}
