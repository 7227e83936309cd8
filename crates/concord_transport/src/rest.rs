//! The Discord REST client.

use crate::{RateLimitCoordinator, RateLimitUpdate, RestConfig, route_key};
use concord_error::{CancellationError, ConcordResult, ConfigError, TransportError};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, instrument, warn};

pub use reqwest::Method;

/// Discord's JSON error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<u32>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    global: Option<bool>,
    #[serde(default)]
    retry_after: Option<f64>,
}

enum Payload {
    None,
    Json(Value),
    Multipart {
        payload_json: String,
        file_field: String,
        file_name: String,
        bytes: Vec<u8>,
    },
}

/// The single Discord API client every resource talks through.
///
/// Wraps a `reqwest` client with bot authorization, audit-log reason
/// headers, multipart uploads, and the rate-limit coordinator. Cloning is
/// cheap; clones share the coordinator so one bot session covers all
/// parallel resource operations.
///
/// # Example
///
/// ```no_run
/// use concord_transport::{DiscordRest, Method, RestConfig};
///
/// # async fn run() -> concord_error::ConcordResult<()> {
/// let config = RestConfig::builder().token("bot-token").build().unwrap();
/// let rest = DiscordRest::new(config)?;
/// let guild = rest
///     .do_json(Method::GET, "/guilds/81384788765712384", &[], None, None)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DiscordRest {
    client: reqwest::Client,
    config: Arc<RestConfig>,
    limiter: Arc<RateLimitCoordinator>,
}

impl DiscordRest {
    /// Build the client from a transport configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the underlying HTTP client cannot be
    /// constructed.
    #[instrument(skip(config), fields(base_url = %config.base_url()))]
    pub fn new(config: RestConfig) -> ConcordResult<Self> {
        debug!("Initializing Discord REST transport");
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(*config.request_timeout())
            .user_agent(config.user_agent().clone())
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: Arc::new(config),
            limiter: Arc::new(RateLimitCoordinator::new()),
        })
    }

    /// The embedded rate-limit coordinator, shared across clones.
    pub fn limiter(&self) -> &Arc<RateLimitCoordinator> {
        &self.limiter
    }

    /// Issue a JSON request.
    ///
    /// Returns the decoded response body, or `None` for a 204 / empty
    /// response. `audit_reason`, when present, is sent URL-encoded as
    /// `X-Audit-Log-Reason`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] carrying the method, path, HTTP status
    /// and Discord error code for any non-2xx response that survives the
    /// coordinator's retry budget.
    #[instrument(skip(self, body, audit_reason), fields(method = %method, path))]
    pub async fn do_json(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        audit_reason: Option<&str>,
    ) -> ConcordResult<Option<Value>> {
        let payload = match body {
            Some(value) => Payload::Json(value.clone()),
            None => Payload::None,
        };
        self.execute(method, path, query, payload, audit_reason).await
    }

    /// Issue a JSON request and decode the response into `T`.
    ///
    /// # Errors
    ///
    /// As [`do_json`](Self::do_json); additionally errors when the response
    /// body is empty or does not match `T`.
    pub async fn do_json_as<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        audit_reason: Option<&str>,
    ) -> ConcordResult<T> {
        let method_name = method.as_str().to_string();
        let value = self
            .do_json(method, path, query, body, audit_reason)
            .await?
            .ok_or_else(|| {
                TransportError::new(&method_name, path, 204, None, "expected a response body")
            })?;
        serde_json::from_value(value).map_err(|e| {
            TransportError::new(
                &method_name,
                path,
                200,
                None,
                format!("response did not match expected shape: {}", e),
            )
            .into()
        })
    }

    /// Issue a multipart request: a JSON `payload_json` part plus one named
    /// file part.
    ///
    /// # Errors
    ///
    /// As [`do_json`](Self::do_json).
    #[instrument(skip(self, payload_json, bytes, audit_reason), fields(method = %method, path, file_name))]
    pub async fn do_multipart(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        payload_json: &Value,
        file_field: &str,
        file_name: &str,
        bytes: Vec<u8>,
        audit_reason: Option<&str>,
    ) -> ConcordResult<Option<Value>> {
        let payload = Payload::Multipart {
            payload_json: payload_json.to_string(),
            file_field: file_field.to_string(),
            file_name: file_name.to_string(),
            bytes,
        };
        self.execute(method, path, query, payload, audit_reason).await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        payload: Payload,
        audit_reason: Option<&str>,
    ) -> ConcordResult<Option<Value>> {
        let route = route_key(method.as_str(), path);
        let admission = self.limiter.admit(&route).await;

        let mut backoff = ExponentialBackoff::from_millis(2)
            .factor(250)
            .max_delay(*self.config.max_backoff())
            .map(jitter);
        let max_attempts = *self.config.max_attempts();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let request = self.build_request(&method, path, query, &payload, audit_reason)?;

            let response = match self.client.execute(request).await {
                Ok(response) => response,
                Err(e) if e.is_timeout() => {
                    return Err(CancellationError::new(format!(
                        "{} {} timed out: {}",
                        method, path, e
                    ))
                    .into());
                }
                Err(e) => {
                    // Connection-level failure preceded any server
                    // processing, so even POST is safe to retry.
                    if attempt < max_attempts {
                        let delay = backoff.next().unwrap_or(Duration::from_secs(1));
                        warn!(attempt, error = %e, "Connection failed, retrying");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    error!(error = %e, "Connection failed, retry budget exhausted");
                    return Err(TransportError::connection(
                        method.as_str(),
                        path,
                        e.to_string(),
                    )
                    .into());
                }
            };

            let update = RateLimitUpdate::from_headers(response.headers());
            self.limiter.record(&admission, &update).await;
            let status = response.status().as_u16();

            if status == 429 {
                let body: Option<ErrorBody> = response.json().await.ok();
                let body_delay = body
                    .as_ref()
                    .and_then(|b| b.retry_after)
                    .map(Duration::from_secs_f64);
                if body.as_ref().is_some_and(|b| b.global == Some(true)) && !update.global {
                    // Body-only global flag; re-record so other buckets block.
                    let mut global_update = update.clone();
                    global_update.global = true;
                    global_update.retry_after = body.as_ref().and_then(|b| b.retry_after);
                    self.limiter.record(&admission, &global_update).await;
                }
                if attempt >= max_attempts {
                    error!(path, "Rate-limit retry budget exhausted");
                    return Err(TransportError::new(
                        method.as_str(),
                        path,
                        429,
                        body.and_then(|b| b.code),
                        "rate limited: retry budget exhausted",
                    )
                    .into());
                }
                let delay = update
                    .retry_delay()
                    .or(body_delay)
                    .unwrap_or_else(|| backoff.next().unwrap_or(Duration::from_secs(1)));
                debug!(delay_secs = delay.as_secs_f64(), attempt, "429, sleeping before retry");
                tokio::time::sleep(delay).await;
                continue;
            }

            if status >= 500 && method != Method::POST {
                if attempt < max_attempts {
                    let delay = backoff.next().unwrap_or(Duration::from_secs(1));
                    warn!(status, attempt, "Server error, retrying");
                    tokio::time::sleep(delay).await;
                    continue;
                }
            }

            if !response.status().is_success() {
                let text = response.text().await.unwrap_or_default();
                let parsed: Option<ErrorBody> = serde_json::from_str(&text).ok();
                let (code, message) = match parsed {
                    Some(body) => (body.code, body.message.unwrap_or(text)),
                    None => (None, text),
                };
                error!(status, ?code, "Discord returned an error");
                return Err(TransportError::new(method.as_str(), path, status, code, message).into());
            }

            let text = response.text().await.map_err(|e| {
                TransportError::new(
                    method.as_str(),
                    path,
                    status,
                    None,
                    format!("failed to read response body: {}", e),
                )
            })?;
            if text.is_empty() {
                return Ok(None);
            }
            let value: Value = serde_json::from_str(&text).map_err(|e| {
                TransportError::new(
                    method.as_str(),
                    path,
                    status,
                    None,
                    format!("response was not valid JSON: {}", e),
                )
            })?;
            return Ok(Some(value));
        }
    }

    fn build_request(
        &self,
        method: &Method,
        path: &str,
        query: &[(&str, String)],
        payload: &Payload,
        audit_reason: Option<&str>,
    ) -> ConcordResult<reqwest::Request> {
        let url = format!("{}{}", self.config.base_url(), path);
        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header("Authorization", format!("Bot {}", self.config.token()));

        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(reason) = audit_reason {
            builder = builder.header(
                "X-Audit-Log-Reason",
                urlencoding::encode(reason).into_owned(),
            );
        }

        builder = match payload {
            Payload::None => builder,
            Payload::Json(value) => builder.json(value),
            Payload::Multipart {
                payload_json,
                file_field,
                file_name,
                bytes,
            } => {
                let part = reqwest::multipart::Part::bytes(bytes.clone())
                    .file_name(file_name.clone());
                let form = reqwest::multipart::Form::new()
                    .text("payload_json", payload_json.clone())
                    .part(file_field.clone(), part);
                builder.multipart(form)
            }
        };

        builder.build().map_err(|e| {
            TransportError::connection(method.as_str(), path, format!("failed to build request: {}", e))
                .into()
        })
    }
}
