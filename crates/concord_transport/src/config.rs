//! Transport configuration.

use derive_builder::Builder;
use derive_getters::Getters;
use std::time::Duration;

/// Configuration for the REST transport.
///
/// # Examples
///
/// ```
/// use concord_transport::RestConfig;
///
/// let config = RestConfig::builder()
///     .token("my-bot-token")
///     .build()
///     .unwrap();
/// assert_eq!(config.max_attempts(), &5u32);
/// ```
#[derive(Debug, Clone, Getters, Builder)]
#[builder(setter(into), build_fn(error = "derive_builder::UninitializedFieldError"))]
pub struct RestConfig {
    /// Bot token, sent as `Authorization: Bot <token>`.
    token: String,

    /// Base URL of the Discord REST API.
    #[builder(default = "RestConfig::DEFAULT_BASE_URL.to_string()")]
    base_url: String,

    /// User-agent header value.
    #[builder(default = "RestConfig::DEFAULT_USER_AGENT.to_string()")]
    user_agent: String,

    /// Per-request deadline.
    #[builder(default = "Duration::from_secs(60)")]
    request_timeout: Duration,

    /// Retry budget: total attempts per request, including the first.
    #[builder(default = "5")]
    max_attempts: u32,

    /// Ceiling for exponential backoff between retries.
    #[builder(default = "Duration::from_secs(30)")]
    max_backoff: Duration,
}

impl RestConfig {
    /// Discord's REST base.
    pub const DEFAULT_BASE_URL: &'static str = "https://discord.com/api/v10";

    /// Default user agent, per Discord's bot requirements.
    pub const DEFAULT_USER_AGENT: &'static str =
        concat!("DiscordBot (https://github.com/concord-rs/concord, ", env!("CARGO_PKG_VERSION"), ")");

    /// Start building a config.
    pub fn builder() -> RestConfigBuilder {
        RestConfigBuilder::default()
    }
}
