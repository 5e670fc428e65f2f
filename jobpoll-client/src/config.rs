//! Client configuration
//!
//! Options are resolved field by field: every option that is absent (or
//! falsy: an empty string, a zero interval) takes its documented default.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default base URL prefixed to the execute route
pub const DEFAULT_BASE_URL: &str = "/";

/// Default delay before each poll cycle
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default route of the submission endpoint
pub const DEFAULT_EXECUTE_ROUTE: &str = "execute";

/// Default poll route
pub const DEFAULT_POLL_ROUTE: &str = "poll";

/// Partial client options
///
/// Every field is optional. The interval is expressed in milliseconds when
/// read from JSON or the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    pub base_url: Option<String>,
    #[serde(rename = "poll_interval_ms", with = "millis")]
    pub poll_interval: Option<Duration>,
    pub execute_route: Option<String>,
    pub poll_route: Option<String>,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = Some(poll_interval);
        self
    }

    pub fn with_execute_route(mut self, execute_route: impl Into<String>) -> Self {
        self.execute_route = Some(execute_route.into());
        self
    }

    pub fn with_poll_route(mut self, poll_route: impl Into<String>) -> Self {
        self.poll_route = Some(poll_route.into());
        self
    }

    /// Reads options from environment variables
    ///
    /// Recognized variables (all optional):
    /// - JOBPOLL_BASE_URL
    /// - JOBPOLL_POLL_INTERVAL_MS
    /// - JOBPOLL_EXECUTE_ROUTE
    /// - JOBPOLL_POLL_ROUTE
    ///
    /// Values that fail to parse are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads options through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            base_url: lookup("JOBPOLL_BASE_URL"),
            poll_interval: lookup("JOBPOLL_POLL_INTERVAL_MS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_millis),
            execute_route: lookup("JOBPOLL_EXECUTE_ROUTE"),
            poll_route: lookup("JOBPOLL_POLL_ROUTE"),
        }
    }
}

/// Fully resolved client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    poll_interval: Duration,
    execute_route: String,
    // Kept for option compatibility; poll requests go to the server-supplied
    // location instead.
    poll_route: String,
}

impl ClientConfig {
    /// Resolves options against the defaults
    pub fn from_options(options: ClientOptions) -> Self {
        Self {
            base_url: non_empty(options.base_url, DEFAULT_BASE_URL),
            poll_interval: options
                .poll_interval
                .filter(|interval| !interval.is_zero())
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            execute_route: non_empty(options.execute_route, DEFAULT_EXECUTE_ROUTE),
            poll_route: non_empty(options.poll_route, DEFAULT_POLL_ROUTE),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn execute_route(&self) -> &str {
        &self.execute_route
    }

    pub fn poll_route(&self) -> &str {
        &self.poll_route
    }

    /// URL of the submission endpoint
    ///
    /// Plain concatenation of base URL and execute route.
    pub fn execute_url(&self) -> String {
        format!("{}{}", self.base_url, self.execute_route)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_options(ClientOptions::default())
    }
}

impl From<ClientOptions> for ClientConfig {
    fn from(options: ClientOptions) -> Self {
        Self::from_options(options)
    }
}

fn non_empty(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

mod millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
