use crate::components::ews::RetryPolicy;
use crate::error::{config_error, AppResult};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Fixed QQ Exchange Web Services endpoint
pub const DEFAULT_ENDPOINT: &str = "https://ex.qq.com/EWS/Exchange.asmx";
/// Protocol version pinned on every request
pub const SERVER_VERSION: &str = "Exchange2013";
/// Upper bound on the total time spent backing off
pub const DEFAULT_MAX_WAIT_SECS: u64 = 30;
/// Number of inbox subjects fetched by the probe
pub const DEFAULT_INBOX_LIMIT: usize = 5;

const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_WAIT_VAR: &str = "EWS_SYNC_MAX_WAIT_SECS";

/// Main configuration structure for the sync runner
#[derive(Debug, Clone)]
pub struct Config {
    /// EWS service endpoint
    pub endpoint: Url,
    /// Value of the RequestServerVersion header
    pub server_version: String,
    /// Maximum cumulative back-off before giving up
    pub max_wait: Duration,
    /// First back-off delay, doubled on every retry
    pub initial_backoff: Duration,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// How many inbox messages the probe asks for
    pub inbox_limit: usize,
}

impl Config {
    /// Build the built-in configuration without consulting the environment
    pub fn new() -> AppResult<Self> {
        let endpoint = Url::parse(DEFAULT_ENDPOINT)
            .map_err(|e| config_error(&format!("Invalid EWS endpoint {DEFAULT_ENDPOINT}: {e}")))?;

        Ok(Config {
            endpoint,
            server_version: SERVER_VERSION.to_string(),
            max_wait: Duration::from_secs(DEFAULT_MAX_WAIT_SECS),
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            request_timeout: Duration::from_secs(DEFAULT_MAX_WAIT_SECS),
            inbox_limit: DEFAULT_INBOX_LIMIT,
        })
    }

    /// Load configuration, applying a `.env` file and environment overrides
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Self::new()?;

        if let Ok(raw) = env::var(MAX_WAIT_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.max_wait = Duration::from_secs(secs),
                Err(_) => warn!(
                    "Ignoring invalid {MAX_WAIT_VAR}={raw:?}, using {}s",
                    DEFAULT_MAX_WAIT_SECS
                ),
            }
        }

        Ok(config)
    }

    /// Point the session at another endpoint, e.g. a local test server
    pub fn with_endpoint(mut self, endpoint: &str) -> AppResult<Self> {
        self.endpoint = Url::parse(endpoint)
            .map_err(|e| config_error(&format!("Invalid EWS endpoint {endpoint}: {e}")))?;
        Ok(self)
    }

    /// Fault-tolerance policy derived from the back-off settings
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_wait, self.initial_backoff)
    }
}
