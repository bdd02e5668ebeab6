//! Configuration for remote inventory sources

use std::time::Duration;

use dyninv_client::{DEFAULT_USER_AGENT, HttpFetcher, SecurityOptions};
use serde::{Deserialize, Serialize};

/// Settings applied to every fetch from a remote source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// CA bundle and insecure mode
    #[serde(flatten)]
    pub security: SecurityOptions,
    /// Request timeout in seconds (no timeout when unset)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// `User-Agent` header sent with requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            security: SecurityOptions::default(),
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl SourceConfig {
    /// Request timeout
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Build the HTTP fetcher described by this config
    #[must_use]
    pub fn http_fetcher(&self) -> HttpFetcher {
        let fetcher = HttpFetcher::new().with_user_agent(&self.user_agent);
        match self.timeout() {
            Some(timeout) => fetcher.with_timeout(timeout),
            None => fetcher,
        }
    }
}
