//! Client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest expression sent in a single GET. Apache's default URL limit is
/// 8190; this leaves room for the path and percent-encoding slack.
pub const DEFAULT_MAX_CHARS: usize = 7500;

/// Upper bound on split-collapse passes before giving up
pub const DEFAULT_MAX_COLLAPSE_ITERATIONS: usize = 32;

pub const DEFAULT_HOST: &str = "localhost:80";

/// Range client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `host:port`, optionally prefixed with `http://` or `https://`
    pub host: String,

    /// Expressions longer than this are split across several requests
    pub max_chars: usize,

    /// Guard for the collapse fixed-point loop
    pub max_collapse_iterations: usize,

    /// Per-request timeout; `None` leaves the HTTP client default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Script name reported in the User-Agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            max_chars: DEFAULT_MAX_CHARS,
            max_collapse_iterations: DEFAULT_MAX_COLLAPSE_ITERATIONS,
            timeout_secs: None,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn with_max_collapse_iterations(mut self, iterations: usize) -> Self {
        self.max_collapse_iterations = iterations;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_user_agent(mut self, script: impl Into<String>) -> Self {
        self.user_agent = Some(script.into());
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Base URL with a scheme, without trailing slash
    pub fn base_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        }
    }
}
