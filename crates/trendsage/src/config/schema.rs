use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Production backend used when no override is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.cred.buzz";

/// Primary base URL override.
pub const TRENDSAGE_API_URL_ENV: &str = "NEXT_PUBLIC_TRENDSAGE_API_URL";

/// Secondary base URL override, consulted when the primary is unset.
pub const CREDBUZZ_API_URL_ENV: &str = "NEXT_PUBLIC_CREDBUZZ_API_URL";

/// Bearer token sent with every request when set.
pub const API_KEY_ENV: &str = "NEXT_PUBLIC_API_KEY";

/// Connection settings for the matchmaking backend and the job monitor.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    pub base_url: String,

    /// Name of the environment variable holding the API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env_var: Option<String>,

    /// Resolved API key. Never written back to disk.
    #[serde(skip)]
    pub api_key: Option<SecretString>,

    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env_var: None,
            api_key: None,
            connect_timeout_secs: 10,
            request_timeout_secs: 15,
            poll_interval_secs: 5,
            page_size: 20,
        }
    }
}

impl ClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Base URL without trailing slashes.
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
