//! Status-service client configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the variable directory client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Base URL of the data API, with a trailing slash.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl DirectoryConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.vanhack.ca/s/vhs/data/".to_string(),
            timeout_ms: 5_000,
        }
    }
}

/// Configuration for the public door-status client.
///
/// Updates require an API key; a missing key is rejected when the client
/// is built, not when the first update fails.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DoorStatusConfig {
    /// Base URL of the status API, with a trailing slash.
    pub base_url: String,
    /// API key authorizing status updates.
    pub api_key: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl DoorStatusConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for DoorStatusConfig {
    fn default() -> Self {
        Self {
            base_url: "https://isvhsopen.com/api/status/".to_string(),
            api_key: None,
            timeout_ms: 5_000,
        }
    }
}
