//! Serial link configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the serial connection to the device.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Serial device path.
    pub device: String,
    /// Baud rate. The device firmware is fixed at 57600.
    pub baud: u32,
    /// Read timeout in milliseconds. The protocol is strictly
    /// line-terminated, so a timed-out read means "no line yet".
    pub read_timeout_ms: u64,
}

impl SerialConfig {
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyAMA0".to_string(),
            baud: 57_600,
            read_timeout_ms: 1_000,
        }
    }
}
