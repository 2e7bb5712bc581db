//! Door status — the state propagated to external status services.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::TimeOfDay;

/// Last-known state of the space door.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorStatus {
    /// No closing time configured on the device.
    #[default]
    Closed,
    /// Open until the given closing time.
    OpenUntil(TimeOfDay),
}

impl DoorStatus {
    /// Build a status from a closing-time report: an absent payload means
    /// the door is closed.
    #[must_use]
    pub fn from_closing_time(closing: Option<TimeOfDay>) -> Self {
        match closing {
            None => Self::Closed,
            Some(time) => Self::OpenUntil(time),
        }
    }

    /// The status word the external service expects.
    #[must_use]
    pub fn wire_status(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::OpenUntil(_) => "open",
        }
    }

    /// Closing time truncated to `HH:MM`, the external wire form. `None`
    /// when closed.
    #[must_use]
    pub fn open_until_hhmm(&self) -> Option<String> {
        match self {
            Self::Closed => None,
            Self::OpenUntil(time) => Some(time.hhmm()),
        }
    }
}

impl fmt::Display for DoorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => f.write_str("closed"),
            Self::OpenUntil(time) => write!(f, "open until {}", time.hhmm()),
        }
    }
}
