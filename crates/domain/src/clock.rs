//! Clock identifiers — the device's two logical clocks.

use std::fmt;

/// The device exposes exactly two clocks; the set is closed and the wire
/// protocol addresses them by digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockId {
    /// Clock 0 — the device's live time-of-day clock. Always set.
    Current,
    /// Clock 1 — the optional configured closing time for the door.
    Closing,
}

impl ClockId {
    /// The digit used in `ATST<id>` commands.
    #[must_use]
    pub fn wire_id(self) -> u8 {
        match self {
            Self::Current => 0,
            Self::Closing => 1,
        }
    }
}

impl fmt::Display for ClockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_id())
    }
}
