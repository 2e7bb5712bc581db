//! Device messages and the serial line classifier.
//!
//! The device speaks a small line-oriented text protocol (see
//! <https://github.com/BruceFletcher/SpaceTime/blob/master/sw/serial.c>).
//! Every line it emits maps onto exactly one [`DeviceMessage`] kind;
//! classification is purely syntactic, with [`DeviceMessage::Unknown`] as
//! the total catch-all.

use crate::time::{is_time_string, TimeOfDay};

/// Line terminator for every command and reply.
pub const CRLF: &str = "\r\n";
/// Acknowledgement terminator following most device replies.
pub const OK_TOKEN: &str = "OK";
/// Prefix of every command we send; the device echoes them all back.
pub const COMMAND_PREFIX: &str = "AT";
/// Label on clock-0 reports.
pub const CURRENT_LABEL: &str = "Current time: ";
/// Label on clock-1 reports.
pub const CLOSING_LABEL: &str = "Closing time: ";
/// Sentinel for a cleared clock, with or without a label.
pub const NOT_SET: &str = "Not set";
/// Announcement the device prints on power-on or reset.
pub const BOOT_BANNER: &str = "SpaceTime, yay!";

/// One classified serial line from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceMessage {
    /// The device reports its live clock. The payload is present unless the
    /// clock was cleared, which never happens for clock 0 in practice.
    CurrentTime(Option<TimeOfDay>),
    /// The device reports the configured closing time; `None` means
    /// "not set", i.e. the door is in the closed state.
    ClosingTime(Option<TimeOfDay>),
    /// A bare time reply with no clock label. The device answers queries
    /// this way, so the caller must know which clock it asked about.
    AmbiguousTime(Option<TimeOfDay>),
    /// Acknowledgement terminator.
    Ok,
    /// The device echoing back a command we sent.
    Echo(String),
    /// Power-on/reset announcement.
    Boot(String),
    /// Anything else, including the empty line produced by a read timeout.
    Unknown(String),
}

impl DeviceMessage {
    /// Classify one serial line, with its terminator already stripped.
    ///
    /// Rules are evaluated in order, first match wins:
    ///
    /// 1. starts with [`OK_TOKEN`] → [`Ok`](Self::Ok)
    /// 2. starts with [`COMMAND_PREFIX`] → [`Echo`](Self::Echo)
    /// 3. starts with a clock label → labeled time, payload absent when the
    ///    remainder is the [`NOT_SET`] sentinel
    /// 4. equals [`BOOT_BANNER`] → [`Boot`](Self::Boot)
    /// 5. starts with [`NOT_SET`] (no label) → unlabeled cleared clock
    /// 6. is a bare `HH:MM:SS` string → unlabeled time
    /// 7. otherwise → [`Unknown`](Self::Unknown)
    ///
    /// A labeled line whose remainder is neither the sentinel nor a valid
    /// time degrades to `Unknown` rather than failing — classification is
    /// total.
    #[must_use]
    pub fn classify(line: &str) -> Self {
        if line.starts_with(OK_TOKEN) {
            Self::Ok
        } else if line.starts_with(COMMAND_PREFIX) {
            Self::Echo(line.to_string())
        } else if line.starts_with(CURRENT_LABEL) || line.starts_with(CLOSING_LABEL) {
            let current = line.starts_with(CURRENT_LABEL);
            match parse_labeled_payload(&line[CURRENT_LABEL.len()..]) {
                Some(payload) if current => Self::CurrentTime(payload),
                Some(payload) => Self::ClosingTime(payload),
                None => Self::Unknown(line.to_string()),
            }
        } else if line == BOOT_BANNER {
            Self::Boot(line.to_string())
        } else if line.starts_with(NOT_SET) {
            Self::AmbiguousTime(None)
        } else if is_time_string(line) {
            // classification already proved validity, so parse cannot fail
            Self::AmbiguousTime(TimeOfDay::parse(line).ok())
        } else {
            Self::Unknown(line.to_string())
        }
    }
}

/// Parse the text after a clock label: the `Not set` sentinel maps to an
/// absent payload, a valid time to a present one. Anything else is `None`,
/// meaning the whole line should fall through to `Unknown`.
fn parse_labeled_payload(rest: &str) -> Option<Option<TimeOfDay>> {
    if rest == NOT_SET {
        Some(None)
    } else if is_time_string(rest) {
        TimeOfDay::parse(rest).ok().map(Some)
    } else {
        None
    }
}
