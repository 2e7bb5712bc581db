//! Message dispatcher — maps a classified device message onto a bridge
//! action.
//!
//! Pure decision logic: the caller supplies the system time-of-day, and the
//! returned [`Action`] says what to do without doing it.

use doorbridge_domain::message::DeviceMessage;
use doorbridge_domain::time::{offset_seconds, TimeOfDay};

/// Maximum allowed divergence between the device clock and the system
/// clock, in seconds, before a resynchronization is triggered.
pub const DRIFT_THRESHOLD_SECS: i32 = 10;

/// What the control loop should do in response to a device message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Expected protocol chatter with no actionable content.
    NoOp,
    /// Write `target` (the system time-of-day) to the device's current
    /// clock.
    SyncClock { target: TimeOfDay },
    /// Propagate door state to the external status service. `None` means
    /// the door is closed.
    ReportDoorStatus(Option<TimeOfDay>),
    /// The device announced a power-on/reset. Beyond logging, the caller
    /// must reset the external status to closed and re-query the current
    /// clock — the device lost its configuration.
    LogBoot,
    /// An unclassifiable line, logged and ignored.
    LogUnknown(String),
}

/// Decide the action for one message.
///
/// `CurrentTime` and `AmbiguousTime` are treated identically: the bridge
/// only ever queries clock 0 for its own purposes, so any unlabeled reply
/// is assumed to be a current-time report. (The one exception — the startup
/// query of the closing clock — reclassifies its reply before dispatching.)
#[must_use]
pub fn dispatch(message: &DeviceMessage, system_now: TimeOfDay) -> Action {
    match message {
        DeviceMessage::CurrentTime(payload) | DeviceMessage::AmbiguousTime(payload) => {
            let needs_sync = match payload {
                // A cleared clock always needs a write.
                None => true,
                Some(device_time) => {
                    offset_seconds(system_now, *device_time).abs() > DRIFT_THRESHOLD_SECS
                }
            };
            if needs_sync {
                Action::SyncClock { target: system_now }
            } else {
                Action::NoOp
            }
        }
        DeviceMessage::ClosingTime(payload) => Action::ReportDoorStatus(*payload),
        DeviceMessage::Ok | DeviceMessage::Echo(_) => Action::NoOp,
        DeviceMessage::Boot(_) => Action::LogBoot,
        DeviceMessage::Unknown(raw) => Action::LogUnknown(raw.clone()),
    }
}
