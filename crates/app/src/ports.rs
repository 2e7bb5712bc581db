//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside
//! world. They are defined here so that both the control loop and the
//! adapter layer can depend on them without creating circular dependencies.
//!
//! All ports are synchronous: the core is one sequential thread that owns
//! the serial channel and all timers. Blocking points (serial reads, HTTP
//! calls) are bounded by their own timeouts, never caller-cancellable.

use std::thread;
use std::time::Duration;

use doorbridge_domain::clock::ClockId;
use doorbridge_domain::error::BridgeError;
use doorbridge_domain::message::DeviceMessage;
use doorbridge_domain::status::DoorStatus;
use doorbridge_domain::time::TimeOfDay;

/// Initial backoff when waiting for a status service to become reachable.
const BACKOFF_INITIAL: Duration = Duration::from_millis(250);
/// Backoff ceiling.
const BACKOFF_MAX: Duration = Duration::from_secs(16);

/// The serial channel to the device.
///
/// Commands are fire-and-forget: the device answers asynchronously, and
/// replies are picked up by [`read_message`](Self::read_message) on a later
/// tick. A malformed or unexpected line never surfaces as an error — it
/// degrades to [`DeviceMessage::Unknown`] and is logged by the caller.
pub trait DeviceLink {
    /// Drain pending output, flush the device's own input buffer with a
    /// bare line terminator, wait a settle delay, then discard both local
    /// buffers. Fresh-start contexts only, never the hot path.
    fn clear_buffers(&mut self) -> Result<(), BridgeError>;

    /// Non-blocking check for at least one byte waiting to be read.
    fn has_pending_input(&mut self) -> Result<bool, BridgeError>;

    /// Probe the device until it acknowledges or `timeout` elapses.
    ///
    /// Sends the probe command every `retry_interval` and scans buffered
    /// lines for the acknowledgement; on a match the buffers are cleared.
    /// Failure is reported as `false`, not an error, so startup logic can
    /// retry indefinitely while the device is mid-boot or unpowered.
    ///
    /// # Errors
    ///
    /// Only transport failures (the port disappearing) are errors.
    fn handshake(
        &mut self,
        timeout: Duration,
        retry_interval: Duration,
    ) -> Result<bool, BridgeError>;

    /// Blocking read of exactly one line, bounded by the channel timeout.
    /// A timeout yields the empty line, classified `Unknown`.
    fn read_message(&mut self) -> Result<DeviceMessage, BridgeError>;

    /// Ask the device to report the given clock. The reply arrives
    /// asynchronously: an echo of the command, then an unlabeled time.
    fn request_clock_time(&mut self, clock: ClockId) -> Result<(), BridgeError>;

    /// Write the given time to the given clock. The device confirms with a
    /// labeled report.
    fn set_clock_time(&mut self, clock: ClockId, time: TimeOfDay) -> Result<(), BridgeError>;

    /// Clear the given clock. The device confirms with a labeled
    /// "not set" report.
    fn clear_clock_time(&mut self, clock: ClockId) -> Result<(), BridgeError>;
}

/// The hackspace variable store (named string variables with timestamps).
///
/// Failures are data, never fatal: the bridge logs and moves on.
pub trait Directory {
    /// Fetch the current value of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Service`] when the call fails or the response
    /// does not name the queried variable.
    fn query(&self, name: &str) -> Result<String, BridgeError>;

    /// Set `name` to `value`, returning the confirmed value.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Service`] when the call fails or the server
    /// does not confirm the written value.
    fn update(&self, name: &str, value: &str) -> Result<String, BridgeError>;

    /// Update only when the stored value differs. Each variable carries a
    /// server-side timestamp that every write touches, so needless writes
    /// are worth avoiding.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Service`] when the update fails. A failed
    /// pre-read falls through to a plain update.
    fn update_if_necessary(&self, name: &str, value: &str) -> Result<(), BridgeError> {
        match self.query(name) {
            Ok(current) if current == value => Ok(()),
            _ => self.update(name, value).map(|_| ()),
        }
    }

    /// Block until a query for `probe` succeeds, with exponential backoff.
    fn wait_until_reachable(&self, probe: &str) {
        let mut delay = BACKOFF_INITIAL;
        while let Err(err) = self.query(probe) {
            tracing::warn!(error = %err, delay = ?delay, "directory unreachable, waiting");
            thread::sleep(delay);
            if delay < BACKOFF_MAX {
                delay *= 2;
            }
        }
    }
}

/// The public open/closed status page.
pub trait DoorStatusService {
    /// Fetch the full status document.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Service`] when the call fails.
    fn query(&self) -> Result<serde_json::Value, BridgeError>;

    /// Publish the given door status. The service de-duplicates repeated
    /// identical updates itself, so re-sending the cached status as a
    /// heartbeat is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Service`] when the call fails or the server
    /// does not confirm the requested status.
    fn update(&self, status: &DoorStatus) -> Result<(), BridgeError>;

    /// Block until a query succeeds, with exponential backoff.
    fn wait_until_reachable(&self) {
        let mut delay = BACKOFF_INITIAL;
        while let Err(err) = self.query() {
            tracing::warn!(error = %err, delay = ?delay, "status service unreachable, waiting");
            thread::sleep(delay);
            if delay < BACKOFF_MAX {
                delay *= 2;
            }
        }
    }
}
