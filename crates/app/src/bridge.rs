//! The control loop — one sequential tick that owns the serial link and all
//! timers.
//!
//! Tick priority, strictly in order: drain one pending serial message, else
//! issue a periodic clock-sync query, else push a heartbeat, else idle.
//! Draining comes first so that backlog never accumulates behind idle waits.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Timelike;

use doorbridge_domain::clock::ClockId;
use doorbridge_domain::error::BridgeError;
use doorbridge_domain::message::DeviceMessage;
use doorbridge_domain::status::DoorStatus;
use doorbridge_domain::time::TimeOfDay;

use crate::dispatch::{dispatch, Action};
use crate::ports::{DeviceLink, Directory, DoorStatusService};

/// Directory variable holding the bridge's local IP. Its server-side
/// timestamp doubles as a boot history.
pub const IP_VARIABLE: &str = "spacetime_ip";

/// Resynchronize the device clock this often.
const CLOCK_SYNC_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
/// Re-push the cached door status this often.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15 * 60);
/// Steady-state tick cadence.
const TICK_IDLE: Duration = Duration::from_secs(1);
/// Pause after a clock-sync query so the reply drains before the next tick
/// can issue a second query.
const POST_SYNC_PAUSE: Duration = Duration::from_millis(500);
/// Cooldown after an unhandled tick failure.
const FAULT_COOLDOWN: Duration = Duration::from_secs(5);
/// Per-attempt bound for the startup handshake.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
/// Probe spacing within one handshake attempt.
const HANDSHAKE_RETRY: Duration = Duration::from_millis(250);

/// Explicit control-loop state, initialized at startup and never persisted.
///
/// Both timers start unset, which makes a sync and a heartbeat immediately
/// eligible on the first ticks.
#[derive(Debug, Default)]
pub struct BridgeState {
    last_clock_sync: Option<Instant>,
    last_heartbeat: Option<Instant>,
    door_status: DoorStatus,
}

impl BridgeState {
    /// Whether a periodic clock sync is due: more than 24 h since the last
    /// one, and the system clock's seconds-in-minute strictly between 40
    /// and 50. The narrow window avoids writing just as the device's own
    /// seconds roll over a minute boundary, which would risk an
    /// off-by-one-minute clock.
    #[must_use]
    fn clock_sync_due(&self, now: Instant, second_in_minute: u8) -> bool {
        interval_elapsed(self.last_clock_sync, now, CLOCK_SYNC_INTERVAL)
            && second_in_minute > 40
            && second_in_minute < 50
    }

    #[must_use]
    fn heartbeat_due(&self, now: Instant) -> bool {
        interval_elapsed(self.last_heartbeat, now, HEARTBEAT_INTERVAL)
    }

    /// Cached last-known door status, re-pushed by heartbeats.
    #[must_use]
    pub fn door_status(&self) -> DoorStatus {
        self.door_status
    }
}

fn interval_elapsed(last: Option<Instant>, now: Instant, interval: Duration) -> bool {
    match last {
        None => true,
        Some(at) => now.duration_since(at) > interval,
    }
}

/// The bridge between the serial device and the web status services.
///
/// The serial link is shared with the admin endpoint behind a mutex: the
/// admin side only issues commands, and this loop drains every reply, so
/// all access to the line-based protocol stays serialized.
pub struct Bridge<L, D, S> {
    link: Arc<Mutex<L>>,
    directory: D,
    status_service: S,
    state: BridgeState,
}

impl<L, D, S> Bridge<L, D, S>
where
    L: DeviceLink,
    D: Directory,
    S: DoorStatusService,
{
    pub fn new(link: Arc<Mutex<L>>, directory: D, status_service: S) -> Self {
        Self {
            link,
            directory,
            status_service,
            state: BridgeState::default(),
        }
    }

    /// One-time startup sequence, run before steady-state ticks begin.
    ///
    /// Waits for both web services, publishes the local IP to the
    /// directory, retries the device handshake until it succeeds, invokes
    /// `on_ready` (the signal to start the admin endpoint), then queries
    /// the closing clock once — so the public status is correct even if
    /// only the bridge process restarted — and finally issues the clock-0
    /// query that begins steady-state synchronization.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Link`] if the serial transport fails outright.
    /// Handshake refusals and status-service failures are retried or
    /// logged, never returned.
    pub fn startup(&mut self, local_ip: &str, on_ready: impl FnOnce()) -> Result<(), BridgeError> {
        tracing::info!("waiting for the web services");
        self.status_service.wait_until_reachable();
        self.directory.wait_until_reachable(IP_VARIABLE);

        // A plain update, not update-if-necessary: the variable's
        // server-side timestamp is the boot history, and it should record
        // this boot even when the IP is unchanged.
        if let Err(err) = self.directory.update(IP_VARIABLE, local_ip) {
            tracing::warn!(error = %err, "failed to publish local IP to the directory");
        }

        tracing::info!("initializing the serial connection");
        while !self
            .lock_link()
            .handshake(HANDSHAKE_TIMEOUT, HANDSHAKE_RETRY)?
        {
            tracing::warn!("device did not acknowledge, retrying handshake");
        }
        tracing::info!("device acknowledged");

        on_ready();

        // Query the closing clock, this once, in case the bridge rebooted
        // while the device kept running. The reply is unlabeled, but we
        // know which clock we asked about.
        let reply = {
            let mut link = self.lock_link();
            link.request_clock_time(ClockId::Closing)?;
            let echo = link.read_message()?;
            tracing::debug!(?echo, "consumed command echo");
            link.read_message()?
        };
        let reply = match reply {
            DeviceMessage::AmbiguousTime(payload) => DeviceMessage::ClosingTime(payload),
            other => other,
        };
        self.handle_message(&reply)?;

        // Its reply will trigger a resync if the clock has drifted.
        self.lock_link().request_clock_time(ClockId::Current)?;
        Ok(())
    }

    /// Tick forever. Any tick failure is logged and followed by a fixed
    /// cooldown; the loop itself never terminates.
    pub fn run(&mut self) -> ! {
        loop {
            if let Err(err) = self.tick() {
                tracing::error!(error = %err, "tick failed, cooling down");
                thread::sleep(FAULT_COOLDOWN);
            }
        }
    }

    /// One steady-state tick against the real clocks.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Link`] on serial transport failure.
    pub fn tick(&mut self) -> Result<(), BridgeError> {
        self.tick_at(Instant::now(), system_time_of_day())
    }

    fn tick_at(&mut self, now: Instant, system_now: TimeOfDay) -> Result<(), BridgeError> {
        if self.lock_link().has_pending_input()? {
            let message = self.lock_link().read_message()?;
            self.handle_message_at(&message, now, system_now)?;
        } else if self.state.clock_sync_due(now, system_now.second()) {
            self.lock_link().request_clock_time(ClockId::Current)?;
            // Give the device time to respond so only one query is issued
            // per sync period.
            thread::sleep(POST_SYNC_PAUSE);
        } else if self.state.heartbeat_due(now) {
            tracing::info!(status = %self.state.door_status, "sending heartbeat");
            self.push_door_status(self.state.door_status, now);
        } else {
            thread::sleep(TICK_IDLE);
        }
        Ok(())
    }

    fn handle_message(&mut self, message: &DeviceMessage) -> Result<(), BridgeError> {
        self.handle_message_at(message, Instant::now(), system_time_of_day())
    }

    fn handle_message_at(
        &mut self,
        message: &DeviceMessage,
        now: Instant,
        system_now: TimeOfDay,
    ) -> Result<(), BridgeError> {
        // Any current-time report counts as a sync checkpoint, whether or
        // not it leads to a write.
        if matches!(
            message,
            DeviceMessage::CurrentTime(_) | DeviceMessage::AmbiguousTime(_)
        ) {
            self.state.last_clock_sync = Some(now);
        }

        match dispatch(message, system_now) {
            Action::NoOp => Ok(()),
            Action::SyncClock { target } => {
                tracing::info!(%target, "synchronizing the device clock");
                self.lock_link().set_clock_time(ClockId::Current, target)
            }
            Action::ReportDoorStatus(closing) => {
                let status = DoorStatus::from_closing_time(closing);
                tracing::info!(%status, "device reports door status");
                self.push_door_status(status, now);
                Ok(())
            }
            Action::LogBoot => {
                tracing::warn!("device has reset, restoring its state");
                self.push_door_status(DoorStatus::Closed, now);
                self.lock_link().request_clock_time(ClockId::Current)
            }
            Action::LogUnknown(raw) => {
                tracing::debug!(line = %raw, "serial message ignored");
                Ok(())
            }
        }
    }

    /// Cache the status, stamp the heartbeat timer, and push to the status
    /// service. A failed push is logged and skipped — the next heartbeat
    /// retries it.
    fn push_door_status(&mut self, status: DoorStatus, now: Instant) {
        self.state.last_heartbeat = Some(now);
        self.state.door_status = status;
        if let Err(err) = self.status_service.update(&status) {
            tracing::warn!(error = %err, %status, "door status update failed, will retry");
        }
    }

    fn lock_link(&self) -> std::sync::MutexGuard<'_, L> {
        self.link.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The system clock as a time-of-day, in local time — the device clock has
/// no notion of time zones or dates.
#[must_use]
pub fn system_time_of_day() -> TimeOfDay {
    let now = chrono::Local::now().time();
    TimeOfDay::new(now.hour() as u8, now.minute() as u8, now.second() as u8)
        .unwrap_or(TimeOfDay::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn t(h: u8, m: u8, s: u8) -> TimeOfDay {
        TimeOfDay::new(h, m, s).unwrap()
    }

    #[derive(Debug, PartialEq, Eq)]
    enum Sent {
        Request(ClockId),
        Set(ClockId, TimeOfDay),
        Clear(ClockId),
    }

    #[derive(Default)]
    struct FakeLink {
        script: VecDeque<DeviceMessage>,
        sent: Vec<Sent>,
        handshakes: u32,
    }

    impl FakeLink {
        fn scripted(messages: impl IntoIterator<Item = DeviceMessage>) -> Arc<Mutex<Self>> {
            Arc::new(Mutex::new(Self {
                script: messages.into_iter().collect(),
                ..Self::default()
            }))
        }
    }

    impl DeviceLink for FakeLink {
        fn clear_buffers(&mut self) -> Result<(), BridgeError> {
            Ok(())
        }

        fn has_pending_input(&mut self) -> Result<bool, BridgeError> {
            Ok(!self.script.is_empty())
        }

        fn handshake(
            &mut self,
            _timeout: Duration,
            _retry_interval: Duration,
        ) -> Result<bool, BridgeError> {
            self.handshakes += 1;
            Ok(true)
        }

        fn read_message(&mut self) -> Result<DeviceMessage, BridgeError> {
            Ok(self
                .script
                .pop_front()
                .unwrap_or(DeviceMessage::Unknown(String::new())))
        }

        fn request_clock_time(&mut self, clock: ClockId) -> Result<(), BridgeError> {
            self.sent.push(Sent::Request(clock));
            Ok(())
        }

        fn set_clock_time(&mut self, clock: ClockId, time: TimeOfDay) -> Result<(), BridgeError> {
            self.sent.push(Sent::Set(clock, time));
            Ok(())
        }

        fn clear_clock_time(&mut self, clock: ClockId) -> Result<(), BridgeError> {
            self.sent.push(Sent::Clear(clock));
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct FakeDirectory {
        updates: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl Directory for FakeDirectory {
        fn query(&self, _name: &str) -> Result<String, BridgeError> {
            Ok(String::new())
        }

        fn update(&self, name: &str, value: &str) -> Result<String, BridgeError> {
            self.updates
                .lock()
                .unwrap()
                .push((name.to_string(), value.to_string()));
            Ok(value.to_string())
        }
    }

    #[derive(Clone, Default)]
    struct FakeStatusService {
        pushed: Arc<Mutex<Vec<(String, Option<String>)>>>,
        failing: bool,
    }

    impl DoorStatusService for FakeStatusService {
        fn query(&self) -> Result<serde_json::Value, BridgeError> {
            Ok(serde_json::json!({"status": "closed"}))
        }

        fn update(&self, status: &DoorStatus) -> Result<(), BridgeError> {
            if self.failing {
                return Err(BridgeError::Service("down".into()));
            }
            self.pushed
                .lock()
                .unwrap()
                .push((status.wire_status().to_string(), status.open_until_hhmm()));
            Ok(())
        }
    }

    fn bridge(
        link: Arc<Mutex<FakeLink>>,
    ) -> (Bridge<FakeLink, FakeDirectory, FakeStatusService>, FakeDirectory, FakeStatusService)
    {
        let directory = FakeDirectory::default();
        let status = FakeStatusService::default();
        (
            Bridge::new(link, directory.clone(), status.clone()),
            directory,
            status,
        )
    }

    #[test]
    fn should_resolve_startup_closing_query_to_closed() {
        // Device answers the startup closing-clock query with a bare
        // "Not set" — ambiguous on the wire, resolved by context.
        let link = FakeLink::scripted([
            DeviceMessage::Echo("ATST1?".to_string()),
            DeviceMessage::AmbiguousTime(None),
        ]);
        let (mut bridge, directory, status) = bridge(Arc::clone(&link));

        let mut ready = false;
        bridge.startup("10.0.0.7", || ready = true).unwrap();

        assert!(ready);
        assert_eq!(
            directory.updates.lock().unwrap().as_slice(),
            &[(IP_VARIABLE.to_string(), "10.0.0.7".to_string())]
        );
        assert_eq!(
            status.pushed.lock().unwrap().as_slice(),
            &[("closed".to_string(), None)]
        );
        let link = link.lock().unwrap();
        assert_eq!(link.handshakes, 1);
        assert_eq!(
            link.sent,
            vec![Sent::Request(ClockId::Closing), Sent::Request(ClockId::Current)]
        );
    }

    #[test]
    fn should_report_open_until_from_startup_closing_query() {
        let link = FakeLink::scripted([
            DeviceMessage::Echo("ATST1?".to_string()),
            DeviceMessage::AmbiguousTime(Some(t(15, 30, 0))),
        ]);
        let (mut bridge, _directory, status) = bridge(Arc::clone(&link));

        bridge.startup("10.0.0.7", || {}).unwrap();

        assert_eq!(
            status.pushed.lock().unwrap().as_slice(),
            &[("open".to_string(), Some("15:30".to_string()))]
        );
    }

    #[test]
    fn should_push_door_status_when_device_reports_closing_time() {
        let link = FakeLink::scripted([DeviceMessage::ClosingTime(Some(t(15, 30, 45)))]);
        let (mut bridge, _directory, status) = bridge(Arc::clone(&link));

        bridge.tick_at(Instant::now(), t(12, 0, 0)).unwrap();

        // Seconds are truncated on the wire.
        assert_eq!(
            status.pushed.lock().unwrap().as_slice(),
            &[("open".to_string(), Some("15:30".to_string()))]
        );
        assert_eq!(bridge.state.door_status(), DoorStatus::OpenUntil(t(15, 30, 45)));
        assert!(bridge.state.last_heartbeat.is_some());
    }

    #[test]
    fn should_sync_clock_when_device_time_drifts() {
        let link = FakeLink::scripted([DeviceMessage::CurrentTime(Some(t(4, 10, 0)))]);
        let (mut bridge, _directory, _status) = bridge(Arc::clone(&link));

        bridge.tick_at(Instant::now(), t(4, 10, 15)).unwrap();

        assert_eq!(
            link.lock().unwrap().sent,
            vec![Sent::Set(ClockId::Current, t(4, 10, 15))]
        );
        assert!(bridge.state.last_clock_sync.is_some());
    }

    #[test]
    fn should_not_sync_clock_within_the_drift_threshold() {
        let link = FakeLink::scripted([DeviceMessage::CurrentTime(Some(t(4, 10, 0)))]);
        let (mut bridge, _directory, _status) = bridge(Arc::clone(&link));

        bridge.tick_at(Instant::now(), t(4, 10, 10)).unwrap();

        assert!(link.lock().unwrap().sent.is_empty());
        // The report still counts as a sync checkpoint.
        assert!(bridge.state.last_clock_sync.is_some());
    }

    #[test]
    fn should_reset_status_and_requery_clock_on_boot() {
        let link = FakeLink::scripted([DeviceMessage::Boot("SpaceTime, yay!".to_string())]);
        let (mut bridge, _directory, status) = bridge(Arc::clone(&link));

        bridge.tick_at(Instant::now(), t(12, 0, 0)).unwrap();

        assert_eq!(
            status.pushed.lock().unwrap().as_slice(),
            &[("closed".to_string(), None)]
        );
        assert_eq!(
            link.lock().unwrap().sent,
            vec![Sent::Request(ClockId::Current)]
        );
    }

    #[test]
    fn should_issue_sync_query_inside_the_window() {
        let link = FakeLink::scripted([]);
        let (mut bridge, _directory, _status) = bridge(Arc::clone(&link));
        // Heartbeat timer armed so the sync branch is the one exercised.
        bridge.state.last_heartbeat = Some(Instant::now());

        bridge.tick_at(Instant::now(), t(3, 0, 45)).unwrap();

        assert_eq!(
            link.lock().unwrap().sent,
            vec![Sent::Request(ClockId::Current)]
        );
    }

    #[test]
    fn should_not_issue_sync_query_outside_the_window() {
        let link = FakeLink::scripted([]);
        let (mut bridge, _directory, status) = bridge(Arc::clone(&link));
        bridge.state.last_heartbeat = Some(Instant::now());

        bridge.tick_at(Instant::now(), t(3, 0, 20)).unwrap();

        assert!(link.lock().unwrap().sent.is_empty());
        assert!(status.pushed.lock().unwrap().is_empty());
    }

    #[test]
    fn should_send_heartbeat_with_cached_status_when_due() {
        let link = FakeLink::scripted([]);
        let (mut bridge, _directory, status) = bridge(Arc::clone(&link));
        bridge.state.last_clock_sync = Some(Instant::now());
        bridge.state.door_status = DoorStatus::OpenUntil(t(15, 30, 0));

        // last_heartbeat unset — immediately eligible.
        bridge.tick_at(Instant::now(), t(12, 0, 0)).unwrap();

        assert_eq!(
            status.pushed.lock().unwrap().as_slice(),
            &[("open".to_string(), Some("15:30".to_string()))]
        );
    }

    #[test]
    fn should_not_send_heartbeat_before_the_interval_elapses() {
        let state = BridgeState {
            last_heartbeat: Some(Instant::now()),
            ..BridgeState::default()
        };
        assert!(!state.heartbeat_due(Instant::now()));
    }

    #[test]
    fn should_gate_clock_sync_on_both_interval_and_window() {
        let fresh = BridgeState {
            last_clock_sync: Some(Instant::now()),
            ..BridgeState::default()
        };
        let stale = BridgeState::default();
        let now = Instant::now();

        assert!(stale.clock_sync_due(now, 45));
        assert!(!stale.clock_sync_due(now, 40)); // boundary is strict
        assert!(!stale.clock_sync_due(now, 50));
        assert!(!fresh.clock_sync_due(now, 45));
    }

    #[test]
    fn should_survive_a_failing_status_service() {
        let link = FakeLink::scripted([DeviceMessage::ClosingTime(None)]);
        let directory = FakeDirectory::default();
        let status = FakeStatusService {
            failing: true,
            ..FakeStatusService::default()
        };
        let mut bridge = Bridge::new(Arc::clone(&link), directory, status);

        // The failed push is skipped, not fatal.
        bridge.tick_at(Instant::now(), t(12, 0, 0)).unwrap();
        assert_eq!(bridge.state.door_status(), DoorStatus::Closed);
    }
}
