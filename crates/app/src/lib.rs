//! # doorbridge-app
//!
//! Application core — **port definitions** (traits) and the bridge logic.
//!
//! ## Responsibilities
//! - Define the port traits that adapters implement:
//!   - `DeviceLink` — the serial channel to the clock/door device
//!   - `Directory` — the hackspace variable store (boot history, local IP)
//!   - `DoorStatusService` — the public open/closed status page
//! - Decide, for each classified device message, what the bridge should do
//!   (the dispatcher)
//! - Own the control loop: one sequential tick that drains serial input,
//!   resynchronizes the device clock, and pushes heartbeats
//!
//! ## Dependency rule
//! Depends on `doorbridge-domain` only. Never imports adapter crates;
//! adapters depend on *this* crate, not the reverse.

pub mod bridge;
pub mod dispatch;
pub mod ports;
