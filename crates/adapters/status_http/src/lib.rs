//! # doorbridge-adapter-status-http
//!
//! HTTP adapter for the two external status services:
//!
//! - the **directory** — a hackspace variable store holding named values
//!   with server-side timestamps (used for the bridge's local IP, whose
//!   timestamp doubles as a boot history)
//! - the **door status page** — the public open/closed page, updated with
//!   `open?until=HH:MM` / `closed` plus an API key
//!
//! Both clients use bounded timeouts and report failures as values; the
//! core treats every failure as non-fatal and retries on a later cycle.
//!
//! ## Dependency rule
//! Depends on `doorbridge-app` (port traits) and `doorbridge-domain`.
//! Never leaks `reqwest` types across the port boundary.

pub mod config;
pub mod directory;
pub mod door_status;
pub mod error;

pub use config::{DirectoryConfig, DoorStatusConfig};
pub use directory::DirectoryClient;
pub use door_status::DoorStatusClient;
pub use error::StatusApiError;
