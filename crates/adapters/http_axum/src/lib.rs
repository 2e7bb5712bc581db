//! # doorbridge-adapter-http-axum
//!
//! The LAN admin endpoint — three routes that forward straight into the
//! device link:
//!
//! - `GET /` — static help text
//! - `GET /set/open/{time}` — set the closing clock (door open until)
//! - `GET /set/closed` — clear the closing clock (door closed)
//!
//! Intended for the local network only, never the open internet. Handlers
//! only *issue* commands; the device's replies are drained and dispatched
//! by the control loop, which also propagates the resulting status to the
//! public page.
//!
//! ## Dependency rule
//! Depends on `doorbridge-app` (the `DeviceLink` port) and
//! `doorbridge-domain`. Never leaks axum types into the core.

pub mod router;
pub mod state;

pub use state::AdminState;
