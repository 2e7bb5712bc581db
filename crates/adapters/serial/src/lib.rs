//! # doorbridge-adapter-serial
//!
//! Serial adapter — implements the [`DeviceLink`] port over a real serial
//! port via the `serialport` crate.
//!
//! ## Responsibilities
//! - Own the serial channel: fixed baud, line-buffered, bounded reads
//! - Encode the device's `AT` command set (probe, query, set, clear)
//! - Read one line at a time and hand it to the domain classifier
//! - Perform the connection-establishment handshake
//!
//! ## Dependency rule
//! Depends on `doorbridge-app` (for the port trait) and
//! `doorbridge-domain` (for messages and times). Never leaks `serialport`
//! types across the port boundary.
//!
//! [`DeviceLink`]: doorbridge_app::ports::DeviceLink

pub mod config;
pub mod error;
pub mod link;

pub use config::SerialConfig;
pub use error::SerialLinkError;
pub use link::SerialLink;
