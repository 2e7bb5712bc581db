//! # doorbridge-domain
//!
//! Pure domain model for the doorbridge serial-to-web bridge.
//!
//! ## Responsibilities
//! - Define **times-of-day** and the circular arithmetic used to compare the
//!   device clock against the system clock
//! - Define the **device message** vocabulary and the total, syntactic
//!   classifier that maps every serial line onto exactly one message kind
//! - Define **clock identifiers** (the device's two logical clocks) and the
//!   **door status** value propagated to external services
//! - Define error conventions for the workspace
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod clock;
pub mod error;
pub mod message;
pub mod status;
pub mod time;
