//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`BridgeError`]
//! at port boundaries via `#[from]` / `Box<dyn Error>`.

/// Top-level error for the bridge core.
///
/// Nothing in the core is fatal: the control loop converts any of these into
/// a logged event plus a cooldown and keeps ticking.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A time string did not match the device's `HH:MM:SS` format.
    #[error("invalid time string")]
    Format(#[from] FormatError),

    /// The serial link failed (open, read, or write).
    #[error("serial link error")]
    Link(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A status-service call failed. Recovered by skipping the update for
    /// the current cycle and retrying on the next one.
    #[error("status service error")]
    Service(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Malformed time string, recovered locally by rejecting the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The string does not have the `HH:MM:SS` shape.
    #[error("expected HH:MM:SS, got {0:?}")]
    Syntax(String),

    /// The shape was right but a component is out of range.
    #[error("time component out of range in {0:?}")]
    OutOfRange(String),
}
