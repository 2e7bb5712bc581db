//! Status-service adapter error types.

use doorbridge_domain::error::BridgeError;

/// Errors specific to the status-service HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum StatusApiError {
    /// No API key was configured for the door-status service. Surfaces at
    /// construction time so startup can handle it as data.
    #[error("missing API key for the door status service")]
    MissingApiKey,

    /// The HTTP request itself failed (connect, timeout, non-2xx via
    /// `error_for_status`, body decode).
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// The call went through but the body did not confirm the operation.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<StatusApiError> for BridgeError {
    fn from(err: StatusApiError) -> Self {
        Self::Service(Box::new(err))
    }
}
