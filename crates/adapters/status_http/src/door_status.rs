//! Client for the public door-status page.
//!
//! Queries `GET <base>` for the full status document; updates
//! `POST <base>{open|closed}` with an API key and, for `open`, the
//! `until` closing time. The server de-duplicates identical updates, so
//! heartbeat re-sends are harmless.

use serde_json::Value;

use doorbridge_app::ports::DoorStatusService;
use doorbridge_domain::error::BridgeError;
use doorbridge_domain::status::DoorStatus;

use crate::config::DoorStatusConfig;
use crate::error::StatusApiError;

/// Blocking HTTP client for the door-status service.
pub struct DoorStatusClient {
    base_url: String,
    api_key: String,
    http: reqwest::blocking::Client,
}

impl DoorStatusClient {
    /// Build a client, rejecting a missing API key up front.
    ///
    /// # Errors
    ///
    /// Returns [`StatusApiError::MissingApiKey`] when no key is configured,
    /// or [`StatusApiError::Http`] if the underlying client cannot be
    /// constructed.
    pub fn new(config: &DoorStatusConfig) -> Result<Self, StatusApiError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or(StatusApiError::MissingApiKey)?;
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            base_url: config.base_url.clone(),
            api_key,
            http,
        })
    }

    fn query_document(&self) -> Result<Value, StatusApiError> {
        Ok(self
            .http
            .get(&self.base_url)
            .send()?
            .error_for_status()?
            .json()?)
    }

    fn post_status(&self, status: &DoorStatus) -> Result<(), StatusApiError> {
        let url = format!("{}{}", self.base_url, status.wire_status());
        let until = status.open_until_hhmm().unwrap_or_default();
        let form = [("key", self.api_key.as_str()), ("until", until.as_str())];
        let body: Value = self
            .http
            .post(url)
            .form(&form)
            .send()?
            .error_for_status()?
            .json()?;
        parse_update_response(status, &body)?;
        tracing::info!(status = %status, "door status published");
        Ok(())
    }
}

impl DoorStatusService for DoorStatusClient {
    fn query(&self) -> Result<Value, BridgeError> {
        Ok(self.query_document()?)
    }

    fn update(&self, status: &DoorStatus) -> Result<(), BridgeError> {
        Ok(self.post_status(status)?)
    }
}

/// Expected shape:
/// `{"result":"ok","status":"open","last":"…","openUntil":"…"}` — the
/// server must echo the status we asked for. The `openUntil` value is
/// trusted as-is.
fn parse_update_response(status: &DoorStatus, body: &Value) -> Result<(), StatusApiError> {
    let confirmed = body.get("result").and_then(Value::as_str) == Some("ok")
        && body.get("status").and_then(Value::as_str) == Some(status.wire_status());
    if confirmed {
        Ok(())
    } else {
        Err(StatusApiError::UnexpectedResponse(format!(
            "update to {} was not confirmed",
            status.wire_status()
        )))
    }
}
