//! Client for the hackspace variable directory.
//!
//! The directory stores named string values, each with a `last_updated`
//! timestamp that every write touches. Queries read
//! `<base>/<name>.json`, updates hit `<base>/<name>/update?value=<v>`.

use serde_json::Value;

use doorbridge_app::ports::Directory;
use doorbridge_domain::error::BridgeError;

use crate::config::DirectoryConfig;
use crate::error::StatusApiError;

/// Blocking HTTP client for the directory.
pub struct DirectoryClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl DirectoryClient {
    /// Build a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`StatusApiError::Http`] if the underlying client cannot be
    /// constructed.
    pub fn new(config: &DirectoryConfig) -> Result<Self, StatusApiError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            base_url: config.base_url.clone(),
            http,
        })
    }

    fn query_value(&self, name: &str) -> Result<String, StatusApiError> {
        let url = format!("{}{}.json", self.base_url, name);
        let body: Value = self.http.get(url).send()?.error_for_status()?.json()?;
        parse_query_response(name, &body)
    }

    fn update_value(&self, name: &str, value: &str) -> Result<String, StatusApiError> {
        let url = format!("{}{}/update", self.base_url, name);
        let body: Value = self
            .http
            .get(url)
            .query(&[("value", value)])
            .send()?
            .error_for_status()?
            .json()?;
        parse_update_response(name, value, &body)?;
        tracing::info!(%name, %value, "directory variable updated");
        Ok(value.to_string())
    }
}

impl Directory for DirectoryClient {
    fn query(&self, name: &str) -> Result<String, BridgeError> {
        Ok(self.query_value(name)?)
    }

    fn update(&self, name: &str, value: &str) -> Result<String, BridgeError> {
        Ok(self.update_value(name, value)?)
    }
}

/// Expected shape: `{"last_updated":<ts>,"name":"<name>","value":"<value>"}`.
fn parse_query_response(name: &str, body: &Value) -> Result<String, StatusApiError> {
    if body.get("name").and_then(Value::as_str) != Some(name) {
        return Err(StatusApiError::UnexpectedResponse(format!(
            "query did not return variable {name:?}"
        )));
    }
    body.get("value")
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| StatusApiError::UnexpectedResponse("query response has no value".to_string()))
}

/// Expected shape:
/// `{"result":{"value":"<v>","last_updated":<ts>,"name":"<n>"},"status":"OK"}`.
fn parse_update_response(name: &str, value: &str, body: &Value) -> Result<(), StatusApiError> {
    let confirmed = body.get("status").and_then(Value::as_str) == Some("OK")
        && body.pointer("/result/name").and_then(Value::as_str) == Some(name)
        && body.pointer("/result/value").and_then(Value::as_str) == Some(value);
    if confirmed {
        Ok(())
    } else {
        Err(StatusApiError::UnexpectedResponse(format!(
            "update of {name:?} was not confirmed"
        )))
    }
}
