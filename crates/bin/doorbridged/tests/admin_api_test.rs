//! End-to-end tests for the wired admin endpoint.
//!
//! Each test builds the real axum router over a scripted in-memory device
//! link and exercises the HTTP layer via `tower::ServiceExt::oneshot` — no
//! TCP port is bound and no serial hardware is needed.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use doorbridge_adapter_http_axum::{router, AdminState};
use doorbridge_app::ports::DeviceLink;
use doorbridge_domain::clock::ClockId;
use doorbridge_domain::error::BridgeError;
use doorbridge_domain::message::DeviceMessage;
use doorbridge_domain::time::TimeOfDay;

/// Records every command written to the serial line, as wire text.
#[derive(Default)]
struct RecordingLink {
    commands: Vec<String>,
}

impl DeviceLink for RecordingLink {
    fn clear_buffers(&mut self) -> Result<(), BridgeError> {
        Ok(())
    }

    fn has_pending_input(&mut self) -> Result<bool, BridgeError> {
        Ok(false)
    }

    fn handshake(
        &mut self,
        _timeout: Duration,
        _retry_interval: Duration,
    ) -> Result<bool, BridgeError> {
        Ok(true)
    }

    fn read_message(&mut self) -> Result<DeviceMessage, BridgeError> {
        Ok(DeviceMessage::Unknown(String::new()))
    }

    fn request_clock_time(&mut self, clock: ClockId) -> Result<(), BridgeError> {
        self.commands.push(format!("ATST{clock}?"));
        Ok(())
    }

    fn set_clock_time(&mut self, clock: ClockId, time: TimeOfDay) -> Result<(), BridgeError> {
        self.commands.push(format!("ATST{clock}={time}"));
        Ok(())
    }

    fn clear_clock_time(&mut self, clock: ClockId) -> Result<(), BridgeError> {
        self.commands.push(format!("ATST{clock}=X"));
        Ok(())
    }
}

fn app() -> (axum::Router, Arc<Mutex<RecordingLink>>) {
    let link = Arc::new(Mutex::new(RecordingLink::default()));
    (router::build(AdminState::new(Arc::clone(&link))), link)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn should_describe_the_api_at_the_root() {
    let (app, link) = app();

    let (status, body) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/set/open/15:30"));
    assert!(body.contains("/set/closed"));
    assert!(link.lock().unwrap().commands.is_empty());
}

#[tokio::test]
async fn should_write_the_closing_clock_over_the_wire() {
    let (app, link) = app();

    let (status, body) = get(app, "/set/open/15:30").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("15:30:00"));
    assert_eq!(link.lock().unwrap().commands, vec!["ATST1=15:30:00"]);
}

#[tokio::test]
async fn should_clear_the_closing_clock_over_the_wire() {
    let (app, link) = app();

    let (status, _body) = get(app, "/set/closed").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(link.lock().unwrap().commands, vec!["ATST1=X"]);
}

#[tokio::test]
async fn should_not_touch_the_wire_for_invalid_input() {
    let (app, link) = app();

    let (status, _body) = get(app, "/set/open/99:99").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(link.lock().unwrap().commands.is_empty());
}
