//! Axum router and handlers for the admin endpoint.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use doorbridge_app::ports::DeviceLink;
use doorbridge_domain::clock::ClockId;
use doorbridge_domain::time::{is_time_string, TimeOfDay};

use crate::state::AdminState;

const HELP_TEXT: &str = "SpaceTime REST API\r\n\
    /set/open/15:30 - Sets SpaceTime to stay open until 15:30\r\n\
    /set/closed     - Sets SpaceTime to closed";

/// Build the admin [`Router`], with request tracing.
pub fn build<L>(state: AdminState<L>) -> Router
where
    L: DeviceLink + Send + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/set/open/{time}", get(set_open::<L>))
        .route("/set/closed", get(set_closed::<L>))
        .route("/set/close", get(set_closed::<L>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> &'static str {
    HELP_TEXT
}

/// Set the closing clock. Accepts `H:MM`, `HH:MM`, or the bare `HMM`/`HHMM`
/// digits; seconds are always zero.
async fn set_open<L>(
    State(state): State<AdminState<L>>,
    Path(time): Path<String>,
) -> (StatusCode, String)
where
    L: DeviceLink + Send + 'static,
{
    let Some(closing) = parse_open_until(&time) else {
        return (
            StatusCode::BAD_REQUEST,
            format!("{time} is not a valid time."),
        );
    };

    match state.lock_link().set_clock_time(ClockId::Closing, closing) {
        Ok(()) => (StatusCode::OK, format!("SpaceTime set to {closing}.")),
        Err(err) => {
            tracing::error!(error = %err, "failed to set the closing clock");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "serial link unavailable".to_string(),
            )
        }
    }
}

/// Clear the closing clock.
async fn set_closed<L>(State(state): State<AdminState<L>>) -> (StatusCode, String)
where
    L: DeviceLink + Send + 'static,
{
    match state.lock_link().clear_clock_time(ClockId::Closing) {
        Ok(()) => (StatusCode::OK, "SpaceTime set to closed.".to_string()),
        Err(err) => {
            tracing::error!(error = %err, "failed to clear the closing clock");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "serial link unavailable".to_string(),
            )
        }
    }
}

/// Normalize admin input into a closing time: zero-pad the hour, append
/// `:00` seconds, and validate the result with the same predicate the
/// serial classifier uses.
fn parse_open_until(raw: &str) -> Option<TimeOfDay> {
    let (hours, minutes) = match raw.split_once(':') {
        Some((h, m)) => (h, m),
        // Colon optional: the last two digits are the minutes.
        None if raw.len() >= 3 && raw.bytes().all(|b| b.is_ascii_digit()) => {
            raw.split_at(raw.len() - 2)
        }
        None => return None,
    };
    if hours.is_empty() || hours.len() > 2 {
        return None;
    }
    let candidate = format!("{hours:0>2}:{minutes}:00");
    if is_time_string(&candidate) {
        TimeOfDay::parse(&candidate).ok()
    } else {
        None
    }
}
