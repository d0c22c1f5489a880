use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bluelight_slack::{DeployStatusHandler, InvocationContext, WebhookEvent, WebhookResponse};
use tracing::warn;

use crate::bootstrap::Application;
use crate::health::{self, HealthState};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct CommandState {
    handler: DeployStatusHandler,
}

pub fn router(app: &Application) -> Router {
    command_router(app.handler.clone())
        .merge(health::router(HealthState::from_config(&app.config)))
}

pub fn command_router(handler: DeployStatusHandler) -> Router {
    Router::new()
        .route("/slack/commands", post(slash_command))
        .route("/invoke", post(invoke))
        .with_state(CommandState { handler })
}

/// Slack posts the raw form body here.
async fn slash_command(
    State(state): State<CommandState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let context = context_from_headers(&headers);
    let event = WebhookEvent::form(String::from_utf8_lossy(&body));
    into_http(state.handler.handle(event, &context).await)
}

/// Gateway-style invocation: a JSON event in, the JSON envelope out.
async fn invoke(
    State(state): State<CommandState>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<WebhookResponse> {
    let context = context_from_headers(&headers);
    let event = serde_json::from_slice::<WebhookEvent>(&body).unwrap_or_else(|error| {
        warn!(
            event_name = "system.invoke.event_rejected",
            correlation_id = %context.request_id,
            error = %error,
            "invocation event could not be parsed; treating as empty"
        );
        WebhookEvent::default()
    });
    Json(state.handler.handle(event, &context).await)
}

fn context_from_headers(headers: &HeaderMap) -> InvocationContext {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .map(InvocationContext::with_request_id)
        .unwrap_or_default()
}

fn into_http(response: WebhookResponse) -> Response {
    let status = StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::OK);
    let mut http = (status, response.body).into_response();

    for (name, value) in &response.headers {
        match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
            (Ok(name), Ok(value)) => {
                http.headers_mut().insert(name, value);
            }
            _ => warn!(
                event_name = "system.response.header_skipped",
                header = %name,
                "response header is not valid HTTP and was dropped"
            ),
        }
    }

    http
}
