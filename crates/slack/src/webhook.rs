use std::collections::BTreeMap;

use bluelight_core::FetchCoordinator;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::blocks::SlackMessage;
use crate::commands::{parse_slash_command, SlashCommandPayload};
use crate::status::deploy_status_message;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Inbound invocation in API-gateway proxy shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, rename = "isBase64Encoded", deserialize_with = "null_as_false")]
    pub is_base64_encoded: bool,
}

/// Gateways sometimes send `"isBase64Encoded": null`; treat it as not encoded.
fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl WebhookEvent {
    pub fn form(body: impl Into<String>) -> Self {
        Self { body: Some(body.into()), is_base64_encoded: false }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl WebhookResponse {
    fn json(message: &SlackMessage) -> Self {
        let body = serde_json::to_string(message).unwrap_or_else(|error| {
            json!({
                "response_type": "ephemeral",
                "text": format!("deploy status could not be rendered: {error}"),
            })
            .to_string()
        });

        let headers = BTreeMap::from([("Content-Type".to_owned(), CONTENT_TYPE_JSON.to_owned())]);
        Self { status_code: 200, headers, body }
    }
}

/// Per-invocation metadata. Only used to correlate log lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvocationContext {
    pub request_id: String,
}

impl InvocationContext {
    pub fn new() -> Self {
        Self { request_id: Uuid::new_v4().to_string() }
    }

    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self { request_id: request_id.into() }
    }
}

impl Default for InvocationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Answers a deploy-status slash command.
///
/// The reply is always a 200 with an ephemeral status message; undecodable
/// payloads and failed fetches only change what the message says.
#[derive(Clone)]
pub struct DeployStatusHandler {
    coordinator: FetchCoordinator,
}

impl DeployStatusHandler {
    pub fn new(coordinator: FetchCoordinator) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &FetchCoordinator {
        &self.coordinator
    }

    pub async fn handle(
        &self,
        event: WebhookEvent,
        context: &InvocationContext,
    ) -> WebhookResponse {
        let payload = match event.body.as_deref() {
            Some(body) => parse_slash_command(body, event.is_base64_encoded).unwrap_or_else(
                |error| {
                    warn!(
                        event_name = "slack.command.payload_rejected",
                        correlation_id = %context.request_id,
                        base64 = event.is_base64_encoded,
                        error = %error,
                        "slash command payload could not be decoded"
                    );
                    SlashCommandPayload::default()
                },
            ),
            None => SlashCommandPayload::default(),
        };

        info!(
            event_name = "slack.command.received",
            correlation_id = %context.request_id,
            command = %payload.command,
            text = %payload.text,
            user_id = %payload.user_id,
            channel_id = %payload.channel_id,
            team_id = %payload.team_id,
            "deploy status requested"
        );

        let board = self.coordinator.fetch_all().await;
        let response = WebhookResponse::json(&deploy_status_message(&board));

        info!(
            event_name = "slack.command.responded",
            correlation_id = %context.request_id,
            failures = board.failures(),
            "deploy status reply rendered"
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use bluelight_core::config::SourcesConfig;
    use bluelight_core::{FetchCoordinator, FetchError, StatusFetcher, StatusSource};
    use serde_json::Value;

    use crate::webhook::{DeployStatusHandler, InvocationContext, WebhookEvent, WebhookResponse};

    struct FixedSource(Result<&'static str, &'static str>);

    #[async_trait]
    impl StatusSource for FixedSource {
        async fn get_text(&self, _url: &str) -> Result<String, FetchError> {
            self.0.map(str::to_owned).map_err(|error| FetchError::Transport(error.to_owned()))
        }
    }

    fn handler(source: FixedSource) -> DeployStatusHandler {
        let fetcher = StatusFetcher::new(Arc::new(source), SourcesConfig::default());
        DeployStatusHandler::new(FetchCoordinator::new(fetcher))
    }

    fn body_json(response: &WebhookResponse) -> Value {
        serde_json::from_str(&response.body).expect("body should be JSON")
    }

    #[tokio::test]
    async fn handler_returns_ephemeral_json_with_200() {
        let response = handler(FixedSource(Ok("complete")))
            .handle(WebhookEvent::form("command=/deploy-status"), &InvocationContext::new())
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );

        let body = body_json(&response);
        assert_eq!(body["response_type"], "ephemeral");
        let blocks = body["blocks"].as_array().expect("blocks should be an array");
        assert!(!blocks.is_empty());
        assert_eq!(blocks[0]["type"], "section");
        assert_eq!(blocks[0]["text"]["type"], "mrkdwn");
    }

    #[tokio::test]
    async fn base64_event_body_is_accepted() {
        let event = WebhookEvent {
            body: Some(STANDARD.encode("command=%2Fdeploy-status&text=")),
            is_base64_encoded: true,
        };

        let response =
            handler(FixedSource(Ok("pr"))).handle(event, &InvocationContext::new()).await;

        let body = body_json(&response);
        let text = body["blocks"][0]["text"]["text"].as_str().expect("section text");
        assert!(text.contains("🟦 *Status:* pr"));
    }

    #[tokio::test]
    async fn fetch_failures_still_answer_200_with_red_lines() {
        let response = handler(FixedSource(Err("Connection timeout")))
            .handle(WebhookEvent::default(), &InvocationContext::with_request_id("req-1"))
            .await;

        assert_eq!(response.status_code, 200);
        let body = body_json(&response);
        let text = body["blocks"][0]["text"]["text"].as_str().expect("section text");
        assert_eq!(text.lines().count(), 5);
        assert!(text
            .lines()
            .all(|line| line.starts_with("🟥") && line.ends_with("Connection timeout")));
    }

    #[tokio::test]
    async fn undecodable_body_does_not_change_status_code() {
        let event =
            WebhookEvent { body: Some("not base64 at all!".to_owned()), is_base64_encoded: true };

        let response =
            handler(FixedSource(Ok("complete"))).handle(event, &InvocationContext::new()).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(body_json(&response)["response_type"], "ephemeral");
    }

    #[test]
    fn event_deserializes_from_gateway_field_names() {
        let event: WebhookEvent =
            serde_json::from_str(r#"{"body":"command=%2Fdeploy-status","isBase64Encoded":false}"#)
                .expect("event should parse");

        assert_eq!(event, WebhookEvent::form("command=%2Fdeploy-status"));

        let bare: WebhookEvent = serde_json::from_str("{}").expect("empty event should parse");
        assert_eq!(bare, WebhookEvent::default());
    }

    #[test]
    fn null_base64_flag_keeps_the_body() {
        let event: WebhookEvent =
            serde_json::from_str(r#"{"body":"command=%2Fdeploy-status","isBase64Encoded":null}"#)
                .expect("null flag should parse");

        assert_eq!(event, WebhookEvent::form("command=%2Fdeploy-status"));
    }
}
