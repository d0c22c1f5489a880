use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use bluelight_core::config::AppConfig;
use bluelight_core::Region;
use chrono::Utc;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    sources: Vec<SourceEntry>,
    fetch_timeout_secs: u64,
}

impl HealthState {
    pub fn from_config(config: &AppConfig) -> Self {
        let sources = Region::ALL
            .into_iter()
            .map(|region| SourceEntry {
                region: region.key(),
                url: config.sources.url_for(region).to_owned(),
            })
            .collect();
        Self { sources, fetch_timeout_secs: config.fetch.timeout_secs }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceEntry {
    pub region: &'static str,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub sources: Vec<SourceEntry>,
    pub fetch_timeout_secs: u64,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// Liveness of the responder itself. Upstream status endpoints are not
/// probed here; their failures surface per region in command replies.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        status: "ready",
        service: HealthCheck {
            status: "ready",
            detail: "bluelight-server runtime initialized".to_string(),
        },
        sources: state.sources.clone(),
        fetch_timeout_secs: state.fetch_timeout_secs,
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}
