//! Axum Handlers for the HTTP surface
//!
//! The telephony webhook and the health check. `utoipa` doc comments feed the
//! OpenAPI document.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::{state::AppState, ws::MEDIA_STREAM_PATH};

const MISSING_BASE_URL_TWIML: &str =
    "<Response><Say>Missing PUBLIC_BASE_URL</Say><Hangup/></Response>";

#[derive(Serialize, ToSchema, Debug)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub uptime_secs: u64,
    pub active_calls: usize,
    pub total_calls: u64,
    /// RFC 3339 server time.
    pub timestamp: String,
}

/// Answer an inbound call by connecting it to the media stream.
#[utoipa::path(
    post,
    path = "/twilio/incoming",
    responses(
        (status = 200, description = "TwiML document opening the media stream", body = String, content_type = "text/xml")
    )
)]
pub async fn incoming_call(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let twiml = match &state.config.public_base_url {
        Some(base) => {
            let url = media_stream_url(base);
            info!(%url, "Inbound call. Connecting media stream.");
            stream_twiml(&url)
        }
        None => {
            warn!("PUBLIC_BASE_URL is not set. Rejecting call.");
            MISSING_BASE_URL_TWIML.to_string()
        }
    };
    ([(header::CONTENT_TYPE, "text/xml")], twiml)
}

/// Report liveness and call counters.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        active_calls: state.calls.active(),
        total_calls: state.calls.total(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Maps the public HTTP origin to the WebSocket URL of the media stream.
pub fn media_stream_url(public_base_url: &str) -> String {
    let base = public_base_url.trim().trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };
    format!("{}{}", base, MEDIA_STREAM_PATH)
}

fn stream_twiml(url: &str) -> String {
    format!(
        r#"<Response><Connect><Stream url="{}" /></Connect></Response>"#,
        escape_xml(url)
    )
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
