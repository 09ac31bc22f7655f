//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the telephony webhook, the media-stream WebSocket endpoint and
//! the OpenAPI documentation.

use crate::{
    handlers::{self, HealthResponse},
    state::AppState,
    ws::{MEDIA_STREAM_PATH, ws_handler},
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::incoming_call, handlers::health),
    components(schemas(HealthResponse)),
    tags(
        (name = "Call Relay", description = "Telephony webhook and health for the call relay")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/twilio/incoming", post(handlers::incoming_call))
        .route("/health", get(handlers::health))
        .route(MEDIA_STREAM_PATH, get(ws_handler))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
