//! Opens the WebSocket connection to the OpenAI Realtime API.

use crate::config::Config;
use anyhow::{Context, Result};
use futures_util::stream::{SplitSink, SplitStream};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{client::IntoClientRequest, protocol::Message as WsMessage},
};
use tracing::{info, instrument};

pub type RealtimeSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub type RealtimeSink = SplitSink<RealtimeSocket, WsMessage>;
pub type RealtimeStream = SplitStream<RealtimeSocket>;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connects and authenticates against the realtime endpoint.
///
/// Session configuration is not sent here; the call controller issues it
/// once the socket is open.
#[instrument(skip_all, fields(model = %config.realtime_model))]
pub async fn connect(config: &Config) -> Result<RealtimeSocket> {
    let mut request = config.realtime_endpoint().into_client_request()?;
    request.headers_mut().insert(
        "Authorization",
        format!("Bearer {}", config.openai_api_key.expose_secret()).parse()?,
    );
    request
        .headers_mut()
        .insert("OpenAI-Beta", "realtime=v1".parse()?);

    let (ws_stream, _) = tokio::time::timeout(CONNECT_TIMEOUT, connect_async(request))
        .await
        .context("Timed out connecting to OpenAI Realtime WebSocket")?
        .context("Failed to connect to OpenAI Realtime WebSocket")?;
    info!("Connected to OpenAI Realtime API.");
    Ok(ws_stream)
}
