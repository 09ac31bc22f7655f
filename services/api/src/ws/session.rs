//! Manages the lifecycle of one relayed phone call.
//!
//! Each accepted media-stream socket gets its own task, its own
//! [`CallController`] and its own realtime connection. The task multiplexes
//! both peers in a single `select!` loop, so the controller is only ever
//! touched from one place and needs no lock.

use super::provider::{self, RealtimeSink, RealtimeStream};
use crate::state::AppState;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use callrelay_core::{
    CallController, Command,
    controller::Peer,
    protocol::{self, CodecError},
    session::EndReason,
};
use futures_util::{
    SinkExt, Stream, StreamExt,
    stream::{SplitSink, SplitStream},
};
use std::{sync::Arc, time::Instant};
use tokio_tungstenite::tungstenite::{self, protocol::Message as WsMessage};
use tracing::{debug, error, info, instrument, warn};

type TelephonySink = SplitSink<WebSocket, Message>;
type TelephonyStream = SplitStream<WebSocket>;

/// Axum handler to upgrade the telephony provider's request to a media stream.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    let calls = Arc::clone(&state.calls);
    ws.on_upgrade(move |socket| calls.track(handle_call(socket, state)))
}

/// Runs one call from socket upgrade to teardown.
#[instrument(name = "call", skip_all, fields(conn, stream_sid))]
async fn handle_call(socket: WebSocket, state: Arc<AppState>) {
    let guard = state.calls.register();
    tracing::Span::current().record("conn", guard.id());
    info!(active = state.calls.active(), "Telephony peer connected.");

    let mut controller = CallController::new(
        state.config.policy,
        (*state.prompts).clone(),
        state.config.voice_settings(),
        Instant::now(),
    );
    let (mut telephony_tx, telephony_rx) = socket.split();

    let (realtime_tx, reason) =
        run_call(&state, &mut controller, &mut telephony_tx, telephony_rx).await;
    let summary = controller.summary(Instant::now());

    close_peers(telephony_tx, realtime_tx).await;
    info!(%reason, "Call torn down.");

    if let Err(e) = state.recorder.record(summary).await {
        error!(error = ?e, "Failed to record finished call.");
    }
    drop(guard);
}

/// The event loop for an active call.
///
/// Returns the realtime sink (if the peer was ever opened) so the caller can
/// close it, and the reason the call ended.
async fn run_call(
    state: &Arc<AppState>,
    controller: &mut CallController,
    telephony_tx: &mut TelephonySink,
    mut telephony_rx: TelephonyStream,
) -> (Option<RealtimeSink>, EndReason) {
    let mut realtime_tx: Option<RealtimeSink> = None;
    let mut realtime_rx: Option<RealtimeStream> = None;

    // The realtime peer opens concurrently with the telephony stream, so media
    // arriving during the handshake is dropped rather than queued.
    let connect = provider::connect(&state.config);
    tokio::pin!(connect);
    let mut connecting = true;

    loop {
        let commands = tokio::select! {
            result = &mut connect, if connecting => {
                connecting = false;
                match result {
                    Ok(socket) => {
                        let (tx, rx) = socket.split();
                        realtime_tx = Some(tx);
                        realtime_rx = Some(rx);
                        controller.on_realtime_open()
                    }
                    Err(e) => {
                        error!(error = ?e, "Realtime peer unavailable.");
                        controller.on_realtime_unavailable()
                    }
                }
            },
            frame = telephony_rx.next() => on_telephony_frame(controller, frame),
            frame = next_frame(&mut realtime_rx) => on_realtime_frame(controller, frame),
            _ = state.calls.shutdown_requested() => controller.on_shutdown(),
        };

        if let Some(reason) = execute(commands, telephony_tx, &mut realtime_tx).await {
            return (realtime_tx, reason);
        }
    }
}

fn on_telephony_frame(
    controller: &mut CallController,
    frame: Option<Result<Message, axum::Error>>,
) -> Vec<Command> {
    match frame {
        Some(Ok(Message::Text(text))) => match protocol::decode_telephony(text.as_str()) {
            Ok(event) => {
                let had_sid = controller.session().session_id.is_some();
                let commands = controller.handle_telephony(event, Instant::now());
                if !had_sid {
                    if let Some(sid) = &controller.session().session_id {
                        tracing::Span::current().record("stream_sid", sid.as_str());
                    }
                }
                commands
            }
            Err(e) => {
                warn!(error = %e, "Dropping malformed telephony frame.");
                Vec::new()
            }
        },
        Some(Ok(Message::Binary(_))) => {
            warn!(error = %CodecError::NonText, "Dropping telephony frame.");
            Vec::new()
        }
        Some(Ok(Message::Ping(_) | Message::Pong(_))) => Vec::new(),
        Some(Ok(Message::Close(_))) | None => {
            info!("Telephony peer closed.");
            controller.on_peer_closed(Peer::Telephony)
        }
        Some(Err(e)) => {
            warn!(error = ?e, "Telephony peer errored.");
            controller.on_peer_closed(Peer::Telephony)
        }
    }
}

fn on_realtime_frame(
    controller: &mut CallController,
    frame: Option<Result<WsMessage, tungstenite::Error>>,
) -> Vec<Command> {
    match frame {
        Some(Ok(WsMessage::Text(text))) => match protocol::decode_realtime(text.as_str()) {
            Ok(event) => controller.handle_realtime(event),
            Err(e) => {
                warn!(error = %e, "Dropping malformed realtime frame.");
                Vec::new()
            }
        },
        Some(Ok(WsMessage::Binary(_))) => {
            warn!(error = %CodecError::NonText, "Dropping realtime frame.");
            Vec::new()
        }
        Some(Ok(WsMessage::Close(_))) | None => {
            info!("Realtime peer closed.");
            controller.on_peer_closed(Peer::Realtime)
        }
        Some(Ok(_)) => Vec::new(),
        Some(Err(e)) => {
            warn!(error = ?e, "Realtime peer errored.");
            controller.on_peer_closed(Peer::Realtime)
        }
    }
}

/// Executes controller commands in order. Returns the reason on `Hangup`.
///
/// Send failures are logged only: a dead peer surfaces as a close on its
/// read side, which ends the call through the controller.
async fn execute(
    commands: Vec<Command>,
    telephony_tx: &mut TelephonySink,
    realtime_tx: &mut Option<RealtimeSink>,
) -> Option<EndReason> {
    for command in commands {
        match command {
            Command::SendRealtime(event) => {
                let Some(tx) = realtime_tx.as_mut() else {
                    continue;
                };
                match protocol::encode(&event) {
                    Ok(text) => {
                        if let Err(e) = tx.send(WsMessage::Text(text.into())).await {
                            debug!(error = ?e, "Failed to send to realtime peer.");
                        }
                    }
                    Err(e) => error!(error = %e, "Failed to encode realtime event."),
                }
            }
            Command::SendTelephony(frame) => match protocol::encode(&frame) {
                Ok(text) => {
                    if let Err(e) = telephony_tx.send(Message::Text(text.into())).await {
                        debug!(error = ?e, "Failed to send to telephony peer.");
                    }
                }
                Err(e) => error!(error = %e, "Failed to encode telephony frame."),
            },
            Command::Hangup(reason) => return Some(reason),
        }
    }
    None
}

/// Closes both peers once. Errors from a peer that is already gone are expected.
async fn close_peers(mut telephony_tx: TelephonySink, realtime_tx: Option<RealtimeSink>) {
    if let Err(e) = telephony_tx.close().await {
        debug!(error = ?e, "Telephony peer already closed.");
    }
    if let Some(mut tx) = realtime_tx {
        if let Err(e) = tx.close().await {
            debug!(error = ?e, "Realtime peer already closed.");
        }
    }
}

/// Reads the next frame of a peer that may not be connected yet.
async fn next_frame<S>(stream: &mut Option<S>) -> Option<S::Item>
where
    S: Stream + Unpin,
{
    match stream {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}
