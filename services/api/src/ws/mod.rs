//! WebSocket Call Relay
//!
//! This module holds the real-time side of the service:
//!
//! - `session`: the per-call relay task, from socket upgrade to teardown.
//! - `provider`: the connection to the speech-AI realtime API.
//! - `registry`: process-wide call counters and the shutdown signal.

mod provider;
pub mod registry;
pub mod session;

pub use session::ws_handler;

/// Path the telephony provider opens its media stream on.
pub const MEDIA_STREAM_PATH: &str = "/twilio/media";
