//! Call Relay API Library Crate
//!
//! This library contains the network side of the call relay: configuration,
//! application state, the telephony webhook, the media-stream WebSocket
//! endpoint and the realtime provider connection. The binaries in `bin/` are
//! thin wrappers around it.

pub mod config;
pub mod handlers;
pub mod recorder;
pub mod router;
pub mod state;
pub mod ws;
