//! Wire vocabularies for both legs of the bridge.
//!
//! - `telephony`: the media-stream events exchanged with the phone provider.
//! - `realtime`: the events exchanged with the speech-AI realtime API.
//!
//! Each vocabulary is decoded once at the boundary into a closed enum.

pub mod realtime;
pub mod telephony;

use serde::Serialize;
use thiserror::Error;

use realtime::RealtimeServerEvent;
use telephony::TelephonyEvent;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed JSON frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid base64 audio payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("unexpected non-text frame")]
    NonText,
}

/// Decodes a text frame received from the telephony peer.
pub fn decode_telephony(text: &str) -> Result<TelephonyEvent, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Decodes a text frame received from the realtime peer.
pub fn decode_realtime(text: &str) -> Result<RealtimeServerEvent, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Serializes an outgoing frame for either peer.
pub fn encode<T: Serialize>(frame: &T) -> Result<String, CodecError> {
    Ok(serde_json::to_string(frame)?)
}
