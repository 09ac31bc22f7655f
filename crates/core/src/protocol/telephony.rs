//! Telephony media-stream frames.

use serde::{Deserialize, Serialize};

/// Frames received from the telephony provider.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum TelephonyEvent {
    /// Sent once the socket is up, sometimes before `start`.
    Connected,
    /// Announces the stream and call identifiers.
    Start {
        #[serde(default)]
        start: Option<StartMetadata>,
        #[serde(rename = "streamSid", default)]
        stream_sid: Option<String>,
    },
    /// A chunk of caller audio.
    Media { media: InboundMedia },
    /// The provider is ending the stream.
    Stop,
    /// Any other provider event (`mark`, `dtmf`, ...). Not acted on.
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct StartMetadata {
    #[serde(rename = "streamSid", default)]
    pub stream_sid: Option<String>,
    #[serde(rename = "callSid", default)]
    pub call_sid: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct InboundMedia {
    /// Base64 encoded μ-law audio, 8 kHz mono.
    pub payload: String,
}

impl TelephonyEvent {
    /// The stream id carried by a `start` frame, preferring the nested one.
    pub fn start_ids(&self) -> Option<(Option<String>, Option<String>)> {
        match self {
            TelephonyEvent::Start { start, stream_sid } => {
                let nested = start.clone().unwrap_or_default();
                let sid = nested.stream_sid.or_else(|| stream_sid.clone());
                Some((sid, nested.call_sid))
            }
            _ => None,
        }
    }
}

/// Frames sent to the telephony provider.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum TelephonyCommand {
    /// Plays an audio chunk to the caller.
    Media {
        #[serde(rename = "streamSid")]
        stream_sid: String,
        media: OutboundMedia,
    },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OutboundMedia {
    pub payload: String,
}

impl TelephonyCommand {
    pub fn media(stream_sid: impl Into<String>, payload: impl Into<String>) -> Self {
        TelephonyCommand::Media {
            stream_sid: stream_sid.into(),
            media: OutboundMedia {
                payload: payload.into(),
            },
        }
    }
}
