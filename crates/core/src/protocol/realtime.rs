//! Speech-AI realtime events.
//!
//! Only the subset the relay sends or reacts to is modelled. Everything else
//! the server emits lands in [`RealtimeServerEvent::Other`].

use serde::{Deserialize, Serialize};

/// Audio codec negotiated with the realtime API. Phone audio is μ-law end to end.
pub const AUDIO_FORMAT: &str = "g711_ulaw";

/// Events sent to the realtime API.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum RealtimeClientEvent {
    #[serde(rename = "session.update")]
    SessionUpdate { session: SessionConfig },
    #[serde(rename = "response.create")]
    ResponseCreate { response: ResponseConfig },
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioBufferAppend {
        /// Base64 encoded μ-law audio.
        audio: String,
    },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub turn_detection: TurnDetection,
    pub input_audio_format: String,
    pub output_audio_format: String,
    pub voice: String,
    pub input_audio_transcription: AudioTranscription,
    pub instructions: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnDetection {
    ServerVad { create_response: bool },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AudioTranscription {
    pub model: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ResponseConfig {
    pub modalities: Vec<Modality>,
    pub instructions: String,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Audio,
    Text,
}

/// Voice and transcription settings for a realtime session.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    pub voice: String,
    pub transcription_model: String,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            voice: "alloy".to_string(),
            transcription_model: "gpt-4o-mini-transcribe".to_string(),
        }
    }
}

impl RealtimeClientEvent {
    /// The `session.update` sent as soon as the realtime socket opens.
    pub fn session_update(settings: &VoiceSettings, instructions: &str) -> Self {
        RealtimeClientEvent::SessionUpdate {
            session: SessionConfig {
                turn_detection: TurnDetection::ServerVad {
                    create_response: true,
                },
                input_audio_format: AUDIO_FORMAT.to_string(),
                output_audio_format: AUDIO_FORMAT.to_string(),
                voice: settings.voice.clone(),
                input_audio_transcription: AudioTranscription {
                    model: settings.transcription_model.clone(),
                },
                instructions: instructions.to_string(),
            },
        }
    }

    /// Asks the agent to speak, audio first.
    pub fn speak(instructions: &str) -> Self {
        RealtimeClientEvent::ResponseCreate {
            response: ResponseConfig {
                modalities: vec![Modality::Audio, Modality::Text],
                instructions: instructions.to_string(),
            },
        }
    }

    pub fn append_audio(audio: impl Into<String>) -> Self {
        RealtimeClientEvent::InputAudioBufferAppend {
            audio: audio.into(),
        }
    }
}

/// Events received from the realtime API.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum RealtimeServerEvent {
    #[serde(rename = "session.created")]
    SessionCreated,
    #[serde(rename = "session.updated")]
    SessionUpdated,
    /// A chunk of synthesized audio. Both the older and the newer event
    /// names carry the same payload.
    #[serde(
        rename = "response.audio.delta",
        alias = "response.output_audio.delta"
    )]
    ResponseAudioDelta {
        #[serde(default)]
        delta: Option<String>,
    },
    #[serde(rename = "response.done", alias = "response.completed")]
    ResponseDone,
    #[serde(rename = "conversation.item.input_audio_transcription.delta")]
    TranscriptionDelta {
        #[serde(default)]
        delta: Option<String>,
    },
    #[serde(rename = "conversation.item.input_audio_transcription.completed")]
    TranscriptionCompleted {
        #[serde(default)]
        transcript: Option<String>,
    },
    #[serde(rename = "error")]
    Error { error: ApiError },
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ApiError {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
}
