//! Event handlers for both relay directions.
//!
//! - `inbound`: telephony → realtime (caller audio, control frames, duration ticks).
//! - `outbound`: realtime → telephony (agent audio, transcription, errors).

pub mod inbound;
pub mod outbound;
