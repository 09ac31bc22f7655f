//! Connections to the speech-AI realtime provider.

pub mod openai;

pub use openai::{RealtimeSink, RealtimeStream, connect};
