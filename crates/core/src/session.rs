//! Per-call mutable state.

use std::fmt;
use std::time::{Duration, Instant};

/// Where a call stands with respect to the duration policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    Warned,
    Terminated,
}

/// Why a call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The provider sent `stop`.
    TelephonyStop,
    /// The hard duration cap was exceeded.
    HardTimeout,
    /// The telephony socket closed or errored.
    TelephonyClosed,
    /// The realtime socket closed or errored.
    RealtimeClosed,
    /// The realtime socket could not be opened.
    RealtimeUnavailable,
    /// The process is shutting down.
    ServerShutdown,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            EndReason::TelephonyStop => "telephony_stop",
            EndReason::HardTimeout => "hard_timeout",
            EndReason::TelephonyClosed => "telephony_closed",
            EndReason::RealtimeClosed => "realtime_closed",
            EndReason::RealtimeUnavailable => "realtime_unavailable",
            EndReason::ServerShutdown => "server_shutdown",
        };
        write!(f, "{}", reason)
    }
}

/// The record kept for one accepted telephony connection.
#[derive(Debug, Clone)]
pub struct CallSession {
    /// Provider stream id. Unknown until the `start` frame arrives.
    pub session_id: Option<String>,
    /// Provider call id, informational.
    pub call_id: Option<String>,
    pub started_at: Instant,
    /// Caller transcript, append-only.
    pub transcript: String,
    pub warning_issued: bool,
    /// True while the agent is emitting audio.
    pub speaking: bool,
    pub outbound_frame_count: u64,
    pub inbound_frame_count: u64,
    /// Raw caller audio bytes received.
    pub inbound_audio_bytes: usize,
    pub phase: Phase,
    pub end_reason: Option<EndReason>,
}

impl CallSession {
    pub fn new(started_at: Instant) -> Self {
        Self {
            session_id: None,
            call_id: None,
            started_at,
            transcript: String::new(),
            warning_issued: false,
            speaking: false,
            outbound_frame_count: 0,
            inbound_frame_count: 0,
            inbound_audio_bytes: 0,
            phase: Phase::Active,
            end_reason: None,
        }
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Terminated
    }

    /// Partial transcription deltas are concatenated as they come.
    pub fn append_partial(&mut self, delta: &str) {
        self.transcript.push_str(delta);
    }

    /// A completed segment goes on its own line.
    pub fn append_final(&mut self, segment: &str) {
        self.transcript.push('\n');
        self.transcript.push_str(segment);
    }
}
