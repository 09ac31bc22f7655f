//! Teardown handoff of finished calls.
//!
//! The relay does not persist anything itself. When a call ends, its
//! [`CallSummary`] is passed to a [`CallRecorder`], which is where storage or
//! notification collaborators plug in.

use anyhow::Result;
use async_trait::async_trait;
use callrelay_core::CallSummary;
use tracing::info;

/// Receives the summary of every call once both peers are closed.
#[async_trait]
pub trait CallRecorder: Send + Sync {
    async fn record(&self, summary: CallSummary) -> Result<()>;
}

/// A `CallRecorder` that only writes the summary to the log.
pub struct LogRecorder;

#[async_trait]
impl CallRecorder for LogRecorder {
    async fn record(&self, summary: CallSummary) -> Result<()> {
        info!(
            stream_sid = ?summary.stream_sid,
            call_sid = ?summary.call_sid,
            duration = ?summary.duration,
            caller_audio = ?summary.caller_audio,
            inbound_frames = summary.inbound_frames,
            outbound_frames = summary.outbound_frames,
            end_reason = ?summary.end_reason,
            transcript = %summary.transcript,
            "Call finished."
        );
        Ok(())
    }
}
