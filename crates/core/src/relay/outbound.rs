//! Outbound relay: realtime → telephony.

use tracing::{debug, info, warn};

use crate::{
    Command,
    controller::CallController,
    protocol::{realtime::RealtimeServerEvent, telephony::TelephonyCommand},
};

const FRAME_LOG_INTERVAL: u64 = 50;

impl CallController {
    /// Handles one decoded event from the realtime peer.
    ///
    /// Agent audio can only be addressed once the stream id is known; audio
    /// arriving earlier is dropped. Error events are logged and the call goes on.
    pub fn handle_realtime(&mut self, event: RealtimeServerEvent) -> Vec<Command> {
        if self.is_terminated() {
            return Vec::new();
        }

        match event {
            RealtimeServerEvent::ResponseAudioDelta { delta: Some(delta) } if !delta.is_empty() => {
                self.session.speaking = true;
                let Some(stream_sid) = self.session.session_id.clone() else {
                    debug!("No stream id yet. Dropping agent audio.");
                    return Vec::new();
                };
                self.session.outbound_frame_count += 1;
                if self.session.outbound_frame_count % FRAME_LOG_INTERVAL == 0 {
                    info!(
                        frames = self.session.outbound_frame_count,
                        "Agent audio frames relayed."
                    );
                }
                vec![Command::SendTelephony(TelephonyCommand::media(stream_sid, delta))]
            }
            RealtimeServerEvent::ResponseDone => {
                self.session.speaking = false;
                Vec::new()
            }
            RealtimeServerEvent::TranscriptionDelta { delta: Some(delta) } => {
                self.session.append_partial(&delta);
                Vec::new()
            }
            RealtimeServerEvent::TranscriptionCompleted {
                transcript: Some(transcript),
            } if !transcript.is_empty() => {
                self.session.append_final(&transcript);
                Vec::new()
            }
            RealtimeServerEvent::Error { error } => {
                warn!(kind = ?error.kind, code = ?error.code, message = %error.message, "Realtime API error.");
                Vec::new()
            }
            RealtimeServerEvent::SessionCreated | RealtimeServerEvent::SessionUpdated => {
                debug!("Realtime session acknowledged.");
                Vec::new()
            }
            _ => Vec::new(),
        }
    }
}
