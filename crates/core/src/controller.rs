//! Call Lifecycle Controller
//!
//! Owns the [`CallSession`] of one call, applies the [`DurationPolicy`] and
//! decides when both peers must be closed. The inbound and outbound relay
//! handlers live in [`crate::relay`] and operate on the same controller.
//!
//! The controller has no timer. Elapsed time is checked on every inbound
//! media frame, so enforcement lags a threshold by at most one frame interval.

use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::{
    Command,
    audio,
    policy::DurationPolicy,
    prompts::AgentPrompts,
    protocol::realtime::{RealtimeClientEvent, VoiceSettings},
    session::{CallSession, EndReason, Phase},
};

/// One leg of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peer {
    Telephony,
    Realtime,
}

/// Everything worth keeping about a call once it is over.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSummary {
    pub stream_sid: Option<String>,
    pub call_sid: Option<String>,
    pub duration: Duration,
    pub transcript: String,
    pub inbound_frames: u64,
    pub outbound_frames: u64,
    pub caller_audio: Duration,
    pub end_reason: Option<EndReason>,
}

#[derive(Debug, Clone)]
pub struct CallController {
    pub(crate) session: CallSession,
    pub(crate) policy: DurationPolicy,
    pub(crate) prompts: AgentPrompts,
    pub(crate) voice: VoiceSettings,
    /// Whether commands may currently be addressed to the realtime peer.
    pub(crate) realtime_open: bool,
}

impl CallController {
    pub fn new(
        policy: DurationPolicy,
        prompts: AgentPrompts,
        voice: VoiceSettings,
        started_at: Instant,
    ) -> Self {
        Self {
            session: CallSession::new(started_at),
            policy,
            prompts,
            voice,
            realtime_open: false,
        }
    }

    pub fn session(&self) -> &CallSession {
        &self.session
    }

    pub fn is_terminated(&self) -> bool {
        self.session.is_terminated()
    }

    /// The realtime socket is up: configure the agent and ask for the greeting.
    pub fn on_realtime_open(&mut self) -> Vec<Command> {
        if self.is_terminated() {
            return Vec::new();
        }
        self.realtime_open = true;
        info!("Realtime peer open. Configuring session.");
        vec![
            Command::SendRealtime(RealtimeClientEvent::session_update(
                &self.voice,
                &self.prompts.instructions,
            )),
            Command::SendRealtime(RealtimeClientEvent::speak(&self.prompts.greeting)),
        ]
    }

    pub fn on_realtime_unavailable(&mut self) -> Vec<Command> {
        self.terminate(EndReason::RealtimeUnavailable)
    }

    /// Either socket closing ends the call and takes the other one down.
    pub fn on_peer_closed(&mut self, peer: Peer) -> Vec<Command> {
        match peer {
            Peer::Telephony => self.terminate(EndReason::TelephonyClosed),
            Peer::Realtime => {
                self.realtime_open = false;
                self.terminate(EndReason::RealtimeClosed)
            }
        }
    }

    pub fn on_shutdown(&mut self) -> Vec<Command> {
        self.terminate(EndReason::ServerShutdown)
    }

    /// Applies the duration policy at `now`.
    pub(crate) fn tick(&mut self, now: Instant) -> Vec<Command> {
        let verdict = self.policy.evaluate(self.session.elapsed(now));
        let mut commands = Vec::new();

        if verdict.past_soft_cap && !self.session.warning_issued {
            self.session.warning_issued = true;
            self.session.phase = Phase::Warned;
            // Asking for a closing line we are about to cut off is pointless.
            if !verdict.past_hard_cap {
                info!(soft_cap = ?self.policy.soft_cap(), "Soft cap reached. Asking agent to wrap up.");
                commands.extend(self.to_realtime(RealtimeClientEvent::speak(&self.prompts.wrap_up)));
            }
        }

        if verdict.past_hard_cap {
            info!(hard_cap = ?self.policy.hard_cap(), speaking = self.session.speaking, "Hard cap reached.");
            commands.extend(self.terminate(EndReason::HardTimeout));
        }

        commands
    }

    /// Moves to `Terminated`. Only the first trigger produces a `Hangup`.
    pub(crate) fn terminate(&mut self, reason: EndReason) -> Vec<Command> {
        if self.is_terminated() {
            debug!(%reason, "Call already terminated. Ignoring.");
            return Vec::new();
        }
        self.session.phase = Phase::Terminated;
        self.session.end_reason = Some(reason);
        self.realtime_open = false;
        info!(%reason, "Closing call.");
        vec![Command::Hangup(reason)]
    }

    pub(crate) fn to_realtime(&self, event: RealtimeClientEvent) -> Option<Command> {
        if self.realtime_open && !self.is_terminated() {
            Some(Command::SendRealtime(event))
        } else {
            None
        }
    }

    pub fn summary(&self, now: Instant) -> CallSummary {
        CallSummary {
            stream_sid: self.session.session_id.clone(),
            call_sid: self.session.call_id.clone(),
            duration: self.session.elapsed(now),
            transcript: self.session.transcript.clone(),
            inbound_frames: self.session.inbound_frame_count,
            outbound_frames: self.session.outbound_frame_count,
            caller_audio: audio::mulaw_duration(self.session.inbound_audio_bytes),
            end_reason: self.session.end_reason,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn controller_at(start: Instant) -> CallController {
        CallController::new(
            DurationPolicy::default(),
            AgentPrompts::default(),
            VoiceSettings::default(),
            start,
        )
    }

    #[test]
    fn test_realtime_open_sends_config_then_greeting() {
        let mut controller = controller_at(Instant::now());
        let commands = controller.on_realtime_open();
        assert_eq!(commands.len(), 2);
        assert!(matches!(
            &commands[0],
            Command::SendRealtime(RealtimeClientEvent::SessionUpdate { .. })
        ));
        assert_eq!(
            commands[1],
            Command::SendRealtime(RealtimeClientEvent::speak(
                &AgentPrompts::default().greeting
            ))
        );
    }

    #[test]
    fn test_realtime_unavailable_hangs_up() {
        let mut controller = controller_at(Instant::now());
        assert_eq!(
            controller.on_realtime_unavailable(),
            vec![Command::Hangup(EndReason::RealtimeUnavailable)]
        );
        assert!(controller.is_terminated());
        // The socket showing up late must not revive the call.
        assert!(controller.on_realtime_open().is_empty());
    }

    #[test]
    fn test_first_termination_wins() {
        let mut controller = controller_at(Instant::now());
        controller.on_realtime_open();
        assert_eq!(
            controller.on_peer_closed(Peer::Realtime),
            vec![Command::Hangup(EndReason::RealtimeClosed)]
        );
        assert!(controller.on_peer_closed(Peer::Telephony).is_empty());
        assert!(controller.on_shutdown().is_empty());
        assert_eq!(
            controller.session().end_reason,
            Some(EndReason::RealtimeClosed)
        );
    }

    #[test]
    fn test_summary_reports_session() {
        let start = Instant::now();
        let mut controller = controller_at(start);
        controller.session.session_id = Some("MZ1".into());
        controller.session.inbound_audio_bytes = 16_000;
        controller.on_shutdown();

        let summary = controller.summary(start + Duration::from_secs(12));
        assert_eq!(summary.stream_sid.as_deref(), Some("MZ1"));
        assert_eq!(summary.duration, Duration::from_secs(12));
        assert_eq!(summary.caller_audio, Duration::from_secs(2));
        assert_eq!(summary.end_reason, Some(EndReason::ServerShutdown));
    }
}
