//! Inbound relay: telephony → realtime.

use std::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::{
    Command, audio,
    controller::CallController,
    protocol::{realtime::RealtimeClientEvent, telephony::TelephonyEvent},
    session::EndReason,
};

impl CallController {
    /// Handles one decoded frame from the telephony peer.
    ///
    /// Media frames are forwarded only while the realtime peer is open and are
    /// otherwise dropped. Every media frame is also the clock tick for the
    /// duration policy.
    pub fn handle_telephony(&mut self, event: TelephonyEvent, now: Instant) -> Vec<Command> {
        if self.is_terminated() {
            return Vec::new();
        }

        match event {
            TelephonyEvent::Connected => {
                debug!("Telephony stream connected.");
                Vec::new()
            }
            TelephonyEvent::Start { .. } => {
                if let Some((stream_sid, call_sid)) = event.start_ids() {
                    info!(?stream_sid, ?call_sid, "Telephony stream started.");
                    self.session.session_id = stream_sid;
                    self.session.call_id = call_sid;
                }
                Vec::new()
            }
            TelephonyEvent::Media { media } => {
                self.session.inbound_frame_count += 1;
                let mut commands = Vec::new();
                match audio::decode_payload(&media.payload) {
                    Ok(mulaw) if !mulaw.is_empty() => {
                        self.session.inbound_audio_bytes += mulaw.len();
                        let append = RealtimeClientEvent::append_audio(audio::encode_payload(&mulaw));
                        commands.extend(self.to_realtime(append));
                    }
                    Ok(_) => trace!("Empty media payload."),
                    Err(e) => warn!(error = %e, "Dropping media frame."),
                }
                commands.extend(self.tick(now));
                commands
            }
            TelephonyEvent::Stop => {
                info!("Telephony stream stopped.");
                self.terminate(EndReason::TelephonyStop)
            }
            TelephonyEvent::Other => {
                trace!("Ignoring telephony event.");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        controller::{Peer, tests::controller_at},
        protocol::telephony::InboundMedia,
        session::Phase,
    };
    use std::time::Duration;

    fn media(payload: &str) -> TelephonyEvent {
        TelephonyEvent::Media {
            media: InboundMedia {
                payload: payload.to_string(),
            },
        }
    }

    fn wrap_ups(commands: &[Command], controller: &CallController) -> usize {
        let wrap_up = RealtimeClientEvent::speak(&controller.prompts.wrap_up);
        commands
            .iter()
            .filter(|c| **c == Command::SendRealtime(wrap_up.clone()))
            .count()
    }

    #[test]
    fn test_media_is_forwarded_when_realtime_open() {
        let start = Instant::now();
        let mut controller = controller_at(start);
        controller.on_realtime_open();

        let commands = controller.handle_telephony(media("//8="), start + Duration::from_secs(1));
        assert_eq!(
            commands,
            vec![Command::SendRealtime(RealtimeClientEvent::append_audio("//8="))]
        );
        assert_eq!(controller.session().inbound_audio_bytes, 2);
    }

    #[test]
    fn test_media_is_dropped_before_realtime_open() {
        let start = Instant::now();
        let mut controller = controller_at(start);
        let commands = controller.handle_telephony(media("//8="), start);
        assert!(commands.is_empty());
        assert_eq!(controller.session().inbound_frame_count, 1);
    }

    #[test]
    fn test_forwarding_does_not_need_stream_sid() {
        let start = Instant::now();
        let mut controller = controller_at(start);
        controller.on_realtime_open();
        assert!(controller.session().session_id.is_none());
        assert_eq!(controller.handle_telephony(media("//8="), start).len(), 1);
    }

    #[test]
    fn test_start_records_identifiers() {
        let mut controller = controller_at(Instant::now());
        let start = TelephonyEvent::Start {
            start: Some(crate::protocol::telephony::StartMetadata {
                stream_sid: Some("MZ1".into()),
                call_sid: Some("CA1".into()),
            }),
            stream_sid: None,
        };
        assert!(controller.handle_telephony(start, Instant::now()).is_empty());
        assert_eq!(controller.session().session_id.as_deref(), Some("MZ1"));
        assert_eq!(controller.session().call_id.as_deref(), Some("CA1"));
    }

    #[test]
    fn test_soft_cap_warns_exactly_once() {
        let start = Instant::now();
        let mut controller = controller_at(start);
        controller.on_realtime_open();

        let mut sent = 0;
        for i in 0..100u64 {
            let now = start + Duration::from_secs(46) + Duration::from_millis(20 * i);
            let commands = controller.handle_telephony(media("//8="), now);
            sent += wrap_ups(&commands, &controller);
        }
        assert_eq!(sent, 1);
        assert!(controller.session().warning_issued);
        assert_eq!(controller.session().phase, Phase::Warned);
    }

    #[test]
    fn test_no_warning_before_soft_cap() {
        let start = Instant::now();
        let mut controller = controller_at(start);
        controller.on_realtime_open();
        let commands = controller.handle_telephony(media("//8="), start + Duration::from_secs(45));
        assert_eq!(wrap_ups(&commands, &controller), 0);
        assert_eq!(controller.session().phase, Phase::Active);
    }

    #[test]
    fn test_hard_cap_hangs_up_while_agent_speaking() {
        let start = Instant::now();
        let mut controller = controller_at(start);
        controller.on_realtime_open();
        controller.handle_telephony(media("//8="), start + Duration::from_secs(50));
        controller.session.speaking = true;

        let commands = controller.handle_telephony(media("//8="), start + Duration::from_secs(61));
        assert_eq!(
            commands.last(),
            Some(&Command::Hangup(EndReason::HardTimeout))
        );
        assert!(controller.is_terminated());

        // Later frames are inert.
        assert!(
            controller
                .handle_telephony(media("//8="), start + Duration::from_secs(62))
                .is_empty()
        );
    }

    #[test]
    fn test_hard_cap_in_first_tick_skips_wrap_up() {
        let start = Instant::now();
        let mut controller = controller_at(start);
        controller.on_realtime_open();
        let commands = controller.handle_telephony(media("//8="), start + Duration::from_secs(61));
        assert_eq!(wrap_ups(&commands, &controller), 0);
        assert_eq!(
            commands.last(),
            Some(&Command::Hangup(EndReason::HardTimeout))
        );
    }

    #[test]
    fn test_wrap_up_dropped_when_realtime_not_open() {
        let start = Instant::now();
        let mut controller = controller_at(start);
        let commands = controller.handle_telephony(media("//8="), start + Duration::from_secs(50));
        assert!(commands.is_empty());
        assert!(controller.session().warning_issued);
    }

    #[test]
    fn test_stop_hangs_up_once() {
        let mut controller = controller_at(Instant::now());
        controller.on_realtime_open();
        assert_eq!(
            controller.handle_telephony(TelephonyEvent::Stop, Instant::now()),
            vec![Command::Hangup(EndReason::TelephonyStop)]
        );
        assert!(controller.handle_telephony(TelephonyEvent::Stop, Instant::now()).is_empty());
        // The realtime side closing afterwards does not trigger a second close.
        assert!(controller.on_peer_closed(Peer::Realtime).is_empty());
    }

    #[test]
    fn test_bad_base64_still_ticks_the_clock() {
        let start = Instant::now();
        let mut controller = controller_at(start);
        controller.on_realtime_open();
        let commands = controller.handle_telephony(media("***"), start + Duration::from_secs(61));
        assert_eq!(commands, vec![Command::Hangup(EndReason::HardTimeout)]);
    }
}
