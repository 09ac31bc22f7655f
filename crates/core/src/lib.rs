//! Call Relay Core
//!
//! Pure, I/O-free logic for relaying one phone call between a telephony
//! media stream and a speech-AI realtime session. The network runtime feeds
//! decoded events in and executes the [`Command`]s that come back out.

pub mod audio;
pub mod controller;
pub mod policy;
pub mod prompts;
pub mod protocol;
pub mod relay;
pub mod session;

use protocol::{realtime::RealtimeClientEvent, telephony::TelephonyCommand};
use session::EndReason;

/// Represents commands that the core logic issues to the network runtime.
///
/// The controller never touches a socket. It decides what should be sent
/// where, and the runtime carries it out in the order the commands are
/// returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Send an event to the speech-AI realtime peer.
    SendRealtime(RealtimeClientEvent),
    /// Send a frame to the telephony media-stream peer.
    SendTelephony(TelephonyCommand),
    /// Close both peers. Issued at most once per call.
    Hangup(EndReason),
}

pub use controller::{CallController, CallSummary};
pub use policy::DurationPolicy;
pub use prompts::AgentPrompts;
