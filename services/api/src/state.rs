//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds all shared,
//! clonable resources. Nothing in here is per-call: each call owns its own
//! state inside its session task.

use crate::{config::Config, recorder::CallRecorder, ws::registry::CallRegistry};
use callrelay_core::AgentPrompts;
use std::{sync::Arc, time::Instant};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub prompts: Arc<AgentPrompts>,
    pub recorder: Arc<dyn CallRecorder>,
    pub calls: Arc<CallRegistry>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, prompts: AgentPrompts, recorder: Arc<dyn CallRecorder>) -> Self {
        Self {
            config: Arc::new(config),
            prompts: Arc::new(prompts),
            recorder,
            calls: Arc::new(CallRegistry::new()),
            started_at: Instant::now(),
        }
    }
}
