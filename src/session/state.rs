use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one voice agent session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Idle,
    Configuring,
    RequestingAgent,
    Connecting,
    Connected,
    Finished,
    Error,
}

impl LifecycleState {
    /// `start()` is accepted only from here
    pub fn is_pre_call(self) -> bool {
        matches!(self, LifecycleState::Idle | LifecycleState::Configuring)
    }

    pub fn is_handshake(self) -> bool {
        matches!(self, LifecycleState::RequestingAgent | LifecycleState::Connecting)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LifecycleState::Finished | LifecycleState::Error)
    }

    /// Status line shown while the start button is busy
    pub fn status_text(self) -> &'static str {
        match self {
            LifecycleState::RequestingAgent => "Requesting agent...",
            LifecycleState::Connecting => "Connecting to room...",
            _ => "Let's go!",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Configuring => "configuring",
            LifecycleState::RequestingAgent => "requesting_agent",
            LifecycleState::Connecting => "connecting",
            LifecycleState::Connected => "connected",
            LifecycleState::Finished => "finished",
            LifecycleState::Error => "error",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
