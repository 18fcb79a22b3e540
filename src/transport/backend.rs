use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Arguments for joining a room
#[derive(Clone, PartialEq, Eq)]
pub struct JoinOptions {
    /// Room address
    pub url: String,

    /// Join credential; empty for unauthenticated rooms
    pub token: String,

    /// Publish local video
    pub video_enabled: bool,

    /// Join with the local microphone disabled
    pub start_audio_off: bool,
}

impl std::fmt::Debug for JoinOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinOptions")
            .field("url", &self.url)
            .field("token", &if self.token.is_empty() { "" } else { "[REDACTED]" })
            .field("video_enabled", &self.video_enabled)
            .field("start_audio_off", &self.start_audio_off)
            .finish()
    }
}

/// Meeting state reported by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeetingState {
    New,
    Loading,
    Loaded,
    JoiningMeeting,
    JoinedMeeting,
    LeftMeeting,
    Error,
}

/// Inbound event from a joined room
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A participant became the active speaker
    ActiveSpeakerChange { peer_id: Option<String> },

    /// The meeting moved to a new state
    MeetingStateChange(MeetingState),

    /// Fatal meeting error
    Error { detail: String },

    /// Application-level message (`{ "type": ..., ... }`)
    AppMessage(serde_json::Value),
}

/// Joined real-time room capability
///
/// Implementations:
/// - Browser / native WebRTC room providers
/// - Test doubles that resolve joins on demand
#[async_trait::async_trait]
pub trait TransportSession: Send + Sync {
    /// Join a room; resolves once the join is accepted or rejected
    async fn join(&self, options: JoinOptions) -> Result<()>;

    /// Leave the room (idempotent)
    async fn leave(&self) -> Result<()>;

    /// Release transport resources (idempotent)
    async fn destroy(&self) -> Result<()>;

    /// Enable or disable the local microphone
    async fn set_local_audio(&self, enabled: bool) -> Result<()>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
