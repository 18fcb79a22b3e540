use crate::config::AppConfig;
use serde::{Deserialize, Serialize};

/// Input to one session attempt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Room must be supplied by the caller instead of created by the backend
    pub manual_room_entry: bool,

    /// Keep the microphone muted once the agent is ready.
    /// The join itself is always muted.
    pub start_audio_off: bool,

    /// Microphone active without push-to-talk gating
    pub open_mic: bool,

    /// Caller-supplied room address (e.g. from a `room_url` query parameter)
    pub room_url: Option<String>,
}

impl SessionConfig {
    pub fn from_app_config(app: &AppConfig, room_url: Option<String>, start_audio_off: bool) -> Self {
        Self {
            manual_room_entry: app.manual_room_entry,
            start_audio_off,
            open_mic: app.open_mic,
            room_url,
        }
    }

    pub fn auto_room_creation(&self) -> bool {
        !self.manual_room_entry
    }

    /// Caller-supplied room, ignoring blank input
    pub fn room_url(&self) -> Option<&str> {
        self.room_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}
