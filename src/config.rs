use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Environment prefix for overrides, e.g. `VOICE_CLIENT__SERVER__URL`
const ENV_PREFIX: &str = "VOICE_CLIENT";

/// Local client settings (file + environment)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server: ServerConfig,
    pub room: RoomConfig,
    pub session: SessionPreferences,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Backend base URL; no backend is contacted when absent
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Caller-supplied room address
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionPreferences {
    /// Keep the microphone muted once the agent is ready
    pub start_audio_off: bool,
}

impl ClientConfig {
    /// Load from an optional file at `path` (any extension `config` understands)
    /// layered under `VOICE_CLIENT__*` environment variables
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

/// Client configuration served by the backend at GET /config
///
/// Absent fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Require the user to supply a room address instead of auto-creating one
    pub manual_room_entry: bool,

    /// Microphone active without push-to-talk gating
    pub open_mic: bool,

    pub user_video: bool,
    pub show_splash: bool,

    /// Show the pre-call configuration step (pre-call state is `Idle`)
    pub show_config: bool,

    pub app_title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            manual_room_entry: false,
            open_mic: true,
            user_video: false,
            show_splash: false,
            show_config: false,
            app_title: "Voice Assistant".to_string(),
        }
    }
}
