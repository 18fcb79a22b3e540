use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of POST /connect (the backend generates the room itself)
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConnectRequest {}

/// Successful /connect response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub room_url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl ConnectResponse {
    /// Room to join: `url` wins over `room_url`, empty strings count as absent
    pub fn room(&self) -> Option<&str> {
        non_empty(&self.url).or_else(|| non_empty(&self.room_url))
    }

    pub fn token(&self) -> Option<&str> {
        non_empty(&self.token)
    }
}

/// Error body returned with a non-2xx status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<String>,
}

/// Resolved join target for one session attempt
#[derive(Clone, PartialEq, Eq)]
pub struct AgentGrant {
    /// Room address to join
    pub room_url: String,

    /// Join credential; `None` means an unauthenticated room
    pub token: Option<String>,
}

impl AgentGrant {
    pub fn new(room_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            room_url: room_url.into(),
            token: token.filter(|t| !t.is_empty()),
        }
    }
}

impl fmt::Debug for AgentGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentGrant")
            .field("room_url", &self.room_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
