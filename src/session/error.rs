use thiserror::Error;

/// Why a session attempt ended in `Error`
///
/// `Display` is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("{detail}")]
    AgentRequestFailed { detail: String },

    #[error("Transport is not initialized. Please refresh the page and try again.")]
    TransportUnavailable,

    #[error("Unable to join room: '{target}'")]
    JoinFailed { target: String },

    #[error("Please enter a valid room URL or enable auto room creation in the backend config")]
    InvalidRoomAddress,

    #[error("Meeting error: {detail}")]
    MeetingFailed { detail: String },
}
