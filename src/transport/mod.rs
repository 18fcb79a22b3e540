//! Real-time room transport seam
//!
//! The transport itself (WebRTC room, media, signalling) is supplied by an
//! external provider through the `TransportSession` trait. This module only
//! defines the capability surface and the events the orchestrator consumes.

pub mod backend;
pub mod room;

pub use backend::{JoinOptions, MeetingState, TransportEvent, TransportSession};
pub use room::RoomAddress;
