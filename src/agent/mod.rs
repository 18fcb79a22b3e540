//! Backend agent-orchestration client
//!
//! - POST /connect - provision an agent and a room, returns join target + credential
//! - GET /config - client configuration merged over defaults

pub mod client;
pub mod messages;

pub use client::{normalize_server_url, AgentClient, AgentClientError, HttpAgentClient};
pub use messages::{AgentGrant, ConnectRequest, ConnectResponse, ErrorResponse};
