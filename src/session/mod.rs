//! Voice agent session management
//!
//! This module provides the `ConnectionOrchestrator` that owns one call's lifecycle:
//! - Agent provisioning through the backend
//! - Room join through the external transport
//! - Unmute gating on the first active-speaker signal
//! - Routing of pipeline telemetry into the bound `MetricsAggregator`
//! - Stale-result rejection via per-attempt generations

mod config;
mod error;
mod messages;
mod orchestrator;
mod state;

pub use config::SessionConfig;
pub use error::ConnectionError;
pub use messages::{AppMessage, MetricsBatch, TtfbEntry, METRICS_MESSAGE, PRODUCT_MESSAGE};
pub use orchestrator::ConnectionOrchestrator;
pub use state::LifecycleState;
