pub mod agent;
pub mod config;
pub mod metrics;
pub mod session;
pub mod transport;

pub use agent::{AgentClient, AgentClientError, AgentGrant, ConnectResponse, HttpAgentClient};
pub use config::{AppConfig, ClientConfig};
pub use metrics::{MetricKey, MetricSample, MetricSeries, MetricsAggregator, SeriesSummary};
pub use session::{AppMessage, ConnectionError, ConnectionOrchestrator, LifecycleState, SessionConfig};
pub use transport::{JoinOptions, MeetingState, RoomAddress, TransportEvent, TransportSession};
