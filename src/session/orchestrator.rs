use super::config::SessionConfig;
use super::error::ConnectionError;
use super::messages::AppMessage;
use super::state::LifecycleState;
use crate::agent::{AgentClient, AgentGrant};
use crate::metrics::MetricsAggregator;
use crate::transport::{JoinOptions, MeetingState, RoomAddress, TransportEvent, TransportSession};
use chrono::Utc;
use futures::stream::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

/// Detail used when the agent response names no room and the caller gave none
const MISSING_ROOM_DETAIL: &str = "Agent response did not include a room URL";

/// Per-call state that only exists while connected
#[derive(Debug, Clone)]
struct ActiveCall {
    grant: AgentGrant,

    /// Set once by the first active-speaker signal
    has_started: bool,

    /// Local mute flag as shown to the user
    muted: bool,

    start_audio_off: bool,
    open_mic: bool,
}

#[derive(Debug, Clone)]
enum Phase {
    Idle,
    Configuring,
    RequestingAgent,
    Connecting { grant: AgentGrant },
    Connected(ActiveCall),
    Finished { grant: AgentGrant },
    Error(ConnectionError),
}

impl Phase {
    fn pre_call(config_step: bool) -> Self {
        if config_step {
            Phase::Idle
        } else {
            Phase::Configuring
        }
    }

    fn state(&self) -> LifecycleState {
        match self {
            Phase::Idle => LifecycleState::Idle,
            Phase::Configuring => LifecycleState::Configuring,
            Phase::RequestingAgent => LifecycleState::RequestingAgent,
            Phase::Connecting { .. } => LifecycleState::Connecting,
            Phase::Connected(_) => LifecycleState::Connected,
            Phase::Finished { .. } => LifecycleState::Finished,
            Phase::Error(_) => LifecycleState::Error,
        }
    }
}

struct Inner {
    phase: Phase,

    /// Incremented by every `start()`, `leave()` and fatal error
    generation: u64,

    /// Telemetry bound to the current session attempt
    metrics: MetricsAggregator,
}

impl Inner {
    fn transition(&mut self, phase: Phase) {
        let from = self.phase.state();
        let to = phase.state();
        if from != to {
            info!("Session state {} -> {} (generation {})", from, to, self.generation);
        }
        self.phase = phase;
    }
}

/// What `start()` does once the synchronous checks pass
enum Plan {
    RequestAgent(Arc<dyn AgentClient>),
    Join(AgentGrant),
}

/// Sequences agent provisioning and room join, and owns the session lifecycle
///
/// Cloning yields another handle to the same session, so `leave()` and
/// transport events may be processed while a `start()` is suspended. Results
/// of async calls are applied only if no newer attempt began meanwhile.
#[derive(Clone)]
pub struct ConnectionOrchestrator {
    /// `None` when the transport capability is unavailable
    transport: Option<Arc<dyn TransportSession>>,

    /// `None` when no backend is configured
    agent: Option<Arc<dyn AgentClient>>,

    /// Pre-call state is `Idle` (configuration step shown) or `Configuring`
    config_step: bool,

    inner: Arc<Mutex<Inner>>,
}

impl ConnectionOrchestrator {
    pub fn new(
        transport: Option<Arc<dyn TransportSession>>,
        agent: Option<Arc<dyn AgentClient>>,
    ) -> Self {
        Self {
            transport,
            agent,
            config_step: false,
            inner: Arc::new(Mutex::new(Inner {
                phase: Phase::pre_call(false),
                generation: 0,
                metrics: MetricsAggregator::new(),
            })),
        }
    }

    /// Show a configuration step before the call (pre-call state becomes `Idle`)
    pub fn with_config_step(mut self, enabled: bool) -> Self {
        self.config_step = enabled;
        self.inner = Arc::new(Mutex::new(Inner {
            phase: Phase::pre_call(enabled),
            generation: 0,
            metrics: MetricsAggregator::new(),
        }));
        self
    }

    /// Leave the configuration step: `Idle` -> `Configuring`
    ///
    /// Succeeds when the backend will create the room or the caller supplied a
    /// valid room address. On failure the state stays `Idle`.
    pub async fn configure(&self, config: &SessionConfig) -> Result<(), ConnectionError> {
        let mut inner = self.inner.lock().await;
        if !matches!(inner.phase, Phase::Idle) {
            debug!("configure() ignored in state {}", inner.phase.state());
            return Ok(());
        }

        let backend_creates_room = config.auto_room_creation() && self.agent.is_some();
        let room_valid = config.room_url().is_some_and(RoomAddress::is_valid);

        if backend_creates_room || room_valid {
            inner.transition(Phase::Configuring);
            Ok(())
        } else {
            warn!("Invalid room address: {:?}", config.room_url());
            Err(ConnectionError::InvalidRoomAddress)
        }
    }

    /// Run one session attempt: request an agent, then join its room
    ///
    /// Ignored unless the session is in a pre-call state. Returns the error
    /// that ended the attempt, if any; results that arrive after the attempt
    /// was abandoned are discarded and reported as `Ok`.
    pub async fn start(&self, config: &SessionConfig) -> Result<(), ConnectionError> {
        let (generation, plan) = {
            let mut inner = self.inner.lock().await;
            let state = inner.phase.state();
            if state.is_handshake() {
                warn!("start() ignored: attempt in flight ({})", state.status_text());
                return Ok(());
            }
            if !state.is_pre_call() {
                warn!("start() ignored: session already {}", state);
                return Ok(());
            }

            inner.generation += 1;
            inner.metrics = MetricsAggregator::new();

            match self.plan(config) {
                Ok(plan) => {
                    let phase = match &plan {
                        Plan::RequestAgent(_) => Phase::RequestingAgent,
                        Plan::Join(grant) => Phase::Connecting {
                            grant: grant.clone(),
                        },
                    };
                    inner.transition(phase);
                    (inner.generation, plan)
                }
                Err(e) => {
                    error!("Session cannot start: {}", e);
                    inner.transition(Phase::Error(e.clone()));
                    return Err(e);
                }
            }
        };

        let grant = match plan {
            Plan::Join(grant) => grant,
            Plan::RequestAgent(agent) => {
                info!("Requesting agent from {}", agent.server_url());
                let response = agent.start_agent().await;

                let mut inner = self.inner.lock().await;
                if inner.generation != generation {
                    debug!("Discarding stale agent response (generation {})", generation);
                    return Ok(());
                }

                let grant = response
                    .map_err(|e| ConnectionError::AgentRequestFailed { detail: e.detail() })
                    .and_then(|data| {
                        data.room()
                            .or_else(|| config.room_url())
                            .map(|room| AgentGrant::new(room, data.token.clone()))
                            .ok_or_else(|| ConnectionError::AgentRequestFailed {
                                detail: MISSING_ROOM_DETAIL.to_string(),
                            })
                    });

                match grant {
                    Ok(grant) => {
                        inner.transition(Phase::Connecting {
                            grant: grant.clone(),
                        });
                        grant
                    }
                    Err(e) => {
                        error!("Agent request failed: {}", e);
                        inner.transition(Phase::Error(e.clone()));
                        return Err(e);
                    }
                }
            }
        };

        self.join(generation, grant, config).await
    }

    /// Decide how to run an attempt without suspending
    fn plan(&self, config: &SessionConfig) -> Result<Plan, ConnectionError> {
        if self.transport.is_none() {
            return Err(ConnectionError::TransportUnavailable);
        }

        let room_url = config.room_url();
        if config.manual_room_entry && room_url.is_none() {
            return Err(ConnectionError::InvalidRoomAddress);
        }

        if let Some(agent) = &self.agent {
            if config.auto_room_creation() || room_url.is_some() {
                return Ok(Plan::RequestAgent(Arc::clone(agent)));
            }
        }

        room_url
            .map(|room| Plan::Join(AgentGrant::new(room, None)))
            .ok_or(ConnectionError::InvalidRoomAddress)
    }

    async fn join(
        &self,
        generation: u64,
        grant: AgentGrant,
        config: &SessionConfig,
    ) -> Result<(), ConnectionError> {
        let Some(transport) = self.transport.as_ref() else {
            return Err(ConnectionError::TransportUnavailable);
        };

        // Always join muted; unmuting waits for the first active speaker
        let options = JoinOptions {
            url: grant.room_url.clone(),
            token: grant.token.clone().unwrap_or_default(),
            video_enabled: false,
            start_audio_off: true,
        };

        info!("Joining room {} via {}", grant.room_url, transport.name());
        let result = transport.join(options).await;

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            debug!("Discarding stale join result (generation {})", generation);
            return Ok(());
        }

        match result {
            Ok(()) => {
                inner.transition(Phase::Connected(ActiveCall {
                    grant,
                    has_started: false,
                    muted: config.start_audio_off,
                    start_audio_off: config.start_audio_off,
                    open_mic: config.open_mic,
                }));
                Ok(())
            }
            Err(e) => {
                error!("Error joining room {}: {:#}", grant.room_url, e);
                let err = ConnectionError::JoinFailed {
                    target: grant.room_url,
                };
                inner.transition(Phase::Error(err.clone()));
                Err(err)
            }
        }
    }

    /// End the session and return to the pre-call state
    ///
    /// Any in-flight request or join is abandoned and its result discarded.
    /// The bound metrics are replaced with a fresh aggregator.
    pub async fn leave(&self) {
        {
            let mut inner = self.inner.lock().await;
            if matches!(inner.phase, Phase::Idle) {
                debug!("leave() ignored: session idle");
                return;
            }
            inner.generation += 1;
            inner.metrics = MetricsAggregator::new();
            inner.transition(Phase::pre_call(self.config_step));
        }

        self.release_transport().await;
    }

    async fn release_transport(&self) {
        let Some(transport) = self.transport.as_ref() else {
            return;
        };

        if let Err(e) = transport.leave().await {
            warn!("Failed to leave room: {:#}", e);
        }
        if let Err(e) = transport.destroy().await {
            warn!("Failed to destroy transport: {:#}", e);
        }
    }

    /// Fatal meeting error: abandon the attempt and surface the error
    async fn fail_meeting(&self, detail: String) {
        {
            let mut inner = self.inner.lock().await;
            let state = inner.phase.state();
            if state.is_pre_call() || state.is_terminal() {
                debug!("Meeting error ignored in state {}: {}", state, detail);
                return;
            }
            error!("Meeting error: {}", detail);
            inner.generation += 1;
            inner.metrics = MetricsAggregator::new();
            inner.transition(Phase::Error(ConnectionError::MeetingFailed { detail }));
        }

        self.release_transport().await;
    }

    /// Flip the local mute flag
    ///
    /// The transport is called with the flag's value from before the toggle,
    /// then the flag is flipped. Returns the new flag, or `None` when not
    /// connected.
    pub async fn toggle_mute(&self) -> Option<bool> {
        let (generation, previous) = {
            let inner = self.inner.lock().await;
            match &inner.phase {
                Phase::Connected(call) => (inner.generation, call.muted),
                other => {
                    debug!("toggle_mute() ignored in state {}", other.state());
                    return None;
                }
            }
        };

        if let Some(transport) = self.transport.as_ref() {
            if let Err(e) = transport.set_local_audio(previous).await {
                warn!("Failed to set local audio: {:#}", e);
            }
        }

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            return None;
        }
        match &mut inner.phase {
            Phase::Connected(call) => {
                call.muted = !previous;
                Some(call.muted)
            }
            _ => None,
        }
    }

    /// Process one transport event
    ///
    /// Returns an application message to forward to presentation, if any.
    pub async fn handle_event(&self, event: TransportEvent) -> Option<AppMessage> {
        match event {
            TransportEvent::ActiveSpeakerChange { peer_id } => {
                self.on_active_speaker(peer_id).await;
                None
            }
            TransportEvent::MeetingStateChange(MeetingState::Error) => {
                self.fail_meeting("meeting entered error state".to_string())
                    .await;
                None
            }
            TransportEvent::MeetingStateChange(MeetingState::LeftMeeting) => {
                let mut inner = self.inner.lock().await;
                if let Phase::Connected(call) = &inner.phase {
                    let grant = call.grant.clone();
                    inner.transition(Phase::Finished { grant });
                }
                None
            }
            TransportEvent::MeetingStateChange(state) => {
                debug!("Meeting state: {:?}", state);
                None
            }
            TransportEvent::Error { detail } => {
                self.fail_meeting(detail).await;
                None
            }
            TransportEvent::AppMessage(payload) => self.on_app_message(&payload).await,
        }
    }

    async fn on_active_speaker(&self, peer_id: Option<String>) {
        // The guard is held across the unmute so `leave()` and fatal errors
        // cannot tear down the call between the decision and the transport call
        let mut inner = self.inner.lock().await;
        let Phase::Connected(call) = &mut inner.phase else {
            return;
        };
        if call.has_started {
            return;
        }
        info!("First active speaker ({:?}); agent is ready", peer_id);
        call.has_started = true;
        if call.start_audio_off {
            return;
        }

        if let Some(transport) = self.transport.as_ref() {
            if let Err(e) = transport.set_local_audio(true).await {
                warn!("Failed to unmute local audio: {:#}", e);
            }
        }
    }

    async fn on_app_message(&self, payload: &serde_json::Value) -> Option<AppMessage> {
        match AppMessage::parse(payload) {
            AppMessage::Metrics(batch) => {
                let mut inner = self.inner.lock().await;
                if !matches!(inner.phase, Phase::Connected(_)) {
                    debug!("Dropping metrics received in state {}", inner.phase.state());
                    return None;
                }
                let observed_at = Utc::now().timestamp_millis();
                for sample in batch.samples(observed_at) {
                    inner.metrics.add_stat(sample);
                }
                None
            }
            AppMessage::Unrecognized(tag) => {
                debug!("Ignoring app message with type {:?}", tag);
                None
            }
            message => Some(message),
        }
    }

    /// Drain transport events in arrival order, forwarding presentation messages
    pub async fn run<S>(&self, mut events: S, presentation: mpsc::Sender<AppMessage>)
    where
        S: Stream<Item = TransportEvent> + Unpin,
    {
        info!("Event loop started");

        while let Some(event) = events.next().await {
            if let Some(message) = self.handle_event(event).await {
                if presentation.send(message).await.is_err() {
                    debug!("Presentation receiver dropped");
                }
            }
        }

        info!("Event loop stopped");
    }

    pub async fn state(&self) -> LifecycleState {
        self.inner.lock().await.phase.state()
    }

    /// Label for the start control: progress text while handshaking
    pub async fn status_text(&self) -> &'static str {
        self.state().await.status_text()
    }

    /// Error that ended the current attempt
    pub async fn error(&self) -> Option<ConnectionError> {
        match &self.inner.lock().await.phase {
            Phase::Error(e) => Some(e.clone()),
            _ => None,
        }
    }

    /// Human-readable message for the current error
    pub async fn error_message(&self) -> Option<String> {
        self.error().await.map(|e| e.to_string())
    }

    /// Join target of the current attempt (`Connecting`, `Connected`, `Finished`)
    pub async fn grant(&self) -> Option<AgentGrant> {
        match &self.inner.lock().await.phase {
            Phase::Connecting { grant } | Phase::Finished { grant } => Some(grant.clone()),
            Phase::Connected(call) => Some(call.grant.clone()),
            _ => None,
        }
    }

    /// Whether the agent has spoken since the call connected
    pub async fn has_started(&self) -> bool {
        matches!(&self.inner.lock().await.phase, Phase::Connected(call) if call.has_started)
    }

    pub async fn is_muted(&self) -> Option<bool> {
        match &self.inner.lock().await.phase {
            Phase::Connected(call) => Some(call.muted),
            _ => None,
        }
    }

    pub async fn open_mic(&self) -> Option<bool> {
        match &self.inner.lock().await.phase {
            Phase::Connected(call) => Some(call.open_mic),
            _ => None,
        }
    }

    /// Snapshot of the bound metrics
    pub async fn metrics(&self) -> MetricsAggregator {
        self.inner.lock().await.metrics.clone()
    }

    /// Borrow the bound metrics without copying them
    pub async fn with_metrics<R>(&self, f: impl FnOnce(&MetricsAggregator) -> R) -> R {
        f(&self.inner.lock().await.metrics)
    }
}
