// Test doubles for the transport and backend seams.
//
// Each call pops a scripted reply; `Later` replies block until the test
// resolves them, which lets tests abandon an attempt mid-flight.

#![allow(dead_code)]

use anyhow::{bail, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use voice_agent_client::{
    AgentClient, AgentClientError, AppConfig, ConnectResponse, ConnectionOrchestrator, JoinOptions,
    LifecycleState, TransportSession,
};

pub enum Reply<T> {
    Now(T),
    Later(oneshot::Receiver<T>),
}

impl<T> Reply<T> {
    async fn resolve(self) -> Option<T> {
        match self {
            Reply::Now(v) => Some(v),
            Reply::Later(rx) => rx.await.ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Join(JoinOptions),
    Leave,
    Destroy,
    SetLocalAudio(bool),
}

#[derive(Default)]
pub struct FakeTransport {
    joins: Mutex<VecDeque<Reply<bool>>>,
    audio_gate: Mutex<Option<oneshot::Receiver<()>>>,
    calls: Mutex<Vec<TransportCall>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue the outcome of the next join (joins succeed when nothing is queued)
    pub fn push_join(&self, succeed: bool) {
        self.joins.lock().unwrap().push_back(Reply::Now(succeed));
    }

    /// Queue a join that resolves when the returned sender fires
    pub fn push_gated_join(&self) -> oneshot::Sender<bool> {
        let (tx, rx) = oneshot::channel();
        self.joins.lock().unwrap().push_back(Reply::Later(rx));
        tx
    }

    /// Block the next `set_local_audio` (after recording it) until the sender fires
    pub fn gate_next_audio(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.audio_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn joins(&self) -> Vec<JoinOptions> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TransportCall::Join(opts) => Some(opts),
                _ => None,
            })
            .collect()
    }

    pub fn audio_calls(&self) -> Vec<bool> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TransportCall::SetLocalAudio(enabled) => Some(enabled),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: TransportCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl TransportSession for FakeTransport {
    async fn join(&self, options: JoinOptions) -> Result<()> {
        self.record(TransportCall::Join(options));
        let reply = self.joins.lock().unwrap().pop_front();
        let succeed = match reply {
            Some(reply) => reply.resolve().await.unwrap_or(false),
            None => true,
        };
        if succeed {
            Ok(())
        } else {
            bail!("join rejected")
        }
    }

    async fn leave(&self) -> Result<()> {
        self.record(TransportCall::Leave);
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        self.record(TransportCall::Destroy);
        Ok(())
    }

    async fn set_local_audio(&self, enabled: bool) -> Result<()> {
        self.record(TransportCall::SetLocalAudio(enabled));
        let gate = self.audio_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub type AgentReply = Result<ConnectResponse, AgentClientError>;

#[derive(Default)]
pub struct FakeAgent {
    replies: Mutex<VecDeque<Reply<AgentReply>>>,
    requests: Mutex<usize>,
}

impl FakeAgent {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn replying(reply: AgentReply) -> Arc<Self> {
        let agent = Self::new();
        agent.push(reply);
        agent
    }

    pub fn push(&self, reply: AgentReply) {
        self.replies.lock().unwrap().push_back(Reply::Now(reply));
    }

    pub fn push_gated(&self) -> oneshot::Sender<AgentReply> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(Reply::Later(rx));
        tx
    }

    pub fn requests(&self) -> usize {
        *self.requests.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl AgentClient for FakeAgent {
    async fn start_agent(&self) -> Result<ConnectResponse, AgentClientError> {
        *self.requests.lock().unwrap() += 1;
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(reply) => reply.resolve().await.unwrap_or_else(|| {
                Err(AgentClientError::InvalidResponse("reply dropped".to_string()))
            }),
            None => Err(AgentClientError::InvalidResponse("no reply scripted".to_string())),
        }
    }

    async fn fetch_config(&self) -> AppConfig {
        AppConfig::default()
    }

    fn server_url(&self) -> &str {
        "http://fake/"
    }
}

pub fn granted(url: &str, token: Option<&str>) -> AgentReply {
    Ok(ConnectResponse {
        url: Some(url.to_string()),
        room_url: None,
        token: token.map(str::to_string),
    })
}

pub fn rejected(detail: &str) -> AgentReply {
    Err(AgentClientError::Rejected {
        status: 500,
        detail: detail.to_string(),
    })
}

/// Yield until the orchestrator reaches `state` (fails after 1s)
pub async fn wait_for_state(orch: &ConnectionOrchestrator, state: LifecycleState) {
    let reached = tokio::time::timeout(Duration::from_secs(1), async {
        while orch.state().await != state {
            tokio::task::yield_now().await;
        }
    })
    .await;
    assert!(reached.is_ok(), "timed out waiting for state {}", state);
}
