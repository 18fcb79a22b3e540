use super::messages::{ConnectRequest, ConnectResponse, ErrorResponse};
use crate::config::AppConfig;
use thiserror::Error;
use tracing::{error, info, warn};

/// Fallback detail when the backend rejects without an explanation
const DEFAULT_REJECT_DETAIL: &str = "Failed to connect";

/// Detail surfaced when no response arrived at all
const NETWORK_DETAIL: &str = "Network error connecting to server";

#[derive(Error, Debug)]
pub enum AgentClientError {
    #[error("Network error connecting to server: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Agent request rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Invalid response from agent server: {0}")]
    InvalidResponse(String),
}

impl AgentClientError {
    /// User-facing detail for this failure
    pub fn detail(&self) -> String {
        match self {
            AgentClientError::Network(_) => NETWORK_DETAIL.to_string(),
            AgentClientError::Rejected { detail, .. } => detail.clone(),
            AgentClientError::InvalidResponse(_) => NETWORK_DETAIL.to_string(),
        }
    }
}

/// REST collaborator that provisions agents and rooms
#[async_trait::async_trait]
pub trait AgentClient: Send + Sync {
    /// Ask the backend to start an agent and create its room
    async fn start_agent(&self) -> Result<ConnectResponse, AgentClientError>;

    /// Fetch client configuration; falls back to defaults on any failure
    async fn fetch_config(&self) -> AppConfig;

    /// Backend base URL (for logging)
    fn server_url(&self) -> &str;
}

/// Ensure the base URL ends with a single `/` so endpoints can be appended
pub fn normalize_server_url(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// `AgentClient` backed by reqwest
pub struct HttpAgentClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAgentClient {
    pub fn new(server_url: &str) -> Result<Self, AgentClientError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, server_url))
    }

    pub fn with_client(client: reqwest::Client, server_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_server_url(server_url),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl AgentClient for HttpAgentClient {
    async fn start_agent(&self) -> Result<ConnectResponse, AgentClientError> {
        let url = self.endpoint("connect");
        info!("Requesting agent from {}", url);

        let response = self
            .client
            .post(&url)
            .json(&ConnectRequest::default())
            .send()
            .await
            .map_err(|e| {
                error!("Exception connecting to agent: {}", e);
                AgentClientError::Network(e)
            })?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.detail)
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| DEFAULT_REJECT_DETAIL.to_string());
            error!("Error connecting to agent ({}): {}", status, detail);
            return Err(AgentClientError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let data: ConnectResponse = serde_json::from_slice(&body)
            .map_err(|e| {
                error!("Invalid response from agent server: {}", e);
                AgentClientError::InvalidResponse(e.to_string())
            })?;

        info!(
            "Agent started (room={:?}, credential={})",
            data.room(),
            data.token().is_some()
        );

        Ok(data)
    }

    async fn fetch_config(&self) -> AppConfig {
        let url = self.endpoint("config");
        info!("Fetching config from {}", url);

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Error fetching config, using defaults: {}", e);
                return AppConfig::default();
            }
        };

        if !response.status().is_success() {
            warn!(
                "Failed to fetch config from server ({}), using defaults",
                response.status()
            );
            return AppConfig::default();
        }

        match response.json::<AppConfig>().await {
            Ok(config) => {
                info!("Loaded app config: {:?}", config);
                config
            }
            Err(e) => {
                warn!("Invalid config document, using defaults: {}", e);
                AppConfig::default()
            }
        }
    }

    fn server_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_appends_slash() {
        assert_eq!(normalize_server_url("/api"), "/api/");
        assert_eq!(normalize_server_url("http://host/api/"), "http://host/api/");
    }

    #[test]
    fn test_rejected_detail_verbatim() {
        let err = AgentClientError::Rejected {
            status: 500,
            detail: "x".to_string(),
        };
        assert_eq!(err.detail(), "x");
    }

    #[test]
    fn test_invalid_response_detail_hides_parser_error() {
        let err = AgentClientError::InvalidResponse("expected value at line 1".to_string());
        assert_eq!(err.detail(), "Network error connecting to server");
        assert!(err.to_string().contains("expected value"));
    }
}
