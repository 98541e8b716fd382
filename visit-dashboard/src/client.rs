use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::{Instrument, debug, info, warn};
use uuid::Uuid;

use crate::{
    config::ClientConfig,
    error::{DashboardError, Result},
    models::{AgentResponse, HealthStatus},
    payload::SubmissionPayload,
};

pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Backend that turns a visit submission into tasks, coaching and a report.
#[async_trait]
pub trait AgentService: Send + Sync {
    /// Submit one visit. Resolves exactly once; no retry, no timeout.
    async fn process(&self, payload: &SubmissionPayload) -> Result<AgentResponse>;

    /// Liveness probe against the backend.
    async fn health(&self) -> Result<HealthStatus>;
}

/// [`AgentService`] over HTTP/JSON.
#[derive(Clone)]
pub struct HttpAgentClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpAgentClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn with_client(http: reqwest::Client, config: ClientConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl AgentService for HttpAgentClient {
    async fn process(&self, payload: &SubmissionPayload) -> Result<AgentResponse> {
        let correlation_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "agents_process",
            correlation_id = %correlation_id,
            session_id = %payload.session_id
        );

        async {
            info!(
                "Submitting {} visit for '{}' to {}",
                payload.visit_type,
                payload.condition,
                self.config.process_url()
            );

            let response = self
                .http
                .post(self.config.process_url())
                .header(CONTENT_TYPE, "application/json")
                .header(ACCEPT, "application/json")
                .header(CORRELATION_HEADER, correlation_id.as_str())
                .json(payload)
                .send()
                .await
                .map_err(|e| {
                    warn!("Agents request failed: {}", e);
                    DashboardError::Transport(e.to_string())
                })?;

            let status = response.status();
            if !status.is_success() {
                warn!("Agents service answered with status {}", status);
                return Err(DashboardError::HttpStatus(status.as_u16()));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| DashboardError::Transport(e.to_string()))?;
            debug!("Received {} byte response body", body.len());

            parse_agent_response(&body)
        }
        .instrument(span)
        .await
    }

    async fn health(&self) -> Result<HealthStatus> {
        let response = self
            .http
            .get(self.config.health_url())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| DashboardError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::HttpStatus(status.as_u16()));
        }

        Ok(response.json::<HealthStatus>().await?)
    }
}

/// Decode a 2xx body, rejecting anything that carries none of tasks, guidance or report.
pub fn parse_agent_response(body: &[u8]) -> Result<AgentResponse> {
    let value: Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        warn!("Agents response is not a JSON object");
        return Err(DashboardError::InvalidResponse);
    }

    let response: AgentResponse = serde_json::from_value(value)?;
    if !response.has_content() {
        warn!("Agents response carries no tasks, guidance or report");
        return Err(DashboardError::InvalidResponse);
    }

    Ok(response)
}
