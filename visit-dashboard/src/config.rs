//! Client configuration.
//!
//! Resolved once at startup and handed to [`HttpAgentClient`](crate::client::HttpAgentClient);
//! nothing below reads the environment while a submission is in flight.

use crate::error::{DashboardError, Result};

pub const API_URL_ENV: &str = "AGENTS_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

pub const PROCESS_PATH: &str = "/api/agents/process";
pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');

        if trimmed.is_empty() {
            return Err(DashboardError::Config("API base URL cannot be empty".into()));
        }
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(DashboardError::Config(format!(
                "API base URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        Ok(Self {
            base_url: trimmed.to_string(),
        })
    }

    /// Reads `AGENTS_API_URL`, falling back to the local backend.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn process_url(&self) -> String {
        format!("{}{}", self.base_url, PROCESS_PATH)
    }

    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url, HEALTH_PATH)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
        }
    }
}
