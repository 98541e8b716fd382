use thiserror::Error;

/// Errors raised while talking to the agents service or setting up the client.
///
/// The `Display` text of each variant is what the dashboard shows to the user, so the
/// wording is part of the contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    #[error("Invalid response format from AI agents")]
    InvalidResponse,

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("{0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DashboardError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            DashboardError::HttpStatus(status.as_u16())
        } else {
            DashboardError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
