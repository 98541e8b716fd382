pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod payload;
pub mod render;
pub mod state;
pub mod store;

// Re-export commonly used types
pub use client::{AgentService, HttpAgentClient};
pub use config::ClientConfig;
pub use error::{DashboardError, Result};
pub use models::{
    AgentResponse, BloodPressure, CoachGuidance, HealthStatus, MetricsSnapshot, Task, VisitType,
};
pub use payload::{SessionId, SubmissionPayload, VisitForm};
pub use state::{DashboardState, Phase, Tab};
pub use store::{Dashboard, SubmitOutcome};
