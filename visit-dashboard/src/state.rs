use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{
    error::DashboardError,
    models::{AgentResponse, VisitType},
    payload::{SessionId, SubmissionPayload, VisitForm},
};

/// Result view currently shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Tasks,
    Coach,
    Report,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Tasks, Tab::Coach, Tab::Report];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Tasks => "tasks",
            Tab::Coach => "coach",
            Tab::Report => "report",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tasks" => Ok(Tab::Tasks),
            "coach" | "coaching" => Ok(Tab::Coach),
            "report" => Ok(Tab::Report),
            other => Err(format!(
                "unknown tab '{}', expected tasks, coach or report",
                other
            )),
        }
    }
}

/// Where the dashboard sits in the submit/render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    DisplayingSuccess,
    DisplayingError,
}

/// All view state of the dashboard. Mutated only through the transitions below.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub form: VisitForm,
    loading: bool,
    response: Option<AgentResponse>,
    active_tab: Tab,
    error: Option<String>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form(form: VisitForm) -> Self {
        Self {
            form,
            ..Self::default()
        }
    }

    pub fn set_transcript(&mut self, transcript: impl Into<String>) {
        self.form.transcript = transcript.into();
    }

    pub fn set_condition(&mut self, condition: impl Into<String>) {
        self.form.condition = condition.into();
    }

    pub fn set_visit_type(&mut self, visit_type: Option<VisitType>) {
        self.form.visit_type = visit_type;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn response(&self) -> Option<&AgentResponse> {
        self.response.as_ref()
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the submit trigger is enabled.
    pub fn can_submit(&self) -> bool {
        self.form.is_complete() && !self.loading
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Submitting
        } else if self.error.is_some() {
            Phase::DisplayingError
        } else if self.response.is_some() {
            Phase::DisplayingSuccess
        } else {
            Phase::Idle
        }
    }

    /// Enter the loading state and hand back the request body.
    ///
    /// Returns `None` and leaves the state untouched when the form is incomplete.
    pub fn begin_submission(&mut self, session_id: SessionId) -> Option<SubmissionPayload> {
        let payload = self.form.to_payload(session_id)?;
        self.loading = true;
        self.response = None;
        self.error = None;
        Some(payload)
    }

    /// Apply the settled outcome of a submission. Always clears `loading`.
    pub fn complete_submission(&mut self, outcome: Result<AgentResponse, DashboardError>) {
        match outcome {
            Ok(response) => {
                self.response = Some(response);
                self.active_tab = Tab::Tasks;
            }
            Err(err) => {
                self.error = Some(format!("Failed to connect with AI agents: {}", err));
                self.response = Some(AgentResponse::fallback(&err));
                self.active_tab = Tab::Report;
            }
        }
        self.loading = false;
    }

    /// Clears `loading` without touching the response; used when a submission is abandoned.
    pub(crate) fn abort_submission(&mut self) {
        self.loading = false;
    }

    /// Switch tabs. Tabs are hidden until a response exists, so this is a no-op before then.
    pub fn select_tab(&mut self, tab: Tab) -> bool {
        if self.response.is_none() {
            return false;
        }
        self.active_tab = tab;
        true
    }
}
