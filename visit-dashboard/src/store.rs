//! Dashboard store: the view state plus the service it submits to.
//!
//! The state lives behind an `Arc<Mutex<_>>` so a renderer (for example a spinner task) can
//! take snapshots while a submission is awaiting the network. The lock is never held across
//! an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};

use crate::{
    client::AgentService,
    error::DashboardError,
    models::VisitType,
    payload::SessionId,
    state::{DashboardState, Tab},
};

/// How a call to [`Dashboard::submit`] ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The trigger was disabled: incomplete form or a submission already in flight.
    Skipped,
    Succeeded { session_id: SessionId },
    Failed {
        session_id: SessionId,
        error: DashboardError,
    },
}

impl SubmitOutcome {
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            SubmitOutcome::Skipped => None,
            SubmitOutcome::Succeeded { session_id } | SubmitOutcome::Failed { session_id, .. } => {
                Some(session_id)
            }
        }
    }
}

pub struct Dashboard<S: AgentService> {
    state: Arc<Mutex<DashboardState>>,
    service: Arc<S>,
}

impl<S: AgentService> Clone for Dashboard<S> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            service: self.service.clone(),
        }
    }
}

impl<S: AgentService> Dashboard<S> {
    pub fn new(service: S) -> Self {
        Self::with_state(service, DashboardState::new())
    }

    pub fn with_state(service: S, state: DashboardState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            service: Arc::new(service),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state for rendering.
    pub fn snapshot(&self) -> DashboardState {
        self.lock().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading()
    }

    pub fn set_transcript(&self, transcript: impl Into<String>) {
        self.lock().set_transcript(transcript);
    }

    pub fn set_condition(&self, condition: impl Into<String>) {
        self.lock().set_condition(condition);
    }

    pub fn set_visit_type(&self, visit_type: Option<VisitType>) {
        self.lock().set_visit_type(visit_type);
    }

    pub fn select_tab(&self, tab: Tab) -> bool {
        self.lock().select_tab(tab)
    }

    /// Run one submit cycle: validate, send, then apply the outcome to the state.
    ///
    /// `loading` is cleared on every exit path, including when this future is dropped
    /// before the service call settles.
    pub async fn submit(&self) -> SubmitOutcome {
        let session_id = SessionId::now();
        let payload = {
            let mut state = self.lock();
            if !state.can_submit() {
                debug!("Submit ignored: form incomplete or request in flight");
                return SubmitOutcome::Skipped;
            }
            match state.begin_submission(session_id.clone()) {
                Some(payload) => payload,
                None => return SubmitOutcome::Skipped,
            }
        };

        let guard = LoadingGuard::new(self.state.clone());
        debug!("Submission {} in flight", session_id);

        let outcome = self.service.process(&payload).await;
        let summary = match &outcome {
            Ok(response) => {
                info!(
                    "AI agents response for {}: {} task(s), guidance: {}, report: {}",
                    session_id,
                    response.task_count(),
                    response.guidance.is_some(),
                    response.report_text().is_some()
                );
                SubmitOutcome::Succeeded {
                    session_id: session_id.clone(),
                }
            }
            Err(e) => {
                error!("Error processing {} with AI agents: {}", session_id, e);
                SubmitOutcome::Failed {
                    session_id: session_id.clone(),
                    error: e.clone(),
                }
            }
        };

        self.lock().complete_submission(outcome);
        guard.disarm();
        summary
    }
}

/// Clears `loading` if a submission is abandoned mid-flight.
struct LoadingGuard {
    state: Arc<Mutex<DashboardState>>,
    armed: bool,
}

impl LoadingGuard {
    fn new(state: Arc<Mutex<DashboardState>>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if self.armed {
            self.state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .abort_submission();
        }
    }
}
