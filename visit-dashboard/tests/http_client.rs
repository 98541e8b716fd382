//! Drives `HttpAgentClient` against an in-process axum stand-in for the agents service.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use visit_dashboard::{
    AgentService, ClientConfig, Dashboard, DashboardError, DashboardState, HttpAgentClient,
    SubmitOutcome, Tab, VisitForm, VisitType, client::CORRELATION_HEADER, render,
};

#[derive(Clone)]
struct Backend {
    status: StatusCode,
    body: &'static str,
    seen: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

impl Backend {
    fn replying(status: StatusCode, body: &'static str) -> Self {
        Self {
            status,
            body,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn requests(&self) -> Vec<(HeaderMap, Value)> {
        self.seen.lock().unwrap().clone()
    }
}

async fn process(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], &'static str) {
    backend.seen.lock().unwrap().push((headers, body));
    (
        backend.status,
        [(header::CONTENT_TYPE, "application/json")],
        backend.body,
    )
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "healthcare-agents-api" }))
}

async fn spawn_backend(backend: Backend) -> anyhow::Result<ClientConfig> {
    let app = Router::new()
        .route("/api/agents/process", post(process))
        .route("/health", get(health))
        .with_state(backend);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(ClientConfig::new(format!("http://{}", addr))?)
}

fn filled_state() -> DashboardState {
    DashboardState::with_form(VisitForm::new(
        "Doctor increased metformin to 1000mg twice daily. Recheck A1C in three months.",
        "Type 2 Diabetes",
        VisitType::FollowUp,
    ))
}

const FULL_BODY: &str = r#"{
    "tasks": [
        {"title": "Follow up on medication changes", "due_date": "2024-01-15",
         "source": "Doctor's recommendation", "confidence": 0.95},
        {"title": "Schedule blood work", "due_date": "2024-01-20",
         "source": "Lab results needed", "confidence": 0.88}
    ],
    "guidance": {
        "checklist": ["Bring current medication list", "Prepare questions about symptoms"],
        "cautions": ["Monitor blood sugar levels closely"],
        "questions_for_doctor": ["How often should I check my blood sugar?"]
    },
    "report": "Health report generated successfully."
}"#;

#[tokio::test]
async fn test_successful_submission_round_trip() -> anyhow::Result<()> {
    let backend = Backend::replying(StatusCode::OK, FULL_BODY);
    let config = spawn_backend(backend.clone()).await?;
    let dashboard = Dashboard::with_state(HttpAgentClient::new(config), filled_state());

    let outcome = dashboard.submit().await;
    assert!(matches!(outcome, SubmitOutcome::Succeeded { .. }));

    let state = dashboard.snapshot();
    assert_eq!(state.active_tab(), Tab::Tasks);
    let response = state.response().expect("response stored");
    assert_eq!(response.task_count(), 2);
    assert!(render::render_tasks(response).contains("88% confidence"));

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    let (headers, body) = &requests[0];
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(headers[header::ACCEPT], "application/json");
    assert!(headers.contains_key(CORRELATION_HEADER));

    assert_eq!(body["condition"], "Type 2 Diabetes");
    assert_eq!(body["visit_type"], "Follow-up");
    assert_eq!(body["current_metrics"]["blood_pressure"], "120/80");
    assert_eq!(body["prior_metrics"]["heart_rate"], 75);
    assert_eq!(
        body["session_id"].as_str(),
        outcome.session_id().map(|id| id.as_str())
    );
    Ok(())
}

#[tokio::test]
async fn test_server_error_produces_fallback() -> anyhow::Result<()> {
    let backend = Backend::replying(StatusCode::INTERNAL_SERVER_ERROR, FULL_BODY);
    let config = spawn_backend(backend).await?;
    let dashboard = Dashboard::with_state(HttpAgentClient::new(config), filled_state());

    let outcome = dashboard.submit().await;
    assert!(matches!(
        outcome,
        SubmitOutcome::Failed {
            error: DashboardError::HttpStatus(500),
            ..
        }
    ));

    let state = dashboard.snapshot();
    assert!(!state.is_loading());
    assert_eq!(state.active_tab(), Tab::Report);

    let response = state.response().expect("fallback stored");
    let guidance = response.guidance.as_ref().expect("fallback guidance");
    assert_eq!(guidance.checklist.len(), 1);
    assert_eq!(guidance.cautions.len(), 1);
    assert_eq!(guidance.questions_for_doctor.len(), 1);

    let report = response.report_text().expect("fallback report");
    assert!(report.contains("Connection Error"));
    assert!(report.contains("HTTP error! status: 500"));
    Ok(())
}

#[tokio::test]
async fn test_empty_object_takes_failure_path() -> anyhow::Result<()> {
    let backend = Backend::replying(StatusCode::OK, "{}");
    let config = spawn_backend(backend).await?;
    let client = HttpAgentClient::new(config);

    let payload = VisitForm::new("t", "c", VisitType::Initial)
        .to_payload(visit_dashboard::SessionId::now())
        .expect("complete form");
    assert_eq!(
        client.process(&payload).await,
        Err(DashboardError::InvalidResponse)
    );

    let dashboard = Dashboard::with_state(client, filled_state());
    dashboard.submit().await;
    let state = dashboard.snapshot();
    assert_eq!(
        state.error(),
        Some("Failed to connect with AI agents: Invalid response format from AI agents")
    );
    assert_eq!(state.active_tab(), Tab::Report);
    Ok(())
}

#[tokio::test]
async fn test_report_only_success() -> anyhow::Result<()> {
    let backend = Backend::replying(StatusCode::OK, r#"{"report": "Only a report"}"#);
    let config = spawn_backend(backend).await?;
    let dashboard = Dashboard::with_state(HttpAgentClient::new(config), filled_state());

    dashboard.submit().await;
    let state = dashboard.snapshot();
    assert!(state.error().is_none());

    let page = render::render_dashboard(&state);
    assert!(page.contains("[Tasks (0)]"));
    assert!(dashboard.select_tab(Tab::Coach));
    assert_eq!(
        render::render_tab(state.response().expect("response"), Tab::Coach),
        ""
    );
    Ok(())
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let config = ClientConfig::new(format!("http://{}", addr))?;
    let dashboard = Dashboard::with_state(HttpAgentClient::new(config), filled_state());

    let outcome = dashboard.submit().await;
    assert!(matches!(
        outcome,
        SubmitOutcome::Failed {
            error: DashboardError::Transport(_),
            ..
        }
    ));

    let state = dashboard.snapshot();
    assert!(!state.is_loading());
    assert!(
        state
            .response()
            .and_then(|r| r.report_text())
            .is_some_and(|r| r.starts_with("Connection Error"))
    );
    Ok(())
}

#[tokio::test]
async fn test_health_probe() -> anyhow::Result<()> {
    let config = spawn_backend(Backend::replying(StatusCode::OK, "{}")).await?;
    let client = HttpAgentClient::new(config);

    let health = client.health().await?;
    assert!(health.is_healthy());
    assert_eq!(health.service.as_deref(), Some("healthcare-agents-api"));
    Ok(())
}
