//! Plain-text rendering of the dashboard.
//!
//! Each function returns a `String` so the terminal front end and tests share one view.

use std::fmt::Write;

use crate::{
    models::{AgentResponse, CoachGuidance, Task},
    state::{DashboardState, Tab},
};

pub const TITLE: &str = "Protect Health Dashboard";
pub const SUBTITLE: &str = "Multi-agent system for patient care coordination";
pub const NO_REPORT: &str = "No report available";

const RULE: &str = "------------------------------------------------------------";

pub fn render_header() -> String {
    format!("{}\n{}\n{}\n", TITLE, SUBTITLE, RULE)
}

pub fn render_form(state: &DashboardState) -> String {
    let form = &state.form;
    let mut out = String::new();
    let _ = writeln!(out, "Patient Condition: {}", form.condition);
    let _ = writeln!(
        out,
        "Visit Type: {}",
        form.visit_type
            .map(|v| v.label())
            .unwrap_or("Select visit type")
    );
    let _ = writeln!(out, "Visit Transcript:");
    for line in form.transcript.lines() {
        let _ = writeln!(out, "  {}", line);
    }
    out
}

pub fn render_submit_button(state: &DashboardState) -> String {
    let label = if state.is_loading() {
        "Processing..."
    } else {
        "Process with AI Agents"
    };
    if state.can_submit() {
        format!("[ {} ]", label)
    } else {
        format!("[ {} ] (disabled)", label)
    }
}

pub fn render_error_banner(state: &DashboardState) -> Option<String> {
    state.error().map(|message| format!("Error\n{}\n", message))
}

pub fn tab_label(tab: Tab, response: &AgentResponse) -> String {
    match tab {
        Tab::Tasks => format!("Tasks ({})", response.task_count()),
        Tab::Coach => "Pre-Visit Coaching".to_string(),
        Tab::Report => "Health Report".to_string(),
    }
}

pub fn render_tab_bar(response: &AgentResponse, active: Tab) -> String {
    Tab::ALL
        .iter()
        .map(|&tab| {
            let label = tab_label(tab, response);
            if tab == active {
                format!("[{}]", label)
            } else {
                format!(" {} ", label)
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Confidence as a whole percentage, rounding halves up.
pub fn format_confidence(confidence: f64) -> String {
    let percent = (confidence * 100.0 + 0.5).floor() as i64;
    format!("{}% confidence", percent)
}

fn render_task(out: &mut String, task: &Task) {
    let _ = writeln!(
        out,
        "- {}  ({})",
        task.title,
        format_confidence(task.confidence)
    );
    if let Some(due) = task.due_date.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "  Due: {}", due);
    }
    let _ = writeln!(out, "  Source: {}", task.source);
}

pub fn render_tasks(response: &AgentResponse) -> String {
    let mut out = String::from("Extracted Tasks\n");
    for task in response.tasks() {
        render_task(&mut out, task);
    }
    out
}

fn render_guidance(guidance: &CoachGuidance) -> String {
    let mut out = String::from("Pre-Visit Checklist\n");
    for item in &guidance.checklist {
        let _ = writeln!(out, "  [x] {}", item);
    }

    out.push_str("\nImportant Cautions\n");
    for item in &guidance.cautions {
        let _ = writeln!(out, "  [!] {}", item);
    }

    out.push_str("\nQuestions for Your Doctor\n");
    for (idx, item) in guidance.questions_for_doctor.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", idx + 1, item);
    }
    out
}

/// Coaching lists, or an empty string when the response carries no guidance.
pub fn render_coaching(response: &AgentResponse) -> String {
    response
        .guidance
        .as_ref()
        .map(render_guidance)
        .unwrap_or_default()
}

pub fn render_report(response: &AgentResponse) -> String {
    let mut out = response.report_text().unwrap_or(NO_REPORT).to_string();
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

pub fn render_tab(response: &AgentResponse, tab: Tab) -> String {
    match tab {
        Tab::Tasks => render_tasks(response),
        Tab::Coach => render_coaching(response),
        Tab::Report => render_report(response),
    }
}

/// Full page: header, form, trigger, error banner and, once a response exists, the tabs.
pub fn render_dashboard(state: &DashboardState) -> String {
    let mut out = render_header();
    out.push_str(&render_form(state));
    out.push('\n');
    out.push_str(&render_submit_button(state));
    out.push('\n');

    if let Some(banner) = render_error_banner(state) {
        out.push('\n');
        out.push_str(&banner);
    }

    if let Some(response) = state.response() {
        out.push('\n');
        out.push_str(&render_tab_bar(response, state.active_tab()));
        out.push('\n');
        out.push_str(RULE);
        out.push('\n');
        out.push_str(&render_tab(response, state.active_tab()));
    }
    out
}
