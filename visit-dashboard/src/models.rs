use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A follow-up action extracted from the visit by the agents service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default = "default_task_source", deserialize_with = "source_or_default")]
    pub source: String,
    #[serde(
        default = "default_task_confidence",
        deserialize_with = "confidence_or_default"
    )]
    pub confidence: f64,
}

fn default_task_source() -> String {
    "doctor".to_string()
}

fn default_task_confidence() -> f64 {
    0.8
}

// The service sends `null` for fields it could not fill; treat those like missing keys.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn source_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_task_source))
}

fn confidence_or_default<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_else(default_task_confidence))
}

/// Pre-visit coaching produced by the coach agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoachGuidance {
    #[serde(default, deserialize_with = "null_as_default")]
    pub checklist: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cautions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions_for_doctor: Vec<String>,
}

/// Everything the agents service returns for one submission.
///
/// Every field is optional on the wire; callers use the accessors, which treat an absent
/// field as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<CoachGuidance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
}

pub const FALLBACK_CHECKLIST_ITEM: &str = "Unable to process transcript at this time";
pub const FALLBACK_CAUTION: &str = "Please check your connection and try again";
pub const FALLBACK_QUESTION: &str = "Contact your healthcare provider directly if urgent";

impl AgentResponse {
    /// True when at least one of tasks, guidance or a non-empty report is present.
    pub fn has_content(&self) -> bool {
        self.tasks.is_some() || self.guidance.is_some() || self.report_text().is_some()
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.as_deref().unwrap_or_default()
    }

    pub fn task_count(&self) -> usize {
        self.tasks().len()
    }

    pub fn report_text(&self) -> Option<&str> {
        self.report.as_deref().filter(|r| !r.is_empty())
    }

    /// Synthetic payload shown when a submission fails, so the report tab is never empty.
    pub fn fallback(message: impl fmt::Display) -> Self {
        Self {
            tasks: Some(Vec::new()),
            guidance: Some(CoachGuidance {
                checklist: vec![FALLBACK_CHECKLIST_ITEM.to_string()],
                cautions: vec![FALLBACK_CAUTION.to_string()],
                questions_for_doctor: vec![FALLBACK_QUESTION.to_string()],
            }),
            report: Some(format!(
                "Connection Error: Could not reach AI agents service. {}",
                message
            )),
        }
    }
}

/// Kind of visit the transcript came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisitType {
    #[serde(rename = "Follow-up")]
    FollowUp,
    #[serde(rename = "Initial")]
    Initial,
    #[serde(rename = "Emergency")]
    Emergency,
    #[serde(rename = "Routine")]
    Routine,
}

impl VisitType {
    pub const ALL: [VisitType; 4] = [
        VisitType::FollowUp,
        VisitType::Initial,
        VisitType::Emergency,
        VisitType::Routine,
    ];

    /// Value sent to the agents service.
    pub fn as_wire(&self) -> &'static str {
        match self {
            VisitType::FollowUp => "Follow-up",
            VisitType::Initial => "Initial",
            VisitType::Emergency => "Emergency",
            VisitType::Routine => "Routine",
        }
    }

    /// Human-readable label for menus.
    pub fn label(&self) -> &'static str {
        match self {
            VisitType::FollowUp => "Follow-up",
            VisitType::Initial => "Initial Consultation",
            VisitType::Emergency => "Emergency",
            VisitType::Routine => "Routine Check-up",
        }
    }
}

impl fmt::Display for VisitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for VisitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        VisitType::ALL
            .into_iter()
            .find(|v| {
                v.as_wire().eq_ignore_ascii_case(needle) || v.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| {
                format!(
                    "unknown visit type '{}', expected one of: Follow-up, Initial, Emergency, Routine",
                    s
                )
            })
    }
}

/// Blood pressure reading, carried on the wire as `"SYS/DIA"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BloodPressure {
    pub systolic: u16,
    pub diastolic: u16,
}

impl BloodPressure {
    pub const fn new(systolic: u16, diastolic: u16) -> Self {
        Self {
            systolic,
            diastolic,
        }
    }
}

impl fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.systolic, self.diastolic)
    }
}

impl FromStr for BloodPressure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (sys, dia) = s
            .split_once('/')
            .ok_or_else(|| format!("blood pressure '{}' is not in SYS/DIA form", s))?;
        let systolic = sys
            .trim()
            .parse()
            .map_err(|e| format!("invalid systolic value '{}': {}", sys, e))?;
        let diastolic = dia
            .trim()
            .parse()
            .map_err(|e| format!("invalid diastolic value '{}': {}", dia, e))?;
        Ok(Self::new(systolic, diastolic))
    }
}

impl TryFrom<String> for BloodPressure {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BloodPressure> for String {
    fn from(value: BloodPressure) -> Self {
        value.to_string()
    }
}

/// Point-in-time patient metrics sent alongside the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub blood_sugar: f64,
    pub weight: f64,
    pub blood_pressure: BloodPressure,
    pub heart_rate: u32,
}

impl MetricsSnapshot {
    /// Fixed "current" reading submitted with every visit.
    pub fn current() -> Self {
        Self {
            blood_sugar: 145.0,
            weight: 185.0,
            blood_pressure: BloodPressure::new(120, 80),
            heart_rate: 72,
        }
    }

    /// Fixed "prior" reading submitted with every visit.
    pub fn prior() -> Self {
        Self {
            blood_sugar: 160.0,
            weight: 190.0,
            blood_pressure: BloodPressure::new(130, 85),
            heart_rate: 75,
        }
    }
}

/// Body of the backend's `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}
