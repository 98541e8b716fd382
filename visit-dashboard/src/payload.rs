use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{MetricsSnapshot, VisitType};

const SESSION_PREFIX: &str = "session_";

/// Identifier of one submission, `session_<unix millis>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self(format!("{}{}", SESSION_PREFIX, timestamp.timestamp_millis()))
    }

    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Millisecond timestamp the id was minted from.
    pub fn millis(&self) -> Option<i64> {
        self.0.strip_prefix(SESSION_PREFIX)?.parse().ok()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// JSON body of `POST /api/agents/process`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub transcript: String,
    pub condition: String,
    pub visit_type: VisitType,
    pub current_metrics: MetricsSnapshot,
    pub prior_metrics: MetricsSnapshot,
    pub session_id: SessionId,
}

/// The three user-editable inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitForm {
    pub transcript: String,
    pub condition: String,
    pub visit_type: Option<VisitType>,
}

impl VisitForm {
    pub fn new(
        transcript: impl Into<String>,
        condition: impl Into<String>,
        visit_type: VisitType,
    ) -> Self {
        Self {
            transcript: transcript.into(),
            condition: condition.into(),
            visit_type: Some(visit_type),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.transcript.is_empty() && !self.condition.is_empty() && self.visit_type.is_some()
    }

    /// Builds the request body, or `None` while any field is still empty.
    pub fn to_payload(&self, session_id: SessionId) -> Option<SubmissionPayload> {
        if !self.is_complete() {
            return None;
        }
        Some(SubmissionPayload {
            transcript: self.transcript.clone(),
            condition: self.condition.clone(),
            visit_type: self.visit_type?,
            current_metrics: MetricsSnapshot::current(),
            prior_metrics: MetricsSnapshot::prior(),
            session_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_session_id_format() {
        let ts = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let id = SessionId::at(ts);
        assert_eq!(id.as_str(), "session_1700000000123");
        assert_eq!(id.millis(), Some(1_700_000_000_123));
    }

    #[test]
    fn test_session_ids_differ_by_elapsed_time() {
        let first = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let later = first + chrono::Duration::milliseconds(250);
        let a = SessionId::at(first);
        let b = SessionId::at(later);
        assert_ne!(a, b);
        assert_eq!(b.millis().unwrap() - a.millis().unwrap(), 250);
    }

    #[test]
    fn test_incomplete_form_has_no_payload() {
        let mut form = VisitForm {
            transcript: "Patient reports dizziness".to_string(),
            condition: "Hypertension".to_string(),
            visit_type: None,
        };
        assert!(!form.is_complete());
        assert!(form.to_payload(SessionId::now()).is_none());

        form.visit_type = Some(VisitType::Routine);
        form.condition.clear();
        assert!(form.to_payload(SessionId::now()).is_none());
    }

    #[test]
    fn test_whitespace_counts_as_content() {
        let form = VisitForm::new(" ", " ", VisitType::Emergency);
        assert!(form.is_complete());
    }

    #[test]
    fn test_payload_wire_shape() {
        let form = VisitForm::new(
            "Doctor adjusted metformin dose",
            "Type 2 Diabetes",
            VisitType::FollowUp,
        );
        let ts = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let payload = form.to_payload(SessionId::at(ts)).unwrap();

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "transcript": "Doctor adjusted metformin dose",
                "condition": "Type 2 Diabetes",
                "visit_type": "Follow-up",
                "current_metrics": {
                    "blood_sugar": 145.0,
                    "weight": 185.0,
                    "blood_pressure": "120/80",
                    "heart_rate": 72
                },
                "prior_metrics": {
                    "blood_sugar": 160.0,
                    "weight": 190.0,
                    "blood_pressure": "130/85",
                    "heart_rate": 75
                },
                "session_id": "session_1700000000000"
            })
        );
    }
}
