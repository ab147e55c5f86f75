use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::assessment::EmergencyAssessment;
use super::enums::{AdjustmentType, AssigneeRole, EmergencyPriority, ResolutionOutcome};

/// A persisted emergency event. Appended once per non-trivial assessment to
/// the patient's history; after creation only the resolution fields mutate
/// (last write wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyEvent {
    /// Globally unique, not merely per-patient.
    pub id: Uuid,
    pub patient_id: String,
    pub assessment: EmergencyAssessment,
    /// Names of the contacts selected for notification.
    pub notified_contacts: Vec<String>,
    /// Protocol ids activated for this event.
    pub activated_protocols: Vec<String>,
    /// Deterministic text projection for chart/EHR hand-off.
    pub incident_report: String,
    pub created_at: NaiveDateTime,
    pub resolution: Option<String>,
    pub outcome: Option<ResolutionOutcome>,
    pub resolved_at: Option<NaiveDateTime>,
}

impl EmergencyEvent {
    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}

/// A downstream task generated from a recorded event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpAction {
    pub id: Uuid,
    pub event_id: Uuid,
    pub category: String,
    pub description: String,
    pub due_within_hours: u32,
    pub assignee: AssigneeRole,
    pub completed: bool,
    pub completed_at: Option<NaiveDateTime>,
    pub notes: Option<String>,
}

/// A care-plan change generated from a recorded event. Review is scheduled
/// seven days after the effective date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarePlanAdjustment {
    pub id: Uuid,
    pub event_id: Uuid,
    pub adjustment_type: AdjustmentType,
    pub description: String,
    pub reason: String,
    pub effective_date: NaiveDate,
    pub review_date: NaiveDate,
}

/// Retrospective data point submitted after an event resolves; the raw
/// material for per-patient aggregate statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub id: Uuid,
    pub event_id: Uuid,
    pub patient_id: String,
    pub category: String,
    pub priority: EmergencyPriority,
    /// Measured detection-to-response latency.
    pub response_minutes: f64,
    pub ems_dispatched: bool,
    pub hospitalized: bool,
    /// Ids of the rules that fired for the underlying event.
    pub rule_ids: Vec<String>,
    pub follow_ups_total: u32,
    pub follow_ups_completed: u32,
    pub lessons: Option<String>,
    pub recorded_at: NaiveDateTime,
}
