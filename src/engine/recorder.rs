use chrono::NaiveDateTime;
use rusqlite::Connection;
use uuid::Uuid;

use crate::catalog::EmergencyCatalog;
use crate::db::repository;
use crate::models::{EmergencyAssessment, EmergencyEvent, ResolutionOutcome};

use super::report::IncidentReport;
use super::EngineError;

/// Persists assessments as append-only per-patient event history.
///
/// One event per non-trivial assessment; insertion order is preserved and
/// event ids are globally unique. After creation only the resolution fields
/// ever change.
pub struct EventRecorder;

impl EventRecorder {
    pub fn new() -> Self {
        Self
    }

    /// Append a new event for a non-trivial assessment. The selected contact
    /// names are stored with the event; the caller dispatches deliveries
    /// only after this returns.
    pub fn record(
        &self,
        conn: &Connection,
        patient_id: &str,
        assessment: &EmergencyAssessment,
        notified_contacts: Vec<String>,
        catalog: &EmergencyCatalog,
    ) -> Result<EmergencyEvent, EngineError> {
        if assessment.is_trivial() {
            return Err(EngineError::TrivialAssessment);
        }

        let event = EmergencyEvent {
            id: Uuid::new_v4(),
            patient_id: patient_id.to_string(),
            assessment: assessment.clone(),
            notified_contacts,
            activated_protocols: assessment.recommended_protocols.clone(),
            incident_report: IncidentReport::render(patient_id, assessment, catalog),
            created_at: chrono::Local::now().naive_local(),
            resolution: None,
            outcome: None,
            resolved_at: None,
        };

        repository::append_event(conn, &event)?;

        tracing::info!(
            event_id = %event.id,
            patient_id,
            priority = assessment.highest_priority.as_str(),
            requires_ems = assessment.requires_ems,
            rules = assessment.triggered_rules.len(),
            "Emergency event recorded"
        );

        Ok(event)
    }

    /// Full history for a patient, in insertion order.
    pub fn history(
        &self,
        conn: &Connection,
        patient_id: &str,
    ) -> Result<Vec<EmergencyEvent>, EngineError> {
        Ok(repository::events_for_patient(conn, patient_id)?)
    }

    /// Unresolved events for a patient, in insertion order.
    pub fn unresolved(
        &self,
        conn: &Connection,
        patient_id: &str,
    ) -> Result<Vec<EmergencyEvent>, EngineError> {
        Ok(repository::unresolved_events_for_patient(conn, patient_id)?)
    }

    /// The only permitted post-creation mutation. Last write wins; an
    /// unknown id reports false, never an error.
    pub fn resolve(
        &self,
        conn: &Connection,
        event_id: &Uuid,
        resolution: &str,
        outcome: ResolutionOutcome,
        resolved_at: NaiveDateTime,
    ) -> Result<bool, EngineError> {
        let updated = repository::resolve_event(conn, event_id, resolution, outcome.clone(), resolved_at)?;
        if updated {
            tracing::info!(event_id = %event_id, outcome = outcome.as_str(), "Event resolved");
        } else {
            tracing::debug!(event_id = %event_id, "Resolve requested for unknown event");
        }
        Ok(updated)
    }
}

impl Default for EventRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::engine::assessment::AssessmentBuilder;
    use crate::engine::evaluator::RuleEvaluator;
    use crate::models::VitalSigns;

    fn tachycardia_assessment(catalog: &EmergencyCatalog) -> EmergencyAssessment {
        let vitals = VitalSigns {
            heart_rate: Some(140.0),
            ..Default::default()
        };
        let triggered = RuleEvaluator::new().evaluate(catalog, &vitals, &[]);
        AssessmentBuilder::build(catalog, &triggered, &vitals, &[])
    }

    #[test]
    fn record_persists_event_with_report() {
        let conn = open_memory_database().unwrap();
        let catalog = EmergencyCatalog::bundled();
        let recorder = EventRecorder::new();
        let assessment = tachycardia_assessment(&catalog);

        let event = recorder
            .record(&conn, "p-1", &assessment, vec!["Jordan".into()], &catalog)
            .unwrap();

        assert!(event.incident_report.contains("Tachycardia"));
        assert_eq!(event.activated_protocols, vec!["cardiac_monitoring".to_string()]);

        let history = recorder.history(&conn, "p-1").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, event.id);
        assert_eq!(history[0].notified_contacts, vec!["Jordan".to_string()]);
    }

    #[test]
    fn record_rejects_trivial_assessment() {
        let conn = open_memory_database().unwrap();
        let catalog = EmergencyCatalog::bundled();
        let recorder = EventRecorder::new();
        let triggered: Vec<&crate::catalog::Rule> = vec![];
        let assessment =
            AssessmentBuilder::build(&catalog, &triggered, &VitalSigns::default(), &[]);

        let result = recorder.record(&conn, "p-1", &assessment, vec![], &catalog);
        assert!(matches!(result, Err(EngineError::TrivialAssessment)));
        assert!(recorder.history(&conn, "p-1").unwrap().is_empty());
    }

    #[test]
    fn event_ids_globally_unique_across_patients() {
        let conn = open_memory_database().unwrap();
        let catalog = EmergencyCatalog::bundled();
        let recorder = EventRecorder::new();
        let assessment = tachycardia_assessment(&catalog);

        let a = recorder
            .record(&conn, "p-1", &assessment, vec![], &catalog)
            .unwrap();
        let b = recorder
            .record(&conn, "p-2", &assessment, vec![], &catalog)
            .unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn resolve_unknown_event_reports_false() {
        let conn = open_memory_database().unwrap();
        let recorder = EventRecorder::new();
        let ok = recorder
            .resolve(
                &conn,
                &Uuid::new_v4(),
                "n/a",
                ResolutionOutcome::FalseAlarm,
                chrono::Local::now().naive_local(),
            )
            .unwrap();
        assert!(!ok);
    }
}
