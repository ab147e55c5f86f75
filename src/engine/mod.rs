//! The detection and escalation engine.
//!
//! Each unit (evaluation, assessment, notification, recording, follow-up
//! expansion, outcome tracking) is separately constructed and independently
//! testable; `EmergencyWorkflow` composes them into the monitoring pipeline:
//!
//! `(vitals, symptoms) → evaluate → assess → record → notify → expand`
//!
//! Events are persisted before any notification is dispatched, so a slow or
//! failing delivery path can never lose an event.

pub mod assessment;
pub mod evaluator;
pub mod followup;
pub mod notify;
pub mod outcomes;
pub mod recorder;
pub mod report;

pub use assessment::AssessmentBuilder;
pub use evaluator::RuleEvaluator;
pub use followup::{CarePlanAdjuster, FollowUpGenerator};
pub use notify::{NotificationChannel, NotificationDispatcher, TracingChannel};
pub use outcomes::{OutcomeSubmission, OutcomeTracker, PatientStatistics};
pub use recorder::EventRecorder;
pub use report::IncidentReport;

// Re-exported here because the assessment is the engine's primary product.
pub use crate::models::EmergencyAssessment;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::EmergencyCatalog;
use crate::db::{repository, DatabaseError};
use crate::models::{
    CarePlanAdjustment, EmergencyEvent, FollowUpAction, OutcomeRecord, ResolutionOutcome,
    Symptom, VitalSigns,
};

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Refusing to record a trivial assessment")]
    TrivialAssessment,

    #[error("Internal lock failed")]
    LockFailed,
}

// ---------------------------------------------------------------------------
// Per-patient serialization
// ---------------------------------------------------------------------------

/// Keyed locks: concurrent operations on the same patient id serialize their
/// appends; different patient ids never contend on the same lock.
struct PatientLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PatientLocks {
    fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    fn handle(&self, patient_id: &str) -> Result<Arc<Mutex<()>>, EngineError> {
        let mut map = self.inner.lock().map_err(|_| EngineError::LockFailed)?;
        Ok(map
            .entry(patient_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }
}

// ---------------------------------------------------------------------------
// MonitoringOutcome
// ---------------------------------------------------------------------------

/// Result of processing one snapshot. `event` is `None` exactly when the
/// assessment is trivial: nothing was recorded, notified or expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringOutcome {
    pub assessment: EmergencyAssessment,
    pub event: Option<EmergencyEvent>,
    pub follow_ups: Vec<FollowUpAction>,
    pub adjustments: Vec<CarePlanAdjustment>,
    pub processing_time_ms: u64,
}

// ---------------------------------------------------------------------------
// EmergencyWorkflow
// ---------------------------------------------------------------------------

/// Composes the engine units over an injected catalog and notification
/// channel. The workflow is the only component that sequences cross-unit
/// effects; every unit stays individually callable for testing.
pub struct EmergencyWorkflow {
    catalog: EmergencyCatalog,
    evaluator: RuleEvaluator,
    dispatcher: NotificationDispatcher,
    recorder: EventRecorder,
    outcomes: OutcomeTracker,
    locks: PatientLocks,
}

impl EmergencyWorkflow {
    pub fn new(catalog: EmergencyCatalog, channel: Box<dyn NotificationChannel>) -> Self {
        Self {
            catalog,
            evaluator: RuleEvaluator::new(),
            dispatcher: NotificationDispatcher::new(channel),
            recorder: EventRecorder::new(),
            outcomes: OutcomeTracker::new(),
            locks: PatientLocks::new(),
        }
    }

    /// Bundled catalog, log-only notification channel.
    pub fn with_defaults() -> Self {
        Self::new(EmergencyCatalog::bundled(), Box::new(TracingChannel))
    }

    pub fn catalog(&self) -> &EmergencyCatalog {
        &self.catalog
    }

    /// Evaluate one snapshot and, for a non-trivial assessment: persist the
    /// event, notify contacts, and expand follow-ups and care-plan
    /// adjustments, exactly once each.
    pub fn process(
        &self,
        conn: &Connection,
        patient_id: &str,
        vitals: &VitalSigns,
        symptoms: &[Symptom],
    ) -> Result<MonitoringOutcome, EngineError> {
        let started = Instant::now();

        let triggered = self.evaluator.evaluate(&self.catalog, vitals, symptoms);
        let assessment = AssessmentBuilder::build(&self.catalog, &triggered, vitals, symptoms);

        if assessment.is_trivial() {
            tracing::debug!(patient_id, "No emergency detected");
            return Ok(MonitoringOutcome {
                assessment,
                event: None,
                follow_ups: vec![],
                adjustments: vec![],
                processing_time_ms: started.elapsed().as_millis() as u64,
            });
        }

        // Serialize appends for this patient; other patients proceed freely.
        let lock = self.locks.handle(patient_id)?;
        let _guard = lock.lock().map_err(|_| EngineError::LockFailed)?;

        let contacts = repository::contacts_for_patient(conn, patient_id)?;
        let recipients =
            NotificationDispatcher::select_recipients(assessment.highest_priority, &contacts);
        let notified: Vec<String> = recipients.iter().map(|c| c.name.clone()).collect();

        // Persist before notifying: a slow delivery path must never delay
        // or lose the event.
        let event =
            self.recorder
                .record(conn, patient_id, &assessment, notified, &self.catalog)?;

        self.dispatcher.dispatch(&assessment, &recipients);

        let follow_ups = FollowUpGenerator::generate(&event);
        for action in &follow_ups {
            repository::insert_follow_up(conn, action)?;
        }
        let adjustments = CarePlanAdjuster::generate(&event);
        for adjustment in &adjustments {
            repository::insert_adjustment(conn, adjustment)?;
        }

        let processing_time_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            patient_id,
            event_id = %event.id,
            priority = assessment.highest_priority.as_str(),
            notified = event.notified_contacts.len(),
            follow_ups = follow_ups.len(),
            adjustments = adjustments.len(),
            processing_ms = processing_time_ms,
            "Emergency workflow complete"
        );

        Ok(MonitoringOutcome {
            assessment,
            event: Some(event),
            follow_ups,
            adjustments,
            processing_time_ms,
        })
    }

    /// Resolve an event (last write wins). False for an unknown id.
    pub fn resolve_event(
        &self,
        conn: &Connection,
        event_id: &Uuid,
        resolution: &str,
        outcome: ResolutionOutcome,
    ) -> Result<bool, EngineError> {
        self.recorder.resolve(
            conn,
            event_id,
            resolution,
            outcome,
            chrono::Local::now().naive_local(),
        )
    }

    /// Mark a follow-up complete. False for an unknown id.
    pub fn complete_follow_up(
        &self,
        conn: &Connection,
        follow_up_id: &Uuid,
        notes: Option<&str>,
    ) -> Result<bool, EngineError> {
        Ok(repository::complete_follow_up(
            conn,
            follow_up_id,
            chrono::Local::now().naive_local(),
            notes,
        )?)
    }

    /// Submit an outcome record for an event.
    pub fn submit_outcome(
        &self,
        conn: &Connection,
        event: &EmergencyEvent,
        submission: OutcomeSubmission,
    ) -> Result<OutcomeRecord, EngineError> {
        self.outcomes.submit(conn, event, submission)
    }

    /// Per-patient aggregate statistics over submitted outcomes.
    pub fn statistics(
        &self,
        conn: &Connection,
        patient_id: &str,
        top_n: usize,
    ) -> Result<PatientStatistics, EngineError> {
        self.outcomes.statistics(conn, patient_id, top_n)
    }

    /// Event history for a patient, insertion order.
    pub fn history(
        &self,
        conn: &Connection,
        patient_id: &str,
    ) -> Result<Vec<EmergencyEvent>, EngineError> {
        self.recorder.history(conn, patient_id)
    }
}
