use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repository;
use crate::models::{EmergencyEvent, OutcomeRecord};

use super::EngineError;

/// An explicit outcome submission for a (usually resolved) event.
/// Multiplicity is not enforced: each submission stores one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeSubmission {
    /// Measured detection-to-response latency.
    pub response_minutes: f64,
    pub ems_dispatched: bool,
    pub hospitalized: bool,
    pub lessons: Option<String>,
}

/// Per-patient aggregates over all submitted outcome records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientStatistics {
    pub patient_id: String,
    pub total_records: usize,
    pub by_category: BTreeMap<String, u32>,
    pub by_priority: BTreeMap<String, u32>,
    pub mean_response_minutes: f64,
    pub ems_rate: f64,
    pub hospitalization_rate: f64,
    pub follow_up_completion_rate: f64,
    /// Most frequently firing rule ids, descending by count.
    pub top_rules: Vec<(String, u32)>,
}

/// Accepts outcome submissions and computes aggregate statistics.
pub struct OutcomeTracker;

impl OutcomeTracker {
    pub fn new() -> Self {
        Self
    }

    /// Store one outcome record for an event. Category and priority are
    /// taken from the event's assessment; follow-up counts reflect the
    /// completion state at submission time.
    pub fn submit(
        &self,
        conn: &Connection,
        event: &EmergencyEvent,
        submission: OutcomeSubmission,
    ) -> Result<OutcomeRecord, EngineError> {
        let (total, completed) = repository::follow_up_counts(conn, &event.id)?;

        let record = OutcomeRecord {
            id: Uuid::new_v4(),
            event_id: event.id,
            patient_id: event.patient_id.clone(),
            category: event
                .assessment
                .categories
                .first()
                .map(|c| c.as_str().to_string())
                .unwrap_or_else(|| "general".into()),
            priority: event.assessment.highest_priority,
            response_minutes: submission.response_minutes,
            ems_dispatched: submission.ems_dispatched,
            hospitalized: submission.hospitalized,
            rule_ids: event.assessment.rule_ids(),
            follow_ups_total: total,
            follow_ups_completed: completed,
            lessons: submission.lessons,
            recorded_at: chrono::Local::now().naive_local(),
        };

        repository::insert_outcome(conn, &record)?;

        tracing::info!(
            event_id = %event.id,
            patient_id = %event.patient_id,
            response_minutes = record.response_minutes,
            "Outcome recorded"
        );

        Ok(record)
    }

    /// Aggregate statistics over all of a patient's outcome records. Rate
    /// denominators never reach zero: with no records they are treated as 1,
    /// yielding zero rates rather than a division fault.
    pub fn statistics(
        &self,
        conn: &Connection,
        patient_id: &str,
        top_n: usize,
    ) -> Result<PatientStatistics, EngineError> {
        let records = repository::outcomes_for_patient(conn, patient_id)?;
        Ok(aggregate(patient_id, &records, top_n))
    }
}

impl Default for OutcomeTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn aggregate(patient_id: &str, records: &[OutcomeRecord], top_n: usize) -> PatientStatistics {
    let denominator = records.len().max(1) as f64;

    let mut by_category: BTreeMap<String, u32> = BTreeMap::new();
    let mut by_priority: BTreeMap<String, u32> = BTreeMap::new();
    let mut rule_counts: BTreeMap<String, u32> = BTreeMap::new();
    let mut latency_sum = 0.0;
    let mut ems_count = 0u32;
    let mut hospitalized_count = 0u32;
    let mut follow_ups_total = 0u32;
    let mut follow_ups_completed = 0u32;

    for record in records {
        *by_category.entry(record.category.clone()).or_default() += 1;
        *by_priority
            .entry(record.priority.as_str().to_string())
            .or_default() += 1;
        for rule_id in &record.rule_ids {
            *rule_counts.entry(rule_id.clone()).or_default() += 1;
        }
        latency_sum += record.response_minutes;
        ems_count += record.ems_dispatched as u32;
        hospitalized_count += record.hospitalized as u32;
        follow_ups_total += record.follow_ups_total;
        follow_ups_completed += record.follow_ups_completed;
    }

    // BTreeMap iteration gives id-sorted input, so equal counts tie-break
    // alphabetically and the ranking is deterministic.
    let mut ranked: Vec<(String, u32)> = rule_counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(top_n);

    PatientStatistics {
        patient_id: patient_id.to_string(),
        total_records: records.len(),
        by_category,
        by_priority,
        mean_response_minutes: latency_sum / denominator,
        ems_rate: f64::from(ems_count) / denominator,
        hospitalization_rate: f64::from(hospitalized_count) / denominator,
        follow_up_completion_rate: f64::from(follow_ups_completed)
            / f64::from(follow_ups_total.max(1)),
        top_rules: ranked,
    }
}
