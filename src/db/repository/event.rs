use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{EmergencyEvent, ResolutionOutcome};

use super::DATETIME_FMT;

/// Append an event to its patient's history. Insertion order is preserved by
/// the AUTOINCREMENT sequence; the row is never updated afterwards apart from
/// the resolution columns.
pub fn append_event(conn: &Connection, event: &EmergencyEvent) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO emergency_events
         (id, patient_id, priority, requires_ems, assessment, notified_contacts,
          activated_protocols, incident_report, created_at, resolution, outcome, resolved_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            event.id.to_string(),
            event.patient_id,
            event.assessment.highest_priority.as_str(),
            event.assessment.requires_ems as i64,
            serde_json::to_string(&event.assessment)?,
            serde_json::to_string(&event.notified_contacts)?,
            serde_json::to_string(&event.activated_protocols)?,
            event.incident_report,
            event.created_at.format(DATETIME_FMT).to_string(),
            event.resolution,
            event.outcome.as_ref().map(|o| o.as_str()),
            event
                .resolved_at
                .map(|t| t.format(DATETIME_FMT).to_string()),
        ],
    )?;
    Ok(())
}

/// Full history for one patient, in insertion order.
pub fn events_for_patient(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<EmergencyEvent>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{SELECT_EVENT} WHERE patient_id = ?1 ORDER BY seq ASC"))?;
    let rows = stmt.query_map(params![patient_id], row_to_event)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)
}

/// Unresolved events for one patient, in insertion order.
pub fn unresolved_events_for_patient(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<EmergencyEvent>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_EVENT} WHERE patient_id = ?1 AND resolved_at IS NULL ORDER BY seq ASC"
    ))?;
    let rows = stmt.query_map(params![patient_id], row_to_event)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)
}

/// Look up a single event by its globally unique id.
pub fn get_event(conn: &Connection, id: &Uuid) -> Result<Option<EmergencyEvent>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{SELECT_EVENT} WHERE id = ?1"))?;
    let mut rows = stmt.query_map(params![id.to_string()], row_to_event)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Set the resolution fields, the only permitted post-creation mutation.
/// Repeated calls are last-write-wins. Returns false for an unknown id.
pub fn resolve_event(
    conn: &Connection,
    id: &Uuid,
    resolution: &str,
    outcome: ResolutionOutcome,
    resolved_at: NaiveDateTime,
) -> Result<bool, DatabaseError> {
    let affected = conn.execute(
        "UPDATE emergency_events
         SET resolution = ?2, outcome = ?3, resolved_at = ?4
         WHERE id = ?1",
        params![
            id.to_string(),
            resolution,
            outcome.as_str(),
            resolved_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(affected > 0)
}

const SELECT_EVENT: &str = "SELECT id, patient_id, assessment, notified_contacts,
        activated_protocols, incident_report, created_at, resolution, outcome, resolved_at
 FROM emergency_events";

fn row_to_event(row: &rusqlite::Row) -> Result<EmergencyEvent, rusqlite::Error> {
    let id_str: String = row.get(0)?;
    let assessment_json: String = row.get(2)?;
    let notified_json: String = row.get(3)?;
    let protocols_json: String = row.get(4)?;
    let created_str: String = row.get(6)?;
    let outcome_str: Option<String> = row.get(8)?;
    let resolved_str: Option<String> = row.get(9)?;

    Ok(EmergencyEvent {
        id: Uuid::parse_str(&id_str).map_err(|e| json_col_err(0, e))?,
        patient_id: row.get(1)?,
        assessment: serde_json::from_str(&assessment_json).map_err(|e| json_col_err(2, e))?,
        notified_contacts: serde_json::from_str(&notified_json).map_err(|e| json_col_err(3, e))?,
        activated_protocols: serde_json::from_str(&protocols_json)
            .map_err(|e| json_col_err(4, e))?,
        incident_report: row.get(5)?,
        created_at: NaiveDateTime::parse_from_str(&created_str, DATETIME_FMT).unwrap_or_default(),
        resolution: row.get(7)?,
        outcome: outcome_str.and_then(|s| s.parse().ok()),
        resolved_at: resolved_str
            .and_then(|s| NaiveDateTime::parse_from_str(&s, DATETIME_FMT).ok()),
    })
}

fn json_col_err(col: usize, e: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(e))
}
