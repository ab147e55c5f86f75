use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{EmergencyPriority, OutcomeRecord};

use super::DATETIME_FMT;

pub fn insert_outcome(conn: &Connection, record: &OutcomeRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO outcome_records
         (id, event_id, patient_id, category, priority, response_minutes,
          ems_dispatched, hospitalized, rule_ids, follow_ups_total,
          follow_ups_completed, lessons, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            record.id.to_string(),
            record.event_id.to_string(),
            record.patient_id,
            record.category,
            record.priority.as_str(),
            record.response_minutes,
            record.ems_dispatched as i64,
            record.hospitalized as i64,
            serde_json::to_string(&record.rule_ids)?,
            record.follow_ups_total,
            record.follow_ups_completed,
            record.lessons,
            record.recorded_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

/// All outcome records for one patient, in submission order.
pub fn outcomes_for_patient(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<OutcomeRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, event_id, patient_id, category, priority, response_minutes,
                ems_dispatched, hospitalized, rule_ids, follow_ups_total,
                follow_ups_completed, lessons, recorded_at
         FROM outcome_records
         WHERE patient_id = ?1
         ORDER BY rowid ASC",
    )?;
    let rows = stmt.query_map(params![patient_id], row_to_outcome)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)
}

fn row_to_outcome(row: &rusqlite::Row) -> Result<OutcomeRecord, rusqlite::Error> {
    let id_str: String = row.get(0)?;
    let event_str: String = row.get(1)?;
    let priority_str: String = row.get(4)?;
    let rule_ids_json: String = row.get(8)?;
    let recorded_str: String = row.get(12)?;

    let wrap = |col: usize, e: Box<dyn std::error::Error + Send + Sync>| {
        rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, e)
    };

    Ok(OutcomeRecord {
        id: Uuid::parse_str(&id_str).map_err(|e| wrap(0, Box::new(e)))?,
        event_id: Uuid::parse_str(&event_str).map_err(|e| wrap(1, Box::new(e)))?,
        patient_id: row.get(2)?,
        category: row.get(3)?,
        priority: EmergencyPriority::from_str_opt(&priority_str)
            .unwrap_or(EmergencyPriority::Urgent),
        response_minutes: row.get(5)?,
        ems_dispatched: row.get::<_, i64>(6)? != 0,
        hospitalized: row.get::<_, i64>(7)? != 0,
        rule_ids: serde_json::from_str(&rule_ids_json).map_err(|e| wrap(8, Box::new(e)))?,
        follow_ups_total: row.get(9)?,
        follow_ups_completed: row.get(10)?,
        lessons: row.get(11)?,
        recorded_at: NaiveDateTime::parse_from_str(&recorded_str, DATETIME_FMT)
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn make_outcome(patient: &str, category: &str) -> OutcomeRecord {
        OutcomeRecord {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            patient_id: patient.into(),
            category: category.into(),
            priority: EmergencyPriority::Emergency,
            response_minutes: 12.5,
            ems_dispatched: false,
            hospitalized: false,
            rule_ids: vec!["tachycardia".into()],
            follow_ups_total: 4,
            follow_ups_completed: 2,
            lessons: None,
            recorded_at: chrono::Local::now().naive_local(),
        }
    }

    #[test]
    fn insert_and_list_outcomes() {
        let conn = open_memory_database().unwrap();
        insert_outcome(&conn, &make_outcome("p-1", "cardiac")).unwrap();
        insert_outcome(&conn, &make_outcome("p-1", "respiratory")).unwrap();
        insert_outcome(&conn, &make_outcome("p-2", "cardiac")).unwrap();

        let records = outcomes_for_patient(&conn, "p-1").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category, "cardiac");
        assert_eq!(records[0].rule_ids, vec!["tachycardia".to_string()]);
        assert!((records[0].response_minutes - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_patient_returns_empty() {
        let conn = open_memory_database().unwrap();
        assert!(outcomes_for_patient(&conn, "nobody").unwrap().is_empty());
    }
}
