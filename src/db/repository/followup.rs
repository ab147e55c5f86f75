use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{AdjustmentType, AssigneeRole, CarePlanAdjustment, FollowUpAction};

use super::{DATETIME_FMT, DATE_FMT};

pub fn insert_follow_up(conn: &Connection, action: &FollowUpAction) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO follow_up_actions
         (id, event_id, category, description, due_within_hours, assignee,
          completed, completed_at, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            action.id.to_string(),
            action.event_id.to_string(),
            action.category,
            action.description,
            action.due_within_hours,
            action.assignee.as_str(),
            action.completed as i64,
            action
                .completed_at
                .map(|t| t.format(DATETIME_FMT).to_string()),
            action.notes,
        ],
    )?;
    Ok(())
}

pub fn insert_adjustment(
    conn: &Connection,
    adj: &CarePlanAdjustment,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO care_plan_adjustments
         (id, event_id, adjustment_type, description, reason, effective_date, review_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            adj.id.to_string(),
            adj.event_id.to_string(),
            adj.adjustment_type.as_str(),
            adj.description,
            adj.reason,
            adj.effective_date.format(DATE_FMT).to_string(),
            adj.review_date.format(DATE_FMT).to_string(),
        ],
    )?;
    Ok(())
}

/// Follow-up actions for one event, in insertion order.
pub fn follow_ups_for_event(
    conn: &Connection,
    event_id: &Uuid,
) -> Result<Vec<FollowUpAction>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, event_id, category, description, due_within_hours, assignee,
                completed, completed_at, notes
         FROM follow_up_actions
         WHERE event_id = ?1
         ORDER BY rowid ASC",
    )?;
    let rows = stmt.query_map(params![event_id.to_string()], row_to_follow_up)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)
}

/// Care-plan adjustments for one event, in insertion order.
pub fn adjustments_for_event(
    conn: &Connection,
    event_id: &Uuid,
) -> Result<Vec<CarePlanAdjustment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, event_id, adjustment_type, description, reason, effective_date, review_date
         FROM care_plan_adjustments
         WHERE event_id = ?1
         ORDER BY rowid ASC",
    )?;
    let rows = stmt.query_map(params![event_id.to_string()], row_to_adjustment)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)
}

/// Mark a follow-up complete. Returns false for an unknown id.
pub fn complete_follow_up(
    conn: &Connection,
    id: &Uuid,
    completed_at: NaiveDateTime,
    notes: Option<&str>,
) -> Result<bool, DatabaseError> {
    let affected = conn.execute(
        "UPDATE follow_up_actions
         SET completed = 1, completed_at = ?2, notes = COALESCE(?3, notes)
         WHERE id = ?1",
        params![
            id.to_string(),
            completed_at.format(DATETIME_FMT).to_string(),
            notes,
        ],
    )?;
    Ok(affected > 0)
}

/// (total, completed) follow-up counts for one event.
pub fn follow_up_counts(conn: &Connection, event_id: &Uuid) -> Result<(u32, u32), DatabaseError> {
    conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(completed), 0)
         FROM follow_up_actions
         WHERE event_id = ?1",
        params![event_id.to_string()],
        |row| Ok((row.get::<_, u32>(0)?, row.get::<_, u32>(1)?)),
    )
    .map_err(DatabaseError::from)
}

fn row_to_follow_up(row: &rusqlite::Row) -> Result<FollowUpAction, rusqlite::Error> {
    let id_str: String = row.get(0)?;
    let event_str: String = row.get(1)?;
    let assignee_str: String = row.get(5)?;
    let completed_str: Option<String> = row.get(7)?;

    Ok(FollowUpAction {
        id: parse_uuid(0, &id_str)?,
        event_id: parse_uuid(1, &event_str)?,
        category: row.get(2)?,
        description: row.get(3)?,
        due_within_hours: row.get(4)?,
        assignee: assignee_str.parse().unwrap_or(AssigneeRole::Nurse),
        completed: row.get::<_, i64>(6)? != 0,
        completed_at: completed_str
            .and_then(|s| NaiveDateTime::parse_from_str(&s, DATETIME_FMT).ok()),
        notes: row.get(8)?,
    })
}

fn row_to_adjustment(row: &rusqlite::Row) -> Result<CarePlanAdjustment, rusqlite::Error> {
    let id_str: String = row.get(0)?;
    let event_str: String = row.get(1)?;
    let type_str: String = row.get(2)?;
    let effective_str: String = row.get(5)?;
    let review_str: String = row.get(6)?;

    Ok(CarePlanAdjustment {
        id: parse_uuid(0, &id_str)?,
        event_id: parse_uuid(1, &event_str)?,
        adjustment_type: type_str.parse().unwrap_or(AdjustmentType::Monitoring),
        description: row.get(3)?,
        reason: row.get(4)?,
        effective_date: NaiveDate::parse_from_str(&effective_str, DATE_FMT).unwrap_or_default(),
        review_date: NaiveDate::parse_from_str(&review_str, DATE_FMT).unwrap_or_default(),
    })
}

fn parse_uuid(col: usize, s: &str) -> Result<Uuid, rusqlite::Error> {
    Uuid::parse_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::event::append_event;
    use crate::db::sqlite::open_memory_database;
    use crate::models::{EmergencyAssessment, EmergencyEvent, EmergencyPriority, VitalSigns};

    fn seed_event(conn: &Connection) -> Uuid {
        let event = EmergencyEvent {
            id: Uuid::new_v4(),
            patient_id: "p-1".into(),
            assessment: EmergencyAssessment {
                triggered_rules: vec![],
                highest_priority: EmergencyPriority::Urgent,
                categories: vec![],
                recommended_protocols: vec![],
                immediate_actions: vec![],
                requires_ems: false,
                vitals: VitalSigns::default(),
                symptoms: vec![],
                assessed_at: chrono::Local::now().naive_local(),
            },
            notified_contacts: vec![],
            activated_protocols: vec![],
            incident_report: String::new(),
            created_at: chrono::Local::now().naive_local(),
            resolution: None,
            outcome: None,
            resolved_at: None,
        };
        append_event(conn, &event).unwrap();
        event.id
    }

    fn make_follow_up(event_id: Uuid, description: &str) -> FollowUpAction {
        FollowUpAction {
            id: Uuid::new_v4(),
            event_id,
            category: "monitoring".into(),
            description: description.into(),
            due_within_hours: 24,
            assignee: AssigneeRole::Nurse,
            completed: false,
            completed_at: None,
            notes: None,
        }
    }

    #[test]
    fn insert_and_list_follow_ups() {
        let conn = open_memory_database().unwrap();
        let event_id = seed_event(&conn);
        insert_follow_up(&conn, &make_follow_up(event_id, "first")).unwrap();
        insert_follow_up(&conn, &make_follow_up(event_id, "second")).unwrap();

        let actions = follow_ups_for_event(&conn, &event_id).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].description, "first");
        assert!(!actions[0].completed);
    }

    #[test]
    fn complete_follow_up_sets_fields() {
        let conn = open_memory_database().unwrap();
        let event_id = seed_event(&conn);
        let action = make_follow_up(event_id, "check wound");
        insert_follow_up(&conn, &action).unwrap();

        let now = chrono::Local::now().naive_local();
        assert!(complete_follow_up(&conn, &action.id, now, Some("healed well")).unwrap());

        let stored = follow_ups_for_event(&conn, &event_id).unwrap();
        assert!(stored[0].completed);
        assert!(stored[0].completed_at.is_some());
        assert_eq!(stored[0].notes.as_deref(), Some("healed well"));
    }

    #[test]
    fn complete_unknown_returns_false() {
        let conn = open_memory_database().unwrap();
        let ok = complete_follow_up(
            &conn,
            &Uuid::new_v4(),
            chrono::Local::now().naive_local(),
            None,
        )
        .unwrap();
        assert!(!ok);
    }

    #[test]
    fn counts_track_completion() {
        let conn = open_memory_database().unwrap();
        let event_id = seed_event(&conn);
        let a = make_follow_up(event_id, "a");
        let b = make_follow_up(event_id, "b");
        insert_follow_up(&conn, &a).unwrap();
        insert_follow_up(&conn, &b).unwrap();

        assert_eq!(follow_up_counts(&conn, &event_id).unwrap(), (2, 0));
        complete_follow_up(&conn, &a.id, chrono::Local::now().naive_local(), None).unwrap();
        assert_eq!(follow_up_counts(&conn, &event_id).unwrap(), (2, 1));
    }

    #[test]
    fn adjustment_round_trip() {
        let conn = open_memory_database().unwrap();
        let event_id = seed_event(&conn);
        let today = chrono::Local::now().date_naive();
        let adj = CarePlanAdjustment {
            id: Uuid::new_v4(),
            event_id,
            adjustment_type: AdjustmentType::Monitoring,
            description: "Twice-daily vitals checks".into(),
            reason: "Recent cardiac event".into(),
            effective_date: today,
            review_date: today + chrono::Duration::days(7),
        };
        insert_adjustment(&conn, &adj).unwrap();

        let stored = adjustments_for_event(&conn, &event_id).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].adjustment_type, AdjustmentType::Monitoring);
        assert_eq!(stored[0].review_date, today + chrono::Duration::days(7));
    }
}
