use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{ContactChannel, EmergencyContact};

use super::DATETIME_FMT;

/// Register a contact in a patient's escalation chain.
pub fn insert_contact(conn: &Connection, c: &EmergencyContact) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO emergency_contacts (id, patient_id, name, phone, channel, rank, is_primary, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            c.id.to_string(),
            c.patient_id,
            c.name,
            c.phone,
            c.channel.as_str(),
            c.rank,
            c.primary as i64,
            c.created_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

/// Update a contact by id. Returns false if no contact matched.
pub fn update_contact(conn: &Connection, c: &EmergencyContact) -> Result<bool, DatabaseError> {
    let affected = conn.execute(
        "UPDATE emergency_contacts
         SET name = ?2, phone = ?3, channel = ?4, rank = ?5, is_primary = ?6
         WHERE id = ?1",
        params![
            c.id.to_string(),
            c.name,
            c.phone,
            c.channel.as_str(),
            c.rank,
            c.primary as i64,
        ],
    )?;
    Ok(affected > 0)
}

/// Remove a contact by id. Returns false if no contact matched.
pub fn remove_contact(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM emergency_contacts WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(affected > 0)
}

/// All contacts for a patient, ascending by priority rank.
pub fn contacts_for_patient(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<EmergencyContact>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, name, phone, channel, rank, is_primary, created_at
         FROM emergency_contacts
         WHERE patient_id = ?1
         ORDER BY rank ASC, created_at ASC",
    )?;
    let rows = stmt.query_map(params![patient_id], row_to_contact)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)
}

fn row_to_contact(row: &rusqlite::Row) -> Result<EmergencyContact, rusqlite::Error> {
    let id_str: String = row.get(0)?;
    let channel_str: String = row.get(4)?;
    let created_str: String = row.get(7)?;

    Ok(EmergencyContact {
        id: Uuid::parse_str(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?,
        patient_id: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        channel: channel_str.parse().unwrap_or(ContactChannel::Sms),
        rank: row.get(5)?,
        primary: row.get::<_, i64>(6)? != 0,
        created_at: NaiveDateTime::parse_from_str(&created_str, DATETIME_FMT).unwrap_or_default(),
    })
}
