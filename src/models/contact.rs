use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ContactChannel;

/// A patient-scoped emergency contact. `rank` 1 is highest in the escalation
/// chain; `primary` marks the preferred single contact for urgent-tier
/// notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: Uuid,
    pub patient_id: String,
    pub name: String,
    pub phone: String,
    pub channel: ContactChannel,
    pub rank: u32,
    pub primary: bool,
    pub created_at: NaiveDateTime,
}

impl EmergencyContact {
    pub fn new(
        patient_id: impl Into<String>,
        name: impl Into<String>,
        phone: impl Into<String>,
        channel: ContactChannel,
        rank: u32,
        primary: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id: patient_id.into(),
            name: name.into(),
            phone: phone.into(),
            channel,
            rank,
            primary,
            created_at: chrono::Local::now().naive_local(),
        }
    }
}
