use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::SymptomSeverity;

/// A patient-reported symptom. Names are free text; catalog conditions match
/// them case-insensitively by substring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symptom {
    pub id: Uuid,
    pub name: String,
    pub severity: SymptomSeverity,
    pub reported_at: NaiveDateTime,
}

impl Symptom {
    pub fn new(name: impl Into<String>, severity: SymptomSeverity) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            severity,
            reported_at: chrono::Local::now().naive_local(),
        }
    }

    /// Case-insensitive substring match against the reported name.
    pub fn matches(&self, pattern: &str) -> bool {
        self.name.to_lowercase().contains(&pattern.to_lowercase())
    }
}
