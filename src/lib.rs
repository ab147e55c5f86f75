//! Vigil: an in-process emergency-event detection and escalation engine for
//! home patient monitoring.
//!
//! The crate is organized as independently testable units composed by an
//! orchestrating workflow:
//! - `catalog`: load-once, validated rule and protocol tables
//! - `engine`: evaluation, assessment, notification, recording, follow-up
//!   expansion and outcome statistics
//! - `models`: the exchanged data model (serde-projected throughout)
//! - `db`: SQLite-backed contact registry and per-patient histories

pub mod catalog;
pub mod config;
pub mod db;
pub mod engine;
pub mod models;

// Re-exports for embedding callers
pub use catalog::{CatalogError, Condition, EmergencyCatalog, Protocol, ProtocolStep, Rule};
pub use engine::{
    EmergencyAssessment, EmergencyWorkflow, EngineError, MonitoringOutcome,
    NotificationChannel, NotificationDispatcher, TracingChannel,
};
pub use models::{
    CarePlanAdjustment, EmergencyContact, EmergencyEvent, EmergencyPriority, FollowUpAction,
    OutcomeRecord, RuleCategory, Symptom, SymptomSeverity, VitalField, VitalSigns,
};
