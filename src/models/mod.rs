pub mod assessment;
pub mod contact;
pub mod enums;
pub mod event;
pub mod symptom;
pub mod vitals;

pub use assessment::{EmergencyAssessment, TriggeredRuleRef};
pub use contact::EmergencyContact;
pub use enums::{
    AdjustmentType, AssigneeRole, ContactChannel, EmergencyPriority, ResolutionOutcome,
    RuleCategory, SymptomSeverity,
};
pub use event::{CarePlanAdjustment, EmergencyEvent, FollowUpAction, OutcomeRecord};
pub use symptom::Symptom;
pub use vitals::{VitalField, VitalSigns};
