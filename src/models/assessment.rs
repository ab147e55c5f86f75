use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::{EmergencyPriority, RuleCategory};
use super::symptom::Symptom;
use super::vitals::VitalSigns;

/// Lightweight reference to a triggered catalog rule, carried on the
/// assessment so downstream consumers need no catalog access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggeredRuleRef {
    pub rule_id: String,
    pub rule_name: String,
    pub category: RuleCategory,
    pub priority: EmergencyPriority,
}

/// Point-in-time result of evaluating the full catalog against one snapshot.
///
/// An empty `triggered_rules` list is the "nothing detected" sentinel:
/// priority Urgent, empty protocol/category lists, a single routine-monitoring
/// action and `requires_ems = false`. Callers must check `is_trivial()`,
/// never the priority alone, since Urgent is both the sentinel and a real tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyAssessment {
    pub triggered_rules: Vec<TriggeredRuleRef>,
    pub highest_priority: EmergencyPriority,
    /// Distinct categories in first-trigger order.
    pub categories: Vec<RuleCategory>,
    /// Deduplicated protocol ids, in order of first reference.
    pub recommended_protocols: Vec<String>,
    pub immediate_actions: Vec<String>,
    pub requires_ems: bool,
    pub vitals: VitalSigns,
    pub symptoms: Vec<Symptom>,
    pub assessed_at: NaiveDateTime,
}

impl EmergencyAssessment {
    /// True when no rule triggered, the expected steady state.
    pub fn is_trivial(&self) -> bool {
        self.triggered_rules.is_empty()
    }

    pub fn rule_ids(&self) -> Vec<String> {
        self.triggered_rules
            .iter()
            .map(|r| r.rule_id.clone())
            .collect()
    }
}
