use crate::catalog::{EmergencyCatalog, Rule};
use crate::models::{Symptom, VitalSigns};

/// Runs one snapshot against the full rule catalog.
///
/// Rules are independent and side-effect free, so the scan has no ordering
/// dependency; triggered rules are still reported in catalog order. A
/// predicate that faults is logged and treated as not triggered, and the
/// scan always completes. Availability over completeness: a broken rule must not
/// take detection down with it.
pub struct RuleEvaluator;

impl RuleEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate<'c>(
        &self,
        catalog: &'c EmergencyCatalog,
        vitals: &VitalSigns,
        symptoms: &[Symptom],
    ) -> Vec<&'c Rule> {
        let mut triggered = Vec::new();

        for rule in catalog.rules() {
            match rule.condition.eval(vitals, symptoms) {
                Ok(true) => triggered.push(rule),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        rule_id = %rule.id,
                        error = %e,
                        "Rule predicate faulted; treated as not triggered"
                    );
                }
            }
        }

        triggered
    }
}

impl Default for RuleEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
