use crate::catalog::{EmergencyCatalog, Rule};
use crate::models::{
    EmergencyAssessment, EmergencyPriority, Symptom, TriggeredRuleRef, VitalSigns,
};

/// Escalation budget at or below which a recommended protocol forces the
/// EMS-required flag regardless of priority.
const EMS_ESCALATION_BUDGET_MINUTES: u32 = 5;

/// Sentinel action when no rule triggers.
const ROUTINE_MONITORING_ACTION: &str = "Continue routine monitoring";

/// Folds triggered rules into one priority-classified, protocol-deduplicated
/// assessment.
pub struct AssessmentBuilder;

impl AssessmentBuilder {
    /// Build an assessment from the triggered-rule set.
    ///
    /// With no triggered rules the sentinel assessment is returned: priority
    /// Urgent, empty lists, a single routine-monitoring action and no EMS
    /// flag. Urgent doubles as a real severity, so callers distinguish the
    /// sentinel via `is_trivial()`, never by priority.
    pub fn build(
        catalog: &EmergencyCatalog,
        triggered: &[&Rule],
        vitals: &VitalSigns,
        symptoms: &[Symptom],
    ) -> EmergencyAssessment {
        let assessed_at = chrono::Local::now().naive_local();

        if triggered.is_empty() {
            return EmergencyAssessment {
                triggered_rules: vec![],
                highest_priority: EmergencyPriority::Urgent,
                categories: vec![],
                recommended_protocols: vec![],
                immediate_actions: vec![ROUTINE_MONITORING_ACTION.into()],
                requires_ems: false,
                vitals: vitals.clone(),
                symptoms: symptoms.to_vec(),
                assessed_at,
            };
        }

        let highest_priority = triggered
            .iter()
            .map(|r| r.priority)
            .max()
            .unwrap_or(EmergencyPriority::Urgent);

        // Distinct categories, first-trigger order.
        let mut categories = Vec::new();
        for rule in triggered {
            if !categories.contains(&rule.category) {
                categories.push(rule.category.clone());
            }
        }

        // Protocol-id-deduplicated resolution of each rule's reference, in
        // order of first reference. A dangling reference is dropped here;
        // load-time validation makes that unreachable for bundled catalogs,
        // but a hand-built catalog bypassing validation must not fault the
        // assessment.
        let mut recommended_protocols: Vec<String> = Vec::new();
        for rule in triggered {
            if catalog.protocol(&rule.protocol_id).is_none() {
                tracing::warn!(
                    rule_id = %rule.id,
                    protocol_id = %rule.protocol_id,
                    "Dropping unresolvable protocol reference"
                );
                continue;
            }
            if !recommended_protocols.contains(&rule.protocol_id) {
                recommended_protocols.push(rule.protocol_id.clone());
            }
        }

        // First critical step of each recommended protocol, deduplicated by
        // exact text.
        let mut immediate_actions: Vec<String> = Vec::new();
        for protocol_id in &recommended_protocols {
            if let Some(protocol) = catalog.protocol(protocol_id) {
                if let Some(instruction) = protocol.first_critical_instruction() {
                    if !immediate_actions.iter().any(|a| a == instruction) {
                        immediate_actions.push(instruction.to_string());
                    }
                }
            }
        }

        let tight_budget = recommended_protocols.iter().any(|id| {
            catalog
                .protocol(id)
                .is_some_and(|p| p.escalation_minutes <= EMS_ESCALATION_BUDGET_MINUTES)
        });
        let requires_ems =
            highest_priority == EmergencyPriority::LifeThreatening || tight_budget;

        let triggered_rules = triggered
            .iter()
            .map(|r| TriggeredRuleRef {
                rule_id: r.id.clone(),
                rule_name: r.name.clone(),
                category: r.category.clone(),
                priority: r.priority,
            })
            .collect();

        EmergencyAssessment {
            triggered_rules,
            highest_priority,
            categories,
            recommended_protocols,
            immediate_actions,
            requires_ems,
            vitals: vitals.clone(),
            symptoms: symptoms.to_vec(),
            assessed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::evaluator::RuleEvaluator;

    fn assess(vitals: &VitalSigns, symptoms: &[Symptom]) -> EmergencyAssessment {
        let catalog = EmergencyCatalog::bundled();
        let triggered = RuleEvaluator::new().evaluate(&catalog, vitals, symptoms);
        AssessmentBuilder::build(&catalog, &triggered, vitals, symptoms)
    }

    #[test]
    fn sentinel_assessment_when_nothing_triggers() {
        let assessment = assess(&VitalSigns::default(), &[]);
        assert!(assessment.is_trivial());
        assert_eq!(assessment.highest_priority, EmergencyPriority::Urgent);
        assert!(assessment.categories.is_empty());
        assert!(assessment.recommended_protocols.is_empty());
        assert_eq!(
            assessment.immediate_actions,
            vec!["Continue routine monitoring".to_string()]
        );
        assert!(!assessment.requires_ems);
    }

    #[test]
    fn highest_priority_is_max_over_triggered() {
        // Hypotension (Emergency) + hemorrhage instability (LifeThreatening)
        let vitals = VitalSigns {
            systolic_bp: Some(70.0),
            heart_rate: Some(115.0),
            ..Default::default()
        };
        let symptoms = vec![Symptom::new(
            "active bleeding",
            crate::models::SymptomSeverity::Severe,
        )];
        let assessment = assess(&vitals, &symptoms);
        assert_eq!(assessment.triggered_rules.len(), 2);
        assert_eq!(
            assessment.highest_priority,
            EmergencyPriority::LifeThreatening
        );
        assert!(assessment.requires_ems);
    }

    #[test]
    fn shared_protocol_reference_deduplicated() {
        // Tachycardia and hypotension both resolve to cardiac_monitoring.
        let vitals = VitalSigns {
            heart_rate: Some(130.0),
            systolic_bp: Some(85.0),
            ..Default::default()
        };
        let assessment = assess(&vitals, &[]);
        assert_eq!(assessment.triggered_rules.len(), 2);
        assert_eq!(
            assessment.recommended_protocols,
            vec!["cardiac_monitoring".to_string()]
        );
    }

    #[test]
    fn immediate_actions_deduplicated_by_text() {
        // Severe hypoxia and hemorrhage instability recommend different
        // protocols whose first critical step is the same 911 instruction.
        let vitals = VitalSigns {
            oxygen_saturation: Some(85.0),
            systolic_bp: Some(80.0),
            heart_rate: Some(120.0),
            ..Default::default()
        };
        let symptoms = vec![Symptom::new(
            "heavy bleeding",
            crate::models::SymptomSeverity::Severe,
        )];
        let assessment = assess(&vitals, &symptoms);
        assert!(assessment.recommended_protocols.len() >= 2);
        let emergency_calls = assessment
            .immediate_actions
            .iter()
            .filter(|a| a.contains("911"))
            .count();
        assert_eq!(emergency_calls, 1);
    }

    #[test]
    fn tight_escalation_budget_forces_ems_flag() {
        let catalog = EmergencyCatalog::bundled();
        // Build a triggered set whose highest priority is below
        // LifeThreatening but whose protocol budget is <= 5 minutes.
        let mut rule = catalog.rule("tachycardia").unwrap().clone();
        rule.protocol_id = "cardiac_emergency".into();
        let vitals = VitalSigns {
            heart_rate: Some(140.0),
            ..Default::default()
        };
        let assessment = AssessmentBuilder::build(&catalog, &[&rule], &vitals, &[]);
        assert_eq!(assessment.highest_priority, EmergencyPriority::Emergency);
        assert!(assessment.requires_ems);
    }

    #[test]
    fn categories_keep_first_trigger_order() {
        let vitals = VitalSigns {
            systolic_bp: Some(70.0),
            heart_rate: Some(115.0),
            ..Default::default()
        };
        let symptoms = vec![Symptom::new(
            "active bleeding",
            crate::models::SymptomSeverity::Severe,
        )];
        let assessment = assess(&vitals, &symptoms);
        assert_eq!(
            assessment.categories,
            vec![
                crate::models::RuleCategory::Cardiac,
                crate::models::RuleCategory::Trauma,
            ]
        );
    }

    #[test]
    fn dangling_reference_dropped_not_faulted() {
        let catalog = EmergencyCatalog::bundled();
        let mut rule = catalog.rule("tachycardia").unwrap().clone();
        rule.protocol_id = "no_such_protocol".into();
        let vitals = VitalSigns {
            heart_rate: Some(140.0),
            ..Default::default()
        };
        let assessment = AssessmentBuilder::build(&catalog, &[&rule], &vitals, &[]);
        assert!(assessment.recommended_protocols.is_empty());
        assert_eq!(assessment.triggered_rules.len(), 1);
    }
}
