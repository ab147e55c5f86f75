//! Load-once rule and protocol catalogs.
//!
//! Catalogs are validated at load time and immutable afterwards. Validation
//! collects every defect before failing so a broken catalog file reports all
//! of its problems in one pass; only load-time corruption ever faults.

pub mod condition;
pub mod defaults;
pub mod protocol;
pub mod reference;
pub mod rule;

pub use condition::{Condition, CustomPredicate};
pub use protocol::{Protocol, ProtocolStep};
pub use rule::Rule;

use std::collections::HashSet;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog validation failed with {} defect(s): {}", .0.len(), .0.join("; "))]
    Invalid(Vec<String>),

    #[error("Catalog file load failed ({0}): {1}")]
    Load(String, String),

    #[error("Catalog file parse failed ({0}): {1}")]
    Parse(String, String),
}

/// The validated, immutable rule + protocol tables injected into the engine.
pub struct EmergencyCatalog {
    rules: Vec<Rule>,
    protocols: Vec<Protocol>,
}

impl EmergencyCatalog {
    /// Build a catalog, rejecting it when any defect is found: duplicate
    /// ids, a rule referencing an unknown protocol, structurally invalid
    /// conditions, or a protocol without steps.
    pub fn new(rules: Vec<Rule>, protocols: Vec<Protocol>) -> Result<Self, CatalogError> {
        let mut defects = Vec::new();

        let mut protocol_ids = HashSet::new();
        for protocol in &protocols {
            if protocol.id.trim().is_empty() {
                defects.push("protocol with empty id".into());
            }
            if !protocol_ids.insert(protocol.id.clone()) {
                defects.push(format!("duplicate protocol id: {}", protocol.id));
            }
            if protocol.steps.is_empty() {
                defects.push(format!("protocol {} has no steps", protocol.id));
            }
        }

        let mut rule_ids = HashSet::new();
        for rule in &rules {
            if rule.id.trim().is_empty() {
                defects.push("rule with empty id".into());
            }
            if !rule_ids.insert(rule.id.clone()) {
                defects.push(format!("duplicate rule id: {}", rule.id));
            }
            if !protocol_ids.contains(&rule.protocol_id) {
                defects.push(format!(
                    "rule {} references unknown protocol {}",
                    rule.id, rule.protocol_id
                ));
            }
            for defect in rule.condition.validate() {
                defects.push(format!("rule {}: {}", rule.id, defect));
            }
        }

        if !defects.is_empty() {
            return Err(CatalogError::Invalid(defects));
        }

        tracing::info!(
            rules = rules.len(),
            protocols = protocols.len(),
            "Catalog loaded"
        );

        Ok(Self { rules, protocols })
    }

    /// The built-in curated catalog. Its validity is asserted by tests, so a
    /// failure here is a programming error, not a runtime condition.
    pub fn bundled() -> Self {
        Self::new(defaults::default_rules(), defaults::default_protocols())
            .expect("bundled catalog is valid")
    }

    /// Rules in declaration (catalog) order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn protocols(&self) -> &[Protocol] {
        &self.protocols
    }

    pub fn protocol(&self, id: &str) -> Option<&Protocol> {
        self.protocols.iter().find(|p| p.id == id)
    }

    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmergencyPriority, RuleCategory, VitalField};

    fn minimal_protocol(id: &str) -> Protocol {
        Protocol {
            id: id.into(),
            name: id.into(),
            category: RuleCategory::General,
            priority: EmergencyPriority::Urgent,
            steps: vec![ProtocolStep {
                order: 1,
                instruction: "rest".into(),
                for_patient: true,
                for_care_team: false,
                time_limit_minutes: None,
                critical: false,
            }],
            patient_instructions: vec![],
            care_team_actions: vec![],
            escalation_minutes: 30,
            required_resources: vec![],
        }
    }

    fn minimal_rule(id: &str, protocol_id: &str) -> Rule {
        Rule {
            id: id.into(),
            name: id.into(),
            category: RuleCategory::General,
            priority: EmergencyPriority::Urgent,
            condition: Condition::VitalAbove {
                field: VitalField::Temperature,
                threshold: 39.0,
            },
            protocol_id: protocol_id.into(),
        }
    }

    #[test]
    fn bundled_catalog_is_valid() {
        let catalog = EmergencyCatalog::bundled();
        assert!(!catalog.rules().is_empty());
        assert!(!catalog.protocols().is_empty());
        // every rule's protocol reference resolves
        for rule in catalog.rules() {
            assert!(
                catalog.protocol(&rule.protocol_id).is_some(),
                "rule {} has dangling protocol reference",
                rule.id
            );
        }
    }

    #[test]
    fn dangling_protocol_reference_rejected() {
        let result = EmergencyCatalog::new(
            vec![minimal_rule("r1", "missing")],
            vec![minimal_protocol("p1")],
        );
        match result {
            Err(CatalogError::Invalid(defects)) => {
                assert!(defects.iter().any(|d| d.contains("unknown protocol")));
            }
            _ => panic!("expected validation failure"),
        }
    }

    #[test]
    fn duplicate_ids_rejected() {
        let result = EmergencyCatalog::new(
            vec![minimal_rule("r1", "p1"), minimal_rule("r1", "p1")],
            vec![minimal_protocol("p1"), minimal_protocol("p1")],
        );
        match result {
            Err(CatalogError::Invalid(defects)) => {
                assert!(defects.iter().any(|d| d.contains("duplicate rule id")));
                assert!(defects.iter().any(|d| d.contains("duplicate protocol id")));
            }
            _ => panic!("expected validation failure"),
        }
    }

    #[test]
    fn all_defects_collected_in_one_pass() {
        let mut bad_rule = minimal_rule("r1", "missing");
        bad_rule.condition = Condition::All(vec![]);
        let result = EmergencyCatalog::new(vec![bad_rule], vec![]);
        match result {
            Err(CatalogError::Invalid(defects)) => assert!(defects.len() >= 2),
            _ => panic!("expected validation failure"),
        }
    }

    #[test]
    fn protocol_lookup_by_id() {
        let catalog =
            EmergencyCatalog::new(vec![], vec![minimal_protocol("p1")]).unwrap();
        assert!(catalog.protocol("p1").is_some());
        assert!(catalog.protocol("p2").is_none());
    }
}
