//! JSON catalog definitions.
//!
//! Deployments can replace or extend the bundled catalog with JSON files
//! (`rules.json` + `protocols.json`). The definition types here are the
//! data-only projection of the catalog: the `Custom` condition escape hatch
//! deliberately has no JSON spelling.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::{EmergencyPriority, RuleCategory, SymptomSeverity, VitalField};

use super::condition::Condition;
use super::protocol::Protocol;
use super::rule::Rule;
use super::{CatalogError, EmergencyCatalog};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionDef {
    VitalAbove {
        field: VitalField,
        threshold: f64,
    },
    VitalBelow {
        field: VitalField,
        threshold: f64,
    },
    VitalOutside {
        field: VitalField,
        low: f64,
        high: f64,
    },
    SymptomPresent {
        pattern: String,
    },
    SymptomAtLeast {
        pattern: String,
        severity: SymptomSeverity,
    },
    All {
        conditions: Vec<ConditionDef>,
    },
    Any {
        conditions: Vec<ConditionDef>,
    },
}

impl ConditionDef {
    pub fn into_condition(self) -> Condition {
        match self {
            ConditionDef::VitalAbove { field, threshold } => {
                Condition::VitalAbove { field, threshold }
            }
            ConditionDef::VitalBelow { field, threshold } => {
                Condition::VitalBelow { field, threshold }
            }
            ConditionDef::VitalOutside { field, low, high } => {
                Condition::VitalOutside { field, low, high }
            }
            ConditionDef::SymptomPresent { pattern } => Condition::SymptomPresent { pattern },
            ConditionDef::SymptomAtLeast { pattern, severity } => {
                Condition::SymptomAtLeast { pattern, severity }
            }
            ConditionDef::All { conditions } => {
                Condition::All(conditions.into_iter().map(|c| c.into_condition()).collect())
            }
            ConditionDef::Any { conditions } => {
                Condition::Any(conditions.into_iter().map(|c| c.into_condition()).collect())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDef {
    pub id: String,
    pub name: String,
    pub category: RuleCategory,
    pub priority: EmergencyPriority,
    pub condition: ConditionDef,
    pub protocol_id: String,
}

impl RuleDef {
    pub fn into_rule(self) -> Rule {
        Rule {
            id: self.id,
            name: self.name,
            category: self.category,
            priority: self.priority,
            condition: self.condition.into_condition(),
            protocol_id: self.protocol_id,
        }
    }
}

/// Load a validated catalog from `rules.json` and `protocols.json` in the
/// given directory.
pub fn load_catalog(dir: &Path) -> Result<EmergencyCatalog, CatalogError> {
    let rules_path = dir.join("rules.json");
    let protocols_path = dir.join("protocols.json");

    let rules_json = std::fs::read_to_string(&rules_path)
        .map_err(|e| CatalogError::Load(rules_path.display().to_string(), e.to_string()))?;
    let rule_defs: Vec<RuleDef> = serde_json::from_str(&rules_json)
        .map_err(|e| CatalogError::Parse("rules.json".into(), e.to_string()))?;

    let protocols_json = std::fs::read_to_string(&protocols_path)
        .map_err(|e| CatalogError::Load(protocols_path.display().to_string(), e.to_string()))?;
    let protocols: Vec<Protocol> = serde_json::from_str(&protocols_json)
        .map_err(|e| CatalogError::Parse("protocols.json".into(), e.to_string()))?;

    EmergencyCatalog::new(
        rule_defs.into_iter().map(|r| r.into_rule()).collect(),
        protocols,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Symptom, VitalSigns};

    #[test]
    fn condition_def_parses_nested_combinators() {
        let json = r#"{
            "type": "all",
            "conditions": [
                {"type": "symptom_at_least", "pattern": "bleeding", "severity": "severe"},
                {"type": "any", "conditions": [
                    {"type": "vital_below", "field": "systolic_bp", "threshold": 100.0},
                    {"type": "vital_above", "field": "heart_rate", "threshold": 110.0}
                ]}
            ]
        }"#;
        let def: ConditionDef = serde_json::from_str(json).unwrap();
        let condition = def.into_condition();

        let vitals = VitalSigns {
            systolic_bp: Some(70.0),
            ..Default::default()
        };
        let symptoms = vec![Symptom::new("active bleeding", SymptomSeverity::Severe)];
        assert!(condition.eval(&vitals, &symptoms).unwrap());
        assert!(!condition.eval(&VitalSigns::default(), &symptoms).unwrap());
    }

    #[test]
    fn rule_def_converts() {
        let json = r#"{
            "id": "high_fever",
            "name": "High fever",
            "category": "general",
            "priority": "urgent",
            "condition": {"type": "vital_above", "field": "temperature", "threshold": 39.4},
            "protocol_id": "general_escalation"
        }"#;
        let def: RuleDef = serde_json::from_str(json).unwrap();
        let rule = def.into_rule();
        assert_eq!(rule.id, "high_fever");
        assert_eq!(rule.priority, EmergencyPriority::Urgent);
        assert_eq!(rule.protocol_id, "general_escalation");
    }

    #[test]
    fn load_catalog_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("protocols.json"),
            r#"[{
                "id": "general_escalation",
                "name": "General Escalation",
                "category": "general",
                "priority": "urgent",
                "steps": [{
                    "order": 1,
                    "instruction": "Contact the care team",
                    "for_patient": true,
                    "for_care_team": false,
                    "critical": false
                }],
                "patient_instructions": ["Rest and re-check in 30 minutes"],
                "care_team_actions": ["Review the snapshot"],
                "escalation_minutes": 60
            }]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("rules.json"),
            r#"[{
                "id": "high_fever",
                "name": "High fever",
                "category": "general",
                "priority": "urgent",
                "condition": {"type": "vital_above", "field": "temperature", "threshold": 39.4},
                "protocol_id": "general_escalation"
            }]"#,
        )
        .unwrap();

        let catalog = load_catalog(dir.path()).unwrap();
        assert_eq!(catalog.rules().len(), 1);
        assert!(catalog.protocol("general_escalation").is_some());
    }

    #[test]
    fn load_catalog_missing_file_faults() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_catalog(dir.path()),
            Err(CatalogError::Load(_, _))
        ));
    }

    #[test]
    fn load_catalog_dangling_reference_faults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("protocols.json"), "[]").unwrap();
        std::fs::write(
            dir.path().join("rules.json"),
            r#"[{
                "id": "high_fever",
                "name": "High fever",
                "category": "general",
                "priority": "urgent",
                "condition": {"type": "vital_above", "field": "temperature", "threshold": 39.4},
                "protocol_id": "nowhere"
            }]"#,
        )
        .unwrap();
        assert!(matches!(
            load_catalog(dir.path()),
            Err(CatalogError::Invalid(_))
        ));
    }
}
