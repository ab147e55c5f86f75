use serde::{Deserialize, Serialize};

use crate::models::{EmergencyPriority, RuleCategory};

/// One ordered step of a response protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolStep {
    pub order: u32,
    pub instruction: String,
    pub for_patient: bool,
    pub for_care_team: bool,
    #[serde(default)]
    pub time_limit_minutes: Option<u32>,
    /// Critical steps feed the assessment's immediate-action list.
    #[serde(default)]
    pub critical: bool,
}

/// A named, ordered response template referenced by catalog rules.
/// The escalation budget is advisory metadata for the surrounding human
/// process, not an enforced timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Protocol {
    pub id: String,
    pub name: String,
    pub category: RuleCategory,
    pub priority: EmergencyPriority,
    pub steps: Vec<ProtocolStep>,
    pub patient_instructions: Vec<String>,
    pub care_team_actions: Vec<String>,
    pub escalation_minutes: u32,
    #[serde(default)]
    pub required_resources: Vec<String>,
}

impl Protocol {
    /// Instruction text of the first step flagged critical, in declaration
    /// order.
    pub fn first_critical_instruction(&self) -> Option<&str> {
        self.steps
            .iter()
            .find(|s| s.critical)
            .map(|s| s.instruction.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(order: u32, instruction: &str, critical: bool) -> ProtocolStep {
        ProtocolStep {
            order,
            instruction: instruction.into(),
            for_patient: true,
            for_care_team: true,
            time_limit_minutes: None,
            critical,
        }
    }

    #[test]
    fn first_critical_follows_declaration_order() {
        let protocol = Protocol {
            id: "demo".into(),
            name: "Demo".into(),
            category: RuleCategory::General,
            priority: EmergencyPriority::Urgent,
            steps: vec![
                step(1, "sit down", false),
                step(2, "call for help", true),
                step(3, "unlock the door", true),
            ],
            patient_instructions: vec![],
            care_team_actions: vec![],
            escalation_minutes: 30,
            required_resources: vec![],
        };
        assert_eq!(protocol.first_critical_instruction(), Some("call for help"));
    }

    #[test]
    fn no_critical_step_yields_none() {
        let protocol = Protocol {
            id: "demo".into(),
            name: "Demo".into(),
            category: RuleCategory::General,
            priority: EmergencyPriority::Urgent,
            steps: vec![step(1, "rest", false)],
            patient_instructions: vec![],
            care_team_actions: vec![],
            escalation_minutes: 30,
            required_resources: vec![],
        };
        assert_eq!(protocol.first_critical_instruction(), None);
    }
}
