//! The built-in curated catalog: detection rules and response protocols for
//! home monitoring of cardiac, respiratory, neurological, metabolic, trauma
//! and general deterioration patterns.
//!
//! Thresholds follow widely published adult early-warning cut-offs; they are
//! deliberately conservative because the engine is a surveillance aid, not a
//! diagnostic device.

use crate::models::{EmergencyPriority, RuleCategory, SymptomSeverity, VitalField};

use super::condition::Condition;
use super::protocol::{Protocol, ProtocolStep};
use super::rule::Rule;

fn step(
    order: u32,
    instruction: &str,
    for_patient: bool,
    for_care_team: bool,
    time_limit_minutes: Option<u32>,
    critical: bool,
) -> ProtocolStep {
    ProtocolStep {
        order,
        instruction: instruction.into(),
        for_patient,
        for_care_team,
        time_limit_minutes,
        critical,
    }
}

fn rule(
    id: &str,
    name: &str,
    category: RuleCategory,
    priority: EmergencyPriority,
    condition: Condition,
    protocol_id: &str,
) -> Rule {
    Rule {
        id: id.into(),
        name: name.into(),
        category,
        priority,
        condition,
        protocol_id: protocol_id.into(),
    }
}

/// Detection rules in catalog order. Evaluation and triggered-rule reporting
/// preserve this order.
pub fn default_rules() -> Vec<Rule> {
    use Condition::*;
    use EmergencyPriority::*;
    use RuleCategory::*;

    vec![
        // ── Cardiac ──
        rule(
            "tachycardia",
            "Tachycardia",
            Cardiac,
            Emergency,
            VitalAbove {
                field: VitalField::HeartRate,
                threshold: 120.0,
            },
            "cardiac_monitoring",
        ),
        rule(
            "extreme_tachycardia",
            "Extreme tachycardia",
            Cardiac,
            LifeThreatening,
            VitalAbove {
                field: VitalField::HeartRate,
                threshold: 150.0,
            },
            "cardiac_emergency",
        ),
        rule(
            "bradycardia",
            "Bradycardia",
            Cardiac,
            Emergency,
            VitalBelow {
                field: VitalField::HeartRate,
                threshold: 50.0,
            },
            "cardiac_monitoring",
        ),
        rule(
            "severe_bradycardia",
            "Severe bradycardia",
            Cardiac,
            LifeThreatening,
            VitalBelow {
                field: VitalField::HeartRate,
                threshold: 40.0,
            },
            "cardiac_emergency",
        ),
        rule(
            "hypotension",
            "Hypotension",
            Cardiac,
            Emergency,
            VitalBelow {
                field: VitalField::SystolicBp,
                threshold: 90.0,
            },
            "cardiac_monitoring",
        ),
        rule(
            "hypertensive_crisis",
            "Hypertensive crisis",
            Cardiac,
            Emergency,
            VitalAbove {
                field: VitalField::SystolicBp,
                threshold: 180.0,
            },
            "cardiac_monitoring",
        ),
        rule(
            "chest_pain",
            "Chest pain",
            Cardiac,
            Emergency,
            SymptomAtLeast {
                pattern: "chest pain".into(),
                severity: SymptomSeverity::Moderate,
            },
            "cardiac_monitoring",
        ),
        rule(
            "chest_pain_with_instability",
            "Chest pain with unstable vitals",
            Cardiac,
            LifeThreatening,
            All(vec![
                SymptomAtLeast {
                    pattern: "chest pain".into(),
                    severity: SymptomSeverity::Moderate,
                },
                Any(vec![
                    VitalAbove {
                        field: VitalField::HeartRate,
                        threshold: 100.0,
                    },
                    VitalBelow {
                        field: VitalField::SystolicBp,
                        threshold: 100.0,
                    },
                ]),
            ]),
            "cardiac_emergency",
        ),
        // ── Respiratory ──
        rule(
            "hypoxia",
            "Low oxygen saturation",
            Respiratory,
            Emergency,
            VitalBelow {
                field: VitalField::OxygenSaturation,
                threshold: 92.0,
            },
            "respiratory_support",
        ),
        rule(
            "severe_hypoxia",
            "Severe hypoxia",
            Respiratory,
            LifeThreatening,
            VitalBelow {
                field: VitalField::OxygenSaturation,
                threshold: 88.0,
            },
            "respiratory_distress",
        ),
        rule(
            "tachypnea",
            "Rapid breathing",
            Respiratory,
            Emergency,
            VitalAbove {
                field: VitalField::RespiratoryRate,
                threshold: 30.0,
            },
            "respiratory_support",
        ),
        rule(
            "severe_breathing_difficulty",
            "Severe breathing difficulty",
            Respiratory,
            Emergency,
            Any(vec![
                SymptomAtLeast {
                    pattern: "difficulty breathing".into(),
                    severity: SymptomSeverity::Severe,
                },
                SymptomAtLeast {
                    pattern: "shortness of breath".into(),
                    severity: SymptomSeverity::Severe,
                },
            ]),
            "respiratory_support",
        ),
        // ── Neurological ──
        rule(
            "stroke_signs",
            "Possible stroke signs",
            Neurological,
            LifeThreatening,
            Any(vec![
                SymptomPresent {
                    pattern: "facial droop".into(),
                },
                SymptomPresent {
                    pattern: "slurred speech".into(),
                },
                SymptomPresent {
                    pattern: "one-sided weakness".into(),
                },
                SymptomPresent {
                    pattern: "arm drift".into(),
                },
            ]),
            "neuro_emergency",
        ),
        rule(
            "altered_consciousness",
            "Altered consciousness",
            Neurological,
            LifeThreatening,
            Any(vec![
                SymptomPresent {
                    pattern: "unresponsive".into(),
                },
                SymptomAtLeast {
                    pattern: "confusion".into(),
                    severity: SymptomSeverity::Severe,
                },
            ]),
            "neuro_emergency",
        ),
        rule(
            "seizure",
            "Seizure activity",
            Neurological,
            Emergency,
            SymptomPresent {
                pattern: "seizure".into(),
            },
            "neuro_assessment",
        ),
        // ── Metabolic ──
        rule(
            "hypoglycemia",
            "Hypoglycemia",
            Metabolic,
            Emergency,
            VitalBelow {
                field: VitalField::BloodGlucose,
                threshold: 54.0,
            },
            "glycemic_crisis",
        ),
        rule(
            "severe_hypoglycemia",
            "Severe hypoglycemia",
            Metabolic,
            LifeThreatening,
            VitalBelow {
                field: VitalField::BloodGlucose,
                threshold: 40.0,
            },
            "glycemic_crisis",
        ),
        rule(
            "severe_hyperglycemia",
            "Severe hyperglycemia",
            Metabolic,
            Emergency,
            VitalAbove {
                field: VitalField::BloodGlucose,
                threshold: 400.0,
            },
            "glycemic_crisis",
        ),
        // ── Trauma ──
        rule(
            "hemorrhage_with_instability",
            "Major bleeding with unstable vitals",
            Trauma,
            LifeThreatening,
            All(vec![
                SymptomAtLeast {
                    pattern: "bleeding".into(),
                    severity: SymptomSeverity::Severe,
                },
                Any(vec![
                    VitalBelow {
                        field: VitalField::SystolicBp,
                        threshold: 100.0,
                    },
                    VitalAbove {
                        field: VitalField::HeartRate,
                        threshold: 110.0,
                    },
                ]),
            ]),
            "hemorrhage_control",
        ),
        rule(
            "fall_reported",
            "Fall with possible injury",
            Trauma,
            Emergency,
            SymptomAtLeast {
                pattern: "fall".into(),
                severity: SymptomSeverity::Moderate,
            },
            "fall_response",
        ),
        // ── General ──
        rule(
            "high_fever",
            "High fever",
            General,
            Urgent,
            VitalAbove {
                field: VitalField::Temperature,
                threshold: 39.4,
            },
            "general_escalation",
        ),
        rule(
            "hypothermia",
            "Hypothermia",
            General,
            Emergency,
            VitalBelow {
                field: VitalField::Temperature,
                threshold: 35.0,
            },
            "general_escalation",
        ),
        rule(
            "severe_pain",
            "Severe uncontrolled pain",
            General,
            Urgent,
            VitalAbove {
                field: VitalField::PainLevel,
                threshold: 8.0,
            },
            "pain_escalation",
        ),
    ]
}

/// Response protocols referenced by the default rules.
pub fn default_protocols() -> Vec<Protocol> {
    vec![
        Protocol {
            id: "cardiac_emergency".into(),
            name: "Cardiac Emergency Response".into(),
            category: RuleCategory::Cardiac,
            priority: EmergencyPriority::LifeThreatening,
            steps: vec![
                step(1, "Call emergency services (911) immediately", true, true, Some(1), true),
                step(2, "Have the patient stop all activity and sit or lie down", true, false, None, false),
                step(3, "If the patient is unresponsive and not breathing, begin CPR", false, true, None, true),
                step(4, "Retrieve the nearest AED and follow its prompts", false, true, None, false),
                step(5, "Recheck pulse and breathing every 2 minutes until EMS arrives", false, true, None, false),
            ],
            patient_instructions: vec![
                "Stop all activity immediately".into(),
                "Chew one adult aspirin if not allergic and previously advised".into(),
                "Unlock the front door for responders".into(),
            ],
            care_team_actions: vec![
                "Dispatch the nearest responder to the patient".into(),
                "Pull the latest cardiac history for EMS hand-off".into(),
                "Notify the on-call cardiologist".into(),
            ],
            escalation_minutes: 5,
            required_resources: vec!["aed".into(), "aspirin".into()],
        },
        Protocol {
            id: "cardiac_monitoring".into(),
            name: "Cardiac Event Monitoring".into(),
            category: RuleCategory::Cardiac,
            priority: EmergencyPriority::Emergency,
            steps: vec![
                step(1, "Have the patient sit down and rest", true, false, None, false),
                step(2, "Repeat heart-rate and blood-pressure readings after 5 minutes of rest", true, true, Some(5), false),
                step(3, "Contact the on-call nurse with both readings", true, true, None, true),
                step(4, "Escalate to the cardiac emergency response if readings worsen", false, true, None, false),
            ],
            patient_instructions: vec![
                "Sit down and rest until advised otherwise".into(),
                "Avoid caffeine and exertion for the rest of the day".into(),
            ],
            care_team_actions: vec![
                "Review the rhythm trend for the past 24 hours".into(),
                "Schedule a same-day telehealth review".into(),
            ],
            escalation_minutes: 15,
            required_resources: vec!["blood_pressure_cuff".into(), "pulse_oximeter".into()],
        },
        Protocol {
            id: "respiratory_distress".into(),
            name: "Respiratory Distress Response".into(),
            category: RuleCategory::Respiratory,
            priority: EmergencyPriority::LifeThreatening,
            steps: vec![
                step(1, "Call emergency services (911) immediately", true, true, Some(1), true),
                step(2, "Sit the patient upright and loosen tight clothing", true, true, None, false),
                step(3, "Start supplemental oxygen if available and prescribed", false, true, None, false),
                step(4, "Monitor oxygen saturation continuously until EMS arrives", false, true, None, false),
            ],
            patient_instructions: vec![
                "Sit upright, do not lie flat".into(),
                "Use your prescribed rescue inhaler if you have one".into(),
            ],
            care_team_actions: vec![
                "Prepare the home oxygen concentrator".into(),
                "Brief EMS on baseline saturation and oxygen needs".into(),
            ],
            escalation_minutes: 5,
            required_resources: vec!["oxygen".into(), "pulse_oximeter".into()],
        },
        Protocol {
            id: "respiratory_support".into(),
            name: "Respiratory Support".into(),
            category: RuleCategory::Respiratory,
            priority: EmergencyPriority::Emergency,
            steps: vec![
                step(1, "Sit the patient upright and coach slow pursed-lip breathing", true, true, None, false),
                step(2, "Administer the prescribed rescue inhaler or nebulizer", true, false, None, true),
                step(3, "Re-measure oxygen saturation after 10 minutes", true, true, Some(10), false),
                step(4, "Escalate to the respiratory distress response if saturation stays below 90%", false, true, None, false),
            ],
            patient_instructions: vec![
                "Sit upright and breathe slowly through pursed lips".into(),
                "Use your rescue inhaler as prescribed".into(),
            ],
            care_team_actions: vec![
                "Check inhaler technique at the next contact".into(),
                "Log saturation readings every 30 minutes for 4 hours".into(),
            ],
            escalation_minutes: 20,
            required_resources: vec!["pulse_oximeter".into()],
        },
        Protocol {
            id: "neuro_emergency".into(),
            name: "Stroke Response".into(),
            category: RuleCategory::Neurological,
            priority: EmergencyPriority::LifeThreatening,
            steps: vec![
                step(1, "Call emergency services (911) immediately and note the time symptoms started", true, true, Some(1), true),
                step(2, "Perform the FAST check: face droop, arm drift, speech, time", false, true, None, false),
                step(3, "Do not give food, drink or medication", true, true, None, false),
                step(4, "Keep the patient still and calm until EMS arrives", true, true, None, false),
            ],
            patient_instructions: vec![
                "Stay seated or lying down, do not walk".into(),
                "Do not eat or drink anything".into(),
            ],
            care_team_actions: vec![
                "Record symptom onset time for the stroke team".into(),
                "Compile the current medication list for EMS hand-off".into(),
            ],
            escalation_minutes: 5,
            required_resources: vec![],
        },
        Protocol {
            id: "neuro_assessment".into(),
            name: "Neurological Assessment".into(),
            category: RuleCategory::Neurological,
            priority: EmergencyPriority::Emergency,
            steps: vec![
                step(1, "Move hard objects away and place the patient on their side", true, true, None, false),
                step(2, "Time the episode; observe without restraining", false, true, None, false),
                step(3, "Call the on-call physician once the patient is stable", false, true, None, true),
            ],
            patient_instructions: vec![
                "Rest in a safe position until the care team arrives".into(),
            ],
            care_team_actions: vec![
                "Document duration and description of the episode".into(),
                "Arrange neurological review within 24 hours".into(),
            ],
            escalation_minutes: 15,
            required_resources: vec![],
        },
        Protocol {
            id: "glycemic_crisis".into(),
            name: "Glycemic Crisis Response".into(),
            category: RuleCategory::Metabolic,
            priority: EmergencyPriority::Emergency,
            steps: vec![
                step(1, "Confirm the reading with a second measurement", true, true, Some(5), false),
                step(2, "If glucose is low, give 15 grams of fast-acting glucose", true, true, None, true),
                step(3, "If glucose is high, follow the prescribed correction plan and encourage fluids", true, false, None, false),
                step(4, "Re-test after 15 minutes and report both readings to the care team", true, true, Some(15), false),
            ],
            patient_instructions: vec![
                "Do not drive or operate machinery until readings normalize".into(),
                "Keep fast-acting glucose within reach".into(),
            ],
            care_team_actions: vec![
                "Review the insulin or medication schedule for dosing errors".into(),
                "Check glucometer calibration at the next visit".into(),
            ],
            escalation_minutes: 10,
            required_resources: vec!["glucometer".into(), "fast_acting_glucose".into()],
        },
        Protocol {
            id: "hemorrhage_control".into(),
            name: "Hemorrhage Control".into(),
            category: RuleCategory::Trauma,
            priority: EmergencyPriority::LifeThreatening,
            steps: vec![
                step(1, "Call emergency services (911) immediately", true, true, Some(1), true),
                step(2, "Apply firm continuous pressure to the wound with a clean dressing", true, true, None, true),
                step(3, "Lay the patient flat and elevate the bleeding site if possible", true, true, None, false),
                step(4, "Do not remove soaked dressings; add new layers on top", true, true, None, false),
            ],
            patient_instructions: vec![
                "Keep pressure on the wound without lifting the dressing".into(),
                "Stay lying down until responders arrive".into(),
            ],
            care_team_actions: vec![
                "Estimate blood loss for EMS hand-off".into(),
                "Flag anticoagulant use to responders".into(),
            ],
            escalation_minutes: 5,
            required_resources: vec!["pressure_dressing".into()],
        },
        Protocol {
            id: "fall_response".into(),
            name: "Fall Response".into(),
            category: RuleCategory::Trauma,
            priority: EmergencyPriority::Emergency,
            steps: vec![
                step(1, "Do not move the patient until injury has been ruled out", true, true, None, true),
                step(2, "Check for head impact, limb deformity and severe pain", false, true, None, false),
                step(3, "Help the patient up slowly only if uninjured", false, true, None, false),
                step(4, "Report the fall to the care team the same day", true, true, None, false),
            ],
            patient_instructions: vec![
                "Stay where you are until someone checks you over".into(),
            ],
            care_team_actions: vec![
                "Complete a post-fall injury check".into(),
                "Record the circumstances of the fall".into(),
            ],
            escalation_minutes: 30,
            required_resources: vec![],
        },
        Protocol {
            id: "general_escalation".into(),
            name: "General Escalation".into(),
            category: RuleCategory::General,
            priority: EmergencyPriority::Urgent,
            steps: vec![
                step(1, "Re-check the abnormal reading after 30 minutes of rest", true, true, Some(30), false),
                step(2, "Contact the care team with both readings", true, true, None, true),
                step(3, "Follow the care team's instructions for next steps", true, false, None, false),
            ],
            patient_instructions: vec![
                "Rest and avoid exertion until the re-check".into(),
                "Drink fluids unless you are on a fluid restriction".into(),
            ],
            care_team_actions: vec![
                "Compare against the patient's baseline readings".into(),
                "Decide whether a same-day visit is needed".into(),
            ],
            escalation_minutes: 60,
            required_resources: vec![],
        },
        Protocol {
            id: "pain_escalation".into(),
            name: "Pain Escalation".into(),
            category: RuleCategory::General,
            priority: EmergencyPriority::Urgent,
            steps: vec![
                step(1, "Administer prescribed as-needed pain medication", true, false, None, false),
                step(2, "Apply non-drug comfort measures: positioning, heat or cold", true, true, None, false),
                step(3, "Contact the care team if pain stays above 7 of 10 after one hour", true, true, Some(60), true),
            ],
            patient_instructions: vec![
                "Take only the prescribed dose, do not double up".into(),
                "Note what makes the pain better or worse".into(),
            ],
            care_team_actions: vec![
                "Review the analgesic plan for gaps".into(),
                "Screen for new injury or complication behind the pain".into(),
            ],
            escalation_minutes: 45,
            required_resources: vec![],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_default_rule_resolves_its_protocol() {
        let protocols = default_protocols();
        for rule in default_rules() {
            assert!(
                protocols.iter().any(|p| p.id == rule.protocol_id),
                "rule {} references missing protocol {}",
                rule.id,
                rule.protocol_id
            );
        }
    }

    #[test]
    fn default_conditions_are_structurally_valid() {
        for rule in default_rules() {
            assert!(
                rule.condition.validate().is_empty(),
                "rule {} has invalid condition",
                rule.id
            );
        }
    }

    #[test]
    fn life_threatening_protocols_have_tight_budgets() {
        for protocol in default_protocols() {
            if protocol.priority == EmergencyPriority::LifeThreatening {
                assert!(
                    protocol.escalation_minutes <= 5,
                    "protocol {} budget too loose",
                    protocol.id
                );
            }
        }
    }

    #[test]
    fn every_protocol_has_a_critical_step_or_none_needed() {
        // All bundled protocols declare at least one critical step so every
        // recommendation yields an immediate action.
        for protocol in default_protocols() {
            assert!(
                protocol.first_critical_instruction().is_some(),
                "protocol {} has no critical step",
                protocol.id
            );
        }
    }
}
