use std::fmt::Write as _;

use crate::catalog::EmergencyCatalog;
use crate::models::EmergencyAssessment;

/// Deterministic text projection of a recorded event, for chart/EHR hand-off.
/// Same assessment in, same text out; the report is derived data, never
/// stored state of its own.
pub struct IncidentReport;

impl IncidentReport {
    pub fn render(
        patient_id: &str,
        assessment: &EmergencyAssessment,
        catalog: &EmergencyCatalog,
    ) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "EMERGENCY INCIDENT REPORT");
        let _ = writeln!(out, "Patient: {patient_id}");
        let _ = writeln!(
            out,
            "Priority: {} | EMS required: {}",
            assessment.highest_priority.as_str(),
            if assessment.requires_ems { "yes" } else { "no" }
        );
        let _ = writeln!(
            out,
            "Detected: {}",
            assessment.assessed_at.format("%Y-%m-%d %H:%M:%S")
        );

        let _ = writeln!(out, "\nTriggered rules:");
        for rule in &assessment.triggered_rules {
            let _ = writeln!(out, "  - {} [{}]", rule.rule_name, rule.category.as_str());
        }

        let categories: Vec<&str> =
            assessment.categories.iter().map(|c| c.as_str()).collect();
        let _ = writeln!(out, "Categories: {}", categories.join(", "));

        let _ = writeln!(out, "\nVital signs:");
        let present = assessment.vitals.present();
        if present.is_empty() {
            let _ = writeln!(out, "  (no readings in snapshot)");
        }
        for (field, value) in present {
            let _ = writeln!(out, "  - {}: {} {}", field.as_str(), value, field.unit());
        }

        let _ = writeln!(out, "\nReported symptoms:");
        if assessment.symptoms.is_empty() {
            let _ = writeln!(out, "  (none reported)");
        }
        for symptom in &assessment.symptoms {
            let _ = writeln!(
                out,
                "  - {} ({})",
                symptom.name,
                symptom.severity.as_str()
            );
        }

        let protocol_names: Vec<&str> = assessment
            .recommended_protocols
            .iter()
            .filter_map(|id| catalog.protocol(id).map(|p| p.name.as_str()))
            .collect();
        let _ = writeln!(out, "\nActivated protocols: {}", protocol_names.join(", "));

        let _ = writeln!(out, "\nImmediate actions:");
        for action in &assessment.immediate_actions {
            let _ = writeln!(out, "  - {action}");
        }

        for protocol_id in &assessment.recommended_protocols {
            let Some(protocol) = catalog.protocol(protocol_id) else {
                continue;
            };
            let _ = writeln!(out, "\nProtocol: {} ({})", protocol.name, protocol.id);
            let _ = writeln!(out, "  Patient instructions:");
            for instruction in &protocol.patient_instructions {
                let _ = writeln!(out, "    - {instruction}");
            }
            let _ = writeln!(out, "  Care team actions:");
            for action in &protocol.care_team_actions {
                let _ = writeln!(out, "    - {action}");
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assessment::AssessmentBuilder;
    use crate::engine::evaluator::RuleEvaluator;
    use crate::models::{Symptom, SymptomSeverity, VitalSigns};

    fn scenario_assessment() -> (EmergencyAssessment, EmergencyCatalog) {
        let catalog = EmergencyCatalog::bundled();
        let vitals = VitalSigns {
            systolic_bp: Some(70.0),
            heart_rate: Some(115.0),
            ..Default::default()
        };
        let symptoms = vec![Symptom::new("active bleeding", SymptomSeverity::Severe)];
        let triggered = RuleEvaluator::new().evaluate(&catalog, &vitals, &symptoms);
        let assessment = AssessmentBuilder::build(&catalog, &triggered, &vitals, &symptoms);
        (assessment, catalog)
    }

    #[test]
    fn report_carries_all_sections() {
        let (assessment, catalog) = scenario_assessment();
        let report = IncidentReport::render("p-1", &assessment, &catalog);

        assert!(report.contains("EMERGENCY INCIDENT REPORT"));
        assert!(report.contains("Patient: p-1"));
        assert!(report.contains("Priority: life_threatening | EMS required: yes"));
        assert!(report.contains("Hypotension"));
        assert!(report.contains("Major bleeding with unstable vitals"));
        assert!(report.contains("Categories: cardiac, trauma"));
        assert!(report.contains("systolic_bp: 70 mmHg"));
        assert!(report.contains("active bleeding (severe)"));
        assert!(report.contains("Hemorrhage Control"));
        assert!(report.contains("Call emergency services (911) immediately"));
        assert!(report.contains("Care team actions:"));
    }

    #[test]
    fn report_is_deterministic() {
        let (assessment, catalog) = scenario_assessment();
        let a = IncidentReport::render("p-1", &assessment, &catalog);
        let b = IncidentReport::render("p-1", &assessment, &catalog);
        assert_eq!(a, b);
    }
}
