use uuid::Uuid;

use crate::models::{
    AdjustmentType, AssigneeRole, CarePlanAdjustment, EmergencyEvent, EmergencyPriority,
    FollowUpAction, RuleCategory,
};

/// Days between an adjustment taking effect and its scheduled review.
const ADJUSTMENT_REVIEW_DAYS: i64 = 7;

/// Deterministically expands a recorded event into follow-up tasks.
///
/// Generation is not idempotent: a second invocation for the same event
/// appends duplicates. The workflow invokes it exactly once per event.
///
/// Category-specific items key off the event's *first* listed category
/// (first-trigger order), which with co-occurring categories is not
/// necessarily the category of the most severe triggered rule.
pub struct FollowUpGenerator;

impl FollowUpGenerator {
    pub fn generate(event: &EmergencyEvent) -> Vec<FollowUpAction> {
        let mut actions = Vec::new();
        let mut push = |category: &str, description: &str, due: u32, assignee: AssigneeRole| {
            actions.push(FollowUpAction {
                id: Uuid::new_v4(),
                event_id: event.id,
                category: category.into(),
                description: description.into(),
                due_within_hours: due,
                assignee,
                completed: false,
                completed_at: None,
                notes: None,
            });
        };

        // Universal items for every event
        push(
            "appointment",
            "Schedule a physician follow-up visit",
            48,
            AssigneeRole::Caregiver,
        );
        push(
            "monitoring",
            "Increase vital-sign monitoring frequency",
            24,
            AssigneeRole::Nurse,
        );

        match event.assessment.categories.first() {
            Some(RuleCategory::Cardiac) => {
                push(
                    "assessment",
                    "Obtain a 12-lead ECG and review with cardiology",
                    24,
                    AssigneeRole::Physician,
                );
                push(
                    "review",
                    "Review cardiac medication dosing",
                    48,
                    AssigneeRole::Physician,
                );
            }
            Some(RuleCategory::Respiratory) => {
                push(
                    "assessment",
                    "Check resting and exertional oxygen saturation",
                    24,
                    AssigneeRole::Nurse,
                );
                push(
                    "education",
                    "Review inhaler technique with the patient",
                    72,
                    AssigneeRole::Nurse,
                );
            }
            Some(RuleCategory::Neurological) => {
                push(
                    "assessment",
                    "Complete a full neurological assessment",
                    12,
                    AssigneeRole::Physician,
                );
                push(
                    "review",
                    "Screen for stroke risk factors",
                    48,
                    AssigneeRole::Physician,
                );
            }
            Some(RuleCategory::Metabolic) => {
                push(
                    "review",
                    "Review the glucose log and adjust the dosing plan",
                    24,
                    AssigneeRole::Physician,
                );
                push(
                    "education",
                    "Reinforce hypoglycemia recognition education",
                    72,
                    AssigneeRole::Nurse,
                );
            }
            Some(RuleCategory::Trauma) => {
                push(
                    "assessment",
                    "Assess for delayed injury and wound complications",
                    24,
                    AssigneeRole::Nurse,
                );
                push(
                    "review",
                    "Conduct a home hazard review",
                    72,
                    AssigneeRole::Caregiver,
                );
            }
            Some(RuleCategory::General) => {
                push(
                    "assessment",
                    "Re-assess reported symptoms at the next check-in",
                    24,
                    AssigneeRole::Nurse,
                );
            }
            None => {}
        }

        if event.assessment.highest_priority == EmergencyPriority::LifeThreatening {
            push(
                "review",
                "Comprehensive care-plan review with the full care team",
                72,
                AssigneeRole::Physician,
            );
            push(
                "review",
                "Debrief the emergency response timeline",
                96,
                AssigneeRole::Nurse,
            );
        }

        actions
    }
}

/// Deterministically expands a recorded event into care-plan adjustments.
/// Same exactly-once calling convention and first-category keying as
/// `FollowUpGenerator`.
pub struct CarePlanAdjuster;

impl CarePlanAdjuster {
    pub fn generate(event: &EmergencyEvent) -> Vec<CarePlanAdjustment> {
        let effective = chrono::Local::now().date_naive();
        let review = effective + chrono::Duration::days(ADJUSTMENT_REVIEW_DAYS);
        let reason = format!(
            "{} emergency event on {}",
            event.assessment.highest_priority.as_str(),
            event.created_at.format("%Y-%m-%d")
        );

        let mut adjustments = Vec::new();
        let mut push = |adjustment_type: AdjustmentType, description: &str| {
            adjustments.push(CarePlanAdjustment {
                id: Uuid::new_v4(),
                event_id: event.id,
                adjustment_type,
                description: description.into(),
                reason: reason.clone(),
                effective_date: effective,
                review_date: review,
            });
        };

        // Universal adjustment for every event
        push(
            AdjustmentType::Monitoring,
            "Increase monitoring frequency until the review date",
        );

        match event.assessment.categories.first() {
            Some(RuleCategory::Cardiac) => {
                push(
                    AdjustmentType::Medication,
                    "Flag cardiac medications for dosing review",
                );
            }
            Some(RuleCategory::Respiratory) => {
                push(
                    AdjustmentType::Activity,
                    "Limit exertion pending respiratory review",
                );
            }
            Some(RuleCategory::Neurological) => {
                push(
                    AdjustmentType::Activity,
                    "Supervise ambulation until neurological review",
                );
            }
            Some(RuleCategory::Metabolic) => {
                push(
                    AdjustmentType::Diet,
                    "Review carbohydrate intake and meal timing",
                );
            }
            Some(RuleCategory::Trauma) => {
                push(
                    AdjustmentType::Activity,
                    "Restrict unsupervised transfers and stairs",
                );
            }
            Some(RuleCategory::General) | None => {}
        }

        if event.assessment.highest_priority == EmergencyPriority::LifeThreatening {
            push(
                AdjustmentType::Education,
                "Refresh household emergency-response training",
            );
        }

        adjustments
    }
}
