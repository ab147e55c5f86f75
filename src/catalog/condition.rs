use std::fmt;
use std::sync::Arc;

use crate::models::{Symptom, SymptomSeverity, VitalField, VitalSigns};

/// Signature for the closure escape hatch. A returned `Err` is a rule fault:
/// the evaluator logs it and treats the rule as not triggered.
pub type CustomPredicateFn = dyn Fn(&VitalSigns, &[Symptom]) -> Result<bool, String> + Send + Sync;

/// Named wrapper so `Condition` stays Debug-printable with a closure inside.
#[derive(Clone)]
pub struct CustomPredicate {
    name: String,
    func: Arc<CustomPredicateFn>,
}

impl CustomPredicate {
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&VitalSigns, &[Symptom]) -> Result<bool, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn eval(&self, vitals: &VitalSigns, symptoms: &[Symptom]) -> Result<bool, String> {
        (self.func)(vitals, symptoms)
    }
}

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomPredicate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A rule predicate built from a closed set of structurally-validated
/// primitives. `Custom` is the explicitly-marked escape hatch for predicates
/// the primitives cannot express; it is code-only, since the JSON catalog format
/// has no spelling for it.
///
/// Missing-data policy: every vital comparison evaluates to *not triggered*
/// when the reading is absent. There is no zero default, for greater-than
/// and less-than comparisons alike.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Reading present and strictly above the threshold.
    VitalAbove { field: VitalField, threshold: f64 },
    /// Reading present and strictly below the threshold.
    VitalBelow { field: VitalField, threshold: f64 },
    /// Reading present and outside the inclusive [low, high] band.
    VitalOutside {
        field: VitalField,
        low: f64,
        high: f64,
    },
    /// Any reported symptom name contains the pattern (case-insensitive).
    SymptomPresent { pattern: String },
    /// As `SymptomPresent`, additionally requiring at least the severity.
    SymptomAtLeast {
        pattern: String,
        severity: SymptomSeverity,
    },
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Custom(CustomPredicate),
}

impl Condition {
    /// Evaluate against one snapshot. Only `Custom` can return `Err`.
    pub fn eval(&self, vitals: &VitalSigns, symptoms: &[Symptom]) -> Result<bool, String> {
        match self {
            Condition::VitalAbove { field, threshold } => {
                Ok(vitals.get(*field).is_some_and(|v| v > *threshold))
            }
            Condition::VitalBelow { field, threshold } => {
                Ok(vitals.get(*field).is_some_and(|v| v < *threshold))
            }
            Condition::VitalOutside { field, low, high } => {
                Ok(vitals.get(*field).is_some_and(|v| v < *low || v > *high))
            }
            Condition::SymptomPresent { pattern } => {
                Ok(symptoms.iter().any(|s| s.matches(pattern)))
            }
            Condition::SymptomAtLeast { pattern, severity } => Ok(symptoms
                .iter()
                .any(|s| s.matches(pattern) && s.severity >= *severity)),
            Condition::All(conditions) => {
                for c in conditions {
                    if !c.eval(vitals, symptoms)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Condition::Any(conditions) => {
                for c in conditions {
                    if c.eval(vitals, symptoms)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Condition::Custom(predicate) => predicate.eval(vitals, symptoms),
        }
    }

    /// Structural validation, run once at catalog load. Returns every defect
    /// found in this condition tree.
    pub fn validate(&self) -> Vec<String> {
        let mut defects = Vec::new();
        self.collect_defects(&mut defects);
        defects
    }

    fn collect_defects(&self, defects: &mut Vec<String>) {
        match self {
            Condition::VitalAbove { field, threshold }
            | Condition::VitalBelow { field, threshold } => {
                if !threshold.is_finite() {
                    defects.push(format!("non-finite threshold for {}", field.as_str()));
                }
            }
            Condition::VitalOutside { field, low, high } => {
                if !low.is_finite() || !high.is_finite() {
                    defects.push(format!("non-finite band for {}", field.as_str()));
                } else if low >= high {
                    defects.push(format!(
                        "inverted band for {}: low {} >= high {}",
                        field.as_str(),
                        low,
                        high
                    ));
                }
            }
            Condition::SymptomPresent { pattern }
            | Condition::SymptomAtLeast { pattern, .. } => {
                if pattern.trim().is_empty() {
                    defects.push("empty symptom pattern".into());
                }
            }
            Condition::All(conditions) | Condition::Any(conditions) => {
                if conditions.is_empty() {
                    defects.push("empty combinator".into());
                }
                for c in conditions {
                    c.collect_defects(defects);
                }
            }
            Condition::Custom(predicate) => {
                if predicate.name().trim().is_empty() {
                    defects.push("unnamed custom predicate".into());
                }
            }
        }
    }
}
