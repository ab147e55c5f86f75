use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(RuleCategory {
    Cardiac => "cardiac",
    Respiratory => "respiratory",
    Neurological => "neurological",
    Metabolic => "metabolic",
    Trauma => "trauma",
    General => "general",
});

str_enum!(ContactChannel {
    Sms => "sms",
    Voice => "voice",
    App => "app",
});

str_enum!(AssigneeRole {
    Physician => "physician",
    Nurse => "nurse",
    Caregiver => "caregiver",
    Patient => "patient",
});

str_enum!(AdjustmentType {
    Monitoring => "monitoring",
    Medication => "medication",
    Activity => "activity",
    Diet => "diet",
    Education => "education",
});

str_enum!(ResolutionOutcome {
    Stabilized => "stabilized",
    EmsTransported => "ems_transported",
    Hospitalized => "hospitalized",
    SelfResolved => "self_resolved",
    FalseAlarm => "false_alarm",
});

// ---------------------------------------------------------------------------
// Ordered severities, defined by hand so the derived Ord carries the
// escalation order.
// ---------------------------------------------------------------------------

/// Classification severity. Variant order IS the escalation order:
/// Urgent < Emergency < LifeThreatening.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyPriority {
    Urgent,
    Emergency,
    LifeThreatening,
}

impl EmergencyPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Emergency => "emergency",
            Self::LifeThreatening => "life_threatening",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "urgent" => Some(Self::Urgent),
            "emergency" => Some(Self::Emergency),
            "life_threatening" => Some(Self::LifeThreatening),
            _ => None,
        }
    }
}

/// Reported symptom severity. Variant order: Mild < Moderate < Severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SymptomSeverity {
    Mild,
    Moderate,
    Severe,
}

impl SymptomSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }
}
