use serde::{Deserialize, Serialize};

/// A vital-sign field addressable by catalog conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalField {
    HeartRate,
    SystolicBp,
    DiastolicBp,
    OxygenSaturation,
    Temperature,
    RespiratoryRate,
    BloodGlucose,
    PainLevel,
}

impl VitalField {
    pub fn as_str(self) -> &'static str {
        match self {
            VitalField::HeartRate => "heart_rate",
            VitalField::SystolicBp => "systolic_bp",
            VitalField::DiastolicBp => "diastolic_bp",
            VitalField::OxygenSaturation => "oxygen_saturation",
            VitalField::Temperature => "temperature",
            VitalField::RespiratoryRate => "respiratory_rate",
            VitalField::BloodGlucose => "blood_glucose",
            VitalField::PainLevel => "pain_level",
        }
    }

    /// Measurement unit for display.
    pub fn unit(self) -> &'static str {
        match self {
            VitalField::HeartRate => "bpm",
            VitalField::SystolicBp | VitalField::DiastolicBp => "mmHg",
            VitalField::OxygenSaturation => "%",
            VitalField::Temperature => "°C",
            VitalField::RespiratoryRate => "breaths/min",
            VitalField::BloodGlucose => "mg/dL",
            VitalField::PainLevel => "/10",
        }
    }

    pub const ALL: [VitalField; 8] = [
        VitalField::HeartRate,
        VitalField::SystolicBp,
        VitalField::DiastolicBp,
        VitalField::OxygenSaturation,
        VitalField::Temperature,
        VitalField::RespiratoryRate,
        VitalField::BloodGlucose,
        VitalField::PainLevel,
    ];
}

/// One sparse vital-sign snapshot. A `None` field means the reading was not
/// taken, never zero. Magnitude comparisons over absent readings do not
/// trigger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    pub heart_rate: Option<f64>,
    pub systolic_bp: Option<f64>,
    pub diastolic_bp: Option<f64>,
    pub oxygen_saturation: Option<f64>,
    pub temperature: Option<f64>,
    pub respiratory_rate: Option<f64>,
    pub blood_glucose: Option<f64>,
    pub pain_level: Option<f64>,
}

impl VitalSigns {
    /// Read a field by name. Absent readings stay absent.
    pub fn get(&self, field: VitalField) -> Option<f64> {
        match field {
            VitalField::HeartRate => self.heart_rate,
            VitalField::SystolicBp => self.systolic_bp,
            VitalField::DiastolicBp => self.diastolic_bp,
            VitalField::OxygenSaturation => self.oxygen_saturation,
            VitalField::Temperature => self.temperature,
            VitalField::RespiratoryRate => self.respiratory_rate,
            VitalField::BloodGlucose => self.blood_glucose,
            VitalField::PainLevel => self.pain_level,
        }
    }

    pub fn is_empty(&self) -> bool {
        VitalField::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// Present readings in declaration order, for snapshot rendering.
    pub fn present(&self) -> Vec<(VitalField, f64)> {
        VitalField::ALL
            .iter()
            .filter_map(|f| self.get(*f).map(|v| (*f, v)))
            .collect()
    }
}
