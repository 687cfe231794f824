use serde::{Deserialize, Serialize};

use crate::TriageError;

/// Ảnh chụp chỉ số sống tại thời điểm phân loại.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VitalsSnapshot {
    /// Nhiệt độ (°C).
    pub temperature_c: f64,
    pub heart_rate_bpm: i32,
    pub systolic_bp: i32,
    pub diastolic_bp: i32,
    /// Nhịp thở (lần/phút).
    pub respiratory_rate: i32,
    /// SpO2 (0-100).
    pub oxygen_saturation_pct: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_glucose: Option<f64>,
    /// Thang đau 0-10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pain_scale: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avpu: Option<Avpu>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobility: Option<Mobility>,
}

impl VitalsSnapshot {
    /// Bộ chỉ số tổng hợp thay thế khi kích hoạt cấp cứu khẩn.
    ///
    /// Mọi bên tính lại mức độ từ chỉ số đã lưu đều ra RED.
    pub fn emergency_override() -> Self {
        Self {
            temperature_c: 42.0,
            heart_rate_bpm: 200,
            systolic_bp: 60,
            diastolic_bp: 40,
            respiratory_rate: 40,
            oxygen_saturation_pct: 80,
            blood_glucose: None,
            pain_scale: None,
            weight_kg: None,
            height_cm: None,
            avpu: None,
            mobility: None,
        }
    }

    /// Chỉ số khối cơ thể, khi có đủ cân nặng và chiều cao.
    pub fn bmi(&self) -> Option<f64> {
        let weight = self.weight_kg?;
        let height_m = self.height_cm? / 100.0;
        if weight <= 0.0 || height_m <= 0.0 {
            return None;
        }
        Some(weight / (height_m * height_m))
    }

    /// Kiểm tra miền giá trị vật lý trước khi đánh giá ngưỡng.
    pub fn validate(&self) -> Result<(), TriageError> {
        if !self.temperature_c.is_finite() {
            return Err(violation("temperatureC", "must be a finite number"));
        }
        non_negative("heartRateBpm", self.heart_rate_bpm)?;
        non_negative("systolicBp", self.systolic_bp)?;
        non_negative("diastolicBp", self.diastolic_bp)?;
        non_negative("respiratoryRate", self.respiratory_rate)?;
        if !(0..=100).contains(&self.oxygen_saturation_pct) {
            return Err(violation(
                "oxygenSaturationPct",
                format!("{} is outside 0-100", self.oxygen_saturation_pct),
            ));
        }
        if let Some(pain) = self.pain_scale {
            if pain > 10 {
                return Err(violation("painScale", format!("{pain} is outside 0-10")));
            }
        }
        optional_measure("bloodGlucose", self.blood_glucose)?;
        optional_measure("weightKg", self.weight_kg)?;
        optional_measure("heightCm", self.height_cm)?;
        Ok(())
    }
}

fn violation(field: &'static str, reason: impl Into<String>) -> TriageError {
    TriageError::ContractViolation {
        field,
        reason: reason.into(),
    }
}

fn non_negative(field: &'static str, value: i32) -> Result<(), TriageError> {
    if value < 0 {
        return Err(violation(field, format!("{value} is negative")));
    }
    Ok(())
}

fn optional_measure(field: &'static str, value: Option<f64>) -> Result<(), TriageError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => {
            Err(violation(field, format!("{v} is not a non-negative number")))
        }
        _ => Ok(()),
    }
}

/// Thang ý thức AVPU.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Avpu {
    Alert,
    Verbal,
    Pain,
    Unresponsive,
}

/// Khả năng di chuyển khi đến khoa.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mobility {
    Walking,
    Wheelchair,
    Stretcher,
}

/// Dấu hiệu lâm sàng phân biệt; có bất kỳ dấu hiệu nào là RED ngay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClinicalDiscriminator {
    Airway,
    Breathing,
    Circulation,
    Neurology,
    Seizure,
    Hypoglycaemia,
    MajorTrauma,
    Other { notes: String },
}

impl ClinicalDiscriminator {
    pub fn code(&self) -> &'static str {
        match self {
            ClinicalDiscriminator::Airway => "airway",
            ClinicalDiscriminator::Breathing => "breathing",
            ClinicalDiscriminator::Circulation => "circulation",
            ClinicalDiscriminator::Neurology => "neurology",
            ClinicalDiscriminator::Seizure => "seizure",
            ClinicalDiscriminator::Hypoglycaemia => "hypoglycaemia",
            ClinicalDiscriminator::MajorTrauma => "major_trauma",
            ClinicalDiscriminator::Other { .. } => "other",
        }
    }

    /// Dựng từ mã trên form; `notes` chỉ dùng cho `other`.
    pub fn from_code(code: &str, notes: Option<&str>) -> Option<Self> {
        let discriminator = match code.trim().to_ascii_lowercase().as_str() {
            "airway" => ClinicalDiscriminator::Airway,
            "breathing" => ClinicalDiscriminator::Breathing,
            "circulation" => ClinicalDiscriminator::Circulation,
            "neurology" => ClinicalDiscriminator::Neurology,
            "seizure" => ClinicalDiscriminator::Seizure,
            "hypoglycaemia" => ClinicalDiscriminator::Hypoglycaemia,
            "major_trauma" => ClinicalDiscriminator::MajorTrauma,
            "other" => ClinicalDiscriminator::Other {
                notes: notes.unwrap_or_default().trim().to_string(),
            },
            _ => return None,
        };
        Some(discriminator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline() -> VitalsSnapshot {
        VitalsSnapshot {
            temperature_c: 36.5,
            heart_rate_bpm: 70,
            systolic_bp: 120,
            diastolic_bp: 80,
            respiratory_rate: 12,
            oxygen_saturation_pct: 98,
            blood_glucose: None,
            pain_scale: None,
            weight_kg: None,
            height_cm: None,
            avpu: None,
            mobility: None,
        }
    }

    #[test]
    fn validate_rejects_non_finite_temperature() {
        let vitals = VitalsSnapshot {
            temperature_c: f64::NAN,
            ..baseline()
        };
        assert!(matches!(
            vitals.validate(),
            Err(TriageError::ContractViolation {
                field: "temperatureC",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_saturation_above_hundred() {
        let vitals = VitalsSnapshot {
            oxygen_saturation_pct: 101,
            ..baseline()
        };
        assert!(vitals.validate().is_err());
        assert!(baseline().validate().is_ok());
    }

    #[test]
    fn validate_rejects_pain_above_ten() {
        let vitals = VitalsSnapshot {
            pain_scale: Some(11),
            ..baseline()
        };
        assert!(matches!(
            vitals.validate(),
            Err(TriageError::ContractViolation {
                field: "painScale",
                ..
            })
        ));
    }

    #[test]
    fn bmi_needs_weight_and_height() {
        let mut vitals = baseline();
        assert_eq!(vitals.bmi(), None);
        vitals.weight_kg = Some(80.0);
        vitals.height_cm = Some(200.0);
        assert_eq!(vitals.bmi(), Some(20.0));
    }

    #[test]
    fn discriminator_json_uses_kind_tag() {
        let json = serde_json::to_value(ClinicalDiscriminator::MajorTrauma).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "major_trauma" }));

        let other: ClinicalDiscriminator =
            serde_json::from_value(serde_json::json!({ "kind": "other", "notes": "burns" }))
                .unwrap();
        assert_eq!(
            other,
            ClinicalDiscriminator::Other {
                notes: "burns".to_string()
            }
        );
    }

    #[test]
    fn from_code_reads_form_values() {
        assert_eq!(
            ClinicalDiscriminator::from_code("Seizure", None),
            Some(ClinicalDiscriminator::Seizure)
        );
        assert_eq!(ClinicalDiscriminator::from_code("none", None), None);
        assert_eq!(
            ClinicalDiscriminator::from_code("other", Some(" chest pain ")),
            Some(ClinicalDiscriminator::Other {
                notes: "chest pain".to_string()
            })
        );
    }

    #[test]
    fn vitals_use_camel_case_fields() {
        let value = serde_json::to_value(baseline()).unwrap();
        assert_eq!(value["temperatureC"], serde_json::json!(36.5));
        assert_eq!(value["oxygenSaturationPct"], serde_json::json!(98));
        assert!(value.get("painScale").is_none());
    }
}
