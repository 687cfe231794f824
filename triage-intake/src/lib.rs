//! Nurse-triage form JSON to `TriageRecord` converter, plus queue payload helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use triage_core::{
    assess, order_with_report, prioritize, Avpu, ClinicalDiscriminator, Mobility, OrderedQueue,
    QueueEntry, TriageError, TriageRecord, VitalsSnapshot,
};

/// Errors raised while reading intake payloads.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Could not read JSON: {0}")]
    Parse(String),
    #[error("Missing required field `{0}`")]
    MissingField(&'static str),
    #[error("Field `{field}` is not a valid number: {value}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("Field `{field}` has unsupported value `{value}`")]
    InvalidValue { field: &'static str, value: String },
    #[error(transparent)]
    Triage(#[from] TriageError),
}

/// Result of a completed triage form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntakeOutcome {
    pub record: TriageRecord,
    /// Present when the form carries patient, department and arrival time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_entry: Option<QueueEntry>,
}

/// Process a triage form from a JSON string.
pub fn intake_form_str(form_json: &str) -> Result<IntakeOutcome, IntakeError> {
    let value: Value =
        serde_json::from_str(form_json).map_err(|err| IntakeError::Parse(err.to_string()))?;
    intake_form_value(&value)
}

/// Process a triage form from a `serde_json::Value`.
///
/// With `emergencyOverride` set the vitals block is not read at all and the
/// synthetic override vitals are recorded instead.
pub fn intake_form_value(form: &Value) -> Result<IntakeOutcome, IntakeError> {
    if !form.is_object() {
        return Err(IntakeError::Parse("Expected a JSON object".to_string()));
    }

    let emergency_override = read_flag(form, "emergencyOverride")?;
    let discriminator = parse_discriminator(form)?;

    let vitals = if emergency_override {
        debug!("emergency override requested, vitals block ignored");
        VitalsSnapshot::emergency_override()
    } else {
        let block = form
            .get("vitals")
            .filter(|value| !value.is_null())
            .ok_or(IntakeError::MissingField("vitals"))?;
        parse_vitals(block)?
    };

    let record = assess(vitals, discriminator, emergency_override)?;
    let queue_entry = queue_entry_for(form, &record)?;

    Ok(IntakeOutcome {
        record,
        queue_entry,
    })
}

/// Read a vitals block. Numbers may be JSON numbers or numeric strings.
pub fn parse_vitals(block: &Value) -> Result<VitalsSnapshot, IntakeError> {
    if !block.is_object() {
        return Err(IntakeError::Parse(
            "Expected vitals to be a JSON object".to_string(),
        ));
    }

    Ok(VitalsSnapshot {
        temperature_c: required_real(block, "temperatureC")?,
        heart_rate_bpm: required_int(block, "heartRateBpm")?,
        systolic_bp: required_int(block, "systolicBp")?,
        diastolic_bp: required_int(block, "diastolicBp")?,
        respiratory_rate: required_int(block, "respiratoryRate")?,
        oxygen_saturation_pct: required_int(block, "oxygenSaturationPct")?,
        blood_glucose: optional_real(block, "bloodGlucose")?,
        pain_scale: optional_pain(block)?,
        weight_kg: optional_real(block, "weightKg")?,
        height_cm: optional_real(block, "heightCm")?,
        avpu: optional_code(block, "avpu", parse_avpu)?,
        mobility: optional_code(block, "mobility", parse_mobility)?,
    })
}

/// Read the discriminator selection; `"none"` or an empty value means none.
pub fn parse_discriminator(form: &Value) -> Result<Option<ClinicalDiscriminator>, IntakeError> {
    let Some(code) = text_field(form, "discriminator") else {
        return Ok(None);
    };
    if code.eq_ignore_ascii_case("none") {
        return Ok(None);
    }

    let notes = text_field(form, "discriminatorNotes");
    ClinicalDiscriminator::from_code(&code, notes.as_deref())
        .map(Some)
        .ok_or(IntakeError::InvalidValue {
            field: "discriminator",
            value: code,
        })
}

/// Order a queue given as a JSON array of entries.
pub fn order_queue_str(queue_json: &str) -> Result<OrderedQueue, IntakeError> {
    Ok(order_with_report(parse_queue_str(queue_json)?))
}

/// Re-order one department's queue after promoting the flagged patients.
pub fn prioritize_queue_str<I, S>(
    queue_json: &str,
    department_id: &str,
    critical_ids: I,
) -> Result<OrderedQueue, IntakeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ok(prioritize(
        parse_queue_str(queue_json)?,
        department_id,
        critical_ids,
    ))
}

/// Parse a JSON array of queue entries.
pub fn parse_queue_str(queue_json: &str) -> Result<Vec<QueueEntry>, IntakeError> {
    let value: Value =
        serde_json::from_str(queue_json).map_err(|err| IntakeError::Parse(err.to_string()))?;
    parse_queue_value(value)
}

pub fn parse_queue_value(value: Value) -> Result<Vec<QueueEntry>, IntakeError> {
    if !value.is_array() {
        return Err(IntakeError::Parse(
            "Expected queue to be a JSON array".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|err| IntakeError::Parse(err.to_string()))
}

fn queue_entry_for(form: &Value, record: &TriageRecord) -> Result<Option<QueueEntry>, IntakeError> {
    let (Some(patient_id), Some(department_id), Some(arrival)) = (
        text_field(form, "patientId"),
        text_field(form, "departmentId"),
        text_field(form, "arrivalTimestamp"),
    ) else {
        return Ok(None);
    };

    let arrival = parse_timestamp(&arrival).ok_or(IntakeError::InvalidValue {
        field: "arrivalTimestamp",
        value: arrival,
    })?;

    Ok(Some(QueueEntry::from_record(
        patient_id,
        record,
        arrival,
        department_id,
    )))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn read_flag(form: &Value, field: &'static str) -> Result<bool, IntakeError> {
    match form.get(field) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(Value::String(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "1" => Ok(true),
            "false" | "off" | "0" | "" => Ok(false),
            _ => Err(IntakeError::InvalidValue {
                field,
                value: text.clone(),
            }),
        },
        Some(other) => Err(IntakeError::InvalidValue {
            field,
            value: other.to_string(),
        }),
    }
}

fn text_field(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Numeric value from a number or numeric string. Blank strings count as absent.
fn numeric_field(block: &Value, field: &'static str) -> Result<Option<f64>, IntakeError> {
    let invalid = |value: String| IntakeError::InvalidNumber { field, value };

    match block.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_f64()
            .map(Some)
            .ok_or_else(|| invalid(number.to_string())),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            match trimmed.parse::<f64>() {
                Ok(parsed) if parsed.is_finite() => Ok(Some(parsed)),
                _ => Err(invalid(text.clone())),
            }
        }
        Some(other) => Err(invalid(other.to_string())),
    }
}

fn required_real(block: &Value, field: &'static str) -> Result<f64, IntakeError> {
    numeric_field(block, field)?.ok_or(IntakeError::MissingField(field))
}

fn optional_real(block: &Value, field: &'static str) -> Result<Option<f64>, IntakeError> {
    numeric_field(block, field)
}

fn required_int(block: &Value, field: &'static str) -> Result<i32, IntakeError> {
    let value = required_real(block, field)?;
    as_whole(field, value)
}

fn as_whole(field: &'static str, value: f64) -> Result<i32, IntakeError> {
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(IntakeError::InvalidNumber {
            field,
            value: value.to_string(),
        });
    }
    Ok(value as i32)
}

fn optional_pain(block: &Value) -> Result<Option<u8>, IntakeError> {
    let Some(value) = numeric_field(block, "painScale")? else {
        return Ok(None);
    };
    let whole = as_whole("painScale", value)?;
    u8::try_from(whole)
        .map(Some)
        .map_err(|_| IntakeError::InvalidNumber {
            field: "painScale",
            value: whole.to_string(),
        })
}

fn optional_code<T>(
    block: &Value,
    field: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, IntakeError> {
    let Some(code) = text_field(block, field) else {
        return Ok(None);
    };
    parse(&code)
        .map(Some)
        .ok_or(IntakeError::InvalidValue { field, value: code })
}

fn parse_avpu(code: &str) -> Option<Avpu> {
    match code.to_ascii_uppercase().as_str() {
        "ALERT" | "A" => Some(Avpu::Alert),
        "VERBAL" | "V" => Some(Avpu::Verbal),
        "PAIN" | "P" => Some(Avpu::Pain),
        "UNRESPONSIVE" | "U" => Some(Avpu::Unresponsive),
        _ => None,
    }
}

fn parse_mobility(code: &str) -> Option<Mobility> {
    match code.to_ascii_uppercase().as_str() {
        "WALKING" => Some(Mobility::Walking),
        "WHEELCHAIR" => Some(Mobility::Wheelchair),
        "STRETCHER" => Some(Mobility::Stretcher),
        _ => None,
    }
}
