use serde_json::json;
use triage_core::{ClinicalDiscriminator, TriageError, UrgencyLevel};
use triage_intake::{intake_form_str, intake_form_value, IntakeError};

fn vitals() -> serde_json::Value {
    json!({
        "temperatureC": 36.5,
        "heartRateBpm": 70,
        "systolicBp": 120,
        "diastolicBp": 80,
        "respiratoryRate": 12,
        "oxygenSaturationPct": 98
    })
}

#[test]
fn missing_required_vital_is_reported_by_name() {
    let mut block = vitals();
    block.as_object_mut().unwrap().remove("systolicBp");

    let err = intake_form_value(&json!({ "vitals": block })).unwrap_err();
    assert!(matches!(err, IntakeError::MissingField("systolicBp")));
}

#[test]
fn blank_required_vital_counts_as_missing() {
    let mut block = vitals();
    block["respiratoryRate"] = json!("  ");

    let err = intake_form_value(&json!({ "vitals": block })).unwrap_err();
    assert!(matches!(err, IntakeError::MissingField("respiratoryRate")));
}

#[test]
fn non_numeric_vital_fails_fast() {
    let mut block = vitals();
    block["heartRateBpm"] = json!("seventy");

    let err = intake_form_value(&json!({ "vitals": block })).unwrap_err();
    assert!(matches!(
        err,
        IntakeError::InvalidNumber {
            field: "heartRateBpm",
            ..
        }
    ));
}

#[test]
fn fractional_integer_vital_is_rejected() {
    let mut block = vitals();
    block["oxygenSaturationPct"] = json!(97.5);

    let err = intake_form_value(&json!({ "vitals": block })).unwrap_err();
    assert!(matches!(
        err,
        IntakeError::InvalidNumber {
            field: "oxygenSaturationPct",
            ..
        }
    ));
}

#[test]
fn out_of_domain_vital_surfaces_core_error() {
    let mut block = vitals();
    block["oxygenSaturationPct"] = json!(140);

    let err = intake_form_value(&json!({ "vitals": block })).unwrap_err();
    assert!(matches!(
        err,
        IntakeError::Triage(TriageError::ContractViolation {
            field: "oxygenSaturationPct",
            ..
        })
    ));
}

#[test]
fn missing_vitals_block_without_override_is_an_error() {
    let err = intake_form_value(&json!({ "patientId": "P-1" })).unwrap_err();
    assert!(matches!(err, IntakeError::MissingField("vitals")));
}

#[test]
fn override_flag_accepts_form_strings() {
    let outcome = intake_form_value(&json!({ "emergencyOverride": "on" })).unwrap();
    assert_eq!(outcome.record.level, UrgencyLevel::Red);
    assert_eq!(outcome.record.vitals.heart_rate_bpm, 200);
    assert!(outcome.queue_entry.is_none());
}

#[test]
fn discriminator_short_circuits_to_red() {
    let outcome = intake_form_value(&json!({
        "discriminator": "other",
        "discriminatorNotes": "suspected stroke",
        "vitals": vitals()
    }))
    .unwrap();

    assert_eq!(outcome.record.level, UrgencyLevel::Red);
    assert_eq!(
        outcome.record.discriminator,
        Some(ClinicalDiscriminator::Other {
            notes: "suspected stroke".to_string()
        })
    );
    assert_eq!(outcome.record.vitals.temperature_c, 36.5);
}

#[test]
fn unknown_discriminator_is_rejected() {
    let err = intake_form_value(&json!({
        "discriminator": "headache",
        "vitals": vitals()
    }))
    .unwrap_err();
    assert!(matches!(
        err,
        IntakeError::InvalidValue {
            field: "discriminator",
            ..
        }
    ));
}

#[test]
fn invalid_avpu_is_rejected() {
    let mut block = vitals();
    block["avpu"] = json!("SLEEPY");

    let err = intake_form_value(&json!({ "vitals": block })).unwrap_err();
    assert!(matches!(err, IntakeError::InvalidValue { field: "avpu", .. }));
}

#[test]
fn bad_arrival_timestamp_is_rejected() {
    let err = intake_form_value(&json!({
        "patientId": "P-9",
        "departmentId": "emergency",
        "arrivalTimestamp": "yesterday",
        "vitals": vitals()
    }))
    .unwrap_err();
    assert!(matches!(
        err,
        IntakeError::InvalidValue {
            field: "arrivalTimestamp",
            ..
        }
    ));
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(matches!(
        intake_form_str("{ not json"),
        Err(IntakeError::Parse(_))
    ));
}
