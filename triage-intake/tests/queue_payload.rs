use std::fs;

use triage_core::{IssueKind, QueueStatus, UrgencyLevel};
use triage_intake::{order_queue_str, prioritize_queue_str, IntakeError};

fn queue_fixture() -> String {
    fs::read_to_string(format!(
        "{}/tests/data/emergency_department_queue.json",
        env!("CARGO_MANIFEST_DIR")
    ))
    .expect("Không đọc được hàng đợi mẫu")
}

fn ids(queue: &triage_core::OrderedQueue) -> Vec<&str> {
    queue
        .entries
        .iter()
        .map(|entry| entry.patient_id.as_str())
        .collect()
}

#[test]
fn queue_is_served_by_urgency_then_arrival() {
    let ordered = order_queue_str(&queue_fixture()).expect("Không sắp xếp được hàng đợi");

    assert_eq!(ids(&ordered), vec!["C", "B", "A", "E", "D"]);
    assert_eq!(ordered.issues.len(), 1);
    assert_eq!(ordered.issues[0].patient_id, "D");
    assert_eq!(ordered.issues[0].kind, IssueKind::MissingUrgencyLevel);
    assert_eq!(ordered.entries[4].status(), QueueStatus::Waiting);
}

#[test]
fn reordering_serialized_output_is_stable() {
    let ordered = order_queue_str(&queue_fixture()).unwrap();
    let json = serde_json::to_string(&ordered.entries).unwrap();
    let again = order_queue_str(&json).unwrap();

    assert_eq!(again.entries, ordered.entries);
}

#[test]
fn prioritize_promotes_and_filters_department() {
    let report = prioritize_queue_str(&queue_fixture(), "emergency", ["A"]).unwrap();

    assert_eq!(ids(&report), vec!["A", "C", "B", "D"]);
    assert_eq!(report.entries[0].urgency_level(), Some(UrgencyLevel::Red));
}

#[test]
fn queue_must_be_an_array() {
    let err = order_queue_str(r#"{ "patientId": "A" }"#).unwrap_err();
    assert!(matches!(err, IntakeError::Parse(_)));
}
