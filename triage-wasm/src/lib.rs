//! Bridge WASM <-> JavaScript cho màn hình phân loại và hàng đợi.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use triage_core::{order_with_report, prioritize, QueueEntry, QueueSummary, TriageConfig};
use triage_intake::IntakeError;
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsTriageConfig {
    #[serde(default)]
    orange_target_minutes: Option<u32>,
    #[serde(default)]
    yellow_target_minutes: Option<u32>,
    #[serde(default)]
    green_target_minutes: Option<u32>,
}

impl From<JsTriageConfig> for TriageConfig {
    fn from(cfg: JsTriageConfig) -> Self {
        let mut base = TriageConfig::default();
        if let Some(minutes) = cfg.orange_target_minutes {
            base.orange_target_minutes = minutes;
        }
        if let Some(minutes) = cfg.yellow_target_minutes {
            base.yellow_target_minutes = minutes;
        }
        if let Some(minutes) = cfg.green_target_minutes {
            base.green_target_minutes = minutes;
        }
        base
    }
}

/// Phân loại form triage do điều dưỡng gửi lên.
#[wasm_bindgen]
pub fn classify_vitals(form: JsValue) -> Result<JsValue, JsValue> {
    install_panic_hook();

    let form_value = from_value::<serde_json::Value>(form)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được form triage: {err}")))?;

    let outcome = triage_intake::intake_form_value(&form_value)
        .map_err(|err| JsValue::from_str(&format_intake_error(err)))?;

    to_value(&outcome).map_err(|err| JsValue::from_str(&format!("Không serialize kết quả: {err}")))
}

/// Sắp xếp hàng đợi, trả về `{ entries, issues }`.
#[wasm_bindgen]
pub fn order_queue(entries: JsValue) -> Result<JsValue, JsValue> {
    install_panic_hook();

    let entries = read_entries(entries)?;
    to_value(&order_with_report(entries))
        .map_err(|err| JsValue::from_str(&format!("Không serialize hàng đợi: {err}")))
}

/// Nâng các bệnh nhân nguy kịch lên RED rồi sắp lại hàng đợi của khoa.
#[wasm_bindgen]
pub fn prioritize_queue(
    entries: JsValue,
    department_id: &str,
    critical_ids: Vec<String>,
) -> Result<JsValue, JsValue> {
    install_panic_hook();

    let entries = read_entries(entries)?;
    to_value(&prioritize(entries, department_id, critical_ids))
        .map_err(|err| JsValue::from_str(&format!("Không serialize hàng đợi: {err}")))
}

/// Tổng hợp hàng đợi tại thời điểm `now` (chuỗi RFC 3339).
#[wasm_bindgen]
pub fn queue_summary(
    entries: JsValue,
    now: &str,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    install_panic_hook();

    let entries = read_entries(entries)?;
    let now = DateTime::parse_from_rfc3339(now)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| JsValue::from_str(&format!("Thời điểm không hợp lệ: {err}")))?;

    let cfg = match config {
        Some(js_cfg) => {
            let cfg: JsTriageConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            TriageConfig::from(cfg)
        }
        None => TriageConfig::default(),
    };

    to_value(&QueueSummary::from_entries(&entries, now, &cfg))
        .map_err(|err| JsValue::from_str(&format!("Không serialize tổng hợp: {err}")))
}

fn read_entries(entries: JsValue) -> Result<Vec<QueueEntry>, JsValue> {
    from_value::<Vec<QueueEntry>>(entries)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được hàng đợi: {err}")))
}

fn install_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn format_intake_error(err: IntakeError) -> String {
    format!("Triage error: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_config_overrides_only_given_fields() {
        let cfg = TriageConfig::from(JsTriageConfig {
            orange_target_minutes: None,
            yellow_target_minutes: Some(45),
            green_target_minutes: None,
        });
        assert_eq!(cfg.orange_target_minutes, 10);
        assert_eq!(cfg.yellow_target_minutes, 45);
        assert_eq!(cfg.green_target_minutes, 240);
    }

    #[test]
    fn intake_errors_are_prefixed() {
        let message = format_intake_error(IntakeError::MissingField("vitals"));
        assert_eq!(message, "Triage error: Missing required field `vitals`");
    }
}
