//! Bộ phân loại SATS: ngưỡng chỉ số sống và thứ tự đánh giá.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{ClinicalDiscriminator, TriageError, UrgencyLevel, VitalsSnapshot};

/// Kết quả phân loại: mức độ kèm nhãn hiển thị.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub level: UrgencyLevel,
    pub label: String,
}

impl Classification {
    fn of(level: UrgencyLevel) -> Self {
        Self {
            level,
            label: level.label().to_string(),
        }
    }
}

/// Bản ghi phân loại gửi xuống tầng lưu trữ.
///
/// Khi cấp cứu khẩn, `vitals` đã bị thay bằng bộ chỉ số tổng hợp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TriageRecord {
    pub level: UrgencyLevel,
    pub label: String,
    pub vitals: VitalsSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<ClinicalDiscriminator>,
    #[serde(default)]
    pub emergency_override: bool,
}

impl TriageRecord {
    pub fn classification(&self) -> Classification {
        Classification {
            level: self.level,
            label: self.label.clone(),
        }
    }
}

const TIER_ORDER: [UrgencyLevel; 4] = [
    UrgencyLevel::Red,
    UrgencyLevel::Orange,
    UrgencyLevel::Yellow,
    UrgencyLevel::Green,
];

/// Phân loại mức độ khẩn cấp.
///
/// Thứ tự: cấp cứu khẩn hoặc có dấu hiệu phân biệt là RED; sau đó xét lần lượt
/// RED, ORANGE, YELLOW (chỉ cần một chỉ số khớp) rồi GREEN (tất cả phải khớp).
/// Không khớp tầng nào thì trả về BLUE.
///
/// Nhánh cấp cứu khẩn không kiểm tra chỉ số; các nhánh còn lại trả về
/// [`TriageError::ContractViolation`] nếu chỉ số nằm ngoài miền vật lý.
pub fn classify(
    vitals: &VitalsSnapshot,
    discriminator: Option<&ClinicalDiscriminator>,
    emergency_override: bool,
) -> Result<Classification, TriageError> {
    if emergency_override {
        debug!("emergency override, skipping vitals evaluation");
        return Ok(Classification::of(UrgencyLevel::Red));
    }

    vitals.validate()?;

    if let Some(discriminator) = discriminator {
        debug!(discriminator = discriminator.code(), "clinical discriminator present");
        return Ok(Classification::of(UrgencyLevel::Red));
    }

    let level = TIER_ORDER
        .into_iter()
        .find(|tier| tier_matches(*tier, vitals))
        .unwrap_or(UrgencyLevel::Blue);

    if level == UrgencyLevel::Blue {
        warn!(
            heart_rate = vitals.heart_rate_bpm,
            respiratory_rate = vitals.respiratory_rate,
            "vitals matched no SATS tier, falling back to BLUE"
        );
    } else {
        debug!(level = level.code(), "vitals matched SATS tier");
    }

    Ok(Classification::of(level))
}

/// Phân loại và dựng bản ghi; thay chỉ số khi cấp cứu khẩn.
pub fn assess(
    vitals: VitalsSnapshot,
    discriminator: Option<ClinicalDiscriminator>,
    emergency_override: bool,
) -> Result<TriageRecord, TriageError> {
    let Classification { level, label } =
        classify(&vitals, discriminator.as_ref(), emergency_override)?;

    let vitals = if emergency_override {
        VitalsSnapshot::emergency_override()
    } else {
        vitals
    };

    Ok(TriageRecord {
        level,
        label,
        vitals,
        discriminator,
        emergency_override,
    })
}

fn tier_matches(tier: UrgencyLevel, vitals: &VitalsSnapshot) -> bool {
    let rr = vitals.respiratory_rate;
    let hr = vitals.heart_rate_bpm;
    let sbp = vitals.systolic_bp;
    let spo2 = vitals.oxygen_saturation_pct;
    let temp = vitals.temperature_c;

    match tier {
        UrgencyLevel::Red => {
            !(10..=30).contains(&rr)
                || !(40..=130).contains(&hr)
                || sbp < 90
                || spo2 < 90
                || !(35.0..=40.0).contains(&temp)
        }
        UrgencyLevel::Orange => {
            (21..=30).contains(&rr)
                || (111..=130).contains(&hr)
                || (90..=100).contains(&sbp)
                || (90..=94).contains(&spo2)
                || (38.5..=40.0).contains(&temp)
        }
        UrgencyLevel::Yellow => {
            (16..=20).contains(&rr)
                || (91..=110).contains(&hr)
                || (101..=110).contains(&sbp)
                || (95..=96).contains(&spo2)
                || (37.5..38.5).contains(&temp)
        }
        UrgencyLevel::Green => {
            (10..=15).contains(&rr)
                && (51..=90).contains(&hr)
                && sbp > 110
                && spo2 > 96
                && (35.0..37.5).contains(&temp)
        }
        UrgencyLevel::Blue => false,
    }
}
