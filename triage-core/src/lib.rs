//! Logic lõi phân loại cấp cứu SATS và thứ tự phục vụ hàng đợi.

mod classifier;
mod queue;
mod urgency;
mod vitals;

use serde::{Deserialize, Serialize};

pub use classifier::{assess, classify, Classification, TriageRecord};
pub use queue::{
    next_waiting, order, order_with_report, prioritize, DataQualityIssue, IssueKind, LevelCount,
    OrderedQueue, QueueEntry, QueueStatus, QueueSummary,
};
pub use urgency::UrgencyLevel;
pub use vitals::{Avpu, ClinicalDiscriminator, Mobility, VitalsSnapshot};

/// Cấu hình thời gian chờ mục tiêu theo từng mức ưu tiên (phút).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TriageConfig {
    /// Thời gian tối đa trước khi bệnh nhân ORANGE được khám.
    pub orange_target_minutes: u32,
    /// Thời gian tối đa trước khi bệnh nhân YELLOW được khám.
    pub yellow_target_minutes: u32,
    /// Thời gian tối đa trước khi bệnh nhân GREEN được khám.
    pub green_target_minutes: u32,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            orange_target_minutes: 10,
            yellow_target_minutes: 60,
            green_target_minutes: 240,
        }
    }
}

/// Lỗi chung của lõi phân loại.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TriageError {
    #[error("Chỉ số sống không hợp lệ ({field}): {reason}")]
    ContractViolation { field: &'static str, reason: String },
    #[error("Không thể chuyển trạng thái hàng đợi từ {from} sang {to}")]
    InvalidTransition { from: QueueStatus, to: QueueStatus },
}
