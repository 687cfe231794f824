//! Chính sách thứ tự phục vụ hàng đợi theo mức độ khẩn cấp.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::{TriageConfig, TriageError, TriageRecord, UrgencyLevel};

/// Hạng của mục thiếu mức độ: sau cả BLUE.
const UNCLASSIFIED_RANK: u8 = UrgencyLevel::Blue as u8 + 1;

/// Trạng thái của một mục trong hàng đợi.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueStatus {
    #[default]
    Waiting,
    InProgress,
    Completed,
}

impl QueueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            QueueStatus::Waiting => "WAITING",
            QueueStatus::InProgress => "IN_PROGRESS",
            QueueStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Một bệnh nhân trong hàng đợi của khoa.
///
/// `urgency_level` rỗng khi dữ liệu nguồn thiếu hoặc mang mã lạ; mục đó vẫn
/// được giữ lại và xếp cuối.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub patient_id: String,
    #[serde(default, deserialize_with = "lenient_level")]
    urgency_level: Option<UrgencyLevel>,
    pub arrival_timestamp: DateTime<Utc>,
    pub department_id: String,
    #[serde(default)]
    status: QueueStatus,
}

impl QueueEntry {
    /// Mục mới ở trạng thái WAITING.
    pub fn new(
        patient_id: impl Into<String>,
        urgency_level: Option<UrgencyLevel>,
        arrival_timestamp: DateTime<Utc>,
        department_id: impl Into<String>,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            urgency_level,
            arrival_timestamp,
            department_id: department_id.into(),
            status: QueueStatus::Waiting,
        }
    }

    /// Tạo mục từ bản ghi phân loại vừa hoàn tất.
    pub fn from_record(
        patient_id: impl Into<String>,
        record: &TriageRecord,
        arrival_timestamp: DateTime<Utc>,
        department_id: impl Into<String>,
    ) -> Self {
        Self::new(
            patient_id,
            Some(record.level),
            arrival_timestamp,
            department_id,
        )
    }

    pub fn urgency_level(&self) -> Option<UrgencyLevel> {
        self.urgency_level
    }

    pub fn status(&self) -> QueueStatus {
        self.status
    }

    /// WAITING -> IN_PROGRESS khi bệnh nhân được gọi.
    pub fn start(&mut self) -> Result<(), TriageError> {
        self.transition(QueueStatus::Waiting, QueueStatus::InProgress)
    }

    /// IN_PROGRESS -> COMPLETED.
    pub fn complete(&mut self) -> Result<(), TriageError> {
        self.transition(QueueStatus::InProgress, QueueStatus::Completed)
    }

    fn transition(&mut self, expected: QueueStatus, next: QueueStatus) -> Result<(), TriageError> {
        if self.status != expected {
            warn!(
                patient_id = %self.patient_id,
                from = self.status.as_str(),
                to = next.as_str(),
                "rejected queue status transition"
            );
            return Err(TriageError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    pub fn waiting_time(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.arrival_timestamp)
    }

    /// Đang chờ quá thời gian mục tiêu của mức độ.
    pub fn is_overdue(&self, now: DateTime<Utc>, config: &TriageConfig) -> bool {
        if self.status != QueueStatus::Waiting {
            return false;
        }
        let Some(target) = self.urgency_level.and_then(|level| level.target_wait(config)) else {
            return false;
        };
        self.waiting_time(now) > target
    }

    fn rank(&self) -> u8 {
        self.urgency_level.map_or(UNCLASSIFIED_RANK, UrgencyLevel::priority)
    }
}

fn lenient_level<'de, D>(deserializer: D) -> Result<Option<UrgencyLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLevel {
        Code(String),
        Other(IgnoredAny),
    }

    Ok(match Option::<RawLevel>::deserialize(deserializer)? {
        Some(RawLevel::Code(code)) => UrgencyLevel::parse_code(&code),
        Some(RawLevel::Other(_)) | None => None,
    })
}

/// Loại lỗi chất lượng dữ liệu phát hiện khi sắp xếp.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingUrgencyLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DataQualityIssue {
    pub patient_id: String,
    pub kind: IssueKind,
}

/// Hàng đợi đã sắp xếp kèm danh sách lỗi dữ liệu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OrderedQueue {
    pub entries: Vec<QueueEntry>,
    pub issues: Vec<DataQualityIssue>,
}

/// Thứ tự phục vụ: mức độ (RED trước) rồi giờ đến (sớm trước).
///
/// Sắp xếp ổn định nên `order(order(x)) == order(x)`.
pub fn order(entries: Vec<QueueEntry>) -> Vec<QueueEntry> {
    order_with_report(entries).entries
}

/// Như [`order`], đồng thời báo các mục thiếu mức độ.
pub fn order_with_report(mut entries: Vec<QueueEntry>) -> OrderedQueue {
    entries.sort_by(|a, b| {
        a.rank()
            .cmp(&b.rank())
            .then_with(|| a.arrival_timestamp.cmp(&b.arrival_timestamp))
    });

    let issues = entries
        .iter()
        .filter(|entry| entry.urgency_level.is_none())
        .map(|entry| {
            warn!(patient_id = %entry.patient_id, "queue entry has no urgency level");
            DataQualityIssue {
                patient_id: entry.patient_id.clone(),
                kind: IssueKind::MissingUrgencyLevel,
            }
        })
        .collect();

    OrderedQueue { entries, issues }
}

/// Sắp lại hàng đợi của một khoa sau khi nâng các mục được đánh dấu nguy kịch lên RED.
///
/// Mục đã COMPLETED không bị thay đổi.
pub fn prioritize<I, S>(
    entries: Vec<QueueEntry>,
    department_id: &str,
    critical_ids: I,
) -> OrderedQueue
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let critical: HashSet<String> = critical_ids
        .into_iter()
        .map(|id| id.as_ref().to_string())
        .collect();

    let department: Vec<QueueEntry> = entries
        .into_iter()
        .filter(|entry| entry.department_id == department_id)
        .map(|mut entry| {
            if critical.contains(&entry.patient_id)
                && entry.status != QueueStatus::Completed
                && entry.urgency_level != Some(UrgencyLevel::Red)
            {
                info!(patient_id = %entry.patient_id, department_id, "promoting entry to RED");
                entry.urgency_level = Some(UrgencyLevel::Red);
            }
            entry
        })
        .collect();

    order_with_report(department)
}

/// Mục WAITING sẽ được gọi tiếp theo.
pub fn next_waiting(entries: &[QueueEntry]) -> Option<&QueueEntry> {
    entries
        .iter()
        .filter(|entry| entry.status == QueueStatus::Waiting)
        .min_by(|a, b| {
            a.rank()
                .cmp(&b.rank())
                .then_with(|| a.arrival_timestamp.cmp(&b.arrival_timestamp))
        })
}

/// Số bệnh nhân đang chờ ở một mức độ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelCount {
    pub level: UrgencyLevel,
    pub waiting: usize,
}

/// Tổng hợp hàng đợi cho bảng điều khiển.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueueSummary {
    pub waiting_by_level: Vec<LevelCount>,
    pub unclassified_waiting: usize,
    pub in_progress: usize,
    pub completed: usize,
    /// Bệnh nhân đang chờ quá thời gian mục tiêu, theo thứ tự phục vụ.
    pub overdue: Vec<String>,
    pub longest_wait_minutes: Option<i64>,
}

impl QueueSummary {
    pub fn from_entries(entries: &[QueueEntry], now: DateTime<Utc>, config: &TriageConfig) -> Self {
        let waiting: Vec<&QueueEntry> = entries
            .iter()
            .filter(|entry| entry.status == QueueStatus::Waiting)
            .collect();

        let waiting_by_level = UrgencyLevel::ALL
            .into_iter()
            .map(|level| LevelCount {
                level,
                waiting: waiting
                    .iter()
                    .filter(|entry| entry.urgency_level == Some(level))
                    .count(),
            })
            .collect();

        let overdue = order(waiting.iter().map(|entry| (*entry).clone()).collect())
            .into_iter()
            .filter(|entry| entry.is_overdue(now, config))
            .map(|entry| entry.patient_id)
            .collect();

        Self {
            waiting_by_level,
            unclassified_waiting: waiting
                .iter()
                .filter(|entry| entry.urgency_level.is_none())
                .count(),
            in_progress: count_status(entries, QueueStatus::InProgress),
            completed: count_status(entries, QueueStatus::Completed),
            overdue,
            longest_wait_minutes: waiting
                .iter()
                .map(|entry| entry.waiting_time(now).num_minutes())
                .max(),
        }
    }
}

fn count_status(entries: &[QueueEntry], status: QueueStatus) -> usize {
    entries.iter().filter(|entry| entry.status == status).count()
}
