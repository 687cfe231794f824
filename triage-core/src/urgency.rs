use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::TriageConfig;

/// Mức độ khẩn cấp theo thang SATS.
///
/// Thứ tự khai báo chính là thứ tự ưu tiên: `Red < Orange < ... < Blue`
/// theo `Ord`, nên sắp xếp tăng dần sẽ đưa RED lên đầu hàng đợi.
/// BLUE là giá trị canh gác (không khớp ngưỡng nào), không phải một mức lâm sàng.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyLevel {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
}

impl UrgencyLevel {
    pub const ALL: [UrgencyLevel; 5] = [
        UrgencyLevel::Red,
        UrgencyLevel::Orange,
        UrgencyLevel::Yellow,
        UrgencyLevel::Green,
        UrgencyLevel::Blue,
    ];

    /// Nhãn hiển thị cố định.
    pub fn label(self) -> &'static str {
        match self {
            UrgencyLevel::Red => "Emergency",
            UrgencyLevel::Orange => "Very Urgent",
            UrgencyLevel::Yellow => "Urgent",
            UrgencyLevel::Green => "Routine",
            UrgencyLevel::Blue => "Deceased",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            UrgencyLevel::Red => "RED",
            UrgencyLevel::Orange => "ORANGE",
            UrgencyLevel::Yellow => "YELLOW",
            UrgencyLevel::Green => "GREEN",
            UrgencyLevel::Blue => "BLUE",
        }
    }

    pub fn colour(self) -> &'static str {
        match self {
            UrgencyLevel::Red => "red",
            UrgencyLevel::Orange => "orange",
            UrgencyLevel::Yellow => "yellow",
            UrgencyLevel::Green => "green",
            UrgencyLevel::Blue => "blue",
        }
    }

    /// Hạng ưu tiên, 0 là cao nhất.
    pub fn priority(self) -> u8 {
        self as u8
    }

    /// Đọc mã mức độ, không phân biệt hoa thường (`"red"`, `"RED"`).
    pub fn parse_code(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.code().eq_ignore_ascii_case(trimmed))
    }

    /// Thời gian chờ mục tiêu trước khi được khám. RED là tức thì, BLUE không có mục tiêu.
    pub fn target_wait(self, config: &TriageConfig) -> Option<Duration> {
        let minutes = match self {
            UrgencyLevel::Red => 0,
            UrgencyLevel::Orange => config.orange_target_minutes,
            UrgencyLevel::Yellow => config.yellow_target_minutes,
            UrgencyLevel::Green => config.green_target_minutes,
            UrgencyLevel::Blue => return None,
        };
        Some(Duration::minutes(i64::from(minutes)))
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn red_sorts_before_everything_else() {
        let mut levels = vec![
            UrgencyLevel::Blue,
            UrgencyLevel::Green,
            UrgencyLevel::Red,
            UrgencyLevel::Yellow,
            UrgencyLevel::Orange,
        ];
        levels.sort();
        assert_eq!(levels, UrgencyLevel::ALL.to_vec());
        assert_eq!(UrgencyLevel::Red.priority(), 0);
        assert_eq!(UrgencyLevel::Blue.priority(), 4);
    }

    #[test]
    fn parse_code_is_case_insensitive() {
        assert_eq!(UrgencyLevel::parse_code(" orange "), Some(UrgencyLevel::Orange));
        assert_eq!(UrgencyLevel::parse_code("RED"), Some(UrgencyLevel::Red));
        assert_eq!(UrgencyLevel::parse_code("purple"), None);
    }

    #[test]
    fn serializes_as_upper_case_code() {
        let json = serde_json::to_string(&UrgencyLevel::Yellow).unwrap();
        assert_eq!(json, "\"YELLOW\"");
    }

    #[test]
    fn target_wait_follows_config() {
        let config = TriageConfig {
            yellow_target_minutes: 30,
            ..TriageConfig::default()
        };
        assert_eq!(
            UrgencyLevel::Yellow.target_wait(&config),
            Some(Duration::minutes(30))
        );
        assert_eq!(UrgencyLevel::Red.target_wait(&config), Some(Duration::zero()));
        assert_eq!(UrgencyLevel::Blue.target_wait(&config), None);
    }
}
