//! Lookup codes for pollution severity and application workflow state.
//!
//! # Responsibility
//! - Model the string-coded lookup tables as closed enums.
//! - Carry the seed metadata (`name`, `comment`) written at bootstrap.
//!
//! # Invariants
//! - `as_str` values are the primary keys stored in lookup tables.
//! - Parsing accepts exactly those codes (case-insensitive, trimmed).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Severity of soiling attached to an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PollutionLevel {
    Low,
    Medium,
    High,
}

impl PollutionLevel {
    /// Every level in seed order.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Stable code stored in `PollutionStatus.code`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    /// Parses a stored or user-entered code.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            _ => None,
        }
    }

    /// Seeded display name.
    pub fn seed_name(self) -> &'static str {
        match self {
            Self::Low => "Небольшое",
            Self::Medium => "Обычное",
            Self::High => "Сильное",
        }
    }

    /// Seeded comment.
    pub fn seed_comment(self) -> &'static str {
        match self {
            Self::Low => "Легкое загрязнение",
            Self::Medium => "Среднее/Обычное загрязнение",
            Self::High => "Сильное загрязнение",
        }
    }
}

/// Workflow state of an application.
///
/// Transitions are not restricted: any state may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatusCode {
    InProgress,
    Completed,
    Cancelled,
}

impl ApplicationStatusCode {
    /// Every status in seed order.
    pub const ALL: [Self; 3] = [Self::InProgress, Self::Completed, Self::Cancelled];

    /// Stable code stored in `ApplicationStatus.code`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a stored or user-entered code.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "IN_PROGRESS" => Some(Self::InProgress),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Seeded display name.
    pub fn seed_name(self) -> &'static str {
        match self {
            Self::InProgress => "В обработке",
            Self::Completed => "Ожидание",
            Self::Cancelled => "Отмена",
        }
    }

    /// Seeded comment.
    pub fn seed_comment(self) -> &'static str {
        match self {
            Self::InProgress => "Заявка в работе",
            Self::Completed => "Заявка ожидает оплаты",
            Self::Cancelled => "Заявка отклонена",
        }
    }
}

impl Display for PollutionLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for ApplicationStatusCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input did not match any known lookup code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCodeError {
    pub lookup: &'static str,
    pub value: String,
}

impl Display for UnknownCodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} code `{}`", self.lookup, self.value)
    }
}

impl Error for UnknownCodeError {}

impl FromStr for PollutionLevel {
    type Err = UnknownCodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| UnknownCodeError {
            lookup: "pollution status",
            value: value.to_string(),
        })
    }
}

impl FromStr for ApplicationStatusCode {
    type Err = UnknownCodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| UnknownCodeError {
            lookup: "application status",
            value: value.to_string(),
        })
    }
}

/// Row of the `PollutionStatus` lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollutionStatus {
    pub code: PollutionLevel,
    pub name: String,
    pub comment: Option<String>,
}

/// Row of the `ApplicationStatus` lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationStatus {
    pub code: ApplicationStatusCode,
    pub name: String,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{ApplicationStatusCode, PollutionLevel};

    #[test]
    fn codes_parse_back_from_their_storage_form() {
        for level in PollutionLevel::ALL {
            assert_eq!(PollutionLevel::parse(level.as_str()), Some(level));
        }
        for status in ApplicationStatusCode::ALL {
            assert_eq!(ApplicationStatusCode::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn parse_is_case_insensitive_and_trims() {
        assert_eq!(PollutionLevel::parse(" medium "), Some(PollutionLevel::Medium));
        assert_eq!(
            "in_progress".parse::<ApplicationStatusCode>().unwrap(),
            ApplicationStatusCode::InProgress
        );
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert_eq!(PollutionLevel::parse("EXTREME"), None);
        let err = "DONE".parse::<ApplicationStatusCode>().unwrap_err();
        assert!(err.to_string().contains("application status"));
    }
}
