use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Free-text fields must carry at least this many characters before an
/// entry is accepted.
pub const MIN_TEXT_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Minutes,
    Hours,
}

impl TimeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkTime {
    pub amount: u32,
    pub unit: TimeUnit,
}

impl WorkTime {
    /// All aggregation normalizes to minutes.
    pub fn total_minutes(&self) -> u64 {
        match self.unit {
            TimeUnit::Minutes => u64::from(self.amount),
            TimeUnit::Hours => u64::from(self.amount) * 60,
        }
    }
}

/// One journal record for a project/day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    #[serde(with = "utc_timestamp")]
    pub created_at: DateTime<Utc>,
    pub project: String,
    pub work_time: WorkTime,
    pub gains: String,
    pub challenges: String,
    pub plan: String,
}

impl LogEntry {
    /// Calendar day used by the one-entry-per-project-per-day rule and by
    /// the stats calculator.
    pub fn day(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}

/// Form payload for a new entry; `id` and `createdAt` are assigned by the
/// repository at persistence time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogDraft {
    pub project: String,
    pub work_time: WorkTime,
    pub gains: String,
    pub challenges: String,
    pub plan: String,
}

impl LogDraft {
    /// Full form validation, run before any persistence attempt.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.project.trim().is_empty() {
            return Err(ValidationError::EmptyProject);
        }
        if self.work_time.total_minutes() == 0 {
            return Err(ValidationError::ZeroWorkTime);
        }
        for (field, text) in [
            ("gains", &self.gains),
            ("challenges", &self.challenges),
            ("plan", &self.plan),
        ] {
            if text.chars().count() < MIN_TEXT_CHARS {
                return Err(ValidationError::TextTooShort(field));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MigrationReport {
    pub migrated: usize,
    pub failed: usize,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub project: String,
}

/// Timestamps are interpreted as UTC even when the serialized form omits a
/// zone suffix.
pub mod utc_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(D::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
            return Ok(value.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| format!("invalid timestamp: {raw}"))
    }
}
