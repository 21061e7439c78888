//! Transient views over the host system's patient records.
//!
//! The host framework owns these records and their persistence; the crate
//! only reads the fields it needs and writes back the produced ones
//! (`calendar_event_id`, a forced `Completed` status, `next_dose`,
//! `medicine_progress`). Several fields keep the host's stringly,
//! comma-separated shape on purpose -- they mirror what the record store
//! actually holds.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A patient record with its ordered medicine sub-records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Patient {
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub medicines: Vec<Medicine>,
    /// Percentage of medicines completed, recomputed on every save.
    #[serde(default)]
    pub medicine_progress: u8,
}

/// A medicine sub-record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Medicine {
    #[serde(default)]
    pub medicine_name: String,
    /// "Active", "Stopped", "Completed", "Paused", "Inactive" or empty.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// "Daily", "Weekly", "Monthly" or empty.
    #[serde(default)]
    pub repetitiveness: String,
    /// Number of occurrences; used to derive a missing end date.
    #[serde(default)]
    pub repetition_count: Option<u32>,
    /// Comma-separated "HH:MM" entries, e.g. "09:00,21:00".
    #[serde(default)]
    pub times_per_day: Option<String>,
    /// Next occurrence on or after today, refreshed on save.
    #[serde(default)]
    pub next_dose: Option<NaiveDate>,
    /// Comma-separated remote event identifiers, matched positionally to
    /// the `times_per_day` entries.
    #[serde(default)]
    pub calendar_event_id: Option<String>,
}

impl Medicine {
    /// Parsed view of the raw status string.
    pub fn status_kind(&self) -> MedicineStatus {
        MedicineStatus::parse(&self.status)
    }

    /// Time-of-day entries, trimmed and with blanks dropped.
    pub fn times(&self) -> Vec<String> {
        self.times_per_day.as_deref().map(split_csv).unwrap_or_default()
    }

    /// Stored remote event identifiers, trimmed and with blanks dropped.
    pub fn stored_event_ids(&self) -> Vec<String> {
        self.calendar_event_id
            .as_deref()
            .map(split_csv)
            .unwrap_or_default()
    }
}

/// Lifecycle status of a medicine sub-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MedicineStatus {
    Active,
    Stopped,
    Completed,
    Paused,
    Inactive,
    /// Empty or blank status field.
    Unspecified,
    /// Any other value; left alone by the lifecycle handler.
    Other,
}

impl MedicineStatus {
    /// Parse the host's raw status string.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Active" => Self::Active,
            "Stopped" => Self::Stopped,
            "Completed" => Self::Completed,
            "Paused" => Self::Paused,
            "Inactive" => Self::Inactive,
            "" => Self::Unspecified,
            _ => Self::Other,
        }
    }

    /// Canonical record-store spelling. Empty for [`Self::Unspecified`]
    /// and [`Self::Other`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Stopped => "Stopped",
            Self::Completed => "Completed",
            Self::Paused => "Paused",
            Self::Inactive => "Inactive",
            Self::Unspecified | Self::Other => "",
        }
    }

    /// Whether the status belongs to the inactive set: no calendar events
    /// should exist for this medicine.
    pub fn is_inactive(self) -> bool {
        matches!(
            self,
            Self::Stopped | Self::Completed | Self::Paused | Self::Inactive | Self::Unspecified
        )
    }
}

/// Recurrence frequency of a medicine schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Case-insensitive parse; `None` for anything unrecognized.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }

    /// RRULE frequency code.
    pub fn rrule_code(self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
        }
    }
}

/// Split a comma-separated record field into trimmed, non-empty entries.
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
