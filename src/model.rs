// src/model.rs
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::info;

// --- Core Record Types ---

pub type RecordId = String;
/// Day offset within a week: 0 = week start (conventionally Monday), 6 = last day.
pub type DayIndex = usize;

pub const DAYS_PER_WEEK: usize = 7;

/// Review status of a weekly record (or of a single day, where day-level
/// statuses are tracked).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum, Default,
)]
pub enum EntryStatus {
    Draft,
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryStatus::Draft => "Draft",
            EntryStatus::Pending => "Pending",
            EntryStatus::Approved => "Approved",
            EntryStatus::Rejected => "Rejected",
        };
        write!(f, "{}", label)
    }
}

/// The closed set of work categories a weekly record is partitioned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkCategory {
    Project,
    Team,
    Other,
}

/// One line of work within a category: a label plus per-day hour cells.
/// The per-day arrays are always 7 wide; a `None` cell means "nothing
/// reported that day" and is expected for sparse weeks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub work: String,
    #[serde(default)]
    pub description: Option<String>,
    pub daily_hours: [Option<f64>; DAYS_PER_WEEK],
    #[serde(default)]
    pub daily_descriptions: Option<[Option<String>; DAYS_PER_WEEK]>,
    #[serde(default)]
    pub daily_status: Option<[Option<EntryStatus>; DAYS_PER_WEEK]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBlock {
    pub category: WorkCategory,
    pub items: Vec<WorkItem>,
}

/// One employee's record for a calendar week, as supplied by the record
/// source. Instances are read-only inputs here; status changes go through
/// the external status-update API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTimeEntry {
    pub id: RecordId,
    pub employee_id: String,
    pub employee_name: String,
    pub employee_email: String,
    pub week_start_date: NaiveDate,
    pub status: EntryStatus,
    #[serde(default)]
    pub categories: Vec<CategoryBlock>,
}

impl WeeklyTimeEntry {
    /// Last calendar day of the week covered by this record.
    pub fn week_end_date(&self) -> NaiveDate {
        self.week_start_date + Duration::days((DAYS_PER_WEEK - 1) as i64)
    }

    /// Calendar date of a day cell. `None` if the index is out of the 0..=6 range.
    pub fn date_for_day(&self, day_index: DayIndex) -> Option<NaiveDate> {
        if day_index >= DAYS_PER_WEEK {
            return None;
        }
        Some(self.week_start_date + Duration::days(day_index as i64))
    }

    /// Stable grouping key for reports: `employeeName|employeeEmail`.
    pub fn employee_key(&self) -> String {
        format!("{}|{}", self.employee_name, self.employee_email)
    }
}

// --- Record Source Loading ---

#[derive(Error, Debug)]
pub enum RecordSourceError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads a JSON array of weekly time entries from any reader.
pub fn load_entries<R: Read>(reader: R) -> Result<Vec<WeeklyTimeEntry>, RecordSourceError> {
    let entries: Vec<WeeklyTimeEntry> = serde_json::from_reader(reader)?;
    Ok(entries)
}

/// Reads a JSON array of weekly time entries from a file on disk.
pub fn load_entries_from_path(path: &Path) -> Result<Vec<WeeklyTimeEntry>, RecordSourceError> {
    let file = File::open(path)?;
    let entries = load_entries(BufReader::new(file))?;
    info!(
        "Loaded {} weekly time entries from {}",
        entries.len(),
        path.display()
    );
    Ok(entries)
}
