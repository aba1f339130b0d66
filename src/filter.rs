// src/filter.rs
//
// Shared status/date predicates for the review workflow and report preview.
// The date selectors are mutually exclusive; the single `set_date_filter`
// entry point owns the clearing rule so call sites cannot drift.
use chrono::{Datelike, Local, NaiveDate};
use tracing::debug;

use crate::model::{EntryStatus, WeeklyTimeEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusChoice {
    #[default]
    All,
    Only(EntryStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePreset {
    #[default]
    All,
    Today,
    ThisWeek,
    ThisMonth,
}

/// A single date-filter assignment. Which fields survive is decided by
/// [`FilterEngine::set_date_filter`], not by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSelector {
    Preset(DatePreset),
    /// A specific calendar day.
    Day(NaiveDate),
    /// A specific month; only the year and month of the date are significant.
    Month(NaiveDate),
    /// A specific calendar year.
    Year(i32),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterEngine {
    status: StatusChoice,
    preset: DatePreset,
    day: Option<NaiveDate>,
    month: Option<NaiveDate>,
    year: Option<i32>,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusChoice {
        self.status
    }

    pub fn preset(&self) -> DatePreset {
        self.preset
    }

    pub fn day(&self) -> Option<NaiveDate> {
        self.day
    }

    pub fn month(&self) -> Option<NaiveDate> {
        self.month
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    /// Changes the status condition. Date fields are never touched by this.
    pub fn set_status(&mut self, status: StatusChoice) {
        self.status = status;
    }

    /// Applies one date selector and the exclusivity rule in one place:
    /// a non-All preset clears all specific selectors; any specific selector
    /// resets the preset to All and clears its two siblings. Last write wins.
    pub fn set_date_filter(&mut self, selector: DateSelector) {
        debug!("Applying date filter selector: {:?}", selector);
        match selector {
            DateSelector::Preset(preset) => {
                self.preset = preset;
                if preset != DatePreset::All {
                    self.day = None;
                    self.month = None;
                    self.year = None;
                }
            }
            DateSelector::Day(date) => {
                self.preset = DatePreset::All;
                self.day = Some(date);
                self.month = None;
                self.year = None;
            }
            DateSelector::Month(date) => {
                self.preset = DatePreset::All;
                self.day = None;
                self.month = Some(date);
                self.year = None;
            }
            DateSelector::Year(year) => {
                self.preset = DatePreset::All;
                self.day = None;
                self.month = None;
                self.year = Some(year);
            }
        }
    }

    /// Resets all five fields to their defaults.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// True iff both the status condition and the active date condition match
    /// the record. Evaluated against the local calendar date.
    pub fn predicate(&self, record: &WeeklyTimeEntry) -> bool {
        self.predicate_at(record, Local::now().date_naive())
    }

    /// Same as [`predicate`](Self::predicate) with an explicit "today",
    /// which keeps the preset conditions testable.
    pub fn predicate_at(&self, record: &WeeklyTimeEntry, today: NaiveDate) -> bool {
        self.status_matches(record.status) && self.date_matches(record.week_start_date, today)
    }

    fn status_matches(&self, status: EntryStatus) -> bool {
        match self.status {
            StatusChoice::All => true,
            StatusChoice::Only(wanted) => status == wanted,
        }
    }

    fn date_matches(&self, date: NaiveDate, today: NaiveDate) -> bool {
        // At most one specific selector can be set; the exclusivity rule in
        // set_date_filter guarantees it.
        if let Some(day) = self.day {
            return date == day;
        }
        if let Some(month) = self.month {
            return date.year() == month.year() && date.month() == month.month();
        }
        if let Some(year) = self.year {
            return date.year() == year;
        }
        match self.preset {
            DatePreset::All => true,
            DatePreset::Today => date == today,
            DatePreset::ThisWeek => date.iso_week() == today.iso_week(),
            DatePreset::ThisMonth => date.year() == today.year() && date.month() == today.month(),
        }
    }
}
