// src/approval.rs
//
// Bulk review state machine. A reviewer selects either whole weekly records
// (week mode) or individual day cells (day mode) and applies a status to the
// whole selection. Every status-update call is independent: one failed item
// never aborts the batch, and the refresh signal fires exactly once per batch
// regardless of the outcome mix.
use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{DayIndex, EntryStatus, RecordId, WeeklyTimeEntry, DAYS_PER_WEEK};

// --- External Status-Update Seam ---

/// The external status-update API. Each call may suspend and may fail;
/// failures are caught per item by the engine and recorded in the batch
/// outcome.
#[async_trait]
pub trait StatusUpdater: Send + Sync {
    async fn update_record_status(
        &self,
        record_id: &str,
        status: EntryStatus,
        reason: Option<&str>,
    ) -> anyhow::Result<()>;

    async fn update_day_status(
        &self,
        record_id: &str,
        day_index: DayIndex,
        status: EntryStatus,
        reason: Option<&str>,
    ) -> anyhow::Result<()>;
}

// --- Selection State ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Week,
    Day,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BatchTarget {
    Record(RecordId),
    Day {
        record_id: RecordId,
        day_index: DayIndex,
    },
}

impl fmt::Display for BatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchTarget::Record(id) => write!(f, "record {}", id),
            BatchTarget::Day {
                record_id,
                day_index,
            } => write!(f, "record {} day {}", record_id, day_index),
        }
    }
}

#[derive(Debug)]
pub struct BatchFailure {
    pub target: BatchTarget,
    pub message: String,
}

/// Result of one apply-to-selection batch: which targets transitioned and
/// which individual calls failed. The caller decides how to present it.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub applied: Vec<BatchTarget>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Aggregate notification text for the whole batch.
    pub fn summary(&self) -> String {
        if self.failures.is_empty() {
            format!("{} item(s) updated", self.applied.len())
        } else {
            format!(
                "{} item(s) updated, {} failed ({})",
                self.applied.len(),
                self.failures.len(),
                self.failures
                    .iter()
                    .map(|f| f.target.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApprovalError {
    #[error("a non-empty rejection reason is required")]
    EmptyReason,
    #[error("no rejection prompt is open")]
    NoPromptOpen,
}

/// The reason-entry step of the rejection flow, pre-populated with the number
/// of day cells the rejection will target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionPrompt {
    pub day_count: usize,
}

// --- Engine ---

pub struct SelectionApprovalEngine {
    mode: SelectionMode,
    selected_records: HashSet<RecordId>,
    selected_days: HashSet<(RecordId, DayIndex)>,
    pending_rejection: Option<RejectionPrompt>,
    refresh: Box<dyn Fn() + Send + Sync>,
}

impl SelectionApprovalEngine {
    /// `refresh` is invoked exactly once after each executed batch so the
    /// caller can re-fetch authoritative data.
    pub fn new(refresh: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            mode: SelectionMode::default(),
            selected_records: HashSet::new(),
            selected_days: HashSet::new(),
            pending_rejection: None,
            refresh: Box::new(refresh),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn selected_records(&self) -> &HashSet<RecordId> {
        &self.selected_records
    }

    pub fn selected_days(&self) -> &HashSet<(RecordId, DayIndex)> {
        &self.selected_days
    }

    pub fn is_record_selected(&self, record_id: &str) -> bool {
        self.selected_records.contains(record_id)
    }

    pub fn is_day_selected(&self, record_id: &str, day_index: DayIndex) -> bool {
        self.selected_days
            .contains(&(record_id.to_string(), day_index))
    }

    pub fn pending_rejection(&self) -> Option<&RejectionPrompt> {
        self.pending_rejection.as_ref()
    }

    /// Flips between week and day mode, clearing the selection set of the
    /// mode being deactivated. Any open rejection prompt is dropped too.
    pub fn toggle_selection_mode(&mut self) {
        self.mode = match self.mode {
            SelectionMode::Week => {
                self.selected_records.clear();
                SelectionMode::Day
            }
            SelectionMode::Day => {
                self.selected_days.clear();
                SelectionMode::Week
            }
        };
        self.pending_rejection = None;
        debug!("Selection mode switched to {:?}", self.mode);
    }

    /// Adds or removes a record from the week-mode selection. Ignored with a
    /// warning outside week mode.
    pub fn set_record_selection(&mut self, record_id: &str, selected: bool) {
        if self.mode != SelectionMode::Week {
            warn!(
                "Ignoring record selection for {} while in {:?} mode",
                record_id, self.mode
            );
            return;
        }
        if selected {
            self.selected_records.insert(record_id.to_string());
        } else {
            self.selected_records.remove(record_id);
        }
    }

    /// Adds or removes a (record, day) pair from the day-mode selection.
    /// Ignored with a warning outside day mode or for an out-of-range day.
    pub fn set_day_selection(&mut self, record_id: &str, day_index: DayIndex, selected: bool) {
        if self.mode != SelectionMode::Day {
            warn!(
                "Ignoring day selection for {} day {} while in {:?} mode",
                record_id, day_index, self.mode
            );
            return;
        }
        if day_index >= DAYS_PER_WEEK {
            warn!(
                "Ignoring day selection for {}: day index {} out of range",
                record_id, day_index
            );
            return;
        }
        if selected {
            self.selected_days.insert((record_id.to_string(), day_index));
        } else {
            self.selected_days.remove(&(record_id.to_string(), day_index));
        }
    }

    /// Applies `target_status` to the week-mode selection.
    ///
    /// Targets are the intersection of the selection with `eligible_ids`,
    /// restricted to records whose current status is Pending. One update call
    /// is issued per target; failures are recorded and never abort the batch.
    /// After all calls settle, the refresh callback fires once and the
    /// selection set is cleared.
    pub async fn apply_status_to_selected(
        &mut self,
        updater: &dyn StatusUpdater,
        target_status: EntryStatus,
        eligible_ids: &[RecordId],
        records: &[WeeklyTimeEntry],
    ) -> BatchOutcome {
        let eligible: HashSet<&str> = eligible_ids.iter().map(String::as_str).collect();
        let pending: HashSet<&str> = records
            .iter()
            .filter(|r| r.status == EntryStatus::Pending)
            .map(|r| r.id.as_str())
            .collect();

        let mut targets: Vec<RecordId> = self
            .selected_records
            .iter()
            .filter(|id| eligible.contains(id.as_str()) && pending.contains(id.as_str()))
            .cloned()
            .collect();
        // HashSet iteration order is arbitrary; keep the call order stable.
        targets.sort();

        let mut outcome = BatchOutcome::default();
        for record_id in targets {
            match updater
                .update_record_status(&record_id, target_status, None)
                .await
            {
                Ok(()) => outcome.applied.push(BatchTarget::Record(record_id)),
                Err(e) => {
                    warn!("Status update failed for record {}: {:#}", record_id, e);
                    outcome.failures.push(BatchFailure {
                        target: BatchTarget::Record(record_id),
                        message: format!("{:#}", e),
                    });
                }
            }
        }

        info!(
            "Applied {:?} to week selection: {}",
            target_status,
            outcome.summary()
        );
        (self.refresh)();
        self.selected_records.clear();
        outcome
    }

    /// Applies `target_status` to the day-mode selection with the same
    /// independent-failure semantics as the week-mode batch. A rejection
    /// requires a non-blank reason before any call is issued; if it is
    /// missing, no calls are made and the selection is preserved.
    pub async fn apply_daily_status_to_selected(
        &mut self,
        updater: &dyn StatusUpdater,
        target_status: EntryStatus,
        reason: Option<&str>,
    ) -> Result<BatchOutcome, ApprovalError> {
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        if target_status == EntryStatus::Rejected && reason.is_none() {
            return Err(ApprovalError::EmptyReason);
        }

        let mut targets: Vec<(RecordId, DayIndex)> =
            self.selected_days.iter().cloned().collect();
        targets.sort();

        let mut outcome = BatchOutcome::default();
        for (record_id, day_index) in targets {
            match updater
                .update_day_status(&record_id, day_index, target_status, reason)
                .await
            {
                Ok(()) => outcome.applied.push(BatchTarget::Day {
                    record_id,
                    day_index,
                }),
                Err(e) => {
                    warn!(
                        "Status update failed for record {} day {}: {:#}",
                        record_id, day_index, e
                    );
                    outcome.failures.push(BatchFailure {
                        target: BatchTarget::Day {
                            record_id,
                            day_index,
                        },
                        message: format!("{:#}", e),
                    });
                }
            }
        }

        info!(
            "Applied {:?} to day selection: {}",
            target_status,
            outcome.summary()
        );
        (self.refresh)();
        self.selected_days.clear();
        Ok(outcome)
    }

    /// Opens the reason-entry step of the rejection flow. Returns `None` when
    /// there is nothing to reject (not in day mode, or empty selection).
    pub fn handle_reject_click(&mut self) -> Option<&RejectionPrompt> {
        if self.mode != SelectionMode::Day {
            warn!("Reject clicked outside day mode; ignoring");
            return None;
        }
        if self.selected_days.is_empty() {
            debug!("Reject clicked with empty day selection; ignoring");
            return None;
        }
        self.pending_rejection = Some(RejectionPrompt {
            day_count: self.selected_days.len(),
        });
        self.pending_rejection.as_ref()
    }

    /// Confirms the open rejection prompt. A blank reason keeps the prompt
    /// open and issues no calls; a usable reason closes the prompt and runs
    /// the day-mode rejection batch.
    pub async fn confirm_rejection(
        &mut self,
        updater: &dyn StatusUpdater,
        reason: &str,
    ) -> Result<BatchOutcome, ApprovalError> {
        if self.pending_rejection.is_none() {
            return Err(ApprovalError::NoPromptOpen);
        }
        let trimmed = reason.trim();
        if trimmed.is_empty() {
            return Err(ApprovalError::EmptyReason);
        }
        self.pending_rejection = None;
        self.apply_daily_status_to_selected(updater, EntryStatus::Rejected, Some(trimmed))
            .await
    }

    /// Dismisses the rejection prompt. The selection is untouched and no
    /// update calls are made.
    pub fn cancel_rejection(&mut self) {
        if self.pending_rejection.take().is_some() {
            debug!("Rejection prompt cancelled; selection preserved");
        }
    }
}
