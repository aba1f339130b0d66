// src/report.rs
//
// Report building: shallow per-week preview rows for the status report modes,
// and the deep timesheet-entries pivot that reshapes weekly records into
// per-employee, per-category tables with day-granular date filtering.
use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use tracing::{debug, info};

use crate::duration::DurationValue;
use crate::model::{EntryStatus, WeeklyTimeEntry, WorkCategory, DAYS_PER_WEEK};

// --- Report Configuration ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum ReportType {
    SubmissionStatus,
    ApprovalStatus,
    DetailedTimesheet,
    #[default]
    TimesheetEntries,
}

/// Record selection for a report run. Start/end bounds are inclusive calendar
/// dates; nothing here ties their ordering, since range validation (ordering,
/// range-too-large) is the caller's concern.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub employee_ids: Option<Vec<String>>,
    pub status_filters: Option<Vec<EntryStatus>>,
    pub report_type: ReportType,
}

impl ReportFilter {
    fn admits_record(&self, record: &WeeklyTimeEntry) -> bool {
        if let Some(ids) = &self.employee_ids {
            if !ids.iter().any(|id| *id == record.employee_id) {
                return false;
            }
        }
        if let Some(statuses) = &self.status_filters {
            if !statuses.contains(&record.status) {
                return false;
            }
        }
        true
    }

    /// Per-individual-day inclusion check for the deep pivot. A day falls out
    /// of the report when it lies outside either inclusive bound, even if
    /// other days of the same week are in range.
    fn admits_day(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start_date {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if date > end {
                return false;
            }
        }
        true
    }
}

// --- Column Specs ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub header: &'static str,
}

pub const PIVOT_COLUMNS: [Column; 4] = [
    Column { key: "date", header: "Date" },
    Column { key: "description", header: "Description" },
    Column { key: "status", header: "Status" },
    Column { key: "quantity", header: "Quantity (hours)" },
];

pub const SUBMISSION_STATUS_COLUMNS: [Column; 4] = [
    Column { key: "employeeName", header: "Employee" },
    Column { key: "employeeEmail", header: "Email" },
    Column { key: "weekStartDate", header: "Week Starting" },
    Column { key: "status", header: "Status" },
];

pub const APPROVAL_STATUS_COLUMNS: [Column; 5] = [
    Column { key: "employeeName", header: "Employee" },
    Column { key: "employeeEmail", header: "Email" },
    Column { key: "weekStartDate", header: "Week Starting" },
    Column { key: "weekEndDate", header: "Week Ending" },
    Column { key: "status", header: "Status" },
];

pub const DETAILED_TIMESHEET_COLUMNS: [Column; 6] = [
    Column { key: "employeeName", header: "Employee" },
    Column { key: "employeeEmail", header: "Email" },
    Column { key: "weekStartDate", header: "Week Starting" },
    Column { key: "weekEndDate", header: "Week Ending" },
    Column { key: "status", header: "Status" },
    Column { key: "totalHours", header: "Total Hours" },
];

/// Fixed column set for a report mode. The deep pivot mode uses the same
/// columns in every sub-table.
pub fn columns_for(report_type: ReportType) -> &'static [Column] {
    match report_type {
        ReportType::SubmissionStatus => &SUBMISSION_STATUS_COLUMNS,
        ReportType::ApprovalStatus => &APPROVAL_STATUS_COLUMNS,
        ReportType::DetailedTimesheet => &DETAILED_TIMESHEET_COLUMNS,
        ReportType::TimesheetEntries => &PIVOT_COLUMNS,
    }
}

// --- Shallow Report Rows ---

/// One already-aggregated preview row for the shallow report modes. The only
/// derived fields are the week end date and the hour total; per-day filtering
/// is the data source's responsibility in these modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShallowRow {
    pub employee_name: String,
    pub employee_email: String,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub status: EntryStatus,
    pub total_hours: Decimal,
}

/// Builds the row list for a shallow mode: week end derivation plus an
/// ascending sort by week start date.
pub fn build_shallow(records: &[WeeklyTimeEntry], filter: &ReportFilter) -> Vec<ShallowRow> {
    let mut rows: Vec<ShallowRow> = records
        .iter()
        .filter(|r| filter.admits_record(r))
        .map(|record| ShallowRow {
            employee_name: record.employee_name.clone(),
            employee_email: record.employee_email.clone(),
            week_start_date: record.week_start_date,
            week_end_date: record.week_end_date(),
            status: record.status,
            total_hours: record_total_hours(record),
        })
        .collect();
    rows.sort_by(|a, b| {
        a.week_start_date
            .cmp(&b.week_start_date)
            .then_with(|| a.employee_name.cmp(&b.employee_name))
            .then_with(|| a.employee_email.cmp(&b.employee_email))
    });
    debug!("Built {} shallow report rows", rows.len());
    rows
}

fn record_total_hours(record: &WeeklyTimeEntry) -> Decimal {
    let mut total = Decimal::ZERO;
    for block in &record.categories {
        for item in &block.items {
            for cell in item.daily_hours.iter().flatten() {
                if *cell > 0.0 {
                    if let Some(hours) = Decimal::from_f64(*cell) {
                        total += hours;
                    }
                }
            }
        }
    }
    total.round_dp(2)
}

// --- Deep Pivot ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotRow {
    pub date: NaiveDate,
    pub description: String,
    pub status: EntryStatus,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubTable {
    pub title: String,
    pub columns: &'static [Column],
    pub rows: Vec<PivotRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeGroup {
    pub employee_key: String,
    pub employee_name: String,
    pub employee_email: String,
    pub sub_tables: Vec<SubTable>,
}

/// The full timesheet-entries pivot: employee groups in first-reference
/// order, each with category sub-tables in first-reference order, plus a
/// flattened globally date-sorted row list for non-grouped views.
#[derive(Debug, Clone, Default)]
pub struct PivotReport {
    pub groups: Vec<EmployeeGroup>,
    pub flattened: Vec<PivotRow>,
}

/// Sub-table title derived from a category/work pair.
pub fn sub_table_title(category: WorkCategory, work: &str) -> String {
    match category {
        WorkCategory::Project => format!("Project: {}", work),
        WorkCategory::Team => format!("Team: {}", work),
        WorkCategory::Other => "Leave".to_string(),
    }
}

/// Builds the deep timesheet-entries pivot.
///
/// For every record, every category item, every day cell: blank or
/// non-positive hour cells are skipped silently (sparse weeks are normal),
/// the filter bounds are applied to each individual calendar day, the
/// description falls back per-day entry -> item description -> "-", and the
/// day status falls back per-day entry -> record status. Rows land in the
/// sub-table keyed by (employee, title), created on first reference.
pub fn build_pivot(records: &[WeeklyTimeEntry], filter: &ReportFilter) -> PivotReport {
    let mut groups: Vec<EmployeeGroup> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();

    for record in records.iter().filter(|r| filter.admits_record(r)) {
        for block in &record.categories {
            for item in &block.items {
                let title = sub_table_title(block.category, &item.work);
                for day_index in 0..DAYS_PER_WEEK {
                    let Some(raw_hours) = item.daily_hours[day_index] else {
                        continue;
                    };
                    if !(raw_hours > 0.0) {
                        continue;
                    }
                    let Some(quantity) = Decimal::from_f64(raw_hours) else {
                        continue;
                    };
                    let date = record.week_start_date + Duration::days(day_index as i64);
                    if !filter.admits_day(date) {
                        continue;
                    }

                    let description = item
                        .daily_descriptions
                        .as_ref()
                        .and_then(|descs| descs[day_index].as_deref())
                        .filter(|d| !d.trim().is_empty())
                        .or(item.description.as_deref())
                        .filter(|d| !d.trim().is_empty())
                        .unwrap_or("-")
                        .to_string();
                    let status = item
                        .daily_status
                        .as_ref()
                        .and_then(|statuses| statuses[day_index])
                        .unwrap_or(record.status);

                    let row = PivotRow {
                        date,
                        description,
                        status,
                        quantity: quantity.round_dp(2),
                    };

                    let group_slot = match group_index.get(&record.employee_key()) {
                        Some(slot) => *slot,
                        None => {
                            groups.push(EmployeeGroup {
                                employee_key: record.employee_key(),
                                employee_name: record.employee_name.clone(),
                                employee_email: record.employee_email.clone(),
                                sub_tables: Vec::new(),
                            });
                            group_index.insert(record.employee_key(), groups.len() - 1);
                            groups.len() - 1
                        }
                    };
                    let group = &mut groups[group_slot];
                    let table_slot =
                        match group.sub_tables.iter().position(|t| t.title == title) {
                            Some(slot) => slot,
                            None => {
                                group.sub_tables.push(SubTable {
                                    title: title.clone(),
                                    columns: &PIVOT_COLUMNS,
                                    rows: Vec::new(),
                                });
                                group.sub_tables.len() - 1
                            }
                        };
                    group.sub_tables[table_slot].rows.push(row);
                }
            }
        }
    }

    let mut flattened: Vec<PivotRow> = Vec::new();
    for group in &mut groups {
        for table in &mut group.sub_tables {
            // Stable sort keeps insertion order for same-date rows.
            table.rows.sort_by_key(|row| row.date);
            flattened.extend(table.rows.iter().cloned());
        }
    }
    flattened.sort_by_key(|row| row.date);

    info!(
        "Built pivot report: {} employee group(s), {} flattened row(s)",
        groups.len(),
        flattened.len()
    );
    PivotReport { groups, flattened }
}

// --- CSV Export ---

/// Renders an hour quantity the way every duration boundary does: through the
/// HH.MM codec. Quantities outside the codec's 0..=24 range fall back to the
/// raw decimal.
fn format_hours(quantity: Decimal) -> String {
    DurationValue::from_decimal(quantity)
        .map(|v| v.to_string())
        .unwrap_or_else(|_| quantity.to_string())
}

/// Writes the deep pivot as CSV, one row per day cell, prefixed with the
/// employee and sub-table the row belongs to.
pub fn write_pivot_csv<W: Write>(report: &PivotReport, writer: W) -> anyhow::Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    let mut header = vec!["Employee", "Email", "Sub-table"];
    header.extend(PIVOT_COLUMNS.iter().map(|c| c.header));
    out.write_record(&header)?;

    for group in &report.groups {
        for table in &group.sub_tables {
            for row in &table.rows {
                out.write_record(&[
                    group.employee_name.clone(),
                    group.employee_email.clone(),
                    table.title.clone(),
                    row.date.format("%Y-%m-%d").to_string(),
                    row.description.clone(),
                    row.status.to_string(),
                    format_hours(row.quantity),
                ])?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Writes shallow report rows as CSV with the mode's column spec as header.
pub fn write_shallow_csv<W: Write>(
    rows: &[ShallowRow],
    report_type: ReportType,
    writer: W,
) -> anyhow::Result<()> {
    let columns = columns_for(report_type);
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(columns.iter().map(|c| c.header))?;

    for row in rows {
        let mut record: Vec<String> = Vec::with_capacity(columns.len());
        for column in columns {
            let value = match column.key {
                "employeeName" => row.employee_name.clone(),
                "employeeEmail" => row.employee_email.clone(),
                "weekStartDate" => row.week_start_date.format("%Y-%m-%d").to_string(),
                "weekEndDate" => row.week_end_date.format("%Y-%m-%d").to_string(),
                "status" => row.status.to_string(),
                "totalHours" => row.total_hours.to_string(),
                _ => String::new(),
            };
            record.push(value);
        }
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}
