// src/main.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use timetrack_core::approval::{SelectionApprovalEngine, StatusUpdater};
use timetrack_core::duration::DurationValue;
use timetrack_core::model::{self, DayIndex, EntryStatus};
use timetrack_core::report::{
    build_pivot, build_shallow, write_pivot_csv, write_shallow_csv, ReportFilter, ReportType,
};

/// Widest date range a single report run will accept; anything larger is a
/// caller mistake rather than a real report.
const MAX_REPORT_RANGE_DAYS: i64 = 366;

#[derive(Parser)]
#[command(
    name = "timetrack",
    about = "Builds time-tracking reports from a JSON snapshot of weekly entries"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a report from a JSON array of weekly time entries.
    Report {
        /// Path to the JSON snapshot of weekly time entries.
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = ReportType::TimesheetEntries)]
        report_type: ReportType,
        /// Inclusive start of the date range (YYYY-MM-DD).
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// Inclusive end of the date range (YYYY-MM-DD).
        #[arg(long)]
        end_date: Option<NaiveDate>,
        /// Restrict to these employee ids (repeatable).
        #[arg(long = "employee")]
        employee_ids: Vec<String>,
        /// Restrict to these record statuses (repeatable).
        #[arg(long = "status")]
        status_filters: Vec<EntryStatus>,
        /// CSV output path; stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run a bulk status update over a set of records (dry run: updates are
    /// logged, not sent anywhere).
    Approve {
        #[arg(long)]
        input: PathBuf,
        /// Record ids to select (repeatable).
        #[arg(long = "id", required = true)]
        ids: Vec<String>,
        #[arg(long, value_enum, default_value_t = EntryStatus::Approved)]
        target: EntryStatus,
    },
    /// Parse and normalize a duration display string.
    Duration { value: String },
}

/// Updater used by the CLI dry run: every call succeeds and is logged.
struct LoggingUpdater;

#[async_trait]
impl StatusUpdater for LoggingUpdater {
    async fn update_record_status(
        &self,
        record_id: &str,
        status: EntryStatus,
        _reason: Option<&str>,
    ) -> Result<()> {
        info!("DRY RUN: record {} -> {}", record_id, status);
        Ok(())
    }

    async fn update_day_status(
        &self,
        record_id: &str,
        day_index: DayIndex,
        status: EntryStatus,
        _reason: Option<&str>,
    ) -> Result<()> {
        info!("DRY RUN: record {} day {} -> {}", record_id, day_index, status);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let cli = Cli::parse();
    match cli.command {
        Command::Report {
            input,
            report_type,
            start_date,
            end_date,
            employee_ids,
            status_filters,
            output,
        } => {
            // Range ordering and size are validated here, at the caller
            // boundary; the report engine takes the bounds as given.
            if let (Some(start), Some(end)) = (start_date, end_date) {
                if end < start {
                    bail!("--end-date {} is before --start-date {}", end, start);
                }
                if (end - start).num_days() > MAX_REPORT_RANGE_DAYS {
                    bail!(
                        "date range {} to {} exceeds {} days",
                        start,
                        end,
                        MAX_REPORT_RANGE_DAYS
                    );
                }
            }

            let records = model::load_entries_from_path(&input)
                .with_context(|| format!("Failed to load records from {}", input.display()))?;
            let filter = ReportFilter {
                start_date,
                end_date,
                employee_ids: (!employee_ids.is_empty()).then_some(employee_ids),
                status_filters: (!status_filters.is_empty()).then_some(status_filters),
                report_type,
            };

            let writer: Box<dyn io::Write> = match &output {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path)
                        .with_context(|| format!("Failed to create {}", path.display()))?,
                )),
                None => Box::new(io::stdout()),
            };

            match report_type {
                ReportType::TimesheetEntries => {
                    let report = build_pivot(&records, &filter);
                    if report.groups.is_empty() {
                        warn!("No rows matched the filter; the report will be empty");
                    }
                    write_pivot_csv(&report, writer)?;
                }
                _ => {
                    let rows = build_shallow(&records, &filter);
                    if rows.is_empty() {
                        warn!("No rows matched the filter; the report will be empty");
                    }
                    write_shallow_csv(&rows, report_type, writer)?;
                }
            }
            if let Some(path) = output {
                info!("Report written to {}", path.display());
            }
        }
        Command::Approve { input, ids, target } => {
            let records = model::load_entries_from_path(&input)
                .with_context(|| format!("Failed to load records from {}", input.display()))?;
            let mut engine = SelectionApprovalEngine::new(|| {
                info!("Refresh requested: re-fetch authoritative records");
            });
            for id in &ids {
                engine.set_record_selection(id, true);
            }
            let eligible: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
            let outcome = engine
                .apply_status_to_selected(&LoggingUpdater, target, &eligible, &records)
                .await;
            println!("{}", outcome.summary());
        }
        Command::Duration { value } => match DurationValue::parse(&value) {
            Ok(parsed) => println!("{} = {} hours", parsed, parsed.as_decimal()),
            Err(e) => bail!("Invalid duration {:?}: {}", value, e),
        },
    }
    Ok(())
}
