// src/lib.rs
//
// Core engines for the time-tracking review and reporting workflow:
//
// - `duration`: the "HH.MM" display codec and its interactive editing buffer.
// - `filter`: status/date predicates shared by review screens and reports.
// - `approval`: the bulk approve/reject state machine over week or day
//   selections, tolerant of per-item update failures.
// - `report`: shallow status reports and the deep timesheet-entries pivot.
//
// All engines are pure, synchronous transforms over an in-memory snapshot of
// records; only the status-update calls in `approval` suspend.

pub mod approval;
pub mod duration;
pub mod filter;
pub mod model;
pub mod report;

mod duration_tests;
