//! `autopost-scheduler` — the fetch → evaluate → publish → reconcile loop.
//!
//! # Overview
//!
//! Every [`POLL_INTERVAL_SECS`](autopost_core::config::POLL_INTERVAL_SECS)
//! the [`engine::SchedulerEngine`] takes one snapshot of the job store,
//! validates each row, publishes the ones that are due and records the
//! resulting store changes in a [`MutationPlan`](autopost_store::MutationPlan)
//! that is applied before the next fetch.
//!
//! # Row outcomes
//!
//! | Mode    | Publish | Store action                    |
//! |---------|---------|---------------------------------|
//! | `once`  | success | row deleted                     |
//! | `once`  | failure | row unchanged, retried next cycle |
//! | `daily` | success | date column advanced one day    |
//! | `daily` | failure | row unchanged, retried next cycle |
//!
//! Malformed rows are never touched.

pub mod audit;
pub mod engine;
pub mod error;
pub mod failures;
pub mod parser;
pub mod reconcile;

pub use audit::{AuditLog, AuditRecord, AuditStatus};
pub use engine::{CycleReport, RowState, RowStatus, SchedulerEngine};
pub use error::RowIssue;
pub use failures::FailureTracker;
pub use parser::parse_row;
pub use reconcile::{reconcile, Reconciliation, Transition};
