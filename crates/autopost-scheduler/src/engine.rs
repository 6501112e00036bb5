use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use autopost_core::{config::POLL_INTERVAL_SECS, types::SCHEDULE_FORMAT, Job};
use autopost_publishers::{PostRequest, PublisherRegistry};
use autopost_store::{JobStore, MutationPlan, Snapshot, StoreError};
use chrono::{FixedOffset, Local, NaiveDateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::{
    audit::{AuditLog, AuditRecord},
    failures::FailureTracker,
    parser::parse_row,
    reconcile::{reconcile, Transition},
};

/// Counters for one pass over the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Data rows in the snapshot.
    pub scanned: usize,
    pub malformed: usize,
    /// Valid rows not yet due.
    pub pending: usize,
    pub published: usize,
    pub failed: usize,
    /// Due rows whose platform has no publisher.
    pub skipped: usize,
    pub updates_applied: usize,
    pub deletions_applied: usize,
    /// Store writes that errored or no longer matched a row.
    pub mutation_failures: usize,
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scanned={} malformed={} pending={} published={} failed={} skipped={} \
             updated={} deleted={} mutation_failures={}",
            self.scanned,
            self.malformed,
            self.pending,
            self.published,
            self.failed,
            self.skipped,
            self.updates_applied,
            self.deletions_applied,
            self.mutation_failures,
        )
    }
}

/// What a dry run found for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowState {
    Malformed { issue: String },
    Pending { scheduled_at: NaiveDateTime },
    Due { platform: String },
    Unsupported { platform: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowStatus {
    pub position: usize,
    pub job_id: String,
    pub state: RowState,
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {:>4}  {}  ", self.position, self.job_id)?;
        match &self.state {
            RowState::Malformed { issue } => write!(f, "malformed: {issue}"),
            RowState::Pending { scheduled_at } => {
                write!(f, "pending until {}", scheduled_at.format(SCHEDULE_FORMAT))
            }
            RowState::Due { platform } => write!(f, "due on {platform}"),
            RowState::Unsupported { platform } => write!(f, "unsupported platform {platform}"),
        }
    }
}

/// Drives the publish loop: one fetch, one evaluation pass and one mutation
/// plan per cycle.
pub struct SchedulerEngine {
    store: Arc<dyn JobStore>,
    publishers: PublisherRegistry,
    audit: AuditLog,
    utc_offset: Option<FixedOffset>,
    failures: FailureTracker,
}

impl SchedulerEngine {
    pub fn new(store: Arc<dyn JobStore>, publishers: PublisherRegistry, audit: AuditLog) -> Self {
        Self {
            store,
            publishers,
            audit,
            utc_offset: None,
            failures: FailureTracker::new(),
        }
    }

    /// Read row dates and times at a fixed offset instead of the host zone.
    pub fn with_utc_offset(mut self, offset: Option<FixedOffset>) -> Self {
        self.utc_offset = offset;
        self
    }

    /// Current wall-clock time in the zone row schedules are written in.
    pub fn now(&self) -> NaiveDateTime {
        match self.utc_offset {
            Some(offset) => Utc::now().with_timezone(&offset).naive_local(),
            None => Local::now().naive_local(),
        }
    }

    pub fn failures(&self) -> &FailureTracker {
        &self.failures
    }

    /// Main loop. Runs a cycle, sleeps [`POLL_INTERVAL_SECS`], repeats until
    /// `shutdown` broadcasts `true`.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            store = self.store.name(),
            platforms = ?self.publishers.names(),
            interval_secs = POLL_INTERVAL_SECS,
            "scheduler engine started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }
            self.tick().await.ok();

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(POLL_INTERVAL_SECS)) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("scheduler engine shutting down");
    }

    /// Run one cycle at the current time inside its own `cycle` span.
    ///
    /// A store failure is logged and written to the audit log as a system
    /// error before being returned.
    pub async fn tick(&mut self) -> Result<CycleReport, StoreError> {
        let cycle_id = Uuid::now_v7();
        let now = self.now();
        let span = info_span!("cycle", %cycle_id);

        let result = self.run_cycle(now).instrument(span.clone()).await;
        match &result {
            Ok(report) => {
                span.in_scope(|| info!(%report, "cycle complete"));
            }
            Err(e) => {
                span.in_scope(|| error!(error = %e, "cycle aborted, store unavailable"));
                self.audit
                    .append(&AuditRecord::system_failure(self.now(), &e.to_string()))
                    .await;
            }
        }
        result
    }

    /// One pass over the store, comparing every row against the single
    /// instant `now`.
    pub async fn run_cycle(&mut self, now: NaiveDateTime) -> Result<CycleReport, StoreError> {
        let snapshot = Snapshot::from_rows(self.store.fetch_all().await?);
        let mut report = CycleReport {
            scanned: snapshot.rows().len(),
            ..CycleReport::default()
        };
        debug!(rows = report.scanned, %now, "snapshot taken");

        let mut plan = MutationPlan::new();
        for row in snapshot.rows() {
            let job = match parse_row(row.id.clone(), &row.cells) {
                Ok(job) => job,
                Err(issue) => {
                    warn!(row = row.position, job_id = %row.id, %issue, "malformed row left untouched");
                    report.malformed += 1;
                    continue;
                }
            };

            if !job.is_due(now) {
                debug!(row = row.position, job_id = %job.id, scheduled_at = %job.scheduled_at, "not due yet");
                report.pending += 1;
                continue;
            }

            let Some(succeeded) = self.publish(row.position, &job).await else {
                report.skipped += 1;
                continue;
            };
            if succeeded {
                report.published += 1;
            } else {
                report.failed += 1;
            }

            let reconciliation = reconcile(&job, succeeded);
            match reconciliation.transition {
                Transition::Completed => {
                    info!(row = row.position, job_id = %job.id, "once job completed, row scheduled for deletion")
                }
                Transition::Rescheduled { next_date } => {
                    info!(row = row.position, job_id = %job.id, %next_date, "daily job rescheduled")
                }
                Transition::RetryPending => {}
            }
            if let Some(mutation) = reconciliation.mutation {
                plan.push(mutation);
            }
        }

        self.failures.retain(snapshot.ids());

        if !plan.is_empty() {
            let applied = plan.apply(self.store.as_ref(), &snapshot).await;
            report.updates_applied = applied.updated;
            report.deletions_applied = applied.deleted;
            report.mutation_failures = applied.failed + applied.unresolved;
        }

        Ok(report)
    }

    /// Publish one due job and audit the outcome.
    ///
    /// Returns `None` when no publisher serves the job's platform.
    async fn publish(&mut self, position: usize, job: &Job) -> Option<bool> {
        let Some(publisher) = self.publishers.get(&job.platform) else {
            warn!(row = position, job_id = %job.id, platform = %job.platform, "no publisher for platform, row left untouched");
            return None;
        };

        info!(row = position, job_id = %job.id, platform = %job.platform, mode = %job.mode, product = %job.product, "publishing");
        match publisher.publish(&PostRequest::from_job(job)).await {
            Ok(post) => {
                self.failures.record_success(&job.id);
                info!(row = position, job_id = %job.id, post_id = %post.post_id, "published");
                self.audit
                    .append(&AuditRecord::published(self.now(), job, &post.post_id))
                    .await;
                Some(true)
            }
            Err(e) => {
                let attempt = self.failures.record_failure(&job.id);
                warn!(row = position, job_id = %job.id, attempt, error = %e, "publish failed, will retry next cycle");
                self.audit
                    .append(&AuditRecord::failed(self.now(), job, &e.to_string()))
                    .await;
                Some(false)
            }
        }
    }

    /// Evaluate every row at `now` without publishing or writing anything.
    pub async fn inspect(&self, now: NaiveDateTime) -> Result<Vec<RowStatus>, StoreError> {
        let snapshot = Snapshot::from_rows(self.store.fetch_all().await?);
        let statuses = snapshot
            .rows()
            .iter()
            .map(|row| {
                let state = match parse_row(row.id.clone(), &row.cells) {
                    Err(issue) => RowState::Malformed {
                        issue: issue.to_string(),
                    },
                    Ok(job) if !job.is_due(now) => RowState::Pending {
                        scheduled_at: job.scheduled_at,
                    },
                    Ok(job) if self.publishers.get(&job.platform).is_none() => {
                        RowState::Unsupported {
                            platform: job.platform,
                        }
                    }
                    Ok(job) => RowState::Due {
                        platform: job.platform,
                    },
                };
                RowStatus {
                    position: row.position,
                    job_id: row.id.short().to_string(),
                    state,
                }
            })
            .collect();
        Ok(statuses)
    }
}
