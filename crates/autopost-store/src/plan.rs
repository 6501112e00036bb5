use autopost_core::JobId;
use tracing::{info, warn};

use crate::{snapshot::Snapshot, store::JobStore};

/// A single store change, addressed by job identity rather than position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Overwrite one cell of the job's row.
    SetCell {
        id: JobId,
        column: usize,
        value: String,
    },
    /// Remove the job's row.
    Delete { id: JobId },
}

/// Outcome of applying a [`MutationPlan`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub updated: usize,
    pub deleted: usize,
    /// Store calls that returned an error.
    pub failed: usize,
    /// Mutations whose id was not in the snapshot.
    pub unresolved: usize,
}

/// Every mutation decided during one cycle.
///
/// Mutations may be pushed in any order. [`apply`](MutationPlan::apply)
/// writes cell updates first (their positions are still the snapshot's), then
/// deletes rows from the bottom up so no deletion shifts a row that is still
/// waiting to be deleted.
#[derive(Debug, Clone, Default)]
pub struct MutationPlan {
    updates: Vec<(JobId, usize, String)>,
    deletions: Vec<JobId>,
}

impl MutationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::SetCell { id, column, value } => self.updates.push((id, column, value)),
            Mutation::Delete { id } => self.deletions.push(id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.deletions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updates.len() + self.deletions.len()
    }

    /// Resolve ids against `snapshot` and write the changes to `store`.
    ///
    /// A failing store call is logged and counted; the remaining mutations
    /// still run.
    pub async fn apply(self, store: &dyn JobStore, snapshot: &Snapshot) -> ApplyReport {
        let mut report = ApplyReport::default();

        for (id, column, value) in &self.updates {
            let Some(row) = snapshot.position_of(id) else {
                warn!(job_id = %id, "update target not in snapshot, skipped");
                report.unresolved += 1;
                continue;
            };
            match store.update_cell(row, *column, value).await {
                Ok(()) => {
                    info!(row, column, %value, "row updated");
                    report.updated += 1;
                }
                Err(e) => {
                    warn!(row, column, error = %e, "row update failed");
                    report.failed += 1;
                }
            }
        }

        let mut rows: Vec<usize> = Vec::with_capacity(self.deletions.len());
        for id in &self.deletions {
            match snapshot.position_of(id) {
                Some(row) => rows.push(row),
                None => {
                    warn!(job_id = %id, "delete target not in snapshot, skipped");
                    report.unresolved += 1;
                }
            }
        }
        rows.sort_unstable_by(|a, b| b.cmp(a));
        rows.dedup();

        for row in rows {
            match store.delete_row(row).await {
                Ok(()) => {
                    info!(row, "row deleted");
                    report.deleted += 1;
                }
                Err(e) => {
                    warn!(row, error = %e, "row delete failed");
                    report.failed += 1;
                }
            }
        }

        report
    }
}
