use std::collections::{HashMap, HashSet};

use autopost_core::JobId;

/// Consecutive publish failures per job, kept in memory for log context.
///
/// Counts never gate a publish attempt; a failing job is retried every
/// cycle regardless of its count.
#[derive(Debug, Default)]
pub struct FailureTracker {
    counts: HashMap<JobId, u32>,
}

impl FailureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure and return the consecutive-failure count, starting at 1.
    pub fn record_failure(&mut self, id: &JobId) -> u32 {
        let n = self.counts.entry(id.clone()).or_insert(0);
        *n += 1;
        *n
    }

    pub fn record_success(&mut self, id: &JobId) {
        self.counts.remove(id);
    }

    pub fn count(&self, id: &JobId) -> u32 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    /// Forget jobs that are no longer in the store.
    pub fn retain<'a>(&mut self, live: impl IntoIterator<Item = &'a JobId>) {
        let live: HashSet<&JobId> = live.into_iter().collect();
        self.counts.retain(|id, _| live.contains(id));
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
