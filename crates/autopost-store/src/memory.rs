use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::{
    error::{Result, StoreError},
    store::JobStore,
};

/// A write applied to a [`MemoryStore`], recorded in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    UpdateCell {
        row: usize,
        column: usize,
        value: String,
    },
    DeleteRow {
        row: usize,
    },
    AppendRow {
        values: Vec<String>,
    },
}

/// In-process store with the same positional semantics as a spreadsheet.
///
/// Failures can be injected to exercise the scheduler's error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Vec<String>>>,
    ops: Mutex<Vec<StoreOp>>,
    fetches: AtomicUsize,
    fail_next_fetch: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryStore {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    /// Current contents, header included.
    pub fn rows(&self) -> Vec<Vec<String>> {
        lock(&self.rows).clone()
    }

    /// Every successful write so far.
    pub fn operations(&self) -> Vec<StoreOp> {
        lock(&self.ops).clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Make the next `fetch_all` fail once.
    pub fn fail_next_fetch(&self) {
        self.fail_next_fetch.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    fn record(&self, op: StoreOp) {
        lock(&self.ops).push(op);
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl JobStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_all(&self) -> Result<Vec<Vec<String>>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_fetch.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected fetch failure".into()));
        }
        Ok(self.rows())
    }

    async fn update_cell(&self, row: usize, column: usize, value: &str) -> Result<()> {
        {
            let mut rows = lock(&self.rows);
            let len = rows.len();
            let target = rows
                .get_mut(row)
                .ok_or(StoreError::RowOutOfRange { index: row, len })?;
            if target.len() <= column {
                target.resize(column + 1, String::new());
            }
            target[column] = value.to_string();
        }
        self.record(StoreOp::UpdateCell {
            row,
            column,
            value: value.to_string(),
        });
        Ok(())
    }

    async fn delete_row(&self, row: usize) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected delete failure".into()));
        }
        {
            let mut rows = lock(&self.rows);
            if row >= rows.len() {
                return Err(StoreError::RowOutOfRange {
                    index: row,
                    len: rows.len(),
                });
            }
            rows.remove(row);
        }
        self.record(StoreOp::DeleteRow { row });
        Ok(())
    }

    async fn append_row(&self, values: &[String]) -> Result<()> {
        lock(&self.rows).push(values.to_vec());
        self.record(StoreOp::AppendRow {
            values: values.to_vec(),
        });
        Ok(())
    }
}
