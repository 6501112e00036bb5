use std::collections::HashMap;

use autopost_core::JobId;

/// One data row as it appeared in a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    /// 0-based position in the store at fetch time (header is 0).
    pub position: usize,
    pub id: JobId,
    pub cells: Vec<String>,
}

/// Immutable view of the store taken at the start of a cycle.
///
/// All decisions of one cycle are made against a single snapshot; the store
/// gives no isolation between reads and writes.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    header: Option<Vec<String>>,
    rows: Vec<StoredRow>,
}

impl Snapshot {
    pub fn from_rows(raw: Vec<Vec<String>>) -> Self {
        let mut iter = raw.into_iter();
        let header = iter.next();

        // Identical rows are numbered in store order so each keeps its own id.
        let mut seen: HashMap<JobId, usize> = HashMap::new();
        let rows = iter
            .enumerate()
            .map(|(i, cells)| {
                let base = JobId::fingerprint(&cells, 0);
                let occurrence = seen.entry(base).or_insert(0);
                let id = JobId::fingerprint(&cells, *occurrence);
                *occurrence += 1;
                StoredRow {
                    position: i + 1,
                    id,
                    cells,
                }
            })
            .collect();

        Self { header, rows }
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Data rows only, in store order.
    pub fn rows(&self) -> &[StoredRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position the row with this id had when the snapshot was taken.
    pub fn position_of(&self, id: &JobId) -> Option<usize> {
        self.rows.iter().find(|r| &r.id == id).map(|r| r.position)
    }

    pub fn ids(&self) -> impl Iterator<Item = &JobId> {
        self.rows.iter().map(|r| &r.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_store_has_no_header_or_rows() {
        let snap = Snapshot::from_rows(Vec::new());
        assert!(snap.header().is_none());
        assert!(snap.is_empty());
    }

    #[test]
    fn header_only_store_is_empty() {
        let snap = Snapshot::from_rows(vec![row(&["product", "keywords"])]);
        assert_eq!(snap.header().unwrap()[0], "product");
        assert!(snap.is_empty());
    }

    #[test]
    fn positions_start_after_header() {
        let snap = Snapshot::from_rows(vec![row(&["h"]), row(&["a"]), row(&["b"])]);
        let positions: Vec<usize> = snap.rows().iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2]);
        assert_eq!(snap.position_of(&snap.rows()[1].id), Some(2));
    }

    #[test]
    fn duplicate_rows_get_distinct_ids() {
        let snap = Snapshot::from_rows(vec![row(&["h"]), row(&["same"]), row(&["same"])]);
        let ids: Vec<&JobId> = snap.ids().collect();
        assert_ne!(ids[0], ids[1]);
        assert_eq!(snap.position_of(ids[1]), Some(2));
    }

    #[test]
    fn ids_do_not_depend_on_position() {
        let a = Snapshot::from_rows(vec![row(&["h"]), row(&["x"]), row(&["job"])]);
        let b = Snapshot::from_rows(vec![row(&["h"]), row(&["job"])]);
        assert_eq!(a.rows()[1].id, b.rows()[0].id);
    }
}
