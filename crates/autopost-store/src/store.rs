use async_trait::async_trait;
use autopost_core::types::HEADER;
use tracing::info;

use crate::error::Result;

/// Common interface implemented by every job store adapter.
///
/// Row and column indices are 0-based positions in the most recent
/// [`fetch_all`](JobStore::fetch_all) result; position 0 is the header row.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Short identifier used in log lines (e.g. `"google-sheets"`).
    fn name(&self) -> &str;

    /// Every row in store order, header first. An empty store yields an
    /// empty `Vec`.
    async fn fetch_all(&self) -> Result<Vec<Vec<String>>>;

    /// Overwrite exactly one cell.
    async fn update_cell(&self, row: usize, column: usize, value: &str) -> Result<()>;

    /// Remove a row. Every row after it moves up by one position.
    async fn delete_row(&self, row: usize) -> Result<()>;

    /// Append a row after the last one.
    async fn append_row(&self, values: &[String]) -> Result<()>;
}

/// Write the canonical header if the store is completely empty.
///
/// Returns `true` when the header was written.
pub async fn ensure_header(store: &dyn JobStore) -> Result<bool> {
    let rows = store.fetch_all().await?;
    if !rows.is_empty() {
        return Ok(false);
    }
    let header: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
    store.append_row(&header).await?;
    info!(store = store.name(), "header row written to empty store");
    Ok(true)
}
