use thiserror::Error;

/// Errors raised by any job store adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote API answered with a non-success status.
    #[error("Sheets API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Obtaining an access token failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The configured worksheet does not exist in the spreadsheet.
    #[error("Worksheet not found: {name}")]
    SheetNotFound { name: String },

    /// A row index that does not exist in the store.
    #[error("Row {index} out of range (store has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    /// The response body could not be understood.
    #[error("Unexpected response: {0}")]
    Parse(String),

    /// The store cannot be reached at all.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
