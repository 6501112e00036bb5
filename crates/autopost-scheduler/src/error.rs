use thiserror::Error;

/// Why a row could not be turned into a [`Job`](autopost_core::Job).
///
/// A row with an issue stays in the store unchanged; the issue is only
/// reported in the operational log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowIssue {
    #[error("expected {expected} columns, found {found}")]
    WrongColumnCount { expected: usize, found: usize },

    #[error("required field `{field}` is empty")]
    MissingField { field: &'static str },

    #[error("cannot parse '{value}' as YYYY-MM-DD HH:MM")]
    InvalidSchedule { value: String },

    #[error("invalid mode '{value}' (expected once or daily)")]
    InvalidMode { value: String },
}
