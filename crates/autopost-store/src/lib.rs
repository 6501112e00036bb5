//! `autopost-store` — access to the shared, row-oriented job store.
//!
//! # Overview
//!
//! The store is a spreadsheet: row 0 is the header, every following row is
//! one job. Rows are addressed by their 0-based position in the last
//! [`JobStore::fetch_all`] result, so deleting a row shifts everything below
//! it up by one. [`Snapshot`] assigns each fetched row a position-free
//! [`JobId`](autopost_core::JobId) and [`MutationPlan`] turns id-keyed
//! mutations back into positions, applying deletions bottom-up.
//!
//! | Adapter        | Backing                                   |
//! |----------------|-------------------------------------------|
//! | `SheetsStore`  | Google Sheets REST API v4                 |
//! | `MemoryStore`  | In-process `Vec<Vec<String>>` (tests)     |

pub mod auth;
pub mod error;
pub mod memory;
pub mod plan;
pub mod sheets;
pub mod snapshot;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{MemoryStore, StoreOp};
pub use plan::{ApplyReport, Mutation, MutationPlan};
pub use sheets::SheetsStore;
pub use snapshot::{Snapshot, StoredRow};
pub use store::{ensure_header, JobStore};
