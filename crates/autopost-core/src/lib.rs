//! `autopost-core` — configuration, row schema and job types shared by every
//! other autopost crate.

pub mod config;
pub mod error;
pub mod types;

pub use config::AutopostConfig;
pub use error::{AutopostError, Result};
pub use types::{Job, JobId, Mode};
