use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of cells in a job row.
pub const COLUMN_COUNT: usize = 10;

/// 0-based column positions of the row schema.
pub mod column {
    pub const PRODUCT: usize = 0;
    pub const KEYWORDS: usize = 1;
    pub const PLATFORM: usize = 2;
    pub const TIME: usize = 3;
    pub const TOKEN: usize = 4;
    pub const ACCOUNT_ID: usize = 5;
    pub const MODE: usize = 6;
    pub const DATE: usize = 7;
    pub const CAPTION: usize = 8;
    pub const IMAGE: usize = 9;
}

/// Header row written to an empty store.
pub const HEADER: [&str; COLUMN_COUNT] = [
    "product",
    "keywords",
    "platform",
    "time_of_day",
    "token",
    "account_id",
    "mode",
    "date",
    "caption",
    "image_reference",
];

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";
pub const SCHEDULE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// How a job behaves after a successful publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Publish once, then the row is deleted.
    Once,
    /// Publish every day; the date column advances by one day per success.
    Daily,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Once => "once",
            Mode::Daily => "daily",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "once" => Ok(Mode::Once),
            "daily" => Ok(Mode::Daily),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Identity of a row inside one fetched snapshot, independent of its position.
///
/// SHA-256 over the row's cells plus an occurrence counter, so byte-identical
/// rows still get distinct ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    pub fn fingerprint(cells: &[String], occurrence: usize) -> Self {
        let mut hasher = Sha256::new();
        for cell in cells {
            hasher.update(cell.as_bytes());
            // unit separator keeps ["ab", "c"] distinct from ["a", "bc"]
            hasher.update([0x1f]);
        }
        hasher.update(occurrence.to_le_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex chars, enough to tell rows apart in logs.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short())
    }
}

/// A validated job row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub product: String,
    pub keywords: String,
    /// Lower-cased platform name, e.g. `"facebook"`.
    pub platform: String,
    pub scheduled_at: NaiveDateTime,
    /// Per-row access token; `None` falls back to the configured default.
    pub token: Option<String>,
    /// Per-row page / account id; `None` falls back to the configured default.
    pub account_id: Option<String>,
    pub mode: Mode,
    pub caption: String,
    pub image: Option<String>,
}

impl Job {
    /// A job is due once `now` has reached its scheduled moment.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        now >= self.scheduled_at
    }

    /// Date a daily job moves to after a successful publish: the scheduled
    /// date plus one calendar day, regardless of when it actually ran.
    pub fn next_date(&self) -> Option<NaiveDate> {
        self.scheduled_at.date().checked_add_days(Days::new(1))
    }
}

/// Render a date the way the date column stores it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
