//! Append-only, human-readable record of every publish outcome.

use std::fmt;
use std::path::{Path, PathBuf};

use autopost_core::{config::AuditConfig, Job};
use chrono::NaiveDateTime;
use tokio::io::AsyncWriteExt;
use tracing::error;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditStatus {
    Success,
    Error,
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditStatus::Success => write!(f, "SUCCESS"),
            AuditStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// One outcome, rendered as a block of lines followed by a blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub timestamp: NaiveDateTime,
    pub platform: String,
    pub mode: String,
    pub status: AuditStatus,
    /// Platform post id on success.
    pub post_id: Option<String>,
    /// Failure cause.
    pub error: Option<String>,
    pub caption: String,
    pub image: String,
}

impl AuditRecord {
    pub fn published(timestamp: NaiveDateTime, job: &Job, post_id: &str) -> Self {
        Self {
            timestamp,
            platform: job.platform.clone(),
            mode: job.mode.to_string(),
            status: AuditStatus::Success,
            post_id: Some(post_id.to_string()),
            error: None,
            caption: job.caption.clone(),
            image: job.image.clone().unwrap_or_default(),
        }
    }

    pub fn failed(timestamp: NaiveDateTime, job: &Job, cause: &str) -> Self {
        Self {
            timestamp,
            platform: job.platform.clone(),
            mode: job.mode.to_string(),
            status: AuditStatus::Error,
            post_id: None,
            error: Some(cause.to_string()),
            caption: job.caption.clone(),
            image: job.image.clone().unwrap_or_default(),
        }
    }

    /// A cycle that failed as a whole, e.g. because the store was unreachable.
    pub fn system_failure(timestamp: NaiveDateTime, cause: &str) -> Self {
        Self {
            timestamp,
            platform: "system".to_string(),
            mode: "process".to_string(),
            status: AuditStatus::Error,
            post_id: None,
            error: Some(cause.to_string()),
            caption: String::new(),
            image: String::new(),
        }
    }

    pub fn render(&self, preview_chars: usize) -> String {
        let mut out = format!(
            "[{}] Platform: {} | Mode: {} | Status: {}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.platform.to_uppercase(),
            self.mode,
            self.status,
        );
        match self.status {
            AuditStatus::Success => {
                out.push_str(&line("Post ID", self.post_id.as_deref().unwrap_or("")))
            }
            AuditStatus::Error => out.push_str(&line("Error", self.error.as_deref().unwrap_or(""))),
        }
        out.push_str(&line("Caption", &preview(&self.caption, preview_chars)));
        out.push_str(&line("Image", &self.image));
        out.push('\n');
        out
    }
}

fn line(label: &str, value: &str) -> String {
    if value.is_empty() {
        format!("  {label}:\n")
    } else {
        format!("  {label}: {value}\n")
    }
}

/// First `max` characters of `caption`, with `...` appended when cut.
fn preview(caption: &str, max: usize) -> String {
    if caption.chars().count() <= max {
        return caption.to_string();
    }
    let mut cut: String = caption.chars().take(max).collect();
    cut.push_str("...");
    cut
}

/// The audit file. Opened in append mode for every record.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
    preview_chars: usize,
}

impl AuditLog {
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            path: PathBuf::from(&config.path),
            preview_chars: config.caption_preview_chars,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record. Write failures are logged, never returned.
    pub async fn append(&self, record: &AuditRecord) {
        let text = record.render(self.preview_chars);
        if let Err(e) = self.write(&text).await {
            error!(path = %self.path.display(), error = %e, "failed to write audit record");
        }
    }

    async fn write(&self, text: &str) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(text.as_bytes()).await?;
        file.flush().await
    }
}
