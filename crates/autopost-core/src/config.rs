use chrono::FixedOffset;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{AutopostError, Result};

// Fixed cadence of the scheduling loop. Not configurable.
pub const POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.facebook.com/v19.0";
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_SHEET_NAME: &str = "schedule";
pub const DEFAULT_AUDIT_PATH: &str = "log_scheduler.txt";
pub const DEFAULT_CAPTION_PREVIEW_CHARS: usize = 80;

/// Top-level config (autopost.toml + AUTOPOST_* env overrides).
///
/// Resolved once at process start and handed to each component's
/// constructor; nothing reads it through a global.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutopostConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub facebook: FacebookConfig,
    #[serde(default)]
    pub instagram: InstagramConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Google Sheets job store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    /// Path to the GCP service account JSON key file.
    pub service_account_key: Option<String>,
    #[serde(default = "default_sheets_api_base")]
    pub api_base: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            sheet_name: default_sheet_name(),
            service_account_key: None,
            api_base: default_sheets_api_base(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Shared Graph API settings for the Facebook and Instagram publishers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_graph_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: default_graph_base_url(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Default page credentials, used when a row leaves token/account id empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacebookConfig {
    #[serde(default)]
    pub page_id: String,
    #[serde(default)]
    pub access_token: String,
}

/// Default Instagram business account credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstagramConfig {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_audit_path")]
    pub path: String,
    #[serde(default = "default_caption_preview_chars")]
    pub caption_preview_chars: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: default_audit_path(),
            caption_preview_chars: DEFAULT_CAPTION_PREVIEW_CHARS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Interpret row date/time at this fixed UTC offset instead of the host's
    /// local zone. `420` means UTC+07:00.
    pub utc_offset_minutes: Option<i32>,
}

impl ScheduleConfig {
    /// Resolve the configured offset. `Ok(None)` means "use local time".
    pub fn offset(&self) -> Result<Option<FixedOffset>> {
        match self.utc_offset_minutes {
            None => Ok(None),
            Some(minutes) => FixedOffset::east_opt(minutes * 60)
                .map(Some)
                .ok_or_else(|| {
                    AutopostError::Config(format!("utc_offset_minutes out of range: {minutes}"))
                }),
        }
    }
}

fn default_sheet_name() -> String {
    DEFAULT_SHEET_NAME.to_string()
}
fn default_sheets_api_base() -> String {
    DEFAULT_SHEETS_API_BASE.to_string()
}
fn default_graph_base_url() -> String {
    DEFAULT_GRAPH_BASE_URL.to_string()
}
fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
fn default_audit_path() -> String {
    DEFAULT_AUDIT_PATH.to_string()
}
fn default_caption_preview_chars() -> usize {
    DEFAULT_CAPTION_PREVIEW_CHARS
}

impl AutopostConfig {
    /// Load config from a TOML file with AUTOPOST_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ./autopost.toml
    ///
    /// Nested keys are addressed with a double underscore, e.g.
    /// `AUTOPOST_FACEBOOK__ACCESS_TOKEN`.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: AutopostConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("AUTOPOST_").split("__"))
            .extract()
            .map_err(|e| AutopostError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Settings the Sheets store cannot run without.
    pub fn require_store(&self) -> Result<()> {
        if self.store.spreadsheet_id.trim().is_empty() {
            return Err(AutopostError::MissingSetting {
                key: "store.spreadsheet_id",
            });
        }
        if self
            .store
            .service_account_key
            .as_deref()
            .is_none_or(|p| p.trim().is_empty())
        {
            return Err(AutopostError::MissingSetting {
                key: "store.service_account_key",
            });
        }
        self.schedule.offset()?;
        Ok(())
    }
}

fn default_config_path() -> String {
    "autopost.toml".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(body: &str) -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autopost.toml");
        std::fs::write(&path, body).unwrap();
        let path = path.to_string_lossy().into_owned();
        (dir, path)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AutopostConfig::load(Some("/nonexistent/autopost.toml")).unwrap();
        assert_eq!(config.graph.base_url, DEFAULT_GRAPH_BASE_URL);
        assert_eq!(config.graph.request_timeout_secs, 30);
        assert_eq!(config.audit.path, DEFAULT_AUDIT_PATH);
        assert_eq!(config.audit.caption_preview_chars, 80);
        assert!(config.facebook.access_token.is_empty());
    }

    #[test]
    fn toml_sections_are_read() {
        let (_dir, path) = write_config(
            r#"
            [store]
            spreadsheet_id = "sheet-123"
            sheet_name = "posts"
            service_account_key = "/etc/autopost/sa.json"

            [facebook]
            page_id = "1000"
            access_token = "fb-token"

            [instagram]
            account_id = "2000"
            access_token = "ig-token"

            [schedule]
            utc_offset_minutes = 420
            "#,
        );
        let config = AutopostConfig::load(Some(&path)).unwrap();
        assert_eq!(config.store.spreadsheet_id, "sheet-123");
        assert_eq!(config.store.sheet_name, "posts");
        assert_eq!(config.store.api_base, DEFAULT_SHEETS_API_BASE);
        assert_eq!(config.facebook.page_id, "1000");
        assert_eq!(config.instagram.access_token, "ig-token");
        assert!(config.require_store().is_ok());

        let offset = config.schedule.offset().unwrap().unwrap();
        assert_eq!(offset.local_minus_utc(), 7 * 3600);
    }

    #[test]
    fn require_store_reports_missing_key() {
        let (_dir, path) = write_config("[store]\nspreadsheet_id = \"abc\"\n");
        let config = AutopostConfig::load(Some(&path)).unwrap();
        match config.require_store() {
            Err(AutopostError::MissingSetting { key }) => {
                assert_eq!(key, "store.service_account_key")
            }
            other => panic!("expected MissingSetting, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        let schedule = ScheduleConfig {
            utc_offset_minutes: Some(24 * 60),
        };
        assert!(schedule.offset().is_err());
    }
}
