//! Google Sheets v4 adapter.
//!
//! One worksheet is the job store. The Sheets API drops trailing empty cells,
//! so fetched rows are right-padded to the widest row to keep column counts
//! meaningful for the row validator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use autopost_core::config::StoreConfig;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::{
    auth::{ServiceAccountAuth, TokenProvider},
    error::{Result, StoreError},
    store::JobStore,
};

pub struct SheetsStore {
    client: Client,
    api_base: String,
    spreadsheet_id: String,
    sheet_name: String,
    tokens: Arc<dyn TokenProvider>,
    // numeric sheet id, needed only for row deletion
    sheet_id: OnceCell<i64>,
}

impl SheetsStore {
    pub fn new(config: &StoreConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            sheet_name: config.sheet_name.clone(),
            tokens,
            sheet_id: OnceCell::new(),
        })
    }

    /// Build a store authenticated with the configured service account key.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let key_path = config
            .service_account_key
            .as_deref()
            .ok_or_else(|| StoreError::Auth("store.service_account_key is not set".into()))?;
        let auth = ServiceAccountAuth::from_file(key_path, build_client(config)?)?;
        Self::new(config, Arc::new(auth))
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/spreadsheets/{}", self.api_base, self.spreadsheet_id)
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(),
            urlencoding::encode(range)
        )
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let token = self.tokens.access_token().await?;
        let resp = req.bearer_auth(token).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    async fn sheet_id(&self) -> Result<i64> {
        self.sheet_id
            .get_or_try_init(|| async {
                let url = format!("{}?fields=sheets.properties", self.spreadsheet_url());
                let resp = self.send(self.client.get(&url)).await?;
                let meta: SpreadsheetMeta = resp
                    .json()
                    .await
                    .map_err(|e| StoreError::Parse(format!("spreadsheet metadata: {e}")))?;
                meta.sheets
                    .into_iter()
                    .find(|s| s.properties.title == self.sheet_name)
                    .map(|s| s.properties.sheet_id)
                    .ok_or_else(|| StoreError::SheetNotFound {
                        name: self.sheet_name.clone(),
                    })
            })
            .await
            .copied()
    }
}

fn build_client(config: &StoreConfig) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?)
}

#[async_trait]
impl JobStore for SheetsStore {
    fn name(&self) -> &str {
        "google-sheets"
    }

    async fn fetch_all(&self) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(&quote_sheet(&self.sheet_name));
        let resp = self.send(self.client.get(&url)).await?;
        let range: ValueRange = resp
            .json()
            .await
            .map_err(|e| StoreError::Parse(format!("values response: {e}")))?;

        let width = range.values.iter().map(Vec::len).max().unwrap_or(0);
        let rows = range
            .values
            .into_iter()
            .map(|row| {
                let mut cells: Vec<String> = row.iter().map(cell_to_string).collect();
                cells.resize(width, String::new());
                cells
            })
            .collect::<Vec<_>>();
        debug!(rows = rows.len(), width, "sheet fetched");
        Ok(rows)
    }

    async fn update_cell(&self, row: usize, column: usize, value: &str) -> Result<()> {
        let range = a1_cell(&self.sheet_name, row, column);
        let url = format!("{}?valueInputOption=RAW", self.values_url(&range));
        let body = serde_json::json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [[value]],
        });
        self.send(self.client.put(&url).json(&body)).await?;
        Ok(())
    }

    async fn delete_row(&self, row: usize) -> Result<()> {
        let sheet_id = self.sheet_id().await?;
        let url = format!("{}:batchUpdate", self.spreadsheet_url());
        let body = serde_json::json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": row,
                        "endIndex": row + 1,
                    }
                }
            }]
        });
        self.send(self.client.post(&url).json(&body)).await?;
        Ok(())
    }

    async fn append_row(&self, values: &[String]) -> Result<()> {
        let url = format!(
            "{}:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS",
            self.values_url(&quote_sheet(&self.sheet_name))
        );
        let body = serde_json::json!({
            "majorDimension": "ROWS",
            "values": [values],
        });
        self.send(self.client.post(&url).json(&body)).await?;
        Ok(())
    }
}

/// Sheet name quoted for A1 notation: `'My Sheet'`, with `'` doubled.
fn quote_sheet(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// 0-based column index to spreadsheet letters: 0 → A, 25 → Z, 26 → AA.
fn column_letters(column: usize) -> String {
    let mut n = column + 1;
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// A1 reference for a 0-based (row, column) position.
fn a1_cell(sheet: &str, row: usize, column: usize) -> String {
    format!("{}!{}{}", quote_sheet(sheet), column_letters(column), row + 1)
}

fn cell_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters_roll_over() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(7), "H");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn a1_cell_is_one_based() {
        // header row 0 is spreadsheet row 1
        assert_eq!(a1_cell("schedule", 0, 0), "'schedule'!A1");
        assert_eq!(a1_cell("schedule", 3, 7), "'schedule'!H4");
    }

    #[test]
    fn sheet_names_with_quotes_are_escaped() {
        assert_eq!(quote_sheet("Bob's posts"), "'Bob''s posts'");
    }

    #[test]
    fn non_string_cells_are_stringified() {
        assert_eq!(cell_to_string(&serde_json::json!("x")), "x");
        assert_eq!(cell_to_string(&serde_json::json!(42)), "42");
        assert_eq!(cell_to_string(&serde_json::json!(true)), "true");
        assert_eq!(cell_to_string(&serde_json::Value::Null), "");
    }
}
