//! Remote spreadsheet values-API backend.
//!
//! Speaks the Google Sheets v4 values surface: range GET, `:append` POST,
//! range PUT, and `batchUpdate` with delete-dimension requests. The document
//! has no row identity; deletes address grid rows by index, which is why the
//! higher layers re-resolve indices immediately before every mutation.

use crate::error::{RowStoreError, RowStoreResult};
use crate::traits::{RowRange, RowStore};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::instrument;

/// Rightmost column addressed by generated A1 ranges. Wide enough for every
/// table in the wire contract.
const LAST_COLUMN: &str = "ZZ";

/// Remote spreadsheet row store.
pub struct SheetsBackend {
    http: reqwest::Client,
    base_url: Url,
    spreadsheet_id: String,
    token: Option<String>,
    timeout: Duration,
    /// Tab title -> numeric sheet id, needed for delete-dimension requests.
    sheet_ids: RwLock<HashMap<String, i64>>,
}

impl SheetsBackend {
    /// Create a new sheets backend.
    pub fn new(
        base_url: &str,
        spreadsheet_id: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> RowStoreResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| RowStoreError::Config(format!("invalid base URL: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RowStoreError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            spreadsheet_id: spreadsheet_id.to_string(),
            token,
            timeout,
            sheet_ids: RwLock::new(HashMap::new()),
        })
    }

    fn url(&self, path: &str) -> RowStoreResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| RowStoreError::Config(format!("failed to build API URL: {e}")))
    }

    fn values_url(&self, range: &str, suffix: &str) -> RowStoreResult<Url> {
        self.url(&format!(
            "v4/spreadsheets/{}/values/{range}{suffix}",
            self.spreadsheet_id
        ))
    }

    /// A1 notation for a row range. Data row 0 lives on grid row 2; grid row
    /// 1 is the header.
    fn a1(table: &str, range: RowRange) -> String {
        match range {
            RowRange::Header => format!("{table}!1:1"),
            RowRange::All => format!("{table}!A2:{LAST_COLUMN}"),
            RowRange::Slice { start, count } => {
                let first = start + 2;
                let last = start + count + 1;
                format!("{table}!A{first}:{LAST_COLUMN}{last}")
            }
        }
    }

    fn map_transport(&self, err: reqwest::Error) -> RowStoreError {
        if err.is_timeout() {
            RowStoreError::Timeout(self.timeout)
        } else {
            RowStoreError::Backend(err.to_string())
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> RowStoreResult<String> {
        let req = match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        };
        let response = req.send().await.map_err(|e| self.map_transport(e))?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(RowStoreError::Status {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(body)
    }

    async fn send_json<T: for<'de> Deserialize<'de>>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> RowStoreResult<T> {
        let body = self.send(req).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Resolve the numeric sheet id for a tab title, caching the result.
    async fn sheet_id(&self, table: &str) -> RowStoreResult<i64> {
        if let Some(id) = self.sheet_ids.read().await.get(table) {
            return Ok(*id);
        }

        let url = self.url(&format!(
            "v4/spreadsheets/{}?fields=sheets.properties",
            self.spreadsheet_id
        ))?;
        let meta: SpreadsheetMeta = self.send_json(self.http.get(url)).await?;

        let mut ids = self.sheet_ids.write().await;
        for sheet in meta.sheets {
            ids.insert(sheet.properties.title, sheet.properties.sheet_id);
        }
        ids.get(table).copied().ok_or_else(|| {
            RowStoreError::InvalidRange(format!("no sheet named {table} in spreadsheet"))
        })
    }

    /// Add a missing tab to the document.
    async fn add_sheet(&self, table: &str) -> RowStoreResult<()> {
        let url = self.url(&format!(
            "v4/spreadsheets/{}:batchUpdate",
            self.spreadsheet_id
        ))?;
        let body = json!({
            "requests": [{ "addSheet": { "properties": { "title": table } } }]
        });
        self.send(self.http.post(url).json(&body)).await?;
        // The new tab gets a fresh id; drop any stale cache entry.
        self.sheet_ids.write().await.remove(table);
        Ok(())
    }

    async fn write_header(&self, table: &str, header: &[&str]) -> RowStoreResult<()> {
        let range = Self::a1(table, RowRange::Header);
        let url = self.values_url(&range, "?valueInputOption=RAW")?;
        let body = json!({ "range": range, "values": [header] });
        self.send(self.http.put(url).json(&body)).await?;
        Ok(())
    }
}

#[async_trait]
impl RowStore for SheetsBackend {
    #[instrument(skip(self))]
    async fn read_range(&self, table: &str, range: RowRange) -> RowStoreResult<Vec<Vec<String>>> {
        let url = self.values_url(&Self::a1(table, range), "")?;
        let response: ValuesResponse = self.send_json(self.http.get(url)).await?;
        Ok(response.values)
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn append_rows(&self, table: &str, rows: Vec<Vec<String>>) -> RowStoreResult<()> {
        let range = Self::a1(table, RowRange::All);
        let url = self.values_url(
            &range,
            ":append?valueInputOption=RAW&insertDataOption=INSERT_ROWS",
        )?;
        let body = json!({ "values": rows });

        // A transport failure or timeout here may have landed the rows; the
        // caller must not replay blindly.
        match self.send(self.http.post(url).json(&body)).await {
            Ok(_) => Ok(()),
            Err(err @ (RowStoreError::Backend(_) | RowStoreError::Timeout(_))) => {
                Err(RowStoreError::AppendOutcomeUnknown(err.to_string()))
            }
            Err(err) => Err(err),
        }
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn update_row_range(
        &self,
        table: &str,
        row_index: usize,
        rows: Vec<Vec<String>>,
    ) -> RowStoreResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let range = Self::a1(
            table,
            RowRange::Slice {
                start: row_index,
                count: rows.len(),
            },
        );
        let url = self.values_url(&range, "?valueInputOption=RAW")?;
        let body = json!({ "range": range, "values": rows });
        self.send(self.http.put(url).json(&body)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_row_range(
        &self,
        table: &str,
        start_index: usize,
        count: usize,
    ) -> RowStoreResult<()> {
        if count == 0 {
            return Ok(());
        }
        let sheet_id = self.sheet_id(table).await?;
        let url = self.url(&format!(
            "v4/spreadsheets/{}:batchUpdate",
            self.spreadsheet_id
        ))?;
        // Grid indices include the header row.
        let body = json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": start_index + 1,
                        "endIndex": start_index + 1 + count,
                    }
                }
            }]
        });
        self.send(self.http.post(url).json(&body)).await?;
        Ok(())
    }

    async fn ensure_header(&self, table: &str, header: &[&str]) -> RowStoreResult<()> {
        let found = match self.read_range(table, RowRange::Header).await {
            Ok(rows) => rows,
            // A 400 on a range read means the tab does not exist yet.
            Err(RowStoreError::Status { status: 400, .. }) => {
                self.add_sheet(table).await?;
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        match found.into_iter().next() {
            None => self.write_header(table, header).await,
            Some(found) => {
                if found.iter().map(String::as_str).eq(header.iter().copied()) {
                    Ok(())
                } else {
                    Err(RowStoreError::HeaderMismatch {
                        table: table.to_string(),
                        expected: header.iter().map(|c| c.to_string()).collect(),
                        found,
                    })
                }
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "sheets"
    }

    async fn health_check(&self) -> RowStoreResult<()> {
        let url = self.url(&format!(
            "v4/spreadsheets/{}?fields=spreadsheetId",
            self.spreadsheet_id
        ))?;
        self.send(self.http.get(url)).await.map(|_| ())
    }
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetInfo>,
}

#[derive(Debug, Deserialize)]
struct SheetInfo {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    #[serde(rename = "sheetId")]
    sheet_id: i64,
    title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a1_header_range() {
        assert_eq!(SheetsBackend::a1("Inventory", RowRange::Header), "Inventory!1:1");
    }

    #[test]
    fn test_a1_all_rows_skips_header() {
        assert_eq!(SheetsBackend::a1("Brands", RowRange::All), "Brands!A2:ZZ");
    }

    #[test]
    fn test_a1_slice_is_one_based_and_header_offset() {
        // Data rows 3..5 live on grid rows 5..7.
        let range = SheetsBackend::a1("Inventory", RowRange::Slice { start: 3, count: 2 });
        assert_eq!(range, "Inventory!A5:ZZ6");
    }
}
