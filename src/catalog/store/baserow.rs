// src/catalog/store/baserow.rs
//! Blocking HTTP client for the Baserow row API: paginated reads, batched
//! writes, and the compound-value flattening the diff engine depends on.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::catalog::definitions::{PatchRequest, Row, RowId, TableSnapshot, ID_COLUMN};
use crate::catalog::error::{CatalogError, Result};
use crate::config::DashboardConfig;

use super::{collect_pages, RowStore, RowsPage, BATCH_SIZE};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct BaserowClient {
    http: Client,
    base_url: String,
    api_token: String,
}

#[derive(Deserialize)]
struct RowsPageBody {
    results: Vec<Value>,
    next: Option<String>,
}

impl BaserowClient {
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        config.validate()?;
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url_trimmed().to_string(),
            api_token: config.api_token.clone(),
        })
    }

    fn rows_url(&self, table_id: u64) -> String {
        format!("{}/api/database/rows/table/{}/", self.base_url, table_id)
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.api_token)
    }

    fn fetch_page(&self, table_id: u64, page: usize) -> Result<RowsPage> {
        let url = format!(
            "{}?user_field_names=true&page={}&size={}",
            self.rows_url(table_id),
            page,
            BATCH_SIZE
        );
        debug!("GET page {} of table {}.", page, table_id);
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, self.auth_header())
            .send()?;
        if !response.status().is_success() {
            return Err(CatalogError::StoreUnavailable(format!(
                "GET rows for table {} failed on page {}: HTTP {}",
                table_id,
                page,
                response.status()
            )));
        }
        let body: RowsPageBody = response.json()?;
        let rows = body
            .results
            .into_iter()
            .map(parse_row)
            .collect::<Result<Vec<Row>>>()?;
        Ok(RowsPage {
            rows,
            has_next: body.next.is_some(),
        })
    }

    /// Sends one `{"items": [...]}` batch request and maps any failure to
    /// whole-call `StoreUnavailable`.
    fn send_batch(&self, method: reqwest::Method, url: &str, items: Value, what: &str) -> Result<()> {
        let response = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, self.auth_header())
            .json(&json!({ "items": items }))
            .send()?;
        if !response.status().is_success() {
            return Err(CatalogError::StoreUnavailable(format!(
                "{} failed: HTTP {}",
                what,
                response.status()
            )));
        }
        Ok(())
    }
}

impl RowStore for BaserowClient {
    fn fetch_all(&self, table_id: u64) -> Result<TableSnapshot> {
        info!("Fetching all rows for Baserow table {}.", table_id);
        let rows = collect_pages(|page| self.fetch_page(table_id, page))?;
        if rows.is_empty() {
            warn!("No data found in Baserow table {}.", table_id);
        } else {
            info!("Fetched {} rows from table {}.", rows.len(), table_id);
        }
        Ok(TableSnapshot::new(table_id, rows))
    }

    fn create_rows(&self, table_id: u64, rows: &[BTreeMap<String, Value>]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        let url = format!("{}batch/?user_field_names=true", self.rows_url(table_id));
        self.send_batch(
            reqwest::Method::POST,
            &url,
            serde_json::to_value(rows)
                .map_err(|e| CatalogError::StoreUnavailable(e.to_string()))?,
            &format!("Batch create of {} rows in table {}", rows.len(), table_id),
        )?;
        info!("Created {} rows in table {}.", rows.len(), table_id);
        Ok(rows.len())
    }

    fn update_rows(&self, table_id: u64, patches: &[PatchRequest]) -> Result<usize> {
        if patches.is_empty() {
            return Ok(0);
        }
        let url = format!("{}batch/?user_field_names=true", self.rows_url(table_id));
        self.send_batch(
            reqwest::Method::PATCH,
            &url,
            serde_json::to_value(patches)
                .map_err(|e| CatalogError::StoreUnavailable(e.to_string()))?,
            &format!("Batch update of {} rows in table {}", patches.len(), table_id),
        )?;
        info!("Updated {} rows in table {}.", patches.len(), table_id);
        Ok(patches.len())
    }

    fn delete_rows(&self, table_id: u64, ids: &[RowId]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let url = format!("{}batch-delete/", self.rows_url(table_id));
        let mut deleted = 0usize;
        for chunk in ids.chunks(BATCH_SIZE) {
            if let Err(err) = self.send_batch(
                reqwest::Method::POST,
                &url,
                json!(chunk),
                &format!("Batch delete of {} rows in table {}", chunk.len(), table_id),
            ) {
                warn!(
                    "Delete aborted after {} of {} ids; applied chunks are not rolled back.",
                    deleted,
                    ids.len()
                );
                return Err(err);
            }
            deleted += chunk.len();
        }
        info!("Deleted {} rows from table {}.", deleted, table_id);
        Ok(deleted)
    }
}

/// Builds a `Row` from one wire object: pulls out the integer id and
/// flattens every remaining cell.
fn parse_row(value: Value) -> Result<Row> {
    let Value::Object(map) = value else {
        return Err(CatalogError::StoreUnavailable(
            "Store returned a non-object row.".to_string(),
        ));
    };
    let mut row = None;
    let mut cells = BTreeMap::new();
    for (column, cell) in map {
        if column == ID_COLUMN {
            let id = cell.as_i64().ok_or_else(|| {
                CatalogError::StoreUnavailable(format!(
                    "Store returned a row with a non-integer id: {}",
                    cell
                ))
            })?;
            row = Some(Row::new(id));
        } else {
            cells.insert(column, flatten_cell(cell));
        }
    }
    let mut row = row.ok_or_else(|| {
        CatalogError::StoreUnavailable("Store returned a row without an id.".to_string())
    })?;
    row.cells = cells;
    Ok(row)
}

/// Unwraps Baserow's compound cell formats. Selected-option objects arrive
/// as `{"id": .., "value": ..}` and become their scalar value; linked-row
/// lists arrive as lists of such objects and become lists of scalars.
/// Everything else passes through untouched.
fn flatten_cell(value: Value) -> Value {
    match value {
        Value::Object(mut map) => match map.remove("value") {
            Some(inner) => inner,
            None => Value::Object(map),
        },
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(mut map) => match map.remove("value") {
                        Some(inner) => inner,
                        None => Value::Object(map),
                    },
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}
