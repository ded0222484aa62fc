// src/catalog/store/mod.rs
//! Row-store access. `RowStore` is the CRUD contract the rest of the core
//! writes through; `BaserowClient` is the production implementation.

pub mod baserow;

#[cfg(test)]
pub(crate) mod test_store;

pub use baserow::BaserowClient;

use std::collections::BTreeMap;

use serde_json::Value;

use super::definitions::{PatchRequest, Row, RowId, TableSnapshot};
use super::error::Result;

/// Baserow's maximum page size; also used to chunk batch deletions.
pub const BATCH_SIZE: usize = 200;

/// CRUD contract against the remote row store.
///
/// Atomicity is deliberately asymmetric: `fetch_all` is all-or-nothing
/// because it feeds the diff baseline, while `delete_rows` may leave earlier
/// chunks applied after a mid-call failure. Deletion is already gated by an
/// explicit user confirmation, so partial progress beats silent full retry.
pub trait RowStore {
    /// Fetches every row of a table, in store-returned order. Any failure on
    /// any page aborts the whole fetch; no partial snapshot is returned.
    fn fetch_all(&self, table_id: u64) -> Result<TableSnapshot>;

    /// Batch create. Whole-call failure on any store error.
    fn create_rows(&self, table_id: u64, rows: &[BTreeMap<String, Value>]) -> Result<usize>;

    /// Batch update. Whole-call failure on any store error; the caller
    /// decides whether to retry.
    fn update_rows(&self, table_id: u64, patches: &[PatchRequest]) -> Result<usize>;

    /// Batch delete, chunked at [`BATCH_SIZE`]. Stops at the first failing
    /// chunk and reports overall failure; chunks already applied are not
    /// rolled back. Re-submitting already-deleted ids is accepted by the
    /// store, so a retry after partial failure is safe.
    fn delete_rows(&self, table_id: u64, ids: &[RowId]) -> Result<usize>;
}

/// One page of rows plus whether the store advertises a further page.
#[derive(Debug)]
pub struct RowsPage {
    pub rows: Vec<Row>,
    pub has_next: bool,
}

/// Drives the fetch-all page loop: page numbers start at 1, the loop stops
/// when the store signals no further page or returns an empty one, and the
/// first error aborts the whole collection.
pub fn collect_pages<F>(mut fetch_page: F) -> Result<Vec<Row>>
where
    F: FnMut(usize) -> Result<RowsPage>,
{
    let mut all_rows = Vec::new();
    let mut page = 1;
    loop {
        let fetched = fetch_page(page)?;
        let page_was_empty = fetched.rows.is_empty();
        all_rows.extend(fetched.rows);
        if !fetched.has_next || page_was_empty {
            break;
        }
        page += 1;
    }
    Ok(all_rows)
}
