// src/catalog/store/test_store.rs
// In-memory RowStore double for unit tests. Records every call so tests can
// assert exactly which store operations a flow issued.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use serde_json::Value;

use crate::catalog::definitions::{PatchRequest, Row, RowId, TableSnapshot};
use crate::catalog::error::{CatalogError, Result};

use super::RowStore;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StoreCall {
    FetchAll(u64),
    CreateRows(u64, usize),
    UpdateRows(u64, Vec<PatchRequest>),
    DeleteRows(u64, Vec<RowId>),
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    tables: RefCell<BTreeMap<u64, Vec<Row>>>,
    pub(crate) calls: RefCell<Vec<StoreCall>>,
    pub(crate) fail_fetches: Cell<bool>,
    pub(crate) fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub(crate) fn with_table(self, table_id: u64, rows: Vec<Row>) -> Self {
        self.tables.borrow_mut().insert(table_id, rows);
        self
    }

    pub(crate) fn rows(&self, table_id: u64) -> Vec<Row> {
        self.tables.borrow().get(&table_id).cloned().unwrap_or_default()
    }

    pub(crate) fn calls(&self) -> Vec<StoreCall> {
        self.calls.borrow().clone()
    }

    pub(crate) fn write_calls(&self) -> Vec<StoreCall> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| !matches!(call, StoreCall::FetchAll(_)))
            .cloned()
            .collect()
    }
}

impl RowStore for MemoryStore {
    fn fetch_all(&self, table_id: u64) -> Result<TableSnapshot> {
        self.calls.borrow_mut().push(StoreCall::FetchAll(table_id));
        if self.fail_fetches.get() {
            return Err(CatalogError::StoreUnavailable("simulated fetch failure".into()));
        }
        Ok(TableSnapshot::new(table_id, self.rows(table_id)))
    }

    fn create_rows(&self, table_id: u64, rows: &[BTreeMap<String, Value>]) -> Result<usize> {
        self.calls
            .borrow_mut()
            .push(StoreCall::CreateRows(table_id, rows.len()));
        if self.fail_writes.get() {
            return Err(CatalogError::StoreUnavailable("simulated write failure".into()));
        }
        let mut tables = self.tables.borrow_mut();
        let stored = tables.entry(table_id).or_default();
        let mut next_id = stored.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        for cells in rows {
            let mut row = Row::new(next_id);
            row.cells = cells.clone();
            stored.push(row);
            next_id += 1;
        }
        Ok(rows.len())
    }

    fn update_rows(&self, table_id: u64, patches: &[PatchRequest]) -> Result<usize> {
        self.calls
            .borrow_mut()
            .push(StoreCall::UpdateRows(table_id, patches.to_vec()));
        if self.fail_writes.get() {
            return Err(CatalogError::StoreUnavailable("simulated write failure".into()));
        }
        let mut tables = self.tables.borrow_mut();
        let stored = tables.entry(table_id).or_default();
        for patch in patches {
            if let Some(row) = stored.iter_mut().find(|r| r.id == patch.id) {
                for (column, value) in &patch.fields {
                    row.set_cell(column, value.clone());
                }
            }
        }
        Ok(patches.len())
    }

    fn delete_rows(&self, table_id: u64, ids: &[RowId]) -> Result<usize> {
        self.calls
            .borrow_mut()
            .push(StoreCall::DeleteRows(table_id, ids.to_vec()));
        if self.fail_writes.get() {
            return Err(CatalogError::StoreUnavailable("simulated write failure".into()));
        }
        let mut tables = self.tables.borrow_mut();
        let stored = tables.entry(table_id).or_default();
        stored.retain(|row| !ids.contains(&row.id));
        Ok(ids.len())
    }
}
