// src/catalog/definitions.rs
//! Core data model: rows, snapshots, the working copy, and the change-set /
//! patch-request pair produced by the diff engine.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Store-assigned identity column. Immutable, unique across the table,
/// never reused, never user-editable.
pub const ID_COLUMN: &str = "id";

/// Baserow's internal ordering column. Carried through fetches like any
/// other cell, hidden from editors by the presentation layer.
pub const ORDER_COLUMN: &str = "order";

pub type RowId = i64;

/// One table row. Cells hold flattened scalars (or lists of scalars) only;
/// the store client unwraps compound values before a `Row` is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    #[serde(flatten)]
    pub cells: BTreeMap<String, Value>,
}

impl Row {
    pub fn new(id: RowId) -> Self {
        Self {
            id,
            cells: BTreeMap::new(),
        }
    }

    pub fn with_cell(mut self, column: &str, value: Value) -> Self {
        self.cells.insert(column.to_string(), value);
        self
    }

    pub fn cell(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    pub fn set_cell(&mut self, column: &str, value: Value) {
        self.cells.insert(column.to_string(), value);
    }

    /// Cell as display text. Strings come back as-is, other scalars via
    /// their JSON rendering, null/absent as `None`.
    pub fn cell_text(&self, column: &str) -> Option<String> {
        match self.cell(column) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

/// Point-in-time, fully materialized copy of a table, in store-returned
/// order. Two snapshots of the same table are comparable only by row id.
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    pub table_id: u64,
    pub rows: Vec<Row>,
    pub fetched_at: DateTime<Utc>,
}

impl TableSnapshot {
    pub fn new(table_id: u64, rows: Vec<Row>) -> Self {
        Self {
            table_id,
            rows,
            fetched_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn index_by_id(&self) -> BTreeMap<RowId, &Row> {
        self.rows.iter().map(|row| (row.id, row)).collect()
    }
}

/// One working-copy row plus its selection flag. The flag is editor-local
/// metadata: never persisted to the store and never diffed.
#[derive(Debug, Clone)]
pub struct WorkingRow {
    pub selected: bool,
    pub row: Row,
}

/// The user-editable copy of a snapshot. Created together with the original
/// on load; discarded unconditionally by any forced refresh.
#[derive(Debug, Clone)]
pub struct WorkingCopy {
    pub table_id: u64,
    pub rows: Vec<WorkingRow>,
}

impl WorkingCopy {
    /// Clones a snapshot into an editable copy with every row deselected.
    pub fn from_snapshot(snapshot: &TableSnapshot) -> Self {
        Self {
            table_id: snapshot.table_id,
            rows: snapshot
                .rows
                .iter()
                .map(|row| WorkingRow {
                    selected: false,
                    row: row.clone(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|wr| wr.row.id == id).map(|wr| &wr.row)
    }

    /// Applies a free-form cell edit. The identity column is not editable.
    /// Returns false when nothing was changed.
    pub fn set_cell(&mut self, id: RowId, column: &str, value: Value) -> bool {
        if column == ID_COLUMN {
            warn!("Ignoring edit to identity column on row {}.", id);
            return false;
        }
        match self.rows.iter_mut().find(|wr| wr.row.id == id) {
            Some(wr) => {
                wr.row.set_cell(column, value);
                true
            }
            None => {
                warn!("Cannot edit row {}: not present in working copy.", id);
                false
            }
        }
    }

    pub fn set_selected(&mut self, id: RowId, selected: bool) -> bool {
        match self.rows.iter_mut().find(|wr| wr.row.id == id) {
            Some(wr) => {
                wr.selected = selected;
                true
            }
            None => false,
        }
    }

    /// Row ids currently flagged by the user, in display order.
    pub fn selected_ids(&self) -> Vec<RowId> {
        self.rows
            .iter()
            .filter(|wr| wr.selected)
            .map(|wr| wr.row.id)
            .collect()
    }

    pub fn index_by_id(&self) -> BTreeMap<RowId, &Row> {
        self.rows.iter().map(|wr| (wr.row.id, &wr.row)).collect()
    }
}

/// Column-level differences for one row id between working and original.
/// A change set with zero pairs is never emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet {
    pub id: RowId,
    pub changes: BTreeMap<String, Value>,
}

/// Wire unit for one row's update, keyed by id. Serializes flat:
/// `{"id": 7, "Status": "Active"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatchRequest {
    pub id: RowId,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}
