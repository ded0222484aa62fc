// src/catalog/snapshot.rs
//! Holds the two aligned copies of a table: the immutable original (the diff
//! baseline) and the user-editable working copy.

use chrono::{DateTime, Utc};
use tracing::info;

use super::definitions::{TableSnapshot, WorkingCopy};
use super::error::Result;
use super::store::RowStore;

/// Original/working snapshot pair for one table. The original is never
/// exposed for mutation; both copies are replaced wholesale on refresh.
#[derive(Debug)]
pub struct SnapshotManager {
    original: TableSnapshot,
    working: WorkingCopy,
}

impl SnapshotManager {
    /// Fetches once and clones into two independent copies. Every working
    /// row starts deselected.
    pub fn load(store: &dyn RowStore, table_id: u64) -> Result<Self> {
        let original = store.fetch_all(table_id)?;
        Ok(Self::from_snapshot(original))
    }

    /// Builds the pair from an already-materialized snapshot (the merged
    /// catalog path goes through here).
    pub fn from_snapshot(original: TableSnapshot) -> Self {
        let working = WorkingCopy::from_snapshot(&original);
        info!(
            "Snapshot pair ready for table {}: {} rows.",
            original.table_id,
            original.len()
        );
        Self { original, working }
    }

    pub fn table_id(&self) -> u64 {
        self.original.table_id
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.original.fetched_at
    }

    /// Read-only view of the diff baseline.
    pub fn original(&self) -> &TableSnapshot {
        &self.original
    }

    pub fn working(&self) -> &WorkingCopy {
        &self.working
    }

    pub fn working_mut(&mut self) -> &mut WorkingCopy {
        &mut self.working
    }

    /// Replaces both copies from a fresh snapshot, discarding every working
    /// edit and selection.
    pub fn replace(&mut self, fresh: TableSnapshot) {
        info!(
            "Refreshed table {}: {} rows; working edits discarded.",
            fresh.table_id,
            fresh.len()
        );
        self.working = WorkingCopy::from_snapshot(&fresh);
        self.original = fresh;
    }

    /// Refetch-and-replace against the same table.
    pub fn refresh(&mut self, store: &dyn RowStore) -> Result<()> {
        let fresh = store.fetch_all(self.table_id())?;
        self.replace(fresh);
        Ok(())
    }
}
