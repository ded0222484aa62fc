// src/catalog/session.rs
//! One editor session over the merged catalog: composes the snapshot pair
//! with the bulk coordinator and wires every write path through a forced
//! refresh, so no stale snapshot can ever serve as the next diff baseline.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{info, warn};

use super::bulk::{BulkCoordinator, DeleteConfirmState};
use super::definitions::{RowId, TableSnapshot, WorkingCopy};
use super::diff;
use super::error::Result;
use super::merge;
use super::snapshot::SnapshotManager;
use super::store::RowStore;
use crate::config::DashboardConfig;

/// Distinguishes "nothing to save" from a successful write; a failed write
/// is an `Err` from [`EditorSession::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    NoChanges,
    Saved(usize),
}

pub struct EditorSession {
    config: DashboardConfig,
    read_only_columns: BTreeSet<String>,
    manager: SnapshotManager,
    coordinator: BulkCoordinator,
}

impl EditorSession {
    /// Loads the merged catalog and sets up a fresh original/working pair.
    pub fn load(store: &dyn RowStore, config: DashboardConfig) -> Result<Self> {
        let catalog = merge::load_catalog(store, &config)?;
        Ok(Self {
            config,
            read_only_columns: merge::secondary_columns(),
            manager: SnapshotManager::from_snapshot(catalog),
            coordinator: BulkCoordinator::default(),
        })
    }

    /// The single recovery path after both successful and failed writes:
    /// clears any pending confirmation, refetches, and discards every
    /// working edit. The state reset happens first so a fetch failure still
    /// leaves no stale confirmation behind.
    pub fn force_refresh(&mut self, store: &dyn RowStore) -> Result<()> {
        self.coordinator.reset();
        let catalog = merge::load_catalog(store, &self.config)?;
        self.manager.replace(catalog);
        Ok(())
    }

    /// The only table the editor ever writes to.
    fn write_table_id(&self) -> u64 {
        self.config.all_skus_table_id
    }

    pub fn original(&self) -> &TableSnapshot {
        self.manager.original()
    }

    pub fn working(&self) -> &WorkingCopy {
        self.manager.working()
    }

    pub fn working_mut(&mut self) -> &mut WorkingCopy {
        self.manager.working_mut()
    }

    pub fn delete_state(&self) -> &DeleteConfirmState {
        self.coordinator.state()
    }

    /// Diffs working against original and patches the primary table.
    /// Alignment mismatches and read-only-column edits abort before any
    /// write; an empty diff issues no store call at all.
    pub fn save(&mut self, store: &dyn RowStore) -> Result<SaveOutcome> {
        let change_sets = diff::compute_change_sets(self.manager.original(), self.manager.working())?;
        if change_sets.is_empty() {
            info!("Nothing to save: working copy matches the original.");
            return Ok(SaveOutcome::NoChanges);
        }
        diff::ensure_writable(&change_sets, &self.read_only_columns)?;
        let patches = diff::to_patch_requests(change_sets);
        let updated = store.update_rows(self.write_table_id(), &patches)?;
        info!("Saved {} changed record(s).", updated);
        self.force_refresh(store)?;
        Ok(SaveOutcome::Saved(updated))
    }

    /// Applies one `(column, value)` pair to an explicit id selection, then
    /// refreshes. The column must belong to the primary table.
    pub fn apply_uniform_update(
        &mut self,
        store: &dyn RowStore,
        ids: &[RowId],
        column: &str,
        value: Value,
    ) -> Result<usize> {
        if self.read_only_columns.contains(column) {
            return Err(super::error::CatalogError::ReadOnlyColumn(column.to_string()));
        }
        let updated =
            BulkCoordinator::apply_uniform(store, self.write_table_id(), ids, column, value)?;
        if updated > 0 {
            self.force_refresh(store)?;
        }
        Ok(updated)
    }

    /// Delete intent for an explicit id list, captured as-is.
    pub fn request_delete(&mut self, ids: Vec<RowId>) -> bool {
        self.coordinator.request_delete(ids)
    }

    /// Delete intent for whatever the user currently has selected.
    pub fn request_delete_selected(&mut self) -> bool {
        let ids = self.manager.working().selected_ids();
        self.request_delete(ids)
    }

    pub fn cancel_delete(&mut self) {
        self.coordinator.cancel();
    }

    /// Confirms a pending deletion and refreshes on success. Returns `None`
    /// when no deletion was pending (for example after a refresh reset the
    /// confirmation).
    pub fn confirm_delete(&mut self, store: &dyn RowStore) -> Result<Option<usize>> {
        match self.coordinator.confirm(store, self.write_table_id())? {
            Some(deleted) => {
                self.force_refresh(store)?;
                Ok(Some(deleted))
            }
            None => {
                warn!("No pending deletion to confirm.");
                Ok(None)
            }
        }
    }
}
