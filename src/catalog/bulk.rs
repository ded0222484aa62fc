// src/catalog/bulk.rs
//! Bulk mutation: uniform field updates over an explicit id selection, and
//! the confirm/cancel state machine guarding bulk deletion.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{info, warn};

use super::definitions::{PatchRequest, RowId, ID_COLUMN};
use super::error::{CatalogError, Result};
use super::store::RowStore;

/// Guarded-deletion states. The id list is captured at intent time and is
/// never recomputed; a stale prompt must never authorize deletion of a
/// selection that no longer reflects current data, which is why any forced
/// refresh resets this to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeleteConfirmState {
    #[default]
    Idle,
    PendingConfirm {
        ids: Vec<RowId>,
    },
}

#[derive(Debug, Default)]
pub struct BulkCoordinator {
    state: DeleteConfirmState,
}

impl BulkCoordinator {
    pub fn state(&self) -> &DeleteConfirmState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DeleteConfirmState::PendingConfirm { .. })
    }

    /// `Idle -> PendingConfirm`, capturing the selection. A delete intent
    /// with an empty selection is refused.
    pub fn request_delete(&mut self, ids: Vec<RowId>) -> bool {
        if ids.is_empty() {
            warn!("Delete intent with empty selection ignored.");
            return false;
        }
        info!("Delete intent captured for {} row(s); awaiting confirmation.", ids.len());
        self.state = DeleteConfirmState::PendingConfirm { ids };
        true
    }

    /// Explicit cancellation: `PendingConfirm -> Idle`, store untouched.
    pub fn cancel(&mut self) {
        if self.is_pending() {
            info!("Bulk deletion cancelled.");
        }
        self.state = DeleteConfirmState::Idle;
    }

    /// Unconditional reset, invoked by every forced refresh.
    pub fn reset(&mut self) {
        self.state = DeleteConfirmState::Idle;
    }

    /// Explicit affirmative confirmation. Issues exactly one store delete
    /// for the captured ids and returns to `Idle` whatever happens, so a
    /// failed call can never be re-confirmed against stale ids. Confirming
    /// while `Idle` does nothing.
    pub fn confirm(&mut self, store: &dyn RowStore, table_id: u64) -> Result<Option<usize>> {
        let ids = match std::mem::take(&mut self.state) {
            DeleteConfirmState::PendingConfirm { ids } => ids,
            DeleteConfirmState::Idle => {
                warn!("Confirm received with no pending deletion; ignoring.");
                return Ok(None);
            }
        };
        let deleted = store.delete_rows(table_id, &ids)?;
        info!("Bulk deletion confirmed: {} row(s) removed.", deleted);
        Ok(Some(deleted))
    }

    /// Uniform-field update: one single-column patch per selected id,
    /// submitted as one batch. An empty selection is a no-op. The identity
    /// column is refused outright: a patch carrying `id` as a field would
    /// duplicate the key on the wire and could retarget the row.
    pub fn apply_uniform(
        store: &dyn RowStore,
        table_id: u64,
        ids: &[RowId],
        column: &str,
        value: Value,
    ) -> Result<usize> {
        if column == ID_COLUMN {
            return Err(CatalogError::ReadOnlyColumn(ID_COLUMN.to_string()));
        }
        if ids.is_empty() {
            warn!("Uniform update of '{}' with empty selection ignored.", column);
            return Ok(0);
        }
        let patches: Vec<PatchRequest> = ids
            .iter()
            .map(|id| PatchRequest {
                id: *id,
                fields: BTreeMap::from([(column.to_string(), value.clone())]),
            })
            .collect();
        let updated = store.update_rows(table_id, &patches)?;
        info!("Uniform update applied: '{}' set on {} row(s).", column, updated);
        Ok(updated)
    }
}
