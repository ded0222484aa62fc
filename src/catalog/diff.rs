// src/catalog/diff.rs
//! The reconciliation engine: computes the minimal per-row, per-column
//! change set between the working copy and the original snapshot, and
//! packages it into store-patch requests.
//!
//! The comparison is aligned by row id, so neither display sort order nor
//! physical row order affects the result. Rows present on only one side are
//! a hard error: the editor path does not create or delete rows, so an id
//! mismatch means the baseline is stale and silently skipping would drop
//! user edits.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::{debug, info};

use super::definitions::{ChangeSet, PatchRequest, TableSnapshot, WorkingCopy};
use super::error::{CatalogError, Result};

/// Absent columns and explicit JSON nulls are the same thing on the wire,
/// so they compare equal here; anything else is value equality.
fn cells_differ(before: Option<&Value>, after: Option<&Value>) -> bool {
    let before = before.filter(|v| !v.is_null());
    let after = after.filter(|v| !v.is_null());
    before != after
}

/// Computes one change set per row whose working cells differ from the
/// original, emitted in ascending id order. Selection flags live outside the
/// row cells and can never appear. An empty result means "nothing to save".
pub fn compute_change_sets(
    original: &TableSnapshot,
    working: &WorkingCopy,
) -> Result<Vec<ChangeSet>> {
    let original_by_id = original.index_by_id();
    let working_by_id = working.index_by_id();

    let missing_from_working: Vec<_> = original_by_id
        .keys()
        .filter(|id| !working_by_id.contains_key(id))
        .copied()
        .collect();
    let missing_from_original: Vec<_> = working_by_id
        .keys()
        .filter(|id| !original_by_id.contains_key(id))
        .copied()
        .collect();
    if !missing_from_working.is_empty() || !missing_from_original.is_empty() {
        return Err(CatalogError::AlignmentMismatch {
            missing_from_original,
            missing_from_working,
        });
    }

    let mut change_sets = Vec::new();
    // BTreeMap iteration gives the ascending-id emission order.
    for (id, original_row) in &original_by_id {
        let working_row = working_by_id[id];
        let columns: BTreeSet<&String> = original_row
            .cells
            .keys()
            .chain(working_row.cells.keys())
            .collect();

        let mut changes = BTreeMap::new();
        for column in columns {
            let before = original_row.cell(column);
            let after = working_row.cell(column);
            if cells_differ(before, after) {
                changes.insert(
                    column.clone(),
                    after.cloned().unwrap_or(Value::Null),
                );
            }
        }
        if !changes.is_empty() {
            debug!("Row {}: {} changed column(s).", id, changes.len());
            change_sets.push(ChangeSet { id: *id, changes });
        }
    }

    info!(
        "Diff over {} row(s): {} change set(s).",
        original.len(),
        change_sets.len()
    );
    Ok(change_sets)
}

/// Direct 1:1 mapping; each change set becomes one patch request carrying
/// the id plus its changed columns.
pub fn to_patch_requests(change_sets: Vec<ChangeSet>) -> Vec<PatchRequest> {
    change_sets
        .into_iter()
        .map(|cs| PatchRequest {
            id: cs.id,
            fields: cs.changes,
        })
        .collect()
}

/// Correctness gate for the merged catalog: edits to columns contributed by
/// the secondary table must be rejected before any write is attempted.
pub fn ensure_writable(change_sets: &[ChangeSet], read_only: &BTreeSet<String>) -> Result<()> {
    for change_set in change_sets {
        for column in change_set.changes.keys() {
            if read_only.contains(column) {
                return Err(CatalogError::ReadOnlyColumn(column.clone()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::definitions::Row;
    use serde_json::json;

    fn snapshot(rows: Vec<Row>) -> TableSnapshot {
        TableSnapshot::new(1, rows)
    }

    fn catalog_rows() -> Vec<Row> {
        vec![
            Row::new(1)
                .with_cell("Status", json!("Active"))
                .with_cell("Panel", json!("Amazon")),
            Row::new(2)
                .with_cell("Status", json!("Deleted"))
                .with_cell("Panel", json!("Flipkart")),
            Row::new(3)
                .with_cell("Status", json!("Active"))
                .with_cell("Panel", json!("Meesho")),
        ]
    }

    #[test]
    fn identical_snapshots_produce_no_change_sets() {
        let original = snapshot(catalog_rows());
        let working = WorkingCopy::from_snapshot(&original);
        assert!(compute_change_sets(&original, &working).unwrap().is_empty());
    }

    #[test]
    fn one_changed_value_yields_exactly_that_column() {
        let original = snapshot(catalog_rows());
        let mut working = WorkingCopy::from_snapshot(&original);
        working.set_cell(2, "Status", json!("Active"));

        let change_sets = compute_change_sets(&original, &working).unwrap();
        assert_eq!(change_sets.len(), 1);
        assert_eq!(change_sets[0].id, 2);
        assert_eq!(
            change_sets[0].changes,
            BTreeMap::from([("Status".to_string(), json!("Active"))])
        );
    }

    #[test]
    fn row_order_does_not_affect_content() {
        let original = snapshot(catalog_rows());
        let mut shuffled = catalog_rows();
        shuffled.reverse();
        let mut working = WorkingCopy::from_snapshot(&snapshot(shuffled));
        working.set_cell(1, "Panel", json!("Myntra"));
        working.set_cell(3, "Status", json!("Deleted"));

        let change_sets = compute_change_sets(&original, &working).unwrap();
        // Emission is ascending by id regardless of either side's row order.
        let ids: Vec<i64> = change_sets.iter().map(|cs| cs.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn selection_flags_never_appear() {
        let original = snapshot(catalog_rows());
        let mut working = WorkingCopy::from_snapshot(&original);
        working.set_selected(1, true);
        working.set_selected(2, true);
        working.set_cell(1, "Status", json!("Deleted"));

        let patches = to_patch_requests(compute_change_sets(&original, &working).unwrap());
        for patch in &patches {
            assert!(!patch.fields.contains_key("selected"));
            assert!(!patch.fields.contains_key("_selected"));
        }
        assert_eq!(patches.len(), 1);
    }

    #[test]
    fn status_edit_becomes_the_expected_patch() {
        let original = snapshot(vec![Row::new(1).with_cell("Status", json!("Active"))]);
        let mut working = WorkingCopy::from_snapshot(&original);
        working.set_cell(1, "Status", json!("Deleted"));

        let patches = to_patch_requests(compute_change_sets(&original, &working).unwrap());
        assert_eq!(
            serde_json::to_value(&patches).unwrap(),
            json!([{"id": 1, "Status": "Deleted"}])
        );
    }

    #[test]
    fn id_set_divergence_is_a_hard_error() {
        let original = snapshot(catalog_rows());
        let mut fewer = catalog_rows();
        fewer.remove(1);
        fewer.push(Row::new(9).with_cell("Status", json!("Active")));
        let working = WorkingCopy::from_snapshot(&snapshot(fewer));

        match compute_change_sets(&original, &working) {
            Err(CatalogError::AlignmentMismatch {
                missing_from_original,
                missing_from_working,
            }) => {
                assert_eq!(missing_from_original, vec![9]);
                assert_eq!(missing_from_working, vec![2]);
            }
            other => panic!("expected AlignmentMismatch, got {:?}", other),
        }
    }

    #[test]
    fn absent_and_null_compare_equal() {
        let original = snapshot(vec![Row::new(1)
            .with_cell("Asin", json!(null))
            .with_cell("Status", json!("Active"))]);
        let mut working = WorkingCopy::from_snapshot(&original);
        // Dropping a null column entirely is not a change.
        working
            .rows
            .iter_mut()
            .for_each(|wr| {
                wr.row.cells.remove("Asin");
            });
        assert!(compute_change_sets(&original, &working).unwrap().is_empty());

        // A column absent from the original but set in working is a change.
        working.set_cell(1, "Msku", json!("M-1"));
        let change_sets = compute_change_sets(&original, &working).unwrap();
        assert_eq!(
            change_sets[0].changes,
            BTreeMap::from([("Msku".to_string(), json!("M-1"))])
        );
    }

    #[test]
    fn read_only_columns_block_the_save() {
        let change_sets = vec![ChangeSet {
            id: 1,
            changes: BTreeMap::from([("Asin".to_string(), json!("B00TEST"))]),
        }];
        let read_only = BTreeSet::from(["Asin".to_string()]);
        match ensure_writable(&change_sets, &read_only) {
            Err(CatalogError::ReadOnlyColumn(column)) => assert_eq!(column, "Asin"),
            other => panic!("expected ReadOnlyColumn, got {:?}", other),
        }
        assert!(ensure_writable(&[], &read_only).is_ok());
    }
}
