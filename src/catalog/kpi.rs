// src/catalog/kpi.rs
//! Catalog-at-a-glance counters and the read-only explorer helpers backing
//! the dashboard pages: KPI tiles, per-column value counts for the charts,
//! and the SKU/MSKU/ASIN search.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::definitions::{Row, TableSnapshot};

pub const MSKU_COLUMN: &str = "Msku";
pub const STATUS_COLUMN: &str = "Status";
pub const PANEL_COLUMN: &str = "Panel";

/// Replacement label for blank or missing statuses.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Columns the search box matches against.
const SEARCH_COLUMNS: [&str; 3] = ["Sku", MSKU_COLUMN, "Asin"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogKpis {
    pub total_mskus: usize,
    pub total_listings: usize,
    pub active_listings: usize,
    pub panels_connected: usize,
}

/// Normalizes blank or absent `Status` cells to [`UNCATEGORIZED`] in place.
pub fn normalize_status(snapshot: &mut TableSnapshot) {
    for row in &mut snapshot.rows {
        let blank = match row.cell_text(STATUS_COLUMN) {
            None => true,
            Some(text) => text.trim().is_empty(),
        };
        if blank {
            row.set_cell(STATUS_COLUMN, UNCATEGORIZED.into());
        }
    }
}

pub fn compute(snapshot: &TableSnapshot) -> CatalogKpis {
    let mut mskus = BTreeSet::new();
    let mut panels = BTreeSet::new();
    let mut active = 0usize;
    for row in &snapshot.rows {
        if let Some(msku) = row.cell_text(MSKU_COLUMN) {
            mskus.insert(msku);
        }
        if let Some(panel) = row.cell_text(PANEL_COLUMN) {
            panels.insert(panel);
        }
        let is_active = row
            .cell_text(STATUS_COLUMN)
            .map(|s| s.eq_ignore_ascii_case("active"))
            .unwrap_or(false);
        if is_active {
            active += 1;
        }
    }
    CatalogKpis {
        total_mskus: mskus.len(),
        total_listings: snapshot.len(),
        active_listings: active,
        panels_connected: panels.len(),
    }
}

/// Distinct values of one column with their row counts, for the
/// listings-per-platform and status-overview charts.
pub fn value_counts(snapshot: &TableSnapshot, column: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for row in &snapshot.rows {
        if let Some(text) = row.cell_text(column) {
            *counts.entry(text).or_insert(0) += 1;
        }
    }
    counts
}

/// Case-insensitive substring search over the Sku/Msku/Asin columns.
pub fn search<'a>(snapshot: &'a TableSnapshot, term: &str) -> Vec<&'a Row> {
    let needle = term.to_lowercase();
    snapshot
        .rows
        .iter()
        .filter(|row| {
            SEARCH_COLUMNS.iter().any(|column| {
                row.cell_text(column)
                    .map(|text| text.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> TableSnapshot {
        TableSnapshot::new(
            101,
            vec![
                Row::new(1)
                    .with_cell("Sku", json!("AMZ-1"))
                    .with_cell(MSKU_COLUMN, json!("M-1"))
                    .with_cell(PANEL_COLUMN, json!("Amazon"))
                    .with_cell(STATUS_COLUMN, json!("Active")),
                Row::new(2)
                    .with_cell("Sku", json!("FLP-1"))
                    .with_cell(MSKU_COLUMN, json!("M-1"))
                    .with_cell(PANEL_COLUMN, json!("Flipkart"))
                    .with_cell(STATUS_COLUMN, json!("ACTIVE")),
                Row::new(3)
                    .with_cell("Sku", json!("AMZ-2"))
                    .with_cell(MSKU_COLUMN, json!("M-2"))
                    .with_cell(PANEL_COLUMN, json!("Amazon"))
                    .with_cell(STATUS_COLUMN, json!("  "))
                    .with_cell("Asin", json!("B00XYZ")),
            ],
        )
    }

    #[test]
    fn kpis_count_distinct_mskus_and_panels() {
        let kpis = compute(&catalog());
        assert_eq!(
            kpis,
            CatalogKpis {
                total_mskus: 2,
                total_listings: 3,
                active_listings: 2,
                panels_connected: 2,
            }
        );
    }

    #[test]
    fn blank_statuses_normalize_to_uncategorized() {
        let mut snapshot = catalog();
        normalize_status(&mut snapshot);
        assert_eq!(
            snapshot.rows[2].cell(STATUS_COLUMN),
            Some(&json!(UNCATEGORIZED))
        );
        // Non-blank statuses are left alone.
        assert_eq!(snapshot.rows[0].cell(STATUS_COLUMN), Some(&json!("Active")));
    }

    #[test]
    fn value_counts_back_the_platform_chart() {
        let counts = value_counts(&catalog(), PANEL_COLUMN);
        assert_eq!(
            counts,
            BTreeMap::from([("Amazon".to_string(), 2), ("Flipkart".to_string(), 1)])
        );
    }

    #[test]
    fn search_is_case_insensitive_and_spans_asin() {
        let snapshot = catalog();
        let by_sku = search(&snapshot, "amz");
        assert_eq!(by_sku.len(), 2);
        let by_asin = search(&snapshot, "b00xyz");
        assert_eq!(by_asin.len(), 1);
        assert_eq!(by_asin[0].id, 3);
        assert!(search(&snapshot, "nothing").is_empty());
    }
}
