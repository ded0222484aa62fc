// src/catalog/merge.rs
//! Assembles the unified catalog: the SKU table left-joined with ASIN data
//! from the Amazon listings table. Columns contributed by the secondary
//! table are read-only in the editor path; the SKU table is the only write
//! target.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;
use tracing::{info, warn};

use super::definitions::TableSnapshot;
use super::error::Result;
use super::store::RowStore;
use crate::config::DashboardConfig;

pub const SKU_COLUMN: &str = "Sku";
pub const ASIN_COLUMN: &str = "Asin";

/// Columns merged in from the secondary table. Edits to these are rejected
/// before any write.
pub fn secondary_columns() -> BTreeSet<String> {
    BTreeSet::from([ASIN_COLUMN.to_string()])
}

/// Left-joins ASIN data onto the SKU rows by the `Sku` column. The Amazon
/// side is deduplicated by `Sku` first (first occurrence wins) so the join
/// cannot multiply rows; SKUs without a match get a null `Asin`.
pub fn merge_sku_asin(mut skus: TableSnapshot, amazon: &TableSnapshot) -> TableSnapshot {
    let mut asin_by_sku: HashMap<&str, &Value> = HashMap::new();
    for row in &amazon.rows {
        let Some(sku) = row.cell(SKU_COLUMN).and_then(Value::as_str) else {
            continue;
        };
        if let Some(asin) = row.cell(ASIN_COLUMN) {
            asin_by_sku.entry(sku).or_insert(asin);
        }
    }
    if asin_by_sku.is_empty() && !amazon.is_empty() {
        warn!("Amazon table has no usable Sku/Asin columns; Asin will be empty.");
    }

    for row in &mut skus.rows {
        let asin = row
            .cell(SKU_COLUMN)
            .and_then(Value::as_str)
            .and_then(|sku| asin_by_sku.get(sku))
            .map(|v| (*v).clone())
            .unwrap_or(Value::Null);
        row.set_cell(ASIN_COLUMN, asin);
    }
    skus
}

/// Fetches both source tables and merges them. The result carries the
/// primary table's id, so downstream writes target the SKU table.
pub fn load_catalog(store: &dyn RowStore, config: &DashboardConfig) -> Result<TableSnapshot> {
    config.validate()?;
    let skus = store.fetch_all(config.all_skus_table_id)?;
    let amazon = store.fetch_all(config.amazon_listings_table_id)?;
    info!(
        "Merging {} SKU row(s) with {} Amazon listing(s).",
        skus.len(),
        amazon.len()
    );
    Ok(merge_sku_asin(skus, &amazon))
}
