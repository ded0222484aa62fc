// src/cli/mod.rs
// Headless front end over the editing core: inspect the merged catalog and
// drive the bulk flows without the dashboard UI.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{info, warn};

use crate::catalog::kpi::{self, PANEL_COLUMN, STATUS_COLUMN};
use crate::catalog::merge;
use crate::catalog::session::EditorSession;
use crate::catalog::store::{BaserowClient, RowStore};
use crate::config::DashboardConfig;
use crate::Result;

#[derive(Parser)]
#[command(name = "catalogdeck")]
#[command(about = "Catalog review dashboard core over a Baserow row store", long_about = None)]
pub struct Cli {
    /// Path to a JSON settings file; environment variables override it
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print catalog-at-a-glance KPIs and the platform/status breakdowns
    Summary,

    /// Dump the merged catalog as JSON, to stdout or a file
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Apply one column=value update to an explicit row-id selection
    SetField {
        /// Comma-separated row ids
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<i64>,
        column: String,
        /// Parsed as JSON when possible, otherwise sent as a string
        value: String,
    },

    /// Permanently delete rows by id; without --yes the intent is cancelled
    Delete {
        /// Comma-separated row ids
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<i64>,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    let config = DashboardConfig::load(cli.settings.as_deref())?;
    let client = BaserowClient::new(&config)?;
    match cli.command {
        Commands::Summary => run_summary(&client, config),
        Commands::Export { output } => run_export(&client, config, output),
        Commands::SetField { ids, column, value } => {
            run_set_field(&client, config, &ids, &column, value)
        }
        Commands::Delete { ids, yes } => run_delete(&client, config, ids, yes),
    }
}

fn run_summary(store: &dyn RowStore, config: DashboardConfig) -> Result<()> {
    let mut catalog = merge::load_catalog(store, &config)?;
    kpi::normalize_status(&mut catalog);
    let kpis = kpi::compute(&catalog);

    println!(
        "Catalog at a glance ({})",
        catalog.fetched_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("  Total master SKUs:   {}", kpis.total_mskus);
    println!("  Total listings:      {}", kpis.total_listings);
    println!("  Active listings:     {}", kpis.active_listings);
    println!("  Platforms connected: {}", kpis.panels_connected);

    println!("Listings per platform:");
    for (panel, count) in kpi::value_counts(&catalog, PANEL_COLUMN) {
        println!("  {:<20} {}", panel, count);
    }
    println!("Listing status overview:");
    for (status, count) in kpi::value_counts(&catalog, STATUS_COLUMN) {
        println!("  {:<20} {}", status, count);
    }
    Ok(())
}

fn run_export(store: &dyn RowStore, config: DashboardConfig, output: Option<PathBuf>) -> Result<()> {
    let catalog = merge::load_catalog(store, &config)?;
    let json = serde_json::to_string_pretty(&catalog.rows)?;
    match output {
        Some(path) => {
            let file = fs::File::create(&path)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(json.as_bytes())?;
            info!("Exported {} rows to {:?}.", catalog.len(), path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_set_field(
    store: &dyn RowStore,
    config: DashboardConfig,
    ids: &[i64],
    column: &str,
    value: String,
) -> Result<()> {
    let mut session = EditorSession::load(store, config)?;
    let value: Value = serde_json::from_str(&value).unwrap_or(Value::String(value));
    let updated = session.apply_uniform_update(store, ids, column, value)?;
    println!("Updated {} record(s).", updated);
    Ok(())
}

fn run_delete(store: &dyn RowStore, config: DashboardConfig, ids: Vec<i64>, yes: bool) -> Result<()> {
    let mut session = EditorSession::load(store, config)?;
    if !session.request_delete(ids) {
        println!("Nothing to delete.");
        return Ok(());
    }
    if !yes {
        session.cancel_delete();
        warn!("Deletion not confirmed; pass --yes to proceed.");
        println!("Cancelled. No rows were deleted.");
        return Ok(());
    }
    match session.confirm_delete(store)? {
        Some(deleted) => println!("Deleted {} record(s).", deleted),
        None => println!("Nothing was pending deletion."),
    }
    Ok(())
}
