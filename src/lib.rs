// src/lib.rs

pub mod catalog;
pub mod cli;
pub mod config;

pub use catalog::error::{CatalogError, Result};
pub use config::DashboardConfig;
