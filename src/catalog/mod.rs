// src/catalog/mod.rs
//! The editing core: snapshots, diff/reconciliation, bulk mutation, and the
//! row-store client they all write through.

pub mod bulk;
pub mod definitions;
pub mod diff;
pub mod error;
pub mod kpi;
pub mod merge;
pub mod session;
pub mod snapshot;
pub mod store;
