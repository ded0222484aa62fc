// src/config.rs
//! Dashboard configuration: Baserow credentials and the table ids the
//! catalog is assembled from. Loaded from an optional JSON settings file,
//! then overridden by environment variables, then validated before any
//! store call is attempted.

use std::fs;
use std::io::{self, BufReader, ErrorKind};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::error::{CatalogError, Result};

pub const ENV_API_TOKEN: &str = "BASEROW_API_TOKEN";
pub const ENV_BASE_URL: &str = "BASEROW_BASE_URL";
pub const ENV_ALL_SKUS_TABLE_ID: &str = "BASEROW_ALL_SKUS_TABLE_ID";
pub const ENV_AMAZON_TABLE_ID: &str = "BASEROW_AMAZON_LISTINGS_TABLE_ID";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Baserow database token, sent as `Authorization: Token ...`.
    #[serde(default)]
    pub api_token: String,
    /// Baserow instance root, e.g. `https://api.baserow.io`.
    #[serde(default)]
    pub base_url: String,
    /// Primary table: the only write target for the editor paths.
    #[serde(default)]
    pub all_skus_table_id: u64,
    /// Secondary table merged read-only into the catalog (ASIN data).
    #[serde(default)]
    pub amazon_listings_table_id: u64,
}

impl DashboardConfig {
    /// Reads a settings file. A missing file is not an error: it returns the
    /// default config so environment variables alone can configure a run.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        match fs::File::open(path) {
            Ok(file) => {
                let reader = BufReader::new(file);
                serde_json::from_reader(reader).map_err(|e| {
                    io::Error::new(
                        ErrorKind::InvalidData,
                        format!("Failed to parse settings file {:?}: {}", path, e),
                    )
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Settings file not found at {:?}. Using defaults.", path);
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Overrides fields from the environment where the matching variable is set.
    pub fn apply_env(&mut self) {
        if let Ok(token) = dotenvy::var(ENV_API_TOKEN) {
            self.api_token = token;
        }
        if let Ok(url) = dotenvy::var(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Ok(id) = dotenvy::var(ENV_ALL_SKUS_TABLE_ID) {
            if let Ok(parsed) = id.parse() {
                self.all_skus_table_id = parsed;
            }
        }
        if let Ok(id) = dotenvy::var(ENV_AMAZON_TABLE_ID) {
            if let Ok(parsed) = id.parse() {
                self.amazon_listings_table_id = parsed;
            }
        }
        debug!(
            "Config after env overrides: base_url='{}', tables=({}, {})",
            self.base_url, self.all_skus_table_id, self.amazon_listings_table_id
        );
    }

    /// File + env + validation in one step. The usual entry point for the CLI.
    pub fn load(settings_path: Option<&Path>) -> Result<Self> {
        let mut config = match settings_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Every required field must be present before the core agrees to operate.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.api_token.trim().is_empty() {
            missing.push("api_token");
        }
        if self.base_url.trim().is_empty() {
            missing.push("base_url");
        }
        if self.all_skus_table_id == 0 {
            missing.push("all_skus_table_id");
        }
        if self.amazon_listings_table_id == 0 {
            missing.push("amazon_listings_table_id");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::ConfigIncomplete { missing })
        }
    }

    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_config() -> DashboardConfig {
        DashboardConfig {
            api_token: "token".to_string(),
            base_url: "https://api.baserow.io/".to_string(),
            all_skus_table_id: 101,
            amazon_listings_table_id: 202,
        }
    }

    #[test]
    fn complete_config_validates() {
        assert!(complete_config().validate().is_ok());
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let config = DashboardConfig {
            base_url: "https://api.baserow.io".to_string(),
            ..Default::default()
        };
        match config.validate() {
            Err(CatalogError::ConfigIncomplete { missing }) => {
                assert_eq!(
                    missing,
                    vec![
                        "api_token",
                        "all_skus_table_id",
                        "amazon_listings_table_id"
                    ]
                );
            }
            other => panic!("expected ConfigIncomplete, got {:?}", other),
        }
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let mut config = complete_config();
        config.api_token = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        assert_eq!(complete_config().base_url_trimmed(), "https://api.baserow.io");
    }
}
