use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Dialect configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectConfig {
    /// Let the filter encoder answer BBOX filters with envelope overlap only
    pub loose_bbox_enabled: bool,
    /// Ask the engine for `ST_EXTENT` statistics when bounds are requested
    pub estimated_extents_enabled: bool,
    /// Drop the primary-key sequence when its table is dropped
    pub drop_sequences_on_table_drop: bool,
    /// Length used for VARCHAR columns declared without one
    pub default_varchar_size: u32,
    /// Primary-key column used when a feature type names none
    pub primary_key_column: String,
}

impl Default for DialectConfig {
    fn default() -> Self {
        DialectConfig {
            loose_bbox_enabled: false,
            estimated_extents_enabled: false,
            drop_sequences_on_table_drop: true,
            default_varchar_size: 255,
            primary_key_column: "fid".to_string(),
        }
    }
}

impl DialectConfig {
    /// Load configuration from a TOML file; missing keys take their defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: DialectConfig = toml::from_str(contents)?;
        if config.primary_key_column.trim().is_empty() {
            return Err(anyhow::anyhow!("primary_key_column must not be empty"));
        }
        Ok(config)
    }
}
