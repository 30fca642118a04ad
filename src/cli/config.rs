//! TOML configuration file support.
//!
//! Writer settings can live in a config file instead of CLI flags:
//!
//! ```toml
//! # morphpack.toml
//! [pack]
//! compression_level = 15
//! row_group_size = 200000
//! sort_by_id = true
//! format = "archive"
//! overwrite = false
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use morphpack::writer::{CompressionType, ContainerFormat, WriterConfig};

/// Root configuration structure for morphpack.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Packing settings
    #[serde(default)]
    pub pack: PackConfig,
}

/// Overrides applied on top of the selected profile.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackConfig {
    /// ZSTD compression level (1-22)
    pub compression_level: Option<i32>,

    /// Target rows per row group
    pub row_group_size: Option<usize>,

    /// Stable-sort records by id before packing
    pub sort_by_id: Option<bool>,

    /// Container layout: `auto`, `bare` or `archive`
    pub format: Option<String>,

    /// Replace existing destination files
    pub overwrite: Option<bool>,

    /// Primary table stream name inside archives
    pub primary_table_name: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}

/// Parse a container layout name
pub fn parse_format(value: &str) -> Result<ContainerFormat> {
    match value.to_lowercase().as_str() {
        "auto" => Ok(ContainerFormat::Auto),
        "bare" | "parquet" => Ok(ContainerFormat::Bare),
        "archive" | "zip" => Ok(ContainerFormat::Archive),
        other => bail!("Unknown container format '{}'. Valid options: auto, bare, archive", other),
    }
}

impl PackConfig {
    /// Apply the settings present in the file to `config`
    pub fn apply_to(&self, config: &mut WriterConfig) -> Result<()> {
        if let Some(level) = self.compression_level {
            if !(1..=22).contains(&level) {
                bail!("compression_level must be between 1 and 22, got {}", level);
            }
            config.compression = CompressionType::Zstd(level);
        }
        if let Some(rows) = self.row_group_size {
            config.row_group_size = rows;
        }
        if let Some(sort) = self.sort_by_id {
            config.sort_by_id = sort;
        }
        if let Some(format) = &self.format {
            config.container_format = parse_format(format)?;
        }
        if let Some(overwrite) = self.overwrite {
            config.overwrite = overwrite;
        }
        if let Some(name) = &self.primary_table_name {
            config.primary_table_name = name.clone();
        }
        Ok(())
    }
}
