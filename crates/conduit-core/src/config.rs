//! Pipe tier configuration, loaded from RON, TOML, or JSON data files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::resource::Amount;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading pipe configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// The configuration parsed but is not usable.
    #[error("invalid pipe configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(ConfigError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Config types
// ===========================================================================

/// One pipe tier and the per-node capacity of networks built from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeTier {
    pub name: String,
    /// Capacity in subunits.
    pub capacity: Amount,
}

/// All configured pipe tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeConfig {
    pub tiers: Vec<PipeTier>,
}

impl Default for PipeConfig {
    fn default() -> Self {
        let tier = |name: &str, capacity| PipeTier {
            name: name.to_string(),
            capacity,
        };
        Self {
            tiers: vec![
                tier("basic", 1_000),
                tier("improved", 4_000),
                tier("advanced", 16_000),
            ],
        }
    }
}

impl PipeConfig {
    /// Look up a tier by name.
    pub fn tier(&self, name: &str) -> Option<&PipeTier> {
        self.tiers.iter().find(|t| t.name == name)
    }

    /// Check names are present and unique and capacities are positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tiers.is_empty() {
            return Err(ConfigError::Invalid("no pipe tiers defined".into()));
        }
        for (i, tier) in self.tiers.iter().enumerate() {
            if tier.name.is_empty() {
                return Err(ConfigError::Invalid(format!("tier {i} has an empty name")));
            }
            if tier.capacity == 0 {
                return Err(ConfigError::Invalid(format!(
                    "tier '{}' has zero capacity",
                    tier.name
                )));
            }
            if self.tiers[..i].iter().any(|t| t.name == tier.name) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate tier name '{}'",
                    tier.name
                )));
            }
        }
        Ok(())
    }

    /// Parse configuration text in the given format and validate it.
    pub fn from_str_with_format(
        text: &str,
        format: Format,
        origin: &Path,
    ) -> Result<Self, ConfigError> {
        let parse_err = |detail: String| ConfigError::Parse {
            file: origin.to_path_buf(),
            detail,
        };
        let config: PipeConfig = match format {
            Format::Ron => ron::from_str(text).map_err(|e| parse_err(e.to_string()))?,
            Format::Toml => toml::from_str(text).map_err(|e| parse_err(e.to_string()))?,
            Format::Json => serde_json::from_str(text).map_err(|e| parse_err(e.to_string()))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, picking the format from its extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = detect_format(path)?;
        let text = std::fs::read_to_string(path)?;
        Self::from_str_with_format(&text, format, path)
    }
}
