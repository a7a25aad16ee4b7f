//! Run configuration loaded from a JSON file.
//!
//! Every section and field is optional; anything left out takes its default.
//!
//! ```json
//! {
//!   "filter": { "worst_permissible_evalue": 1e-5, "min_dc_coverage": 0.8 },
//!   "trim": { "full_length": 30, "total_trimming": 10 },
//!   "output": { "format": "verbose", "boundaries": "trimmed" },
//!   "input_order": "grouped"
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::output::format::{BoundaryOutput, HitOutputFormat};
use crate::pipeline::{InputOrder, PipelineConfig};
use crate::resolve::filter::FilterSpec;
use crate::resolve::trim::{TrimSpec, TrimSpecError};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid trim spec in config: {0}")]
    TrimSpec(#[from] TrimSpecError),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: HitOutputFormat,
    pub boundaries: BoundaryOutput,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    pub filter: FilterSpec,
    pub trim: TrimSpec,
    pub output: OutputConfig,
    pub input_order: InputOrder,
}

impl ResolveConfig {
    /// Load a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read, isn't valid JSON, or
    /// holds out-of-range values.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a config from a JSON string
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the JSON is invalid or holds out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check values that the JSON types alone don't constrain
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` describing the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        TrimSpec::new(self.trim.full_length(), self.trim.total_trimming())?;

        for (name, value) in [
            ("min_coverage", self.filter.min_coverage),
            ("min_dc_coverage", self.filter.min_dc_coverage),
        ] {
            if let Some(value) = value {
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::Invalid(format!(
                        "{name} must be between 0 and 1, got {value}"
                    )));
                }
            }
        }
        if self.filter.limit_queries == Some(0) {
            return Err(ConfigError::Invalid(
                "limit_queries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The pipeline settings this config describes
    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            input_order: self.input_order,
            filter: self.filter.clone(),
            trim: self.trim,
        }
    }
}
