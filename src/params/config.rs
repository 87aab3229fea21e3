//! Preset file combining every parameter group.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AnalyzerParams, ReactiveParams, SpectrumParams};
use crate::error::{ConfigError, ConfigResult};

/// Full visualizer configuration, loadable from a JSON preset.
///
/// Every field is optional in the file; missing ones take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    pub analyzer: AnalyzerParams,
    pub spectrum: SpectrumParams,
    pub reactive: ReactiveParams,
}

impl VisualizerConfig {
    /// Read and validate a JSON preset
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.analyzer.validate()?;
        self.spectrum.validate()?;
        self.reactive.validate()
    }
}
