//! Run configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::aggregator::Classification;
use crate::linguistic::FeatureExtractor;
use crate::types::ProjectRef;

/// Errors that can occur when loading a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Unsupported config file format: {0} (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),
}

/// Configuration for one scoring run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    /// Part-of-speech tagging
    #[serde(default)]
    pub tagger: TaggerConfig,

    /// Score issues on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Projects expected in the period; those without issues are reported idle
    #[serde(default)]
    pub projects: Vec<ProjectRef>,

    /// Lowest classification every project must reach
    #[serde(default)]
    pub fail_below: Option<Classification>,
}

fn default_true() -> bool {
    true
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tagger: TaggerConfig::default(),
            parallel: true,
            projects: Vec::new(),
            fail_below: None,
        }
    }
}

impl RunConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Self::from_json(&fs::read_to_string(path)?),
            "yaml" | "yml" => Self::from_yaml(&fs::read_to_string(path)?),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Build the feature extractor this configuration asks for.
    pub fn feature_extractor(&self) -> FeatureExtractor {
        if self.tagger.enabled {
            FeatureExtractor::heuristic()
        } else {
            FeatureExtractor::without_tagger()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (i, project) in self.projects.iter().enumerate() {
            if project.key.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("projects[{}] has an empty key", i)));
            }
            let duplicate = self.projects[..i].iter().any(|p| p.key == project.key);
            if duplicate {
                return Err(ConfigError::Invalid(format!(
                    "Duplicate project key: {}",
                    project.key
                )));
            }
        }
        Ok(())
    }
}

/// Tagger configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaggerConfig {
    /// Use the built-in tagger; whitelist-only scoring when false
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
