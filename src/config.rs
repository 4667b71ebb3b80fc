//! Configuration management
//!
//! Locates the template cache and the input/output files inside it. Paths can
//! come from a TOML file, the command line or the environment; anything left
//! unset is derived from the cache directory. Thresholds are fixed and are not
//! part of the configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const MODIFICATIONS_LOG: &str = "template-modifications.jsonl";
const OUTCOMES_LOG: &str = "template-outcomes.jsonl";
const CONFIDENCE_SCORES: &str = "learning/confidence-scores.json";
const OUTPUT_FILE: &str = "evolved/evolution-proposals.json";

/// Input and output locations for one evolution run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolverConfig {
    /// Root of the template cache
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// Modification log (JSON lines)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifications_log: Option<PathBuf>,
    /// Outcome log (JSON lines)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcomes_log: Option<PathBuf>,
    /// Confidence document (JSON array)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_scores: Option<PathBuf>,
    /// Where proposals are written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
}

impl Default for EvolverConfig {
    fn default() -> Self {
        Self::with_cache_dir(default_cache_dir())
    }
}

impl EvolverConfig {
    /// Configuration rooted at a specific cache directory
    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            modifications_log: None,
            outcomes_log: None,
            confidence_scores: None,
            output_file: None,
        }
    }

    /// Load configuration from a TOML file, or defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: EvolverConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn modifications_log(&self) -> PathBuf {
        self.resolve(&self.modifications_log, MODIFICATIONS_LOG)
    }

    pub fn outcomes_log(&self) -> PathBuf {
        self.resolve(&self.outcomes_log, OUTCOMES_LOG)
    }

    pub fn confidence_scores(&self) -> PathBuf {
        self.resolve(&self.confidence_scores, CONFIDENCE_SCORES)
    }

    pub fn output_file(&self) -> PathBuf {
        self.resolve(&self.output_file, OUTPUT_FILE)
    }

    fn resolve(&self, explicit: &Option<PathBuf>, default_name: &str) -> PathBuf {
        explicit
            .clone()
            .unwrap_or_else(|| self.cache_dir.join(default_name))
    }

    /// Effective configuration, with every derived path filled in, as TOML
    pub fn to_toml(&self) -> Result<String> {
        let resolved = EvolverConfig {
            cache_dir: self.cache_dir.clone(),
            modifications_log: Some(self.modifications_log()),
            outcomes_log: Some(self.outcomes_log()),
            confidence_scores: Some(self.confidence_scores()),
            output_file: Some(self.output_file()),
        };
        toml::to_string_pretty(&resolved).context("Failed to serialize config")
    }
}

/// Platform cache directory for templates
pub fn default_cache_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "template-evolver", "template-evolver")
        .map(|dirs| dirs.cache_dir().join("templates"))
        .unwrap_or_else(|| PathBuf::from(".cache").join("templates"))
}
