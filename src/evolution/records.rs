//! Record loading
//!
//! Reads the modification and outcome logs (one JSON object per line) and the
//! confidence document (a single JSON array). A missing file is an empty
//! history, and a corrupt line in a log is dropped without stopping the run.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::error::EvolverError;

/// Kind of modification a project made to its copy of a template
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModificationKind {
    DirectoryAdded,
    FileAdded,
    #[default]
    #[serde(other)]
    Other,
}

impl ModificationKind {
    /// Whether this modification introduces a new path
    pub fn is_addition(&self) -> bool {
        matches!(self, ModificationKind::DirectoryAdded | ModificationKind::FileAdded)
    }
}

/// One line of the modification log
///
/// Fields are read leniently: a value of the wrong JSON type never discards
/// the whole event, so the project still counts toward its template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModificationEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub template_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub project_path: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient_variant")]
    pub kind: Option<ModificationKind>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub path: Option<String>,
}

/// Result of using a template in a project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Loss,
    #[default]
    #[serde(other)]
    Other,
}

/// One line of the outcome log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutcomeEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub template_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_variant")]
    pub outcome: Option<Outcome>,
}

/// One element of the confidence document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfidenceEntry {
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
}

/// Strings pass through, numbers are stringified, anything else is absent
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Null is absent; any value that is not a known variant falls back to the default
fn lenient_variant<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .map(|value| serde_json::from_value(value).unwrap_or_default()))
}

/// Load a newline-delimited JSON log, skipping blank and malformed lines
pub fn load_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        debug!("No log at {}, treating as empty", path.display());
        return Ok(Vec::new());
    }

    // Raw bytes: a line with invalid UTF-8 is one malformed record, not a failed read
    let content = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(parse_jsonl(&content, path))
}

fn parse_jsonl<T: DeserializeOwned>(content: &[u8], source: &Path) -> Vec<T> {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for line in content.split(|b| *b == b'\n') {
        let line = trim_ascii(line);
        if line.is_empty() {
            continue;
        }
        match serde_json::from_slice::<T>(line) {
            Ok(record) => records.push(record),
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("Skipped {} malformed lines in {}", skipped, source.display());
    }
    records
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// Load a JSON document holding an array of records
pub fn load_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        debug!("No document at {}, treating as empty", path.display());
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let records = serde_json::from_str::<Vec<T>>(&content).map_err(|source| {
        EvolverError::InvalidDocument {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(records)
}
