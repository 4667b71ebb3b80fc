//! Confidence score lookup

use std::collections::BTreeMap;

use super::records::ConfidenceEntry;

/// Confidence assumed for templates missing from the confidence source
pub const MISSING_CONFIDENCE: f64 = 0.0;

/// Per-template confidence scores
#[derive(Debug, Clone, Default)]
pub struct ConfidenceScores {
    scores: BTreeMap<String, f64>,
}

impl ConfidenceScores {
    /// Build the lookup. Later entries for a template replace earlier ones.
    pub fn from_entries(entries: &[ConfidenceEntry]) -> Self {
        let scores = entries
            .iter()
            .filter_map(|entry| {
                let template_id = entry.template_id.as_deref().filter(|id| !id.is_empty())?;
                let score = entry.confidence_score.unwrap_or(MISSING_CONFIDENCE);
                Some((template_id.to_string(), score))
            })
            .collect();

        Self { scores }
    }

    /// Confidence for a template; absence counts as no confidence
    pub fn score(&self, template_id: &str) -> f64 {
        self.scores.get(template_id).copied().unwrap_or(MISSING_CONFIDENCE)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
