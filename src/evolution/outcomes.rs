//! Outcome aggregation and win rates

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::records::{Outcome, OutcomeEvent};

/// Win rate assumed for templates with no recorded outcomes
pub const NEUTRAL_WIN_RATE: f64 = 0.5;

/// Win/total counters for one template
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateOutcomeProfile {
    pub wins: u64,
    pub total: u64,
}

impl TemplateOutcomeProfile {
    pub fn win_rate(&self) -> f64 {
        if self.total == 0 {
            NEUTRAL_WIN_RATE
        } else {
            self.wins as f64 / self.total as f64
        }
    }
}

/// Per-template win rates derived from the outcome log
#[derive(Debug, Clone, Default)]
pub struct WinRates {
    profiles: BTreeMap<String, TemplateOutcomeProfile>,
}

impl WinRates {
    pub fn from_events(events: &[OutcomeEvent]) -> Self {
        let mut profiles: BTreeMap<String, TemplateOutcomeProfile> = BTreeMap::new();

        for event in events {
            let Some(template_id) = event.template_id.as_deref().filter(|id| !id.is_empty()) else {
                continue;
            };

            let profile = profiles.entry(template_id.to_string()).or_default();
            profile.total += 1;
            if event.outcome == Some(Outcome::Win) {
                profile.wins += 1;
            }
        }

        Self { profiles }
    }

    /// Win rate for a template, neutral when nothing was recorded
    pub fn win_rate(&self, template_id: &str) -> f64 {
        self.profiles
            .get(template_id)
            .map(TemplateOutcomeProfile::win_rate)
            .unwrap_or(NEUTRAL_WIN_RATE)
    }

    pub fn profile(&self, template_id: &str) -> Option<&TemplateOutcomeProfile> {
        self.profiles.get(template_id)
    }

    /// Number of templates with at least one outcome
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
