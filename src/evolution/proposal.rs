//! Proposal generation
//!
//! Joins modification patterns, win rates and confidence scores, and turns
//! every template that clears all thresholds into a minor-version proposal.
//! Thresholds are fixed; a template must have a win rate of at least 75%, a
//! confidence of at least 70%, and at least one path adopted by 70% of its
//! projects.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use super::confidence::ConfidenceScores;
use super::modifications::TemplatePattern;
use super::outcomes::WinRates;
use super::version::{TemplateVersion, PLACEHOLDER_VERSION};
use crate::error::EvolverError;

/// Minimum fraction of projects that must have added a path
pub const ADOPTION_THRESHOLD: f64 = 0.70;
/// Minimum win rate for a template to evolve
pub const WIN_RATE_THRESHOLD: f64 = 0.75;
/// Minimum confidence score for a template to evolve
pub const CONFIDENCE_THRESHOLD: f64 = 0.70;

/// The thresholds a template has to clear
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub adoption: f64,
    pub win_rate: f64,
    pub confidence: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            adoption: ADOPTION_THRESHOLD,
            win_rate: WIN_RATE_THRESHOLD,
            confidence: CONFIDENCE_THRESHOLD,
        }
    }
}

/// Whether a proposed change adds a file or a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    File,
    Directory,
}

impl ChangeKind {
    /// Paths without an extension are treated as directories
    pub fn classify(path: &str) -> Self {
        let has_extension = Path::new(path)
            .extension()
            .is_some_and(|ext| !ext.is_empty());
        if has_extension {
            ChangeKind::File
        } else {
            ChangeKind::Directory
        }
    }
}

/// A path to fold into the next template version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedChange {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub path: String,
    pub adoption_rate: f64,
    pub projects_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalMetrics {
    pub total_projects_analyzed: u64,
    pub win_rate: f64,
    pub confidence_score: f64,
    pub changes_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Pending,
}

/// A suggested minor-version upgrade for one template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionProposal {
    pub proposal_id: String,
    pub template_id: String,
    pub current_version: String,
    pub proposed_version: String,
    pub changes: Vec<ProposedChange>,
    pub rationale: String,
    pub metrics: ProposalMetrics,
    pub status: ProposalStatus,
    #[serde(serialize_with = "serialize_utc")]
    pub created_at: DateTime<Utc>,
}

fn serialize_utc<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Why a template produced no proposal
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    LowWinRate { win_rate: f64, threshold: f64 },
    LowConfidence { confidence: f64, threshold: f64 },
    NoQualifyingChanges,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::LowWinRate { win_rate, threshold } => write!(
                f,
                "win_rate {:.2}% < {:.2}%",
                win_rate * 100.0,
                threshold * 100.0
            ),
            SkipReason::LowConfidence { confidence, threshold } => write!(
                f,
                "confidence {:.2}% < {:.2}%",
                confidence * 100.0,
                threshold * 100.0
            ),
            SkipReason::NoQualifyingChanges => write!(f, "no paths meet the adoption threshold"),
        }
    }
}

/// A template that was analyzed but not proposed
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTemplate {
    pub template_id: String,
    pub reason: SkipReason,
}

/// What happened to one template
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateDecision {
    Proposed {
        template_id: String,
        proposal_id: String,
        changes_count: usize,
    },
    Skipped(SkippedTemplate),
}

/// Output of one generation pass
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub proposals: Vec<EvolutionProposal>,
    pub skipped: Vec<SkippedTemplate>,
    /// Every analyzed template, in processing order
    pub decisions: Vec<TemplateDecision>,
}

impl GenerationReport {
    fn skip(&mut self, template_id: &str, reason: SkipReason) {
        let skipped = SkippedTemplate {
            template_id: template_id.to_string(),
            reason,
        };
        self.decisions.push(TemplateDecision::Skipped(skipped.clone()));
        self.skipped.push(skipped);
    }

    fn propose(&mut self, proposal: EvolutionProposal) {
        self.decisions.push(TemplateDecision::Proposed {
            template_id: proposal.template_id.clone(),
            proposal_id: proposal.proposal_id.clone(),
            changes_count: proposal.metrics.changes_count,
        });
        self.proposals.push(proposal);
    }
}

/// Applies thresholds and builds proposals
pub struct ProposalGenerator {
    thresholds: Thresholds,
}

impl ProposalGenerator {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn generate(
        &self,
        patterns: &BTreeMap<String, TemplatePattern>,
        win_rates: &WinRates,
        confidence: &ConfidenceScores,
    ) -> Result<GenerationReport, EvolverError> {
        self.generate_at(patterns, win_rates, confidence, Utc::now())
    }

    /// Generate proposals stamped with a fixed creation time
    pub fn generate_at(
        &self,
        patterns: &BTreeMap<String, TemplatePattern>,
        win_rates: &WinRates,
        confidence: &ConfidenceScores,
        now: DateTime<Utc>,
    ) -> Result<GenerationReport, EvolverError> {
        let mut report = GenerationReport::default();
        let mut next_id = 1u32;

        for (template_id, pattern) in patterns {
            let win_rate = win_rates.win_rate(template_id);
            let confidence_score = confidence.score(template_id);

            if let Some(reason) = self.check_template(win_rate, confidence_score) {
                info!("Skipping {}: {}", template_id, reason);
                report.skip(template_id, reason);
                continue;
            }

            let changes = self.qualifying_changes(pattern);
            if changes.is_empty() {
                debug!("No qualifying changes for {}", template_id);
                report.skip(template_id, SkipReason::NoQualifyingChanges);
                continue;
            }

            let current = TemplateVersion::parse(PLACEHOLDER_VERSION)?;
            let proposal = EvolutionProposal {
                proposal_id: format!("PROP-{:04}", next_id),
                template_id: template_id.clone(),
                current_version: current.to_string(),
                proposed_version: current.bump_minor().to_string(),
                rationale: self.rationale(pattern.total_projects, win_rate, confidence_score, changes.len()),
                metrics: ProposalMetrics {
                    total_projects_analyzed: pattern.total_projects,
                    win_rate: round4(win_rate),
                    confidence_score: round4(confidence_score),
                    changes_count: changes.len(),
                },
                changes,
                status: ProposalStatus::Pending,
                created_at: now,
            };
            next_id += 1;

            info!(
                "Created proposal {} for {}: {} changes",
                proposal.proposal_id, template_id, proposal.metrics.changes_count
            );
            report.propose(proposal);
        }

        Ok(report)
    }

    /// Win rate is checked before confidence
    fn check_template(&self, win_rate: f64, confidence: f64) -> Option<SkipReason> {
        if win_rate < self.thresholds.win_rate {
            return Some(SkipReason::LowWinRate {
                win_rate,
                threshold: self.thresholds.win_rate,
            });
        }
        if confidence < self.thresholds.confidence {
            return Some(SkipReason::LowConfidence {
                confidence,
                threshold: self.thresholds.confidence,
            });
        }
        None
    }

    fn qualifying_changes(&self, pattern: &TemplatePattern) -> Vec<ProposedChange> {
        pattern
            .additions
            .iter()
            .filter(|(_, adoption)| adoption.adoption_rate >= self.thresholds.adoption)
            .map(|(path, adoption)| ProposedChange {
                kind: ChangeKind::classify(path),
                path: path.clone(),
                adoption_rate: round4(adoption.adoption_rate),
                projects_count: adoption.count,
            })
            .collect()
    }

    fn rationale(&self, total_projects: u64, win_rate: f64, confidence: f64, changes: usize) -> String {
        format!(
            "Based on analysis of {} projects with {:.1}% win rate and {:.1}% confidence. \
             {} patterns adopted by ≥{:.0}% of projects.",
            total_projects,
            win_rate * 100.0,
            confidence * 100.0,
            changes,
            self.thresholds.adoption * 100.0
        )
    }
}

impl Default for ProposalGenerator {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

/// Round to 4 decimal places from the exact decimal expansion, ties to even
fn round4(value: f64) -> f64 {
    format!("{:.4}", value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::modifications::PathAdoption;
    use crate::evolution::records::{ConfidenceEntry, Outcome, OutcomeEvent};

    fn pattern(total_projects: u64, additions: &[(&str, u64)]) -> TemplatePattern {
        TemplatePattern {
            total_projects,
            additions: additions
                .iter()
                .map(|(path, count)| {
                    (
                        path.to_string(),
                        PathAdoption {
                            count: *count,
                            adoption_rate: *count as f64 / total_projects as f64,
                        },
                    )
                })
                .collect(),
        }
    }

    fn win_rates(template: &str, wins: usize, losses: usize) -> WinRates {
        let mut events = Vec::new();
        for _ in 0..wins {
            events.push(OutcomeEvent { template_id: Some(template.to_string()), outcome: Some(Outcome::Win) });
        }
        for _ in 0..losses {
            events.push(OutcomeEvent { template_id: Some(template.to_string()), outcome: Some(Outcome::Loss) });
        }
        WinRates::from_events(&events)
    }

    fn confidence(template: &str, score: f64) -> ConfidenceScores {
        ConfidenceScores::from_entries(&[ConfidenceEntry {
            template_id: Some(template.to_string()),
            confidence_score: Some(score),
        }])
    }

    #[test]
    fn test_classify() {
        assert_eq!(ChangeKind::classify("hooks/"), ChangeKind::Directory);
        assert_eq!(ChangeKind::classify("scripts"), ChangeKind::Directory);
        assert_eq!(ChangeKind::classify(".github"), ChangeKind::Directory);
        assert_eq!(ChangeKind::classify("src/lib.rs"), ChangeKind::File);
        assert_eq!(ChangeKind::classify("docker-compose.yml"), ChangeKind::File);
    }

    #[test]
    fn test_proposal_built() {
        let mut patterns = BTreeMap::new();
        patterns.insert("T1".to_string(), pattern(7, &[("hooks/", 5), ("notes.txt", 1)]));

        let report = ProposalGenerator::default()
            .generate(&patterns, &win_rates("T1", 8, 2), &confidence("T1", 0.85))
            .unwrap();

        assert_eq!(report.proposals.len(), 1);
        let proposal = &report.proposals[0];
        assert_eq!(proposal.proposal_id, "PROP-0001");
        assert_eq!(proposal.current_version, "1.0.0");
        assert_eq!(proposal.proposed_version, "1.1.0");
        assert_eq!(proposal.status, ProposalStatus::Pending);
        assert_eq!(
            proposal.changes,
            vec![ProposedChange {
                kind: ChangeKind::Directory,
                path: "hooks/".to_string(),
                adoption_rate: 0.7143,
                projects_count: 5,
            }]
        );
        assert_eq!(proposal.metrics.win_rate, 0.8);
        assert_eq!(proposal.metrics.confidence_score, 0.85);
        assert_eq!(proposal.metrics.changes_count, 1);
        assert_eq!(
            proposal.rationale,
            "Based on analysis of 7 projects with 80.0% win rate and 85.0% confidence. \
             1 patterns adopted by ≥70% of projects."
        );
    }

    #[test]
    fn test_low_win_rate_checked_first() {
        let mut patterns = BTreeMap::new();
        patterns.insert("T1".to_string(), pattern(2, &[("a/", 2)]));

        let report = ProposalGenerator::default()
            .generate(&patterns, &win_rates("T1", 1, 1), &ConfidenceScores::default())
            .unwrap();

        assert!(report.proposals.is_empty());
        assert_eq!(
            report.skipped[0].reason,
            SkipReason::LowWinRate { win_rate: 0.5, threshold: 0.75 }
        );
        assert_eq!(report.skipped[0].reason.to_string(), "win_rate 50.00% < 75.00%");
    }

    #[test]
    fn test_neutral_win_rate_is_rejected() {
        let mut patterns = BTreeMap::new();
        patterns.insert("T1".to_string(), pattern(1, &[("a/", 1)]));

        let report = ProposalGenerator::default()
            .generate(&patterns, &WinRates::default(), &confidence("T1", 0.99))
            .unwrap();

        assert!(report.proposals.is_empty());
        assert!(matches!(report.skipped[0].reason, SkipReason::LowWinRate { .. }));
    }

    #[test]
    fn test_low_confidence() {
        let mut patterns = BTreeMap::new();
        patterns.insert("T1".to_string(), pattern(2, &[("a/", 2)]));

        let report = ProposalGenerator::default()
            .generate(&patterns, &win_rates("T1", 4, 0), &confidence("T1", 0.5))
            .unwrap();

        assert!(report.proposals.is_empty());
        assert_eq!(report.skipped[0].reason.to_string(), "confidence 50.00% < 70.00%");
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let mut patterns = BTreeMap::new();
        patterns.insert("T1".to_string(), pattern(10, &[("a/", 7), ("b/", 6)]));

        let report = ProposalGenerator::default()
            .generate(&patterns, &win_rates("T1", 3, 1), &confidence("T1", 0.70))
            .unwrap();

        assert_eq!(report.proposals.len(), 1);
        assert_eq!(report.proposals[0].changes.len(), 1);
        assert_eq!(report.proposals[0].changes[0].path, "a/");
    }

    #[test]
    fn test_no_qualifying_changes() {
        let mut patterns = BTreeMap::new();
        patterns.insert("T1".to_string(), pattern(10, &[("a/", 3)]));

        let report = ProposalGenerator::default()
            .generate(&patterns, &win_rates("T1", 1, 0), &confidence("T1", 0.9))
            .unwrap();

        assert!(report.proposals.is_empty());
        assert_eq!(report.skipped[0].reason, SkipReason::NoQualifyingChanges);
    }

    #[test]
    fn test_ids_sequential_over_survivors() {
        let mut patterns = BTreeMap::new();
        let mut outcomes = Vec::new();
        let mut entries = Vec::new();
        for id in ["A", "B", "C"] {
            patterns.insert(id.to_string(), pattern(1, &[("x/", 1)]));
            outcomes.push(OutcomeEvent { template_id: Some(id.to_string()), outcome: Some(Outcome::Win) });
            entries.push(ConfidenceEntry {
                template_id: Some(id.to_string()),
                confidence_score: Some(if id == "B" { 0.1 } else { 0.9 }),
            });
        }

        let report = ProposalGenerator::default()
            .generate(
                &patterns,
                &WinRates::from_events(&outcomes),
                &ConfidenceScores::from_entries(&entries),
            )
            .unwrap();

        let ids: Vec<(&str, &str)> = report
            .proposals
            .iter()
            .map(|p| (p.proposal_id.as_str(), p.template_id.as_str()))
            .collect();
        assert_eq!(ids, vec![("PROP-0001", "A"), ("PROP-0002", "C")]);

        let order: Vec<&str> = report
            .decisions
            .iter()
            .map(|d| match d {
                TemplateDecision::Proposed { template_id, .. } => template_id.as_str(),
                TemplateDecision::Skipped(skipped) => skipped.template_id.as_str(),
            })
            .collect();
        assert_eq!(order, vec!["A", "B", "C"]);
        assert!(matches!(report.decisions[1], TemplateDecision::Skipped(_)));
    }

    #[test]
    fn test_round4_ties_to_even() {
        // 0.03125 is exact in binary, so this is a true tie at the fourth decimal
        assert_eq!(round4(0.03125), 0.0312);
        assert_eq!(round4(5.0 / 7.0), 0.7143);
        assert_eq!(round4(0.8), 0.8);
        assert_eq!(round4(1.0), 1.0);
    }

    #[test]
    fn test_created_at_format() {
        let mut patterns = BTreeMap::new();
        patterns.insert("T1".to_string(), pattern(1, &[("x/", 1)]));
        let now = DateTime::parse_from_rfc3339("2026-10-19T08:30:00Z").unwrap().with_timezone(&Utc);

        let report = ProposalGenerator::default()
            .generate_at(&patterns, &win_rates("T1", 1, 0), &confidence("T1", 1.0), now)
            .unwrap();

        let json = serde_json::to_value(&report.proposals[0]).unwrap();
        assert_eq!(json["created_at"], "2026-10-19T08:30:00.000000Z");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["changes"][0]["type"], "directory");
    }
}
