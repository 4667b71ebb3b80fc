//! End-to-end evolution run
//!
//! Loads the three inputs, aggregates them, generates proposals and writes the
//! result. Each stage runs once, in order.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use super::confidence::ConfidenceScores;
use super::modifications::ModificationAggregator;
use super::outcomes::WinRates;
use super::proposal::{GenerationReport, ProposalGenerator, SkipReason, TemplateDecision, Thresholds};
use super::records::{self, ConfidenceEntry, ModificationEvent, OutcomeEvent};
use super::writer;
use crate::config::EvolverConfig;

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct EvolutionReport {
    pub templates_analyzed: usize,
    pub outcome_templates: usize,
    pub confidence_templates: usize,
    pub generation: GenerationReport,
    /// Where proposals were written; `None` on a dry run
    pub output_path: Option<PathBuf>,
}

/// Runs the evolution analysis for one configuration
pub struct TemplateEvolver {
    config: EvolverConfig,
    generator: ProposalGenerator,
    dry_run: bool,
    quiet: bool,
}

impl TemplateEvolver {
    pub fn new(config: EvolverConfig) -> Self {
        Self {
            config,
            generator: ProposalGenerator::new(Thresholds::default()),
            dry_run: false,
            quiet: false,
        }
    }

    /// Skip writing the output file
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Suppress console progress lines
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn run(&self) -> Result<EvolutionReport> {
        self.say("Analyzing modification patterns...");
        let modifications_path = self.config.modifications_log();
        let events: Vec<ModificationEvent> = records::load_jsonl(&modifications_path)?;
        let mut aggregator = ModificationAggregator::new();
        aggregator.extend(&events);
        let patterns = aggregator.finish();
        info!("Aggregated {} modification events from {}", events.len(), modifications_path.display());
        self.say(&format!("Analyzed patterns for {} templates", patterns.len()));

        self.say("Loading template outcomes...");
        let outcomes: Vec<OutcomeEvent> = records::load_jsonl(&self.config.outcomes_log())?;
        let win_rates = WinRates::from_events(&outcomes);
        self.say(&format!("Loaded outcomes for {} templates", win_rates.len()));

        self.say("Loading confidence scores...");
        let confidence_path = self.config.confidence_scores();
        let entries: Vec<ConfidenceEntry> = records::load_json_array(&confidence_path)
            .with_context(|| format!("Failed to load confidence scores from {}", confidence_path.display()))?;
        let confidence = ConfidenceScores::from_entries(&entries);
        self.say(&format!("Loaded confidence scores for {} templates", confidence.len()));

        self.say("\nGenerating evolution proposals...");
        let generation = self.generator.generate(&patterns, &win_rates, &confidence)?;
        self.report_generation(&generation);

        let output_path = if self.dry_run {
            info!("Dry run, not writing proposals");
            None
        } else {
            let path = self.config.output_file();
            writer::write_proposals(&path, &generation.proposals)?;
            if !generation.proposals.is_empty() {
                self.say(&format!(
                    "\nSaved {} proposals to: {}",
                    generation.proposals.len(),
                    path.display()
                ));
            }
            Some(path)
        };

        Ok(EvolutionReport {
            templates_analyzed: patterns.len(),
            outcome_templates: win_rates.len(),
            confidence_templates: confidence.len(),
            generation,
            output_path,
        })
    }

    fn report_generation(&self, generation: &GenerationReport) {
        for line in generation.decisions.iter().filter_map(decision_line) {
            self.say(&line);
        }
    }

    fn say(&self, line: &str) {
        if !self.quiet {
            println!("{}", line);
        }
    }
}

/// Console line for one template; templates without qualifying changes stay quiet
fn decision_line(decision: &TemplateDecision) -> Option<String> {
    match decision {
        TemplateDecision::Proposed { template_id, changes_count, .. } => Some(format!(
            "  ✓ Created proposal for {}: {} changes",
            template_id, changes_count
        )),
        TemplateDecision::Skipped(skipped) if skipped.reason == SkipReason::NoQualifyingChanges => None,
        TemplateDecision::Skipped(skipped) => {
            Some(format!("  Skipping {}: {}", skipped.template_id, skipped.reason))
        }
    }
}
