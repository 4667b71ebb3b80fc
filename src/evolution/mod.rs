//! Template evolution analysis
//!
//! Turns the history of how projects modified their templates, and how those
//! projects fared, into proposals for the next minor version of each template.
//!
//! Stages run in order: records, modifications, outcomes, confidence,
//! proposal, writer. `pipeline` wires them together.

pub mod records;
pub mod modifications;
pub mod outcomes;
pub mod confidence;
pub mod version;
pub mod proposal;
pub mod writer;
pub mod pipeline;

pub use records::{ConfidenceEntry, ModificationEvent, ModificationKind, Outcome, OutcomeEvent};
pub use modifications::{aggregate_modifications, ModificationAggregator, PathAdoption, TemplatePattern};
pub use outcomes::{TemplateOutcomeProfile, WinRates};
pub use confidence::ConfidenceScores;
pub use version::TemplateVersion;
pub use proposal::{
    ChangeKind, EvolutionProposal, GenerationReport, ProposalGenerator, ProposalMetrics,
    ProposalStatus, ProposedChange, SkipReason, SkippedTemplate, TemplateDecision, Thresholds,
};
pub use writer::write_proposals;
pub use pipeline::{EvolutionReport, TemplateEvolver};
