//! Template Evolver Library
//!
//! Aggregates how projects modified the templates they were scaffolded from
//! and how those projects fared, and proposes minor-version upgrades for
//! templates whose adopted additions clear fixed thresholds.
//!
//! # Example
//!
//! ```no_run
//! use template_evolver::{EvolverConfig, TemplateEvolver};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = EvolverConfig::with_cache_dir("/var/cache/templates");
//!     let report = TemplateEvolver::new(config).run()?;
//!     println!("{} proposals", report.generation.proposals.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod config;
pub mod evolution;
pub mod cli;

pub use config::EvolverConfig;
pub use error::EvolverError;
pub use evolution::{EvolutionProposal, EvolutionReport, TemplateEvolver};

