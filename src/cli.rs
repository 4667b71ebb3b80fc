//! CLI interface for template-evolver

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::EvolverConfig;
use crate::evolution::{EvolutionReport, TemplateEvolver};

#[derive(Parser)]
#[command(name = "template-evolver")]
#[command(about = "Analyzes template modification patterns and generates evolution proposals", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Template cache directory (overrides the config file)
    #[arg(long, global = true, env = "TEMPLATE_EVOLVER_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the cache and write evolution proposals (default)
    Run(RunArgs),
    /// Show the effective configuration
    Config,
}

#[derive(clap::Args, Default)]
struct RunArgs {
    /// Modification log (JSON lines)
    #[arg(long)]
    modifications: Option<PathBuf>,
    /// Outcome log (JSON lines)
    #[arg(long)]
    outcomes: Option<PathBuf>,
    /// Confidence scores (JSON array)
    #[arg(long)]
    confidence: Option<PathBuf>,
    /// Output file for proposals
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Analyze without writing the output file
    #[arg(long)]
    dry_run: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = EvolverConfig::load(cli.config.as_deref())?;
    if let Some(cache_dir) = cli.cache_dir {
        config.cache_dir = cache_dir;
    }

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => run_evolution(config, args),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn run_evolution(mut config: EvolverConfig, args: RunArgs) -> Result<()> {
    if args.modifications.is_some() {
        config.modifications_log = args.modifications;
    }
    if args.outcomes.is_some() {
        config.outcomes_log = args.outcomes;
    }
    if args.confidence.is_some() {
        config.confidence_scores = args.confidence;
    }
    if args.output.is_some() {
        config.output_file = args.output;
    }

    println!("Template Evolution Analyzer");
    println!("{}", "=".repeat(50));

    let report = TemplateEvolver::new(config).dry_run(args.dry_run).run()?;
    print_summary(&report);
    Ok(())
}

fn print_summary(report: &EvolutionReport) {
    let proposals = &report.generation.proposals;

    if proposals.is_empty() {
        println!("\nNo proposals generated. Templates may not meet thresholds or no data available.");
        return;
    }

    println!("\n{}", "=".repeat(50));
    println!("SUMMARY:");
    println!("  Total proposals: {}", proposals.len());
    for proposal in proposals {
        println!(
            "    - {}: {} ({} changes)",
            proposal.proposal_id, proposal.template_id, proposal.metrics.changes_count
        );
    }
    if report.output_path.is_none() {
        println!("\n(dry run: proposals were not written)");
    }
}
