//! Proposal output

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use super::proposal::EvolutionProposal;

/// Write proposals as a pretty-printed JSON array, creating the parent
/// directory if needed. An empty slice still produces `[]`.
pub fn write_proposals(path: &Path, proposals: &[EvolutionProposal]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }

    let mut json = serde_json::to_string_pretty(proposals)
        .context("Failed to serialize proposals")?;
    json.push('\n');

    std::fs::write(path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Saved {} proposals to {}", proposals.len(), path.display());
    Ok(())
}
