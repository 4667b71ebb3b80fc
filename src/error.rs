//! Error types for the template evolver
//!
//! Domain failures are typed here; everything else propagates as
//! `anyhow::Error` with context attached at the call site.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvolverError {
    /// A version string that is not `major.minor.patch`
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// A whole-file document exists but is not a JSON array of records
    #[error("Invalid document {path}: {source}", path = .path.display())]
    InvalidDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
