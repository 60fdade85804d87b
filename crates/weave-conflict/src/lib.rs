//! Conflicts in the constraint model: minimal explanations (QuickXplain),
//! minimal relaxations (Reiter diagnosis) and detection of error tuples
//! that the remaining constraints already rule out.

pub mod detection;
pub mod diagnosis;
pub mod explain;

use weave_model::oracle::OracleError;

pub use detection::{detect_missing_invalid_tuples, ConflictDetectionConfig, MissingInvalidTuple};
pub use diagnosis::{diagnose, DiagnosisPolicy};
pub use explain::{explain, ConflictSet, Explanation};

/// Errors raised while explaining or diagnosing conflicts.
#[derive(Debug, thiserror::Error)]
pub enum ConflictError {
    #[error("conflict explanation needs at least one relaxable constraint")]
    EmptyRelaxable,

    #[error("invalid conflict detection configuration: {0}")]
    InvalidConfiguration(&'static str),

    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),
}
