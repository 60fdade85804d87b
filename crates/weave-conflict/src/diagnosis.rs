//! Minimal diagnoses by breadth-first expansion of a hitting-set tree.
//!
//! A path is a set of relaxed constraint ids. Popping a path either proves
//! it a diagnosis (the background plus the unrelaxed constraints are
//! satisfiable) or yields a fresh minimal conflict, each of whose ids
//! extends the path by one. Paths that contain a known diagnosis are pruned.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use weave_model::oracle::SatisfiabilityOracle;
use weave_model::ConstraintId;

use crate::explain::{explain, ConflictSet, Explanation};
use crate::ConflictError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisPolicy {
    /// Never diagnose.
    Disabled,
    /// Stop at the first diagnosis.
    FirstFound,
    /// Every minimal diagnosis.
    #[default]
    Exhaustive,
}

/// Minimal sets of relaxable ids whose removal resolves `conflict`.
///
/// Each diagnosis is ascending; diagnoses come in breadth-first order, so
/// smaller ones first.
pub fn diagnose<O: SatisfiabilityOracle + ?Sized>(
    oracle: &mut O,
    conflict: &ConflictSet,
    policy: DiagnosisPolicy,
) -> Result<Vec<Vec<ConstraintId>>, ConflictError> {
    if policy == DiagnosisPolicy::Disabled {
        return Ok(Vec::new());
    }

    let mut diagnoses: Vec<BTreeSet<ConstraintId>> = Vec::new();
    let mut visited: BTreeSet<BTreeSet<ConstraintId>> = BTreeSet::new();
    let mut paths: VecDeque<BTreeSet<ConstraintId>> = conflict
        .conflict
        .iter()
        .map(|&id| BTreeSet::from([id]))
        .collect();

    while let Some(path) = paths.pop_front() {
        if !visited.insert(path.clone()) {
            continue;
        }
        if diagnoses.iter().any(|diagnosis| diagnosis.is_subset(&path)) {
            continue;
        }

        let remaining: Vec<ConstraintId> = conflict
            .relaxable
            .iter()
            .copied()
            .filter(|id| !path.contains(id))
            .collect();
        let next_conflict = if remaining.is_empty() {
            None
        } else {
            match explain(oracle, &conflict.background, &remaining)? {
                Explanation::Conflict(set) => Some(set.conflict),
                Explanation::NoConflict => None,
                // Cannot happen on a background that was consistent before.
                Explanation::InconsistentBackground { .. } | Explanation::Unknown => continue,
            }
        };

        match next_conflict {
            None => {
                debug!(diagnosis = ?path, "diagnosis found");
                diagnoses.push(path);
                if policy == DiagnosisPolicy::FirstFound {
                    break;
                }
            }
            Some(ids) => {
                for id in ids {
                    let mut child = path.clone();
                    child.insert(id);
                    paths.push_back(child);
                }
            }
        }
    }

    Ok(diagnoses
        .into_iter()
        .map(|diagnosis| diagnosis.into_iter().collect())
        .collect())
}
