//! QuickXplain: a minimal conflicting subset of the relaxable constraints.
//!
//! Every consistency check disables all constraints, resets the oracle and
//! enables exactly the ids under test. The oracle is shared state, so all
//! constraints are enabled again before returning, on success and on error.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use weave_model::oracle::SatisfiabilityOracle;
use weave_model::ConstraintId;

use crate::ConflictError;

/// A minimal conflict and the query it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictSet {
    pub background: Vec<ConstraintId>,
    pub relaxable: Vec<ConstraintId>,
    /// Minimal subset of `relaxable` that contradicts `background`, ascending.
    pub conflict: Vec<ConstraintId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Explanation {
    /// Background and relaxable constraints are jointly satisfiable.
    NoConflict,
    /// The background alone is unsatisfiable; nothing can be relaxed.
    InconsistentBackground {
        background: Vec<ConstraintId>,
        relaxable: Vec<ConstraintId>,
    },
    Conflict(ConflictSet),
    /// Unsatisfiable, but no explanation was computed.
    Unknown,
}

/// Re-enables every constraint when dropped.
struct EnableAllOnDrop<'a, O: SatisfiabilityOracle + ?Sized>(&'a mut O);

impl<O: SatisfiabilityOracle + ?Sized> Drop for EnableAllOnDrop<'_, O> {
    fn drop(&mut self) {
        self.0.enable_all();
    }
}

fn is_consistent<O: SatisfiabilityOracle + ?Sized>(
    oracle: &mut O,
    ids: &[ConstraintId],
) -> Result<bool, ConflictError> {
    oracle.disable_all();
    oracle.reset();
    oracle.enable(ids)?;
    Ok(oracle.is_satisfiable()?)
}

fn union(first: &[ConstraintId], second: &[ConstraintId]) -> Vec<ConstraintId> {
    first.iter().chain(second).copied().collect()
}

/// Are exactly the constraints `ids` jointly satisfiable?
///
/// Leaves every constraint enabled afterwards.
pub fn check_consistency<O: SatisfiabilityOracle + ?Sized>(
    oracle: &mut O,
    ids: &[ConstraintId],
) -> Result<bool, ConflictError> {
    let guard = EnableAllOnDrop(oracle);
    is_consistent(&mut *guard.0, ids)
}

/// Explain why `background ∪ relaxable` is unsatisfiable, if it is.
pub fn explain<O: SatisfiabilityOracle + ?Sized>(
    oracle: &mut O,
    background: &[ConstraintId],
    relaxable: &[ConstraintId],
) -> Result<Explanation, ConflictError> {
    if relaxable.is_empty() {
        return Err(ConflictError::EmptyRelaxable);
    }
    let guard = EnableAllOnDrop(oracle);

    if is_consistent(&mut *guard.0, &union(background, relaxable))? {
        return Ok(Explanation::NoConflict);
    }
    if !is_consistent(&mut *guard.0, background)? {
        return Ok(Explanation::InconsistentBackground {
            background: background.to_vec(),
            relaxable: relaxable.to_vec(),
        });
    }

    let conflict: BTreeSet<ConstraintId> = quick_xplain(&mut *guard.0, background, false, relaxable)?
        .into_iter()
        .collect();
    debug!(?background, ?conflict, "minimal conflict");

    Ok(Explanation::Conflict(ConflictSet {
        background: background.to_vec(),
        relaxable: relaxable.to_vec(),
        conflict: conflict.into_iter().collect(),
    }))
}

/// Junker's recursion. `has_delta` is whether constraints were just added
/// to `background`, in which case it is rechecked first.
fn quick_xplain<O: SatisfiabilityOracle + ?Sized>(
    oracle: &mut O,
    background: &[ConstraintId],
    has_delta: bool,
    relaxable: &[ConstraintId],
) -> Result<Vec<ConstraintId>, ConflictError> {
    if has_delta && !is_consistent(oracle, background)? {
        return Ok(Vec::new());
    }
    if relaxable.len() == 1 {
        return Ok(relaxable.to_vec());
    }

    let (first, second) = relaxable.split_at(relaxable.len() / 2);
    let delta_second = quick_xplain(oracle, &union(background, first), !first.is_empty(), second)?;
    let delta_first = quick_xplain(
        oracle,
        &union(background, &delta_second),
        !delta_second.is_empty(),
        first,
    )?;

    let mut result = delta_first;
    for id in delta_second {
        if !result.contains(&id) {
            result.push(id);
        }
    }
    Ok(result)
}
