//! Detection of error tuples that the rest of the model already excludes.
//!
//! An error tuple is only worth a negative test input if some valid input
//! contains it. For each tuple of each error tuple list the oracle is asked
//! whether the tuple can occur once its own list is negated; if not, the
//! constraints responsible are explained and, optionally, diagnosed.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use weave_model::oracle::SatisfiabilityOracle;
use weave_model::sat::SatOracle;
use weave_model::{Combination, ConstraintId, TupleList};

use crate::diagnosis::{diagnose, DiagnosisPolicy};
use crate::explain::{check_consistency, explain, Explanation};
use crate::ConflictError;

/// Which conflict analyses run. Everything is off by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictDetectionConfig {
    pub detect_conflicts: bool,
    pub explain_conflicts: bool,
    pub diagnose_conflicts: bool,
    pub diagnosis: DiagnosisPolicy,
}

impl Default for ConflictDetectionConfig {
    fn default() -> Self {
        Self {
            detect_conflicts: false,
            explain_conflicts: false,
            diagnose_conflicts: false,
            diagnosis: DiagnosisPolicy::Exhaustive,
        }
    }
}

impl ConflictDetectionConfig {
    /// Detect, explain and diagnose exhaustively.
    pub fn enabled() -> Self {
        Self {
            detect_conflicts: true,
            explain_conflicts: true,
            diagnose_conflicts: true,
            diagnosis: DiagnosisPolicy::Exhaustive,
        }
    }

    pub fn validate(&self) -> Result<(), ConflictError> {
        if self.explain_conflicts && !self.detect_conflicts {
            return Err(ConflictError::InvalidConfiguration(
                "conflict explanation requires conflict detection",
            ));
        }
        if self.diagnose_conflicts && !self.explain_conflicts {
            return Err(ConflictError::InvalidConfiguration(
                "conflict diagnosis requires conflict explanation",
            ));
        }
        Ok(())
    }
}

/// An error tuple that no valid input can contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingInvalidTuple {
    pub tuple_list_id: ConstraintId,
    pub involved_parameters: Vec<usize>,
    /// The tuple as a full-length combination.
    pub tuple: Combination,
    pub explanation: Explanation,
    pub diagnoses: Vec<Vec<ConstraintId>>,
}

/// Check every tuple of every error tuple list of the oracle's model.
///
/// The oracle is returned to its initial state: negations are restored,
/// assignment constraints removed and every constraint enabled, also when
/// an error interrupts the search.
pub fn detect_missing_invalid_tuples(
    oracle: &mut SatOracle,
    config: &ConflictDetectionConfig,
) -> Result<Vec<MissingInvalidTuple>, ConflictError> {
    config.validate()?;
    if !config.detect_conflicts {
        return Ok(Vec::new());
    }

    let model = oracle.model().clone();
    let correct: Vec<ConstraintId> = model
        .all_tuple_lists()
        .filter(|list| list.is_marked_as_correct())
        .map(TupleList::id)
        .collect();

    let mut missing = Vec::new();
    for list in model.error_tuple_lists() {
        let relaxable: Vec<ConstraintId> = model
            .all_tuple_lists()
            .filter(|other| other.id() != list.id() && !other.is_marked_as_correct())
            .map(TupleList::id)
            .collect();

        oracle.negate(list.id())?;
        let found = check_error_list(
            oracle,
            config,
            list,
            model.number_of_parameters(),
            &correct,
            &relaxable,
        );
        oracle.restore(list.id())?;
        missing.extend(found?);
    }

    info!(missing = missing.len(), "conflict detection finished");
    Ok(missing)
}

fn check_error_list(
    oracle: &mut SatOracle,
    config: &ConflictDetectionConfig,
    list: &TupleList,
    number_of_parameters: usize,
    correct: &[ConstraintId],
    relaxable: &[ConstraintId],
) -> Result<Vec<MissingInvalidTuple>, ConflictError> {
    let mut missing = Vec::new();
    for tuple in list.expanded_tuples(number_of_parameters) {
        let assignment = oracle.add_assignment(&tuple)?;
        let mut background = vec![list.id(), assignment];
        background.extend(correct.iter().copied().filter(|&id| id != list.id()));

        let outcome = check_tuple(oracle, config, &background, relaxable);
        oracle.remove_assignment(assignment)?;
        oracle.enable_all();

        let Some((explanation, diagnoses)) = outcome? else {
            continue;
        };
        let explanation = without_constraint(explanation, assignment);
        info!(
            tuple_list_id = list.id(),
            tuple = ?tuple,
            ?diagnoses,
            "error tuple cannot occur in any valid input"
        );
        missing.push(MissingInvalidTuple {
            tuple_list_id: list.id(),
            involved_parameters: list.involved_parameters().to_vec(),
            tuple,
            explanation,
            diagnoses,
        });
    }
    Ok(missing)
}

/// `None` when the tuple can occur.
fn check_tuple(
    oracle: &mut SatOracle,
    config: &ConflictDetectionConfig,
    background: &[ConstraintId],
    relaxable: &[ConstraintId],
) -> Result<Option<(Explanation, Vec<Vec<ConstraintId>>)>, ConflictError> {
    if !config.explain_conflicts || relaxable.is_empty() {
        let all: Vec<ConstraintId> = background.iter().chain(relaxable).copied().collect();
        if check_consistency(oracle, &all)? {
            return Ok(None);
        }
        let explanation = if relaxable.is_empty() {
            Explanation::InconsistentBackground {
                background: background.to_vec(),
                relaxable: Vec::new(),
            }
        } else {
            Explanation::Unknown
        };
        return Ok(Some((explanation, Vec::new())));
    }

    let explanation = explain(oracle, background, relaxable)?;
    let diagnoses = match &explanation {
        Explanation::NoConflict => return Ok(None),
        Explanation::Conflict(set) if config.diagnose_conflicts => {
            diagnose(oracle, set, config.diagnosis)?
        }
        _ => Vec::new(),
    };
    debug!(?explanation, "explained missing invalid tuple");
    Ok(Some((explanation, diagnoses)))
}

/// Drop an internal assignment id from a reported background.
fn without_constraint(explanation: Explanation, id: ConstraintId) -> Explanation {
    let strip = |ids: Vec<ConstraintId>| -> Vec<ConstraintId> {
        ids.into_iter().filter(|&other| other != id).collect()
    };
    match explanation {
        Explanation::InconsistentBackground {
            background,
            relaxable,
        } => Explanation::InconsistentBackground {
            background: strip(background),
            relaxable,
        },
        Explanation::Conflict(mut set) => {
            set.background = strip(set.background);
            Explanation::Conflict(set)
        }
        other => other,
    }
}
