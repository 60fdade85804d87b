//! One testing session over a fixed model.
//!
//! The session owns the generated groups and, per group, the state of its
//! fault characterization: every input handed out so far, the results
//! gathered before the first failure, and the algorithm once one exists.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use weave_characterize::{CharacterizationError, FaultCharacterizationAlgorithm};
use weave_conflict::{detect_missing_invalid_tuples, ConflictError, Explanation, MissingInvalidTuple};
use weave_generate::{generate_groups, GenerationError};
use weave_model::checker::ConstraintCheckerFactory;
use weave_model::group::{GroupId, TestInputGroup};
use weave_model::report::{ReportEvent, Reporter};
use weave_model::sat::SatOracle;
use weave_model::{Combination, ModelError, TestModel, TestResults};

use crate::config::EngineConfig;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid model: {0}")]
    Model(#[from] ModelError),

    #[error("configuration parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("characterization error: {0}")]
    Characterization(#[from] CharacterizationError),

    #[error("conflict analysis error: {0}")]
    Conflict(#[from] ConflictError),

    #[error("unknown test input group {0}")]
    UnknownGroup(GroupId),
}

/// Characterization bookkeeping for one group.
struct GroupState {
    group: TestInputGroup,
    /// Inputs handed out for this group; results for anything else are ignored.
    issued: BTreeSet<Combination>,
    /// Results gathered while nothing has failed yet.
    pending: TestResults,
    algorithm: Option<Box<dyn FaultCharacterizationAlgorithm>>,
    converged: bool,
}

impl GroupState {
    fn new(group: TestInputGroup) -> Self {
        Self {
            issued: group.inputs.iter().cloned().collect(),
            group,
            pending: TestResults::new(),
            algorithm: None,
            converged: false,
        }
    }
}

pub struct Session {
    model: TestModel,
    config: EngineConfig,
    checker_factory: Arc<dyn ConstraintCheckerFactory>,
    reporter: Arc<dyn Reporter>,
    groups: BTreeMap<GroupId, GroupState>,
    oracle: Mutex<SatOracle>,
}

impl Session {
    pub fn new(
        model: TestModel,
        config: EngineConfig,
        checker_factory: Arc<dyn ConstraintCheckerFactory>,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self, SessionError> {
        model.validate()?;
        config.validate()?;
        let oracle = Mutex::new(SatOracle::new(&model));
        Ok(Self {
            model,
            config,
            checker_factory,
            reporter,
            groups: BTreeMap::new(),
            oracle,
        })
    }

    pub fn model(&self) -> &TestModel {
        &self.model
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generate all groups, replacing any generated earlier.
    pub fn generate(&mut self) -> Result<Vec<TestInputGroup>, SessionError> {
        let groups = generate_groups(
            &self.model,
            self.checker_factory.as_ref(),
            &self.config.generation(),
            self.reporter.as_ref(),
        )?;
        self.groups = groups
            .iter()
            .map(|group| (group.id, GroupState::new(group.clone())))
            .collect();
        Ok(groups)
    }

    pub fn group(&self, id: GroupId) -> Option<&TestInputGroup> {
        self.groups.get(&id).map(|state| &state.group)
    }

    /// Feed the results of a round to the group's characterization and
    /// return the inputs to execute next. An empty list means there is
    /// nothing (more) to execute for this group.
    pub fn submit_results(
        &mut self,
        id: GroupId,
        results: &TestResults,
    ) -> Result<Vec<Combination>, SessionError> {
        let state = self.groups.get_mut(&id).ok_or(SessionError::UnknownGroup(id))?;

        let mut accepted = TestResults::new();
        for (input, result) in results {
            self.model.check_length(input)?;
            if state.issued.contains(input) {
                accepted.insert(input.clone(), result.clone());
            } else {
                warn!(group = %id, ?input, "ignoring result for an input that was never issued");
            }
        }

        let (Some(strategy), Some(configuration)) =
            (self.config.characterization, state.group.characterization.as_ref())
        else {
            return Ok(Vec::new());
        };
        if state.converged || accepted.is_empty() {
            return Ok(Vec::new());
        }

        let next = match state.algorithm.as_mut() {
            Some(algorithm) => algorithm.compute_next_test_inputs(&accepted)?,
            None => {
                state.pending.extend(accepted);
                if !state.pending.values().any(|result| result.is_unsuccessful()) {
                    debug!(group = %id, "no failure yet");
                    return Ok(Vec::new());
                }
                let mut algorithm = strategy.create(configuration)?;
                // Pending results survive a failed first round.
                let next = algorithm.compute_next_test_inputs(&state.pending)?;
                state.pending.clear();
                state.algorithm = Some(algorithm);
                next
            }
        };

        if next.is_empty() {
            state.converged = true;
            let combinations = state
                .algorithm
                .as_ref()
                .map(|algorithm| algorithm.compute_failure_inducing_combinations())
                .unwrap_or_default();
            info!(group = %id, found = combinations.len(), "fault characterization converged");
            self.reporter.report(ReportEvent::FailureInducingCombinations {
                group: id,
                combinations,
            });
        } else {
            state.issued.extend(next.iter().cloned());
            self.reporter.report(ReportEvent::CharacterizationInputs {
                group: id,
                inputs: next.clone(),
            });
        }
        Ok(next)
    }

    /// The group's current failure-inducing combinations; empty before the
    /// first failure.
    pub fn failure_inducing_combinations(&self, id: GroupId) -> Result<Vec<Combination>, SessionError> {
        let state = self.groups.get(&id).ok_or(SessionError::UnknownGroup(id))?;
        Ok(state
            .algorithm
            .as_ref()
            .map(|algorithm| algorithm.compute_failure_inducing_combinations())
            .unwrap_or_default())
    }

    /// Has the group's characterization finished?
    pub fn is_converged(&self, id: GroupId) -> Result<bool, SessionError> {
        let state = self.groups.get(&id).ok_or(SessionError::UnknownGroup(id))?;
        Ok(state.converged)
    }

    /// Find error tuples the rest of the model already excludes.
    pub fn detect_conflicts(&self) -> Result<Vec<MissingInvalidTuple>, SessionError> {
        let missing = {
            let mut oracle = self.oracle.lock().unwrap();
            detect_missing_invalid_tuples(&mut oracle, &self.config.conflict_detection)?
        };
        for tuple in &missing {
            let conflict = match &tuple.explanation {
                Explanation::Conflict(set) => set.conflict.clone(),
                _ => Vec::new(),
            };
            self.reporter.report(ReportEvent::MissingInvalidTuple {
                tuple_list_id: tuple.tuple_list_id,
                tuple: tuple.tuple.clone(),
                conflict,
                diagnoses: tuple.diagnoses.clone(),
            });
        }
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_characterize::CharacterizationStrategy;
    use weave_model::checker::HardConstraintCheckerFactory;
    use weave_model::report::NoopReporter;
    use weave_model::TestResult;

    #[test]
    fn test_pending_results_kept_when_first_round_fails() {
        let model = TestModel::new(2, vec![2, 2, 2], vec![], vec![]).unwrap();
        let config = EngineConfig {
            parallel: false,
            characterization: Some(CharacterizationStrategy::DeltaDebugging),
            ..EngineConfig::default()
        };
        let mut session = Session::new(
            model,
            config,
            Arc::new(HardConstraintCheckerFactory),
            Arc::new(NoopReporter),
        )
        .unwrap();
        let positive = session.generate().unwrap().remove(0);

        // A malformed leftover makes the algorithm reject the first round.
        let malformed: Combination = vec![0, 0];
        session
            .groups
            .get_mut(&GroupId::Positive)
            .unwrap()
            .pending
            .insert(malformed.clone(), TestResult::Pass);

        let failing = positive.inputs[0].clone();
        let results = TestResults::from([(failing.clone(), TestResult::failed("boom"))]);
        assert!(matches!(
            session.submit_results(GroupId::Positive, &results),
            Err(SessionError::Characterization(_))
        ));

        let state = &session.groups[&GroupId::Positive];
        assert!(state.algorithm.is_none());
        assert!(state.pending.contains_key(&malformed));
        assert!(state.pending[&failing].is_unsuccessful());

        // Once the bad entry is gone the failure still starts characterization.
        session
            .groups
            .get_mut(&GroupId::Positive)
            .unwrap()
            .pending
            .remove(&malformed);
        let next = session.submit_results(GroupId::Positive, &results).unwrap();
        assert!(!next.is_empty());
        let state = &session.groups[&GroupId::Positive];
        assert!(state.algorithm.is_some());
        assert!(state.pending.is_empty());
    }
}
