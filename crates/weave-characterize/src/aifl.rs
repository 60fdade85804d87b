//! Iterative intersection (AIFL) with an iteration bound.
//!
//! All sub-combinations of the failing inputs start out suspicious; every
//! passing input clears its own sub-combinations. Each round mutates every
//! failing input of the previous round in one position at a time, so the
//! next results separate candidates that differ in that position.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use weave_model::checker::ConstraintChecker;
use weave_model::combination::{contains, sub_combinations};
use weave_model::group::FaultCharacterizationConfiguration;
use weave_model::{Combination, TestModel, TestResults};

use crate::reducer::collapse;
use crate::suspicious::SuspiciousSet;
use crate::{CharacterizationError, FaultCharacterizationAlgorithm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiflConfig {
    /// Stop once no more than this many suspicious combinations remain.
    pub suspicious_combinations_threshold: usize,
}

impl Default for AiflConfig {
    fn default() -> Self {
        Self {
            suspicious_combinations_threshold: 1,
        }
    }
}

#[derive(Debug)]
pub struct Aifl {
    model: TestModel,
    checker: Arc<dyn ConstraintChecker>,
    config: AiflConfig,
    iteration: usize,
    suspicious: SuspiciousSet,
}

impl Aifl {
    pub fn new(configuration: &FaultCharacterizationConfiguration, config: AiflConfig) -> Self {
        Self {
            model: configuration.model.clone(),
            checker: Arc::clone(&configuration.checker),
            config,
            iteration: 1,
            suspicious: SuspiciousSet::default(),
        }
    }

    fn should_continue(&self, results: &TestResults) -> bool {
        self.iteration < self.model.number_of_parameters()
            && self.suspicious.current.len() > self.config.suspicious_combinations_threshold
            && !self.suspicious.stabilized()
            && results.values().any(|result| result.is_unsuccessful())
    }

    /// Every one-position mutation of the round's failing inputs that the checker accepts.
    fn mutations(&self, results: &TestResults) -> Vec<Combination> {
        let mut inputs = Vec::new();
        for (input, _) in results.iter().filter(|(_, r)| r.is_unsuccessful()) {
            for (parameter, &size) in self.model.parameter_sizes().iter().enumerate() {
                if size < 2 {
                    continue;
                }
                let mut mutated = input.clone();
                mutated[parameter] = (input[parameter] + 1) % size as i32;
                if self.checker.is_valid(&mutated) {
                    inputs.push(mutated);
                }
            }
        }
        inputs
    }
}

impl FaultCharacterizationAlgorithm for Aifl {
    fn compute_next_test_inputs(
        &mut self,
        results: &TestResults,
    ) -> Result<Vec<Combination>, CharacterizationError> {
        self.suspicious
            .absorb(&self.model, results, sub_combinations)?;
        debug!(
            iteration = self.iteration,
            suspicious = self.suspicious.current.len(),
            "aifl round"
        );

        if !self.should_continue(results) {
            return Ok(Vec::new());
        }
        self.iteration += 1;
        Ok(self.suspicious.unexecuted(self.mutations(results)))
    }

    /// The minimal elements of the reduced suspicious set.
    fn compute_failure_inducing_combinations(&self) -> Vec<Combination> {
        let reduced: BTreeSet<Combination> =
            collapse(self.model.parameter_sizes(), self.suspicious.current.clone());
        reduced
            .iter()
            .filter(|candidate| {
                !reduced
                    .iter()
                    .any(|other| other != *candidate && contains(candidate, other))
            })
            .cloned()
            .collect()
    }
}
