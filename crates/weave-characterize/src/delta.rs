//! Improved delta debugging.
//!
//! Works on one unexplained failing input at a time and asks for a single
//! input per round:
//! - **isolation**: the suspicious parameters are split in half and the
//!   first half (plus every parameter already shown unrelated) is mutated;
//!   a pass means the fault lies in the mutated half, a failure moves the
//!   search to the other half,
//! - once one parameter is left it joins the related set and a **check**
//!   input mutates everything except the related parameters; a failure
//!   means the related parameters alone induce the failure, a pass starts
//!   another isolation.
//!
//! Suspicious parameters come from the closest passing input that agrees
//! on all related parameters, or from all unrelated parameters if there is
//! none. Mutated inputs must satisfy the checker. Outcomes are never
//! assumed: if no valid input separates the suspicious parameters they all
//! stay related, and if no valid input confirms the related parameters the
//! whole failing input is reported unreduced.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use weave_model::checker::ConstraintChecker;
use weave_model::combination::{contains, same_for_all_given_parameters};
use weave_model::group::FaultCharacterizationConfiguration;
use weave_model::{Combination, TestModel, TestResults, NO_VALUE};

use crate::{CharacterizationError, FaultCharacterizationAlgorithm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Initialization,
    Isolation,
    Check,
}

#[derive(Debug)]
pub struct ImprovedDeltaDebugging {
    model: TestModel,
    checker: Arc<dyn ConstraintChecker>,
    phase: Phase,
    /// Executed inputs and whether they passed.
    executed: BTreeMap<Combination, bool>,
    failure_inducing: Vec<Combination>,
    current_failed: Combination,
    expected: Option<Combination>,
    related: BTreeSet<usize>,
    unrelated: BTreeSet<usize>,
    suspicious: BTreeSet<usize>,
    first_half: BTreeSet<usize>,
    second_half: BTreeSet<usize>,
}

impl ImprovedDeltaDebugging {
    pub fn new(configuration: &FaultCharacterizationConfiguration) -> Self {
        Self {
            model: configuration.model.clone(),
            checker: Arc::clone(&configuration.checker),
            phase: Phase::Initialization,
            executed: BTreeMap::new(),
            failure_inducing: Vec::new(),
            current_failed: Vec::new(),
            expected: None,
            related: BTreeSet::new(),
            unrelated: BTreeSet::new(),
            suspicious: BTreeSet::new(),
            first_half: BTreeSet::new(),
            second_half: BTreeSet::new(),
        }
    }

    fn step(&mut self) {
        match self.phase {
            Phase::Initialization => self.start_next_failed_input(),
            Phase::Isolation => {
                if self.outcome() {
                    self.suspicious = std::mem::take(&mut self.first_half);
                } else {
                    self.suspicious = std::mem::take(&mut self.second_half);
                    self.unrelated.extend(self.first_half.iter().copied());
                }
                self.divide_or_check();
            }
            Phase::Check => {
                if self.outcome() {
                    self.find_suspicious_parameters();
                } else {
                    let combination = self.related_combination();
                    debug!(?combination, "failure-inducing combination isolated");
                    self.failure_inducing.push(combination);
                    self.start_next_failed_input();
                }
            }
        }
    }

    /// Did the last expected input pass?
    fn outcome(&self) -> bool {
        self.expected
            .as_ref()
            .and_then(|input| self.executed.get(input).copied())
            .unwrap_or(false)
    }

    fn start_next_failed_input(&mut self) {
        self.phase = Phase::Initialization;
        self.related.clear();
        let next = self
            .executed
            .iter()
            .filter(|(_, passed)| !**passed)
            .map(|(input, _)| input)
            .find(|input| !self.failure_inducing.iter().any(|fic| contains(input, fic)))
            .cloned();

        match next {
            Some(input) => {
                self.current_failed = input;
                self.find_suspicious_parameters();
            }
            None => self.expected = None,
        }
    }

    fn find_suspicious_parameters(&mut self) {
        let related: Vec<usize> = self.related.iter().copied().collect();
        let nearest = self
            .executed
            .iter()
            .filter(|(_, passed)| **passed)
            .map(|(input, _)| input)
            .filter(|input| same_for_all_given_parameters(input, &self.current_failed, &related))
            .min_by_key(|input| Reverse(self.similarity(input)));

        self.suspicious = match nearest {
            Some(passed) => (0..passed.len())
                .filter(|&p| passed[p] != self.current_failed[p])
                .collect(),
            None => (0..self.current_failed.len())
                .filter(|p| !self.related.contains(p))
                .collect(),
        };
        self.unrelated.clear();

        if self.suspicious.is_empty() {
            // Nothing left to isolate: the related parameters explain the failure.
            self.phase = Phase::Check;
            self.expected = Some(self.current_failed.clone());
            return;
        }
        self.divide_or_check();
    }

    fn similarity(&self, input: &[i32]) -> usize {
        input
            .iter()
            .zip(&self.current_failed)
            .filter(|(a, b)| a == b)
            .count()
    }

    fn divide_or_check(&mut self) {
        if self.suspicious.len() > 1 {
            let first_size = self.suspicious.len() / 2;
            self.first_half = self.suspicious.iter().take(first_size).copied().collect();
            self.second_half = self.suspicious.iter().skip(first_size).copied().collect();
            let keep: BTreeSet<usize> = (0..self.current_failed.len())
                .filter(|p| !self.unrelated.contains(p) && !self.first_half.contains(p))
                .collect();
            if let Some(input) = self.mutate(&keep) {
                self.phase = Phase::Isolation;
                self.expected = Some(input);
                return;
            }
            debug!(suspicious = ?self.suspicious, "no valid input separates the suspicious parameters");
            self.first_half.clear();
            self.second_half.clear();
        }
        self.related.append(&mut self.suspicious);
        self.check();
    }

    /// Ask for the failed input with everything but the related parameters
    /// mutated.
    fn check(&mut self) {
        self.phase = Phase::Check;
        let keep = self.related.clone();
        match self.mutate(&keep) {
            Some(input) => self.expected = Some(input),
            None => {
                debug!(input = ?self.current_failed, "no valid input confirms the related parameters");
                self.failure_inducing.push(self.current_failed.clone());
                self.start_next_failed_input();
            }
        }
    }

    /// The failed input with every parameter outside `keep` changed to a
    /// different value, chosen parameter by parameter so that the partial
    /// input stays extensible. Parameters with a single value keep it.
    fn mutate(&self, keep: &BTreeSet<usize>) -> Option<Combination> {
        let mut input: Combination = self
            .current_failed
            .iter()
            .enumerate()
            .map(|(p, &v)| if keep.contains(&p) { v } else { NO_VALUE })
            .collect();

        for p in (0..input.len()).filter(|p| !keep.contains(p)) {
            let size = self.model.size_of_parameter(p) as i32;
            let original = self.current_failed[p];
            let candidates: Vec<i32> = if size < 2 {
                vec![original]
            } else {
                (1..size).map(|offset| (original + offset) % size).collect()
            };
            let chosen = candidates.into_iter().find(|&value| {
                input[p] = value;
                self.checker.is_extension_valid(&input)
            })?;
            input[p] = chosen;
        }

        self.checker.is_valid(&input).then_some(input)
    }

    fn related_combination(&self) -> Combination {
        self.current_failed
            .iter()
            .enumerate()
            .map(|(p, &v)| if self.related.contains(&p) { v } else { NO_VALUE })
            .collect()
    }

    fn waiting_for_known_outcome(&self) -> bool {
        match &self.expected {
            Some(input) => self.executed.contains_key(input),
            None => false,
        }
    }
}

impl FaultCharacterizationAlgorithm for ImprovedDeltaDebugging {
    fn compute_next_test_inputs(
        &mut self,
        results: &TestResults,
    ) -> Result<Vec<Combination>, CharacterizationError> {
        for input in results.keys() {
            self.model.check_length(input)?;
        }
        if self.phase != Phase::Initialization {
            if let Some(expected) = &self.expected {
                if !results.contains_key(expected) {
                    return Err(CharacterizationError::MissingExpectedInput(expected.clone()));
                }
            }
        }
        for (input, result) in results {
            self.executed.insert(input.clone(), result.is_successful());
        }

        loop {
            self.step();
            if !self.waiting_for_known_outcome() {
                break;
            }
        }

        Ok(self.expected.iter().cloned().collect())
    }

    fn compute_failure_inducing_combinations(&self) -> Vec<Combination> {
        self.failure_inducing.clone()
    }
}
