//! Coverage bookkeeping for IPOG.
//!
//! When parameter `p` is added, every parameter subset produced by the
//! combination factory gets one flag per value combination:
//! - flags are addressed by a mixed-radix index over the subset's values,
//! - combinations the checker rejects start out covered (they are
//!   unreachable and never become an obligation),
//! - gains for horizontal extension are counted per value of `p`.

use tracing::debug;

use weave_model::checker::ConstraintChecker;
use weave_model::combinator::{parameter_combinations, value_combinations};
use weave_model::combination::{contains, empty_combination, Combination, NO_VALUE};

#[derive(Debug)]
struct CoverageEntry {
    /// Sorted, always contains the parameter being added.
    parameters: Vec<usize>,
    /// Radix weight per parameter (last parameter fastest).
    multipliers: Vec<usize>,
    covered: Vec<bool>,
}

impl CoverageEntry {
    fn new(parameters: Vec<usize>, parameter_sizes: &[usize]) -> Self {
        let mut multipliers = vec![1; parameters.len()];
        for i in (0..parameters.len().saturating_sub(1)).rev() {
            multipliers[i] = multipliers[i + 1] * parameter_sizes[parameters[i + 1]];
        }
        let total = parameters.iter().map(|&p| parameter_sizes[p]).product();
        Self {
            parameters,
            multipliers,
            covered: vec![false; total],
        }
    }

    /// Index of the row's values, with `parameter` optionally overridden.
    fn index(&self, row: &[i32], overridden: Option<(usize, i32)>) -> Option<usize> {
        let mut index = 0;
        for (&p, &multiplier) in self.parameters.iter().zip(&self.multipliers) {
            let value = match overridden {
                Some((q, v)) if q == p => v,
                _ => row[p],
            };
            if value == NO_VALUE {
                return None;
            }
            index += value as usize * multiplier;
        }
        Some(index)
    }

    fn combination_at(&self, index: usize, number_of_parameters: usize) -> Combination {
        let mut combination = empty_combination(number_of_parameters);
        let mut rest = index;
        for (&p, &multiplier) in self.parameters.iter().zip(&self.multipliers) {
            combination[p] = (rest / multiplier) as i32;
            rest %= multiplier;
        }
        combination
    }
}

/// Which value combinations involving the new parameter are still uncovered.
#[derive(Debug)]
pub struct CoverageMap {
    parameter: usize,
    parameter_sizes: Vec<usize>,
    entries: Vec<CoverageEntry>,
}

impl CoverageMap {
    pub fn new(
        parameter_combinations: Vec<Vec<usize>>,
        parameter: usize,
        parameter_sizes: &[usize],
        checker: &dyn ConstraintChecker,
    ) -> Self {
        let mut entries = Vec::with_capacity(parameter_combinations.len());
        let mut unreachable = 0usize;

        for parameters in parameter_combinations {
            let mut entry = CoverageEntry::new(parameters, parameter_sizes);
            for combination in value_combinations(&entry.parameters, parameter_sizes) {
                if !checker.is_extension_valid(&combination) {
                    if let Some(index) = entry.index(&combination, None) {
                        entry.covered[index] = true;
                        unreachable += 1;
                    }
                }
            }
            entries.push(entry);
        }

        if unreachable > 0 {
            debug!(parameter, unreachable, "skipping combinations rejected by the checker");
        }

        Self {
            parameter,
            parameter_sizes: parameter_sizes.to_vec(),
            entries,
        }
    }

    pub fn has_uncovered(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.covered.iter().any(|c| !c))
    }

    /// Number of newly covered combinations per value of the new parameter
    /// if `row` were extended with that value.
    pub fn compute_gains(&self, row: &[i32]) -> Vec<usize> {
        let size = self.parameter_sizes[self.parameter];
        let mut gains = vec![0usize; size];
        for entry in &self.entries {
            for (value, gain) in gains.iter_mut().enumerate() {
                if let Some(index) = entry.index(row, Some((self.parameter, value as i32))) {
                    if !entry.covered[index] {
                        *gain += 1;
                    }
                }
            }
        }
        gains
    }

    /// Mark every combination the row fully assigns as covered.
    pub fn mark_as_covered(&mut self, row: &[i32]) {
        for entry in &mut self.entries {
            if let Some(index) = entry.index(row, None) {
                entry.covered[index] = true;
            }
        }
    }

    pub fn is_covered(&self, combination: &[i32]) -> bool {
        self.entries.iter().all(|entry| {
            entry
                .index(combination, None)
                .map_or(true, |index| entry.covered[index])
        })
    }

    /// Uncovered combinations, entry by entry, in index order.
    pub fn uncovered_combinations(&self) -> Vec<Combination> {
        let n = self.parameter_sizes.len();
        self.entries
            .iter()
            .flat_map(|entry| {
                entry
                    .covered
                    .iter()
                    .enumerate()
                    .filter(|(_, covered)| !**covered)
                    .map(move |(index, _)| entry.combination_at(index, n))
            })
            .collect()
    }
}

/// Every `strength`-way combination the checker accepts that no row contains.
///
/// Quadratic; meant for verifying generated suites, not for generation.
pub fn missing_combinations(
    rows: &[Combination],
    strength: usize,
    parameter_sizes: &[usize],
    checker: &dyn ConstraintChecker,
) -> Vec<Combination> {
    let parameters: Vec<usize> = (0..parameter_sizes.len()).collect();
    parameter_combinations(&parameters, strength)
        .into_iter()
        .flat_map(|subset| value_combinations(&subset, parameter_sizes))
        .filter(|tuple| checker.is_extension_valid(tuple))
        .filter(|tuple| !rows.iter().any(|row| contains(row, tuple)))
        .collect()
}
