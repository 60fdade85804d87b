//! IPOG: in-parameter-order covering array generation.
//!
//! 1. Seed the matrix with the valid cartesian product of the initial parameters.
//! 2. For every remaining parameter `p`:
//!    - **horizontal extension**: give each row the value of `p` that covers
//!      the most uncovered combinations and that the checker accepts, ties
//!      broken by the lowest value; rows without any accepted value keep
//!      `p` unassigned and are patched at the end,
//!    - **vertical extension**: merge every still uncovered combination into
//!      the first compatible row, or append it as a new row.
//! 3. Fill remaining unassigned slots with the lowest accepted value and
//!    drop anything that is still not a valid full input.

use std::collections::HashSet;

use tracing::{debug, warn};

use weave_model::checker::ConstraintChecker;
use weave_model::combinator::value_combinations;
use weave_model::combination::{Combination, NO_VALUE};
use weave_model::TestModel;

use crate::coverage::CoverageMap;
use crate::factory::{ParameterCombinationFactory, TWiseFactory};
use crate::order::{ParameterOrder, StrengthBasedOrder};
use crate::partitioner::CombinationPartitioner;

/// A configured IPOG run over one model and checker.
pub struct Ipog<'a> {
    model: &'a TestModel,
    checker: &'a dyn ConstraintChecker,
    order: Box<dyn ParameterOrder + 'a>,
    factory: Box<dyn ParameterCombinationFactory + 'a>,
}

impl<'a> Ipog<'a> {
    /// Declaration order, plain `t`-wise coverage.
    pub fn new(model: &'a TestModel, checker: &'a dyn ConstraintChecker) -> Self {
        Self {
            model,
            checker,
            order: Box::new(StrengthBasedOrder),
            factory: Box::new(TWiseFactory),
        }
    }

    pub fn with_order(mut self, order: impl ParameterOrder + 'a) -> Self {
        self.order = Box::new(order);
        self
    }

    pub fn with_factory(mut self, factory: impl ParameterCombinationFactory + 'a) -> Self {
        self.factory = Box::new(factory);
        self
    }

    /// Build the test suite. Every returned input is fully assigned and valid.
    pub fn generate(&self) -> Vec<Combination> {
        let sizes = self.model.parameter_sizes();
        let n = self.model.number_of_parameters();
        let strength = self.model.strength();

        let initial = self.order.initial_parameters(n, strength);
        let mut rows: Vec<Combination> = value_combinations(&initial, sizes)
            .into_iter()
            .filter(|row| self.checker.is_extension_valid(row))
            .collect();
        debug!(parameters = ?initial, rows = rows.len(), "initial matrix");

        let mut covered_parameters = initial;
        for parameter in self.order.remaining_parameters(n, strength) {
            let combinations = self
                .factory
                .create(&covered_parameters, parameter, strength);
            let mut coverage = CoverageMap::new(combinations, parameter, sizes, self.checker);

            self.extend_horizontally(&mut rows, parameter, &mut coverage);
            if coverage.has_uncovered() {
                self.extend_vertically(&mut rows, parameter, &mut coverage);
            }

            covered_parameters.push(parameter);
            debug!(parameter, rows = rows.len(), "parameter added");
        }

        self.complete(rows)
    }

    fn extend_horizontally(&self, rows: &mut [Combination], parameter: usize, coverage: &mut CoverageMap) {
        let mut unextended = 0usize;
        for row in rows.iter_mut() {
            let gains = coverage.compute_gains(row);
            let mut candidates: Vec<usize> = (0..gains.len()).collect();
            // Stable sort keeps lower values first among equal gains.
            candidates.sort_by(|a, b| gains[*b].cmp(&gains[*a]));

            let chosen = candidates.into_iter().find(|&value| {
                row[parameter] = value as i32;
                self.checker.is_extension_valid(row)
            });
            match chosen {
                Some(_) => coverage.mark_as_covered(row),
                None => {
                    row[parameter] = NO_VALUE;
                    unextended += 1;
                }
            }
        }
        if unextended > 0 {
            warn!(parameter, rows = unextended, "no valid value for rows during horizontal extension");
        }
    }

    fn extend_vertically(&self, rows: &mut Vec<Combination>, parameter: usize, coverage: &mut CoverageMap) {
        let size = self.model.size_of_parameter(parameter);
        let mut partitioner = CombinationPartitioner::new(rows, parameter, size);

        for tuple in coverage.uncovered_combinations() {
            if coverage.is_covered(&tuple) {
                continue;
            }
            if let Some(index) = partitioner.extend_suitable(rows, &tuple, self.checker) {
                coverage.mark_as_covered(&rows[index]);
            } else if self.checker.is_extension_valid(&tuple) {
                partitioner.add(rows.len(), &tuple);
                coverage.mark_as_covered(&tuple);
                rows.push(tuple);
            } else {
                debug!(?tuple, "skipping unreachable combination");
                coverage.mark_as_covered(&tuple);
            }
        }
    }

    /// Assign every free slot, drop invalid rows and duplicates.
    fn complete(&self, rows: Vec<Combination>) -> Vec<Combination> {
        let sizes = self.model.parameter_sizes();
        let mut seen = HashSet::new();
        let mut result = Vec::with_capacity(rows.len());
        let mut dropped = 0usize;

        for mut row in rows {
            for parameter in 0..row.len() {
                if row[parameter] != NO_VALUE {
                    continue;
                }
                let found = (0..sizes[parameter]).any(|value| {
                    row[parameter] = value as i32;
                    self.checker.is_extension_valid(&row)
                });
                if !found {
                    row[parameter] = NO_VALUE;
                    break;
                }
            }
            if self.checker.is_valid(&row) {
                if seen.insert(row.clone()) {
                    result.push(row);
                }
            } else {
                dropped += 1;
            }
        }

        if dropped > 0 {
            warn!(rows = dropped, "dropped rows that could not be completed");
        }
        result
    }
}

/// Generate a covering suite with the default order and factory.
pub fn generate(model: &TestModel, checker: &dyn ConstraintChecker) -> Vec<Combination> {
    Ipog::new(model, checker).generate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::missing_combinations;
    use weave_model::checker::NoConstraintChecker;
    use weave_model::sat::HardConstraintChecker;
    use weave_model::TupleList;

    #[test]
    fn test_strength_one_single_parameter() {
        let model = TestModel::new(1, vec![3], vec![], vec![]).unwrap();
        let rows = generate(&model, &NoConstraintChecker);
        assert_eq!(rows, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_pairwise_three_binary_parameters() {
        let model = TestModel::new(2, vec![2, 2, 2], vec![], vec![]).unwrap();
        let rows = generate(&model, &NoConstraintChecker);
        assert!(rows.len() >= 4 && rows.len() <= 6, "got {} rows", rows.len());
        assert!(missing_combinations(&rows, 2, &[2, 2, 2], &NoConstraintChecker).is_empty());
    }

    #[test]
    fn test_horizontal_tie_break_is_lowest_value() {
        let model = TestModel::new(1, vec![2, 2], vec![], vec![]).unwrap();
        let rows = generate(&model, &NoConstraintChecker);
        assert_eq!(rows, vec![vec![0, 0], vec![1, 1]]);
    }

    #[test]
    fn test_constraints_respected_and_valid_pairs_covered() {
        let model = TestModel::new(
            2,
            vec![2, 3, 2],
            vec![TupleList::new(1, vec![0, 1], vec![vec![0, 0], vec![1, 2]]).unwrap()],
            vec![TupleList::new(2, vec![1, 2], vec![vec![1, 1]]).unwrap()],
        )
        .unwrap();
        let checker = HardConstraintChecker::new(&model);
        let rows = generate(&model, &checker);
        assert!(rows.iter().all(|row| checker.is_valid(row)));
        assert!(missing_combinations(&rows, 2, model.parameter_sizes(), &checker).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let model = TestModel::new(2, vec![3, 2, 3, 2], vec![], vec![]).unwrap();
        assert_eq!(
            generate(&model, &NoConstraintChecker),
            generate(&model, &NoConstraintChecker)
        );
    }
}
