//! Bookkeeping shared by the suspicious-set algorithms (AIFL, Ben).
//!
//! Round by round:
//! 1. first round only: every relevant sub-combination of a failing input
//!    becomes suspicious,
//! 2. every relevant sub-combination of a passing input is cleared,
//! 3. the round's results join the execution history.

use std::collections::BTreeSet;

use weave_model::{Combination, TestModel, TestResults};

use crate::CharacterizationError;

#[derive(Debug, Default)]
pub(crate) struct SuspiciousSet {
    /// Every executed input and its result.
    pub(crate) history: TestResults,
    pub(crate) previous: BTreeSet<Combination>,
    pub(crate) current: BTreeSet<Combination>,
}

impl SuspiciousSet {
    /// Apply one round of results. `relevant` maps an executed input to
    /// the sub-combinations the algorithm tracks.
    pub(crate) fn absorb<F>(
        &mut self,
        model: &TestModel,
        results: &TestResults,
        relevant: F,
    ) -> Result<(), CharacterizationError>
    where
        F: Fn(&[i32]) -> Vec<Combination>,
    {
        if results.is_empty() {
            return Err(CharacterizationError::EmptyResults);
        }
        for input in results.keys() {
            model.check_length(input)?;
        }

        self.previous = self.current.clone();
        if self.history.is_empty() {
            for (input, result) in results {
                if result.is_unsuccessful() {
                    self.current.extend(relevant(input));
                }
            }
        }
        for (input, result) in results {
            if result.is_successful() {
                for sub in relevant(input) {
                    self.current.remove(&sub);
                }
            }
        }
        self.history
            .extend(results.iter().map(|(input, result)| (input.clone(), result.clone())));
        Ok(())
    }

    /// Drop candidates that were already executed, keeping first occurrences.
    pub(crate) fn unexecuted(&self, candidates: Vec<Combination>) -> Vec<Combination> {
        let mut seen = BTreeSet::new();
        candidates
            .into_iter()
            .filter(|c| !self.history.contains_key(c) && seen.insert(c.clone()))
            .collect()
    }

    pub(crate) fn stabilized(&self) -> bool {
        self.previous.len() == self.current.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_model::combination::sub_combinations;
    use weave_model::{TestResult, NO_VALUE};

    fn model() -> TestModel {
        TestModel::new(1, vec![2, 2], vec![], vec![]).unwrap()
    }

    #[test]
    fn test_first_round_seeds_and_clears() {
        let mut set = SuspiciousSet::default();
        let results = TestResults::from([
            (vec![0, 0], TestResult::failed("boom")),
            (vec![0, 1], TestResult::Pass),
        ]);
        set.absorb(&model(), &results, sub_combinations).unwrap();

        // (0, -) appears in the passing input, (-, 0) and (0, 0) do not.
        let expected: BTreeSet<Combination> =
            [vec![NO_VALUE, 0], vec![0, 0]].into_iter().collect();
        assert_eq!(set.current, expected);
        assert!(set.previous.is_empty());
        assert_eq!(set.history.len(), 2);
    }

    #[test]
    fn test_later_failures_do_not_add() {
        let mut set = SuspiciousSet::default();
        set.absorb(&model(), &TestResults::from([(vec![0, 0], TestResult::failed("x"))]), sub_combinations)
            .unwrap();
        let before = set.current.clone();
        set.absorb(&model(), &TestResults::from([(vec![1, 1], TestResult::failed("y"))]), sub_combinations)
            .unwrap();
        assert_eq!(set.current, before);
        assert!(set.stabilized());
    }

    #[test]
    fn test_unexecuted_filters_history_and_duplicates() {
        let mut set = SuspiciousSet::default();
        set.absorb(&model(), &TestResults::from([(vec![0, 0], TestResult::failed("x"))]), sub_combinations)
            .unwrap();
        let next = set.unexecuted(vec![vec![0, 0], vec![1, 0], vec![1, 0]]);
        assert_eq!(next, vec![vec![1, 0]]);
    }

    #[test]
    fn test_empty_round_rejected() {
        let mut set = SuspiciousSet::default();
        assert!(matches!(
            set.absorb(&model(), &TestResults::new(), sub_combinations),
            Err(CharacterizationError::EmptyResults)
        ));
    }
}
