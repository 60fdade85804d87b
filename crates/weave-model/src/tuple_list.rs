//! Named lists of partial assignments over a fixed set of parameters.

use serde::{Deserialize, Serialize};

use crate::combination::{empty_combination, Combination};
use crate::model::ModelError;

/// Identifier of a constraint (a tuple list, or an ad-hoc assignment in the oracle).
pub type ConstraintId = u32;

/// A tuple list: forbidden ("error"/"exclusion") value tuples over some parameters.
///
/// Tuples are stored compactly, one value per involved parameter, in the
/// order of `involved_parameters`. [`TupleList::expanded_tuples`] gives the
/// full-length form with `NO_VALUE` outside the involved parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleList {
    id: ConstraintId,
    involved_parameters: Vec<usize>,
    tuples: Vec<Vec<i32>>,
    #[serde(default)]
    marked_as_correct: bool,
}

impl TupleList {
    /// Create a tuple list.
    ///
    /// The id must be positive, the involved parameters non-empty and
    /// distinct, and every tuple must assign a non-negative value to each
    /// involved parameter.
    pub fn new(
        id: ConstraintId,
        involved_parameters: Vec<usize>,
        tuples: Vec<Vec<i32>>,
    ) -> Result<Self, ModelError> {
        if id == 0 {
            return Err(ModelError::InvalidTupleListId(id));
        }
        if involved_parameters.is_empty() {
            return Err(ModelError::EmptyTupleList { id });
        }
        let mut sorted = involved_parameters.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != involved_parameters.len() {
            return Err(ModelError::DuplicateInvolvedParameter { id });
        }
        if tuples.is_empty() {
            return Err(ModelError::EmptyTupleList { id });
        }
        for tuple in &tuples {
            if tuple.len() != involved_parameters.len() {
                return Err(ModelError::TupleArity {
                    id,
                    expected: involved_parameters.len(),
                    actual: tuple.len(),
                });
            }
            if let Some(&value) = tuple.iter().find(|&&v| v < 0) {
                return Err(ModelError::NegativeTupleValue { id, value });
            }
        }
        Ok(Self {
            id,
            involved_parameters,
            tuples,
            marked_as_correct: false,
        })
    }

    /// Mark this list as known to be correct: conflict detection never relaxes it.
    pub fn marked_as_correct(mut self) -> Self {
        self.marked_as_correct = true;
        self
    }

    pub fn id(&self) -> ConstraintId {
        self.id
    }

    pub fn involved_parameters(&self) -> &[usize] {
        &self.involved_parameters
    }

    /// Compact tuples, aligned with [`TupleList::involved_parameters`].
    pub fn tuples(&self) -> &[Vec<i32>] {
        &self.tuples
    }

    pub fn is_marked_as_correct(&self) -> bool {
        self.marked_as_correct
    }

    /// The tuple at `index` as a full-length combination.
    pub fn expand_tuple(&self, index: usize, number_of_parameters: usize) -> Combination {
        let mut combination = empty_combination(number_of_parameters);
        for (&p, &value) in self.involved_parameters.iter().zip(&self.tuples[index]) {
            combination[p] = value;
        }
        combination
    }

    /// All tuples as full-length combinations.
    pub fn expanded_tuples(&self, number_of_parameters: usize) -> Vec<Combination> {
        (0..self.tuples.len())
            .map(|i| self.expand_tuple(i, number_of_parameters))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combination::NO_VALUE;

    #[test]
    fn test_expand_tuple() {
        let list = TupleList::new(3, vec![2, 0], vec![vec![1, 0]]).unwrap();
        assert_eq!(list.expand_tuple(0, 4), vec![0, NO_VALUE, 1, NO_VALUE]);
    }

    #[test]
    fn test_rejects_zero_id() {
        assert!(matches!(
            TupleList::new(0, vec![0], vec![vec![0]]),
            Err(ModelError::InvalidTupleListId(0))
        ));
    }

    #[test]
    fn test_rejects_wrong_arity() {
        let result = TupleList::new(1, vec![0, 1], vec![vec![0]]);
        assert!(matches!(result, Err(ModelError::TupleArity { expected: 2, actual: 1, .. })));
    }

    #[test]
    fn test_rejects_duplicate_parameters_and_negative_values() {
        assert!(TupleList::new(1, vec![1, 1], vec![vec![0, 0]]).is_err());
        assert!(TupleList::new(1, vec![0], vec![vec![NO_VALUE]]).is_err());
        assert!(TupleList::new(1, vec![0], vec![]).is_err());
    }

    #[test]
    fn test_marked_as_correct() {
        let list = TupleList::new(1, vec![0], vec![vec![0]]).unwrap();
        assert!(!list.is_marked_as_correct());
        assert!(list.marked_as_correct().is_marked_as_correct());
    }
}
