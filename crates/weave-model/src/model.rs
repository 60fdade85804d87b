//! The test model: strength, parameter domains and tuple-list constraints.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::tuple_list::{ConstraintId, TupleList};

/// Precondition violations when building or using a model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model has no parameters")]
    NoParameters,

    #[error("strength {strength} is outside 1..={parameters}")]
    InvalidStrength { strength: usize, parameters: usize },

    #[error("parameter {parameter} has an empty domain")]
    EmptyDomain { parameter: usize },

    #[error("tuple list id must be positive, got {0}")]
    InvalidTupleListId(ConstraintId),

    #[error("tuple list {id} has no parameters or no tuples")]
    EmptyTupleList { id: ConstraintId },

    #[error("tuple list {id} names a parameter twice")]
    DuplicateInvolvedParameter { id: ConstraintId },

    #[error("tuple list {id} has a tuple of length {actual}, expected {expected}")]
    TupleArity {
        id: ConstraintId,
        expected: usize,
        actual: usize,
    },

    #[error("tuple list {id} contains negative value {value}")]
    NegativeTupleValue { id: ConstraintId, value: i32 },

    #[error("tuple list {id} refers to parameter {parameter}, model has {parameters}")]
    UnknownParameter {
        id: ConstraintId,
        parameter: usize,
        parameters: usize,
    },

    #[error("tuple list {id} assigns value {value} to parameter {parameter} of size {size}")]
    ValueOutOfDomain {
        id: ConstraintId,
        parameter: usize,
        value: i32,
        size: usize,
    },

    #[error("tuple list {0} is not part of the model")]
    UnknownTupleList(ConstraintId),

    #[error("tuple list id {0} is used more than once")]
    DuplicateTupleListId(ConstraintId),

    #[error("combination has length {actual}, model has {expected} parameters")]
    CombinationLength { expected: usize, actual: usize },
}

/// An immutable combinatorial test model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestModel {
    strength: usize,
    parameter_sizes: Vec<usize>,
    #[serde(default)]
    exclusion_tuple_lists: Vec<TupleList>,
    #[serde(default)]
    error_tuple_lists: Vec<TupleList>,
}

impl TestModel {
    /// Build and validate a model.
    ///
    /// Exclusion tuples are never generated. Error tuples are never
    /// generated by positive generation and are the targets of negative
    /// generation. Ids must be unique across both collections.
    pub fn new(
        strength: usize,
        parameter_sizes: Vec<usize>,
        exclusion_tuple_lists: Vec<TupleList>,
        error_tuple_lists: Vec<TupleList>,
    ) -> Result<Self, ModelError> {
        let model = Self {
            strength,
            parameter_sizes,
            exclusion_tuple_lists,
            error_tuple_lists,
        };
        model.validate()?;
        Ok(model)
    }

    /// Check all invariants. Called by [`TestModel::new`]; useful again after deserializing.
    pub fn validate(&self) -> Result<(), ModelError> {
        let parameters = self.parameter_sizes.len();
        if parameters == 0 {
            return Err(ModelError::NoParameters);
        }
        if self.strength == 0 || self.strength > parameters {
            return Err(ModelError::InvalidStrength {
                strength: self.strength,
                parameters,
            });
        }
        if let Some(parameter) = self.parameter_sizes.iter().position(|&s| s == 0) {
            return Err(ModelError::EmptyDomain { parameter });
        }

        let mut ids = HashSet::new();
        for list in self.all_tuple_lists() {
            if !ids.insert(list.id()) {
                return Err(ModelError::DuplicateTupleListId(list.id()));
            }
            for &parameter in list.involved_parameters() {
                if parameter >= parameters {
                    return Err(ModelError::UnknownParameter {
                        id: list.id(),
                        parameter,
                        parameters,
                    });
                }
            }
            for tuple in list.tuples() {
                for (&parameter, &value) in list.involved_parameters().iter().zip(tuple) {
                    let size = self.parameter_sizes[parameter];
                    if value < 0 || value as usize >= size {
                        return Err(ModelError::ValueOutOfDomain {
                            id: list.id(),
                            parameter,
                            value,
                            size,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn strength(&self) -> usize {
        self.strength
    }

    pub fn parameter_sizes(&self) -> &[usize] {
        &self.parameter_sizes
    }

    pub fn number_of_parameters(&self) -> usize {
        self.parameter_sizes.len()
    }

    pub fn size_of_parameter(&self, parameter: usize) -> usize {
        self.parameter_sizes[parameter]
    }

    pub fn exclusion_tuple_lists(&self) -> &[TupleList] {
        &self.exclusion_tuple_lists
    }

    pub fn error_tuple_lists(&self) -> &[TupleList] {
        &self.error_tuple_lists
    }

    /// Exclusion lists first, then error lists.
    pub fn all_tuple_lists(&self) -> impl Iterator<Item = &TupleList> {
        self.exclusion_tuple_lists
            .iter()
            .chain(self.error_tuple_lists.iter())
    }

    pub fn tuple_list(&self, id: ConstraintId) -> Option<&TupleList> {
        self.all_tuple_lists().find(|list| list.id() == id)
    }

    /// Fail with [`ModelError::CombinationLength`] unless `combination` fits this model.
    pub fn check_length(&self, combination: &[i32]) -> Result<(), ModelError> {
        if combination.len() != self.parameter_sizes.len() {
            return Err(ModelError::CombinationLength {
                expected: self.parameter_sizes.len(),
                actual: combination.len(),
            });
        }
        Ok(())
    }

    /// `true` if every assigned slot lies inside its parameter's domain.
    pub fn is_in_domain(&self, combination: &[i32]) -> bool {
        combination.len() == self.parameter_sizes.len()
            && combination
                .iter()
                .zip(&self.parameter_sizes)
                .all(|(&v, &size)| v == crate::NO_VALUE || (v >= 0 && (v as usize) < size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_model() {
        let model = TestModel::new(
            2,
            vec![2, 3, 2],
            vec![TupleList::new(1, vec![0, 1], vec![vec![1, 2]]).unwrap()],
            vec![TupleList::new(2, vec![2], vec![vec![0]]).unwrap()],
        )
        .unwrap();
        assert_eq!(model.number_of_parameters(), 3);
        assert_eq!(model.all_tuple_lists().count(), 2);
        assert_eq!(model.tuple_list(2).unwrap().involved_parameters(), &[2]);
        assert!(model.tuple_list(7).is_none());
    }

    #[test]
    fn test_strength_bounds() {
        assert!(matches!(
            TestModel::new(3, vec![2, 2], vec![], vec![]),
            Err(ModelError::InvalidStrength { strength: 3, parameters: 2 })
        ));
        assert!(TestModel::new(0, vec![2, 2], vec![], vec![]).is_err());
        assert!(matches!(
            TestModel::new(1, vec![], vec![], vec![]),
            Err(ModelError::NoParameters)
        ));
    }

    #[test]
    fn test_single_value_domain_allowed() {
        assert!(TestModel::new(1, vec![1, 2], vec![], vec![]).is_ok());
        assert!(matches!(
            TestModel::new(1, vec![0, 2], vec![], vec![]),
            Err(ModelError::EmptyDomain { parameter: 0 })
        ));
    }

    #[test]
    fn test_tuple_lists_checked_against_domains() {
        let out_of_range = TupleList::new(1, vec![0], vec![vec![2]]).unwrap();
        assert!(matches!(
            TestModel::new(1, vec![2], vec![out_of_range], vec![]),
            Err(ModelError::ValueOutOfDomain { value: 2, .. })
        ));

        let unknown = TupleList::new(1, vec![4], vec![vec![0]]).unwrap();
        assert!(matches!(
            TestModel::new(1, vec![2], vec![], vec![unknown]),
            Err(ModelError::UnknownParameter { parameter: 4, .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_across_collections() {
        let a = TupleList::new(1, vec![0], vec![vec![0]]).unwrap();
        let b = TupleList::new(1, vec![1], vec![vec![0]]).unwrap();
        assert!(matches!(
            TestModel::new(1, vec![2, 2], vec![a], vec![b]),
            Err(ModelError::DuplicateTupleListId(1))
        ));
    }

    #[test]
    fn test_check_length() {
        let model = TestModel::new(1, vec![2, 2], vec![], vec![]).unwrap();
        assert!(model.check_length(&[0, 1]).is_ok());
        assert!(model.check_length(&[0]).is_err());
        assert!(model.is_in_domain(&[1, crate::NO_VALUE]));
        assert!(!model.is_in_domain(&[2, 0]));
    }
}
