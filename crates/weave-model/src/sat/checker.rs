//! SAT-backed constraint checker.

use tracing::warn;

use super::encoding::{encode_parameters, CnfClauses, EncodedModel};
use super::search::is_sat;
use crate::checker::ConstraintChecker;
use crate::combination::is_complete;
use crate::model::{ModelError, TestModel};
use crate::tuple_list::TupleList;

/// Checks combinations against every tuple list of a model, treating each
/// list as forbidden, except for at most one negated error list.
#[derive(Debug, Clone)]
pub struct HardConstraintChecker {
    parameter_sizes: Vec<usize>,
    encoded: EncodedModel,
    constraint_clauses: CnfClauses,
}

impl HardConstraintChecker {
    /// Forbid every exclusion and error tuple of the model.
    pub fn new(model: &TestModel) -> Self {
        let encoded = encode_parameters(model.parameter_sizes());
        let constraint_clauses = model
            .all_tuple_lists()
            .flat_map(|list| encoded.encode_forbidden(list))
            .collect();
        Self {
            parameter_sizes: model.parameter_sizes().to_vec(),
            encoded,
            constraint_clauses,
        }
    }

    /// Like [`HardConstraintChecker::new`], but `negated` must be matched.
    ///
    /// `negated` has to be one of the model's tuple lists (looked up by id).
    pub fn with_negation(model: &TestModel, negated: &TupleList) -> Result<Self, ModelError> {
        if model.tuple_list(negated.id()).is_none() {
            return Err(ModelError::UnknownTupleList(negated.id()));
        }
        let mut encoded = encode_parameters(model.parameter_sizes());
        let mut constraint_clauses = Vec::new();
        for list in model.all_tuple_lists() {
            if list.id() == negated.id() {
                constraint_clauses.extend(encoded.encode_negated(list));
            } else {
                constraint_clauses.extend(encoded.encode_forbidden(list));
            }
        }
        Ok(Self {
            parameter_sizes: model.parameter_sizes().to_vec(),
            encoded,
            constraint_clauses,
        })
    }

    fn in_domain(&self, combination: &[i32]) -> bool {
        combination.len() == self.parameter_sizes.len()
            && combination
                .iter()
                .zip(&self.parameter_sizes)
                .all(|(&v, &size)| v == crate::NO_VALUE || (v >= 0 && (v as usize) < size))
    }

    fn satisfiable_with(&self, combination: &[i32]) -> bool {
        if !self.in_domain(combination) {
            return false;
        }
        // Every domain is non-empty, so without constraints any partial
        // assignment inside the domains extends.
        if self.constraint_clauses.is_empty() {
            return true;
        }
        let assignment = self.encoded.encode_assignment(combination);
        match is_sat(&self.encoded, &self.constraint_clauses, &assignment) {
            Ok(sat) => sat,
            Err(e) => {
                warn!(error = %e, "constraint check failed, treating combination as invalid");
                false
            }
        }
    }
}

impl ConstraintChecker for HardConstraintChecker {
    fn is_valid(&self, combination: &[i32]) -> bool {
        is_complete(combination) && self.satisfiable_with(combination)
    }

    fn is_extension_valid(&self, combination: &[i32]) -> bool {
        self.satisfiable_with(combination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NO_VALUE;

    fn model_with_error(errors: Vec<TupleList>) -> TestModel {
        TestModel::new(2, vec![2, 2, 2], vec![], errors).unwrap()
    }

    #[test]
    fn test_forbidden_tuple_rejected() {
        let list = TupleList::new(1, vec![0, 1], vec![vec![0, 0]]).unwrap();
        let checker = HardConstraintChecker::new(&model_with_error(vec![list]));
        assert!(!checker.is_valid(&[0, 0, 1]));
        assert!(checker.is_valid(&[0, 1, 1]));
        assert!(!checker.is_extension_valid(&[0, 0, NO_VALUE]));
        assert!(checker.is_extension_valid(&[0, NO_VALUE, NO_VALUE]));
    }

    #[test]
    fn test_partial_is_not_valid_as_full_input() {
        let checker = HardConstraintChecker::new(&model_with_error(vec![]));
        assert!(!checker.is_valid(&[0, NO_VALUE, 1]));
        assert!(checker.is_extension_valid(&[0, NO_VALUE, 1]));
        assert!(!checker.is_extension_valid(&[0, 2, 1]));
        assert!(!checker.is_extension_valid(&[0, 1]));
    }

    #[test]
    fn test_negation_requires_a_tuple() {
        let first = TupleList::new(1, vec![0, 1], vec![vec![0, 0]]).unwrap();
        let second = TupleList::new(2, vec![1, 2], vec![vec![1, 1]]).unwrap();
        let model = model_with_error(vec![first.clone(), second]);
        let checker = HardConstraintChecker::with_negation(&model, &first).unwrap();

        assert!(checker.is_valid(&[0, 0, 0]));
        assert!(!checker.is_valid(&[1, 0, 0]));
        assert!(!checker.is_extension_valid(&[NO_VALUE, 1, NO_VALUE]));
    }

    #[test]
    fn test_negation_of_foreign_list_rejected() {
        let model = model_with_error(vec![]);
        let foreign = TupleList::new(9, vec![0], vec![vec![0]]).unwrap();
        assert!(matches!(
            HardConstraintChecker::with_negation(&model, &foreign),
            Err(ModelError::UnknownTupleList(9))
        ));
    }
}
