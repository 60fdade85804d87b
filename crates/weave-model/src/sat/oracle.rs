//! varisat-backed [`SatisfiabilityOracle`] over a model's tuple lists.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::encoding::{encode_parameters, CnfClauses, EncodedModel};
use super::search::is_sat;
use crate::model::TestModel;
use crate::oracle::{OracleError, SatisfiabilityOracle};
use crate::tuple_list::ConstraintId;

/// One constraint per tuple list (forbidden by default), plus ad-hoc
/// assignment constraints. All constraints start enabled.
#[derive(Debug, Clone)]
pub struct SatOracle {
    model: TestModel,
    encoded: EncodedModel,
    constraints: BTreeMap<ConstraintId, CnfClauses>,
    enabled: BTreeSet<ConstraintId>,
    /// Answer for the last queried enabled set.
    last_answer: Option<(BTreeSet<ConstraintId>, bool)>,
}

impl SatOracle {
    pub fn new(model: &TestModel) -> Self {
        let encoded = encode_parameters(model.parameter_sizes());
        let constraints: BTreeMap<ConstraintId, CnfClauses> = model
            .all_tuple_lists()
            .map(|list| (list.id(), encoded.encode_forbidden(list)))
            .collect();
        let enabled = constraints.keys().copied().collect();
        Self {
            model: model.clone(),
            encoded,
            constraints,
            enabled,
            last_answer: None,
        }
    }

    pub fn model(&self) -> &TestModel {
        &self.model
    }

    /// Replace tuple list `id` by its negation: one of its tuples must match.
    pub fn negate(&mut self, id: ConstraintId) -> Result<(), OracleError> {
        let list = self
            .model
            .tuple_list(id)
            .ok_or(OracleError::UnknownConstraint(id))?
            .clone();
        let clauses = self.encoded.encode_negated(&list);
        self.constraints.insert(id, clauses);
        self.last_answer = None;
        Ok(())
    }

    /// Undo [`SatOracle::negate`]: tuple list `id` is forbidden again.
    pub fn restore(&mut self, id: ConstraintId) -> Result<(), OracleError> {
        let list = self
            .model
            .tuple_list(id)
            .ok_or(OracleError::UnknownConstraint(id))?;
        let clauses = self.encoded.encode_forbidden(list);
        self.constraints.insert(id, clauses);
        self.last_answer = None;
        Ok(())
    }

    /// Add a constraint fixing the assigned slots of `combination`.
    ///
    /// Returns the fresh id, one above the largest id in use. The new
    /// constraint is enabled.
    pub fn add_assignment(&mut self, combination: &[i32]) -> Result<ConstraintId, OracleError> {
        self.model.check_length(combination)?;
        if !self.model.is_in_domain(combination) {
            return Err(OracleError::OutOfDomain(combination.to_vec()));
        }
        let id = self.constraints.keys().next_back().copied().unwrap_or(0) + 1;
        self.constraints
            .insert(id, self.encoded.encode_assignment(combination));
        self.enabled.insert(id);
        self.last_answer = None;
        debug!(id, "added assignment constraint");
        Ok(id)
    }

    /// Remove an assignment constraint. Tuple lists cannot be removed.
    pub fn remove_assignment(&mut self, id: ConstraintId) -> Result<(), OracleError> {
        if self.model.tuple_list(id).is_some() || self.constraints.remove(&id).is_none() {
            return Err(OracleError::UnknownConstraint(id));
        }
        self.enabled.remove(&id);
        self.last_answer = None;
        Ok(())
    }
}

impl SatisfiabilityOracle for SatOracle {
    fn constraint_ids(&self) -> Vec<ConstraintId> {
        self.constraints.keys().copied().collect()
    }

    fn disable_all(&mut self) {
        self.enabled.clear();
    }

    fn enable(&mut self, ids: &[ConstraintId]) -> Result<(), OracleError> {
        if let Some(&unknown) = ids.iter().find(|id| !self.constraints.contains_key(*id)) {
            return Err(OracleError::UnknownConstraint(unknown));
        }
        self.enabled.extend(ids.iter().copied());
        Ok(())
    }

    fn enable_all(&mut self) {
        self.enabled = self.constraints.keys().copied().collect();
    }

    fn reset(&mut self) {
        self.last_answer = None;
    }

    fn is_satisfiable(&mut self) -> Result<bool, OracleError> {
        if let Some((ids, answer)) = &self.last_answer {
            if *ids == self.enabled {
                return Ok(*answer);
            }
        }
        let clauses: CnfClauses = self
            .enabled
            .iter()
            .filter_map(|id| self.constraints.get(id))
            .flatten()
            .cloned()
            .collect();
        let answer = is_sat(&self.encoded, &clauses, &vec![])?;
        self.last_answer = Some((self.enabled.clone(), answer));
        Ok(answer)
    }

    fn all_enabled(&self) -> bool {
        self.enabled.len() == self.constraints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple_list::TupleList;
    use crate::NO_VALUE;

    fn model() -> TestModel {
        TestModel::new(
            1,
            vec![2, 2],
            vec![TupleList::new(1, vec![0], vec![vec![0]]).unwrap()],
            vec![TupleList::new(2, vec![0], vec![vec![1]]).unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn test_all_enabled_initially() {
        let mut oracle = SatOracle::new(&model());
        assert!(oracle.all_enabled());
        assert_eq!(oracle.constraint_ids(), vec![1, 2]);
        // Both values of p0 are forbidden.
        assert!(!oracle.is_satisfiable().unwrap());
    }

    #[test]
    fn test_enable_subset() {
        let mut oracle = SatOracle::new(&model());
        oracle.disable_all();
        assert!(!oracle.all_enabled());
        oracle.enable(&[1]).unwrap();
        assert!(oracle.is_satisfiable().unwrap());
        oracle.enable_all();
        oracle.enable_all();
        assert!(oracle.all_enabled());
    }

    #[test]
    fn test_unknown_id_rejected() {
        let mut oracle = SatOracle::new(&model());
        assert!(matches!(oracle.enable(&[7]), Err(OracleError::UnknownConstraint(7))));
        assert!(oracle.negate(7).is_err());
    }

    #[test]
    fn test_negate_and_assignment() {
        let mut oracle = SatOracle::new(&model());
        oracle.negate(2).unwrap();
        let id = oracle.add_assignment(&[1, NO_VALUE]).unwrap();
        assert_eq!(id, 3);

        oracle.disable_all();
        oracle.enable(&[2, 3]).unwrap();
        assert!(oracle.is_satisfiable().unwrap());
        oracle.enable(&[1]).unwrap();
        assert!(oracle.is_satisfiable().unwrap());

        oracle.restore(2).unwrap();
        oracle.reset();
        assert!(!oracle.is_satisfiable().unwrap());

        oracle.remove_assignment(id).unwrap();
        assert!(oracle.remove_assignment(1).is_err());
        oracle.enable_all();
        assert_eq!(oracle.constraint_ids(), vec![1, 2]);
    }
}
