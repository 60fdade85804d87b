//! Constraint checking contract used by generation and characterization.

use std::fmt::Debug;
use std::sync::Arc;

use crate::model::{ModelError, TestModel};
use crate::sat::HardConstraintChecker;
use crate::tuple_list::TupleList;

/// Decides validity of full and partial combinations for a fixed model.
///
/// Implementations must be deterministic: the same combination always
/// gets the same answer.
pub trait ConstraintChecker: Debug + Send + Sync {
    /// `true` if the fully assigned combination violates no constraint.
    fn is_valid(&self, combination: &[i32]) -> bool;

    /// `true` if the partial combination can be completed into a valid one.
    /// `NO_VALUE` slots are free.
    fn is_extension_valid(&self, combination: &[i32]) -> bool;
}

/// Builds checkers for a model, optionally with one error tuple list negated.
pub trait ConstraintCheckerFactory: Debug + Send + Sync {
    fn create(&self, model: &TestModel) -> Result<Arc<dyn ConstraintChecker>, ModelError>;

    /// A checker in which `negated` must be matched instead of avoided;
    /// every other constraint stays as it is.
    fn create_with_negation(
        &self,
        model: &TestModel,
        negated: &TupleList,
    ) -> Result<Arc<dyn ConstraintChecker>, ModelError>;
}

/// Accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConstraintChecker;

impl ConstraintChecker for NoConstraintChecker {
    fn is_valid(&self, _combination: &[i32]) -> bool {
        true
    }

    fn is_extension_valid(&self, _combination: &[i32]) -> bool {
        true
    }
}

/// Factory for [`NoConstraintChecker`]; ignores all tuple lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConstraintCheckerFactory;

impl ConstraintCheckerFactory for NoConstraintCheckerFactory {
    fn create(&self, _model: &TestModel) -> Result<Arc<dyn ConstraintChecker>, ModelError> {
        Ok(Arc::new(NoConstraintChecker))
    }

    fn create_with_negation(
        &self,
        _model: &TestModel,
        _negated: &TupleList,
    ) -> Result<Arc<dyn ConstraintChecker>, ModelError> {
        Ok(Arc::new(NoConstraintChecker))
    }
}

/// Factory for the SAT-backed [`HardConstraintChecker`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HardConstraintCheckerFactory;

impl ConstraintCheckerFactory for HardConstraintCheckerFactory {
    fn create(&self, model: &TestModel) -> Result<Arc<dyn ConstraintChecker>, ModelError> {
        Ok(Arc::new(HardConstraintChecker::new(model)))
    }

    fn create_with_negation(
        &self,
        model: &TestModel,
        negated: &TupleList,
    ) -> Result<Arc<dyn ConstraintChecker>, ModelError> {
        Ok(Arc::new(HardConstraintChecker::with_negation(model, negated)?))
    }
}
