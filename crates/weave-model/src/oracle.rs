//! Stateful satisfiability oracle over identified constraints.
//!
//! Conflict explanation switches constraints on and off and asks whether
//! the enabled ones are jointly satisfiable. The enable/disable state is
//! observable, so an oracle shared between callers must be used under an
//! exclusive lock (`&mut` access or a `Mutex`).

use crate::model::ModelError;
use crate::sat::search::SearchError;
use crate::tuple_list::ConstraintId;

/// Errors raised by an oracle.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("unknown constraint id {0}")]
    UnknownConstraint(ConstraintId),

    #[error("assignment {0:?} lies outside the parameter domains")]
    OutOfDomain(Vec<i32>),

    #[error("invalid assignment: {0}")]
    Assignment(#[from] ModelError),

    #[error("search error: {0}")]
    Search(#[from] SearchError),
}

/// Enable/disable semantics over a fixed set of constraint ids.
pub trait SatisfiabilityOracle {
    /// All constraint ids, ascending.
    fn constraint_ids(&self) -> Vec<ConstraintId>;

    fn disable_all(&mut self);

    /// Enable the given constraints in addition to those already enabled.
    fn enable(&mut self, ids: &[ConstraintId]) -> Result<(), OracleError>;

    /// Enable every constraint. Idempotent.
    fn enable_all(&mut self);

    /// Drop any state left over from earlier queries.
    fn reset(&mut self);

    /// Are the currently enabled constraints jointly satisfiable?
    fn is_satisfiable(&mut self) -> Result<bool, OracleError>;

    fn all_enabled(&self) -> bool;
}
