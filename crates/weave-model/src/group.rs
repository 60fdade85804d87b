//! Groups of generated test inputs.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::checker::ConstraintChecker;
use crate::combination::Combination;
use crate::model::TestModel;
use crate::tuple_list::ConstraintId;

/// Identifies a test input group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GroupId {
    /// The covering suite over all valid combinations.
    Positive,
    /// Inputs probing one error tuple list.
    Negative(ConstraintId),
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupId::Positive => write!(f, "positive"),
            GroupId::Negative(id) => write!(f, "negative-{id}"),
        }
    }
}

/// What fault characterization needs to localize failures inside one group:
/// the model and the checker the group was generated with.
#[derive(Debug, Clone)]
pub struct FaultCharacterizationConfiguration {
    pub model: TestModel,
    pub checker: Arc<dyn ConstraintChecker>,
}

impl FaultCharacterizationConfiguration {
    pub fn new(model: TestModel, checker: Arc<dyn ConstraintChecker>) -> Self {
        Self { model, checker }
    }
}

/// Generated, fully assigned test inputs sharing one purpose.
#[derive(Debug, Clone)]
pub struct TestInputGroup {
    pub id: GroupId,
    pub inputs: Vec<Combination>,
    pub characterization: Option<FaultCharacterizationConfiguration>,
}

impl TestInputGroup {
    pub fn new(
        id: GroupId,
        inputs: Vec<Combination>,
        characterization: Option<FaultCharacterizationConfiguration>,
    ) -> Self {
        Self {
            id,
            inputs,
            characterization,
        }
    }
}
