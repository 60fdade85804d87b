//! Negative test input groups (IPOG-Neg).
//!
//! For one error tuple list the checker is rebuilt with that list negated:
//! every input must hit one of its tuples while respecting all other
//! constraints. The list's parameters seed the matrix and every covered
//! combination carries them, so each failure of such an input can be traced
//! back to the error tuple it was built around.

use tracing::{debug, warn};

use weave_model::checker::ConstraintCheckerFactory;
use weave_model::group::{FaultCharacterizationConfiguration, GroupId, TestInputGroup};
use weave_model::{TestModel, TupleList};

use crate::factory::NegativeTWiseFactory;
use crate::ipog::Ipog;
use crate::order::NegativityAwareOrder;
use crate::pipeline::GenerationError;

/// Generate the negative group for one error tuple list of `model`.
pub fn negative_group(
    model: &TestModel,
    error_tuples: &TupleList,
    factory: &dyn ConstraintCheckerFactory,
) -> Result<TestInputGroup, GenerationError> {
    let checker = factory.create_with_negation(model, error_tuples)?;

    let inputs = Ipog::new(model, checker.as_ref())
        .with_order(NegativityAwareOrder::new(error_tuples))
        .with_factory(NegativeTWiseFactory::new(error_tuples))
        .generate();

    let id = GroupId::Negative(error_tuples.id());
    if inputs.is_empty() {
        warn!(group = %id, "no valid input reaches the error tuples");
    } else {
        debug!(group = %id, inputs = inputs.len(), "negative group generated");
    }

    Ok(TestInputGroup::new(
        id,
        inputs,
        Some(FaultCharacterizationConfiguration::new(model.clone(), checker)),
    ))
}

/// One negative group per error tuple list, in declaration order.
pub fn negative_groups(
    model: &TestModel,
    factory: &dyn ConstraintCheckerFactory,
) -> Result<Vec<TestInputGroup>, GenerationError> {
    model
        .error_tuple_lists()
        .iter()
        .map(|list| negative_group(model, list, factory))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_model::checker::HardConstraintCheckerFactory;
    use weave_model::combination::contains;
    use weave_model::NO_VALUE;

    #[test]
    fn test_every_input_contains_an_error_tuple() {
        let model = TestModel::new(
            2,
            vec![2, 2, 2],
            vec![],
            vec![TupleList::new(7, vec![2], vec![vec![1]]).unwrap()],
        )
        .unwrap();
        let group = negative_group(&model, &model.error_tuple_lists()[0], &HardConstraintCheckerFactory)
            .unwrap();
        assert_eq!(group.id, GroupId::Negative(7));
        assert!(!group.inputs.is_empty());
        assert!(group
            .inputs
            .iter()
            .all(|input| contains(input, &[NO_VALUE, NO_VALUE, 1])));
        assert!(group.characterization.is_some());
    }

    #[test]
    fn test_negative_groups_follow_declaration_order() {
        let model = TestModel::new(
            1,
            vec![2, 2],
            vec![],
            vec![
                TupleList::new(3, vec![1], vec![vec![0]]).unwrap(),
                TupleList::new(1, vec![0], vec![vec![1]]).unwrap(),
            ],
        )
        .unwrap();
        let groups = negative_groups(&model, &HardConstraintCheckerFactory).unwrap();
        let ids: Vec<GroupId> = groups.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![GroupId::Negative(3), GroupId::Negative(1)]);
    }
}
