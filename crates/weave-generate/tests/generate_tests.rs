use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

use weave_generate::coverage::missing_combinations;
use weave_generate::{generate, generate_groups, negative_group, GenerationConfig};
use weave_model::checker::{ConstraintChecker, ConstraintCheckerFactory, HardConstraintCheckerFactory};
use weave_model::combination::contains;
use weave_model::group::GroupId;
use weave_model::report::{NoopReporter, ReportEvent, CollectingReporter};
use weave_model::sat::HardConstraintChecker;
use weave_model::{TestModel, TupleList, NO_VALUE};

/// Four binary parameters; error list 1 is p0=0,p1=0 and error list 2 is p1=1,p2=1.
fn two_error_lists() -> TestModel {
    TestModel::new(
        2,
        vec![2, 2, 2, 2],
        vec![],
        vec![
            TupleList::new(1, vec![0, 1], vec![vec![0, 0]]).unwrap(),
            TupleList::new(2, vec![1, 2], vec![vec![1, 1]]).unwrap(),
        ],
    )
    .unwrap()
}

#[test]
fn test_negative_groups_contain_their_error_tuple() {
    let model = two_error_lists();
    let first = negative_group(&model, &model.error_tuple_lists()[0], &HardConstraintCheckerFactory).unwrap();
    let second = negative_group(&model, &model.error_tuple_lists()[1], &HardConstraintCheckerFactory).unwrap();

    assert!(!first.inputs.is_empty());
    assert!(!second.inputs.is_empty());
    for input in &first.inputs {
        assert!(contains(input, &[0, 0, NO_VALUE, NO_VALUE]), "{input:?}");
    }
    for input in &second.inputs {
        assert!(contains(input, &[NO_VALUE, 1, 1, NO_VALUE]), "{input:?}");
    }
}

#[test]
fn test_positive_group_avoids_error_tuples() {
    let model = two_error_lists();
    let groups = generate_groups(&model, &HardConstraintCheckerFactory, &GenerationConfig::default(), &NoopReporter)
        .unwrap();
    assert_eq!(groups.len(), 3);

    let positive = &groups[0];
    assert_eq!(positive.id, GroupId::Positive);
    for input in &positive.inputs {
        assert!(!contains(input, &[0, 0, NO_VALUE, NO_VALUE]));
        assert!(!contains(input, &[NO_VALUE, 1, 1, NO_VALUE]));
    }
}

#[test]
fn test_single_error_value_reaches_negative_group() {
    let model = TestModel::new(
        1,
        vec![2, 2],
        vec![],
        vec![TupleList::new(1, vec![0], vec![vec![0]]).unwrap()],
    )
    .unwrap();
    let reporter = CollectingReporter::new();
    let groups = generate_groups(&model, &HardConstraintCheckerFactory, &GenerationConfig::default(), &reporter)
        .unwrap();

    assert!(groups[0].inputs.iter().all(|input| input[0] == 1));
    assert_eq!(groups[1].id, GroupId::Negative(1));
    assert!(groups[1].inputs.iter().any(|input| input[0] == 0));
    assert!(reporter.events().iter().any(|event| matches!(
        event,
        ReportEvent::GroupGenerated { group: GroupId::Negative(1), inputs } if *inputs > 0
    )));
}

#[test]
fn test_fully_constrained_model_yields_no_inputs() {
    let model = TestModel::new(
        1,
        vec![1, 2],
        vec![TupleList::new(1, vec![0], vec![vec![0]]).unwrap()],
        vec![],
    )
    .unwrap();
    let checker = HardConstraintChecker::new(&model);
    assert!(generate(&model, &checker).is_empty());
}

fn arb_model() -> impl Strategy<Value = TestModel> {
    (2usize..=4)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(1usize..=3, n),
                1usize..=n.min(3),
                proptest::option::of((0..n, 0..n)),
            )
        })
        .prop_map(|(sizes, strength, forbidden)| {
            let exclusion = match forbidden {
                Some((a, b)) if a != b => {
                    vec![TupleList::new(1, vec![a, b], vec![vec![0, 0]]).unwrap()]
                }
                _ => vec![],
            };
            TestModel::new(strength, sizes, exclusion, vec![]).unwrap()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_every_valid_combination_is_covered(model in arb_model()) {
        let checker = HardConstraintCheckerFactory.create(&model).unwrap();
        let rows = generate(&model, checker.as_ref());
        let missing = missing_combinations(&rows, model.strength(), model.parameter_sizes(), checker.as_ref());
        prop_assert!(missing.is_empty(), "uncovered: {missing:?}");
    }

    #[test]
    fn prop_every_input_is_valid_and_complete(model in arb_model()) {
        let checker = HardConstraintCheckerFactory.create(&model).unwrap();
        for row in generate(&model, checker.as_ref()) {
            prop_assert!(row.iter().all(|&v| v != NO_VALUE));
            prop_assert!(checker.is_valid(&row));
        }
    }
}
