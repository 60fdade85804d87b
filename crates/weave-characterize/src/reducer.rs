//! Suspicious combination reducer.
//!
//! A family of combinations that agree everywhere except at one position,
//! and that together take every value of that position's domain, says
//! nothing about that position. The family collapses into one combination
//! with `NO_VALUE` there. Collapsing repeats until nothing changes.

use std::collections::BTreeSet;

use weave_model::{Combination, ModelError, NO_VALUE};

use crate::CharacterizationError;

/// Collapse `combinations` to a fixed point.
///
/// Fails if a combination's length differs from `parameter_sizes`. An
/// empty set reduces to itself.
pub fn reduce(
    parameter_sizes: &[usize],
    combinations: &BTreeSet<Combination>,
) -> Result<BTreeSet<Combination>, CharacterizationError> {
    if let Some(bad) = combinations
        .iter()
        .find(|c| c.len() != parameter_sizes.len())
    {
        return Err(ModelError::CombinationLength {
            expected: parameter_sizes.len(),
            actual: bad.len(),
        }
        .into());
    }
    Ok(collapse(parameter_sizes, combinations.clone()))
}

/// [`reduce`] for combinations already known to have the right length.
pub(crate) fn collapse(
    parameter_sizes: &[usize],
    mut combinations: BTreeSet<Combination>,
) -> BTreeSet<Combination> {
    while let Some((family, collapsed)) = find_complete_family(parameter_sizes, &combinations) {
        for member in &family {
            combinations.remove(member);
        }
        combinations.insert(collapsed);
    }
    combinations
}

fn find_complete_family(
    parameter_sizes: &[usize],
    combinations: &BTreeSet<Combination>,
) -> Option<(Vec<Combination>, Combination)> {
    for combination in combinations {
        for (parameter, &size) in parameter_sizes.iter().enumerate() {
            if combination[parameter] == NO_VALUE {
                continue;
            }
            let family: Vec<Combination> = (0..size)
                .map(|value| {
                    let mut member = combination.clone();
                    member[parameter] = value as i32;
                    member
                })
                .collect();
            if family.iter().all(|member| combinations.contains(member)) {
                let mut collapsed = combination.clone();
                collapsed[parameter] = NO_VALUE;
                return Some((family, collapsed));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(combinations: &[&[i32]]) -> BTreeSet<Combination> {
        combinations.iter().map(|c| c.to_vec()).collect()
    }

    #[test]
    fn test_complete_family_collapses() {
        let reduced = reduce(&[2, 2], &set(&[&[0, 0], &[0, 1]])).unwrap();
        assert_eq!(reduced, set(&[&[0, NO_VALUE]]));
    }

    #[test]
    fn test_incomplete_family_unchanged() {
        let input = set(&[&[0, 0], &[0, 1]]);
        assert_eq!(reduce(&[3, 3], &input).unwrap(), input);
    }

    #[test]
    fn test_collapses_to_fixed_point() {
        let all = set(&[&[0, 0], &[0, 1], &[1, 0], &[1, 1]]);
        assert_eq!(reduce(&[2, 2], &all).unwrap(), set(&[&[NO_VALUE, NO_VALUE]]));
    }

    #[test]
    fn test_partial_combinations_collapse() {
        let input = set(&[&[0, NO_VALUE, 0], &[0, NO_VALUE, 1], &[1, 1, NO_VALUE]]);
        let reduced = reduce(&[2, 2, 2], &input).unwrap();
        assert_eq!(reduced, set(&[&[0, NO_VALUE, NO_VALUE], &[1, 1, NO_VALUE]]));
    }

    #[test]
    fn test_empty_set_is_noop() {
        assert!(reduce(&[2, 2], &BTreeSet::new()).unwrap().is_empty());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = reduce(&[2, 2], &set(&[&[0, 0, 0]]));
        assert!(matches!(
            result,
            Err(CharacterizationError::Model(ModelError::CombinationLength { expected: 2, actual: 3 }))
        ));
    }
}
