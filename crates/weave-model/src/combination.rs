//! Combinations: fixed-length value arrays with a don't-care sentinel.
//!
//! A combination has one slot per model parameter. A slot either holds a
//! value index into the parameter's domain or [`NO_VALUE`]. A combination
//! without any `NO_VALUE` slot is a full test input; everything else is a
//! partial assignment (a tuple).

use std::fmt::Write;

/// Sentinel for an unconstrained parameter slot.
pub const NO_VALUE: i32 = -1;

/// One slot per parameter, `NO_VALUE` where unassigned.
pub type Combination = Vec<i32>;

/// A combination of the given length with every slot unassigned.
pub fn empty_combination(number_of_parameters: usize) -> Combination {
    vec![NO_VALUE; number_of_parameters]
}

/// `true` if every assigned slot of `tuple` has the same value in `combination`.
///
/// Both must have the same length; a length mismatch never matches.
pub fn contains(combination: &[i32], tuple: &[i32]) -> bool {
    combination.len() == tuple.len()
        && combination
            .iter()
            .zip(tuple)
            .all(|(&c, &t)| t == NO_VALUE || c == t)
}

/// `true` if the two combinations agree wherever both are assigned.
pub fn is_compatible(first: &[i32], second: &[i32]) -> bool {
    first.len() == second.len()
        && first
            .iter()
            .zip(second)
            .all(|(&a, &b)| a == NO_VALUE || b == NO_VALUE || a == b)
}

/// Copy every assigned slot of `tuple` into `combination`.
pub fn merge(combination: &mut [i32], tuple: &[i32]) {
    for (slot, &value) in combination.iter_mut().zip(tuple) {
        if value != NO_VALUE {
            *slot = value;
        }
    }
}

/// Number of slots holding a value.
pub fn number_of_set_parameters(combination: &[i32]) -> usize {
    combination.iter().filter(|&&v| v != NO_VALUE).count()
}

/// `true` if no slot is `NO_VALUE`.
pub fn is_complete(combination: &[i32]) -> bool {
    combination.iter().all(|&v| v != NO_VALUE)
}

/// Indices of the assigned slots, ascending.
pub fn set_parameters(combination: &[i32]) -> Vec<usize> {
    combination
        .iter()
        .enumerate()
        .filter(|(_, v)| **v != NO_VALUE)
        .map(|(p, _)| p)
        .collect()
}

/// `true` if both combinations hold the same value at every listed parameter.
pub fn same_for_all_given_parameters(first: &[i32], second: &[i32], parameters: &[usize]) -> bool {
    parameters.iter().all(|&p| first[p] == second[p])
}

/// Every non-empty sub-combination of `combination` (the combination itself included).
///
/// Sub-combinations keep the original length and replace a subset of the
/// assigned slots with `NO_VALUE`. Ordered by size, then lexicographically
/// by the retained parameter indices.
pub fn sub_combinations(combination: &[i32]) -> Vec<Combination> {
    let assigned = set_parameters(combination);
    (1..=assigned.len())
        .flat_map(|size| sub_combinations_of(combination, &assigned, size))
        .collect()
}

/// Every sub-combination of `combination` with exactly `size` assigned slots.
///
/// Returns an empty list if `combination` has fewer than `size` assigned slots.
pub fn sub_combinations_of_size(combination: &[i32], size: usize) -> Vec<Combination> {
    let assigned = set_parameters(combination);
    sub_combinations_of(combination, &assigned, size)
}

fn sub_combinations_of(combination: &[i32], assigned: &[usize], size: usize) -> Vec<Combination> {
    crate::combinator::parameter_combinations(assigned, size)
        .into_iter()
        .map(|parameters| {
            let mut sub = empty_combination(combination.len());
            for p in parameters {
                sub[p] = combination[p];
            }
            sub
        })
        .collect()
}

/// Render a combination as `(0, -, 2)`.
pub fn display(combination: &[i32]) -> String {
    let mut out = String::from("(");
    for (i, &value) in combination.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if value == NO_VALUE {
            out.push('-');
        } else {
            let _ = write!(out, "{value}");
        }
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_ignores_unassigned_slots() {
        assert!(contains(&[0, 1, 2], &[0, NO_VALUE, 2]));
        assert!(contains(&[0, 1, 2], &[NO_VALUE, NO_VALUE, NO_VALUE]));
        assert!(!contains(&[0, 1, 2], &[1, NO_VALUE, NO_VALUE]));
        assert!(!contains(&[0, 1], &[0, 1, NO_VALUE]));
    }

    #[test]
    fn test_compatible_and_merge() {
        let mut row = vec![0, NO_VALUE, NO_VALUE];
        let tuple = vec![NO_VALUE, 1, 0];
        assert!(is_compatible(&row, &tuple));
        merge(&mut row, &tuple);
        assert_eq!(row, vec![0, 1, 0]);
        assert!(!is_compatible(&row, &[1, NO_VALUE, NO_VALUE]));
    }

    #[test]
    fn test_sub_combinations_of_full_input() {
        let subs = sub_combinations(&[0, 1]);
        assert_eq!(
            subs,
            vec![vec![0, NO_VALUE], vec![NO_VALUE, 1], vec![0, 1]]
        );
    }

    #[test]
    fn test_sub_combinations_of_size_skips_unassigned() {
        let subs = sub_combinations_of_size(&[0, NO_VALUE, 2, 1], 2);
        assert_eq!(subs.len(), 3);
        assert!(subs.contains(&vec![0, NO_VALUE, 2, NO_VALUE]));
        assert!(subs.contains(&vec![NO_VALUE, NO_VALUE, 2, 1]));
        assert!(sub_combinations_of_size(&[0, NO_VALUE], 2).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(display(&[0, NO_VALUE, 12]), "(0, -, 12)");
        assert_eq!(display(&[]), "()");
    }
}
