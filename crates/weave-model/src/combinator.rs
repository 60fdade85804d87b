//! Enumeration of parameter subsets and value combinations.

use crate::combination::{empty_combination, Combination};

/// All `size`-element subsets of `parameters`, preserving their order.
///
/// Subsets come out in lexicographic order of positions. `size == 0`
/// yields a single empty subset; `size > parameters.len()` yields none.
pub fn parameter_combinations(parameters: &[usize], size: usize) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    if size > parameters.len() {
        return result;
    }
    let mut current = Vec::with_capacity(size);
    collect_subsets(parameters, size, 0, &mut current, &mut result);
    result
}

fn collect_subsets(
    parameters: &[usize],
    size: usize,
    start: usize,
    current: &mut Vec<usize>,
    result: &mut Vec<Vec<usize>>,
) {
    if current.len() == size {
        result.push(current.clone());
        return;
    }
    let missing = size - current.len();
    for i in start..=(parameters.len() - missing) {
        current.push(parameters[i]);
        collect_subsets(parameters, size, i + 1, current, result);
        current.pop();
    }
}

/// Every value vector over the given domain sizes, last position fastest.
///
/// `[2, 2]` gives `[0,0], [0,1], [1,0], [1,1]`. An empty size list gives
/// a single empty vector.
pub fn cartesian_product(sizes: &[usize]) -> Vec<Vec<i32>> {
    let mut result = vec![Vec::with_capacity(sizes.len())];
    for &size in sizes {
        let mut next = Vec::with_capacity(result.len() * size);
        for prefix in &result {
            for value in 0..size {
                let mut extended = prefix.clone();
                extended.push(value as i32);
                next.push(extended);
            }
        }
        result = next;
    }
    result
}

/// Every full-length combination that assigns exactly `parameters`.
///
/// Values are enumerated with [`cartesian_product`] over the parameters'
/// domain sizes; every other slot is `NO_VALUE`.
pub fn value_combinations(parameters: &[usize], parameter_sizes: &[usize]) -> Vec<Combination> {
    let sizes: Vec<usize> = parameters.iter().map(|&p| parameter_sizes[p]).collect();
    cartesian_product(&sizes)
        .into_iter()
        .map(|values| {
            let mut combination = empty_combination(parameter_sizes.len());
            for (&p, value) in parameters.iter().zip(values) {
                combination[p] = value;
            }
            combination
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combination::NO_VALUE;

    #[test]
    fn test_parameter_combinations_lexicographic() {
        let subsets = parameter_combinations(&[0, 1, 2], 2);
        assert_eq!(subsets, vec![vec![0, 1], vec![0, 2], vec![1, 2]]);
    }

    #[test]
    fn test_parameter_combinations_edge_sizes() {
        assert_eq!(parameter_combinations(&[3, 5], 0), vec![Vec::<usize>::new()]);
        assert!(parameter_combinations(&[3, 5], 3).is_empty());
        assert_eq!(parameter_combinations(&[3, 5], 2), vec![vec![3, 5]]);
    }

    #[test]
    fn test_cartesian_product_mixed_sizes() {
        let product = cartesian_product(&[2, 3]);
        assert_eq!(product.len(), 6);
        assert_eq!(product[0], vec![0, 0]);
        assert_eq!(product[2], vec![0, 2]);
        assert_eq!(product[5], vec![1, 2]);
        assert_eq!(cartesian_product(&[]), vec![Vec::<i32>::new()]);
    }

    #[test]
    fn test_value_combinations_place_values() {
        let combos = value_combinations(&[0, 2], &[2, 2, 2]);
        assert_eq!(combos.len(), 4);
        assert_eq!(combos[1], vec![0, NO_VALUE, 1]);
        assert!(combos.iter().all(|c| c[1] == NO_VALUE));
    }
}
