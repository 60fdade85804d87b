//! Parameter-combination factories: which parameter subsets must be
//! covered when a parameter is added to the matrix.

use weave_model::combinator::parameter_combinations;
use weave_model::TupleList;

pub trait ParameterCombinationFactory: Send + Sync {
    /// Parameter subsets (each sorted, each containing `next`) whose value
    /// combinations must be covered once `next` joins `previous`.
    fn create(&self, previous: &[usize], next: usize, strength: usize) -> Vec<Vec<usize>>;
}

fn with_parameter(mut parameters: Vec<usize>, extra: &[usize]) -> Vec<usize> {
    parameters.extend_from_slice(extra);
    parameters.sort_unstable();
    parameters
}

/// Every `strength`-sized subset ending in `next`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TWiseFactory;

impl ParameterCombinationFactory for TWiseFactory {
    fn create(&self, previous: &[usize], next: usize, strength: usize) -> Vec<Vec<usize>> {
        let size = strength.saturating_sub(1).min(previous.len());
        parameter_combinations(previous, size)
            .into_iter()
            .map(|subset| with_parameter(subset, &[next]))
            .collect()
    }
}

/// Subsets that always contain the error tuple list's parameters, plus
/// `strength - 1` other previous parameters and `next`.
#[derive(Debug, Clone)]
pub struct NegativeTWiseFactory {
    negative_parameters: Vec<usize>,
}

impl NegativeTWiseFactory {
    pub fn new(error_tuples: &TupleList) -> Self {
        Self {
            negative_parameters: error_tuples.involved_parameters().to_vec(),
        }
    }
}

impl ParameterCombinationFactory for NegativeTWiseFactory {
    fn create(&self, previous: &[usize], next: usize, strength: usize) -> Vec<Vec<usize>> {
        let non_negative: Vec<usize> = previous
            .iter()
            .copied()
            .filter(|p| !self.negative_parameters.contains(p))
            .collect();
        let size = strength.saturating_sub(1).min(non_negative.len());
        let mut fixed = self.negative_parameters.clone();
        fixed.push(next);
        parameter_combinations(&non_negative, size)
            .into_iter()
            .map(|subset| {
                let mut parameters = with_parameter(subset, &fixed);
                parameters.dedup();
                parameters
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_t_wise_pairs() {
        let combos = TWiseFactory.create(&[0, 1, 2], 3, 2);
        assert_eq!(combos, vec![vec![0, 3], vec![1, 3], vec![2, 3]]);
    }

    #[test]
    fn test_t_wise_strength_one() {
        assert_eq!(TWiseFactory.create(&[0, 1], 2, 1), vec![vec![2]]);
    }

    #[test]
    fn test_negative_includes_error_parameters() {
        let list = TupleList::new(1, vec![0, 1], vec![vec![0, 0]]).unwrap();
        let factory = NegativeTWiseFactory::new(&list);
        // Only error parameters processed so far.
        assert_eq!(factory.create(&[0, 1], 2, 2), vec![vec![0, 1, 2]]);
        // One further previous parameter.
        assert_eq!(factory.create(&[0, 1, 2], 3, 2), vec![vec![0, 1, 2, 3]]);
        assert_eq!(
            factory.create(&[0, 1, 2, 3], 4, 2),
            vec![vec![0, 1, 2, 4], vec![0, 1, 3, 4]]
        );
    }
}
