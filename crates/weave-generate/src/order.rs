//! Parameter orders: which parameters seed the initial matrix and in
//! which order the rest are added.

use weave_model::TupleList;

pub trait ParameterOrder: Send + Sync {
    /// Parameters whose valid cartesian product forms the initial matrix.
    fn initial_parameters(&self, number_of_parameters: usize, strength: usize) -> Vec<usize>;

    /// Parameters added one at a time afterwards, in order.
    fn remaining_parameters(&self, number_of_parameters: usize, strength: usize) -> Vec<usize>;
}

/// Declaration order; the first `strength` parameters are initial.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrengthBasedOrder;

impl ParameterOrder for StrengthBasedOrder {
    fn initial_parameters(&self, number_of_parameters: usize, strength: usize) -> Vec<usize> {
        (0..strength.min(number_of_parameters)).collect()
    }

    fn remaining_parameters(&self, number_of_parameters: usize, strength: usize) -> Vec<usize> {
        (strength.min(number_of_parameters)..number_of_parameters).collect()
    }
}

/// The parameters of one error tuple list first, then the rest in declaration order.
#[derive(Debug, Clone)]
pub struct NegativityAwareOrder {
    negative_parameters: Vec<usize>,
}

impl NegativityAwareOrder {
    pub fn new(error_tuples: &TupleList) -> Self {
        let mut negative_parameters = error_tuples.involved_parameters().to_vec();
        negative_parameters.sort_unstable();
        Self {
            negative_parameters,
        }
    }
}

impl ParameterOrder for NegativityAwareOrder {
    fn initial_parameters(&self, _number_of_parameters: usize, _strength: usize) -> Vec<usize> {
        self.negative_parameters.clone()
    }

    fn remaining_parameters(&self, number_of_parameters: usize, _strength: usize) -> Vec<usize> {
        (0..number_of_parameters)
            .filter(|p| !self.negative_parameters.contains(p))
            .collect()
    }
}
