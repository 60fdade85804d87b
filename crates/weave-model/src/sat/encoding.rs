//! Model encoding: maps parameters and tuple lists to SAT clauses.
//!
//! Encoding strategy:
//! - **Parameter**: one-hot. N SAT variables for a domain of N values,
//!   exactly-one constraint (at-least-one + pairwise at-most-one).
//! - **Forbidden tuple list**: one clause per tuple,
//!   `(!x[p1][v1] OR ... OR !x[pk][vk])`, so no tuple can be matched.
//! - **Negated tuple list**: at least one tuple must be matched. One
//!   selector variable `s_j` per tuple, `(s_1 OR ... OR s_m)` and
//!   `(!s_j OR x[p][v])` for every assignment of tuple `j`.
//! - **Assignment**: unit clauses fixing the assigned slots.

use varisat::{Lit, Var};

use crate::combination::NO_VALUE;
use crate::tuple_list::TupleList;

/// A conjunction of disjunctive clauses.
pub type CnfClauses = Vec<Vec<Lit>>;

/// All parameters as one-hot SAT variables, plus their exactly-one clauses.
#[derive(Debug, Clone)]
pub struct EncodedModel {
    /// `parameters[p][v]` is true iff parameter `p` takes value `v`.
    parameters: Vec<Vec<Var>>,
    /// Exactly-one clauses for every parameter.
    structural_clauses: CnfClauses,
    /// Next free variable index (selectors are allocated past the domain variables).
    next_var: usize,
}

/// Encode the parameter domains.
pub fn encode_parameters(parameter_sizes: &[usize]) -> EncodedModel {
    let mut next_var = 0usize;
    let mut structural_clauses = Vec::new();
    let mut parameters = Vec::with_capacity(parameter_sizes.len());

    for &size in parameter_sizes {
        let vars: Vec<Var> = (0..size)
            .map(|_| {
                let var = Var::from_index(next_var);
                next_var += 1;
                var
            })
            .collect();

        // 1) At-least-one: (v1 OR v2 OR ... OR vN)
        structural_clauses.push(vars.iter().map(|v| v.positive()).collect());

        // 2) At-most-one: pairwise (!vi OR !vj) for all i < j
        for i in 0..vars.len() {
            for j in (i + 1)..vars.len() {
                structural_clauses.push(vec![vars[i].negative(), vars[j].negative()]);
            }
        }

        parameters.push(vars);
    }

    EncodedModel {
        parameters,
        structural_clauses,
        next_var,
    }
}

impl EncodedModel {
    pub fn number_of_parameters(&self) -> usize {
        self.parameters.len()
    }

    pub fn structural_clauses(&self) -> &CnfClauses {
        &self.structural_clauses
    }

    /// All one-hot variables, parameter by parameter.
    pub fn domain_vars(&self) -> impl Iterator<Item = Var> + '_ {
        self.parameters.iter().flatten().copied()
    }

    /// The literal asserting `parameter == value`, if both exist.
    pub fn lit_for_value(&self, parameter: usize, value: i32) -> Option<Lit> {
        if value < 0 {
            return None;
        }
        self.parameters
            .get(parameter)
            .and_then(|vars| vars.get(value as usize))
            .map(|var| var.positive())
    }

    fn fresh_var(&mut self) -> Var {
        let var = Var::from_index(self.next_var);
        self.next_var += 1;
        var
    }

    /// No tuple of the list may be matched.
    pub fn encode_forbidden(&self, list: &TupleList) -> CnfClauses {
        list.tuples()
            .iter()
            .map(|tuple| {
                list.involved_parameters()
                    .iter()
                    .zip(tuple)
                    .filter_map(|(&p, &v)| self.lit_for_value(p, v))
                    .map(|lit| !lit)
                    .collect()
            })
            .collect()
    }

    /// At least one tuple of the list must be matched.
    pub fn encode_negated(&mut self, list: &TupleList) -> CnfClauses {
        let mut clauses = Vec::new();
        let mut selectors = Vec::with_capacity(list.tuples().len());

        for tuple in list.tuples() {
            let selector = self.fresh_var();
            selectors.push(selector.positive());
            for (&p, &v) in list.involved_parameters().iter().zip(tuple) {
                if let Some(lit) = self.lit_for_value(p, v) {
                    clauses.push(vec![selector.negative(), lit]);
                }
            }
        }

        clauses.push(selectors);
        clauses
    }

    /// Fix every assigned slot of `combination`.
    ///
    /// Callers check the combination against the domains first; slots
    /// outside a domain are not encoded.
    pub fn encode_assignment(&self, combination: &[i32]) -> CnfClauses {
        combination
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != NO_VALUE)
            .filter_map(|(p, &v)| self.lit_for_value(p, v))
            .map(|lit| vec![lit])
            .collect()
    }
}
