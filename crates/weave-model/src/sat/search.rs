//! Satisfiability queries over an encoded model.
//!
//! Every query builds a fresh solver from the structural clauses, the
//! constraint clauses and the query-specific extra clauses.

use varisat::{solver::Solver, ExtendFormula};

use super::encoding::{CnfClauses, EncodedModel};

/// Errors during search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("solver error: {0}")]
    Solver(String),
}

/// Initialize a solver with all domain variables registered and all clauses added.
fn init_solver<'a>(
    encoded: &EncodedModel,
    constraint_clauses: &CnfClauses,
    extra_clauses: &CnfClauses,
) -> Solver<'a> {
    let mut solver = Solver::new();

    // Tautologies [v, !v] make the solver track every domain variable,
    // even those no constraint mentions.
    for var in encoded.domain_vars() {
        solver.add_clause(&[var.positive(), var.negative()]);
    }

    for clause in encoded.structural_clauses() {
        solver.add_clause(clause);
    }

    for clause in constraint_clauses {
        solver.add_clause(clause);
    }

    // Query-specific clauses (e.g. a partial assignment under test).
    for clause in extra_clauses {
        solver.add_clause(clause);
    }

    solver
}

/// Check if the encoded model (with constraints + extras) is satisfiable.
pub fn is_sat(
    encoded: &EncodedModel,
    constraint_clauses: &CnfClauses,
    extra_clauses: &CnfClauses,
) -> Result<bool, SearchError> {
    let mut solver = init_solver(encoded, constraint_clauses, extra_clauses);
    solver
        .solve()
        .map_err(|e| SearchError::Solver(e.to_string()))
}
