//! Fault characterization: localizing the combinations responsible for
//! failing test inputs.
//!
//! Characterization is a request/response protocol with an external test
//! runner. The driver executes the inputs it is given, hands the results to
//! [`FaultCharacterizationAlgorithm::compute_next_test_inputs`] and repeats
//! until an empty list comes back.

pub mod aifl;
pub mod ben;
pub mod delta;
pub mod reducer;
pub mod strategy;
mod suspicious;

use weave_model::{Combination, ModelError, TestResults};

pub use aifl::{Aifl, AiflConfig};
pub use ben::{Ben, BenConfig};
pub use delta::ImprovedDeltaDebugging;
pub use reducer::reduce;
pub use strategy::CharacterizationStrategy;

/// Errors raised by characterization algorithms.
#[derive(Debug, thiserror::Error)]
pub enum CharacterizationError {
    #[error("no test results given")]
    EmptyResults,

    #[error("results do not contain the expected test input {0:?}")]
    MissingExpectedInput(Combination),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A stateful fault localization strategy for one test input group.
///
/// Calls must not overlap; every call consumes the results of the inputs
/// returned by the previous one.
pub trait FaultCharacterizationAlgorithm: Send {
    /// Absorb a round of results and return the inputs to execute next.
    /// An empty list means the algorithm has converged.
    fn compute_next_test_inputs(
        &mut self,
        results: &TestResults,
    ) -> Result<Vec<Combination>, CharacterizationError>;

    /// The current best guess, most suspicious first where the algorithm ranks.
    fn compute_failure_inducing_combinations(&self) -> Vec<Combination>;
}
