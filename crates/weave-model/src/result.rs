use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::combination::Combination;

/// Outcome of executing one test input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestResult {
    Pass,
    /// The cause is opaque to the engine.
    Fail { cause: String },
}

impl TestResult {
    pub fn failed(cause: impl Into<String>) -> Self {
        TestResult::Fail {
            cause: cause.into(),
        }
    }

    pub fn is_successful(&self) -> bool {
        matches!(self, TestResult::Pass)
    }

    pub fn is_unsuccessful(&self) -> bool {
        !self.is_successful()
    }
}

/// Results of one round, keyed by the executed input.
/// Ordered so that every algorithm consuming it is deterministic.
pub type TestResults = BTreeMap<Combination, TestResult>;
