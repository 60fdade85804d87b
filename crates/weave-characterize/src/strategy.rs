//! Selecting and constructing a characterization algorithm.

use serde::{Deserialize, Serialize};

use weave_model::group::FaultCharacterizationConfiguration;

use crate::aifl::{Aifl, AiflConfig};
use crate::ben::{Ben, BenConfig};
use crate::delta::ImprovedDeltaDebugging;
use crate::{CharacterizationError, FaultCharacterizationAlgorithm};

/// Which algorithm localizes failures, with its settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterizationStrategy {
    Aifl(AiflConfig),
    Ben(BenConfig),
    DeltaDebugging,
}

impl Default for CharacterizationStrategy {
    fn default() -> Self {
        CharacterizationStrategy::Ben(BenConfig::default())
    }
}

impl CharacterizationStrategy {
    /// Reject settings no algorithm instance could be built from.
    pub fn validate(&self) -> Result<(), CharacterizationError> {
        match self {
            CharacterizationStrategy::Ben(config) => config.validate(),
            CharacterizationStrategy::Aifl(_) | CharacterizationStrategy::DeltaDebugging => Ok(()),
        }
    }

    /// A fresh algorithm instance for one group.
    pub fn create(
        &self,
        configuration: &FaultCharacterizationConfiguration,
    ) -> Result<Box<dyn FaultCharacterizationAlgorithm>, CharacterizationError> {
        let algorithm: Box<dyn FaultCharacterizationAlgorithm> = match self {
            CharacterizationStrategy::Aifl(config) => Box::new(Aifl::new(configuration, *config)),
            CharacterizationStrategy::Ben(config) => Box::new(Ben::new(configuration, *config)?),
            CharacterizationStrategy::DeltaDebugging => {
                Box::new(ImprovedDeltaDebugging::new(configuration))
            }
        };
        Ok(algorithm)
    }
}
