//! Engine configuration.
//!
//! Every field has a default, so a driver only spells out what it changes:
//! `{"characterization": {"aifl": {}}}` is a complete configuration.

use serde::{Deserialize, Serialize};

use weave_characterize::CharacterizationStrategy;
use weave_conflict::ConflictDetectionConfig;
use weave_generate::GenerationConfig;

use crate::session::SessionError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Generate one negative group per error tuple list.
    pub generate_negative_groups: bool,
    /// Generate groups concurrently.
    pub parallel: bool,
    /// `None` disables fault characterization.
    pub characterization: Option<CharacterizationStrategy>,
    pub conflict_detection: ConflictDetectionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generate_negative_groups: true,
            parallel: true,
            characterization: Some(CharacterizationStrategy::default()),
            conflict_detection: ConflictDetectionConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if let Some(strategy) = &self.characterization {
            strategy.validate()?;
        }
        self.conflict_detection.validate()?;
        Ok(())
    }

    pub fn generation(&self) -> GenerationConfig {
        GenerationConfig {
            negative: self.generate_negative_groups,
            parallel: self.parallel,
        }
    }
}
