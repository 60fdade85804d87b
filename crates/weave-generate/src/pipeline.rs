//! Group generation pipeline.
//!
//! 1. Validate the model
//! 2. Build one job for the positive group and one per error tuple list
//! 3. Run the jobs, in parallel with rayon if configured
//! 4. Report every group, in job order

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use weave_model::checker::ConstraintCheckerFactory;
use weave_model::group::{FaultCharacterizationConfiguration, GroupId, TestInputGroup};
use weave_model::report::{ReportEvent, Reporter};
use weave_model::{ModelError, TestModel, TupleList};

use crate::ipog::Ipog;
use crate::negative::negative_group;

/// Errors raised while generating test input groups.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("invalid model: {0}")]
    Model(#[from] ModelError),
}

/// Which groups to generate and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Generate one negative group per error tuple list.
    pub negative: bool,
    /// Generate groups on the rayon thread pool.
    pub parallel: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            negative: true,
            parallel: true,
        }
    }
}

enum Job<'a> {
    Positive,
    Negative(&'a TupleList),
}

impl Job<'_> {
    fn run(
        &self,
        model: &TestModel,
        factory: &dyn ConstraintCheckerFactory,
    ) -> Result<TestInputGroup, GenerationError> {
        match self {
            Job::Positive => {
                let checker = factory.create(model)?;
                let inputs = Ipog::new(model, checker.as_ref()).generate();
                Ok(TestInputGroup::new(
                    GroupId::Positive,
                    inputs,
                    Some(FaultCharacterizationConfiguration::new(model.clone(), checker)),
                ))
            }
            Job::Negative(list) => negative_group(model, list, factory),
        }
    }
}

/// Generate the positive group and, if enabled, every negative group.
///
/// Groups come back in a fixed order regardless of parallelism: positive
/// first, then negative groups in error tuple list declaration order.
pub fn generate_groups(
    model: &TestModel,
    factory: &dyn ConstraintCheckerFactory,
    config: &GenerationConfig,
    reporter: &dyn Reporter,
) -> Result<Vec<TestInputGroup>, GenerationError> {
    model.validate()?;

    let mut jobs = vec![Job::Positive];
    if config.negative {
        jobs.extend(model.error_tuple_lists().iter().map(Job::Negative));
    }

    let groups: Vec<TestInputGroup> = if config.parallel {
        jobs.par_iter()
            .map(|job| job.run(model, factory))
            .collect::<Result<_, _>>()?
    } else {
        jobs.iter()
            .map(|job| job.run(model, factory))
            .collect::<Result<_, _>>()?
    };

    for group in &groups {
        reporter.report(ReportEvent::GroupGenerated {
            group: group.id,
            inputs: group.inputs.len(),
        });
    }
    info!(
        groups = groups.len(),
        inputs = groups.iter().map(|g| g.inputs.len()).sum::<usize>(),
        "test input groups generated"
    );

    Ok(groups)
}
