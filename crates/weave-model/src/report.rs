//! Write-only reporting sink.
//!
//! The engine announces what it produced; nothing reported is ever read
//! back. [`TracingReporter`] forwards events to `tracing`,
//! [`CollectingReporter`] keeps them for inspection.

use std::sync::Mutex;

use serde::Serialize;
use tracing::info;

use crate::combination::{display, Combination};
use crate::group::GroupId;
use crate::tuple_list::ConstraintId;

/// Something the engine wants the outside world to know.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ReportEvent {
    GroupGenerated {
        group: GroupId,
        inputs: usize,
    },
    CharacterizationInputs {
        group: GroupId,
        inputs: Vec<Combination>,
    },
    FailureInducingCombinations {
        group: GroupId,
        combinations: Vec<Combination>,
    },
    /// An error tuple that the other constraints already exclude.
    MissingInvalidTuple {
        tuple_list_id: ConstraintId,
        tuple: Combination,
        conflict: Vec<ConstraintId>,
        diagnoses: Vec<Vec<ConstraintId>>,
    },
}

pub trait Reporter: Send + Sync {
    fn report(&self, event: ReportEvent);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn report(&self, _event: ReportEvent) {}
}

/// Emits every event as a `tracing` info event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: ReportEvent) {
        match event {
            ReportEvent::GroupGenerated { group, inputs } => {
                info!(%group, inputs, "generated test input group");
            }
            ReportEvent::CharacterizationInputs { group, inputs } => {
                info!(%group, count = inputs.len(), "fault characterization needs further inputs");
            }
            ReportEvent::FailureInducingCombinations {
                group,
                combinations,
            } => {
                let rendered: Vec<String> = combinations.iter().map(|c| display(c)).collect();
                info!(%group, combinations = ?rendered, "failure-inducing combinations");
            }
            ReportEvent::MissingInvalidTuple {
                tuple_list_id,
                tuple,
                conflict,
                diagnoses,
            } => {
                let rendered = display(&tuple);
                info!(
                    tuple_list_id,
                    tuple = %rendered,
                    ?conflict,
                    ?diagnoses,
                    "error tuple is excluded by other constraints"
                );
            }
        }
    }
}

/// Keeps every event in arrival order.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events so far.
    pub fn events(&self) -> Vec<ReportEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, event: ReportEvent) {
        self.events.lock().unwrap().push(event);
    }
}
