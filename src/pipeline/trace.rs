//! Per-run execution traces.

use crate::core::{ModifierId, OwnerId, Phase};
use crate::error::ModifierError;
use crate::modifiers::ModifierKind;

/// What happened to one modifier during a run.
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome<T> {
    /// Condition held and the body returned a value.
    Applied { before: T, after: T },
    /// Condition did not hold against the current value.
    Skipped,
    /// The body, or its condition, failed. The value was left as it was.
    Faulted(ModifierError),
}

/// One modifier's entry in a [`Trace`].
#[derive(Clone, Debug, PartialEq)]
pub struct TraceStep<T> {
    pub id: ModifierId,
    pub owner: OwnerId,
    pub kind: ModifierKind,
    pub phase: Phase,
    pub priority: i32,
    pub outcome: StepOutcome<T>,
}

impl<T> TraceStep<T> {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self.outcome, StepOutcome::Applied { .. })
    }

    #[must_use]
    pub fn is_faulted(&self) -> bool {
        matches!(self.outcome, StepOutcome::Faulted(_))
    }
}

/// Full record of one `process` run, in application order.
#[derive(Clone, Debug, PartialEq)]
pub struct Trace<T> {
    /// Value handed in.
    pub original: T,
    /// Value handed back.
    pub result: T,
    /// The run was refused because the pipeline was already processing.
    pub rejected: bool,
    /// Every modifier considered, in order.
    pub steps: Vec<TraceStep<T>>,
}

impl<T> Trace<T> {
    /// Steps that changed (or at least ran against) the value.
    pub fn applied(&self) -> impl Iterator<Item = &TraceStep<T>> {
        self.steps.iter().filter(|s| s.is_applied())
    }

    /// Steps that failed.
    pub fn faults(&self) -> impl Iterator<Item = &TraceStep<T>> {
        self.steps.iter().filter(|s| s.is_faulted())
    }

    /// Ids of applied modifiers, in application order.
    #[must_use]
    pub fn applied_ids(&self) -> Vec<ModifierId> {
        self.applied().map(|s| s.id).collect()
    }
}
