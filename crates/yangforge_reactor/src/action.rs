//! Inference actions.
//!
//! A statement support may register an action declaring the phase it runs
//! in, the prerequisites it needs, and what to do when they are satisfied.
//! The reactor runs a fixed-point loop per phase: each round fires every
//! action whose prerequisites now hold; a round that fires nothing while
//! work remains fails the phase, reporting each stuck action's missing
//! prerequisites.

use yangforge_foundation::Error;

use crate::phase::Phase;
use crate::reactor::Reactor;

/// A single prerequisite of an inference action.
pub struct Prereq {
    /// What the action is waiting for, used in unresolved-reference
    /// diagnostics.
    pub description: String,
    /// Returns true once the prerequisite is satisfied.
    pub check: Box<dyn Fn(&Reactor) -> bool>,
}

impl Prereq {
    /// Creates a prerequisite.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        check: impl Fn(&Reactor) -> bool + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            check: Box::new(check),
        }
    }
}

/// A deferred inference step.
pub struct InferenceAction {
    /// Phase in which the action may fire.
    pub phase: Phase,
    /// All must pass before `apply` runs.
    pub prereqs: Vec<Prereq>,
    /// Fired once all prerequisites are satisfied.
    pub apply: Box<dyn FnOnce(&mut Reactor) -> yangforge_foundation::Result<()>>,
    /// Builds the error reported when the phase ends with prerequisites
    /// still missing.
    pub failure: Box<dyn Fn(&[String]) -> Error>,
}

impl InferenceAction {
    /// Starts building an action for a phase.
    #[must_use]
    pub fn builder(phase: Phase) -> Builder {
        Builder {
            phase,
            prereqs: Vec::new(),
        }
    }
}

/// Builder for [`InferenceAction`].
pub struct Builder {
    phase: Phase,
    prereqs: Vec<Prereq>,
}

impl Builder {
    /// Adds a prerequisite.
    #[must_use]
    pub fn requires(mut self, prereq: Prereq) -> Self {
        self.prereqs.push(prereq);
        self
    }

    /// Finishes the action with its apply and failure callbacks.
    pub fn apply(
        self,
        apply: impl FnOnce(&mut Reactor) -> yangforge_foundation::Result<()> + 'static,
        failure: impl Fn(&[String]) -> Error + 'static,
    ) -> InferenceAction {
        InferenceAction {
            phase: self.phase,
            prereqs: self.prereqs,
            apply: Box::new(apply),
            failure: Box::new(failure),
        }
    }
}
