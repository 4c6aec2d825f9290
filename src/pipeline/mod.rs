//! Pipelines: ordered modifier chains for one kind of game value.
//!
//! A game event happens, the host calls [`Pipeline::process`] with the base
//! value, and gets the modified value back synchronously. Observers hear
//! about every run afterwards.
//!
//! ## Run Order
//!
//! 1. A run that starts while the same pipeline is already processing is
//!    refused and gets its base value back.
//! 2. The modifier list is snapshotted (an O(1) persistent-vector clone).
//! 3. Modifiers run in `(phase, priority, registration order)` order. Each
//!    one's condition is checked right before it would run, against the
//!    value as earlier modifiers left it.
//! 4. A failing or panicking modifier is logged and skipped; the value is
//!    carried forward unchanged.
//! 5. Every modifier that applied gets `on_applied(original, result)`, in
//!    the same order, and then observers get `(original, result)`.

mod chain;
mod observers;
mod trace;

pub use chain::{Pipeline, Registration};
pub use trace::{StepOutcome, Trace, TraceStep};

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::ModifierError;

/// Lock, recovering from poisoning. Nothing we guard can be left torn by
/// a panic: mutations are single `Vector` or `Vec` operations.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run a rule body, turning a panic into a [`ModifierError`] when asked to.
pub(crate) fn isolate<R>(
    catch_panics: bool,
    body: impl FnOnce() -> Result<R, ModifierError>,
) -> Result<R, ModifierError> {
    if !catch_panics {
        return body();
    }
    panic::catch_unwind(AssertUnwindSafe(body))
        .unwrap_or_else(|payload| Err(ModifierError::from_panic(payload)))
}
