//! Modifier conditions.
//!
//! A condition is checked right before its modifier would run, against the
//! original input and the value as earlier modifiers left it. Conditions
//! may read game state through whatever they captured but must not touch
//! the pipeline they guard.

use std::fmt;
use std::sync::Arc;

type Predicate<T> = dyn Fn(&T, &T) -> bool + Send + Sync;

/// Gate deciding whether a modifier applies in this run.
pub struct Condition<T> {
    predicate: Option<Arc<Predicate<T>>>,
}

impl<T> Condition<T> {
    /// Always applies.
    #[must_use]
    pub fn always() -> Self {
        Self { predicate: None }
    }

    /// Predicate over `(original, current)`.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Some(Arc::new(predicate)),
        }
    }

    /// Predicate over the current value only.
    pub fn current<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::new(move |_, current| predicate(current))
    }

    /// Zero-argument predicate, typically a read-only game state query.
    pub fn check<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self::new(move |_, _| predicate())
    }

    /// Never applies.
    #[must_use]
    pub fn never() -> Self {
        Self::new(|_, _| false)
    }

    /// True when this condition has no predicate.
    #[must_use]
    pub fn is_always(&self) -> bool {
        self.predicate.is_none()
    }

    /// Evaluate against the run's original input and current value.
    pub fn evaluate(&self, original: &T, current: &T) -> bool {
        self.predicate
            .as_ref()
            .map_or(true, |predicate| predicate(original, current))
    }
}

impl<T: 'static> Condition<T> {
    /// Both conditions must hold. Short-circuits left to right.
    #[must_use]
    pub fn and(self, other: Condition<T>) -> Self {
        match (self.predicate, other.predicate) {
            (None, rhs) => Self { predicate: rhs },
            (lhs, None) => Self { predicate: lhs },
            (Some(lhs), Some(rhs)) => Self::new(move |o, c| lhs(o, c) && rhs(o, c)),
        }
    }

    /// At least one condition must hold.
    #[must_use]
    pub fn or(self, other: Condition<T>) -> Self {
        match (self.predicate, other.predicate) {
            (None, _) | (_, None) => Self::always(),
            (Some(lhs), Some(rhs)) => Self::new(move |o, c| lhs(o, c) || rhs(o, c)),
        }
    }

    /// Invert this condition.
    #[must_use]
    pub fn negate(self) -> Self {
        match self.predicate {
            None => Self::never(),
            Some(inner) => Self::new(move |o, c| !inner(o, c)),
        }
    }
}

impl<T> Clone for Condition<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
        }
    }
}

impl<T> Default for Condition<T> {
    fn default() -> Self {
        Self::always()
    }
}

impl<T> fmt::Debug for Condition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_always() {
            f.write_str("Condition::Always")
        } else {
            f.write_str("Condition::Predicate")
        }
    }
}
