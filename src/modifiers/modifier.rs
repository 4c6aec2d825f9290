//! The modifier type and its standard kinds.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::core::{OwnerId, Phase};
use crate::error::ModifierError;

use super::condition::Condition;
use super::value::{Additive, Channeled, Scalable};

type ApplyFn<T> = dyn Fn(&T, &T) -> Result<T, ModifierError> + Send + Sync;
type NotifyFn<T> = dyn Fn(&T, &T) + Send + Sync;

/// Closed set of modifier kinds.
///
/// The kind is a tag for ordering defaults, duplicate detection and
/// tooling; the behaviour itself lives in the modifier's apply function.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    /// `current + amount`.
    Addition,
    /// `truncate(current * multiplier)`.
    Multiplication,
    /// A fixed value, ignoring `current`.
    Override,
    /// Moves a scaled quantity from one channel to another.
    Conversion,
    /// Leaves the value alone; exists for its `on_applied` callback.
    Callback,
    /// Game-specific rule body. Two custom modifiers are the same kind
    /// only when their labels match. Labels may come from game data.
    Custom(Arc<str>),
}

impl ModifierKind {
    /// Phase a modifier of this kind lands in unless told otherwise.
    #[must_use]
    pub fn default_phase(&self) -> Phase {
        match self {
            Self::Addition => Phase::Addition,
            Self::Multiplication => Phase::Multiplication,
            Self::Conversion => Phase::Conversion,
            Self::Override => Phase::Override,
            Self::Callback => Phase::PostProcess,
            Self::Custom(_) => Phase::Addition,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Addition => "addition",
            Self::Multiplication => "multiplication",
            Self::Override => "override",
            Self::Conversion => "conversion",
            Self::Callback => "callback",
            Self::Custom(label) => &**label,
        }
    }
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(label) => write!(f, "custom:{}", label),
            other => f.write_str(other.name()),
        }
    }
}

/// One rule transforming a value.
///
/// Built with one of the kind constructors and refined with the builder
/// methods, then handed to a pipeline. Once registered it is shared
/// behind an `Arc` and never changes.
///
/// ## Example
///
/// ```
/// use rust_modifiers::core::{OwnerId, Phase};
/// use rust_modifiers::modifiers::{Condition, Modifier};
///
/// let owner = OwnerId::from_raw(1);
///
/// // "+2 coins, but only while the gain is still positive"
/// let bonus = Modifier::addition(owner, 2)
///     .with_priority(10)
///     .when(Condition::current(|v: &i32| *v > 0));
///
/// assert_eq!(bonus.phase(), Phase::Addition);
/// assert_eq!(bonus.apply(&3, &3), Ok(5));
/// assert!(!bonus.can_apply(&3, &0));
/// ```
pub struct Modifier<T> {
    kind: ModifierKind,
    name: String,
    phase: Phase,
    priority: i32,
    owner: OwnerId,
    /// Intrinsic to the kind (a conversion needs something to convert).
    requirement: Condition<T>,
    /// Supplied by the rule author.
    condition: Condition<T>,
    apply: Arc<ApplyFn<T>>,
    on_applied: Option<Arc<NotifyFn<T>>>,
}

impl<T: Clone + Send + Sync + 'static> Modifier<T> {
    fn with_kind<F>(owner: OwnerId, kind: ModifierKind, apply: F) -> Self
    where
        F: Fn(&T, &T) -> Result<T, ModifierError> + Send + Sync + 'static,
    {
        Self {
            name: kind.to_string(),
            phase: kind.default_phase(),
            kind,
            priority: 0,
            owner,
            requirement: Condition::always(),
            condition: Condition::always(),
            apply: Arc::new(apply),
            on_applied: None,
        }
    }

    /// `current + amount`.
    pub fn addition(owner: OwnerId, amount: T) -> Self
    where
        T: Additive,
    {
        Self::with_kind(owner, ModifierKind::Addition, move |_, current| {
            Ok(current.plus(&amount))
        })
    }

    /// `truncate(current * multiplier)`.
    pub fn multiplication(owner: OwnerId, multiplier: f32) -> Self
    where
        T: Scalable,
    {
        Self::with_kind(owner, ModifierKind::Multiplication, move |_, current| {
            Ok(current.scaled(multiplier))
        })
    }

    /// Replace the value with `value`.
    pub fn override_with(owner: OwnerId, value: T) -> Self {
        Self::with_kind(owner, ModifierKind::Override, move |_, _| Ok(value.clone()))
    }

    /// Move `truncate(current[from] * multiplier)` into `to`, zeroing `from`.
    ///
    /// Skipped entirely while `from` holds nothing positive.
    pub fn conversion(owner: OwnerId, from: T::Channel, to: T::Channel, multiplier: f32) -> Self
    where
        T: Channeled,
    {
        let mut modifier = Self::with_kind(owner, ModifierKind::Conversion, move |_, current| {
            let moved = current.channel(from).scaled(multiplier);
            let drained = current.with_channel(from, 0);
            let target = drained.channel(to).wrapping_add(moved);
            Ok(drained.with_channel(to, target))
        });
        modifier.requirement = Condition::current(move |current: &T| current.channel(from) > 0);
        modifier
    }

    /// Observe the settled value without changing it.
    ///
    /// `callback` runs with `(original, result)` after the whole run, so
    /// it sees what every other modifier did.
    pub fn callback<F>(owner: OwnerId, callback: F) -> Self
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        Self::with_kind(owner, ModifierKind::Callback, |_, current| Ok(current.clone()))
            .on_applied(callback)
    }

    /// Game-specific rule body.
    ///
    /// `label` identifies the rule for duplicate detection and logs.
    pub fn custom<F>(owner: OwnerId, label: impl Into<Arc<str>>, phase: Phase, apply: F) -> Self
    where
        F: Fn(&T, &T) -> Result<T, ModifierError> + Send + Sync + 'static,
    {
        Self::with_kind(owner, ModifierKind::Custom(label.into()), apply).in_phase(phase)
    }
}

impl<T> Modifier<T> {
    /// Override the phase (builder pattern).
    #[must_use]
    pub fn in_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Set priority (builder pattern). Lower runs first within a phase.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set a display name (builder pattern).
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the condition (builder pattern).
    #[must_use]
    pub fn when(mut self, condition: Condition<T>) -> Self {
        self.condition = condition;
        self
    }

    /// Set the post-apply callback (builder pattern).
    #[must_use]
    pub fn on_applied<F>(mut self, callback: F) -> Self
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        self.on_applied = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn kind(&self) -> &ModifierKind {
        &self.kind
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Ordering key inside a pipeline.
    #[must_use]
    pub fn sort_key(&self) -> (Phase, i32) {
        (self.phase, self.priority)
    }

    /// Should this modifier run given the run's input and the value so far?
    pub fn can_apply(&self, original: &T, current: &T) -> bool {
        self.requirement.evaluate(original, current) && self.condition.evaluate(original, current)
    }

    /// Compute the next value.
    pub fn apply(&self, original: &T, current: &T) -> Result<T, ModifierError> {
        (self.apply)(original, current)
    }

    /// Notify after the run completed. No-op without a callback.
    pub fn notify(&self, original: &T, result: &T) {
        if let Some(callback) = &self.on_applied {
            callback(original, result);
        }
    }

    /// Same owner and same kind.
    #[must_use]
    pub fn duplicates(&self, other: &Modifier<T>) -> bool {
        self.owner == other.owner && self.kind == other.kind
    }
}

impl<T> Clone for Modifier<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            name: self.name.clone(),
            phase: self.phase,
            priority: self.priority,
            owner: self.owner,
            requirement: self.requirement.clone(),
            condition: self.condition.clone(),
            apply: Arc::clone(&self.apply),
            on_applied: self.on_applied.clone(),
        }
    }
}

impl<T> fmt::Debug for Modifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modifier")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("phase", &self.phase)
            .field("priority", &self.priority)
            .field("owner", &self.owner)
            .field("condition", &self.condition)
            .field("on_applied", &self.on_applied.is_some())
            .finish()
    }
}
