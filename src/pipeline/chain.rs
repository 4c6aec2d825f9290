//! The pipeline: an ordered modifier collection and its `process` entry point.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use im::Vector;
use smallvec::SmallVec;
use tracing::{debug, error, trace, warn};

use crate::config::PipelineConfig;
use crate::core::{ModifierId, OwnerId, SubscriptionId};
use crate::debug::ModifierInfo;
use crate::error::ModifierError;
use crate::modifiers::Modifier;

use super::observers::Observers;
use super::trace::{StepOutcome, Trace, TraceStep};
use super::{isolate, lock};

const TARGET: &str = "modifiers::pipeline";

/// A registered modifier and its handle.
struct Entry<T> {
    id: ModifierId,
    modifier: Arc<Modifier<T>>,
}

impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            modifier: Arc::clone(&self.modifier),
        }
    }
}

/// Modifier storage.
///
/// `entries` is kept sorted by `(phase, priority)`; new entries go after
/// every existing entry with an equal key, so equal keys stay in
/// registration order and `process` never sorts.
struct Entries<T> {
    entries: Vector<Entry<T>>,
    next_id: u64,
}

/// Result of [`Pipeline::add_modifier`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// The modifier was stored under this id.
    Added(ModifierId),
    /// The owner already has a modifier of this kind here (its id is
    /// returned); the new one was dropped.
    Duplicate(ModifierId),
}

impl Registration {
    /// Id of the modifier now in effect for this owner and kind.
    #[must_use]
    pub fn id(self) -> ModifierId {
        match self {
            Self::Added(id) | Self::Duplicate(id) => id,
        }
    }

    #[must_use]
    pub fn is_added(self) -> bool {
        matches!(self, Self::Added(_))
    }
}

/// Clears the processing flag when the run ends, including by unwinding.
struct ProcessingGuard<'a>(&'a AtomicBool);

impl<'a> ProcessingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Ordered collection of modifiers for one kind of game value.
///
/// `process` threads a base value through every eligible modifier in
/// `(phase, priority, registration)` order and returns the result. All
/// methods take `&self`: the modifier list sits behind a mutex, so owners
/// may register or remove modifiers from other call contexts, even while a
/// run is in flight. A run works on a snapshot taken when it starts and
/// never sees those changes.
///
/// ## Example
///
/// ```
/// use rust_modifiers::core::OwnerId;
/// use rust_modifiers::modifiers::Modifier;
/// use rust_modifiers::pipeline::Pipeline;
///
/// let coin_gain = Pipeline::<i32>::new("coin-gain");
/// let relic = OwnerId::from_raw(7);
///
/// coin_gain.add_modifier(Modifier::multiplication(relic, 2.0));
/// coin_gain.add_modifier(Modifier::addition(relic, 5));
///
/// // Additions run before multiplications regardless of registration order.
/// assert_eq!(coin_gain.process(10), 30);
///
/// coin_gain.remove_modifiers_for(relic);
/// assert_eq!(coin_gain.process(10), 10);
/// ```
pub struct Pipeline<T> {
    name: String,
    config: PipelineConfig,
    modifiers: Mutex<Entries<T>>,
    processing: AtomicBool,
    observers: Observers<T>,
}

impl<T: Clone + Send + Sync + 'static> Pipeline<T> {
    /// Create an empty pipeline with default configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, PipelineConfig::default())
    }

    /// Create an empty pipeline.
    pub fn with_config(name: impl Into<String>, config: PipelineConfig) -> Self {
        Self {
            name: name.into(),
            config,
            modifiers: Mutex::new(Entries {
                entries: Vector::new(),
                next_id: 0,
            }),
            processing: AtomicBool::new(false),
            observers: Observers::new(),
        }
    }

    /// Run `base` through the pipeline.
    ///
    /// Never fails: a re-entrant call gets `base` back, and a faulty
    /// modifier is logged and skipped.
    pub fn process(&self, base: T) -> T {
        self.run(base, None).0
    }

    /// Same as [`process`](Self::process), recording what each modifier did.
    pub fn process_traced(&self, base: T) -> Trace<T> {
        let original = base.clone();
        let mut steps = Vec::new();
        let (result, rejected) = self.run(base, Some(&mut steps));
        Trace {
            original,
            result,
            rejected,
            steps,
        }
    }

    fn run(&self, base: T, mut steps: Option<&mut Vec<TraceStep<T>>>) -> (T, bool) {
        let Some(_guard) = ProcessingGuard::enter(&self.processing) else {
            error!(
                target: TARGET,
                pipeline = %self.name,
                "Pipeline busy (re-entrant or concurrent call), returning base value"
            );
            return (base, true);
        };

        let original = base.clone();
        let mut current = base;
        let snapshot = lock(&self.modifiers).entries.clone();
        let mut applied: SmallVec<[Arc<Modifier<T>>; 8]> = SmallVec::new();

        for entry in &snapshot {
            let modifier = &entry.modifier;

            // Conditions see the value as earlier modifiers left it.
            let step = isolate(self.config.catch_panics, || {
                if modifier.can_apply(&original, &current) {
                    modifier.apply(&original, &current).map(Some)
                } else {
                    Ok(None)
                }
            });

            let outcome = match step {
                Ok(Some(next)) => {
                    trace!(
                        target: TARGET,
                        pipeline = %self.name,
                        modifier = %entry.id,
                        owner = %modifier.owner(),
                        kind = %modifier.kind(),
                        "Modifier applied"
                    );
                    let before = std::mem::replace(&mut current, next);
                    applied.push(Arc::clone(modifier));
                    steps.as_ref().map(|_| StepOutcome::Applied {
                        before,
                        after: current.clone(),
                    })
                }
                Ok(None) => steps.as_ref().map(|_| StepOutcome::Skipped),
                Err(error) => {
                    self.log_fault(entry, &error, "Modifier failed, skipping");
                    steps.as_ref().map(|_| StepOutcome::Faulted(error))
                }
            };

            if let (Some(steps), Some(outcome)) = (steps.as_deref_mut(), outcome) {
                steps.push(TraceStep {
                    id: entry.id,
                    owner: modifier.owner(),
                    kind: modifier.kind().clone(),
                    phase: modifier.phase(),
                    priority: modifier.priority(),
                    outcome,
                });
            }
        }

        for modifier in &applied {
            let notified = isolate(self.config.catch_panics, || {
                modifier.notify(&original, &current);
                Ok(())
            });
            if let Err(error) = notified {
                error!(
                    target: TARGET,
                    pipeline = %self.name,
                    owner = %modifier.owner(),
                    kind = %modifier.kind(),
                    error = %error,
                    "on_applied callback failed"
                );
            }
        }

        self.observers
            .broadcast(&self.name, &original, &current, self.config.catch_panics);

        (current, false)
    }

    fn log_fault(&self, entry: &Entry<T>, error: &ModifierError, message: &str) {
        error!(
            target: TARGET,
            pipeline = %self.name,
            modifier = %entry.id,
            owner = %entry.modifier.owner(),
            kind = %entry.modifier.kind(),
            name = entry.modifier.name(),
            error = %error,
            "{}", message
        );
    }

    /// Register a modifier.
    ///
    /// If the owner already has a modifier of the same kind here, the new
    /// one is dropped with a warning (unless the pipeline allows duplicates).
    pub fn add_modifier(&self, modifier: Modifier<T>) -> Registration {
        let mut modifiers = lock(&self.modifiers);

        if !self.config.allow_duplicate_kinds {
            if let Some(existing) = modifiers
                .entries
                .iter()
                .find(|e| e.modifier.duplicates(&modifier))
            {
                warn!(
                    target: TARGET,
                    pipeline = %self.name,
                    owner = %modifier.owner(),
                    kind = %modifier.kind(),
                    existing = %existing.id,
                    "Duplicate modifier registration ignored"
                );
                return Registration::Duplicate(existing.id);
            }
        }

        let id = ModifierId::new(modifiers.next_id);
        modifiers.next_id += 1;

        let key = modifier.sort_key();
        let index = modifiers
            .entries
            .iter()
            .position(|e| e.modifier.sort_key() > key)
            .unwrap_or(modifiers.entries.len());

        debug!(
            target: TARGET,
            pipeline = %self.name,
            modifier = %id,
            owner = %modifier.owner(),
            kind = %modifier.kind(),
            phase = %modifier.phase(),
            priority = modifier.priority(),
            "Modifier registered"
        );

        modifiers.entries.insert(
            index,
            Entry {
                id,
                modifier: Arc::new(modifier),
            },
        );
        Registration::Added(id)
    }

    /// Remove one modifier by id. Returns whether it was present.
    pub fn remove_modifier(&self, id: ModifierId) -> bool {
        let mut modifiers = lock(&self.modifiers);
        let Some(index) = modifiers.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        modifiers.entries.remove(index);
        debug!(target: TARGET, pipeline = %self.name, modifier = %id, "Modifier removed");
        true
    }

    /// Remove every modifier registered by `owner`. Returns how many went.
    ///
    /// Removing an owner with nothing registered is a silent no-op.
    pub fn remove_modifiers_for(&self, owner: OwnerId) -> usize {
        let mut modifiers = lock(&self.modifiers);
        let before = modifiers.entries.len();
        let kept: Vector<Entry<T>> = modifiers
            .entries
            .iter()
            .filter(|e| e.modifier.owner() != owner)
            .cloned()
            .collect();
        modifiers.entries = kept;

        let removed = before - modifiers.entries.len();
        if removed > 0 {
            debug!(
                target: TARGET,
                pipeline = %self.name,
                owner = %owner,
                removed,
                "Owner modifiers removed"
            );
        }
        removed
    }

    /// Remove every modifier and drop every observer. Teardown only.
    pub fn clear(&self) {
        lock(&self.modifiers).entries.clear();
        self.observers.clear();
    }

    /// Observe `(original, result)` after every completed run.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        self.observers.subscribe(observer)
    }

    /// Drop an observer. Returns whether it was subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl<T> Pipeline<T> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn config(&self) -> PipelineConfig {
        self.config
    }

    /// True only while a run is in progress.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    /// Number of registered modifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.modifiers).entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Does `owner` have anything registered here?
    #[must_use]
    pub fn has_owner(&self, owner: OwnerId) -> bool {
        lock(&self.modifiers)
            .entries
            .iter()
            .any(|e| e.modifier.owner() == owner)
    }

    /// Read-only listing of registered modifiers, in application order.
    #[must_use]
    pub fn modifiers(&self) -> Vec<ModifierInfo> {
        lock(&self.modifiers)
            .entries
            .iter()
            .map(|e| ModifierInfo::new(e.id, &e.modifier))
            .collect()
    }
}

impl<T> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("modifiers", &self.len())
            .field("processing", &self.is_processing())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Phase;
    use crate::modifiers::Condition;
    use std::sync::atomic::AtomicI32;

    const A: OwnerId = OwnerId::from_raw(1);
    const B: OwnerId = OwnerId::from_raw(2);

    #[test]
    fn test_empty_pipeline_is_identity() {
        let p = Pipeline::<i32>::new("test");
        assert_eq!(p.process(42), 42);
        assert!(p.is_empty());
        assert!(!p.is_processing());
    }

    #[test]
    fn test_phase_dominates_registration_order() {
        for reversed in [false, true] {
            let p = Pipeline::<i32>::new("test");
            let add = Modifier::addition(A, 5);
            let mul = Modifier::multiplication(B, 2.0);
            if reversed {
                p.add_modifier(mul);
                p.add_modifier(add);
            } else {
                p.add_modifier(add);
                p.add_modifier(mul);
            }
            assert_eq!(p.process(10), 30);
        }
    }

    #[test]
    fn test_priority_within_phase() {
        let p = Pipeline::<i32>::new("test");
        p.add_modifier(Modifier::override_with(A, 1).with_priority(5));
        p.add_modifier(Modifier::override_with(B, 2).with_priority(-5));

        // Lower priority runs first, so A's override wins.
        assert_eq!(p.process(0), 1);
    }

    #[test]
    fn test_registration_order_breaks_ties() {
        let p = Pipeline::<i32>::new("test");
        let id_a = p.add_modifier(Modifier::addition(A, 3)).id();
        let id_b = p.add_modifier(Modifier::addition(B, 4)).id();

        let trace = p.process_traced(0);
        assert_eq!(trace.applied_ids(), vec![id_a, id_b]);
        assert_eq!(trace.result, 7);
    }

    #[test]
    fn test_duplicate_registration_is_noop() {
        let p = Pipeline::<i32>::new("test");
        let first = p.add_modifier(Modifier::addition(A, 3));
        let second = p.add_modifier(Modifier::addition(A, 100));

        assert!(first.is_added());
        assert_eq!(second, Registration::Duplicate(first.id()));
        assert_eq!(p.len(), 1);
        assert_eq!(p.process(0), 3);
    }

    #[test]
    fn test_duplicates_allowed_by_config() {
        let p = Pipeline::<i32>::with_config("test", PipelineConfig::new().allow_duplicates());
        p.add_modifier(Modifier::addition(A, 3));
        p.add_modifier(Modifier::addition(A, 4));
        assert_eq!(p.process(0), 7);
    }

    #[test]
    fn test_condition_sees_current_value() {
        let p = Pipeline::<i32>::new("test");
        p.add_modifier(Modifier::override_with(A, 0));
        p.add_modifier(
            Modifier::addition(B, 10)
                .in_phase(Phase::PostProcess)
                .when(Condition::current(|v: &i32| *v > 0)),
        );

        assert_eq!(p.process(5), 0);
    }

    #[test]
    fn test_remove_single_modifier() {
        let p = Pipeline::<i32>::new("test");
        let id = p.add_modifier(Modifier::addition(A, 3)).id();
        p.add_modifier(Modifier::addition(B, 4));

        assert!(p.remove_modifier(id));
        assert!(!p.remove_modifier(id));
        assert_eq!(p.process(0), 4);
    }

    #[test]
    fn test_remove_for_owner() {
        let p = Pipeline::<i32>::new("test");
        p.add_modifier(Modifier::addition(A, 3));
        p.add_modifier(Modifier::multiplication(A, 2.0));
        p.add_modifier(Modifier::addition(B, 4));

        assert_eq!(p.remove_modifiers_for(A), 2);
        assert!(!p.has_owner(A));
        assert!(p.has_owner(B));
        assert_eq!(p.remove_modifiers_for(A), 0);
        assert_eq!(p.process(1), 5);
    }

    #[test]
    fn test_fault_is_skipped() {
        let p = Pipeline::<i32>::new("test");
        p.add_modifier(Modifier::addition(A, 1));
        p.add_modifier(Modifier::custom(B, "broken", Phase::Addition, |_, _| {
            Err(ModifierError::failed("broken rule"))
        }));
        p.add_modifier(Modifier::multiplication(A, 3.0));

        let trace = p.process_traced(1);
        assert_eq!(trace.result, 6);
        assert_eq!(trace.faults().count(), 1);
        assert_eq!(trace.applied().count(), 2);
    }

    #[test]
    fn test_panic_is_skipped() {
        let p = Pipeline::<i32>::new("test");
        p.add_modifier(Modifier::custom(A, "panics", Phase::PreProcess, |_, _| {
            panic!("rule exploded")
        }));
        p.add_modifier(Modifier::addition(B, 2));

        assert_eq!(p.process(1), 3);
        assert!(!p.is_processing());
    }

    #[test]
    fn test_on_applied_runs_after_all_modifiers() {
        let p = Pipeline::<i32>::new("test");
        let seen = Arc::new(AtomicI32::new(0));
        let sink = Arc::clone(&seen);

        p.add_modifier(Modifier::addition(A, 1).on_applied(move |_, result| {
            sink.store(*result, Ordering::Relaxed);
        }));
        p.add_modifier(Modifier::multiplication(B, 10.0));

        assert_eq!(p.process(1), 20);
        assert_eq!(seen.load(Ordering::Relaxed), 20);
    }

    #[test]
    fn test_on_applied_skipped_when_not_applied() {
        let p = Pipeline::<i32>::new("test");
        let hits = Arc::new(AtomicI32::new(0));
        let sink = Arc::clone(&hits);

        p.add_modifier(
            Modifier::addition(A, 1)
                .when(Condition::never())
                .on_applied(move |_, _| {
                    sink.fetch_add(1, Ordering::Relaxed);
                }),
        );

        p.process(1);
        assert_eq!(hits.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_observers_receive_original_and_result() {
        let p = Pipeline::<i32>::new("test");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let id = p.subscribe(move |o, r| sink.lock().unwrap().push((*o, *r)));
        p.add_modifier(Modifier::addition(A, 2));

        p.process(1);
        assert!(p.unsubscribe(id));
        p.process(5);

        assert_eq!(*seen.lock().unwrap(), vec![(1, 3)]);
    }

    #[test]
    fn test_clear() {
        let p = Pipeline::<i32>::new("test");
        p.add_modifier(Modifier::addition(A, 2));
        p.subscribe(|_, _| {});

        p.clear();
        assert!(p.is_empty());
        assert_eq!(p.observer_count(), 0);
        assert_eq!(p.process(1), 1);
    }

    #[test]
    fn test_reentrant_call_returns_base() {
        let p = Arc::new(Pipeline::<i32>::new("test"));
        let inner = Arc::new(AtomicI32::new(-1));
        let weak = Arc::downgrade(&p);
        let sink = Arc::clone(&inner);

        p.add_modifier(Modifier::custom(A, "recurse", Phase::Addition, move |_, current: &i32| {
            if let Some(pipeline) = weak.upgrade() {
                sink.store(pipeline.process(*current + 100), Ordering::Relaxed);
            }
            Ok(*current + 1)
        }));

        assert_eq!(p.process(1), 2);
        assert_eq!(inner.load(Ordering::Relaxed), 101);
        assert!(!p.is_processing());
    }

    #[test]
    fn test_concurrent_call_returns_base() {
        use std::sync::Barrier;
        use std::thread;

        let p = Arc::new(Pipeline::<i32>::new("test"));
        let started = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));
        let (s, r) = (Arc::clone(&started), Arc::clone(&release));

        p.add_modifier(Modifier::custom(A, "slow", Phase::Addition, move |_, current: &i32| {
            s.wait();
            r.wait();
            Ok(*current + 1)
        }));

        let worker = {
            let p = Arc::clone(&p);
            thread::spawn(move || p.process(1))
        };

        started.wait();
        assert!(p.is_processing());
        let trace = p.process_traced(5);
        assert!(trace.rejected);
        assert_eq!(trace.result, 5);
        assert!(trace.steps.is_empty());
        release.wait();

        assert_eq!(worker.join().unwrap(), 2);
        assert!(!p.is_processing());
    }

    #[test]
    fn test_registration_during_run_not_observed() {
        let p = Arc::new(Pipeline::<i32>::new("test"));
        let weak = Arc::downgrade(&p);

        p.add_modifier(Modifier::custom(A, "spawner", Phase::PreProcess, move |_, current: &i32| {
            if let Some(pipeline) = weak.upgrade() {
                pipeline.add_modifier(Modifier::addition(B, 1000));
            }
            Ok(*current)
        }));

        assert_eq!(p.process(1), 1);
        assert_eq!(p.process(1), 1001);
    }

    #[test]
    fn test_modifiers_listing_in_order() {
        let p = Pipeline::<i32>::new("test");
        p.add_modifier(Modifier::multiplication(A, 2.0));
        p.add_modifier(Modifier::addition(B, 1).with_priority(3));
        p.add_modifier(Modifier::addition(A, 1));

        let phases: Vec<_> = p.modifiers().iter().map(|m| (m.phase, m.priority)).collect();
        assert_eq!(
            phases,
            vec![
                (Phase::Addition, 0),
                (Phase::Addition, 3),
                (Phase::Multiplication, 0),
            ]
        );
    }
}
