//! Observers notified with `(original, result)` after every run.

use std::sync::{Arc, Mutex};

use tracing::error;

use crate::core::SubscriptionId;

use super::{isolate, lock};

type ObserverFn<T> = dyn Fn(&T, &T) + Send + Sync;

struct ObserverList<T> {
    entries: Vec<(SubscriptionId, Arc<ObserverFn<T>>)>,
    next_id: u64,
}

/// Subscriber list owned by a pipeline.
pub(crate) struct Observers<T> {
    inner: Mutex<ObserverList<T>>,
}

impl<T> Observers<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(ObserverList {
                entries: Vec::new(),
                next_id: 0,
            }),
        }
    }

    pub(crate) fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        let mut list = lock(&self.inner);
        let id = SubscriptionId::new(list.next_id);
        list.next_id += 1;
        list.entries.push((id, Arc::new(observer)));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut list = lock(&self.inner);
        let before = list.entries.len();
        list.entries.retain(|(sid, _)| *sid != id);
        list.entries.len() != before
    }

    pub(crate) fn clear(&self) {
        lock(&self.inner).entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.inner).entries.len()
    }

    /// Notify every observer. The list is copied first so observers may
    /// subscribe or unsubscribe from inside the callback.
    pub(crate) fn broadcast(&self, pipeline: &str, original: &T, result: &T, catch_panics: bool) {
        let observers: Vec<_> = lock(&self.inner)
            .entries
            .iter()
            .map(|(id, f)| (*id, Arc::clone(f)))
            .collect();

        for (id, observer) in observers {
            let outcome = isolate(catch_panics, || {
                observer(original, result);
                Ok(())
            });
            if let Err(error) = outcome {
                error!(
                    target: "modifiers::pipeline",
                    pipeline,
                    subscription = %id,
                    error = %error,
                    "Observer failed"
                );
            }
        }
    }
}
