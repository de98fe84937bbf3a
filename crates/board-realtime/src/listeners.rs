//! Callback registries with handle-based removal.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

/// A set of callbacks invoked with every emitted value.
///
/// Callbacks run outside the registry lock, so a callback may register or
/// drop subscriptions.
pub struct Listeners<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T> Clone for Listeners<T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<T: 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Listeners<T> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register `callback` until the returned [`Subscription`] is dropped
    /// or unsubscribed.
    pub fn add<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, Arc::new(callback)));
            id
        };

        let registry: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.lock().entries.retain(|(entry, _)| *entry != id);
            }
        })
    }

    pub fn emit(&self, value: &T) {
        let callbacks: Vec<Callback<T>> = self
            .registry
            .lock()
            .entries
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();

        for callback in callbacks {
            callback(value);
        }
    }

    pub fn len(&self) -> usize {
        self.registry.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps a listener registered. Dropping it unregisters the listener.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_reaches_every_listener() {
        let listeners = Listeners::<u32>::new();
        let total = Arc::new(AtomicUsize::new(0));

        let first = {
            let total = total.clone();
            listeners.add(move |v| {
                total.fetch_add(*v as usize, Ordering::SeqCst);
            })
        };
        let second = {
            let total = total.clone();
            listeners.add(move |v| {
                total.fetch_add(*v as usize, Ordering::SeqCst);
            })
        };

        listeners.emit(&5);
        assert_eq!(total.load(Ordering::SeqCst), 10);
        assert_eq!(listeners.len(), 2);

        drop(first);
        second.unsubscribe();
        assert!(listeners.is_empty());

        listeners.emit(&5);
        assert_eq!(total.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_callback_may_modify_registry() {
        let listeners = Listeners::<()>::new();
        let inner = listeners.clone();
        let added = Arc::new(Mutex::new(Vec::new()));

        let _subscription = {
            let added = added.clone();
            listeners.add(move |_| {
                added.lock().push(inner.add(|_| {}));
            })
        };

        listeners.emit(&());
        assert_eq!(listeners.len(), 2);
    }

    #[test]
    fn test_subscription_outliving_registry_is_harmless() {
        let listeners = Listeners::<u8>::new();
        let subscription = listeners.add(|_| {});
        drop(listeners);
        subscription.unsubscribe();
    }
}
