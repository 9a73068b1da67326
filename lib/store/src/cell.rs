//! Reactive persisted cell — one repository entry as an observable value.
//!
//! An explicit observer list, no reactivity magic. Setters persist first and
//! publish second, so the cell only ever reflects a value that has
//! successfully entered the store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::warn;

use crate::codec::ObjectCodec;
use crate::error::PersistError;
use crate::schema::Document;

/// Callback type for cell change notifications.
pub type Subscriber<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Unique handle for a subscription, returned by [`PersistedCell::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A single document entry wrapped as an observable cell. Every mutation is
/// a synchronous, immediate store write — no debouncing, no batching.
pub struct PersistedCell<T: Document> {
    codec: ObjectCodec,
    key: String,
    value: RwLock<T>,
    subscribers: RwLock<Vec<(SubscriptionId, Subscriber<T>)>>,
    next_id: AtomicU64,
}

impl<T: Document> PersistedCell<T> {
    /// Initialize from the store. Any failure — unreadable bytes or a schema
    /// rejection — falls back to `initial`, so construction never fails.
    pub fn new(codec: ObjectCodec, key: impl Into<String>, initial: T) -> Self {
        let key = key.into();
        let value = match codec.load_validated::<T>(&key) {
            Ok(Some(value)) => value,
            Ok(None) => initial,
            Err(e) => {
                warn!("stored value at '{}' rejected, starting from initial: {}", key, e);
                initial
            }
        };
        Self {
            codec,
            key,
            value: RwLock::new(value),
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Clone of the current value.
    pub fn get(&self) -> T {
        self.value.read().unwrap().clone()
    }

    /// Register a change handler. It is invoked immediately with the current
    /// value, then on every successful `set`/`update`.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handler: Subscriber<T> = Arc::new(handler);
        {
            let current = self.value.read().unwrap();
            handler(&current);
        }
        self.subscribers.write().unwrap().push((id, handler));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.write().unwrap().retain(|(sid, _)| *sid != id);
    }

    /// Validate-and-save, then publish. A rejected value propagates and the
    /// cell keeps its previous state.
    pub fn set(&self, value: T) -> Result<(), PersistError> {
        self.codec.save_validated(&self.key, Some(&value))?;
        self.publish(value);
        Ok(())
    }

    /// Derive the next value from the current one, then follow the same
    /// save-then-publish ordering as `set`.
    pub fn update<F>(&self, f: F) -> Result<(), PersistError>
    where
        F: FnOnce(&T) -> T,
    {
        let next = {
            let current = self.value.read().unwrap();
            f(&current)
        };
        self.set(next)
    }

    fn publish(&self, value: T) {
        *self.value.write().unwrap() = value.clone();
        // Handlers run outside the lock.
        let subscribers: Vec<Subscriber<T>> = self
            .subscribers
            .read()
            .unwrap()
            .iter()
            .map(|(_, s)| Arc::clone(s))
            .collect();
        for subscriber in subscribers {
            subscriber(&value);
        }
    }
}
