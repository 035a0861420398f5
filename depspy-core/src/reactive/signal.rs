//! Signal Implementation
//!
//! A Signal holds a value and notifies its subscribers whenever the value
//! is replaced. The session publishes its tree version through one, so a
//! renderer knows when to redraw without polling the tree.
//!
//! # Thread Safety
//!
//! The value and the subscriber registry sit behind `parking_lot` locks.
//! Callbacks run with neither lock held: a callback may read the signal,
//! subscribe or unsubscribe (itself included). A change made while a
//! notification is running takes effect from the next notification.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

type Notify = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`Signal::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A reactive value of type T.
///
/// Clones share the same value and subscribers.
pub struct Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    value: Arc<RwLock<T>>,

    /// Notification callbacks keyed by subscriber.
    notifiers: Arc<RwLock<Vec<(SubscriberId, Notify)>>>,
}

impl<T> Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new signal with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: Arc::new(RwLock::new(value)),
            notifiers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Set a new value and notify subscribers.
    pub fn set(&self, value: T) {
        *self.value.write() = value;
        self.notify();
    }

    /// Update the value using a function of the current one.
    ///
    /// The read and the write happen under one lock.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        {
            let mut guard = self.value.write();
            let next = f(&*guard);
            *guard = next;
        }
        self.notify();
    }

    /// Like [`update`](Self::update), but leaves notifying to the caller.
    ///
    /// Used when the change must be announced only after some outer lock
    /// is released.
    pub fn update_silently<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let mut guard = self.value.write();
        let next = f(&*guard);
        *guard = next;
    }

    /// Register a callback invoked after every change.
    pub fn subscribe<F>(&self, notify: F) -> SubscriberId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = SubscriberId::next();
        self.notifiers.write().push((id, Arc::new(notify)));
        id
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&self, subscriber_id: SubscriberId) -> bool {
        let mut notifiers = self.notifiers.write();
        let before = notifiers.len();
        notifiers.retain(|(id, _)| *id != subscriber_id);
        notifiers.len() != before
    }

    /// Run every registered callback once.
    pub fn notify(&self) {
        let snapshot: Vec<Notify> = self
            .notifiers
            .read()
            .iter()
            .map(|(_, notify)| Arc::clone(notify))
            .collect();
        for notify in snapshot {
            notify();
        }
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.notifiers.read().len()
    }
}

impl<T> Clone for Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            notifiers: Arc::clone(&self.notifiers),
        }
    }
}

impl<T> Default for Signal<T>
where
    T: Clone + Send + Sync + Default + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Debug for Signal<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("value", &self.get())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
