//! Signal Implementation
//!
//! A Signal is the fundamental reactive primitive. It holds a value and an
//! ordered list of subscribers.
//!
//! # How Signals Work
//!
//! 1. When a signal is read while a tracked run is in progress, the
//!    signal appends the tracked subscriber to its list. Nothing is
//!    deduplicated: reading the same signal twice registers twice.
//!
//! 2. When a signal is written through `set` or `update`, every subscriber
//!    is invoked synchronously, in registration order. There is no equality
//!    check; writing the same value notifies again.
//!
//! 3. Subscribers are never removed.
//!
//! # Memory Layout
//!
//! Each signal consists of:
//! - A unique ID (8 bytes)
//! - The value, behind a `RefCell`
//! - The subscriber list (inline up to four entries, then spilled)

use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

use super::context::TrackingScope;
use super::runtime::with_runtime;
use super::subscriber::{Subscriber, SubscriberId};

/// Counter for generating unique signal IDs.
static SIGNAL_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique signal ID.
fn next_signal_id() -> u64 {
    SIGNAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

struct SignalInner<T> {
    id: u64,
    value: RefCell<T>,
    /// Append-only, duplicates allowed.
    subscribers: RefCell<SmallVec<[Subscriber; 4]>>,
}

/// Anything a tracked read can be performed on.
pub trait Readable<T> {
    /// Read the value, registering the tracked subscriber if there is one.
    fn get(&self) -> T;

    /// Read the value without registering anything.
    fn get_untracked(&self) -> T;

    /// Append a subscriber to the notification list.
    fn subscribe_with(&self, subscriber: Subscriber);
}

/// Tracked read of any readable signal.
pub fn get<T, R>(readable: &R) -> T
where
    R: Readable<T> + ?Sized,
{
    readable.get()
}

/// Create a new signal.
pub fn signal<T>(value: T) -> Signal<T>
where
    T: Clone + 'static,
{
    Signal::new(value)
}

/// A mutable reactive cell holding a value of type T.
///
/// Cloning a signal produces another handle to the same cell.
///
/// # Example
///
/// ```rust,ignore
/// let count = Signal::new(0);
///
/// // Read the value
/// let value = count.get();
///
/// // Write the value (notifies subscribers)
/// count.set(5);
/// ```
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T> Signal<T>
where
    T: Clone + 'static,
{
    /// Create a new signal with the given initial value.
    pub fn new(value: T) -> Self {
        with_runtime(|rt| rt.record_signal());

        Self {
            inner: Rc::new(SignalInner {
                id: next_signal_id(),
                value: RefCell::new(value),
                subscribers: RefCell::new(SmallVec::new()),
            }),
        }
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Get the current value.
    ///
    /// If a tracked run is in progress, its subscriber is appended to this
    /// signal's list first.
    pub fn get(&self) -> T {
        if let Some(subscriber) = TrackingScope::current() {
            tracing::trace!(signal = self.inner.id, subscriber = %subscriber.id(), "dependency tracked");
            self.inner.subscribers.borrow_mut().push(subscriber);
        }

        self.get_untracked()
    }

    /// Get the current value without tracking dependencies.
    pub fn get_untracked(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Set a new value and notify subscribers.
    pub fn set(&self, value: T) {
        let previous = self.inner.value.replace(value);
        drop(previous);

        self.notify_subscribers();
    }

    /// Replace the value without notifying anyone.
    ///
    /// Subscribers keep whatever they last observed until the next `set`.
    pub fn set_untracked(&self, value: T) {
        let previous = self.inner.value.replace(value);
        drop(previous);
    }

    /// Update the value using a function.
    ///
    /// The current value is read untracked, and the result is written with
    /// a single `set`.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let current = self.get_untracked();
        self.set(f(&current));
    }

    /// Register a callback invoked on every `set`/`update`.
    ///
    /// Returns the ID of the new registration. There is no way to remove it.
    pub fn subscribe<F>(&self, notify: F) -> SubscriberId
    where
        F: Fn() + 'static,
    {
        let subscriber = Subscriber::new(notify);
        let id = subscriber.id();
        self.subscribe_with(subscriber);
        id
    }

    /// Append an existing subscriber to this signal's list.
    pub fn subscribe_with(&self, subscriber: Subscriber) {
        self.inner.subscribers.borrow_mut().push(subscriber);
    }

    /// Get the number of entries on the subscriber list, duplicates included.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// A handle to this signal that cannot write.
    pub fn read_only(&self) -> ReadSignal<T> {
        ReadSignal {
            signal: self.clone(),
        }
    }

    /// Invoke every subscriber in registration order.
    ///
    /// Entries appended while the wave is running are not part of it. No
    /// borrow is held while a subscriber runs.
    fn notify_subscribers(&self) {
        let count = self.subscriber_count();
        tracing::trace!(signal = self.inner.id, subscribers = count, "notify");
        with_runtime(|rt| rt.record_notifications(count));

        for index in 0..count {
            let subscriber = self.inner.subscribers.borrow()[index].clone();
            subscriber.notify();
        }
    }
}

impl<T> Readable<T> for Signal<T>
where
    T: Clone + 'static,
{
    fn get(&self) -> T {
        Signal::get(self)
    }

    fn get_untracked(&self) -> T {
        Signal::get_untracked(self)
    }

    fn subscribe_with(&self, subscriber: Subscriber) {
        Signal::subscribe_with(self, subscriber)
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Signal<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.borrow())
            .field("subscriber_count", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

/// A read-only view of a signal.
///
/// This is what `derived` hands out: the value can be read and subscribed
/// to, but only the owner of the underlying [`Signal`] can write it.
pub struct ReadSignal<T> {
    signal: Signal<T>,
}

impl<T> ReadSignal<T>
where
    T: Clone + 'static,
{
    pub fn id(&self) -> u64 {
        self.signal.id()
    }

    /// Tracked read. See [`Signal::get`].
    pub fn get(&self) -> T {
        self.signal.get()
    }

    pub fn get_untracked(&self) -> T {
        self.signal.get_untracked()
    }

    /// See [`Signal::subscribe`].
    pub fn subscribe<F>(&self, notify: F) -> SubscriberId
    where
        F: Fn() + 'static,
    {
        self.signal.subscribe(notify)
    }

    pub fn subscriber_count(&self) -> usize {
        self.signal.subscriber_count()
    }
}

impl<T> Readable<T> for ReadSignal<T>
where
    T: Clone + 'static,
{
    fn get(&self) -> T {
        self.signal.get()
    }

    fn get_untracked(&self) -> T {
        self.signal.get_untracked()
    }

    fn subscribe_with(&self, subscriber: Subscriber) {
        self.signal.subscribe_with(subscriber)
    }
}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        Self {
            signal: self.signal.clone(),
        }
    }
}

impl<T> Debug for ReadSignal<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadSignal").field(&self.signal).finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
