//! Live, subscribable environment signal.
//!
//! A [`Preference<T>`] holds the current value of something the environment
//! owns (a media query, the viewport size, the scroll offset) and notifies
//! subscribers when it changes. Cloning a `Preference` yields another handle to
//! the same signal.
//!
//! Listeners are held weakly by the signal and strongly by the returned
//! [`Subscription`], so dropping or unsubscribing the guard is all it takes to
//! deregister. Notification runs with no borrow held, which lets a listener
//! read the signal it is subscribed to.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Listener<T> = Rc<dyn Fn(&T)>;

struct PreferenceInner<T> {
    value: T,
    listeners: Vec<Weak<dyn Fn(&T)>>,
}

/// Shared signal with change notification.
///
/// # Invariants
///
/// 1. `set(v)` with `v == current` notifies nobody.
/// 2. Listeners run in registration order.
/// 3. A listener whose [`Subscription`] was dropped or unsubscribed is never
///    called again.
pub struct Preference<T> {
    inner: Rc<RefCell<PreferenceInner<T>>>,
}

impl<T> Clone for Preference<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Preference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Preference")
            .field("value", &inner.value)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Preference<T> {
    /// Create a signal holding `value` with no listeners.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PreferenceInner {
                value,
                listeners: Vec::new(),
            })),
        }
    }

    /// Current value.
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Replace the value, notifying listeners if it changed.
    ///
    /// Returns whether the value changed.
    pub fn set(&self, value: T) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return false;
            }
            inner.value = value;
        }
        self.notify();
        true
    }

    /// Register a change listener.
    ///
    /// The listener is called with the new value after every change until the
    /// returned [`Subscription`] is unsubscribed or dropped.
    #[must_use = "dropping the Subscription immediately unsubscribes"]
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let strong: Listener<T> = Rc::new(listener);
        self.inner.borrow_mut().listeners.push(Rc::downgrade(&strong));
        Subscription {
            guard: Some(Box::new(strong)),
        }
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.inner
            .borrow()
            .listeners
            .iter()
            .filter(|listener| listener.strong_count() > 0)
            .count()
    }

    fn notify(&self) {
        let (listeners, value) = {
            let mut inner = self.inner.borrow_mut();
            inner.listeners.retain(|listener| listener.strong_count() > 0);
            let live: Vec<Listener<T>> =
                inner.listeners.iter().filter_map(Weak::upgrade).collect();
            (live, inner.value.clone())
        };
        for listener in &listeners {
            listener(&value);
        }
    }
}

/// Registration guard returned by [`Preference::subscribe`].
///
/// Unsubscribing is idempotent and also happens on drop.
pub struct Subscription {
    guard: Option<Box<dyn Any>>,
}

impl Subscription {
    /// A subscription that is not attached to anything.
    pub fn detached() -> Self {
        Self { guard: None }
    }

    /// Deregister the listener. Safe to call any number of times.
    pub fn unsubscribe(&mut self) {
        self.guard = None;
    }

    /// Whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.guard.is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
