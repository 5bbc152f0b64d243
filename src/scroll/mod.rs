//! Scroll progress observer.
//!
//! Publishes a [`ScrollState`] derived from the environment's scroll offset,
//! viewport and document height. The fraction is recomputed on every scroll
//! and resize event; the "actively scrolling" flag is raised by scroll events
//! and lowered once no scroll event arrived for the idle period.

use crate::env::{Environment, Preference, Subscription};
use crate::model::ScrollMetrics;
use crate::timer::{Scheduler, TimerHandle};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

/// Default quiet period after the last scroll event before `is_scrolling`
/// drops back to `false`.
pub const DEFAULT_SCROLL_IDLE: Duration = Duration::from_millis(150);

/// Output of the observer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    /// Fraction of vertical scroll completed, in `[0, 1]`.
    pub progress: f64,
    /// Whether a scroll event arrived within the idle period.
    pub is_scrolling: bool,
}

/// Fraction of the vertical scroll completed.
///
/// Exactly `0.0` at the top and exactly `1.0` at (or past) the maximum
/// offset, whatever the viewport height. A document that does not overflow
/// its viewport reports `0.0`, as do non-finite inputs.
pub fn scroll_fraction(metrics: &ScrollMetrics) -> f64 {
    let max = metrics.max_offset();
    if !max.is_finite() || max <= 0.0 || !metrics.offset.is_finite() {
        return 0.0;
    }
    if metrics.offset >= max {
        return 1.0;
    }
    (metrics.offset / max).clamp(0.0, 1.0)
}

#[derive(Default)]
struct IdleTimer {
    handle: Option<TimerHandle>,
}

/// Live scroll observer.
///
/// Owns its environment subscriptions and idle timer; [`detach`](Self::detach)
/// releases both and is safe to call repeatedly. Dropping detaches.
pub struct ScrollObserver {
    state: Preference<ScrollState>,
    subscriptions: Vec<Subscription>,
    idle_timer: Rc<RefCell<IdleTimer>>,
}

impl ScrollObserver {
    /// Start observing `env`.
    ///
    /// The initial state is computed immediately, with `is_scrolling` false.
    pub fn attach(env: &Environment, scheduler: &Scheduler, idle: Duration) -> Self {
        let state = Preference::new(ScrollState {
            progress: scroll_fraction(&env.scroll_metrics()),
            is_scrolling: false,
        });
        let idle_timer = Rc::new(RefCell::new(IdleTimer::default()));

        let on_scroll = {
            let env = env.clone();
            let state = state.clone();
            let scheduler = scheduler.clone();
            let idle_timer = Rc::downgrade(&idle_timer);
            move |_: &f64| {
                state.set(ScrollState {
                    progress: scroll_fraction(&env.scroll_metrics()),
                    is_scrolling: true,
                });
                let Some(idle_timer) = idle_timer.upgrade() else {
                    return;
                };
                let settle = state.clone();
                let handle = scheduler.set_timeout(idle, move || {
                    let current = settle.get();
                    settle.set(ScrollState {
                        is_scrolling: false,
                        ..current
                    });
                });
                // Replacing the handle cancels the previous idle timer.
                idle_timer.borrow_mut().handle = Some(handle);
            }
        };

        let recompute = {
            let env = env.clone();
            let state = state.clone();
            move || {
                let current = state.get();
                state.set(ScrollState {
                    progress: scroll_fraction(&env.scroll_metrics()),
                    ..current
                });
            }
        };
        let on_resize = recompute.clone();
        let on_document = recompute;

        let subscriptions = vec![
            env.scroll_offset.subscribe(on_scroll),
            env.viewport.subscribe(move |_| on_resize()),
            env.document_height.subscribe(move |_| on_document()),
        ];

        debug!(initial = ?state.get(), "scroll observer attached");
        Self {
            state,
            subscriptions,
            idle_timer,
        }
    }

    /// Start observing with the default idle period.
    pub fn attach_default(env: &Environment, scheduler: &Scheduler) -> Self {
        Self::attach(env, scheduler, DEFAULT_SCROLL_IDLE)
    }

    /// Current state.
    pub fn state(&self) -> ScrollState {
        self.state.get()
    }

    /// Observable state, for consumers that react to changes.
    pub fn signal(&self) -> &Preference<ScrollState> {
        &self.state
    }

    /// Whether the observer still holds its environment registrations.
    pub fn is_attached(&self) -> bool {
        self.subscriptions.iter().any(Subscription::is_active)
    }

    /// Deregister every listener and cancel the idle timer.
    pub fn detach(&mut self) {
        if !self.is_attached() {
            return;
        }
        for subscription in &mut self.subscriptions {
            subscription.unsubscribe();
        }
        if let Some(mut handle) = self.idle_timer.borrow_mut().handle.take() {
            handle.cancel();
        }
        debug!("scroll observer detached");
    }
}

impl Drop for ScrollObserver {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for ScrollObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollObserver")
            .field("state", &self.state())
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[cfg(test)]
#[path = "scroll_tests.rs"]
mod tests;
