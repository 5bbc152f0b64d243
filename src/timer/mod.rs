//! Single-threaded cooperative timer queue.
//!
//! [`Scheduler`] keeps an explicit clock and a queue of one-shot callbacks
//! ordered by `(deadline, scheduling order)`. Time only moves when the host
//! calls [`Scheduler::advance`]: tests advance virtual time in exact steps,
//! the terminal preview advances by measured wall-clock time.
//!
//! # Ordering
//!
//! Due callbacks run strictly one after another, in deadline order. Before a
//! callback runs the clock is moved to its deadline and no internal borrow is
//! held, so the callback may schedule follow-up timers. A follow-up that is
//! already due within the same `advance` call runs in that call.
//!
//! # Ownership
//!
//! [`Scheduler::set_timeout`] returns a [`TimerHandle`] that is not `Clone`:
//! exactly one owner can cancel it. Cancelling is idempotent, cancelling a
//! timer that already fired is a no-op, and dropping the handle cancels.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::trace;

type Callback = Box<dyn FnOnce()>;

/// Identifier of a scheduled timer, unique per scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw sequence number.
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Default)]
struct SchedulerInner {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, TimerId), Callback>,
    deadlines: BTreeMap<TimerId, Duration>,
}

impl SchedulerInner {
    fn remove(&mut self, id: TimerId) -> Option<Callback> {
        let deadline = self.deadlines.remove(&id)?;
        self.queue.remove(&(deadline, id))
    }

    fn pop_due(&mut self, until: Duration) -> Option<(TimerId, Callback)> {
        let (&(deadline, id), _) = self.queue.first_key_value()?;
        if deadline > until {
            return None;
        }
        let callback = self.queue.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        self.now = self.now.max(deadline);
        Some((id, callback))
    }
}

/// Shared handle to a timer queue.
///
/// Cloning yields another handle to the same queue and clock.
#[derive(Clone, Default)]
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Scheduler")
            .field("now", &inner.now)
            .field("pending", &inner.queue.len())
            .finish()
    }
}

impl Scheduler {
    /// Empty scheduler with the clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock reading (time elapsed since creation, as advanced).
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of timers that are scheduled and not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.inner
            .borrow()
            .queue
            .first_key_value()
            .map(|(&(deadline, _), _)| deadline)
    }

    /// Run `callback` once, `delay` after the current clock reading.
    #[must_use = "dropping the TimerHandle cancels the timer"]
    pub fn set_timeout(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TimerHandle {
        let mut inner = self.inner.borrow_mut();
        let id = TimerId(inner.next_id);
        inner.next_id += 1;
        let deadline = inner.now + delay;
        inner.queue.insert((deadline, id), Box::new(callback));
        inner.deadlines.insert(id, deadline);
        trace!(timer = id.0, ?deadline, "timer scheduled");
        TimerHandle {
            id,
            scheduler: Rc::downgrade(&self.inner),
        }
    }

    /// Move the clock forward by `by`, running every callback that becomes
    /// due on the way.
    ///
    /// Returns the number of callbacks run.
    pub fn advance(&self, by: Duration) -> usize {
        let until = self.now() + by;
        let mut fired = 0;
        loop {
            // The borrow ends before the callback runs.
            let next = self.inner.borrow_mut().pop_due(until);
            let Some((id, callback)) = next else { break };
            trace!(timer = id.0, "timer fired");
            callback();
            fired += 1;
        }
        let mut inner = self.inner.borrow_mut();
        inner.now = inner.now.max(until);
        fired
    }

    /// Advance in milliseconds.
    pub fn advance_ms(&self, millis: u64) -> usize {
        self.advance(Duration::from_millis(millis))
    }

    /// Run timers until none is pending or `limit` elapses, whichever comes
    /// first. Returns the number of callbacks run.
    pub fn run_until_idle(&self, limit: Duration) -> usize {
        let until = self.now() + limit;
        let mut fired = 0;
        while let Some(deadline) = self.next_deadline() {
            if deadline > until {
                break;
            }
            fired += self.advance(deadline.saturating_sub(self.now()));
        }
        fired
    }
}

/// Single-owner handle to a scheduled timer.
///
/// Cancels the timer when dropped.
pub struct TimerHandle {
    id: TimerId,
    scheduler: Weak<RefCell<SchedulerInner>>,
}

impl TimerHandle {
    /// Timer identifier.
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Cancel the timer.
    ///
    /// Returns `true` if this call removed a pending timer, `false` if it had
    /// already fired, been cancelled, or the scheduler is gone.
    pub fn cancel(&mut self) -> bool {
        let Some(inner) = self.scheduler.upgrade() else {
            return false;
        };
        // A timer callback may drop its own handle while `advance` runs; the
        // queue entry is already gone by then and no borrow is outstanding.
        let callback = inner.borrow_mut().remove(self.id);
        // Dropped outside the borrow: captures may own handles of their own.
        let removed = callback.is_some();
        drop(callback);
        if removed {
            trace!(timer = self.id.0, "timer cancelled");
        }
        self.scheduler = Weak::new();
        removed
    }

    /// Whether the timer is still waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.scheduler
            .upgrade()
            .is_some_and(|inner| inner.borrow().deadlines.contains_key(&self.id))
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, impl Fn() -> Box<dyn FnOnce()>) {
        let count = Rc::new(Cell::new(0));
        let count_clone = Rc::clone(&count);
        let make = move || {
            let c = Rc::clone(&count_clone);
            Box::new(move || c.set(c.get() + 1)) as Box<dyn FnOnce()>
        };
        (count, make)
    }

    #[test]
    fn timer_fires_at_deadline_not_before() {
        let scheduler = Scheduler::new();
        let (count, make) = counter();
        let _handle = scheduler.set_timeout(Duration::from_millis(50), make());

        scheduler.advance_ms(49);
        assert_eq!(count.get(), 0);
        scheduler.advance_ms(1);
        assert_eq!(count.get(), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn clock_moves_to_target() {
        let scheduler = Scheduler::new();
        scheduler.advance_ms(120);
        assert_eq!(scheduler.now(), Duration::from_millis(120));
    }

    #[test]
    fn callbacks_run_in_deadline_order() {
        let scheduler = Scheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let late = Rc::clone(&order);
        let early = Rc::clone(&order);
        let _b = scheduler.set_timeout(Duration::from_millis(30), move || late.borrow_mut().push(30));
        let _a = scheduler.set_timeout(Duration::from_millis(10), move || early.borrow_mut().push(10));

        scheduler.advance_ms(100);
        assert_eq!(*order.borrow(), vec![10, 30]);
    }

    #[test]
    fn ties_run_in_scheduling_order() {
        let scheduler = Scheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&order);
        let second = Rc::clone(&order);
        let _a = scheduler.set_timeout(Duration::from_millis(10), move || first.borrow_mut().push(1));
        let _b = scheduler.set_timeout(Duration::from_millis(10), move || second.borrow_mut().push(2));

        scheduler.advance_ms(10);
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[test]
    fn callback_sees_its_deadline_as_now() {
        let scheduler = Scheduler::new();
        let seen = Rc::new(Cell::new(Duration::ZERO));
        let seen_clone = Rc::clone(&seen);
        let clock = scheduler.clone();
        let _h = scheduler.set_timeout(Duration::from_millis(40), move || seen_clone.set(clock.now()));

        scheduler.advance_ms(100);
        assert_eq!(seen.get(), Duration::from_millis(40));
    }

    #[test]
    fn callback_can_schedule_follow_up_within_same_advance() {
        let scheduler = Scheduler::new();
        let slot: Rc<RefCell<Option<TimerHandle>>> = Rc::new(RefCell::new(None));
        let fired = Rc::new(Cell::new(0));

        let inner_fired = Rc::clone(&fired);
        let inner_slot = Rc::clone(&slot);
        let clock = scheduler.clone();
        let first = scheduler.set_timeout(Duration::from_millis(10), move || {
            inner_fired.set(inner_fired.get() + 1);
            let again = Rc::clone(&inner_fired);
            let follow_up = clock.set_timeout(Duration::from_millis(10), move || again.set(again.get() + 1));
            *inner_slot.borrow_mut() = Some(follow_up);
        });

        assert_eq!(scheduler.advance_ms(25), 2);
        assert_eq!(fired.get(), 2);
        drop(first);
    }

    #[test]
    fn cancel_prevents_firing_and_is_idempotent() {
        let scheduler = Scheduler::new();
        let (count, make) = counter();
        let mut handle = scheduler.set_timeout(Duration::from_millis(10), make());

        assert!(handle.is_pending());
        assert!(handle.cancel());
        assert!(!handle.cancel());
        assert!(!handle.is_pending());

        scheduler.advance_ms(100);
        assert_eq!(count.get(), 0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn cancel_after_fire_is_noop() {
        let scheduler = Scheduler::new();
        let (count, make) = counter();
        let mut handle = scheduler.set_timeout(Duration::from_millis(10), make());
        scheduler.advance_ms(10);

        assert!(!handle.cancel());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn dropping_handle_cancels() {
        let scheduler = Scheduler::new();
        let (count, make) = counter();
        let handle = scheduler.set_timeout(Duration::from_millis(10), make());
        drop(handle);

        scheduler.advance_ms(100);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn handle_outliving_scheduler_is_harmless() {
        let scheduler = Scheduler::new();
        let mut handle = scheduler.set_timeout(Duration::from_millis(10), || {});
        drop(scheduler);
        assert!(!handle.cancel());
    }

    #[test]
    fn run_until_idle_stops_at_limit() {
        let scheduler = Scheduler::new();
        let (count, make) = counter();
        let _a = scheduler.set_timeout(Duration::from_millis(10), make());
        let _b = scheduler.set_timeout(Duration::from_millis(500), make());

        assert_eq!(scheduler.run_until_idle(Duration::from_millis(100)), 1);
        assert_eq!(count.get(), 1);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn next_deadline_reports_earliest() {
        let scheduler = Scheduler::new();
        assert_eq!(scheduler.next_deadline(), None);
        let _a = scheduler.set_timeout(Duration::from_millis(30), || {});
        let _b = scheduler.set_timeout(Duration::from_millis(20), || {});
        assert_eq!(scheduler.next_deadline(), Some(Duration::from_millis(20)));
    }
}
