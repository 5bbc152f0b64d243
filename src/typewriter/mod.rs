//! Typewriter engine: character-by-character text reveal.
//!
//! # State machine
//!
//! `Idle -> Revealing -> Complete`, restarted for every new source text.
//!
//! - A new text starts a reveal cycle. With reduced motion active the cycle
//!   jumps straight to `Complete` (full text, completion fired synchronously);
//!   otherwise it enters `Revealing` with nothing revealed.
//! - Each tick, one `cadence` after the previous one, reveals exactly one more
//!   character. The tick that reveals the last character completes the cycle.
//! - Reduced motion turning on mid-reveal cancels the pending tick and forces
//!   `Complete`.
//!
//! Completion fires at most once per cycle. The engine owns at most one
//! [`TimerHandle`]; it is replaced on every tick and dropped (cancelled) on
//! text change, cadence change, reduced-motion completion and unmount, so a
//! tick from an earlier cycle can never touch a later one.

use crate::env::{Preference, Subscription};
use crate::model::Cadence;
use crate::timer::{Scheduler, TimerHandle};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

/// Completion notification, invoked at most once per reveal cycle.
pub type CompletionCallback = Box<dyn FnMut()>;

/// Lifecycle phase of a reveal cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No cycle started yet.
    #[default]
    Idle,
    /// Characters are being revealed on a timer.
    Revealing,
    /// The whole text is visible.
    Complete,
}

/// Observable engine state.
///
/// # Invariants
///
/// - `revealed_len <= source_text.chars().count()`
/// - `is_complete()` iff the whole text is revealed or reduced motion is
///   active for the current text (once a cycle has started)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypewriterState {
    /// Text being revealed.
    pub source_text: String,
    /// Number of characters revealed.
    pub revealed_len: usize,
    /// Current phase.
    pub phase: Phase,
    /// Reduced-motion preference as last seen by the engine.
    pub reduced_motion: bool,
}

impl TypewriterState {
    /// Revealed prefix of the source text.
    pub fn revealed(&self) -> &str {
        char_prefix(&self.source_text, self.revealed_len)
    }

    /// Whether the cycle is still revealing.
    pub fn is_revealing(&self) -> bool {
        self.phase == Phase::Revealing
    }

    /// Whether the cycle is complete.
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Whether a caret should be drawn after the revealed text.
    pub fn show_caret(&self) -> bool {
        !self.is_complete() && !self.reduced_motion
    }
}

/// Longest prefix of `text` holding at most `chars` characters.
fn char_prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Inputs of a typewriter instance.
pub struct TypewriterProps {
    /// Text to reveal.
    pub text: String,
    /// Delay per revealed character.
    pub cadence: Cadence,
    /// Completion notification.
    pub on_complete: Option<CompletionCallback>,
}

impl TypewriterProps {
    /// Props for `text` with the default cadence and no callback.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cadence: Cadence::default(),
            on_complete: None,
        }
    }

    /// Override the cadence.
    pub fn with_cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    /// Attach a completion callback.
    pub fn on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for TypewriterProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypewriterProps")
            .field("text", &self.text)
            .field("cadence", &self.cadence)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Whether the caller must fire the completion callback.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notify {
    Yes,
    No,
}

struct Engine {
    this: Weak<RefCell<Engine>>,
    scheduler: Scheduler,
    state: TypewriterState,
    char_count: usize,
    cadence: Cadence,
    timer: Option<TimerHandle>,
    cycle: u64,
    notified: bool,
    mounted: bool,
    on_complete: Option<CompletionCallback>,
    pending_notifications: u32,
    delivering: bool,
}

impl Engine {
    fn start_cycle(&mut self, text: String) -> Notify {
        self.cancel_timer();
        self.cycle += 1;
        self.notified = false;
        self.char_count = text.chars().count();
        self.state.source_text = text;
        self.state.revealed_len = 0;

        if self.state.reduced_motion {
            debug!(cycle = self.cycle, "reduced motion: revealing whole text at once");
            return self.complete();
        }
        if self.char_count == 0 {
            return self.complete();
        }
        debug!(cycle = self.cycle, chars = self.char_count, cadence = %self.cadence, "reveal started");
        self.state.phase = Phase::Revealing;
        self.schedule_tick();
        Notify::No
    }

    fn tick(&mut self, cycle: u64) -> Notify {
        if !self.mounted || cycle != self.cycle || self.state.phase != Phase::Revealing {
            return Notify::No;
        }
        // The handle belongs to the timer that is firing right now.
        self.timer = None;
        self.state.revealed_len += 1;
        trace!(cycle, revealed = self.state.revealed_len, "reveal tick");
        if self.state.revealed_len >= self.char_count {
            return self.complete();
        }
        self.schedule_tick();
        Notify::No
    }

    fn set_reduced_motion(&mut self, active: bool) -> Notify {
        self.state.reduced_motion = active;
        if active && self.state.phase == Phase::Revealing {
            debug!(cycle = self.cycle, "reduced motion enabled mid-reveal");
            return self.complete();
        }
        Notify::No
    }

    fn set_cadence(&mut self, cadence: Cadence) {
        if cadence == self.cadence {
            return;
        }
        self.cadence = cadence;
        if self.state.phase == Phase::Revealing {
            self.cancel_timer();
            self.schedule_tick();
        }
    }

    fn complete(&mut self) -> Notify {
        self.cancel_timer();
        self.state.revealed_len = self.char_count;
        self.state.phase = Phase::Complete;
        if self.notified {
            return Notify::No;
        }
        self.notified = true;
        debug!(cycle = self.cycle, "reveal complete");
        Notify::Yes
    }

    fn schedule_tick(&mut self) {
        let this = self.this.clone();
        let cycle = self.cycle;
        let handle = self.scheduler.set_timeout(self.cadence.as_duration(), move || {
            if let Some(engine) = this.upgrade() {
                let notify = engine.borrow_mut().tick(cycle);
                fire_completion(&engine, notify);
            }
        });
        self.timer = Some(handle);
    }

    fn cancel_timer(&mut self) {
        if let Some(mut handle) = self.timer.take() {
            handle.cancel();
        }
    }
}

/// Run the completion callback without holding the engine borrow, so the
/// callback may drive the typewriter (for instance by setting the next text).
///
/// A cycle that completes while the callback is running is queued and
/// delivered once the running call returns.
fn fire_completion(engine: &Rc<RefCell<Engine>>, notify: Notify) {
    {
        let mut engine = engine.borrow_mut();
        if notify == Notify::Yes {
            engine.pending_notifications += 1;
        }
        if engine.delivering || engine.pending_notifications == 0 {
            return;
        }
        engine.delivering = true;
    }
    loop {
        let callback = {
            let mut engine = engine.borrow_mut();
            if engine.pending_notifications == 0 {
                engine.delivering = false;
                return;
            }
            engine.pending_notifications -= 1;
            engine.on_complete.take()
        };
        let Some(mut callback) = callback else {
            continue;
        };
        callback();
        let mut engine = engine.borrow_mut();
        // Keep a callback installed from inside the one that just ran.
        if engine.on_complete.is_none() {
            engine.on_complete = Some(callback);
        }
    }
}

/// A mounted typewriter instance.
///
/// Owns its reveal timer and its reduced-motion subscription exclusively.
/// [`unmount`](Self::unmount) releases both; it is idempotent and also runs on
/// drop.
pub struct Typewriter {
    engine: Rc<RefCell<Engine>>,
    subscription: Subscription,
}

impl Typewriter {
    /// Mount with `props`, starting the first reveal cycle immediately.
    ///
    /// With reduced motion active, the text is complete (and the callback has
    /// run) by the time this returns.
    pub fn mount(props: TypewriterProps, reduced_motion: &Preference<bool>, scheduler: &Scheduler) -> Self {
        let TypewriterProps {
            text,
            cadence,
            on_complete,
        } = props;
        let engine = Rc::new_cyclic(|this| {
            RefCell::new(Engine {
                this: this.clone(),
                scheduler: scheduler.clone(),
                state: TypewriterState {
                    reduced_motion: reduced_motion.get(),
                    ..TypewriterState::default()
                },
                char_count: 0,
                cadence,
                timer: None,
                cycle: 0,
                notified: false,
                mounted: true,
                on_complete,
                pending_notifications: 0,
                delivering: false,
            })
        });

        let weak = Rc::downgrade(&engine);
        let subscription = reduced_motion.subscribe(move |active: &bool| {
            if let Some(engine) = weak.upgrade() {
                let notify = engine.borrow_mut().set_reduced_motion(*active);
                fire_completion(&engine, notify);
            }
        });

        let notify = engine.borrow_mut().start_cycle(text);
        fire_completion(&engine, notify);

        Self {
            engine,
            subscription,
        }
    }

    /// Replace the source text. A different text restarts the reveal from
    /// zero; the same text is ignored.
    pub fn set_text(&self, text: impl Into<String>) {
        let text = text.into();
        let notify = {
            let mut engine = self.engine.borrow_mut();
            if !engine.mounted
                || (engine.state.phase != Phase::Idle && engine.state.source_text == text)
            {
                return;
            }
            engine.start_cycle(text)
        };
        fire_completion(&self.engine, notify);
    }

    /// Change the cadence. A pending tick is rescheduled from now with the
    /// new delay.
    pub fn set_cadence(&self, cadence: Cadence) {
        let mut engine = self.engine.borrow_mut();
        if engine.mounted {
            engine.set_cadence(cadence);
        }
    }

    /// Replace the completion callback without restarting the cycle.
    pub fn set_on_complete(&self, callback: Option<CompletionCallback>) {
        self.engine.borrow_mut().on_complete = callback;
    }

    /// Revealed prefix.
    pub fn revealed(&self) -> String {
        self.engine.borrow().state.revealed().to_string()
    }

    /// Number of characters revealed.
    pub fn revealed_len(&self) -> usize {
        self.engine.borrow().state.revealed_len
    }

    /// Current source text.
    pub fn text(&self) -> String {
        self.engine.borrow().state.source_text.clone()
    }

    /// Current cadence.
    pub fn cadence(&self) -> Cadence {
        self.engine.borrow().cadence
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.engine.borrow().state.phase
    }

    /// Whether characters are still being revealed.
    pub fn is_revealing(&self) -> bool {
        self.engine.borrow().state.is_revealing()
    }

    /// Whether the current cycle is complete.
    pub fn is_complete(&self) -> bool {
        self.engine.borrow().state.is_complete()
    }

    /// Whether a caret should be drawn.
    pub fn show_caret(&self) -> bool {
        self.engine.borrow().state.show_caret()
    }

    /// Snapshot of the engine state.
    pub fn state(&self) -> TypewriterState {
        self.engine.borrow().state.clone()
    }

    /// Whether the instance is still mounted.
    pub fn is_mounted(&self) -> bool {
        self.engine.borrow().mounted
    }

    /// Tear down: cancel the pending tick and drop the reduced-motion
    /// subscription. The last state stays readable.
    pub fn unmount(&mut self) {
        self.subscription.unsubscribe();
        let mut engine = self.engine.borrow_mut();
        if engine.mounted {
            debug!(cycle = engine.cycle, "typewriter unmounted");
        }
        engine.mounted = false;
        engine.cancel_timer();
    }
}

impl Drop for Typewriter {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl fmt::Debug for Typewriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let engine = self.engine.borrow();
        f.debug_struct("Typewriter")
            .field("state", &engine.state)
            .field("cadence", &engine.cadence)
            .field("mounted", &engine.mounted)
            .finish()
    }
}

#[cfg(test)]
#[path = "typewriter_tests.rs"]
mod tests;
