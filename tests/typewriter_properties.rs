//! Property-based tests for the typewriter engine.
//!
//! Black-box: mounts through the public API, advances a virtual clock in 1 ms
//! steps and observes the revealed prefix and completion count.
//!
//! Properties under test:
//! 1. Reduced motion at cycle start: full text, one completion, no timers
//! 2. Revealed length is a non-decreasing step function reaching N within
//!    `[(N-1)*C, N*C]`, with exactly one completion at that instant
//! 3. A text change restarts at zero and leaves at most one pending timer

use folio::env::Preference;
use folio::model::Cadence;
use folio::timer::Scheduler;
use folio::typewriter::{Typewriter, TypewriterProps};
use proptest::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

fn mount_counting(
    text: &str,
    cadence_ms: u64,
    reduced: bool,
) -> (Typewriter, Scheduler, Rc<Cell<u32>>) {
    let scheduler = Scheduler::new();
    let reduced_motion = Preference::new(reduced);
    let count = Rc::new(Cell::new(0u32));
    let count_clone = Rc::clone(&count);
    let typewriter = Typewriter::mount(
        TypewriterProps::new(text)
            .with_cadence(Cadence::from_millis(cadence_ms).unwrap())
            .on_complete(move || count_clone.set(count_clone.get() + 1)),
        &reduced_motion,
        &scheduler,
    );
    (typewriter, scheduler, count)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // ===== Property 1: Reduced motion =====

    #[test]
    fn reduced_motion_reveals_everything_at_once(text in "\\PC{0,40}", cadence in 1u64..500) {
        let (typewriter, scheduler, count) = mount_counting(&text, cadence, true);

        prop_assert_eq!(typewriter.revealed(), text);
        prop_assert!(typewriter.is_complete());
        prop_assert!(!typewriter.show_caret());
        prop_assert_eq!(count.get(), 1);
        prop_assert_eq!(scheduler.pending(), 0);
    }

    // ===== Property 2: Timing =====

    #[test]
    fn reveal_is_a_monotonic_step_function(text in "[a-zA-Z0-9 ]{0,24}", cadence in 1u64..60) {
        let (typewriter, scheduler, count) = mount_counting(&text, cadence, false);
        let n = text.chars().count() as u64;
        let horizon = (n + 2) * cadence;

        let mut previous = typewriter.revealed_len();
        let mut completed_at = if typewriter.is_complete() { Some(0) } else { None };
        for t in 1..=horizon {
            scheduler.advance_ms(1);
            let current = typewriter.revealed_len();
            prop_assert!(current >= previous, "revealed length decreased at {}ms", t);
            prop_assert!(current - previous <= 1, "more than one character per tick at {}ms", t);
            if completed_at.is_none() {
                if typewriter.is_complete() {
                    completed_at = Some(t);
                } else {
                    prop_assert_eq!(count.get(), 0, "completion before full reveal");
                }
            }
            previous = current;
        }

        let completed_at = completed_at.unwrap_or(u64::MAX);
        prop_assert!(completed_at >= n.saturating_sub(1) * cadence);
        prop_assert!(completed_at <= n * cadence);
        prop_assert_eq!(typewriter.revealed(), text);
        prop_assert_eq!(count.get(), 1);
        prop_assert_eq!(scheduler.pending(), 0);
    }

    // ===== Property 3: Restart =====

    #[test]
    fn text_change_restarts_cleanly(
        first in "[a-z]{2,20}",
        second in "[A-Z]{1,20}",
        cadence in 1u64..50,
        elapsed in 0u64..1000,
    ) {
        let (typewriter, scheduler, count) = mount_counting(&first, cadence, false);
        scheduler.advance_ms(elapsed);
        let completions_before = count.get();

        typewriter.set_text(second.clone());
        prop_assert_eq!(typewriter.revealed_len(), 0);
        prop_assert!(scheduler.pending() <= 1);

        // Until the first tick of the new cycle nothing may appear.
        scheduler.advance_ms(cadence - 1);
        prop_assert_eq!(typewriter.revealed(), "");

        scheduler.advance_ms(second.chars().count() as u64 * cadence);
        prop_assert_eq!(typewriter.revealed(), second);
        prop_assert_eq!(count.get(), completions_before + 1);
    }
}
