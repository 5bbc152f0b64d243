//! Reading-progress indicator.
//!
//! Turns the observer's [`ScrollState`] into a [`ProgressBar`] description:
//! hidden below the desktop breakpoint, otherwise a full-width track whose fill
//! is `round(progress * 100)` percent, colored by the color-scheme preference.
//! The indicator has no frame loop: a new bar is produced only when the scroll
//! state changes, and the width animation is a declarative [`Transition`].

use crate::env::{Preference, Subscription};
use crate::model::ColorScheme;
use crate::scroll::ScrollState;
use ratatui::style::Color;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

/// Narrowest viewport, in logical pixels, that shows the indicator.
pub const DESKTOP_BREAKPOINT: f64 = 768.0;

/// Duration of the width transition.
pub const FILL_TRANSITION: Duration = Duration::from_millis(150);

/// Fill width in whole percent for a scroll fraction.
///
/// Input is clamped to `[0, 1]`; non-finite input maps to 0.
pub fn fill_percent(progress: f64) -> u8 {
    if !progress.is_finite() {
        return 0;
    }
    // Clamped to [0, 100] before the cast.
    (progress.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Whether a viewport of `width` logical pixels shows the indicator.
pub fn is_visible(viewport_width: f64) -> bool {
    viewport_width >= DESKTOP_BREAKPOINT
}

/// Animated CSS-like property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionProperty {
    /// Width of the fill.
    Width,
}

/// Timing function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    /// Decelerating curve.
    EaseOut,
}

/// Declarative transition attached to the fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Property being animated.
    pub property: TransitionProperty,
    /// Transition duration.
    pub duration: Duration,
    /// Timing function.
    pub easing: Easing,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            property: TransitionProperty::Width,
            duration: FILL_TRANSITION,
            easing: Easing::EaseOut,
        }
    }
}

/// Fill colors for both color schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressColors {
    /// Fill color under a light scheme.
    pub light: Color,
    /// Fill color under a dark scheme.
    pub dark: Color,
}

impl ProgressColors {
    /// Color for `scheme`.
    pub fn for_scheme(&self, scheme: ColorScheme) -> Color {
        match scheme {
            ColorScheme::Light => self.light,
            ColorScheme::Dark => self.dark,
        }
    }
}

impl Default for ProgressColors {
    fn default() -> Self {
        Self {
            light: Color::Rgb(0x25, 0x63, 0xeb),
            dark: Color::Rgb(0x60, 0xa5, 0xfa),
        }
    }
}

/// Description of a rendered indicator.
///
/// The track always spans the full viewport width at the top of the page;
/// only the fill varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressBar {
    /// Fill width in percent of the track, `0..=100`.
    pub fill_percent: u8,
    /// Fill color.
    pub color: Color,
    /// Width transition.
    pub transition: Transition,
}

/// Produce the bar for the given inputs, or `None` on narrow viewports.
pub fn render_progress(viewport_width: f64, state: &ScrollState, color: Color) -> Option<ProgressBar> {
    if !is_visible(viewport_width) {
        return None;
    }
    Some(ProgressBar {
        fill_percent: fill_percent(state.progress),
        color,
        transition: Transition::default(),
    })
}

/// Mounted indicator tracking the color-scheme preference.
///
/// The scheme is sampled at mount and kept current through a subscription
/// until [`unmount`](Self::unmount) (idempotent, also run on drop).
pub struct ProgressIndicator {
    colors: ProgressColors,
    scheme: Rc<Cell<ColorScheme>>,
    subscription: Subscription,
}

impl ProgressIndicator {
    /// Mount against a color-scheme signal.
    pub fn mount(color_scheme: &Preference<ColorScheme>, colors: ProgressColors) -> Self {
        let scheme = Rc::new(Cell::new(color_scheme.get()));
        let tracked = Rc::clone(&scheme);
        let subscription = color_scheme.subscribe(move |next: &ColorScheme| {
            debug!(scheme = ?next, "progress indicator color scheme changed");
            tracked.set(*next);
        });
        Self {
            colors,
            scheme,
            subscription,
        }
    }

    /// Scheme currently in effect.
    pub fn scheme(&self) -> ColorScheme {
        self.scheme.get()
    }

    /// Fill color currently in effect.
    pub fn color(&self) -> Color {
        self.colors.for_scheme(self.scheme.get())
    }

    /// Render for the current viewport width and scroll state.
    pub fn render(&self, viewport_width: f64, state: &ScrollState) -> Option<ProgressBar> {
        render_progress(viewport_width, state, self.color())
    }

    /// Whether the scheme subscription is still live.
    pub fn is_mounted(&self) -> bool {
        self.subscription.is_active()
    }

    /// Stop tracking the color scheme.
    pub fn unmount(&mut self) {
        self.subscription.unsubscribe();
    }
}

impl std::fmt::Debug for ProgressIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressIndicator")
            .field("scheme", &self.scheme())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(progress: f64) -> ScrollState {
        ScrollState {
            progress,
            is_scrolling: false,
        }
    }

    #[test]
    fn fill_percent_matches_documented_points() {
        assert_eq!(fill_percent(0.0), 0);
        assert_eq!(fill_percent(0.3), 30);
        assert_eq!(fill_percent(1.0), 100);
    }

    #[test]
    fn fill_percent_rounds_to_nearest() {
        assert_eq!(fill_percent(0.004), 0);
        assert_eq!(fill_percent(0.006), 1);
        assert_eq!(fill_percent(0.556), 56);
    }

    #[test]
    fn fill_percent_clamps_out_of_range_input() {
        assert_eq!(fill_percent(-0.5), 0);
        assert_eq!(fill_percent(1.7), 100);
        assert_eq!(fill_percent(f64::NAN), 0);
    }

    #[test]
    fn hidden_below_breakpoint() {
        assert_eq!(render_progress(767.0, &at(0.5), Color::Blue), None);
        assert_eq!(render_progress(320.0, &at(1.0), Color::Blue), None);
    }

    #[test]
    fn shown_at_and_above_breakpoint() {
        let bar = render_progress(768.0, &at(0.3), Color::Blue).unwrap();
        assert_eq!(bar.fill_percent, 30);
        assert_eq!(bar.color, Color::Blue);
        assert!(render_progress(1920.0, &at(0.0), Color::Blue).is_some());
    }

    #[test]
    fn transition_is_declarative_width_ease() {
        let bar = render_progress(1024.0, &at(0.1), Color::Blue).unwrap();
        assert_eq!(
            bar.transition,
            Transition {
                property: TransitionProperty::Width,
                duration: Duration::from_millis(150),
                easing: Easing::EaseOut,
            }
        );
    }

    #[test]
    fn indicator_samples_scheme_at_mount() {
        let scheme = Preference::new(ColorScheme::Dark);
        let colors = ProgressColors::default();
        let indicator = ProgressIndicator::mount(&scheme, colors);
        assert_eq!(indicator.color(), colors.dark);
    }

    #[test]
    fn indicator_follows_scheme_changes() {
        let scheme = Preference::new(ColorScheme::Light);
        let colors = ProgressColors::default();
        let indicator = ProgressIndicator::mount(&scheme, colors);
        assert_eq!(indicator.render(1024.0, &at(0.5)).unwrap().color, colors.light);

        scheme.set(ColorScheme::Dark);
        assert_eq!(indicator.render(1024.0, &at(0.5)).unwrap().color, colors.dark);
    }

    #[test]
    fn unmounted_indicator_keeps_last_scheme() {
        let scheme = Preference::new(ColorScheme::Light);
        let mut indicator = ProgressIndicator::mount(&scheme, ProgressColors::default());
        indicator.unmount();
        indicator.unmount();
        assert!(!indicator.is_mounted());
        assert_eq!(scheme.listener_count(), 0);

        scheme.set(ColorScheme::Dark);
        assert_eq!(indicator.scheme(), ColorScheme::Light);
    }

    proptest! {
        #[test]
        fn visibility_depends_only_on_width(width in 0.0f64..4000.0, progress in 0.0f64..=1.0) {
            let shown = render_progress(width, &at(progress), Color::Blue).is_some();
            prop_assert_eq!(shown, width >= 768.0);
        }

        #[test]
        fn fill_is_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(fill_percent(lo) <= fill_percent(hi));
        }
    }
}
