//! Environment signals consumed by the motion components.
//!
//! The host (a browser shim, the terminal preview, or a test) owns an
//! [`Environment`] and pushes measurements into it. Components only read and
//! subscribe; they never write environment signals.

pub mod preference;

pub use preference::{Preference, Subscription};

use crate::model::{ColorScheme, ScrollMetrics, Viewport};

/// Live environment inputs.
///
/// Cloning yields handles to the same signals.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Visible viewport size. Changes are resize events.
    pub viewport: Preference<Viewport>,
    /// Vertical scroll offset. Changes are scroll events.
    pub scroll_offset: Preference<f64>,
    /// Full document height. Changes are treated like resize events.
    pub document_height: Preference<f64>,
    /// Reduced-motion accessibility preference.
    pub reduced_motion: Preference<bool>,
    /// Light/dark color-scheme preference.
    pub color_scheme: Preference<ColorScheme>,
}

impl Environment {
    /// Environment with the given viewport, scrolled to the top of a document
    /// exactly as tall as the viewport, with motion allowed and a light scheme.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport: Preference::new(viewport),
            scroll_offset: Preference::new(0.0),
            document_height: Preference::new(viewport.height),
            reduced_motion: Preference::new(false),
            color_scheme: Preference::new(ColorScheme::Light),
        }
    }

    /// Current scroll metrics assembled from the individual signals.
    pub fn scroll_metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            offset: self.scroll_offset.get(),
            document_height: self.document_height.get(),
            viewport_height: self.viewport.get().height,
        }
    }

    /// Scroll to `offset`, clamped to the reachable range as a browser does.
    pub fn scroll_to(&self, offset: f64) {
        let max = self.scroll_metrics().max_offset();
        self.scroll_offset.set(offset.clamp(0.0, max));
    }

    /// Scroll by `delta` from the current offset.
    pub fn scroll_by(&self, delta: f64) {
        self.scroll_to(self.scroll_offset.get() + delta);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(Viewport::new(1280.0, 800.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_environment_is_at_top_with_motion_allowed() {
        let env = Environment::new(Viewport::new(1024.0, 768.0));
        let metrics = env.scroll_metrics();
        assert_eq!(metrics.offset, 0.0);
        assert_eq!(metrics.viewport_height, 768.0);
        assert!(!env.reduced_motion.get());
        assert_eq!(env.color_scheme.get(), ColorScheme::Light);
    }

    #[test]
    fn scroll_to_clamps_to_reachable_range() {
        let env = Environment::new(Viewport::new(1024.0, 500.0));
        env.document_height.set(1500.0);

        env.scroll_to(5000.0);
        assert_eq!(env.scroll_offset.get(), 1000.0);

        env.scroll_to(-30.0);
        assert_eq!(env.scroll_offset.get(), 0.0);
    }

    #[test]
    fn scroll_by_is_relative() {
        let env = Environment::new(Viewport::new(1024.0, 500.0));
        env.document_height.set(1500.0);
        env.scroll_by(200.0);
        env.scroll_by(50.0);
        assert_eq!(env.scroll_offset.get(), 250.0);
    }

    #[test]
    fn clones_share_signals() {
        let env = Environment::default();
        let other = env.clone();
        other.reduced_motion.set(true);
        assert!(env.reduced_motion.get());
    }
}
