//! Environment-derived measurements and preferences.
//!
//! Lengths are logical pixels.

/// Size of the visible viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Viewport width in logical pixels.
    pub width: f64,
    /// Viewport height in logical pixels.
    pub height: f64,
}

impl Viewport {
    /// Create a viewport of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Inputs of the scroll fraction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    /// Current vertical scroll offset from the top.
    pub offset: f64,
    /// Full height of the scrollable document.
    pub document_height: f64,
    /// Height of the viewport the document scrolls in.
    pub viewport_height: f64,
}

impl ScrollMetrics {
    /// Largest reachable scroll offset (zero when the document fits).
    pub fn max_offset(&self) -> f64 {
        (self.document_height - self.viewport_height).max(0.0)
    }
}

/// OS/browser color-scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorScheme {
    /// Light background.
    #[default]
    Light,
    /// Dark background.
    Dark,
}

impl ColorScheme {
    /// The opposite scheme.
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_offset_is_document_minus_viewport() {
        let metrics = ScrollMetrics {
            offset: 0.0,
            document_height: 3000.0,
            viewport_height: 800.0,
        };
        assert_eq!(metrics.max_offset(), 2200.0);
    }

    #[test]
    fn max_offset_is_zero_when_document_fits() {
        let metrics = ScrollMetrics {
            offset: 0.0,
            document_height: 400.0,
            viewport_height: 800.0,
        };
        assert_eq!(metrics.max_offset(), 0.0);
    }

    #[test]
    fn color_scheme_toggles() {
        assert_eq!(ColorScheme::Light.toggled(), ColorScheme::Dark);
        assert_eq!(ColorScheme::Dark.toggled(), ColorScheme::Light);
    }
}
