//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod cadence;
pub mod error;
pub mod metrics;

// Re-export for convenience
pub use cadence::Cadence;
pub use error::{AppError, CadenceError, ManifestError};
pub use metrics::{ColorScheme, ScrollMetrics, Viewport};
