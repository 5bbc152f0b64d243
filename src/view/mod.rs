//! Terminal rendering (impure shell).
//!
//! [`HeroLine`] and [`ProgressBarWidget`] are pure ratatui widgets over
//! snapshots of the typewriter and progress indicator. [`preview`] owns the
//! terminal, the event loop and the wall clock.

pub mod hero;
pub mod preview;
pub mod progress_bar;

pub use hero::HeroLine;
pub use preview::{run, PreviewApp, PreviewOptions};
pub use progress_bar::ProgressBarWidget;
