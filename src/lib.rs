//! folio
//!
//! Motion and asset core of a personal site: a build-time icon manifest with
//! a pure icon resolver, a scroll-progress observer feeding a reading-progress
//! indicator, and a cancellable typewriter reveal.
//!
//! The crate follows a Pure Core / Impure Shell split. Everything outside
//! [`view`] is deterministic: time comes from a virtual-clock
//! [`timer::Scheduler`] and measurements from an [`env::Environment`], so
//! tests drive the components without a browser, a terminal or a real clock.
//! [`view::preview`] hosts the same components in a terminal.

pub mod config;
pub mod env;
pub mod logging;
pub mod manifest;
pub mod model;
pub mod progress;
pub mod scroll;
pub mod timer;
pub mod typewriter;
pub mod view;
