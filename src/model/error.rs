//! Error types for folio.
//!
//! This module defines the error taxonomy using `thiserror`. Errors compose via
//! `?` and `From` conversions into [`AppError`] at the binary boundary.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error returned by the CLI
//!   - [`ManifestError`] - Icon manifest build/read/write failures (build-fatal)
//!   - [`CadenceError`] - Invalid typewriter cadence
//!   - [`ConfigError`](crate::config::ConfigError) - Config file failures
//!   - [`LoggingError`](crate::logging::LoggingError) - Tracing setup failures
//!   - `std::io::Error` - Terminal failures in the preview
//!
//! # Recovery Strategy
//!
//! There is no retry anywhere. Manifest failures abort the build: a partial or
//! empty manifest is never written. Unknown icon names are not errors at all;
//! the resolver falls back to the raster extension.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error encompassing all failure modes.
///
/// Domain errors convert into `AppError` via `From`, so `main` can use `?`
/// throughout.
#[derive(Debug, Error)]
pub enum AppError {
    /// Building, reading or writing the icon manifest failed.
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Cadence supplied on the command line or in config is invalid.
    #[error("Invalid cadence: {0}")]
    Cadence(#[from] CadenceError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Tracing could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Terminal or TUI rendering error in the preview.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Errors raised while producing or consuming the icon manifest.
///
/// Every variant is build-fatal: the caller must abort instead of emitting a
/// partial manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The icon source directory could not be enumerated.
    #[error("Cannot read icon directory {path:?}: {source}")]
    ReadDir {
        /// Directory that failed to enumerate.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An existing manifest file could not be read.
    #[error("Cannot read manifest {path:?}: {source}")]
    Read {
        /// Manifest file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An existing manifest file is not a flat `name -> "svg"|"png"` object.
    #[error("Invalid manifest {path:?}: {reason}")]
    Parse {
        /// Manifest file path.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// The manifest could not be written to its output location.
    #[error("Cannot write manifest {path:?}: {source}")]
    Write {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest could not be serialized.
    #[error("Cannot serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Invalid per-character reveal delay.
///
/// A zero delay would produce a zero-delay tick loop, so it is rejected at the
/// boundary rather than clamped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CadenceError {
    /// Cadence of zero milliseconds.
    #[error("cadence must be positive, got 0")]
    Zero,

    /// Negative cadence.
    #[error("cadence must be positive, got {0}")]
    Negative(i64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn manifest_read_dir_display_includes_path() {
        let err = ManifestError::ReadDir {
            path: PathBuf::from("/tmp/no-icons"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        let msg = err.to_string();
        assert!(msg.contains("Cannot read icon directory"));
        assert!(msg.contains("/tmp/no-icons"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn manifest_parse_display_includes_reason() {
        let err = ManifestError::Parse {
            path: PathBuf::from("manifest.json"),
            reason: "expected value".to_string(),
        };
        assert!(err.to_string().contains("expected value"));
    }

    #[test]
    fn cadence_error_display() {
        assert_eq!(CadenceError::Zero.to_string(), "cadence must be positive, got 0");
        assert_eq!(
            CadenceError::Negative(-5).to_string(),
            "cadence must be positive, got -5"
        );
    }

    #[test]
    fn app_error_from_manifest_error() {
        let err: AppError = ManifestError::Write {
            path: PathBuf::from("out.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Manifest error"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn app_error_from_cadence_error() {
        let err: AppError = CadenceError::Zero.into();
        assert!(err.to_string().contains("Invalid cadence"));
    }

    #[test]
    fn app_error_from_io_error() {
        let err: AppError = io::Error::new(io::ErrorKind::BrokenPipe, "pipe").into();
        assert!(err.to_string().contains("Terminal error"));
    }
}
