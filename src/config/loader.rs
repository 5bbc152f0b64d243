//! Configuration file loading with precedence handling.

use crate::manifest::{DEFAULT_ICONS_DIR, DEFAULT_ICONS_ROOT, DEFAULT_MANIFEST_PATH};
use crate::model::Cadence;
use crate::progress::ProgressColors;
use crate::scroll::DEFAULT_SCROLL_IDLE;
use ratatui::style::Color;
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const ENV_CONFIG: &str = "FOLIO_CONFIG";

/// Environment variable overriding the icon source directory.
pub const ENV_ICONS_DIR: &str = "FOLIO_ICONS_DIR";

/// Environment variable overriding the typewriter cadence in milliseconds.
pub const ENV_CADENCE_MS: &str = "FOLIO_CADENCE_MS";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// A setting has a value outside its domain.
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue {
        /// Setting name.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, defaults are used.
/// Corresponds to `~/.config/folio/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Directory scanned by the manifest builder.
    #[serde(default)]
    pub icons_dir: Option<PathBuf>,

    /// Where the manifest is written and read.
    #[serde(default)]
    pub manifest_path: Option<PathBuf>,

    /// URL segment icons are served under (e.g. "icons").
    #[serde(default)]
    pub icons_root: Option<String>,

    /// Typewriter delay per character in milliseconds. Must be positive.
    #[serde(default)]
    pub cadence_ms: Option<i64>,

    /// Quiet period before the scroll observer reports "not scrolling".
    #[serde(default)]
    pub scroll_idle_ms: Option<u64>,

    /// Progress fill color under a light color scheme (e.g. "#2563eb").
    #[serde(default)]
    pub light_color: Option<String>,

    /// Progress fill color under a dark color scheme.
    #[serde(default)]
    pub dark_color: Option<String>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Icon source directory.
    pub icons_dir: PathBuf,
    /// Manifest location.
    pub manifest_path: PathBuf,
    /// Icons URL root.
    pub icons_root: String,
    /// Typewriter cadence.
    pub cadence: Cadence,
    /// Scroll idle period.
    pub scroll_idle: Duration,
    /// Progress fill colors.
    pub colors: ProgressColors,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            icons_dir: PathBuf::from(DEFAULT_ICONS_DIR),
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_PATH),
            icons_root: DEFAULT_ICONS_ROOT.to_string(),
            cadence: Cadence::default(),
            scroll_idle: DEFAULT_SCROLL_IDLE,
            colors: ProgressColors::default(),
            log_file_path: default_log_path(),
        }
    }
}

/// Command-line values that take precedence over every other source.
///
/// `None` means "flag not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// `--icons-dir`
    pub icons_dir: Option<PathBuf>,
    /// `--manifest` / `--out`
    pub manifest_path: Option<PathBuf>,
    /// `--root`
    pub icons_root: Option<String>,
    /// `--cadence`
    pub cadence: Option<Cadence>,
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/folio/folio.log` on Unix-like systems, or the
/// platform equivalent. Falls back to the current directory when no state
/// directory is known.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("folio").join("folio.log")
    } else {
        PathBuf::from("folio.log")
    }
}

/// Resolve default config file path.
///
/// Returns `~/.config/folio/config.toml` on Unix, appropriate path on other
/// platforms. Returns `None` if no config directory can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("folio").join("config.toml"))
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if the file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if the file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `FOLIO_CONFIG` environment variable
/// 3. Default path `~/.config/folio/config.toml`
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

fn parse_color(key: &'static str, raw: &str) -> Result<Color, ConfigError> {
    Color::from_str(raw).map_err(|e| ConfigError::InvalidValue {
        key,
        reason: format!("{raw:?}: {e}"),
    })
}

fn parse_cadence(key: &'static str, millis: i64) -> Result<Cadence, ConfigError> {
    Cadence::from_signed_millis(millis).map_err(|e| ConfigError::InvalidValue {
        key,
        reason: e.to_string(),
    })
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use
/// the default.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for a non-positive cadence, a zero
/// scroll idle period, or an unparseable color.
pub fn merge_config(config_file: Option<ConfigFile>) -> Result<ResolvedConfig, ConfigError> {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return Ok(defaults);
    };

    let cadence = match config.cadence_ms {
        Some(millis) => parse_cadence("cadence_ms", millis)?,
        None => defaults.cadence,
    };
    let scroll_idle = match config.scroll_idle_ms {
        Some(0) => {
            return Err(ConfigError::InvalidValue {
                key: "scroll_idle_ms",
                reason: "must be positive".to_string(),
            })
        }
        Some(millis) => Duration::from_millis(millis),
        None => defaults.scroll_idle,
    };
    let colors = ProgressColors {
        light: match config.light_color.as_deref() {
            Some(raw) => parse_color("light_color", raw)?,
            None => defaults.colors.light,
        },
        dark: match config.dark_color.as_deref() {
            Some(raw) => parse_color("dark_color", raw)?,
            None => defaults.colors.dark,
        },
    };

    Ok(ResolvedConfig {
        icons_dir: config.icons_dir.unwrap_or(defaults.icons_dir),
        manifest_path: config.manifest_path.unwrap_or(defaults.manifest_path),
        icons_root: config.icons_root.unwrap_or(defaults.icons_root),
        cadence,
        scroll_idle,
        colors,
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    })
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `FOLIO_ICONS_DIR`: icon source directory
/// - `FOLIO_CADENCE_MS`: typewriter cadence
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if `FOLIO_CADENCE_MS` is not a
/// positive integer.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(dir) = std::env::var(ENV_ICONS_DIR) {
        config.icons_dir = PathBuf::from(dir);
    }

    if let Ok(raw) = std::env::var(ENV_CADENCE_MS) {
        let millis: i64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: ENV_CADENCE_MS,
            reason: format!("{raw:?} is not an integer"),
        })?;
        config.cadence = parse_cadence(ENV_CADENCE_MS, millis)?;
    }

    Ok(config)
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence. Only flags that were given apply.
pub fn apply_cli_overrides(mut config: ResolvedConfig, cli: CliOverrides) -> ResolvedConfig {
    if let Some(dir) = cli.icons_dir {
        config.icons_dir = dir;
    }
    if let Some(path) = cli.manifest_path {
        config.manifest_path = path;
    }
    if let Some(root) = cli.icons_root {
        config.icons_root = root;
    }
    if let Some(cadence) = cli.cadence {
        config.cadence = cadence;
    }
    config
}

/// Run the whole precedence chain.
///
/// # Errors
///
/// Propagates file and value errors from the individual steps.
pub fn resolve_config(
    config_path: Option<PathBuf>,
    cli: CliOverrides,
) -> Result<ResolvedConfig, ConfigError> {
    let file = load_config_with_precedence(config_path)?;
    let merged = merge_config(file)?;
    let with_env = apply_env_overrides(merged)?;
    Ok(apply_cli_overrides(with_env, cli))
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
