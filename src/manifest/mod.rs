//! Icon manifest: build-time `name -> extension` table.
//!
//! The builder scans one directory of icon assets and records, for every
//! `.svg` or `.png` file, its base name and extension. The table is written as
//! a flat JSON object to a well-known location and read back by the
//! [`resolve`] layer at render time.
//!
//! Failing to read the source directory is build-fatal: [`build_manifest`]
//! returns an error and nothing is written.

pub mod resolve;

pub use resolve::{resolve, IconAsset, IconResolver, DEFAULT_ICONS_ROOT};

use crate::model::error::ManifestError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default manifest location, relative to the project root.
pub const DEFAULT_MANIFEST_PATH: &str = "public/icons/manifest.json";

/// Default icon source directory, relative to the project root.
pub const DEFAULT_ICONS_DIR: &str = "public/icons";

/// Extension of an icon asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconExtension {
    /// Vector icon.
    Svg,
    /// Raster icon.
    Png,
}

impl IconExtension {
    /// Extension without the leading dot.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }

    /// Classify a file by its extension. Only exact lowercase `svg` and `png`
    /// are icons.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

impl fmt::Display for IconExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup table from icon base name to extension.
///
/// Ordered by name so the serialized form is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconManifest {
    icons: BTreeMap<String, IconExtension>,
}

impl IconManifest {
    /// Empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name`, replacing any previous extension.
    pub fn insert(&mut self, name: impl Into<String>, extension: IconExtension) -> Option<IconExtension> {
        self.icons.insert(name.into(), extension)
    }

    /// Extension recorded for `name`.
    pub fn get(&self, name: &str) -> Option<IconExtension> {
        self.icons.get(name).copied()
    }

    /// Number of icons.
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    /// Whether the manifest has no icons.
    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// Icons in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, IconExtension)> {
        self.icons.iter().map(|(name, ext)| (name.as_str(), *ext))
    }

    /// Pretty JSON form, as written to disk.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

impl<N: Into<String>> FromIterator<(N, IconExtension)> for IconManifest {
    fn from_iter<I: IntoIterator<Item = (N, IconExtension)>>(iter: I) -> Self {
        Self {
            icons: iter.into_iter().map(|(name, ext)| (name.into(), ext)).collect(),
        }
    }
}

/// Scan the immediate files of `dir` into a manifest.
///
/// Files that are not `.svg`/`.png`, subdirectories and names that are not
/// valid UTF-8 are skipped. When one base name exists with both extensions the
/// entry enumerated last wins; the enumeration order is platform-defined.
///
/// # Errors
///
/// Returns [`ManifestError::ReadDir`] if the directory or any of its entries
/// cannot be read.
pub fn build_manifest(dir: &Path) -> Result<IconManifest, ManifestError> {
    let read_error = |source| ManifestError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut manifest = IconManifest::new();
    for entry in fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        if !path.is_file() {
            continue;
        }
        let Some(extension) = IconExtension::from_path(&path) else {
            continue;
        };
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            warn!(path = ?path, "skipping icon with non UTF-8 name");
            continue;
        };
        if let Some(previous) = manifest.insert(name, extension) {
            if previous != extension {
                debug!(name, kept = %extension, dropped = %previous, "icon exists with both extensions");
            }
        }
    }

    info!(dir = ?dir, icons = manifest.len(), "icon manifest built");
    Ok(manifest)
}

/// Write `manifest` as pretty JSON to `path`, creating parent directories.
///
/// The JSON goes to a sibling temporary file that is then renamed over
/// `path`, so a failed write leaves any previous manifest untouched.
///
/// # Errors
///
/// Returns [`ManifestError::Write`] on I/O failure.
pub fn write_manifest(manifest: &IconManifest, path: &Path) -> Result<(), ManifestError> {
    let write_error = |source| ManifestError::Write {
        path: path.to_path_buf(),
        source,
    };
    let json = manifest.to_json()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    let staging = staging_path(path);
    if let Err(err) = fs::write(&staging, json).and_then(|()| fs::rename(&staging, path)) {
        if staging.is_file() {
            let _ = fs::remove_file(&staging);
        }
        return Err(write_error(err));
    }
    info!(path = ?path, icons = manifest.len(), "icon manifest written");
    Ok(())
}

/// `<path>.tmp`, next to the target so the rename stays on one filesystem.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read a manifest previously written by [`write_manifest`].
///
/// # Errors
///
/// Returns [`ManifestError::Read`] if the file cannot be read and
/// [`ManifestError::Parse`] if it is not a flat `name -> "svg"|"png"` object.
pub fn load_manifest(path: &Path) -> Result<IconManifest, ManifestError> {
    let contents = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|e| ManifestError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Build the manifest for `icons_dir` and write it to `out`.
///
/// Nothing is written if the directory cannot be read.
pub fn generate_manifest(icons_dir: &Path, out: &Path) -> Result<IconManifest, ManifestError> {
    let manifest = build_manifest(icons_dir)?;
    write_manifest(&manifest, out)?;
    Ok(manifest)
}

/// Default manifest path as a `PathBuf`.
pub fn default_manifest_path() -> PathBuf {
    PathBuf::from(DEFAULT_MANIFEST_PATH)
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
