//! Icon name to asset path resolution.
//!
//! Pure lookups with no failure path: names missing from the manifest are
//! assumed to be raster icons and resolve to `.png`. A wrong guess renders as
//! a broken image, never as an error.

use super::{IconExtension, IconManifest};
use tracing::debug;

/// Public URL segment under which icons are served.
pub const DEFAULT_ICONS_ROOT: &str = "icons";

/// Extension assumed for icons absent from the manifest.
pub const FALLBACK_EXTENSION: IconExtension = IconExtension::Png;

/// A resolved icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconAsset {
    /// Absolute URL path, `/<root>/<name>.<ext>`.
    pub path: String,
    /// Extension used in `path`.
    pub extension: IconExtension,
    /// Whether the extension came from the manifest rather than the fallback.
    pub in_manifest: bool,
}

/// Resolver bound to a manifest and an icons root.
#[derive(Debug, Clone)]
pub struct IconResolver {
    root: String,
    manifest: IconManifest,
}

impl IconResolver {
    /// Resolver serving icons from `/icons`.
    pub fn new(manifest: IconManifest) -> Self {
        Self::with_root(DEFAULT_ICONS_ROOT, manifest)
    }

    /// Resolver serving icons from `/<root>`. Surrounding slashes in `root`
    /// are ignored.
    pub fn with_root(root: &str, manifest: IconManifest) -> Self {
        Self {
            root: root.trim_matches('/').to_string(),
            manifest,
        }
    }

    /// Icons root without slashes.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Manifest in use.
    pub fn manifest(&self) -> &IconManifest {
        &self.manifest
    }

    /// Resolve `name` to an asset.
    pub fn resolve(&self, name: &str) -> IconAsset {
        let (extension, in_manifest) = match self.manifest.get(name) {
            Some(extension) => (extension, true),
            None => {
                debug!(name, fallback = %FALLBACK_EXTENSION, "icon missing from manifest");
                (FALLBACK_EXTENSION, false)
            }
        };
        let path = if self.root.is_empty() {
            format!("/{name}.{extension}")
        } else {
            format!("/{}/{name}.{extension}", self.root)
        };
        IconAsset {
            path,
            extension,
            in_manifest,
        }
    }

    /// Resolve `name` to its path only.
    pub fn path(&self, name: &str) -> String {
        self.resolve(name).path
    }
}

/// Resolve `name` under the default `/icons` root.
pub fn resolve(name: &str, manifest: &IconManifest) -> String {
    let extension = manifest.get(name).unwrap_or(FALLBACK_EXTENSION);
    format!("/{DEFAULT_ICONS_ROOT}/{name}.{extension}")
}
