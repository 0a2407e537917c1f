//! Vite build manifest lookup for the theme's CSS and JS bundles.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// URL prefix the built assets are served under.
pub const ASSETS_URL_PREFIX: &str = "/_govuk_admin";

/// Manifest key of the stylesheet entry point.
pub const CSS_ENTRY: &str = "src/assets/main.scss";

/// Manifest key of the script entry point.
pub const JS_ENTRY: &str = "src/assets/main.js";

/// Errors loading or reading the asset manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest")]
    Parse(#[from] serde_json::Error),

    #[error("manifest has no entry for {0}")]
    MissingEntry(String),
}

/// One manifest chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    /// Built file, relative to the build output directory.
    pub file: String,
}

/// A parsed Vite `manifest.json`.
#[derive(Debug, Clone, Default)]
pub struct AssetManifest {
    entries: HashMap<String, ManifestEntry>,
}

impl AssetManifest {
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let entries: HashMap<String, ManifestEntry> = serde_json::from_str(json)?;
        debug!(count = entries.len(), "loaded asset manifest");
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let json = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Public URL of an entry's built file.
    ///
    /// Only the file name is kept; the asset route serves a flat directory.
    pub fn url(&self, entry: &str) -> Result<String, ManifestError> {
        let chunk = self
            .entries
            .get(entry)
            .ok_or_else(|| ManifestError::MissingEntry(entry.to_string()))?;
        let name = Path::new(&chunk.file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&chunk.file);
        Ok(format!("{ASSETS_URL_PREFIX}/{name}"))
    }

    /// `<link>` tag for the stylesheet bundle.
    pub fn include_css(&self) -> Result<String, ManifestError> {
        Ok(format!(
            r#"<link rel="stylesheet" href="{}">"#,
            self.url(CSS_ENTRY)?
        ))
    }

    /// `<script>` tag for the script bundle.
    pub fn include_js(&self) -> Result<String, ManifestError> {
        Ok(format!(
            r#"<script type="module" src="{}"></script>"#,
            self.url(JS_ENTRY)?
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "src/assets/main.scss": {"file": "assets/main-4f2a.css", "src": "src/assets/main.scss", "isEntry": true},
        "src/assets/main.js": {"file": "assets/main-9c1b.js", "src": "src/assets/main.js", "isEntry": true}
    }"#;

    #[test]
    fn tags_point_at_flat_asset_route() {
        let manifest = AssetManifest::from_json(MANIFEST).unwrap();
        assert_eq!(
            manifest.include_css().unwrap(),
            r#"<link rel="stylesheet" href="/_govuk_admin/main-4f2a.css">"#
        );
        assert_eq!(
            manifest.include_js().unwrap(),
            r#"<script type="module" src="/_govuk_admin/main-9c1b.js"></script>"#
        );
    }

    #[test]
    fn missing_entry_is_an_error() {
        let manifest = AssetManifest::from_json("{}").unwrap();
        assert!(matches!(
            manifest.include_css(),
            Err(ManifestError::MissingEntry(entry)) if entry == CSS_ENTRY
        ));
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(
            AssetManifest::from_json("not json"),
            Err(ManifestError::Parse(_))
        ));
    }
}
