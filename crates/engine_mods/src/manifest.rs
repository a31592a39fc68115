//! `mod.json` parsing.
//!
//! A manifest looks like:
//!
//! ```json
//! {
//!   "id": "base",
//!   "name": "Base Game",
//!   "version": "0.1.0",
//!   "dependencies": []
//! }
//! ```
//!
//! Every field is optional. `id` and `name` fall back to the mod's directory
//! name, `version` to [`DEFAULT_VERSION`], `dependencies` to none.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

/// File name of the manifest inside a mod directory.
pub const MANIFEST_FILE: &str = "mod.json";

/// Version assumed when a manifest does not declare one.
pub const DEFAULT_VERSION: &str = "0.0.1";

/// A discovered mod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModManifest {
    pub id: String,
    pub name: String,
    pub version: String,
    /// Ids of mods that must load first.
    pub dependencies: Vec<String>,
    /// The mod's directory.
    #[serde(skip)]
    pub path: PathBuf,
}

#[derive(Deserialize)]
struct RawManifest {
    id: Option<String>,
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    dependencies: Vec<String>,
}

impl ModManifest {
    /// Read `<dir>/mod.json`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] if the file cannot be read, is not a JSON
    /// object of the expected shape, or declares an empty id.
    pub fn load(dir: &Path) -> Result<Self, ManifestError> {
        let path = dir.join(MANIFEST_FILE);
        let text = std::fs::read_to_string(&path).map_err(|source| ManifestError::Io {
            path: path.clone(),
            source,
        })?;
        Self::parse(&text, dir).map_err(|err| match err {
            ManifestError::Parse { source, .. } => ManifestError::Parse { path, source },
            ManifestError::EmptyId { .. } => ManifestError::EmptyId { path },
            other => other,
        })
    }

    /// Parse manifest text for the mod living in `dir`.
    ///
    /// # Errors
    ///
    /// See [`ModManifest::load`].
    pub fn parse(text: &str, dir: &Path) -> Result<Self, ManifestError> {
        let raw: RawManifest = serde_json::from_str(text).map_err(|source| ManifestError::Parse {
            path: dir.to_path_buf(),
            source,
        })?;

        let dir_name = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let id = raw.id.unwrap_or_else(|| dir_name.clone());
        if id.trim().is_empty() {
            return Err(ManifestError::EmptyId {
                path: dir.to_path_buf(),
            });
        }

        Ok(Self {
            name: raw.name.unwrap_or(dir_name),
            version: raw.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            dependencies: raw.dependencies,
            path: dir.to_path_buf(),
            id,
        })
    }

    /// The mod's `data/` directory.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.path.join("data")
    }
}
