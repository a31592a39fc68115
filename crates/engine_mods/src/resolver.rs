//! The full mod pipeline: discover, order, load.

use std::path::{Path, PathBuf};

use engine_system::{GraphError, System};
use tracing::info;

use crate::discovery::discover;
use crate::loader::{EntryPoints, load_systems, resolve_load_order};
use crate::manifest::ModManifest;

/// The result of [`ModResolver::resolve`].
pub struct LoadedMods {
    /// Mods in load order.
    pub mods: Vec<ModManifest>,
    /// Systems contributed by those mods, in mod order.
    pub systems: Vec<Box<dyn System>>,
}

impl std::fmt::Debug for LoadedMods {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedMods")
            .field("mods", &self.mods.iter().map(|m| &m.id).collect::<Vec<_>>())
            .field(
                "systems",
                &self.systems.iter().map(|s| s.id()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Resolves the mods under one root directory.
#[derive(Debug, Clone)]
pub struct ModResolver {
    root: PathBuf,
    entry_points: EntryPoints,
}

impl ModResolver {
    /// Resolver for the mods under `root`, registering through `entry_points`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, entry_points: EntryPoints) -> Self {
        Self {
            root: root.into(),
            entry_points,
        }
    }

    /// Directory scanned for mods.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Discover the mods, sort them and collect their systems.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] when the mods' declared dependencies contain a
    /// cycle or name a mod that was not found.
    pub fn resolve(&self) -> Result<LoadedMods, GraphError> {
        let available = discover(&self.root);
        let mods = resolve_load_order(&available)?;
        let systems = load_systems(&mods, &self.entry_points);
        info!(
            mods = mods.len(),
            systems = systems.len(),
            "mods resolved"
        );
        Ok(LoadedMods { mods, systems })
    }
}
