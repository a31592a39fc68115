//! Load order and system loading.
//!
//! Mods are ordered with the same depth-first sort the scheduler uses for
//! systems. Each mod then contributes systems through a registration entry
//! point: a plain function compiled into the host and looked up by mod id.

use std::collections::{BTreeMap, HashMap};
use std::panic::{self, AssertUnwindSafe};

use engine_system::{GraphError, System, dependency_order, panic_message};
use tracing::{error, info, warn};

use crate::manifest::ModManifest;

/// A mod's registration entry point.
pub type EntryPoint = fn() -> anyhow::Result<Vec<Box<dyn System>>>;

/// Registration entry points keyed by mod id.
#[derive(Debug, Clone, Default)]
pub struct EntryPoints {
    entries: HashMap<String, EntryPoint>,
}

impl EntryPoints {
    /// Create an empty set of entry points.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`EntryPoints::insert`].
    #[must_use]
    pub fn with(mut self, mod_id: impl Into<String>, entry: EntryPoint) -> Self {
        self.insert(mod_id, entry);
        self
    }

    /// Set the entry point for `mod_id`, replacing any previous one.
    pub fn insert(&mut self, mod_id: impl Into<String>, entry: EntryPoint) {
        self.entries.insert(mod_id.into(), entry);
    }

    /// The entry point registered for `mod_id`, if any.
    #[must_use]
    pub fn get(&self, mod_id: &str) -> Option<EntryPoint> {
        self.entries.get(mod_id).copied()
    }
}

/// Order `available` so every mod follows its dependencies.
///
/// Roots are taken in id order and dependencies in declared order, so the
/// result does not depend on how the mods were found.
///
/// # Errors
///
/// Returns [`GraphError::Cycle`] or [`GraphError::Missing`]; both are fatal
/// for startup.
pub fn resolve_load_order(
    available: &BTreeMap<String, ModManifest>,
) -> Result<Vec<ModManifest>, GraphError> {
    let nodes: Vec<(&str, Vec<&str>)> = available
        .values()
        .map(|m| (m.id.as_str(), m.dependencies.iter().map(String::as_str).collect()))
        .collect();

    let order = dependency_order(&nodes)?;
    let sorted: Vec<ModManifest> = order
        .into_iter()
        .filter_map(|id| available.get(id).cloned())
        .collect();

    info!(
        order = ?sorted.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
        "resolved mod load order"
    );
    Ok(sorted)
}

/// Call each mod's entry point in load order and collect the systems.
///
/// A mod without an entry point, or whose entry point fails or panics,
/// contributes nothing; the others still load.
pub fn load_systems(mods: &[ModManifest], entry_points: &EntryPoints) -> Vec<Box<dyn System>> {
    let mut systems = Vec::new();

    for manifest in mods {
        let Some(entry) = entry_points.get(&manifest.id) else {
            warn!(mod_id = %manifest.id, "no registration entry point, mod contributes no systems");
            continue;
        };

        match panic::catch_unwind(AssertUnwindSafe(entry)) {
            Ok(Ok(contributed)) => {
                for system in &contributed {
                    info!(mod_id = %manifest.id, system = system.id(), "registering system");
                }
                systems.extend(contributed);
            }
            Ok(Err(err)) => {
                error!(mod_id = %manifest.id, "registration failed, skipping mod: {err:#}");
            }
            Err(payload) => {
                error!(
                    mod_id = %manifest.id,
                    panic = panic_message(payload.as_ref()),
                    "registration panicked, skipping mod"
                );
            }
        }
    }

    systems
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use engine_state::GameState;
    use engine_system::FnSystem;

    use super::*;

    fn manifest(id: &str, deps: &[&str]) -> ModManifest {
        ModManifest {
            id: id.to_string(),
            name: id.to_string(),
            version: "0.1.0".to_string(),
            dependencies: deps.iter().map(|d| (*d).to_string()).collect(),
            path: PathBuf::from("mods").join(id),
        }
    }

    fn available(mods: &[ModManifest]) -> BTreeMap<String, ModManifest> {
        mods.iter().map(|m| (m.id.clone(), m.clone())).collect()
    }

    fn ids(mods: &[ModManifest]) -> Vec<&str> {
        mods.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_dependent_loads_after_dependency() {
        let mods = available(&[manifest("dlc", &["base"]), manifest("base", &[])]);
        let order = resolve_load_order(&mods).unwrap();
        assert_eq!(ids(&order), vec!["base", "dlc"]);
    }

    #[test]
    fn test_roots_in_id_order() {
        let mods = available(&[
            manifest("zeta", &[]),
            manifest("alpha", &[]),
            manifest("mid", &["zeta"]),
        ]);
        let order = resolve_load_order(&mods).unwrap();
        assert_eq!(ids(&order), vec!["alpha", "zeta", "mid"]);
    }

    #[test]
    fn test_mod_cycle_is_fatal() {
        let mods = available(&[manifest("a", &["b"]), manifest("b", &["a"])]);
        let err = resolve_load_order(&mods).unwrap_err();
        assert!(matches!(err, GraphError::Cycle { .. }));
        assert_eq!(err.id(), "a");
    }

    #[test]
    fn test_missing_mod_dependency_is_fatal() {
        let mods = available(&[manifest("dlc", &["base"])]);
        let err = resolve_load_order(&mods).unwrap_err();
        assert_eq!(
            err,
            GraphError::Missing {
                id: "base".to_string(),
                required_by: "dlc".to_string(),
            }
        );
    }

    fn register_good() -> anyhow::Result<Vec<Box<dyn System>>> {
        Ok(vec![FnSystem::boxed("good.tick", &[], |_: &mut GameState, _| Ok(()))])
    }

    fn register_failing() -> anyhow::Result<Vec<Box<dyn System>>> {
        anyhow::bail!("asset table missing")
    }

    fn register_panicking() -> anyhow::Result<Vec<Box<dyn System>>> {
        panic!("bad registration")
    }

    #[test]
    fn test_bad_entry_points_are_skipped() {
        let mods = vec![
            manifest("failing", &[]),
            manifest("good", &[]),
            manifest("panicking", &[]),
            manifest("silent", &[]),
        ];
        let entry_points = EntryPoints::new()
            .with("failing", register_failing)
            .with("good", register_good)
            .with("panicking", register_panicking);

        let systems = load_systems(&mods, &entry_points);
        let loaded: Vec<&str> = systems.iter().map(|s| s.id()).collect();
        assert_eq!(loaded, vec!["good.tick"]);
    }
}
