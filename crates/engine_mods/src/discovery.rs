//! Finding mods on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::manifest::{MANIFEST_FILE, ModManifest};

/// Scan the immediate subdirectories of `root` for mods, keyed by mod id.
///
/// Directories are visited in sorted path order. A directory without a
/// `mod.json` is ignored; a manifest that cannot be read or parsed is logged
/// and skipped. When two directories declare the same id, the later one wins.
/// A missing or unreadable `root` yields no mods.
pub fn discover(root: &Path) -> BTreeMap<String, ModManifest> {
    let mut found: BTreeMap<String, ModManifest> = BTreeMap::new();

    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %root.display(), %err, "mods directory not readable, no mods loaded");
            return found;
        }
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();

    for dir in dirs {
        if !dir.join(MANIFEST_FILE).is_file() {
            debug!(dir = %dir.display(), "no manifest, skipping");
            continue;
        }
        match ModManifest::load(&dir) {
            Ok(manifest) => {
                if let Some(previous) = found.get(&manifest.id) {
                    warn!(
                        mod_id = %manifest.id,
                        replaced = %previous.path.display(),
                        by = %manifest.path.display(),
                        "duplicate mod id"
                    );
                }
                found.insert(manifest.id.clone(), manifest);
            }
            Err(err) => warn!(dir = %dir.display(), "skipping mod: {err}"),
        }
    }

    info!(
        dir = %root.display(),
        mods = found.len(),
        "mod discovery complete"
    );
    found
}
