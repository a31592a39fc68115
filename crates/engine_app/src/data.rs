//! Loading the mods' starting tables.
//!
//! Every `<mod>/data/<name>.json` file holds an array of row objects and
//! becomes the table `<name>`, keyed by its `id` column. Mods are loaded in
//! load order, so a later mod can replace a table shipped by an earlier one.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use engine_mods::ModManifest;
use engine_state::GameState;
use engine_state::table::{DEFAULT_KEY_COLUMN, Table};
use tracing::{debug, info};

/// Load every mod's data tables into `state`. Returns the number of files
/// loaded.
///
/// # Errors
///
/// Fails on the first file that cannot be read or does not describe a valid
/// table.
pub fn load_mod_data(state: &mut GameState, mods: &[ModManifest]) -> Result<usize> {
    let mut loaded = 0;
    for manifest in mods {
        for path in data_files(&manifest.data_dir())? {
            let name = table_name(&path)?;
            let table = load_table(&path)?;
            let rows = table.len();
            if state.insert_table(name.clone(), table).is_some() {
                info!(table = %name, mod_id = %manifest.id, "table replaced by later mod");
            }
            debug!(table = %name, rows, file = %path.display(), "table loaded");
            loaded += 1;
        }
    }
    info!(files = loaded, tables = state.table_names().count(), "mod data loaded");
    Ok(loaded)
}

/// `*.json` files directly inside `dir`, sorted. A missing directory has none.
fn data_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn table_name(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .with_context(|| format!("no table name in {}", path.display()))
}

/// Parse one data file into a table.
pub fn load_table(path: &Path) -> Result<Table> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let json: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    let serde_json::Value::Array(rows) = json else {
        bail!("{} must hold an array of row objects", path.display());
    };
    Table::from_json_rows(DEFAULT_KEY_COLUMN, &rows)
        .with_context(|| format!("building table from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use engine_state::{Key, Value};

    use super::*;

    fn manifest(root: &Path, id: &str) -> ModManifest {
        ModManifest::parse(&format!(r#"{{"id":"{id}"}}"#), &root.join(id)).unwrap()
    }

    fn write_data(root: &Path, mod_id: &str, file: &str, body: &str) {
        let dir = root.join(mod_id).join("data");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), body).unwrap();
    }

    #[test]
    fn test_tables_named_by_file_stem() {
        let root = tempfile::tempdir().unwrap();
        write_data(root.path(), "base", "regions.json", r#"[{"id":1,"owner":"FRA"}]"#);
        write_data(root.path(), "base", "countries.json", r#"[{"id":"FRA","treasury":10.5}]"#);
        write_data(root.path(), "base", "notes.txt", "ignored");

        let mut state = GameState::new();
        let loaded = load_mod_data(&mut state, &[manifest(root.path(), "base")]).unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(state.table_names().collect::<Vec<_>>(), vec!["countries", "regions"]);
        let countries = state.get_table("countries").unwrap();
        assert_eq!(countries.get(&Key::from("FRA"), "treasury"), Some(Value::Float(10.5)));
    }

    #[test]
    fn test_later_mod_replaces_table() {
        let root = tempfile::tempdir().unwrap();
        write_data(root.path(), "base", "countries.json", r#"[{"id":"FRA"}]"#);
        write_data(root.path(), "dlc", "countries.json", r#"[{"id":"FRA"},{"id":"DEU"}]"#);

        let mut state = GameState::new();
        let mods = [manifest(root.path(), "base"), manifest(root.path(), "dlc")];
        load_mod_data(&mut state, &mods).unwrap();

        assert_eq!(state.get_table("countries").unwrap().len(), 2);
    }

    #[test]
    fn test_empty_data_file_loads_empty_table() {
        let root = tempfile::tempdir().unwrap();
        write_data(root.path(), "base", "wars.json", "[]");

        let mut state = GameState::new();
        let loaded = load_mod_data(&mut state, &[manifest(root.path(), "base")]).unwrap();
        assert_eq!(loaded, 1);
        assert!(state.get_table("wars").unwrap().is_empty());
    }

    #[test]
    fn test_mod_without_data_dir() {
        let root = tempfile::tempdir().unwrap();
        let mut state = GameState::new();
        let loaded = load_mod_data(&mut state, &[manifest(root.path(), "empty")]).unwrap();
        assert_eq!(loaded, 0);
    }

    #[test]
    fn test_invalid_files_are_fatal() {
        let root = tempfile::tempdir().unwrap();
        write_data(root.path(), "base", "regions.json", r#"{"id":1}"#);
        let err = load_mod_data(&mut GameState::new(), &[manifest(root.path(), "base")]).unwrap_err();
        assert!(err.to_string().contains("array"));

        let root = tempfile::tempdir().unwrap();
        write_data(root.path(), "base", "regions.json", r#"[{"id":1},{"id":1}]"#);
        let err = load_mod_data(&mut GameState::new(), &[manifest(root.path(), "base")]).unwrap_err();
        assert!(format!("{err:#}").contains("duplicate key"));
    }

    #[test]
    fn test_shipped_base_data_loads() {
        let base = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../mods/base");
        let manifest = ModManifest::load(&base).unwrap();
        let mut state = GameState::new();
        load_mod_data(&mut state, &[manifest]).unwrap();
        assert!(state.has_table(mod_base::REGIONS));
        assert!(state.has_table(mod_base::COUNTRIES));
    }
}
