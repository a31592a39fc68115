//! # engine_mods
//!
//! Mods are directories under a mods root, each described by a `mod.json`
//! manifest. This crate finds them, orders them so every mod loads after the
//! mods it depends on, and collects the systems each one registers.
//!
//! Systems are Rust code compiled into the host, so a mod's systems come
//! from a registration function the host maps to the mod's id through
//! [`EntryPoints`].
//!
//! ```rust,no_run
//! use engine_mods::{EntryPoints, ModResolver};
//!
//! fn register() -> anyhow::Result<Vec<Box<dyn engine_system::System>>> {
//!     Ok(Vec::new())
//! }
//!
//! let resolver = ModResolver::new("mods", EntryPoints::new().with("base", register));
//! let loaded = resolver.resolve()?;
//! println!("{} systems", loaded.systems.len());
//! # Ok::<(), engine_system::GraphError>(())
//! ```

pub mod discovery;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod resolver;

pub use discovery::discover;
pub use error::ManifestError;
pub use loader::{EntryPoint, EntryPoints, load_systems, resolve_load_order};
pub use manifest::{DEFAULT_VERSION, MANIFEST_FILE, ModManifest};
pub use resolver::{LoadedMods, ModResolver};
