//! # engine_system
//!
//! Systems and the scheduler that runs them.
//!
//! A system is a unit of simulation logic with a namespaced id
//! (`<mod>.<name>`), a list of ids that must run before it, and an `update`
//! called once per tick with exclusive access to the [`GameState`].
//!
//! The [`Engine`] keeps systems in a [`SystemRegistry`], computes a
//! dependency-respecting execution order whenever the set of systems changes,
//! and drives one tick at a time:
//!
//! 1. Rebuild the execution order if it is stale.
//! 2. Clear last tick's events.
//! 3. Advance the tick counter.
//! 4. Hand this tick's actions to the state.
//! 5. Run every system in order; a system that errors or panics is logged
//!    and skipped.
//!
//! ## Usage
//!
//! ```rust
//! use engine_state::GameState;
//! use engine_system::{Engine, FnSystem};
//!
//! let mut engine = Engine::new();
//! engine.register_systems([
//!     FnSystem::boxed("demo.count", &[], |state: &mut GameState, _dt| {
//!         state.set_global("seen", true);
//!         Ok(())
//!     }),
//! ]);
//!
//! let mut state = GameState::new();
//! let report = engine.step(&mut state, Vec::new(), 0.016).unwrap();
//! assert_eq!(report.tick, 1);
//! ```
//!
//! [`GameState`]: engine_state::GameState

pub mod error;
pub mod graph;
pub mod registry;
pub mod scheduler;
pub mod system;

pub use error::{GraphError, SchedulerError};
pub use graph::dependency_order;
pub use registry::SystemRegistry;
pub use scheduler::{Engine, TickReport};
pub use system::{FnSystem, System, panic_message};
