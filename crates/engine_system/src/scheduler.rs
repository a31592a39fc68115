//! The scheduler: owns the registered systems and drives one tick at a time.
//!
//! The execution order is cached and recomputed lazily. Any registration
//! marks it dirty; the next [`Engine::step`] rebuilds it before running
//! anything. A rebuild that fails leaves the previous order in place and the
//! engine dirty, so the error comes back on every step until the system set
//! is fixed.

use std::panic::{self, AssertUnwindSafe};

use engine_message::Action;
use engine_state::GameState;
use tracing::{debug, error, info};

use crate::error::SchedulerError;
use crate::graph::dependency_order;
use crate::registry::SystemRegistry;
use crate::system::{System, panic_message};

/// Outcome of one [`Engine::step`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick counter after the step.
    pub tick: u64,
    /// Number of systems whose update was called.
    pub ran: usize,
    /// Ids of systems whose update returned an error or panicked, in
    /// execution order.
    pub failed: Vec<String>,
}

impl TickReport {
    /// Whether every system that ran succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// System registry plus cached execution order.
#[derive(Debug)]
pub struct Engine {
    registry: SystemRegistry,
    execution_order: Vec<String>,
    /// Whether the execution order must be recomputed before the next step.
    dirty: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine with no systems.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: SystemRegistry::new(),
            execution_order: Vec::new(),
            dirty: true,
        }
    }

    /// Register systems, replacing any already registered under the same id.
    pub fn register_systems(&mut self, systems: impl IntoIterator<Item = Box<dyn System>>) {
        for system in systems {
            self.register_system(system);
        }
    }

    /// Register one system and mark the execution order stale.
    pub fn register_system(&mut self, system: Box<dyn System>) {
        self.registry.register(system);
        self.dirty = true;
    }

    /// The registered systems.
    #[must_use]
    pub fn registry(&self) -> &SystemRegistry {
        &self.registry
    }

    /// The cached execution order. Stale while [`Engine::is_dirty`].
    #[must_use]
    pub fn execution_order(&self) -> &[String] {
        &self.execution_order
    }

    /// Whether the next step rebuilds the execution order first.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Recompute the execution order from the registered systems.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Graph`] on a dependency cycle or a
    /// dependency on an unregistered id. The previous order is kept.
    pub fn rebuild_execution_order(&mut self) -> Result<(), SchedulerError> {
        let declared: Vec<(String, Vec<String>)> = self
            .registry
            .iter()
            .map(|system| (system.id().to_string(), system.dependencies()))
            .collect();
        let nodes: Vec<(&str, Vec<&str>)> = declared
            .iter()
            .map(|(id, deps)| (id.as_str(), deps.iter().map(String::as_str).collect()))
            .collect();

        let order = dependency_order(&nodes)?;
        self.execution_order = order.into_iter().map(str::to_string).collect();
        self.dirty = false;

        info!(
            system_count = self.execution_order.len(),
            order = %self.execution_order.join(", "),
            "rebuilt system execution order"
        );
        Ok(())
    }

    /// Advance the simulation by one tick.
    ///
    /// Clears last tick's events, increments the tick counter, hands
    /// `actions` to the systems and runs every system once in dependency
    /// order. A system that returns an error or panics is logged and
    /// skipped; what it committed to the state before failing stays.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidDelta`] for a negative or non-finite
    /// `dt`, or [`SchedulerError::Graph`] when the execution order cannot be
    /// built. In both cases `state` is left untouched.
    pub fn step(
        &mut self,
        state: &mut GameState,
        actions: Vec<Action>,
        dt: f64,
    ) -> Result<TickReport, SchedulerError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(SchedulerError::InvalidDelta(dt));
        }
        if self.dirty {
            self.rebuild_execution_order()?;
        }

        state.events.clear();
        let tick = state.advance_tick();
        state.current_actions = actions;

        debug!(
            tick,
            dt,
            actions = state.current_actions.len(),
            systems = self.execution_order.len(),
            "tick start"
        );

        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };
        for id in &self.execution_order {
            let Some(system) = self.registry.get_mut(id) else {
                continue;
            };
            report.ran += 1;
            match panic::catch_unwind(AssertUnwindSafe(|| system.update(state, dt))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    error!(system = %id, tick, "system update failed: {err:#}");
                    report.failed.push(id.clone());
                }
                Err(payload) => {
                    error!(
                        system = %id,
                        tick,
                        panic = panic_message(payload.as_ref()),
                        "system update panicked"
                    );
                    report.failed.push(id.clone());
                }
            }
        }

        debug!(
            tick,
            events = state.events.len(),
            failed = report.failed.len(),
            "tick complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use anyhow::bail;
    use engine_message::{ActionKind, Event};
    use engine_state::{Column, Table, Value};

    use super::*;
    use crate::error::GraphError;
    use crate::system::FnSystem;

    type Log = Rc<RefCell<Vec<String>>>;

    /// A system that records its id into `log` when it runs.
    fn recording(id: &str, deps: &[&str], log: &Log) -> Box<dyn System> {
        let log = Rc::clone(log);
        let name = id.to_string();
        FnSystem::boxed(id, deps, move |_: &mut GameState, _| {
            log.borrow_mut().push(name.clone());
            Ok(())
        })
    }

    fn ran(log: &Log) -> Vec<String> {
        log.borrow().clone()
    }

    #[test]
    fn test_registered_backwards_runs_forwards() {
        let log = Log::default();
        let mut engine = Engine::new();
        engine.register_systems([
            recording("C", &["B"], &log),
            recording("B", &["A"], &log),
            recording("A", &[], &log),
        ]);

        let mut state = GameState::new();
        let report = engine.step(&mut state, Vec::new(), 0.1).unwrap();

        assert_eq!(ran(&log), vec!["A", "B", "C"]);
        assert_eq!(engine.execution_order(), ["A", "B", "C"]);
        assert_eq!(report.ran, 3);
        assert!(report.is_clean());
        assert!(!engine.is_dirty());
    }

    #[test]
    fn test_order_respects_dependencies() {
        let log = Log::default();
        let mut engine = Engine::new();
        let graph: &[(&str, &[&str])] = &[
            ("base.politics", &["base.population"]),
            ("base.economy", &["base.territory"]),
            ("base.population", &["base.time"]),
            ("base.territory", &["base.time"]),
            ("base.time", &[]),
        ];
        engine.register_systems(graph.iter().map(|(id, deps)| recording(id, deps, &log)));
        engine.step(&mut GameState::new(), Vec::new(), 0.0).unwrap();

        let order = ran(&log);
        let at = |id: &str| order.iter().position(|n| n == id).unwrap();
        for (id, deps) in graph {
            for dep in *deps {
                assert!(at(dep) < at(id), "{dep} must run before {id}");
            }
        }
    }

    #[test]
    fn test_cycle_fails_before_any_update() {
        let log = Log::default();
        let mut engine = Engine::new();
        engine.register_systems([
            recording("solo", &[], &log),
            recording("a", &["b"], &log),
            recording("b", &["a"], &log),
        ]);

        let mut state = GameState::new();
        let err = engine.step(&mut state, Vec::new(), 0.1).unwrap_err();

        assert!(matches!(err, SchedulerError::Graph(GraphError::Cycle { .. })));
        assert!(err.to_string().contains("circular dependency"));
        assert!(ran(&log).is_empty());
        assert_eq!(state.tick(), 0);
        assert!(engine.is_dirty());
    }

    #[test]
    fn test_missing_dependency_names_the_id() {
        let mut engine = Engine::new();
        engine.register_system(FnSystem::boxed(
            "base.orphan",
            &["nonexistent.id"],
            |_: &mut GameState, _| Ok(()),
        ));

        let err = engine.rebuild_execution_order().unwrap_err();
        assert_eq!(
            err,
            SchedulerError::Graph(GraphError::Missing {
                id: "nonexistent.id".to_string(),
                required_by: "base.orphan".to_string(),
            })
        );
        assert!(err.to_string().contains("nonexistent.id"));
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_order() {
        let log = Log::default();
        let mut engine = Engine::new();
        engine.register_systems([recording("a", &[], &log), recording("b", &["a"], &log)]);
        engine.rebuild_execution_order().unwrap();

        engine.register_system(recording("c", &["missing"], &log));
        assert!(engine.is_dirty());
        assert!(engine.rebuild_execution_order().is_err());
        assert_eq!(engine.execution_order(), ["a", "b"]);
        assert!(engine.is_dirty());
    }

    #[test]
    fn test_overwrite_replaces_and_marks_dirty() {
        let log = Log::default();
        let mut engine = Engine::new();
        engine.register_system(recording("a", &[], &log));
        engine.step(&mut GameState::new(), Vec::new(), 0.0).unwrap();
        assert!(!engine.is_dirty());

        engine.register_system(FnSystem::boxed("a", &[], |state: &mut GameState, _| {
            state.set_global("replaced", true);
            Ok(())
        }));
        assert!(engine.is_dirty());
        assert_eq!(engine.registry().len(), 1);

        let mut state = GameState::new();
        engine.step(&mut state, Vec::new(), 0.0).unwrap();
        assert_eq!(state.global("replaced"), Some(&Value::Bool(true)));
        assert_eq!(ran(&log), vec!["a"]);
    }

    fn ids_table(ids: Vec<i64>) -> Table {
        Table::new("id", vec![Column::new("id", ids)]).unwrap()
    }

    #[test]
    fn test_failing_system_does_not_stop_the_tick() {
        let mut engine = Engine::new();
        engine.register_systems([
            FnSystem::boxed("earlier", &[], |state: &mut GameState, _| {
                state.update_table("countries", ids_table(vec![1, 2, 3]));
                Ok(())
            }),
            FnSystem::boxed("first", &["earlier"], |state: &mut GameState, _| {
                state.update_table("regions", ids_table(vec![1]));
                bail!("lookup failed after commit");
            }),
            FnSystem::boxed("second", &["first"], |state: &mut GameState, _| {
                state.set_global("second_ran", true);
                Ok(())
            }),
        ]);

        let mut state = GameState::new();
        let report = engine.step(&mut state, Vec::new(), 0.1).unwrap();

        assert_eq!(report.failed, vec!["first".to_string()]);
        assert_eq!(report.ran, 3);
        assert_eq!(*state.get_table("countries").unwrap(), ids_table(vec![1, 2, 3]));
        assert!(state.has_table("regions"));
        assert_eq!(state.global("second_ran"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_panicking_system_does_not_stop_the_tick() {
        let mut engine = Engine::new();
        engine.register_systems([
            FnSystem::boxed("mod.setup", &[], |state: &mut GameState, _| {
                state.update_table("countries", ids_table(vec![7, 8]));
                Ok(())
            }),
            FnSystem::boxed("mod.broken", &["mod.setup"], |state: &mut GameState, _| {
                let rows: Vec<i64> = Vec::new();
                state.set_global("unreachable", rows[3]);
                Ok(())
            }),
            FnSystem::boxed("mod.after", &["mod.broken"], |state: &mut GameState, _| {
                state.set_global("after_ran", true);
                Ok(())
            }),
        ]);

        let mut state = GameState::new();
        let report = engine.step(&mut state, Vec::new(), 0.1).unwrap();
        assert_eq!(report.failed, vec!["mod.broken".to_string()]);
        assert_eq!(report.ran, 3);
        assert_eq!(state.global("after_ran"), Some(&Value::Bool(true)));
        assert!(state.global("unreachable").is_none());
        assert_eq!(*state.get_table("countries").unwrap(), ids_table(vec![7, 8]));

        let report = engine.step(&mut state, Vec::new(), 0.1).unwrap();
        assert_eq!(report.tick, 2);
        assert_eq!(report.failed, vec!["mod.broken".to_string()]);
    }

    #[test]
    fn test_events_visible_same_tick_cleared_next() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_by_reader = Rc::clone(&seen);

        let mut engine = Engine::new();
        engine.register_systems([
            FnSystem::boxed("writer", &[], |state: &mut GameState, _| {
                if state.tick() == 1 {
                    state.push_event(Event::TaxChanged {
                        country_tag: "FRA".to_string(),
                        tax_rate: 0.2,
                    });
                }
                Ok(())
            }),
            FnSystem::boxed("reader", &["writer"], move |state: &mut GameState, _| {
                seen_by_reader.borrow_mut().push(state.events.len());
                Ok(())
            }),
        ]);

        let mut state = GameState::new();
        engine.step(&mut state, Vec::new(), 0.1).unwrap();
        assert_eq!(state.events.len(), 1);
        engine.step(&mut state, Vec::new(), 0.1).unwrap();
        assert!(state.events.is_empty());
        assert_eq!(*seen.borrow(), vec![1, 0]);
    }

    #[test]
    fn test_step_hands_over_actions_and_counts_ticks() {
        let mut engine = Engine::new();
        engine.register_system(FnSystem::boxed("echo", &[], |state: &mut GameState, _| {
            let count = state.current_actions.len() as i64;
            state.set_global("actions_seen", count);
            Ok(())
        }));

        let mut state = GameState::new();
        let actions = vec![
            Action::server(ActionKind::SetPaused { is_paused: true }),
            Action::server(ActionKind::SetGameSpeed { speed_level: 3 }),
        ];
        let report = engine.step(&mut state, actions, 0.1).unwrap();
        assert_eq!(report.tick, 1);
        assert_eq!(state.global("actions_seen"), Some(&Value::Int(2)));

        let report = engine.step(&mut state, Vec::new(), 0.1).unwrap();
        assert_eq!(report.tick, 2);
        assert_eq!(state.tick(), 2);
        assert!(state.current_actions.is_empty());
    }

    #[test]
    fn test_invalid_delta_rejected() {
        let mut engine = Engine::new();
        let mut state = GameState::new();
        for dt in [-0.5, f64::NAN, f64::INFINITY] {
            let err = engine.step(&mut state, Vec::new(), dt).unwrap_err();
            assert!(matches!(err, SchedulerError::InvalidDelta(_)));
        }
        assert_eq!(state.tick(), 0);
    }

    #[test]
    fn test_empty_engine_still_ticks() {
        let mut engine = Engine::new();
        let mut state = GameState::new();
        let report = engine.step(&mut state, Vec::new(), 0.0).unwrap();
        assert_eq!(report, TickReport { tick: 1, ran: 0, failed: Vec::new() });
    }
}
