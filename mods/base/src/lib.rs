//! # mod_base
//!
//! The `base` mod. Its directory holds the manifest (`mod.json`) and the
//! starting tables (`data/regions.json`, `data/countries.json`); this crate
//! holds its systems:
//!
//! | id                | runs after        | does                                   |
//! |-------------------|-------------------|----------------------------------------|
//! | `base.time`       |                   | clock, speed, pause, hour/day events   |
//! | `base.territory`  | `base.time`       | region ownership changes               |
//! | `base.economy`    | `base.territory`  | tax changes, daily income              |
//! | `base.population` | `base.time`       | monthly births, aging, deaths          |
//! | `base.politics`   | `base.population` | weekly stability drift                 |

pub mod systems;

use engine_system::System;

pub use systems::{EconomySystem, PoliticsSystem, PopulationSystem, TerritorySystem, TimeSystem};

/// Id of this mod in `mod.json`.
pub const MOD_ID: &str = "base";

pub const REGIONS: &str = "regions";
pub const COUNTRIES: &str = "countries";

/// Column of `regions` holding the owning country's tag.
pub const OWNER: &str = "owner";

/// Registration entry point: every system this mod contributes.
///
/// # Errors
///
/// Never fails today; the signature is shared by all mod entry points.
pub fn register() -> anyhow::Result<Vec<Box<dyn System>>> {
    Ok(vec![
        Box::new(TimeSystem::new()),
        Box::new(TerritorySystem::new()),
        Box::new(EconomySystem::new()),
        Box::new(PopulationSystem::new()),
        Box::new(PoliticsSystem::new()),
    ])
}

#[cfg(test)]
mod tests {
    use engine_message::{Action, ActionKind};
    use engine_state::{GameState, Key};
    use engine_system::Engine;

    use super::*;
    use crate::systems::fixtures::seeded_state;

    fn engine() -> Engine {
        let mut engine = Engine::new();
        engine.register_systems(register().unwrap());
        engine
    }

    fn run(ticks: usize, dt: f64) -> GameState {
        let mut engine = engine();
        let mut state = seeded_state();
        for tick in 0..ticks {
            let actions = match tick {
                0 => vec![Action::server(ActionKind::SetGameSpeed { speed_level: 5 })],
                10 => vec![Action::new(
                    "local_player",
                    ActionKind::SetRegionOwner {
                        region_id: 6,
                        new_owner_tag: "ESP".to_string(),
                    },
                )],
                _ => Vec::new(),
            };
            let report = engine.step(&mut state, actions, dt).unwrap();
            assert!(report.is_clean(), "tick {tick} failed: {:?}", report.failed);
        }
        state
    }

    #[test]
    fn test_execution_order() {
        let mut engine = engine();
        engine.rebuild_execution_order().unwrap();
        let order = engine.execution_order();
        let at = |id: &str| order.iter().position(|n| n == id).unwrap();

        assert_eq!(order[0], "base.time");
        assert!(at("base.territory") < at("base.economy"));
        assert!(at("base.population") < at("base.politics"));
    }

    #[test]
    fn test_deterministic_over_many_ticks() {
        let a = run(400, 0.25);
        let b = run(400, 0.25);
        assert_eq!(a.snapshot_bytes().unwrap(), b.snapshot_bytes().unwrap());
    }

    #[test]
    fn test_simulation_moves_forward() {
        let state = run(120, 0.5);
        let seeded = seeded_state();

        // 0.5 s per tick at 0.6 s per day: about 100 days.
        assert!((99..=100).contains(&state.time.days_elapsed()));
        assert_eq!(state.tick(), 120);

        let treasury = |s: &GameState| {
            s.get_table(COUNTRIES)
                .unwrap()
                .get(&Key::from("FRA"), systems::economy::TREASURY)
                .and_then(|v| v.as_f64())
                .unwrap()
        };
        assert!(treasury(&state) > treasury(&seeded));

        let regions = state.get_table(REGIONS).unwrap();
        assert_eq!(
            regions.get(&Key::Int(6), OWNER).and_then(|v| v.as_str().map(str::to_string)),
            Some("ESP".to_string())
        );
    }
}
