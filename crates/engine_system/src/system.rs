//! The system contract.

use anyhow::Result;
use engine_state::GameState;

/// A unit of simulation logic run once per tick.
///
/// # Examples
///
/// ```rust
/// use anyhow::Result;
/// use engine_state::GameState;
/// use engine_system::System;
///
/// struct Census;
///
/// impl System for Census {
///     fn id(&self) -> &str {
///         "base.census"
///     }
///
///     fn dependencies(&self) -> Vec<String> {
///         vec!["base.time".to_string()]
///     }
///
///     fn update(&mut self, state: &mut GameState, _dt: f64) -> Result<()> {
///         let regions = state.get_table("regions")?;
///         state.set_global("region_count", regions.len() as i64);
///         Ok(())
///     }
/// }
/// ```
pub trait System {
    /// Globally unique id, namespaced as `<mod>.<name>` (e.g. `"base.time"`).
    fn id(&self) -> &str;

    /// Ids of systems that must finish their update before this one starts.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Run one tick. All effects go through `state`: table replacements,
    /// globals, appended events.
    ///
    /// # Errors
    ///
    /// An error abandons the rest of this system's work for the tick. The
    /// scheduler logs it and moves on to the next system; a panic is caught
    /// and treated the same way.
    fn update(&mut self, state: &mut GameState, dt: f64) -> Result<()>;
}

/// A system built from a closure.
pub struct FnSystem<F> {
    id: String,
    dependencies: Vec<String>,
    update_fn: F,
}

impl<F> FnSystem<F>
where
    F: FnMut(&mut GameState, f64) -> Result<()>,
{
    /// Wrap `update_fn` as the system `id` running after `dependencies`.
    #[must_use]
    pub fn new(id: impl Into<String>, dependencies: &[&str], update_fn: F) -> Self {
        Self {
            id: id.into(),
            dependencies: dependencies.iter().map(|d| (*d).to_string()).collect(),
            update_fn,
        }
    }
}

impl<F> FnSystem<F>
where
    F: FnMut(&mut GameState, f64) -> Result<()> + 'static,
{
    /// Build and box, ready for registration.
    #[must_use]
    pub fn boxed(id: impl Into<String>, dependencies: &[&str], update_fn: F) -> Box<dyn System> {
        Box::new(Self::new(id, dependencies, update_fn))
    }
}

impl<F> System for FnSystem<F>
where
    F: FnMut(&mut GameState, f64) -> Result<()>,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn dependencies(&self) -> Vec<String> {
        self.dependencies.clone()
    }

    fn update(&mut self, state: &mut GameState, dt: f64) -> Result<()> {
        (self.update_fn)(state, dt)
    }
}

/// Text of a caught panic payload, for logging.
#[must_use]
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "non-string panic payload"
    }
}

impl<F> std::fmt::Debug for FnSystem<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSystem")
            .field("id", &self.id)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_system_contract() {
        let mut system = FnSystem::new("demo.flag", &["demo.base"], |state: &mut GameState, dt| {
            state.set_global("dt", dt);
            Ok(())
        });
        assert_eq!(system.id(), "demo.flag");
        assert_eq!(system.dependencies(), vec!["demo.base".to_string()]);

        let mut state = GameState::new();
        system.update(&mut state, 0.5).unwrap();
        assert_eq!(state.global("dt").and_then(|v| v.as_f64()), Some(0.5));
    }

    #[test]
    fn test_panic_message_payloads() {
        let literal = std::panic::catch_unwind(|| -> u8 { panic!("boom") }).unwrap_err();
        assert_eq!(panic_message(literal.as_ref()), "boom");

        let formatted = std::panic::catch_unwind(|| -> u8 { panic!("row {}", 3) }).unwrap_err();
        assert_eq!(panic_message(formatted.as_ref()), "row 3");

        let opaque = std::panic::catch_unwind(|| -> u8 { std::panic::panic_any(7_u8) }).unwrap_err();
        assert_eq!(panic_message(opaque.as_ref()), "non-string panic payload");
    }
}
