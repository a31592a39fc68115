//! Scheduling error types.

/// A dependency graph that cannot be ordered. Fatal: raised before any
/// system runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// `id` was reached again while its own dependencies were still being
    /// resolved. `path` is the chain from `id` back to itself.
    #[error("circular dependency detected involving '{id}' ({})", .path.join(" -> "))]
    Cycle { id: String, path: Vec<String> },

    /// `required_by` depends on `id`, which is not available.
    #[error("missing dependency: '{id}' required by '{required_by}' but not found")]
    Missing { id: String, required_by: String },
}

impl GraphError {
    /// The id the error is about: the cyclic node or the missing dependency.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Cycle { id, .. } | Self::Missing { id, .. } => id,
        }
    }
}

/// Errors returned by [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulerError {
    /// The system dependency graph is broken.
    #[error("cannot order systems: {0}")]
    Graph(#[from] GraphError),

    /// The delta time passed to a tick was negative or not finite.
    #[error("invalid delta time {0}: must be finite and >= 0")]
    InvalidDelta(f64),
}
