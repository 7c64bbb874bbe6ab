use clematis_core::id::ProductionStep;
use clematis_core::topology::TopologyError;

/// Errors raised while generating a production network.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeneratorError {
    #[error("a network needs at least one work station")]
    ZeroNodes,

    #[error("a network needs at least one production step")]
    ZeroSteps,

    /// Seriality outside `[0, 1]` or not a number.
    #[error("seriality must lie in [0, 1], got {0}")]
    InvalidSeriality(f64),

    /// The decrescent rate profile divides by `step_count - 1`.
    #[error("decrescent production level needs at least two production steps")]
    DecrescentNeedsMultipleSteps,

    /// A fixed first or last step was given no machines.
    #[error("production step {step} was assigned zero machines")]
    EmptyFixedStep { step: ProductionStep },

    /// Seeding every step needs more stations than the network has.
    #[error("{required} work stations are needed to seed every step, only {available} available")]
    NotEnoughNodes { required: u64, available: u32 },

    /// Stations are left over but every step they could go to is fixed.
    #[error("{remaining} work stations left over and no step accepts them")]
    NoScatterTarget { remaining: u32 },

    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),
}
