use thiserror::Error;

/// Errors returned when a configuration value or a setter argument is rejected.
///
/// Stepping the simulation never fails; only the values it is set up with are validated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The particle capacity is zero.
    #[error("particle capacity must be at least 1")]
    ZeroCapacity,

    /// The number of particle kinds is outside `1..=MAX_KINDS`.
    #[error("number of particle kinds must be in 1..=16, got {0}")]
    KindCount(usize),

    /// A particle kind does not exist in the interaction matrix.
    #[error("particle kind {kind} is out of range for {num_kinds} kinds")]
    KindOutOfRange {
        /// The rejected kind.
        kind: usize,
        /// The number of kinds of the matrix.
        num_kinds: usize,
    },

    /// A particle id does not refer to a slot in use.
    #[error("no particle in slot {index}, only {len} slots are in use")]
    UnknownParticle {
        /// Slot of the rejected id.
        index: usize,
        /// The number of slots in use.
        len: usize,
    },

    /// The interaction radius is not a positive finite number.
    #[error("interaction radius must be positive and finite, got {0}")]
    InteractionRadius(f32),

    /// The repulsion core fraction is outside `(0, 1)`.
    #[error("beta must lie in (0, 1), got {0}")]
    Beta(f32),

    /// The minimum distance is negative or not finite.
    #[error("minimum distance must be non-negative and finite, got {0}")]
    MinDistance(f32),

    /// The force scale is not finite.
    #[error("force scale must be finite, got {0}")]
    ForceScale(f32),

    /// The particle radius is negative or not finite.
    #[error("particle radius must be non-negative and finite, got {0}")]
    ParticleRadius(f32),

    /// The friction factor is outside `[0, 1]`.
    #[error("friction factor must lie in [0, 1], got {0}")]
    Friction(f32),

    /// The restitution coefficient is negative or not finite.
    #[error("restitution must be non-negative and finite, got {0}")]
    Restitution(f32),

    /// The boundary rectangle has no area.
    #[error("boundary is empty: min {min:?}, max {max:?}")]
    EmptyBoundary {
        /// Lower corner of the rejected rectangle.
        min: [f32; 2],
        /// Upper corner of the rejected rectangle.
        max: [f32; 2],
    },

    /// The Barnes-Hut opening angle is negative or not finite.
    #[error("theta must be non-negative and finite, got {0}")]
    Theta(f32),

    /// A gravity parameter is not a positive finite number.
    #[error("gravity parameter `{name}` must be positive and finite, got {value}")]
    Gravity {
        /// Name of the rejected parameter.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
