use glam::Vec2;

/// Handle to a particle slot of a [`ParticleStore`](crate::particle_store::ParticleStore).
///
/// Handles are plain indices. A slot can be recycled for another particle once it has been
/// deactivated, or when the store is saturated, so a handle does not guarantee that the particle
/// behind it is the one it was created for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticleId(pub(crate) u32);

impl ParticleId {
    /// Index of the slot in the store's arrays.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A copy of the state of one particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Handle of the particle.
    pub id: ParticleId,
    /// Position of the particle.
    pub position: Vec2,
    /// Velocity of the particle.
    pub velocity: Vec2,
    /// Acceleration computed during the last step.
    pub acceleration: Vec2,
    /// Radius of the particle, used for drawing and boundary collisions.
    pub radius: f32,
    /// Kind of the particle, selecting its row of the interaction matrix.
    pub kind: u8,
}

/// Per-particle record laid out for instanced drawing.
///
/// With the `bytemuck` feature, slices of instances can be cast to bytes and uploaded to a GPU
/// buffer directly.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "bytemuck", derive(bytemuck::Pod, bytemuck::Zeroable))]
pub struct ParticleInstance {
    /// Position of the particle.
    pub position: [f32; 2],
    /// Radius of the particle.
    pub radius: f32,
    /// Kind of the particle.
    pub kind: u32,
}

impl From<Particle> for ParticleInstance {
    #[inline]
    fn from(particle: Particle) -> Self {
        Self {
            position: particle.position.to_array(),
            radius: particle.radius,
            kind: particle.kind as u32,
        }
    }
}
