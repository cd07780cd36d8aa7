use glam::Vec2;

use crate::{
    bbox::BoundingBox,
    error::{Error, Result},
    particle_store::Body,
};

/// Scheme used to advance particles in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Integrator {
    /// `v = v * friction + a * dt`, then `x += v * dt`.
    ///
    /// One force evaluation per step. Friction damps the energy drift of the scheme.
    #[default]
    SemiImplicitEuler,
    /// Kick-drift-kick leapfrog: `v += a * dt / 2`, `x += v * dt`, forces recomputed at the new
    /// positions, `v += a * dt / 2`, then `v *= friction`.
    ///
    /// Time reversible and more stable for larger time steps, at the cost of keeping the
    /// accelerations of the previous step around.
    Leapfrog,
}

/// Reflecting rectangular boundary.
///
/// When enabled, a particle crossing an edge is put back on it, taking its radius into account, and
/// the velocity component along that axis is reversed and scaled by `restitution`. Each axis is
/// handled independently.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Boundary {
    /// The rectangle particles are kept in.
    pub rect: BoundingBox,
    /// Whether particles are reflected at all.
    pub enabled: bool,
    /// Fraction of the normal velocity kept after a reflection.
    pub restitution: f32,
}

impl Default for Boundary {
    fn default() -> Self {
        Self {
            rect: BoundingBox::new(Vec2::new(-640.0, -360.0), Vec2::new(640.0, 360.0)),
            enabled: false,
            restitution: 0.9,
        }
    }
}

impl Boundary {
    /// Checks that the rectangle has an area and the restitution is a non-negative number.
    pub fn validate(&self) -> Result<()> {
        if self.rect.is_empty() || !self.rect.size().is_finite() {
            return Err(Error::EmptyBoundary {
                min: self.rect.min.to_array(),
                max: self.rect.max.to_array(),
            });
        }
        if !(self.restitution >= 0.0 && self.restitution.is_finite()) {
            return Err(Error::Restitution(self.restitution));
        }
        Ok(())
    }

    /// Reflects a particle of the given radius off the edges it crossed.
    #[inline]
    pub fn reflect(&self, position: &mut Vec2, velocity: &mut Vec2, radius: f32) {
        if !self.enabled {
            return;
        }

        let low = self.rect.min + radius;
        let high = self.rect.max - radius;

        for axis in 0..2 {
            if position[axis] < low[axis] {
                position[axis] = low[axis];
                velocity[axis] *= -self.restitution;
            } else if position[axis] > high[axis] {
                position[axis] = high[axis];
                velocity[axis] *= -self.restitution;
            }
        }
    }
}

/// One semi-implicit Euler step.
#[inline]
pub(crate) fn euler(body: Body<'_>, dt: f32, friction: f32, boundary: &Boundary) {
    *body.velocity = *body.velocity * friction + body.acceleration * dt;
    *body.position += *body.velocity * dt;
    boundary.reflect(body.position, body.velocity, body.radius);
}

/// First half of a leapfrog step: half kick with the previous accelerations, then a full drift.
#[inline]
pub(crate) fn kick_drift(body: Body<'_>, dt: f32, boundary: &Boundary) {
    *body.velocity += body.acceleration * (0.5 * dt);
    *body.position += *body.velocity * dt;
    boundary.reflect(body.position, body.velocity, body.radius);
}

/// Second half of a leapfrog step: half kick with the new accelerations, then friction.
#[inline]
pub(crate) fn kick(body: Body<'_>, dt: f32, friction: f32) {
    *body.velocity += body.acceleration * (0.5 * dt);
    *body.velocity *= friction;
}
