use crate::{
    error::{Error, Result},
    integrator::{Boundary, Integrator},
    interaction::MAX_KINDS,
    law::{Gravity, BETA},
};

/// Force law driving the simulation, together with the compute method evaluating it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ForceModel {
    /// Kind-dependent short-range forces, evaluated exactly on a uniform grid.
    #[default]
    ParticleLife,
    /// Softened gravity between all particles, approximated with a Barnes-Hut quadtree.
    Gravity,
}

/// Parameters of a [`World`](crate::world::World).
///
/// Every field can be set directly; [`World::new`](crate::world::World::new) calls
/// [`validate`](Self::validate) before using them.
///
/// ```
/// # use particle_life::config::SimulationConfig;
/// let config = SimulationConfig {
///     num_kinds: 8,
///     friction: 0.9,
///     ..SimulationConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// Maximum number of particles. Creating more recycles existing ones.
    pub max_particles: usize,
    /// Number of particle kinds, in `1..=16`.
    pub num_kinds: usize,
    /// Distance beyond which particles do not interact.
    pub interaction_radius: f32,
    /// Fraction of the interaction radius inside which every particle repels.
    pub beta: f32,
    /// Pairs closer than this distance are skipped.
    pub min_distance: f32,
    /// Multiplier applied to particle life accelerations.
    pub force_scale: f32,
    /// Factor velocities are multiplied by on every step, in `[0, 1]`.
    pub friction: f32,
    /// Reflecting boundary. Also the domain of the grid while enabled.
    pub boundary: Boundary,
    /// Radius given to spawned particles.
    pub particle_radius: f32,
    /// Time integration scheme.
    pub integrator: Integrator,
    /// Force law and compute method.
    pub force_model: ForceModel,
    /// Parameters of [`ForceModel::Gravity`].
    pub gravity: Gravity,
    /// Barnes-Hut opening parameter used with [`ForceModel::Gravity`].
    pub theta: f32,
    /// Seed of the world's random number generator. Drawn from entropy if `None`.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_particles: 1_000_000,
            num_kinds: 5,
            interaction_radius: 60.0,
            beta: BETA,
            min_distance: 0.1,
            force_scale: 1.0,
            friction: 0.85,
            boundary: Boundary::default(),
            particle_radius: 5.0,
            integrator: Integrator::default(),
            force_model: ForceModel::default(),
            gravity: Gravity::default(),
            theta: 0.5,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Checks every parameter, returning the first invalid one.
    pub fn validate(&self) -> Result<()> {
        if self.max_particles == 0 {
            return Err(Error::ZeroCapacity);
        }
        validate_num_kinds(self.num_kinds)?;
        validate_interaction_radius(self.interaction_radius)?;
        if !(self.beta > 0.0 && self.beta < 1.0) {
            return Err(Error::Beta(self.beta));
        }
        if !(self.min_distance >= 0.0 && self.min_distance.is_finite()) {
            return Err(Error::MinDistance(self.min_distance));
        }
        if !self.force_scale.is_finite() {
            return Err(Error::ForceScale(self.force_scale));
        }
        validate_friction(self.friction)?;
        self.boundary.validate()?;
        if !(self.particle_radius >= 0.0 && self.particle_radius.is_finite()) {
            return Err(Error::ParticleRadius(self.particle_radius));
        }
        validate_gravity(&self.gravity)?;
        validate_theta(self.theta)
    }
}

pub(crate) fn validate_num_kinds(num_kinds: usize) -> Result<()> {
    if (1..=MAX_KINDS).contains(&num_kinds) {
        Ok(())
    } else {
        Err(Error::KindCount(num_kinds))
    }
}

pub(crate) fn validate_interaction_radius(radius: f32) -> Result<()> {
    if radius > 0.0 && radius.is_finite() {
        Ok(())
    } else {
        Err(Error::InteractionRadius(radius))
    }
}

pub(crate) fn validate_friction(friction: f32) -> Result<()> {
    if (0.0..=1.0).contains(&friction) {
        Ok(())
    } else {
        Err(Error::Friction(friction))
    }
}

pub(crate) fn validate_theta(theta: f32) -> Result<()> {
    if theta >= 0.0 && theta.is_finite() {
        Ok(())
    } else {
        Err(Error::Theta(theta))
    }
}

fn validate_gravity(gravity: &Gravity) -> Result<()> {
    let Gravity {
        g,
        softening,
        max_force,
    } = *gravity;

    for (name, value) in [("g", g), ("softening", softening), ("max_force", max_force)] {
        if !(value > 0.0 && value.is_finite()) {
            return Err(Error::Gravity { name, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BoundingBox;
    use glam::Vec2;

    #[test]
    fn default_is_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_invalid_values() {
        let default = SimulationConfig::default;

        let cases = [
            (
                SimulationConfig {
                    max_particles: 0,
                    ..default()
                },
                Error::ZeroCapacity,
            ),
            (
                SimulationConfig {
                    num_kinds: 17,
                    ..default()
                },
                Error::KindCount(17),
            ),
            (
                SimulationConfig {
                    interaction_radius: 0.0,
                    ..default()
                },
                Error::InteractionRadius(0.0),
            ),
            (
                SimulationConfig {
                    beta: 1.0,
                    ..default()
                },
                Error::Beta(1.0),
            ),
            (
                SimulationConfig {
                    friction: 1.5,
                    ..default()
                },
                Error::Friction(1.5),
            ),
            (
                SimulationConfig {
                    theta: -0.1,
                    ..default()
                },
                Error::Theta(-0.1),
            ),
            (
                SimulationConfig {
                    gravity: Gravity {
                        softening: 0.0,
                        ..Gravity::default()
                    },
                    ..default()
                },
                Error::Gravity {
                    name: "softening",
                    value: 0.0,
                },
            ),
        ];

        for (config, error) in cases {
            assert_eq!(config.validate(), Err(error));
        }
    }

    #[test]
    fn rejects_nan() {
        let config = SimulationConfig {
            interaction_radius: f32::NAN,
            ..SimulationConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InteractionRadius(_))));

        let config = SimulationConfig {
            friction: f32::NAN,
            ..SimulationConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Friction(_))));
    }

    #[test]
    fn rejects_empty_boundary() {
        let mut config = SimulationConfig::default();
        config.boundary.rect = BoundingBox::new(Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0));

        assert!(matches!(config.validate(), Err(Error::EmptyBoundary { .. })));
    }
}
