use glam::Vec2;
use rand::{rngs::StdRng, Rng, SeedableRng};

#[cfg(not(feature = "parallel"))]
use crate::compute_method::sequential as backend;
#[cfg(feature = "parallel")]
use crate::compute_method::parallel as backend;

use crate::{
    bbox::BoundingBox,
    compute_method::{grid::UniformGrid, tree::Quadtree, ComputeMethod},
    config::{self, ForceModel, SimulationConfig},
    error::{Error, Result},
    integrator::{self, Integrator},
    interaction::InteractionMatrix,
    law::ParticleLife,
    particle::{Particle, ParticleId, ParticleInstance},
    particle_store::ParticleStore,
};

/// Largest time step [`frame_time_step`] hands out, in seconds.
pub const MAX_TIME_STEP: f32 = 0.05;

/// Time step for a frame that took `raw` seconds, played at `speed` times real time.
///
/// The result is clamped to `[0, MAX_TIME_STEP]` so that a stalled frame does not make the
/// simulation explode.
///
/// ```
/// # use particle_life::world::{frame_time_step, MAX_TIME_STEP};
/// assert_eq!(frame_time_step(0.016, 2.0), 0.032);
/// assert_eq!(frame_time_step(1.0, 1.0), MAX_TIME_STEP);
/// ```
#[inline]
pub fn frame_time_step(raw: f32, speed: f32) -> f32 {
    let dt = raw * speed;
    if dt > 0.0 {
        dt.min(MAX_TIME_STEP)
    } else {
        0.0
    }
}

/// How the kinds of emitted particles are chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KindSelector {
    /// Every particle gets this kind.
    Fixed(u8),
    /// Each particle gets a kind drawn uniformly by the world's generator.
    #[default]
    Random,
    /// Kinds are handed out in turn, continuing where the previous emission stopped.
    Cycle,
}

/// A burst of particles created by [`World::emit`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Emission {
    /// Number of particles to create.
    pub count: usize,
    /// Centre of the disc particles are placed in.
    pub centre: Vec2,
    /// Radius of the disc particles are placed in.
    pub spread: f32,
    /// Initial velocity of every particle.
    pub velocity: Vec2,
    /// Radius of the disc of random velocity offsets added to `velocity`.
    pub velocity_jitter: f32,
    /// Kind of the particles.
    pub kind: KindSelector,
    /// Radius of the particles, or the configured particle radius if `None`.
    pub radius: Option<f32>,
}

impl Default for Emission {
    fn default() -> Self {
        Self {
            count: 1,
            centre: Vec2::ZERO,
            spread: 10.0,
            velocity: Vec2::ZERO,
            velocity_jitter: 0.0,
            kind: KindSelector::default(),
            radius: None,
        }
    }
}

/// Copy of the render state of a [`World`], tagged with the step it was taken after.
///
/// Lets a renderer on another thread draw while the world keeps stepping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    /// Value of [`World::generation`] when the snapshot was taken.
    pub generation: u64,
    /// One record per active particle.
    pub instances: Vec<ParticleInstance>,
}

/// A particle life simulation: the particles, their interactions and everything needed to step
/// them.
///
/// Every step rebuilds the spatial index of the configured [`ForceModel`], computes the acceleration
/// of every active particle from it, integrates, then increments [`generation`](Self::generation).
/// Each phase completes before the next one starts.
///
/// ```
/// # use particle_life::prelude::*;
/// let mut world = World::new(SimulationConfig {
///     seed: Some(7),
///     ..SimulationConfig::default()
/// })?;
///
/// world.emit(&Emission {
///     count: 100,
///     spread: 200.0,
///     ..Emission::default()
/// });
/// world.step(frame_time_step(0.016, 1.0));
///
/// assert_eq!(world.active_particle_count(), 100);
/// assert_eq!(world.generation(), 1);
/// # Ok::<(), particle_life::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct World {
    config: SimulationConfig,
    store: ParticleStore,
    matrix: InteractionMatrix,
    grid: backend::Grid,
    barnes_hut: backend::BarnesHut,
    rng: StdRng,
    generation: u64,
    next_kind: usize,
    stale_accelerations: bool,
}

impl World {
    /// Creates an empty world with a randomized interaction matrix.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut matrix = InteractionMatrix::new(config.num_kinds)?;
        matrix.randomize(rng.gen());

        log::debug!(
            "world created: {} kinds, capacity {}, {:?} with {:?}",
            config.num_kinds,
            config.max_particles,
            config.force_model,
            config.integrator
        );

        Ok(Self {
            store: ParticleStore::new(config.max_particles),
            matrix,
            grid: backend::Grid::default(),
            barnes_hut: backend::BarnesHut::new(config.theta),
            rng,
            generation: 0,
            next_kind: 0,
            stale_accelerations: true,
            config,
        })
    }

    /// Creates a particle, recycling an inactive or the oldest one once the capacity is reached.
    pub fn spawn(&mut self, position: Vec2, velocity: Vec2, kind: u8) -> ParticleId {
        let radius = self.config.particle_radius;
        self.place(position, velocity, kind, radius)
    }

    /// Creates a burst of particles around a point.
    pub fn emit(&mut self, emission: &Emission) -> Vec<ParticleId> {
        let radius = emission.radius.unwrap_or(self.config.particle_radius);

        let ids: Vec<_> = (0..emission.count)
            .map(|_| {
                let position = emission.centre + random_in_disc(&mut self.rng, emission.spread);
                let velocity =
                    emission.velocity + random_in_disc(&mut self.rng, emission.velocity_jitter);
                let kind = self.select_kind(emission.kind);

                self.place(position, velocity, kind, radius)
            })
            .collect();

        log::debug!("emitted {} particles around {}", ids.len(), emission.centre);
        ids
    }

    fn select_kind(&mut self, selector: KindSelector) -> u8 {
        let num_kinds = self.matrix.num_kinds();
        match selector {
            KindSelector::Fixed(kind) => kind,
            KindSelector::Random => self.rng.gen_range(0..num_kinds) as u8,
            KindSelector::Cycle => {
                let kind = self.next_kind % num_kinds;
                self.next_kind = kind + 1;
                kind as u8
            }
        }
    }

    fn place(&mut self, position: Vec2, velocity: Vec2, kind: u8, radius: f32) -> ParticleId {
        let id = self.store.create();
        self.store.set_position(id, position);
        self.store.set_velocity(id, velocity);
        self.store.set_kind(id, kind);
        self.store.set_radius(id, radius);
        self.stale_accelerations = true;
        id
    }

    /// Advances the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        debug_assert!(dt > 0.0, "time step must be positive, got {dt}");

        let friction = self.config.friction;
        let boundary = self.config.boundary;

        match self.config.integrator {
            Integrator::SemiImplicitEuler => {
                self.compute_accelerations();
                self.store
                    .for_each_body(|body| integrator::euler(body, dt, friction, &boundary));
                self.stale_accelerations = true;
            }
            Integrator::Leapfrog => {
                // The first kick needs the accelerations at the current positions.
                if self.stale_accelerations {
                    self.compute_accelerations();
                }
                self.store
                    .for_each_body(|body| integrator::kick_drift(body, dt, &boundary));
                self.compute_accelerations();
                self.store
                    .for_each_body(|body| integrator::kick(body, dt, friction));
                self.stale_accelerations = false;
            }
        }

        self.generation += 1;
        log::trace!(
            "step {} done: dt {dt}, {} particles",
            self.generation,
            self.store.len()
        );
    }

    fn compute_accelerations(&mut self) {
        let config = &self.config;
        let (particles, accelerations) = self.store.view_with_accelerations();

        match config.force_model {
            ForceModel::ParticleLife => {
                let law = ParticleLife {
                    matrix: &self.matrix,
                    r_max: config.interaction_radius,
                    beta: config.beta,
                    min_distance: config.min_distance,
                    force_scale: config.force_scale,
                };

                let domain = config.boundary;
                self.grid
                    .set_domain(domain.enabled.then_some(domain.rect));
                self.grid.compute(particles, &law, accelerations);
            }
            ForceModel::Gravity => {
                self.barnes_hut.theta = config.theta;
                self.barnes_hut
                    .compute(particles, &config.gravity, accelerations);
            }
        }
    }

    /// Number of steps taken since the world was created.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Sets the strength kind `a` feels towards kind `b`, clamped to `[-1, 1]`.
    pub fn set_interaction_strength(&mut self, a: usize, b: usize, strength: f32) -> Result<()> {
        self.matrix.set(a, b, strength)?;
        self.stale_accelerations = true;
        Ok(())
    }

    /// Draws a new interaction matrix and returns the seed it was drawn with.
    ///
    /// Without a seed, one is drawn from the world's generator, so a seeded world stays
    /// reproducible. Randomizing again with the returned seed gives the same matrix.
    pub fn randomize_interactions(&mut self, seed: Option<u64>) -> u64 {
        let seed = seed.unwrap_or_else(|| self.rng.gen());
        self.matrix.randomize(seed);
        self.stale_accelerations = true;
        seed
    }

    /// Number of particle slots in use, active or not.
    #[inline]
    pub fn particle_count(&self) -> usize {
        self.store.len()
    }

    /// Number of active particles.
    #[inline]
    pub fn active_particle_count(&self) -> usize {
        self.store.active_count()
    }

    /// Iterates over the active particles.
    pub fn iter(&self) -> impl Iterator<Item = Particle> + '_ {
        self.store.iter()
    }

    /// Positions of all slots. Check [`store`](Self::store) for which are active.
    #[inline]
    pub fn positions(&self) -> &[Vec2] {
        self.store.positions()
    }

    /// Kinds of all slots.
    #[inline]
    pub fn kinds(&self) -> &[u8] {
        self.store.kinds()
    }

    /// Radii of all slots.
    #[inline]
    pub fn radii(&self) -> &[f32] {
        self.store.radii()
    }

    /// Render records of the active particles.
    pub fn instances(&self) -> impl Iterator<Item = ParticleInstance> + '_ {
        self.iter().map(ParticleInstance::from)
    }

    /// Overwrites `snapshot` with the current render state, reusing its allocation.
    pub fn snapshot_into(&self, snapshot: &mut Snapshot) {
        snapshot.generation = self.generation;
        snapshot.instances.clear();
        snapshot.instances.extend(self.instances());
    }

    /// Sets the velocity of a particle.
    ///
    /// # Panics
    ///
    /// If `id` was handed out before the last [`clear`](Self::clear).
    #[inline]
    pub fn set_velocity(&mut self, id: ParticleId, velocity: Vec2) {
        self.store.set_velocity(id, velocity);
    }

    /// Velocities of all slots, for collaborators writing velocities back.
    #[inline]
    pub fn velocities_mut(&mut self) -> &mut [Vec2] {
        self.store.velocities_mut()
    }

    /// Activates or deactivates a particle. Deactivated slots are reused first by new particles.
    ///
    /// # Panics
    ///
    /// If `id` was handed out before the last [`clear`](Self::clear).
    pub fn set_active(&mut self, id: ParticleId, active: bool) {
        self.store.set_active(id, active);
        self.stale_accelerations = true;
    }

    /// Removes every particle. The interaction matrix and the generation are kept.
    pub fn clear(&mut self) {
        self.store.clear();
        self.next_kind = 0;
        self.stale_accelerations = true;
        log::debug!("world cleared");
    }

    /// Changes the number of kinds, resetting every interaction strength to zero.
    ///
    /// Existing particles keep their kind. Those whose kind no longer exists neither attract nor
    /// are attracted by anything but still repel at close range.
    pub fn set_num_kinds(&mut self, num_kinds: usize) -> Result<()> {
        config::validate_num_kinds(num_kinds)?;
        self.matrix.init(num_kinds)?;
        self.config.num_kinds = num_kinds;
        self.next_kind = 0;
        self.stale_accelerations = true;
        Ok(())
    }

    /// Sets the distance beyond which particles do not interact.
    pub fn set_interaction_radius(&mut self, radius: f32) -> Result<()> {
        config::validate_interaction_radius(radius)?;
        self.config.interaction_radius = radius;
        self.stale_accelerations = true;
        Ok(())
    }

    /// Sets the factor velocities are multiplied by on every step.
    pub fn set_friction(&mut self, friction: f32) -> Result<()> {
        config::validate_friction(friction)?;
        self.config.friction = friction;
        Ok(())
    }

    /// Sets the boundary rectangle, without changing whether it is enabled.
    pub fn set_boundary(&mut self, rect: BoundingBox) -> Result<()> {
        let boundary = integrator::Boundary {
            rect,
            ..self.config.boundary
        };
        boundary.validate()?;
        self.config.boundary = boundary;
        Ok(())
    }

    /// Enables or disables the reflecting boundary.
    pub fn set_bounds_enabled(&mut self, enabled: bool) {
        self.config.boundary.enabled = enabled;
    }

    /// Sets the Barnes-Hut opening parameter.
    pub fn set_theta(&mut self, theta: f32) -> Result<()> {
        config::validate_theta(theta)?;
        self.config.theta = theta;
        self.stale_accelerations = true;
        Ok(())
    }

    /// Sets the time integration scheme.
    pub fn set_integrator(&mut self, integrator: Integrator) {
        if integrator != self.config.integrator {
            log::debug!("integrator switched to {integrator:?}");
        }
        self.config.integrator = integrator;
    }

    /// Sets the force law and compute method.
    pub fn set_force_model(&mut self, force_model: ForceModel) {
        self.config.force_model = force_model;
        self.stale_accelerations = true;
    }

    /// The current configuration, including changes made through setters.
    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The interaction strengths between kinds.
    #[inline]
    pub fn matrix(&self) -> &InteractionMatrix {
        &self.matrix
    }

    /// The particles.
    #[inline]
    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    /// The grid built during the last particle life force computation.
    #[inline]
    pub fn grid(&self) -> &UniformGrid {
        self.grid.index()
    }

    /// The quadtree built during the last gravity force computation.
    #[inline]
    pub fn quadtree(&self) -> &Quadtree {
        self.barnes_hut.tree()
    }

    /// Looks a particle up, failing if the id is stale or its kind is not one of the configured
    /// kinds.
    pub fn particle(&self, id: ParticleId) -> Result<Particle> {
        if id.index() >= self.store.len() {
            return Err(Error::UnknownParticle {
                index: id.index(),
                len: self.store.len(),
            });
        }

        let particle = self.store.get(id);
        let num_kinds = self.matrix.num_kinds();

        if particle.kind as usize >= num_kinds {
            return Err(Error::KindOutOfRange {
                kind: particle.kind as usize,
                num_kinds,
            });
        }
        Ok(particle)
    }
}

// Uniform point in the disc of the given radius around the origin.
fn random_in_disc(rng: &mut StdRng, radius: f32) -> Vec2 {
    if radius <= 0.0 {
        return Vec2::ZERO;
    }

    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let distance = radius * rng.gen::<f32>().sqrt();
    Vec2::from_angle(angle) * distance
}
