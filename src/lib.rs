//! # Particle Life
//!
//! Particle Life is a crate simulating large populations of 2D particles that attract and repel each other depending on their kind.
//!
//! ## Goals
//!
//! The main goal of this crate is to provide the simulation core of a particle life application, leaving windowing and rendering to the user.
//! It owns the particles, computes the forces between them and integrates their motion; renderers read positions, kinds and radii back after every step.
//!
//! Forces are computed on a uniform grid with cells as large as the interaction radius, so that only neighbouring cells have to be visited.
//! A [Barnes-Hut](https://en.wikipedia.org/wiki/Barnes%E2%80%93Hut_simulation) quadtree is also provided, used with a softened gravity law.
//!
//! Particle Life computes forces in parallel on the CPU thanks to [rayon](https://github.com/rayon-rs/rayon). The "parallel" feature is enabled by default; disable it to use the sequential compute methods.
//!
//! # Using Particle Life
//!
//! ## Setting up the world
//!
//! A [`World`](world::World) is created from a [`SimulationConfig`](config::SimulationConfig), whose fields all have sensible defaults.
//! Giving a seed makes the whole simulation reproducible.
//!
//! ```
//! # use particle_life::prelude::*;
//! let mut world = World::new(SimulationConfig {
//!     num_kinds: 6,
//!     interaction_radius: 80.0,
//!     seed: Some(42),
//!     ..SimulationConfig::default()
//! })?;
//! # Ok::<(), particle_life::Error>(())
//! ```
//!
//! ## Adding particles and shaping their interactions
//!
//! Particles are created one by one with [`spawn`](world::World::spawn) or in bursts with [`emit`](world::World::emit).
//! The [`InteractionMatrix`](interaction::InteractionMatrix) is randomized on creation, and can be redrawn or edited.
//!
//! ```
//! # use particle_life::prelude::*;
//! # let mut world = World::new(SimulationConfig::default())?;
//! world.spawn(Vec2::new(10.0, 0.0), Vec2::ZERO, 0);
//! world.emit(&Emission {
//!     count: 500,
//!     centre: Vec2::new(-100.0, 50.0),
//!     spread: 150.0,
//!     kind: KindSelector::Cycle,
//!     ..Emission::default()
//! });
//!
//! let seed = world.randomize_interactions(None);
//! world.set_interaction_strength(0, 1, 0.8)?;
//! # Ok::<(), particle_life::Error>(())
//! ```
//!
//! ## Stepping and drawing
//!
//! Every [`step`](world::World::step) bumps the [`generation`](world::World::generation), after which the particles can be read back.
//!
//! ```
//! # use particle_life::prelude::*;
//! # let mut world = World::new(SimulationConfig::default())?;
//! # world.emit(&Emission { count: 100, ..Emission::default() });
//! let mut snapshot = Snapshot::default();
//!
//! for _ in 0..10 {
//!     world.step(frame_time_step(1.0 / 60.0, 1.0));
//!     world.snapshot_into(&mut snapshot);
//!
//!     for instance in &snapshot.instances {
//!         // draw a circle of `instance.radius` at `instance.position`...
//!     }
//! }
//! # assert_eq!(snapshot.generation, 10);
//! # Ok::<(), particle_life::Error>(())
//! ```

#![warn(missing_docs)]

/// Axis-aligned rectangles.
pub mod bbox;

/// Traits for computing accelerations and types implementing them for the user to choose from.
pub mod compute_method;

/// Configuration of a simulation.
pub mod config;

/// Errors returned when setting a simulation up.
pub mod error;

/// Time integration and boundaries.
pub mod integrator;

/// Strengths of the interactions between particle kinds.
pub mod interaction;

/// Force laws between particles.
pub mod law;

/// Particle handles and records.
pub mod particle;

/// Storage for the particles.
pub mod particle_store;

/// The simulation itself.
pub mod world;

pub use error::{Error, Result};

/// Everything needed to use the crate.
pub mod prelude {
    pub use crate::bbox::BoundingBox;
    pub use crate::compute_method::*;
    pub use crate::config::{ForceModel, SimulationConfig};
    pub use crate::integrator::{Boundary, Integrator};
    pub use crate::interaction::InteractionMatrix;
    pub use crate::law::{Gravity, ParticleLife};
    pub use crate::particle::{Particle, ParticleId, ParticleInstance};
    pub use crate::world::{frame_time_step, Emission, KindSelector, Snapshot, World};
    pub use crate::Error;
    pub use glam::Vec2;
}
