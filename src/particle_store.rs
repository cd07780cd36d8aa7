use glam::Vec2;

use crate::{
    law::Point,
    particle::{Particle, ParticleId},
};

/// Borrowed, read-only view of the particles a force computation runs over.
#[derive(Clone, Copy, Debug)]
pub struct Particles<'a> {
    /// Positions of all slots.
    pub positions: &'a [Vec2],
    /// Kinds of all slots.
    pub kinds: &'a [u8],
    /// Whether each slot holds a live particle.
    pub active: &'a [bool],
}

impl<'a> Particles<'a> {
    /// Number of slots, active or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if there are no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The particle in slot `i` as seen by a force law.
    #[inline]
    pub fn point(&self, i: usize) -> Point {
        Point {
            position: self.positions[i],
            kind: self.kinds[i],
        }
    }

    /// Indices of the active slots.
    #[inline]
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + 'a {
        self.active
            .iter()
            .enumerate()
            .filter_map(|(i, &active)| active.then_some(i))
    }
}

/// Mutable state of one particle handed to the integrator.
#[derive(Debug)]
pub struct Body<'a> {
    /// Position of the particle.
    pub position: &'a mut Vec2,
    /// Velocity of the particle.
    pub velocity: &'a mut Vec2,
    /// Acceleration computed for the particle.
    pub acceleration: Vec2,
    /// Radius of the particle.
    pub radius: f32,
}

type BodySlot<'a> = (((&'a mut Vec2, &'a mut Vec2), (&'a Vec2, &'a f32)), &'a bool);

/// Structure of arrays holding up to a fixed number of particles.
///
/// Particles are identified by their slot index. Slots are never freed: removing a particle means
/// deactivating it, and [`create`](ParticleStore::create) hands out slots in this order:
///
/// 1. a fresh slot while the capacity has not been reached,
/// 2. a slot whose particle was deactivated,
/// 3. the next slot in round-robin order, repurposing a live particle.
///
/// Creating a particle therefore never fails, the oldest particles silently make room for new
/// ones once the store is saturated.
///
/// # Panics
///
/// Accessors taking a [`ParticleId`] panic if the id does not refer to a slot in use, for example
/// one handed out before [`clear`](ParticleStore::clear).
///
/// ```
/// # use particle_life::particle_store::ParticleStore;
/// let mut store = ParticleStore::new(2);
///
/// let a = store.create();
/// let b = store.create();
/// let c = store.create();
///
/// assert_eq!(store.len(), 2);
/// assert_eq!(c, a);
///
/// store.set_active(b, false);
/// assert_eq!(store.create(), b);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ParticleStore {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    accelerations: Vec<Vec2>,
    radii: Vec<f32>,
    kinds: Vec<u8>,
    active: Vec<bool>,
    // Whether each slot has an entry in `free`, so that a slot is never queued twice.
    queued: Vec<bool>,

    capacity: usize,
    free: Vec<u32>,
    next_recycled: usize,
}

impl ParticleStore {
    /// Creates an empty store able to hold `capacity` particles.
    ///
    /// Memory is allocated as particles are created, not upfront.
    ///
    /// # Panics
    ///
    /// In debug builds, if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "particle store capacity must be at least 1");
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Returns a slot for a new particle and marks it active.
    ///
    /// Recycled slots keep the state of their previous particle until it is overwritten.
    pub fn create(&mut self) -> ParticleId {
        let len = self.len();

        if len < self.capacity {
            self.positions.push(Vec2::ZERO);
            self.velocities.push(Vec2::ZERO);
            self.accelerations.push(Vec2::ZERO);
            self.radii.push(0.0);
            self.kinds.push(0);
            self.active.push(true);
            self.queued.push(false);

            return ParticleId(len as u32);
        }

        while let Some(index) = self.free.pop() {
            self.queued[index as usize] = false;
            // Slots reactivated directly are still on the free list.
            if !self.active[index as usize] {
                self.active[index as usize] = true;
                return ParticleId(index);
            }
        }

        let index = self.next_recycled % len.max(1);
        self.next_recycled = self.next_recycled.wrapping_add(1);
        log::trace!("particle store saturated, repurposing slot {index}");

        self.active[index] = true;
        ParticleId(index as u32)
    }

    /// Removes every particle, keeping the allocations.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.velocities.clear();
        self.accelerations.clear();
        self.radii.clear();
        self.kinds.clear();
        self.active.clear();
        self.queued.clear();
        self.free.clear();
        self.next_recycled = 0;
    }

    /// Number of slots in use, active or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if no slot has been created yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Maximum number of particles.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of active particles.
    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|&&active| active).count()
    }

    /// Activates or deactivates a particle. Inactive particles neither feel nor exert forces.
    pub fn set_active(&mut self, id: ParticleId, active: bool) {
        let i = id.index();
        if self.active[i] && !active && !self.queued[i] {
            self.queued[i] = true;
            self.free.push(id.0);
        }
        self.active[i] = active;
    }

    /// Returns true if the particle is active.
    #[inline]
    pub fn is_active(&self, id: ParticleId) -> bool {
        self.active[id.index()]
    }

    /// Position of a particle.
    #[inline]
    pub fn position(&self, id: ParticleId) -> Vec2 {
        self.positions[id.index()]
    }

    /// Sets the position of a particle.
    #[inline]
    pub fn set_position(&mut self, id: ParticleId, position: Vec2) {
        self.positions[id.index()] = position;
    }

    /// Velocity of a particle.
    #[inline]
    pub fn velocity(&self, id: ParticleId) -> Vec2 {
        self.velocities[id.index()]
    }

    /// Sets the velocity of a particle.
    #[inline]
    pub fn set_velocity(&mut self, id: ParticleId, velocity: Vec2) {
        self.velocities[id.index()] = velocity;
    }

    /// Acceleration of a particle computed during the last step.
    #[inline]
    pub fn acceleration(&self, id: ParticleId) -> Vec2 {
        self.accelerations[id.index()]
    }

    /// Kind of a particle.
    #[inline]
    pub fn kind(&self, id: ParticleId) -> u8 {
        self.kinds[id.index()]
    }

    /// Sets the kind of a particle.
    #[inline]
    pub fn set_kind(&mut self, id: ParticleId, kind: u8) {
        self.kinds[id.index()] = kind;
    }

    /// Radius of a particle.
    #[inline]
    pub fn radius(&self, id: ParticleId) -> f32 {
        self.radii[id.index()]
    }

    /// Sets the radius of a particle.
    #[inline]
    pub fn set_radius(&mut self, id: ParticleId, radius: f32) {
        self.radii[id.index()] = radius;
    }

    /// Copy of the state of a particle.
    pub fn get(&self, id: ParticleId) -> Particle {
        let i = id.index();
        Particle {
            id,
            position: self.positions[i],
            velocity: self.velocities[i],
            acceleration: self.accelerations[i],
            radius: self.radii[i],
            kind: self.kinds[i],
        }
    }

    /// Positions of all slots.
    #[inline]
    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    /// Velocities of all slots.
    #[inline]
    pub fn velocities(&self) -> &[Vec2] {
        &self.velocities
    }

    /// Mutable velocities of all slots, for collaborators writing velocities back.
    #[inline]
    pub fn velocities_mut(&mut self) -> &mut [Vec2] {
        &mut self.velocities
    }

    /// Accelerations of all slots.
    #[inline]
    pub fn accelerations(&self) -> &[Vec2] {
        &self.accelerations
    }

    /// Kinds of all slots.
    #[inline]
    pub fn kinds(&self) -> &[u8] {
        &self.kinds
    }

    /// Radii of all slots.
    #[inline]
    pub fn radii(&self) -> &[f32] {
        &self.radii
    }

    /// Active flags of all slots.
    #[inline]
    pub fn active(&self) -> &[bool] {
        &self.active
    }

    /// Iterates over the active particles.
    pub fn iter(&self) -> impl Iterator<Item = Particle> + '_ {
        self.view()
            .active_indices()
            .map(|i| self.get(ParticleId(i as u32)))
    }

    /// Read-only view used by force computations.
    #[inline]
    pub fn view(&self) -> Particles<'_> {
        Particles {
            positions: &self.positions,
            kinds: &self.kinds,
            active: &self.active,
        }
    }

    /// Splits the store into the view read by force computations and the acceleration buffer they
    /// write into.
    #[inline]
    pub(crate) fn view_with_accelerations(&mut self) -> (Particles<'_>, &mut [Vec2]) {
        (
            Particles {
                positions: &self.positions,
                kinds: &self.kinds,
                active: &self.active,
            },
            &mut self.accelerations,
        )
    }

    /// Calls `f` on every active particle, in parallel with the `parallel` feature.
    pub(crate) fn for_each_body<F>(&mut self, f: F)
    where
        F: Fn(Body<'_>) + Sync + Send,
    {
        let apply = |(((position, velocity), (&acceleration, &radius)), &active): BodySlot<'_>| {
            if active {
                f(Body {
                    position,
                    velocity,
                    acceleration,
                    radius,
                });
            }
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.positions
                .par_iter_mut()
                .zip(self.velocities.par_iter_mut())
                .zip(self.accelerations.par_iter().zip(self.radii.par_iter()))
                .zip(self.active.par_iter())
                .for_each(apply);
        }
        #[cfg(not(feature = "parallel"))]
        self.positions
            .iter_mut()
            .zip(self.velocities.iter_mut())
            .zip(self.accelerations.iter().zip(self.radii.iter()))
            .zip(self.active.iter())
            .for_each(apply);
    }
}
