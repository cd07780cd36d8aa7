use glam::Vec2;

use super::{brute_force_at, grid::UniformGrid, grid_at, tree::Quadtree, ComputeMethod, SpatialIndex};
use crate::{
    bbox::BoundingBox,
    law::{CutoffLaw, MassLaw, PairwiseLaw},
    particle_store::Particles,
};

/// A brute-force [`ComputeMethod`] using the CPU.
///
/// Evaluates every ordered pair of active particles. Used as the reference the other methods are
/// tested against.
#[derive(Clone, Copy, Debug, Default)]
pub struct BruteForce;

impl<L> ComputeMethod<L> for BruteForce
where
    L: PairwiseLaw,
{
    fn compute(&mut self, particles: Particles<'_>, law: &L, accelerations: &mut [Vec2]) {
        debug_assert_eq!(particles.len(), accelerations.len());

        let active: Vec<_> = particles.active_indices().collect();

        for (i, acceleration) in accelerations.iter_mut().enumerate() {
            *acceleration = if particles.active[i] {
                brute_force_at(particles, &active, i, law)
            } else {
                Vec2::ZERO
            };
        }
    }
}

/// A [`ComputeMethod`] using a [`UniformGrid`] with cells as large as the cutoff of the law.
///
/// Gives the same result as [`BruteForce`] for laws that vanish past their cutoff, up to the order of
/// summation.
#[derive(Clone, Debug)]
pub struct Grid {
    index: UniformGrid,
}

impl Grid {
    /// Creates the method with a grid covering `domain`, or fitted to the particles if `None`.
    pub fn new(domain: Option<BoundingBox>) -> Self {
        Self {
            index: UniformGrid::new(1.0, domain),
        }
    }

    /// Sets the domain covered by the grid from the next computation on.
    #[inline]
    pub fn set_domain(&mut self, domain: Option<BoundingBox>) {
        self.index.set_domain(domain);
    }

    /// The grid built during the last computation.
    #[inline]
    pub fn index(&self) -> &UniformGrid {
        &self.index
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<L> ComputeMethod<L> for Grid
where
    L: CutoffLaw,
{
    fn compute(&mut self, particles: Particles<'_>, law: &L, accelerations: &mut [Vec2]) {
        debug_assert_eq!(particles.len(), accelerations.len());

        self.index.set_cell_size(law.cutoff());
        self.index.build(particles);

        for (i, acceleration) in accelerations.iter_mut().enumerate() {
            *acceleration = if particles.active[i] {
                grid_at(&self.index, particles, i, law)
            } else {
                Vec2::ZERO
            };
        }
    }
}

/// [Barnes-Hut](https://en.wikipedia.org/wiki/Barnes%E2%80%93Hut_simulation) [`ComputeMethod`] using the CPU.
#[derive(Clone, Debug, Default)]
pub struct BarnesHut {
    /// Parameter ruling the accuracy and speed of the algorithm. If 0, behaves the same as [`BruteForce`].
    pub theta: f32,
    tree: Quadtree,
}

impl BarnesHut {
    /// Creates the method with the given opening parameter.
    pub fn new(theta: f32) -> Self {
        Self {
            theta,
            tree: Quadtree::new(),
        }
    }

    /// The tree built during the last computation.
    #[inline]
    pub fn tree(&self) -> &Quadtree {
        &self.tree
    }
}

impl<L> ComputeMethod<L> for BarnesHut
where
    L: MassLaw,
{
    fn compute(&mut self, particles: Particles<'_>, law: &L, accelerations: &mut [Vec2]) {
        debug_assert_eq!(particles.len(), accelerations.len());

        self.tree.build(particles);

        for (i, acceleration) in accelerations.iter_mut().enumerate() {
            *acceleration = if particles.active[i] {
                self.tree.acceleration_at(particles, i, law, self.theta)
            } else {
                Vec2::ZERO
            };
        }
    }
}
