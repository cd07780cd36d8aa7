use glam::Vec2;
use rayon::prelude::*;

use super::{brute_force_at, grid::UniformGrid, grid_at, tree::Quadtree, ComputeMethod, SpatialIndex};
use crate::{
    bbox::BoundingBox,
    law::{CutoffLaw, MassLaw, PairwiseLaw},
    particle_store::Particles,
};

/// A brute-force [`ComputeMethod`] using the CPU with [rayon](https://github.com/rayon-rs/rayon).
#[derive(Clone, Copy, Debug, Default)]
pub struct BruteForce;

impl<L> ComputeMethod<L> for BruteForce
where
    L: PairwiseLaw,
{
    fn compute(&mut self, particles: Particles<'_>, law: &L, accelerations: &mut [Vec2]) {
        debug_assert_eq!(particles.len(), accelerations.len());

        let active: Vec<_> = particles.active_indices().collect();

        accelerations
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, acceleration)| {
                *acceleration = if particles.active[i] {
                    brute_force_at(particles, &active, i, law)
                } else {
                    Vec2::ZERO
                };
            });
    }
}

/// Grid [`ComputeMethod`] using the CPU with [rayon](https://github.com/rayon-rs/rayon) for both
/// the grid construction and the force computation.
///
/// Each particle only writes its own acceleration, so the result does not depend on the number of
/// threads.
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
        self.index.par_build(particles);

        let index = &self.index;
        accelerations
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, acceleration)| {
                *acceleration = if particles.active[i] {
                    grid_at(index, particles, i, law)
                } else {
                    Vec2::ZERO
                };
            });
    }
}

/// [Barnes-Hut](https://en.wikipedia.org/wiki/Barnes%E2%80%93Hut_simulation) [`ComputeMethod`] using the CPU with [rayon](https://github.com/rayon-rs/rayon) for the force computation.
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

        let (tree, theta) = (&self.tree, self.theta);
        accelerations
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, acceleration)| {
                *acceleration = if particles.active[i] {
                    tree.acceleration_at(particles, i, law, theta)
                } else {
                    Vec2::ZERO
                };
            });
    }
}
