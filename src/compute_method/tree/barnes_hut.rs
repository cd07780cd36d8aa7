use glam::Vec2;

use super::{NodeID, Quadtree};
use crate::{law::MassLaw, particle_store::Particles};

impl Quadtree {
    /// Computes the acceleration of particle `i` using the [Barnes-Hut](https://en.wikipedia.org/wiki/Barnes%E2%80%93Hut_simulation) approximation.
    ///
    /// A node not containing the particle is replaced by its centre of mass when its width divided
    /// by the distance to that centre of mass is below `theta`. Leaves are always summed exactly, and
    /// `theta = 0` gives the same result as summing over every pair.
    ///
    /// Unlike the plain rule treating every leaf as a point mass, a leaf is never collapsed, which
    /// keeps a particle from attracting itself through the centre of mass of its own leaf.
    pub fn acceleration_at<L>(
        &self,
        particles: Particles<'_>,
        i: usize,
        law: &L,
        theta: f32,
    ) -> Vec2
    where
        L: MassLaw,
    {
        let sum = if self.nodes.is_empty() {
            Vec2::ZERO
        } else {
            self.accumulate(0, particles, i, law, theta)
        };

        law.finish(sum)
    }

    fn accumulate<L>(
        &self,
        id: NodeID,
        particles: Particles<'_>,
        i: usize,
        law: &L,
        theta: f32,
    ) -> Vec2
    where
        L: MassLaw,
    {
        let node = &self.nodes[id as usize];
        let point = particles.point(i);

        let Some(children) = node.children else {
            return self
                .leaf_particles(node)
                .iter()
                .map(|&j| j as usize)
                .filter(|&j| j != i)
                .fold(Vec2::ZERO, |sum, j| sum + law.between(point, particles.point(j)));
        };

        let distance = point.position.distance(node.centre_of_mass);
        let width = node.bounds.half * 2.0;

        if !node.bounds.contains(point.position) && width < theta * distance {
            return law.from_mass(point.position, node.centre_of_mass, node.mass);
        }

        (children..children + 4)
            .filter(|&child| self.nodes[child as usize].len > 0)
            .fold(Vec2::ZERO, |sum, child| {
                sum + self.accumulate(child, particles, i, law, theta)
            })
    }
}
