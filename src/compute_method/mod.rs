/// Uniform grid spatial index.
pub mod grid;

/// Quadtree spatial index used by the Barnes-Hut algorithm.
pub mod tree;

/// Compute methods that use multiple CPU threads.
#[cfg(feature = "parallel")]
pub mod parallel;

/// Compute methods that use one CPU thread.
pub mod sequential;

use glam::Vec2;

use crate::{
    law::{CutoffLaw, PairwiseLaw},
    particle_store::Particles,
};

use grid::UniformGrid;

/// Trait for algorithms computing the acceleration of every particle under a force law `L`.
///
/// Implementations write the acceleration of slot `i` into `accelerations[i]` and zero for inactive
/// slots. The slice must be as long as the particle view.
///
/// # Example
///
/// ```
/// # use particle_life::prelude::*;
/// # use particle_life::law::PairwiseLaw;
/// # use particle_life::particle_store::Particles;
/// # use glam::Vec2;
/// struct Still;
///
/// impl<L: PairwiseLaw> ComputeMethod<L> for Still {
///     fn compute(&mut self, _: Particles<'_>, _: &L, accelerations: &mut [Vec2]) {
///         accelerations.fill(Vec2::ZERO);
///     }
/// }
/// ```
pub trait ComputeMethod<L> {
    /// Computes the acceleration of every particle.
    fn compute(&mut self, particles: Particles<'_>, law: &L, accelerations: &mut [Vec2]);
}

/// Spatial structure rebuilt from scratch from the current particle positions.
pub trait SpatialIndex {
    /// Rebuilds the index from the active particles.
    fn build(&mut self, particles: Particles<'_>);
}

// Acceleration of slot `i` summed over every other active slot.
#[inline]
pub(crate) fn brute_force_at<L>(particles: Particles<'_>, active: &[usize], i: usize, law: &L) -> Vec2
where
    L: PairwiseLaw,
{
    let point = particles.point(i);
    let sum = active
        .iter()
        .filter(|&&j| j != i)
        .fold(Vec2::ZERO, |sum, &j| sum + law.between(point, particles.point(j)));

    law.finish(sum)
}

// Acceleration of slot `i` summed over the 3×3 block of cells around it.
#[inline]
pub(crate) fn grid_at<L>(grid: &UniformGrid, particles: Particles<'_>, i: usize, law: &L) -> Vec2
where
    L: CutoffLaw,
{
    let point = particles.point(i);
    let mut sum = Vec2::ZERO;

    grid.for_each_neighbor(point.position, |j| {
        if j != i {
            sum += law.between(point, particles.point(j));
        }
    });

    law.finish(sum)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        interaction::InteractionMatrix,
        law::{Gravity, ParticleLife},
    };
    use rand::{rngs::StdRng, Rng, SeedableRng};

    /// Owned particle arrays for tests, with roughly one slot in ten inactive.
    pub struct Population {
        pub positions: Vec<Vec2>,
        pub kinds: Vec<u8>,
        pub active: Vec<bool>,
    }

    impl Population {
        pub fn random(len: usize, extent: f32, num_kinds: u8, seed: u64) -> Self {
            let mut rng = StdRng::seed_from_u64(seed);

            let positions = (0..len)
                .map(|_| Vec2::new(rng.gen_range(0.0..extent), rng.gen_range(0.0..extent)))
                .collect();
            let kinds = (0..len).map(|_| rng.gen_range(0..num_kinds)).collect();
            let active = (0..len).map(|_| rng.gen_bool(0.9)).collect();

            Self {
                positions,
                kinds,
                active,
            }
        }

        pub fn view(&self) -> Particles<'_> {
            Particles {
                positions: &self.positions,
                kinds: &self.kinds,
                active: &self.active,
            }
        }
    }

    pub fn random_matrix(num_kinds: usize, seed: u64) -> InteractionMatrix {
        let mut matrix = InteractionMatrix::new(num_kinds).unwrap();
        matrix.randomize(seed);
        matrix
    }

    pub fn compute<C, L>(cm: &mut C, population: &Population, law: &L) -> Vec<Vec2>
    where
        C: ComputeMethod<L>,
    {
        let mut accelerations = vec![Vec2::splat(f32::NAN); population.positions.len()];
        cm.compute(population.view(), law, &mut accelerations);
        accelerations
    }

    /// Checks a compute method against the brute-force reference, particle by particle.
    pub fn particle_life_computation<C>(mut cm: C)
    where
        C: for<'a> ComputeMethod<ParticleLife<'a>>,
    {
        let matrix = random_matrix(6, 3);
        let law = ParticleLife::new(&matrix, 25.0);

        for (len, extent) in [(0, 100.0), (1, 100.0), (2, 10.0), (200, 300.0), (200, 60.0)] {
            let population = Population::random(len, extent, 6, len as u64);

            let expected = compute(&mut sequential::BruteForce, &population, &law);
            let computed = compute(&mut cm, &population, &law);

            for (i, (e, c)) in expected.iter().zip(&computed).enumerate() {
                if !population.active[i] {
                    assert_eq!(*c, Vec2::ZERO);
                }
                let tolerance = 1e-3 * e.length().max(1.0);
                assert!(
                    (*e - *c).length() <= tolerance,
                    "particle {i}: expected {e}, computed {c}"
                );
            }
        }
    }

    /// Checks a compute method against the brute-force gravity reference, allowing `tolerance`
    /// relative error on the summed acceleration magnitudes.
    pub fn gravity_computation<C>(mut cm: C, tolerance: f32)
    where
        C: ComputeMethod<Gravity>,
    {
        let law = Gravity {
            g: 1.0,
            ..Gravity::default()
        };

        for (len, seed) in [(2, 0), (50, 1), (200, 2)] {
            let population = Population::random(len, 500.0, 1, seed);

            let expected = compute(&mut sequential::BruteForce, &population, &law);
            let computed = compute(&mut cm, &population, &law);

            let error: f32 = expected
                .iter()
                .zip(&computed)
                .map(|(e, c)| (*e - *c).length())
                .sum();
            let total: f32 = expected.iter().map(|e| e.length()).sum();

            assert!(
                error <= tolerance * total.max(f32::EPSILON),
                "relative error {} above {tolerance} for {len} particles",
                error / total
            );
        }
    }

    #[test]
    fn brute_force_excludes_self_and_inactive() {
        let matrix = InteractionMatrix::new(1).unwrap();
        let law = ParticleLife::new(&matrix, 10.0);
        let population = Population {
            positions: vec![Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0)],
            kinds: vec![0; 3],
            active: vec![true, true, false],
        };

        let accelerations = compute(&mut sequential::BruteForce, &population, &law);

        // Only the pair (0, 1) interacts, and it repels.
        assert!(accelerations[0].x < 0.0);
        assert!(accelerations[1].x > 0.0);
        assert_eq!(accelerations[0].y, 0.0);
        assert_eq!(accelerations[2], Vec2::ZERO);
    }

    #[test]
    fn pairs_beyond_cutoff_do_not_interact() {
        let mut matrix = InteractionMatrix::new(2).unwrap();
        for (i, j) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            matrix.set(i, j, 1.0).unwrap();
        }
        let law = ParticleLife::new(&matrix, 10.0);
        let population = Population {
            positions: vec![Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(0.0, 30.0)],
            kinds: vec![0, 1, 1],
            active: vec![true; 3],
        };

        let mut grid = sequential::Grid::new(None);
        for accelerations in [
            compute(&mut sequential::BruteForce, &population, &law),
            compute(&mut grid, &population, &law),
        ] {
            assert_eq!(accelerations, [Vec2::ZERO; 3]);
        }
    }
}
