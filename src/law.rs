use glam::Vec2;

use crate::interaction::InteractionMatrix;

/// Default fraction of the interaction radius inside which every particle repels.
pub const BETA: f32 = 0.3;

/// A particle as seen by a force law.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    /// Position of the particle.
    pub position: Vec2,
    /// Kind of the particle.
    pub kind: u8,
}

/// Law computing the acceleration a particle receives from another particle.
///
/// Compute methods call [`between`](PairwiseLaw::between) for every pair they decide to evaluate,
/// sum the contributions and pass the sum to [`finish`](PairwiseLaw::finish).
pub trait PairwiseLaw: Sync {
    /// Contribution of `affecting` to the acceleration of `affected`.
    fn between(&self, affected: Point, affecting: Point) -> Vec2;

    /// Turns the summed contributions into the acceleration of a particle.
    #[inline]
    fn finish(&self, sum: Vec2) -> Vec2 {
        sum
    }
}

/// Pairwise law that is exactly zero past a cutoff distance.
///
/// Required by grid-based compute methods, whose cells are at least as large as the cutoff.
pub trait CutoffLaw: PairwiseLaw {
    /// Distance at and beyond which [`between`](PairwiseLaw::between) returns zero.
    fn cutoff(&self) -> f32;
}

/// Pairwise law that can be evaluated against an aggregated mass.
///
/// Required by Barnes-Hut compute methods, which replace far away groups of particles by their
/// centre of mass.
pub trait MassLaw: PairwiseLaw {
    /// Acceleration at `position` caused by `mass` located at `centre_of_mass`.
    fn from_mass(&self, position: Vec2, centre_of_mass: Vec2, mass: f32) -> Vec2;
}

/// The particle life force profile.
///
/// `r_norm` is the distance divided by the interaction radius and `a` the interaction strength
/// between the two kinds.
///
/// * Below `beta`, the force is a repulsion independent of `a`, going from `-1` at contact
///   linearly up to `0` at `beta`.
/// * Between `beta` and `1`, the force is a triangular lobe of height `a`, zero at both ends and
///   peaking halfway.
/// * From `1` onwards, the force is zero.
///
/// ```
/// # use particle_life::law::attraction;
/// assert_eq!(attraction(0.0, 0.7, 0.3), -1.0);
/// assert!((attraction(0.65, 0.7, 0.3) - 0.7).abs() < 1e-6);
/// assert_eq!(attraction(1.0, 0.7, 0.3), 0.0);
/// ```
#[inline]
pub fn attraction(r_norm: f32, a: f32, beta: f32) -> f32 {
    if r_norm < beta {
        r_norm / beta - 1.0
    } else if r_norm < 1.0 {
        a * (1.0 - (2.0 * r_norm - 1.0 - beta).abs() / (1.0 - beta))
    } else {
        0.0
    }
}

/// Logarithmic roll-off of force magnitudes above `max`.
///
/// Magnitudes up to `max` are unchanged, larger ones become `max + ln(magnitude / max)`, keeping the
/// result continuous and increasing while preventing close encounters from blowing up.
#[inline]
pub fn soft_clamp(magnitude: f32, max: f32) -> f32 {
    if magnitude > max {
        max + (magnitude / max).ln()
    } else {
        magnitude
    }
}

/// Short-range, kind-dependent attraction and repulsion driven by an [`InteractionMatrix`].
#[derive(Clone, Copy, Debug)]
pub struct ParticleLife<'a> {
    /// Strengths between kinds.
    pub matrix: &'a InteractionMatrix,
    /// Interaction radius. Pairs at this distance or further do not interact.
    pub r_max: f32,
    /// Fraction of `r_max` inside which every particle repels.
    pub beta: f32,
    /// Pairs closer than this distance are skipped.
    pub min_distance: f32,
    /// Multiplier applied to the summed acceleration.
    pub force_scale: f32,
}

impl<'a> ParticleLife<'a> {
    /// Creates the law with the default [`BETA`], no minimum distance and unit scale.
    pub fn new(matrix: &'a InteractionMatrix, r_max: f32) -> Self {
        Self {
            matrix,
            r_max,
            beta: BETA,
            min_distance: 0.0,
            force_scale: 1.0,
        }
    }
}

impl PairwiseLaw for ParticleLife<'_> {
    #[inline]
    fn between(&self, affected: Point, affecting: Point) -> Vec2 {
        let dir = affecting.position - affected.position;
        let mag_2 = dir.length_squared();

        if mag_2 < self.min_distance * self.min_distance || mag_2 >= self.r_max * self.r_max {
            return Vec2::ZERO;
        }
        // Coincident particles have no direction to push along.
        if mag_2 == 0.0 {
            return Vec2::ZERO;
        }

        let mag = mag_2.sqrt();
        let a = self
            .matrix
            .get(affected.kind as usize, affecting.kind as usize);

        dir * (attraction(mag / self.r_max, a, self.beta) / mag)
    }

    #[inline]
    fn finish(&self, sum: Vec2) -> Vec2 {
        sum * (self.r_max * self.force_scale)
    }
}

impl CutoffLaw for ParticleLife<'_> {
    #[inline]
    fn cutoff(&self) -> f32 {
        self.r_max
    }
}

/// Softened Newtonian attraction between particles of unit mass, soft clamped above a maximum.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gravity {
    /// Gravitational constant.
    pub g: f32,
    /// Softening length added to every distance.
    pub softening: f32,
    /// Magnitude above which the force is rolled off logarithmically.
    pub max_force: f32,
}

impl Default for Gravity {
    fn default() -> Self {
        Self {
            g: 6.674_30e-2,
            softening: 0.025,
            max_force: 1000.0,
        }
    }
}

impl PairwiseLaw for Gravity {
    #[inline]
    fn between(&self, affected: Point, affecting: Point) -> Vec2 {
        self.from_mass(affected.position, affecting.position, 1.0)
    }
}

impl MassLaw for Gravity {
    #[inline]
    fn from_mass(&self, position: Vec2, centre_of_mass: Vec2, mass: f32) -> Vec2 {
        let dir = centre_of_mass - position;
        let mag_2 = dir.length_squared() + self.softening * self.softening;
        let mag = mag_2.sqrt();

        let magnitude = soft_clamp(self.g * mass / mag_2, self.max_force);

        dir * (magnitude / mag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRENGTHS: [f32; 5] = [-1.0, -0.4, 0.0, 0.3, 1.0];

    fn point(x: f32, y: f32, kind: u8) -> Point {
        Point {
            position: Vec2::new(x, y),
            kind,
        }
    }

    #[test]
    fn repulsion_zone_ignores_strength() {
        for i in 0..30 {
            let r = i as f32 * 0.01;
            let expected = attraction(r, 0.0, BETA);
            for a in STRENGTHS {
                assert_eq!(attraction(r, a, BETA), expected);
            }
        }
    }

    #[test]
    fn repulsion_zone_is_increasing_and_negative() {
        let mut previous = attraction(0.0, 0.5, BETA);
        assert_eq!(previous, -1.0);

        for i in 1..300 {
            let r = i as f32 * 0.001;
            let f = attraction(r, 0.5, BETA);
            assert!(f > previous, "not increasing at {r}");
            assert!(f < 0.0, "crosses zero before beta at {r}");
            previous = f;
        }

        assert_eq!(attraction(BETA, 0.5, BETA), 0.0);
    }

    #[test]
    fn vanishes_at_cutoff() {
        for a in STRENGTHS {
            assert_eq!(attraction(1.0, a, BETA), 0.0);
            assert_eq!(attraction(1.5, a, BETA), 0.0);
            assert!(attraction(0.999, a, BETA).abs() < 1e-2);
        }
    }

    #[test]
    fn lobe_peaks_at_strength() {
        let peak = (1.0 + BETA) / 2.0;
        for a in STRENGTHS {
            assert!((attraction(peak, a, BETA) - a).abs() < 1e-6);
        }
        assert!(attraction(0.5, 1.0, BETA) > 0.0);
        assert!(attraction(0.5, -1.0, BETA) < 0.0);
    }

    #[test]
    fn soft_clamp_is_continuous() {
        assert_eq!(soft_clamp(10.0, 1000.0), 10.0);
        assert_eq!(soft_clamp(1000.0, 1000.0), 1000.0);
        assert!((soft_clamp(1000.1, 1000.0) - 1000.0).abs() < 1e-3);
        assert!(soft_clamp(1e9, 1000.0) < 1020.0);
        assert!(soft_clamp(2000.0, 1000.0) > soft_clamp(1500.0, 1000.0));
    }

    #[test]
    fn particle_life_cutoff() {
        let mut matrix = InteractionMatrix::new(2).unwrap();
        matrix.set(0, 1, 1.0).unwrap();
        let law = ParticleLife::new(&matrix, 10.0);

        assert_eq!(law.between(point(0.0, 0.0, 0), point(10.0, 0.0, 1)), Vec2::ZERO);
        assert_eq!(law.between(point(0.0, 0.0, 0), point(0.0, 25.0, 1)), Vec2::ZERO);
        assert!(law.between(point(0.0, 0.0, 0), point(6.5, 0.0, 1)).x > 0.0);
    }

    #[test]
    fn particle_life_is_asymmetric() {
        let mut matrix = InteractionMatrix::new(2).unwrap();
        matrix.set(0, 1, 1.0).unwrap();
        matrix.set(1, 0, -1.0).unwrap();
        let law = ParticleLife::new(&matrix, 10.0);

        let (p, q) = (point(0.0, 0.0, 0), point(6.5, 0.0, 1));
        // Kind 0 chases kind 1, kind 1 flees kind 0.
        assert!(law.between(p, q).x > 0.0);
        assert!(law.between(q, p).x > 0.0);
    }

    #[test]
    fn particle_life_min_distance() {
        let matrix = InteractionMatrix::new(1).unwrap();
        let law = ParticleLife {
            min_distance: 0.5,
            ..ParticleLife::new(&matrix, 10.0)
        };

        assert_eq!(law.between(point(0.0, 0.0, 0), point(0.4, 0.0, 0)), Vec2::ZERO);
        assert_eq!(law.between(point(0.0, 0.0, 0), point(0.0, 0.0, 0)), Vec2::ZERO);
        assert!(law.between(point(0.0, 0.0, 0), point(0.6, 0.0, 0)).x < 0.0);
    }

    #[test]
    fn particle_life_scales_by_radius() {
        let matrix = InteractionMatrix::new(1).unwrap();
        let law = ParticleLife {
            force_scale: 2.0,
            ..ParticleLife::new(&matrix, 10.0)
        };

        assert_eq!(law.finish(Vec2::new(1.0, -0.5)), Vec2::new(20.0, -10.0));
    }

    #[test]
    fn gravity_is_finite_at_zero_distance() {
        let law = Gravity::default();
        let acceleration = law.between(point(1.0, 1.0, 0), point(1.0, 1.0, 0));

        assert_eq!(acceleration, Vec2::ZERO);
        assert!(law.from_mass(Vec2::ZERO, Vec2::new(1e-6, 0.0), 1e6).is_finite());
    }

    #[test]
    fn gravity_matches_newton_far_away() {
        let law = Gravity {
            g: 2.0,
            softening: 0.0,
            max_force: f32::INFINITY,
        };
        let acceleration = law.from_mass(Vec2::ZERO, Vec2::new(0.0, 4.0), 3.0);

        assert!((acceleration - Vec2::new(0.0, 2.0 * 3.0 / 16.0)).length() < 1e-6);
    }
}
