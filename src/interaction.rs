use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::{Error, Result};

/// Largest number of particle kinds an [`InteractionMatrix`] can hold.
pub const MAX_KINDS: usize = 16;

type Table = [[f32; MAX_KINDS]; MAX_KINDS];

/// Table of interaction strengths between particle kinds.
///
/// `get(i, j)` is the strength a particle of kind `i` feels towards a neighbour of kind `j`. The
/// table is not symmetric: `get(i, j)` and `get(j, i)` are drawn independently, which is what gives
/// rise to chasing and orbiting patterns.
///
/// Strengths are stored in a fixed `MAX_KINDS × MAX_KINDS` table padded with zeros so that lookups
/// in the force kernel are plain array reads.
#[derive(Clone, Debug, PartialEq)]
pub struct InteractionMatrix {
    num_kinds: usize,
    table: Table,
}

impl InteractionMatrix {
    /// Creates a zero-filled matrix for `num_kinds` kinds.
    pub fn new(num_kinds: usize) -> Result<Self> {
        let mut matrix = Self {
            num_kinds: 0,
            table: [[0.0; MAX_KINDS]; MAX_KINDS],
        };
        matrix.init(num_kinds)?;
        Ok(matrix)
    }

    /// Recreates the matrix for `num_kinds` kinds, resetting every strength to zero.
    pub fn init(&mut self, num_kinds: usize) -> Result<()> {
        if num_kinds == 0 || num_kinds > MAX_KINDS {
            return Err(Error::KindCount(num_kinds));
        }

        self.num_kinds = num_kinds;
        self.table = [[0.0; MAX_KINDS]; MAX_KINDS];

        log::debug!("interaction matrix reset to {num_kinds} kinds");
        Ok(())
    }

    /// Number of particle kinds.
    #[inline]
    pub fn num_kinds(&self) -> usize {
        self.num_kinds
    }

    /// Strength between kinds `i` and `j`, or zero if either is out of range.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        // Padding cells are always zero, so only indices past the table need checking.
        if i < MAX_KINDS && j < MAX_KINDS {
            self.table[i][j]
        } else {
            0.0
        }
    }

    /// Sets the strength between kinds `i` and `j`, clamped to `[-1, 1]`.
    pub fn set(&mut self, i: usize, j: usize, strength: f32) -> Result<()> {
        for kind in [i, j] {
            if kind >= self.num_kinds {
                return Err(Error::KindOutOfRange {
                    kind,
                    num_kinds: self.num_kinds,
                });
            }
        }

        self.table[i][j] = strength.clamp(-1.0, 1.0);
        Ok(())
    }

    /// Strengths felt by kind `i` towards every kind, or an empty slice if `i` is out of range.
    pub fn row(&self, i: usize) -> &[f32] {
        match self.table.get(i) {
            Some(row) if i < self.num_kinds => &row[..self.num_kinds],
            _ => &[],
        }
    }

    /// Fills every strength with a value drawn uniformly from `[-1, 1]`.
    ///
    /// Each row is drawn from its own generator seeded from `seed` and the row index, so the result
    /// only depends on `seed` and the number of kinds, never on how rows are scheduled across
    /// threads. The same seed always yields a bit-identical matrix.
    pub fn randomize(&mut self, seed: u64) {
        debug_assert!(self.num_kinds > 0);

        let num_kinds = self.num_kinds;
        let fill = |(i, row): (usize, &mut [f32; MAX_KINDS])| {
            let mut rng = row_rng(seed, i);
            for strength in &mut row[..num_kinds] {
                *strength = rng.gen_range(-1.0..=1.0);
            }
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.table[..num_kinds]
                .par_iter_mut()
                .enumerate()
                .for_each(fill);
        }
        #[cfg(not(feature = "parallel"))]
        self.table[..num_kinds].iter_mut().enumerate().for_each(fill);

        log::info!("interaction matrix randomized with seed {seed}");
    }
}

// SplitMix64 finaliser, so that neighbouring rows get unrelated seeds.
fn row_rng(seed: u64, row: usize) -> StdRng {
    let mut z = seed ^ (row as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    StdRng::seed_from_u64(z ^ (z >> 31))
}
