use glam::Vec2;

use super::SpatialIndex;
use crate::{bbox::BoundingBox, particle_store::Particles};

/// Largest number of cells along one axis. Larger domains get larger cells instead.
pub const MAX_CELLS_PER_AXIS: usize = 1024;

const EMPTY: u32 = u32::MAX;

/// Placement of the cells of a [`UniformGrid`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lattice {
    /// Lower corner of cell `(0, 0)`.
    pub origin: Vec2,
    /// Side length of a cell.
    pub cell_size: f32,
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl Lattice {
    fn new(domain: BoundingBox, min_cell_size: f32) -> Self {
        if domain.min.cmpgt(domain.max).any() || !domain.size().is_finite() {
            return Self {
                origin: Vec2::ZERO,
                cell_size: min_cell_size,
                width: 1,
                height: 1,
            };
        }

        // Growing the cells keeps every particle within the cutoff inside the 3×3 block.
        let size = domain.size();
        let cell_size = min_cell_size
            .max(size.x / MAX_CELLS_PER_AXIS as f32)
            .max(size.y / MAX_CELLS_PER_AXIS as f32);
        let cells = |extent: f32| ((extent / cell_size).ceil() as usize).clamp(1, MAX_CELLS_PER_AXIS);

        Self {
            origin: domain.min,
            cell_size,
            width: cells(size.x),
            height: cells(size.y),
        }
    }

    /// Column and row of the cell containing `position`, clamped to the grid.
    #[inline]
    pub fn cell_coords(&self, position: Vec2) -> (usize, usize) {
        let relative = (position - self.origin) / self.cell_size;
        let clamp = |v: f32, len: usize| (v.floor().max(0.0) as usize).min(len - 1);

        (clamp(relative.x, self.width), clamp(relative.y, self.height))
    }

    #[inline]
    fn flat(&self, position: Vec2) -> u32 {
        let (x, y) = self.cell_coords(position);
        (y * self.width + x) as u32
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Always false, a lattice has at least one cell.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Grid of square cells bucketing particles by position.
///
/// The grid covers a fixed domain, or the bounding box of the active particles when no domain is
/// set. Particles outside the domain are bucketed into the nearest border cell. As long as the cell
/// size is at least the interaction cutoff, every particle within the cutoff of a position lies in
/// the 3×3 block of cells around it, which is what [`for_each_neighbor`](Self::for_each_neighbor)
/// visits.
///
/// Cells are stored compactly: a counting sort lays out the particle indices of each cell
/// contiguously, in increasing index order, so building is deterministic.
#[derive(Clone, Debug)]
pub struct UniformGrid {
    min_cell_size: f32,
    domain: Option<BoundingBox>,
    lattice: Lattice,

    cells: Vec<u32>,
    starts: Vec<u32>,
    cursors: Vec<u32>,
    entries: Vec<u32>,
}

impl UniformGrid {
    /// Creates an empty grid with cells of at least `cell_size`, covering `domain` if given.
    pub fn new(cell_size: f32, domain: Option<BoundingBox>) -> Self {
        Self {
            min_cell_size: cell_size,
            domain,
            lattice: Lattice::new(BoundingBox::IDENTITY, cell_size),
            cells: Vec::new(),
            starts: vec![0; 2],
            cursors: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Sets the minimum cell size used by the next build.
    #[inline]
    pub fn set_cell_size(&mut self, cell_size: f32) {
        self.min_cell_size = cell_size;
    }

    /// Sets the domain used by the next build. `None` fits the grid to the particles.
    #[inline]
    pub fn set_domain(&mut self, domain: Option<BoundingBox>) {
        self.domain = domain;
    }

    /// Placement of the cells of the last build.
    #[inline]
    pub fn lattice(&self) -> Lattice {
        self.lattice
    }

    /// Particle indices in the cell at column `x` and row `y`.
    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> &[u32] {
        let cell = y * self.lattice.width + x;
        &self.entries[self.starts[cell] as usize..self.starts[cell + 1] as usize]
    }

    /// Number of particles indexed by the last build.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the last build indexed no particle.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Calls `f` with the index of every particle in the 3×3 block of cells around `position`.
    #[inline]
    pub fn for_each_neighbor(&self, position: Vec2, mut f: impl FnMut(usize)) {
        let Lattice { width, height, .. } = self.lattice;
        let (x, y) = self.lattice.cell_coords(position);

        for cy in y.saturating_sub(1)..=(y + 1).min(height - 1) {
            for cx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                for &j in self.cell(cx, cy) {
                    f(j as usize);
                }
            }
        }
    }

    fn fit(&mut self, particles: Particles<'_>) {
        let domain = match self.domain {
            Some(domain) if !domain.is_empty() => domain,
            _ => BoundingBox::containing(particles.active_indices().map(|i| particles.positions[i])),
        };
        self.lattice = Lattice::new(domain, self.min_cell_size);
    }

    // Counting sort of the slots by cell.
    fn sort(&mut self) {
        let len = self.lattice.len();

        self.starts.clear();
        self.starts.resize(len + 1, 0);
        for &cell in self.cells.iter().filter(|&&cell| cell != EMPTY) {
            self.starts[cell as usize + 1] += 1;
        }
        for i in 0..len {
            self.starts[i + 1] += self.starts[i];
        }

        self.cursors.clear();
        self.cursors.extend_from_slice(&self.starts[..len]);

        self.entries.clear();
        self.entries.resize(self.starts[len] as usize, 0);
        for (i, &cell) in self.cells.iter().enumerate() {
            if cell != EMPTY {
                let cursor = &mut self.cursors[cell as usize];
                self.entries[*cursor as usize] = i as u32;
                *cursor += 1;
            }
        }
    }

    /// Rebuilds the grid, assigning particles to cells in parallel.
    #[cfg(feature = "parallel")]
    pub fn par_build(&mut self, particles: Particles<'_>) {
        use rayon::prelude::*;

        self.fit(particles);
        let lattice = self.lattice;

        self.cells.resize(particles.len(), EMPTY);
        self.cells
            .par_iter_mut()
            .zip(particles.positions.par_iter().zip(particles.active.par_iter()))
            .for_each(|(cell, (&position, &active))| {
                *cell = if active { lattice.flat(position) } else { EMPTY };
            });

        self.sort();
        log::trace!("grid built: {} cells, {} particles", lattice.len(), self.len());
    }
}

impl SpatialIndex for UniformGrid {
    fn build(&mut self, particles: Particles<'_>) {
        self.fit(particles);
        let lattice = self.lattice;

        self.cells.clear();
        self.cells.extend(
            particles
                .positions
                .iter()
                .zip(particles.active)
                .map(|(&position, &active)| if active { lattice.flat(position) } else { EMPTY }),
        );

        self.sort();
        log::trace!("grid built: {} cells, {} particles", lattice.len(), self.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute_method::tests::Population;

    fn cells_of(grid: &UniformGrid) -> Vec<Vec<u32>> {
        let Lattice { width, height, .. } = grid.lattice();
        (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| grid.cell(x, y).to_vec())
            .collect()
    }

    #[test]
    fn every_active_particle_in_exactly_one_cell() {
        let population = Population::random(500, 200.0, 1, 11);
        let mut grid = UniformGrid::new(15.0, None);
        grid.build(population.view());

        let mut seen = vec![0; 500];
        for cell in cells_of(&grid) {
            for i in cell {
                seen[i as usize] += 1;
            }
        }

        for (i, count) in seen.into_iter().enumerate() {
            assert_eq!(count, population.active[i] as usize, "particle {i}");
        }
    }

    #[test]
    fn particles_land_in_their_cell() {
        let population = Population::random(300, 100.0, 1, 5);
        let mut grid = UniformGrid::new(10.0, None);
        grid.build(population.view());

        let lattice = grid.lattice();
        for y in 0..lattice.height {
            for x in 0..lattice.width {
                for &i in grid.cell(x, y) {
                    assert_eq!(lattice.cell_coords(population.positions[i as usize]), (x, y));
                }
            }
        }
    }

    #[test]
    fn cell_lists_are_ordered() {
        let population = Population::random(300, 50.0, 1, 8);
        let mut grid = UniformGrid::new(10.0, None);
        grid.build(population.view());

        for cell in cells_of(&grid) {
            assert!(cell.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn outside_domain_is_clamped() {
        let domain = BoundingBox::new(Vec2::ZERO, Vec2::splat(100.0));
        let population = Population {
            positions: vec![Vec2::new(-50.0, 50.0), Vec2::new(1e6, 1e6), Vec2::new(50.0, 50.0)],
            kinds: vec![0; 3],
            active: vec![true; 3],
        };
        let mut grid = UniformGrid::new(10.0, Some(domain));
        grid.build(population.view());

        let lattice = grid.lattice();
        assert_eq!((lattice.width, lattice.height), (10, 10));
        assert_eq!(grid.cell(0, 5), [0]);
        assert_eq!(grid.cell(9, 9), [1]);
        assert_eq!(grid.cell(5, 5), [2]);
    }

    #[test]
    fn neighbors_cover_cutoff() {
        let cutoff = 12.0;
        let population = Population::random(400, 150.0, 1, 21);
        let mut grid = UniformGrid::new(cutoff, None);
        grid.build(population.view());

        let view = population.view();
        for i in view.active_indices() {
            let mut neighbors = Vec::new();
            grid.for_each_neighbor(population.positions[i], |j| neighbors.push(j));

            for j in view.active_indices() {
                let distance = population.positions[i].distance(population.positions[j]);
                if distance < cutoff {
                    assert!(neighbors.contains(&j), "{j} missing from neighbors of {i}");
                }
            }
        }
    }

    #[test]
    fn large_domain_grows_cells() {
        let domain = BoundingBox::new(Vec2::ZERO, Vec2::new(1e6, 10.0));
        let mut grid = UniformGrid::new(1.0, Some(domain));
        grid.build(Population::random(10, 10.0, 1, 0).view());

        let lattice = grid.lattice();
        assert_eq!(lattice.width, MAX_CELLS_PER_AXIS);
        assert!(lattice.cell_size >= 1e6 / MAX_CELLS_PER_AXIS as f32);
    }

    #[test]
    fn empty_build() {
        let population = Population::random(0, 10.0, 1, 0);
        let mut grid = UniformGrid::new(5.0, None);
        grid.build(population.view());

        assert!(grid.is_empty());
        let mut visited = 0;
        grid.for_each_neighbor(Vec2::ZERO, |_| visited += 1);
        assert_eq!(visited, 0);
    }

    #[test]
    #[cfg(feature = "parallel")]
    fn parallel_build_matches() {
        let population = Population::random(1000, 400.0, 1, 3);
        let mut sequential = UniformGrid::new(20.0, None);
        let mut parallel = UniformGrid::new(20.0, None);

        sequential.build(population.view());
        parallel.par_build(population.view());

        assert_eq!(sequential.lattice(), parallel.lattice());
        assert_eq!(cells_of(&sequential), cells_of(&parallel));
    }
}
