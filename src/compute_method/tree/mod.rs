pub(crate) mod barnes_hut;

use glam::Vec2;

use super::SpatialIndex;
use crate::{bbox::BoundingBox, particle_store::Particles};

/// Leaves with more particles than this are subdivided.
pub const MAX_PARTICLES_PER_LEAF: usize = 8;

/// Nodes at this depth are never subdivided.
pub const MAX_DEPTH: usize = 20;

/// Nodes with a half side length this small or smaller are never subdivided.
pub const MIN_NODE_SIZE: f32 = 1.0;

/// Margin added around the particles when sizing the root.
pub const GROWTH_FACTOR: f32 = 1.05;

/// Index of a node in [`Quadtree::nodes`].
pub type NodeID = u32;

/// Square region of the plane covered by a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    /// Centre of the square.
    pub centre: Vec2,
    /// Half the side length.
    pub half: f32,
}

impl Quad {
    /// Smallest square centred on `bbox` that contains it, grown by [`GROWTH_FACTOR`].
    pub fn containing(bbox: BoundingBox) -> Self {
        let size = bbox.size();
        Self {
            centre: bbox.centre(),
            half: (size.x.max(size.y) * 0.5 * GROWTH_FACTOR).max(MIN_NODE_SIZE),
        }
    }

    /// Returns true if `point` lies inside the square or on its edges.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        (point - self.centre).abs().cmple(Vec2::splat(self.half)).all()
    }

    /// Quadrant of `point`: 0 for south-west, 1 for south-east, 2 for north-west, 3 for north-east.
    #[inline]
    pub fn quadrant(&self, point: Vec2) -> usize {
        let east = point.x >= self.centre.x;
        let north = point.y >= self.centre.y;
        east as usize | (north as usize) << 1
    }

    /// The four quadrants, in [`quadrant`](Self::quadrant) order.
    #[inline]
    pub fn subdivide(&self) -> [Self; 4] {
        let half = self.half * 0.5;
        [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)].map(|(x, y)| Self {
            centre: self.centre + Vec2::new(x, y) * half,
            half,
        })
    }
}

/// Node of a [`Quadtree`].
///
/// Every node owns the contiguous run `first..first + len` of the tree's particle indices, the
/// particles inside it. Particles have unit mass, so `mass` is the number of particles. Internal
/// nodes always have four children, some of which may be empty.
#[derive(Clone, Copy, Debug)]
pub struct Node {
    /// Region covered by the node.
    pub bounds: Quad,
    /// Index of the first of the four consecutive children, in quadrant order. `None` for leaves.
    pub children: Option<NodeID>,
    /// Start of the node's run of particle indices.
    pub first: u32,
    /// Number of particles in the node.
    pub len: u32,
    /// Total mass of the node.
    pub mass: f32,
    /// Mass-weighted mean position of the particles in the node.
    pub centre_of_mass: Vec2,
}

impl Node {
    /// Returns true if the node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Region quadtree over the active particles, rebuilt from scratch on every step.
///
/// Leaves hold at most [`MAX_PARTICLES_PER_LEAF`] particles, unless the depth limit or the minimum
/// node size stops the subdivision first, which is what happens with coincident particles.
#[derive(Clone, Debug, Default)]
pub struct Quadtree {
    nodes: Vec<Node>,
    indices: Vec<u32>,
    depth: usize,
}

impl Quadtree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes of the tree. The root, if any, is the first node.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the deepest node, the root being at depth 0.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Indices of the particles inside `node`.
    #[inline]
    pub fn leaf_particles(&self, node: &Node) -> &[u32] {
        &self.indices[node.first as usize..(node.first + node.len) as usize]
    }

    fn empty_node(bounds: Quad, first: usize) -> Node {
        Node {
            bounds,
            children: None,
            first: first as u32,
            len: 0,
            mass: 0.0,
            centre_of_mass: bounds.centre,
        }
    }

    // Fills the node `id`, whose bounds are already set, with the run `first..first + len`.
    fn fill(&mut self, id: usize, positions: &[Vec2], first: usize, len: usize, depth: usize) {
        self.depth = self.depth.max(depth);
        let bounds = self.nodes[id].bounds;

        let node = &mut self.nodes[id];
        node.first = first as u32;
        node.len = len as u32;
        node.mass = len as f32;

        let run = &mut self.indices[first..first + len];
        let coincident = run
            .windows(2)
            .all(|w| positions[w[0] as usize] == positions[w[1] as usize]);

        let splittable = len > MAX_PARTICLES_PER_LEAF
            && depth < MAX_DEPTH
            && bounds.half > MIN_NODE_SIZE
            && !coincident;

        if !splittable {
            let sum: Vec2 = run.iter().map(|&i| positions[i as usize]).sum();
            if len > 0 {
                self.nodes[id].centre_of_mass = sum / len as f32;
            }
            return;
        }

        run.sort_by_key(|&i| bounds.quadrant(positions[i as usize]));
        let mut counts = [0; 4];
        for &i in run.iter() {
            counts[bounds.quadrant(positions[i as usize])] += 1;
        }

        let children = self.nodes.len();
        self.nodes[id].children = Some(children as NodeID);

        for child in bounds.subdivide() {
            self.nodes.push(Self::empty_node(child, first));
        }
        let mut start = first;
        for (quadrant, count) in counts.into_iter().enumerate() {
            self.fill(children + quadrant, positions, start, count, depth + 1);
            start += count;
        }

        let weighted: Vec2 = self.nodes[children..children + 4]
            .iter()
            .map(|child| child.centre_of_mass * child.mass)
            .sum();
        self.nodes[id].centre_of_mass = weighted / len as f32;
    }
}

impl SpatialIndex for Quadtree {
    fn build(&mut self, particles: Particles<'_>) {
        self.nodes.clear();
        self.indices.clear();
        self.depth = 0;

        self.indices
            .extend(particles.active_indices().map(|i| i as u32));
        if self.indices.is_empty() {
            return;
        }

        let bbox = BoundingBox::containing(
            self.indices
                .iter()
                .map(|&i| particles.positions[i as usize]),
        );
        let len = self.indices.len();
        self.nodes.push(Self::empty_node(Quad::containing(bbox), 0));
        self.fill(0, particles.positions, 0, len, 0);

        log::trace!(
            "quadtree built: {} nodes, depth {}",
            self.nodes.len(),
            self.depth
        );
    }
}
