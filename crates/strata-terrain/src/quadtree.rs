//! Terrain LOD quadtree stored in a flat arena.

use glam::Vec3;
use strata_math::Aabb;

/// Deepest level a node can sit at (the root is level 1).
pub const MAX_DEPTH: u8 = 8;

/// Nodes at or below this edge length never subdivide.
pub const MIN_NODE_SIZE: f32 = 16.0;

/// One quarter of a node's footprint.
///
/// The order matches the layout of the base patch's index buffer: quarter
/// `i` of the indices covers quadrant `i` of the patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Offset of this quadrant's min corner from the parent's min corner.
    pub fn offset(self, half: f32) -> Vec3 {
        match self {
            Quadrant::TopLeft => Vec3::ZERO,
            Quadrant::TopRight => Vec3::new(half, 0.0, 0.0),
            Quadrant::BottomLeft => Vec3::new(0.0, 0.0, half),
            Quadrant::BottomRight => Vec3::new(half, 0.0, half),
        }
    }
}

/// Index of a node inside its [`QuadTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A square region of the terrain at one level of detail.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadNode {
    /// Min corner in terrain space. Y is always zero.
    pub min: Vec3,
    /// Edge length in terrain units.
    pub size: f32,
    /// Depth in the tree, 1 for the root.
    pub lod: u8,
    children: Option<[NodeId; 4]>,
}

impl QuadNode {
    pub fn children(&self) -> Option<[NodeId; 4]> {
        self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// The node's flat footprint.
    pub fn footprint(&self) -> Aabb {
        Aabb::square_xz(self.min, self.size)
    }

    fn can_subdivide(&self) -> bool {
        self.lod < MAX_DEPTH && self.size > MIN_NODE_SIZE
    }
}

/// Radius inside which a node of `size` must hand off to finer children.
pub fn outer_radius(size: f32) -> f32 {
    let factor = if size > 17.0 { 2.0 } else { 1.0 };
    factor * (2.0 * size * size).sqrt() + size * 0.25
}

/// Radius at which vertices of a node of `size` start morphing towards the
/// coarser level: the child's outer radius plus the child's diagonal.
pub fn inner_radius(size: f32) -> f32 {
    let half = size / 2.0;
    outer_radius(half) + (2.0 * half * half).sqrt()
}

/// One emitted terrain draw: a quarter of the base patch placed at a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadDraw {
    pub first_index: u32,
    pub index_count: u32,
    /// `(outer_radius, inner_radius, 0)` of the emitting node.
    pub morph_const: Vec3,
    pub quad_size: f32,
    pub quad_min: Vec3,
    pub quadrant: Quadrant,
    pub lod: u8,
}

impl QuadDraw {
    /// Terrain-space area covered by this draw.
    pub fn area(&self) -> f32 {
        let half = self.quad_size / 2.0;
        half * half
    }

    /// Min corner of the covered quadrant.
    pub fn covered_min(&self) -> Vec3 {
        self.quad_min + self.quadrant.offset(self.quad_size / 2.0)
    }
}

/// Fully subdivided terrain quadtree. Node 0 is the root.
#[derive(Clone, Debug)]
pub struct QuadTree {
    nodes: Vec<QuadNode>,
}

impl QuadTree {
    /// Build a tree covering `[0, size]` on X and Z, subdividing until
    /// [`MAX_DEPTH`] or [`MIN_NODE_SIZE`] is reached.
    pub fn new(size: f32) -> Self {
        let mut tree = Self {
            nodes: vec![QuadNode {
                min: Vec3::ZERO,
                size,
                lod: 1,
                children: None,
            }],
        };
        tree.create_children(NodeId::ROOT);
        tree
    }

    fn create_children(&mut self, id: NodeId) {
        let parent = &self.nodes[id.index()];
        if !parent.can_subdivide() {
            return;
        }
        let half = parent.size / 2.0;
        let lod = parent.lod + 1;
        let min = parent.min;

        let first = self.nodes.len() as u32;
        let children = [
            NodeId(first),
            NodeId(first + 1),
            NodeId(first + 2),
            NodeId(first + 3),
        ];
        for quadrant in Quadrant::ALL {
            self.nodes.push(QuadNode {
                min: min + quadrant.offset(half),
                size: half,
                lod,
                children: None,
            });
        }
        self.nodes[id.index()].children = Some(children);
        for child in children {
            self.create_children(child);
        }
    }

    pub fn root(&self) -> &QuadNode {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> &QuadNode {
        &self.nodes[id.index()]
    }

    /// World size of the root node.
    pub fn size(&self) -> f32 {
        self.root().size
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &QuadNode> {
        self.nodes.iter()
    }

    pub fn leaves(&self) -> impl Iterator<Item = &QuadNode> {
        self.nodes.iter().filter(|n| n.is_leaf())
    }

    /// Deepest level present in the tree.
    pub fn depth(&self) -> u8 {
        self.nodes.iter().map(|n| n.lod).max().unwrap_or(0)
    }

    /// Select the nodes to draw for `camera_pos` (terrain space) and emit one
    /// draw per rendered quadrant. `index_count` is the base patch's index
    /// count; each draw covers a quarter of it.
    pub fn select(&self, camera_pos: Vec3, index_count: u32) -> Vec<QuadDraw> {
        let mut draws = Vec::new();
        self.select_node(NodeId::ROOT, camera_pos, index_count / 4, &mut draws);
        draws
    }

    /// Returns false when the node is too far away to be drawn at its level,
    /// in which case the parent draws the quadrant instead.
    fn select_node(
        &self,
        id: NodeId,
        camera_pos: Vec3,
        quarter: u32,
        out: &mut Vec<QuadDraw>,
    ) -> bool {
        let node = &self.nodes[id.index()];
        let distance = node.footprint().distance_xz(camera_pos);
        let outer = outer_radius(node.size);
        if distance > outer && node.lod > 1 {
            return false;
        }

        let morph_const = Vec3::new(outer, inner_radius(node.size), 0.0);
        for quadrant in Quadrant::ALL {
            let child_rendered = node.children.is_some_and(|children| {
                self.select_node(children[quadrant.index()], camera_pos, quarter, out)
            });
            if !child_rendered {
                out.push(QuadDraw {
                    first_index: quarter * quadrant.index() as u32,
                    index_count: quarter,
                    morph_const,
                    quad_size: node.size,
                    quad_min: node.min,
                    quadrant,
                    lod: node.lod,
                });
            }
        }
        true
    }
}
