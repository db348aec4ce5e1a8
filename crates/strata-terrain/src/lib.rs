//! Adaptive terrain rendering: a fixed base patch reused at every level of
//! a distance-driven quadtree.
//!
//! Each frame the quadtree is walked from the root with the camera position
//! in terrain space. Nodes beyond their outer radius hand their quadrant back
//! to the parent, which draws it at its own coarser scale. The vertex shader
//! morphs between levels using the inner/outer radius pair carried by every
//! draw, so neighbouring levels meet without cracks.

mod grid;
mod quadtree;
mod terrain;

pub use grid::{GRID_SIZE, generate_grid};
pub use quadtree::{
    MAX_DEPTH, MIN_NODE_SIZE, NodeId, QuadDraw, QuadNode, QuadTree, Quadrant, inner_radius,
    outer_radius,
};
pub use terrain::Terrain;
