//! Base patch shared by every quadtree level.

use glam::Vec3;
use strata_assets::Geometry;

/// Cells per side of the base patch.
pub const GRID_SIZE: u32 = 16;

static_assertions::const_assert_eq!(GRID_SIZE % 2, 0);

const HALF: u32 = GRID_SIZE / 2;

/// Generate the normalized `[0, 1]` patch on the X/Z plane.
///
/// Every cell owns four vertices and two triangles. Cells are emitted as four
/// half-size sub-grids (top-left, top-right, bottom-left, bottom-right), so
/// each quarter of the index buffer covers exactly one quadrant of the patch.
pub fn generate_grid() -> Geometry {
    let cells = (GRID_SIZE * GRID_SIZE) as usize;
    let mut positions = vec![Vec3::ZERO; cells * 4];
    let mut indices = Vec::with_capacity(cells * 6);

    for (start_x, start_z) in [(0, 0), (HALF, 0), (0, HALF), (HALF, HALF)] {
        generate_subgrid(&mut positions, &mut indices, start_x, start_z);
    }
    Geometry::new(positions, indices)
}

fn generate_subgrid(positions: &mut [Vec3], indices: &mut Vec<u32>, start_x: u32, start_z: u32) {
    let g = GRID_SIZE as f32;
    for j in start_z..start_z + HALF {
        for i in start_x..start_x + HALF {
            let idx = 4 * (i + j * GRID_SIZE);
            let (x0, x1) = (i as f32 / g, (i + 1) as f32 / g);
            let (z0, z1) = (j as f32 / g, (j + 1) as f32 / g);

            let base = idx as usize;
            positions[base] = Vec3::new(x0, 0.0, z0);
            positions[base + 1] = Vec3::new(x1, 0.0, z0);
            positions[base + 2] = Vec3::new(x1, 0.0, z1);
            positions[base + 3] = Vec3::new(x0, 0.0, z1);

            indices.extend_from_slice(&[idx, idx + 3, idx + 2, idx, idx + 2, idx + 1]);
        }
    }
}
