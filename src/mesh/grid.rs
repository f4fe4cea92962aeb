use super::vertex::{PositionVertex, TexCoordVertex};
use crate::constants::terrain::{GRID_EXTENT, GRID_MIN, MAX_TESSELLATION};
use crate::error::{TerrainError, TerrainResult};

/// CPU-side terrain grid over [-1, 1] x {0} x [-1, 1].
///
/// Heights are applied later by the terrain shader; every generated vertex
/// has y = 0.
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    tessellation: u32,
    positions: Vec<PositionVertex>,
    tex_coords: Vec<TexCoordVertex>,
    indices: Vec<u32>,
}

impl TerrainGrid {
    /// Build a grid with `tessellation` cells per side.
    ///
    /// Each cell (x, z) emits (top_left, bottom_left, top_right) and
    /// (top_right, bottom_left, bottom_right). Seen from +y both triangles
    /// wind counter-clockwise, which is front-facing under wgpu's default
    /// `FrontFace::Ccw`.
    pub fn generate(tessellation: u32) -> TerrainResult<Self> {
        validate_tessellation(tessellation)?;

        let side = tessellation + 1;
        let vertex_count = side as usize * side as usize;
        let mut positions = Vec::with_capacity(vertex_count);
        let mut tex_coords = Vec::with_capacity(vertex_count);
        let mut indices = Vec::with_capacity(6 * tessellation as usize * tessellation as usize);

        let step = GRID_EXTENT / tessellation as f32;
        let inv = 1.0 / tessellation as f32;

        for z in 0..=tessellation {
            for x in 0..=tessellation {
                positions.push(PositionVertex {
                    position: [GRID_MIN + x as f32 * step, 0.0, GRID_MIN + z as f32 * step],
                });
                tex_coords.push(TexCoordVertex {
                    uv: [x as f32 * inv, z as f32 * inv],
                });

                if x < tessellation && z < tessellation {
                    let top_left = z * side + x;
                    let top_right = top_left + 1;
                    let bottom_left = top_left + side;
                    let bottom_right = bottom_left + 1;

                    indices.extend_from_slice(&[
                        top_left,
                        bottom_left,
                        top_right,
                        top_right,
                        bottom_left,
                        bottom_right,
                    ]);
                }
            }
        }

        log::debug!(
            "[TerrainGrid::generate] tessellation {} -> {} vertices, {} indices",
            tessellation,
            positions.len(),
            indices.len()
        );

        Ok(Self {
            tessellation,
            positions,
            tex_coords,
            indices,
        })
    }

    pub fn tessellation(&self) -> u32 {
        self.tessellation
    }

    pub fn positions(&self) -> &[PositionVertex] {
        &self.positions
    }

    pub fn tex_coords(&self) -> &[TexCoordVertex] {
        &self.tex_coords
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Triangles as index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| [tri[0], tri[1], tri[2]])
    }
}

/// Reject tessellations that would produce empty geometry or overflow u32
/// indices
pub fn validate_tessellation(tessellation: u32) -> TerrainResult<()> {
    if tessellation == 0 {
        return Err(TerrainError::InvalidTessellation {
            tessellation,
            reason: "must be at least 1".to_string(),
        });
    }
    if tessellation > MAX_TESSELLATION {
        return Err(TerrainError::InvalidTessellation {
            tessellation,
            reason: format!("exceeds maximum of {}", MAX_TESSELLATION),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xz(grid: &TerrainGrid, index: u32) -> (f32, f32) {
        let p = grid.positions()[index as usize].position;
        (p[0], p[2])
    }

    /// Signed area in the xz-plane; positive when counter-clockwise seen from +y
    fn signed_area_from_above(grid: &TerrainGrid, tri: [u32; 3]) -> f32 {
        let (ax, az) = xz(grid, tri[0]);
        let (bx, bz) = xz(grid, tri[1]);
        let (cx, cz) = xz(grid, tri[2]);
        // Cross product y component of (b - a) x (c - a)
        0.5 * ((bz - az) * (cx - ax) - (bx - ax) * (cz - az))
    }

    #[test]
    fn test_counts_match_tessellation() {
        for t in [1u32, 2, 3, 7, 16, 64] {
            let grid = TerrainGrid::generate(t).unwrap();
            let side = (t + 1) as usize;
            assert_eq!(grid.vertex_count(), side * side);
            assert_eq!(grid.tex_coords().len(), side * side);
            assert_eq!(grid.index_count(), 6 * (t as usize) * (t as usize));
            assert!(grid.indices().iter().all(|&i| (i as usize) < side * side));
        }
    }

    #[test]
    fn test_zero_tessellation_rejected() {
        let err = TerrainGrid::generate(0).unwrap_err();
        assert!(matches!(err, TerrainError::InvalidTessellation { tessellation: 0, .. }));
    }

    #[test]
    fn test_oversized_tessellation_rejected() {
        assert!(validate_tessellation(MAX_TESSELLATION).is_ok());
        assert!(validate_tessellation(MAX_TESSELLATION + 1).is_err());
    }

    #[test]
    fn test_positions_and_uvs_span_domain() {
        let grid = TerrainGrid::generate(4).unwrap();
        let first = grid.positions()[0].position;
        let last = grid.positions()[grid.vertex_count() - 1].position;
        assert_eq!(first, [-1.0, 0.0, -1.0]);
        assert!((last[0] - 1.0).abs() < 1e-6 && (last[2] - 1.0).abs() < 1e-6);
        assert!(grid.positions().iter().all(|p| p.position[1] == 0.0));

        assert_eq!(grid.tex_coords()[0].uv, [0.0, 0.0]);
        assert_eq!(grid.tex_coords()[grid.vertex_count() - 1].uv, [1.0, 1.0]);
        // Vertex (x=1, z=0) sits one step along +x
        assert_eq!(grid.tex_coords()[1].uv, [0.25, 0.0]);
        assert_eq!(grid.positions()[1].position, [-0.5, 0.0, -1.0]);
    }

    #[test]
    fn test_first_cell_indices() {
        let grid = TerrainGrid::generate(2).unwrap();
        assert_eq!(&grid.indices()[..6], &[0, 3, 1, 1, 3, 4]);
    }

    #[test]
    fn test_cell_triangles_cover_cell_exactly() {
        let t = 5;
        let grid = TerrainGrid::generate(t).unwrap();
        let step = 2.0 / t as f32;
        let cell_area = step * step;

        let tris: Vec<[u32; 3]> = grid.triangles().collect();
        for cell in tris.chunks_exact(2) {
            let a = signed_area_from_above(&grid, cell[0]).abs();
            let b = signed_area_from_above(&grid, cell[1]).abs();
            assert!((a + b - cell_area).abs() < 1e-5);
            assert!((a - b).abs() < 1e-5);

            // The two triangles share exactly the diagonal
            let shared = cell[0].iter().filter(|i| cell[1].contains(i)).count();
            assert_eq!(shared, 2);
        }
    }

    #[test]
    fn test_all_triangles_face_up() {
        let grid = TerrainGrid::generate(8).unwrap();
        assert!(grid
            .triangles()
            .all(|tri| signed_area_from_above(&grid, tri) > 0.0));
    }
}
