//! Structure-of-arrays cube kept for callers of the first mesh API.
//!
//! New code uses [`MeshData`] and the generators in `primitives`; this type only
//! converts into it.

#![allow(deprecated)]

use crate::error::{Error, Result};
use crate::mesh::mesh_data::{Indices, MeshData};
use crate::mesh::processing::calculate_normals;
use crate::mesh::vertex::Vertex;

/// Separate x/y/z position arrays and a/b/c triangle corner arrays
#[deprecated(note = "use MeshData and mesh::create_cube")]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LegacyMesh {
    /// `[x, y, z]` coordinate arrays, one entry per vertex each
    pub vertices: [Vec<f32>; 3],
    /// `[a, b, c]` corner arrays, one entry per triangle each
    pub triangles: [Vec<usize>; 3],
}

impl LegacyMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices[0].len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles[0].len()
    }

    /// Interleave into a [`MeshData`] with recomputed smooth normals
    ///
    /// Uses 16-bit indices when every vertex is addressable with them, 32-bit otherwise.
    pub fn to_mesh_data(&self) -> Result<MeshData> {
        let vertex_count = self.vertex_count();
        let triangle_count = self.triangle_count();
        if self.vertices.iter().any(|axis| axis.len() != vertex_count)
            || self.triangles.iter().any(|corner| corner.len() != triangle_count)
        {
            crate::candid_bail!(Error::InvalidArgument, "candid::Mesh",
                "legacy mesh arrays have mismatched lengths");
        }

        let mut vertices = Vec::new();
        vertices.try_reserve_exact(vertex_count).map_err(|_| Error::OutOfMemory)?;
        for i in 0..vertex_count {
            let position = [self.vertices[0][i], self.vertices[1][i], self.vertices[2][i]];
            vertices.push(Vertex::new(position, [0.0; 3], [0.0; 2]));
        }

        let corners = || {
            (0..triangle_count).flat_map(|t| [self.triangles[0][t], self.triangles[1][t], self.triangles[2][t]])
        };
        if let Some(index) = corners().find(|&index| index >= vertex_count) {
            crate::candid_bail!(Error::InvalidArgument, "candid::Mesh",
                "legacy triangle corner {} out of range for {} vertices", index, vertex_count);
        }

        let indices = if vertex_count <= u16::MAX as usize + 1 {
            Indices::U16(narrow_indices(corners())?)
        } else {
            Indices::U32(narrow_indices(corners())?)
        };

        let mut data = MeshData::new(vertices, indices);
        data.validate()?;
        calculate_normals(&mut data)?;
        Ok(data)
    }
}

/// Convert already range-checked corners to the index width
fn narrow_indices<T: TryFrom<usize>>(corners: impl Iterator<Item = usize>) -> Result<Vec<T>> {
    let mut indices = Vec::new();
    for index in corners {
        match T::try_from(index) {
            Ok(narrowed) => indices.push(narrowed),
            Err(_) => crate::candid_bail!(Error::InvalidArgument, "candid::Mesh",
                "legacy triangle corner {} does not fit the index format", index),
        }
    }
    Ok(indices)
}

/// 8-vertex, 12-triangle cube centered on the origin
#[deprecated(note = "use mesh::create_cube")]
pub fn create_cube_mesh(size: f32) -> LegacyMesh {
    let h = size * 0.5;
    let corners: [[f32; 3]; 8] = [
        [-h, -h, -h],
        [h, -h, -h],
        [h, h, -h],
        [-h, h, -h],
        [-h, -h, h],
        [h, -h, h],
        [h, h, h],
        [-h, h, h],
    ];
    let triangles: [[usize; 3]; 12] = [
        // +Z
        [4, 5, 6], [4, 6, 7],
        // -Z
        [0, 3, 2], [0, 2, 1],
        // +X
        [1, 2, 6], [1, 6, 5],
        // -X
        [0, 4, 7], [0, 7, 3],
        // +Y
        [3, 7, 6], [3, 6, 2],
        // -Y
        [0, 1, 5], [0, 5, 4],
    ];

    LegacyMesh {
        vertices: [
            corners.iter().map(|c| c[0]).collect(),
            corners.iter().map(|c| c[1]).collect(),
            corners.iter().map(|c| c[2]).collect(),
        ],
        triangles: [
            triangles.iter().map(|t| t[0]).collect(),
            triangles.iter().map(|t| t[1]).collect(),
            triangles.iter().map(|t| t[2]).collect(),
        ],
    }
}

#[cfg(test)]
#[path = "legacy_tests.rs"]
mod tests;
