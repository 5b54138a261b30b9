/// CPU-side mesh data: interleaved vertices, 16/32-bit indices, layout and topology,
/// plus the derived bounding volumes and the submesh table used by `MeshDesc`.

use glam::Vec3;
use crate::error::{Error, Result};
use crate::mesh::vertex::{Vertex, VertexLayout};
use crate::types::{IndexFormat, PrimitiveTopology};

/// Maximum submeshes in one mesh description
pub const MAX_SUBMESHES: usize = 64;

// ===== INDICES =====

/// Index buffer in one of the two supported widths
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indices {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Default for Indices {
    fn default() -> Self {
        Indices::U16(Vec::new())
    }
}

impl Indices {
    pub fn len(&self) -> usize {
        match self {
            Indices::U16(indices) => indices.len(),
            Indices::U32(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn format(&self) -> IndexFormat {
        match self {
            Indices::U16(_) => IndexFormat::U16,
            Indices::U32(_) => IndexFormat::U32,
        }
    }

    /// Index value at `i`, widened to u32
    pub fn get(&self, i: usize) -> Option<u32> {
        match self {
            Indices::U16(indices) => indices.get(i).map(|&index| index as u32),
            Indices::U32(indices) => indices.get(i).copied(),
        }
    }

    /// Iterate over all indices widened to u32
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Indices::U16(indices) => bytemuck::cast_slice(indices),
            Indices::U32(indices) => bytemuck::cast_slice(indices),
        }
    }
}

// ===== MESH DATA =====

/// Geometry ready to be handed to `Device::mesh_create`
///
/// Either both vertex and index buffers are empty (not renderable), or both are
/// populated and every index is below the vertex count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Indices,
    pub layout: VertexLayout,
    pub topology: PrimitiveTopology,
}

impl MeshData {
    /// Triangle list with the standard vertex layout
    pub fn new(vertices: Vec<Vertex>, indices: Indices) -> Self {
        Self {
            vertices,
            indices,
            layout: VertexLayout::standard(),
            topology: PrimitiveTopology::TriangleList,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn index_format(&self) -> IndexFormat {
        self.indices.format()
    }

    /// Stride of the first vertex buffer binding
    pub fn vertex_stride(&self) -> u32 {
        self.layout.strides.first().copied().unwrap_or(Vertex::STRIDE)
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        self.indices.as_bytes()
    }

    /// Check that the mesh is renderable
    pub fn validate(&self) -> Result<()> {
        if self.vertices.is_empty() || self.indices.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "mesh needs vertices and indices (got {} vertices, {} indices)",
                self.vertices.len(),
                self.indices.len()
            )));
        }
        let vertex_count = self.vertices.len() as u32;
        if let Some(index) = self.indices.iter().find(|&index| index >= vertex_count) {
            return Err(Error::InvalidArgument(format!(
                "index {} out of range for {} vertices",
                index, vertex_count
            )));
        }
        if !self.layout.is_valid() {
            return Err(Error::InvalidArgument("invalid vertex layout".to_string()));
        }
        Ok(())
    }

    /// Release both buffers and reset the descriptor. Calling it again is a no-op.
    pub fn free(&mut self) {
        *self = MeshData::default();
    }
}

// ===== BOUNDS =====

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Degenerate box around a single point
    pub fn from_point(point: Vec3) -> Self {
        Self { min: point, max: point }
    }

    /// Grow the box to include `point`
    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Smallest box containing both boxes
    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Half of the size
    pub fn extents(&self) -> Vec3 {
        self.size() * 0.5
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    /// Sphere through the corners of the box
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self {
            center: aabb.center(),
            radius: aabb.extents().length(),
        }
    }
}

// ===== SUBMESHES =====

/// Contiguous index range drawn with one material
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Submesh {
    pub index_offset: u32,
    pub index_count: u32,
    pub material_index: u32,
    pub bounds: Aabb,
}

/// Mesh upload descriptor: geometry, submesh table, overall bounds, label
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshDesc {
    pub data: MeshData,
    pub submeshes: Vec<Submesh>,
    pub bounds: Aabb,
    pub label: Option<String>,
}

impl MeshDesc {
    /// Wrap mesh data, computing its bounds. No submeshes: the whole index range is drawn.
    pub fn new(data: MeshData) -> Result<Self> {
        let bounds = crate::mesh::calculate_aabb(&data)?;
        Ok(Self {
            data,
            submeshes: Vec::new(),
            bounds,
            label: None,
        })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Append a submesh covering `index_count` indices from `index_offset`
    pub fn add_submesh(&mut self, index_offset: u32, index_count: u32, material_index: u32) -> Result<usize> {
        if self.submeshes.len() >= MAX_SUBMESHES {
            crate::candid_bail!(Error::InvalidArgument, "candid::Mesh",
                "mesh already has the maximum of {} submeshes", MAX_SUBMESHES);
        }
        let end = index_offset as usize + index_count as usize;
        if index_count == 0 || end > self.data.index_count() {
            crate::candid_bail!(Error::InvalidArgument, "candid::Mesh",
                "submesh range {}..{} outside of {} indices", index_offset, end, self.data.index_count());
        }

        let mut bounds: Option<Aabb> = None;
        for i in index_offset as usize..end {
            let position = self.data.indices.get(i)
                .and_then(|index| self.data.vertices.get(index as usize))
                .map(|vertex| Vec3::from(vertex.position));
            if let Some(position) = position {
                match bounds.as_mut() {
                    Some(aabb) => aabb.expand(position),
                    None => bounds = Some(Aabb::from_point(position)),
                }
            }
        }

        self.submeshes.push(Submesh {
            index_offset,
            index_count,
            material_index,
            bounds: bounds.unwrap_or_default(),
        });
        Ok(self.submeshes.len() - 1)
    }

    /// Number of submeshes a draw of this mesh issues (at least one)
    pub fn draw_count(&self) -> usize {
        self.submeshes.len().max(1)
    }

    /// Check the geometry and the submesh table
    pub fn validate(&self) -> Result<()> {
        self.data.validate()?;
        if self.submeshes.len() > MAX_SUBMESHES {
            return Err(Error::InvalidArgument(format!(
                "{} submeshes exceeds the maximum of {}",
                self.submeshes.len(),
                MAX_SUBMESHES
            )));
        }
        let index_count = self.data.index_count();
        for (i, submesh) in self.submeshes.iter().enumerate() {
            if submesh.index_offset as usize + submesh.index_count as usize > index_count {
                return Err(Error::InvalidArgument(format!(
                    "submesh {} range exceeds {} indices",
                    i, index_count
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mesh_data_tests.rs"]
mod tests;
