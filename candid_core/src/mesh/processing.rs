/// Per-vertex differential geometry and bounding volumes for arbitrary mesh data.

use glam::{Vec2, Vec3};
use crate::error::{Error, Result};
use crate::mesh::mesh_data::{Aabb, BoundingSphere, Indices, MeshData};
use crate::types::PrimitiveTopology;

/// Lengths and UV determinants below this are treated as degenerate
const EPSILON: f32 = 1e-6;

// ===== HELPERS =====

/// Check that `data` is an indexed triangle list with in-range indices
fn check_triangle_list(data: &MeshData, operation: &str) -> Result<usize> {
    if data.vertices.is_empty() || data.indices.is_empty() {
        crate::candid_bail!(Error::InvalidArgument, "candid::Mesh",
            "{}: mesh has {} vertices and {} indices", operation, data.vertex_count(), data.index_count());
    }
    if data.topology != PrimitiveTopology::TriangleList {
        crate::candid_bail!(Error::InvalidArgument, "candid::Mesh",
            "{}: expected a triangle list, got {:?}", operation, data.topology);
    }
    if data.index_count() % 3 != 0 {
        crate::candid_bail!(Error::InvalidArgument, "candid::Mesh",
            "{}: index count {} is not a multiple of 3", operation, data.index_count());
    }
    let vertex_count = data.vertex_count() as u32;
    if let Some(index) = data.indices.iter().find(|&index| index >= vertex_count) {
        crate::candid_bail!(Error::InvalidArgument, "candid::Mesh",
            "{}: index {} out of range for {} vertices", operation, index, vertex_count);
    }
    Ok(data.index_count() / 3)
}

/// Vertex indices of triangle `t`; callers validate the index buffer first
fn triangle(indices: &Indices, t: usize) -> [usize; 3] {
    let base = t * 3;
    match indices {
        Indices::U16(i) => [i[base] as usize, i[base + 1] as usize, i[base + 2] as usize],
        Indices::U32(i) => [i[base] as usize, i[base + 1] as usize, i[base + 2] as usize],
    }
}

fn normalize_or_zero(v: Vec3) -> Vec3 {
    let length = v.length();
    if length > EPSILON {
        v / length
    } else {
        Vec3::ZERO
    }
}

fn scratch(len: usize) -> Result<Vec<Vec3>> {
    let mut buffer = Vec::new();
    if buffer.try_reserve_exact(len).is_err() {
        crate::candid_error!("candid::Mesh", "Failed to allocate tangent scratch for {} vertices", len);
        return Err(Error::OutOfMemory);
    }
    buffer.resize(len, Vec3::ZERO);
    Ok(buffer)
}

// ===== NORMALS =====

/// Recompute smooth vertex normals from positions and indices
///
/// Unnormalized face normals are accumulated on each corner, so larger
/// triangles weigh more. Vertices with no usable contribution keep a zero normal.
pub fn calculate_normals(data: &mut MeshData) -> Result<()> {
    let triangle_count = check_triangle_list(data, "calculate_normals")?;
    let MeshData { vertices, indices, .. } = data;

    for vertex in vertices.iter_mut() {
        vertex.normal = [0.0; 3];
    }

    for t in 0..triangle_count {
        let [i0, i1, i2] = triangle(indices, t);
        let p0 = Vec3::from(vertices[i0].position);
        let p1 = Vec3::from(vertices[i1].position);
        let p2 = Vec3::from(vertices[i2].position);
        let face = (p1 - p0).cross(p2 - p0);

        for i in [i0, i1, i2] {
            let accumulated = Vec3::from(vertices[i].normal) + face;
            vertices[i].normal = accumulated.to_array();
        }
    }

    for vertex in vertices.iter_mut() {
        vertex.normal = normalize_or_zero(Vec3::from(vertex.normal)).to_array();
    }

    Ok(())
}

// ===== TANGENTS =====

/// Compute per-vertex tangents from UV set 0; normals must already be set
///
/// The tangent is orthogonalized against the normal and `w` holds the
/// handedness (+1 or -1) of the tangent frame.
pub fn calculate_tangents(data: &mut MeshData) -> Result<()> {
    let triangle_count = check_triangle_list(data, "calculate_tangents")?;
    let MeshData { vertices, indices, .. } = data;

    let mut tangents = scratch(vertices.len())?;
    let mut bitangents = scratch(vertices.len())?;

    for t in 0..triangle_count {
        let [i0, i1, i2] = triangle(indices, t);

        let p0 = Vec3::from(vertices[i0].position);
        let e1 = Vec3::from(vertices[i1].position) - p0;
        let e2 = Vec3::from(vertices[i2].position) - p0;

        let uv0 = Vec2::from(vertices[i0].texcoord0);
        let d1 = Vec2::from(vertices[i1].texcoord0) - uv0;
        let d2 = Vec2::from(vertices[i2].texcoord0) - uv0;

        let det = d1.x * d2.y - d2.x * d1.y;
        let r = if det.abs() < EPSILON { 1.0 } else { 1.0 / det };

        let sdir = (e1 * d2.y - e2 * d1.y) * r;
        let tdir = (e2 * d1.x - e1 * d2.x) * r;

        for i in [i0, i1, i2] {
            tangents[i] += sdir;
            bitangents[i] += tdir;
        }
    }

    for (i, vertex) in vertices.iter_mut().enumerate() {
        let n = Vec3::from(vertex.normal);
        let t = tangents[i];

        let tangent = normalize_or_zero(t - n * n.dot(t));
        let handedness = if n.cross(t).dot(bitangents[i]) < 0.0 { -1.0 } else { 1.0 };

        vertex.tangent = tangent.extend(handedness).to_array();
    }

    Ok(())
}

// ===== BOUNDS =====

/// Axis-aligned bounds of all vertex positions
pub fn calculate_aabb(data: &MeshData) -> Result<Aabb> {
    let Some(first) = data.vertices.first() else {
        crate::candid_bail!(Error::InvalidArgument, "candid::Mesh", "calculate_aabb: mesh has no vertices");
    };

    let mut aabb = Aabb::from_point(Vec3::from(first.position));
    for vertex in &data.vertices[1..] {
        aabb.expand(Vec3::from(vertex.position));
    }
    Ok(aabb)
}

/// Sphere centered on the AABB center, tight around the farthest vertex
pub fn calculate_bounding_sphere(data: &MeshData) -> Result<BoundingSphere> {
    let center = calculate_aabb(data)?.center();
    let radius = data
        .vertices
        .iter()
        .map(|vertex| Vec3::from(vertex.position).distance(center))
        .fold(0.0f32, f32::max);
    Ok(BoundingSphere { center, radius })
}

#[cfg(test)]
#[path = "processing_tests.rs"]
mod tests;
