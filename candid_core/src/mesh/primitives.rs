/// Primitive mesh generators: cube, UV sphere, plane grid, capped cylinder.
///
/// All generators emit a triangle list with 16-bit indices, white vertex colors,
/// the standard vertex layout and counter-clockwise front faces. Buffers are
/// reserved up front with `try_reserve_exact`, so an allocation failure returns
/// `OutOfMemory` and leaves nothing allocated. Success paths do not log.

use std::f32::consts::PI;
use crate::error::{Error, Result};
use crate::mesh::mesh_data::{Indices, MeshData};
use crate::mesh::vertex::Vertex;

/// Largest vertex count addressable with 16-bit indices
const MAX_U16_VERTICES: u64 = u16::MAX as u64 + 1;

const CORNER_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

/// (normal, corners in half-size units), counter-clockwise seen from outside
const CUBE_FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
    // +Z
    ([0.0, 0.0, 1.0], [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]]),
    // -Z
    ([0.0, 0.0, -1.0], [[1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]]),
    // +X
    ([1.0, 0.0, 0.0], [[1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]]),
    // -X
    ([-1.0, 0.0, 0.0], [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]]),
    // +Y
    ([0.0, 1.0, 0.0], [[-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]]),
    // -Y
    ([0.0, -1.0, 0.0], [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]]),
];

// ===== HELPERS =====

fn require_positive(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        crate::candid_bail!(Error::InvalidArgument, "candid::Mesh",
            "{} must be a finite positive number (got {})", name, value);
    }
    Ok(())
}

fn require_at_least(name: &str, value: u32, min: u32) -> Result<()> {
    if value < min {
        crate::candid_bail!(Error::InvalidArgument, "candid::Mesh",
            "{} must be >= {} (got {})", name, min, value);
    }
    Ok(())
}

/// Vertex count of a `(a+1) x (b+1)` grid, if it fits 16-bit indices
fn grid_vertex_count(a: u32, b: u32) -> Result<usize> {
    let count = (a as u64 + 1).checked_mul(b as u64 + 1);
    match count {
        Some(count) if count <= MAX_U16_VERTICES => Ok(count as usize),
        _ => crate::candid_bail!(Error::InvalidArgument, "candid::Mesh",
            "{} x {} grid does not fit 16-bit indices", a as u64 + 1, b as u64 + 1),
    }
}

/// Reserve both buffers exactly; on failure everything reserved so far is dropped
fn allocate(vertex_count: usize, index_count: usize) -> Result<(Vec<Vertex>, Vec<u16>)> {
    let mut vertices = Vec::new();
    if vertices.try_reserve_exact(vertex_count).is_err() {
        crate::candid_error!("candid::Mesh", "Failed to allocate {} vertices", vertex_count);
        return Err(Error::OutOfMemory);
    }
    let mut indices = Vec::new();
    if indices.try_reserve_exact(index_count).is_err() {
        crate::candid_error!("candid::Mesh", "Failed to allocate {} indices", index_count);
        return Err(Error::OutOfMemory);
    }
    Ok((vertices, indices))
}

/// Two triangles of the quad `a b / c d`, where `a -> c` runs along the first
/// parametric direction and `a -> b` along the second
fn push_quad(indices: &mut Vec<u16>, a: u32, b: u32, c: u32, d: u32) {
    indices.extend_from_slice(&[a as u16, c as u16, b as u16, c as u16, d as u16, b as u16]);
}

// ===== GENERATORS =====

/// Axis-aligned cube centered on the origin, edge length `size`
///
/// 24 vertices (4 per face with flat normals) and 36 indices.
pub fn create_cube(size: f32) -> Result<MeshData> {
    require_positive("size", size)?;
    let half = size * 0.5;

    let (mut vertices, mut indices) = allocate(24, 36)?;

    for (normal, corners) in CUBE_FACES.iter() {
        let base = vertices.len() as u16;
        for (corner, uv) in corners.iter().zip(CORNER_UVS.iter()) {
            let position = [corner[0] * half, corner[1] * half, corner[2] * half];
            vertices.push(Vertex::new(position, *normal, *uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Ok(MeshData::new(vertices, Indices::U16(indices)))
}

/// UV sphere centered on the origin
///
/// `rings + 1` latitude rows of `segments + 1` vertices; the seam column is
/// duplicated so UVs can wrap. Poles are ordinary grid rows, which leaves
/// zero-area triangles there.
pub fn create_sphere(radius: f32, segments: u32, rings: u32) -> Result<MeshData> {
    require_positive("radius", radius)?;
    require_at_least("segments", segments, 3)?;
    require_at_least("rings", rings, 2)?;

    let vertex_count = grid_vertex_count(segments, rings)?;
    let index_count = segments as usize * rings as usize * 6;
    let (mut vertices, mut indices) = allocate(vertex_count, index_count)?;

    for ring in 0..=rings {
        let phi = PI * ring as f32 / rings as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();

        for seg in 0..=segments {
            let theta = 2.0 * PI * seg as f32 / segments as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();

            let unit = [cos_theta * sin_phi, cos_phi, sin_theta * sin_phi];
            let position = [unit[0] * radius, unit[1] * radius, unit[2] * radius];
            let uv = [seg as f32 / segments as f32, ring as f32 / rings as f32];
            vertices.push(Vertex::new(position, unit, uv));
        }
    }

    let row = segments + 1;
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * row + seg;
            let b = a + row;
            push_quad(&mut indices, a, b, a + 1, b + 1);
        }
    }

    Ok(MeshData::new(vertices, Indices::U16(indices)))
}

/// Flat grid on Y = 0 facing +Y, spanning `width` along X and `height` along Z
pub fn create_plane(width: f32, height: f32, subdiv_x: u32, subdiv_y: u32) -> Result<MeshData> {
    require_positive("width", width)?;
    require_positive("height", height)?;
    require_at_least("subdiv_x", subdiv_x, 1)?;
    require_at_least("subdiv_y", subdiv_y, 1)?;

    let vertex_count = grid_vertex_count(subdiv_x, subdiv_y)?;
    let index_count = subdiv_x as usize * subdiv_y as usize * 6;
    let (mut vertices, mut indices) = allocate(vertex_count, index_count)?;

    for y in 0..=subdiv_y {
        let ty = y as f32 / subdiv_y as f32;
        for x in 0..=subdiv_x {
            let tx = x as f32 / subdiv_x as f32;
            let position = [-width * 0.5 + tx * width, 0.0, -height * 0.5 + ty * height];
            vertices.push(Vertex::new(position, [0.0, 1.0, 0.0], [tx, ty]));
        }
    }

    // Rows run along +Z, so a -> b (next row) then a -> c (next column) faces +Y
    let row = subdiv_x + 1;
    for y in 0..subdiv_y {
        for x in 0..subdiv_x {
            let a = y * row + x;
            let b = a + row;
            let (c, d) = (a + 1, b + 1);
            indices.extend_from_slice(&[a as u16, b as u16, c as u16, c as u16, b as u16, d as u16]);
        }
    }

    Ok(MeshData::new(vertices, Indices::U16(indices)))
}

/// Capped cylinder along Y, centered on the origin
///
/// Vertex order: top side ring, bottom side ring, top cap (center + ring),
/// bottom cap (center + ring). Side and caps do not share vertices so each
/// keeps its own normals.
pub fn create_cylinder(radius: f32, height: f32, segments: u32) -> Result<MeshData> {
    require_positive("radius", radius)?;
    require_positive("height", height)?;
    require_at_least("segments", segments, 3)?;

    let ring = segments as u64 + 1;
    let vertex_count = 4 * ring + 2;
    if vertex_count > MAX_U16_VERTICES {
        crate::candid_bail!(Error::InvalidArgument, "candid::Mesh",
            "{} segments do not fit 16-bit indices", segments);
    }
    let index_count = segments as usize * 12;
    let (mut vertices, mut indices) = allocate(vertex_count as usize, index_count)?;

    let half = height * 0.5;
    let angle = |s: u32| 2.0 * PI * s as f32 / segments as f32;

    // Side rings
    for (y, v) in [(half, 0.0), (-half, 1.0)] {
        for s in 0..=segments {
            let (sin, cos) = angle(s).sin_cos();
            let u = s as f32 / segments as f32;
            vertices.push(Vertex::new([radius * cos, y, radius * sin], [cos, 0.0, sin], [u, v]));
        }
    }

    // Caps
    for (y, normal_y, v_sign) in [(half, 1.0, 1.0), (-half, -1.0, -1.0)] {
        vertices.push(Vertex::new([0.0, y, 0.0], [0.0, normal_y, 0.0], [0.5, 0.5]));
        for s in 0..=segments {
            let (sin, cos) = angle(s).sin_cos();
            let uv = [0.5 + 0.5 * cos, 0.5 + v_sign * 0.5 * sin];
            vertices.push(Vertex::new([radius * cos, y, radius * sin], [0.0, normal_y, 0.0], uv));
        }
    }

    let ring = ring as u32;
    for s in 0..segments {
        push_quad(&mut indices, s, s + ring, s + 1, s + ring + 1);
    }

    let top_center = 2 * ring;
    let top_ring = top_center + 1;
    for s in 0..segments {
        indices.extend_from_slice(&[top_center as u16, (top_ring + s + 1) as u16, (top_ring + s) as u16]);
    }

    let bottom_center = top_ring + ring;
    let bottom_ring = bottom_center + 1;
    for s in 0..segments {
        indices.extend_from_slice(&[bottom_center as u16, (bottom_ring + s) as u16, (bottom_ring + s + 1) as u16]);
    }

    Ok(MeshData::new(vertices, Indices::U16(indices)))
}

#[cfg(test)]
#[path = "primitives_tests.rs"]
mod tests;
