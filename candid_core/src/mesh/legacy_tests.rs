use super::*;
use crate::error::Error;
use crate::types::IndexFormat;
use glam::Vec3;

#[test]
fn test_legacy_cube_counts() {
    let mesh = create_cube_mesh(2.0);
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.triangle_count(), 12);
    assert!(mesh.vertices.iter().flatten().all(|&c| c == 1.0 || c == -1.0));
}

#[test]
fn test_legacy_cube_converts_to_mesh_data() {
    let data = create_cube_mesh(2.0).to_mesh_data().unwrap();
    assert_eq!(data.vertex_count(), 8);
    assert_eq!(data.index_count(), 36);
    assert_eq!(data.index_format(), IndexFormat::U16);

    // Smooth normals on a shared-corner cube point away from the center
    for vertex in &data.vertices {
        let position = Vec3::from(vertex.position).normalize();
        let normal = Vec3::from(vertex.normal);
        assert!(normal.dot(position) > 0.5);
        assert!((normal.length() - 1.0).abs() < 1e-5);
    }
}

#[test]
fn test_legacy_mismatched_arrays_are_rejected() {
    let mut mesh = create_cube_mesh(1.0);
    mesh.vertices[1].pop();
    assert!(mesh.to_mesh_data().is_err());

    let mut mesh = create_cube_mesh(1.0);
    mesh.triangles[0][0] = 8;
    assert!(mesh.to_mesh_data().is_err());
}

#[test]
fn test_legacy_out_of_range_corner_is_rejected_not_clamped() {
    // 65536 vertices still fit 16-bit indices, so a clamped corner would look valid
    let vertex_count = u16::MAX as usize + 1;
    let mesh = LegacyMesh {
        vertices: [vec![0.0; vertex_count], vec![0.0; vertex_count], vec![0.0; vertex_count]],
        triangles: [vec![0], vec![1], vec![70_000]],
    };
    assert!(matches!(mesh.to_mesh_data(), Err(Error::InvalidArgument(_))));
}

#[test]
fn test_legacy_large_mesh_uses_32_bit_indices() {
    let vertex_count = u16::MAX as usize + 2;
    let last = vertex_count - 1;
    let mesh = LegacyMesh {
        vertices: [
            (0..vertex_count).map(|i| i as f32).collect(),
            (0..vertex_count).map(|i| (i % 2) as f32).collect(),
            vec![0.0; vertex_count],
        ],
        triangles: [vec![0], vec![1], vec![last]],
    };
    let data = mesh.to_mesh_data().unwrap();
    assert_eq!(data.index_format(), IndexFormat::U32);
    assert_eq!(data.indices.get(2), Some(last as u32));
}
