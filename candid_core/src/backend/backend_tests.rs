use super::*;
use slotmap::SlotMap;

// ============================================================================
// BACKEND KIND
// ============================================================================

#[test]
fn test_backend_kind_indices_are_unique_and_in_range() {
    let mut seen = [false; BackendKind::COUNT];
    seen[BackendKind::Auto.index()] = true;
    for kind in BackendKind::ALL_CONCRETE {
        assert!(kind.index() < BackendKind::COUNT);
        assert!(!seen[kind.index()], "duplicate index for {:?}", kind);
        seen[kind.index()] = true;
    }
    assert!(seen.iter().all(|&s| s));
}

#[test]
fn test_backend_kind_concrete_list_is_ascending() {
    let list = BackendKind::ALL_CONCRETE;
    assert!(list.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(list.iter().all(|kind| kind.is_concrete()));
    assert!(!BackendKind::Auto.is_concrete());
    assert_eq!(BackendKind::default(), BackendKind::Auto);
}

#[test]
fn test_backend_kind_display() {
    assert_eq!(BackendKind::Vulkan.to_string(), "Vulkan");
    assert_eq!(BackendKind::D3D12.to_string(), "Direct3D 12");
    assert_eq!(format!("{}", BackendKind::WebGpu), "WebGPU");
}

// ============================================================================
// HANDLES
// ============================================================================

#[test]
fn test_default_handle_is_null() {
    assert!(BufferHandle::default().is_null());
    assert!(MeshHandle::null().is_null());
    assert_eq!(TextureHandle::default(), TextureHandle::null());
}

#[test]
fn test_stale_handle_no_longer_resolves() {
    let mut buffers: SlotMap<BufferHandle, u32> = SlotMap::with_key();
    let first = buffers.insert(1);
    assert_eq!(buffers.get(first), Some(&1));

    buffers.remove(first);
    let second = buffers.insert(2);
    assert_ne!(first, second);
    assert!(buffers.get(first).is_none());
    assert_eq!(buffers.get(second), Some(&2));
}

// ============================================================================
// LIMITS
// ============================================================================

#[test]
fn test_default_limits_match_vertex_layout_limits() {
    let limits = DeviceLimits::default();
    assert_eq!(limits.max_vertex_attributes as usize, crate::mesh::MAX_VERTEX_ATTRIBUTES);
    assert_eq!(limits.max_vertex_buffers as usize, crate::mesh::MAX_VERTEX_BUFFERS);
    assert!(limits.supports_compute);
    assert!(!limits.supports_ray_tracing);
}
