//! Unit tests for Vulkan format conversion functions
//!
//! Pure mappings, no GPU required.

use super::*;

// ============================================================================
// TEXTURE FORMAT CONVERSION TESTS
// ============================================================================

#[test]
fn test_texture_format_to_vk_color_formats() {
    assert_eq!(texture_format_to_vk(TextureFormat::RGBA8_UNORM), vk::Format::R8G8B8A8_UNORM);
    assert_eq!(texture_format_to_vk(TextureFormat::RGBA8_SRGB), vk::Format::R8G8B8A8_SRGB);
    assert_eq!(texture_format_to_vk(TextureFormat::BGRA8_UNORM), vk::Format::B8G8R8A8_UNORM);
    assert_eq!(texture_format_to_vk(TextureFormat::BGRA8_SRGB), vk::Format::B8G8R8A8_SRGB);
    assert_eq!(texture_format_to_vk(TextureFormat::R8_UNORM), vk::Format::R8_UNORM);
    assert_eq!(texture_format_to_vk(TextureFormat::RG8_UNORM), vk::Format::R8G8_UNORM);
    assert_eq!(texture_format_to_vk(TextureFormat::RGBA16_FLOAT), vk::Format::R16G16B16A16_SFLOAT);
    assert_eq!(texture_format_to_vk(TextureFormat::RGBA32_FLOAT), vk::Format::R32G32B32A32_SFLOAT);
}

#[test]
fn test_texture_format_to_vk_depth_formats() {
    assert_eq!(texture_format_to_vk(TextureFormat::DEPTH32_FLOAT), vk::Format::D32_SFLOAT);
    assert_eq!(texture_format_to_vk(TextureFormat::DEPTH24_STENCIL8), vk::Format::D24_UNORM_S8_UINT);
}

#[test]
fn test_texture_aspect() {
    assert_eq!(texture_aspect(TextureFormat::RGBA8_UNORM), vk::ImageAspectFlags::COLOR);
    assert_eq!(texture_aspect(TextureFormat::DEPTH32_FLOAT), vk::ImageAspectFlags::DEPTH);
    assert_eq!(
        texture_aspect(TextureFormat::DEPTH24_STENCIL8),
        vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
    );
}

#[test]
fn test_texture_usage_to_vk() {
    let flags = texture_usage_to_vk(TextureUsage::default());
    assert_eq!(flags, vk::ImageUsageFlags::SAMPLED | vk::ImageUsageFlags::TRANSFER_DST);

    let flags = texture_usage_to_vk(TextureUsage::RENDER_TARGET | TextureUsage::STORAGE);
    assert_eq!(flags, vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::STORAGE);

    assert_eq!(
        texture_usage_to_vk(TextureUsage::DEPTH_STENCIL),
        vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT
    );
    assert!(texture_usage_to_vk(TextureUsage::empty()).is_empty());
}

// ============================================================================
// BUFFER CONVERSION TESTS
// ============================================================================

#[test]
fn test_buffer_usage_to_vk() {
    assert_eq!(buffer_usage_to_vk(BufferUsage::VERTEX), vk::BufferUsageFlags::VERTEX_BUFFER);
    assert_eq!(
        buffer_usage_to_vk(BufferUsage::INDEX | BufferUsage::TRANSFER_DST),
        vk::BufferUsageFlags::INDEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST
    );
    assert_eq!(
        buffer_usage_to_vk(BufferUsage::UNIFORM | BufferUsage::STORAGE | BufferUsage::TRANSFER_SRC),
        vk::BufferUsageFlags::UNIFORM_BUFFER
            | vk::BufferUsageFlags::STORAGE_BUFFER
            | vk::BufferUsageFlags::TRANSFER_SRC
    );
}

#[test]
fn test_memory_location() {
    assert_eq!(memory_location(BufferMemory::GpuOnly), MemoryLocation::GpuOnly);
    assert_eq!(memory_location(BufferMemory::CpuToGpu), MemoryLocation::CpuToGpu);
    assert_eq!(memory_location(BufferMemory::GpuToCpu), MemoryLocation::GpuToCpu);
}

// ============================================================================
// SAMPLER CONVERSION TESTS
// ============================================================================

#[test]
fn test_sampler_filters() {
    assert_eq!(filter_to_vk(SamplerFilter::Nearest), vk::Filter::NEAREST);
    assert_eq!(filter_to_vk(SamplerFilter::Linear), vk::Filter::LINEAR);
    assert_eq!(mipmap_mode_to_vk(SamplerFilter::Nearest), vk::SamplerMipmapMode::NEAREST);
    assert_eq!(mipmap_mode_to_vk(SamplerFilter::Linear), vk::SamplerMipmapMode::LINEAR);
}

#[test]
fn test_sampler_address_modes() {
    assert_eq!(address_mode_to_vk(SamplerAddressMode::Repeat), vk::SamplerAddressMode::REPEAT);
    assert_eq!(
        address_mode_to_vk(SamplerAddressMode::MirroredRepeat),
        vk::SamplerAddressMode::MIRRORED_REPEAT
    );
    assert_eq!(
        address_mode_to_vk(SamplerAddressMode::ClampToEdge),
        vk::SamplerAddressMode::CLAMP_TO_EDGE
    );
    assert_eq!(
        address_mode_to_vk(SamplerAddressMode::ClampToBorder),
        vk::SamplerAddressMode::CLAMP_TO_BORDER
    );
}

#[test]
fn test_border_color_picks_nearest_fixed_color() {
    assert_eq!(border_color_to_vk(Color::BLACK), vk::BorderColor::FLOAT_OPAQUE_BLACK);
    assert_eq!(border_color_to_vk(Color::WHITE), vk::BorderColor::FLOAT_OPAQUE_WHITE);
    assert_eq!(border_color_to_vk(Color::TRANSPARENT), vk::BorderColor::FLOAT_TRANSPARENT_BLACK);
    assert_eq!(
        border_color_to_vk(Color::new(0.9, 0.9, 0.8, 1.0)),
        vk::BorderColor::FLOAT_OPAQUE_WHITE
    );
}

// ============================================================================
// SHADER STAGE / ERROR TESTS
// ============================================================================

#[test]
fn test_shader_stage_to_vk_single_stages_only() {
    assert_eq!(shader_stage_to_vk(ShaderStages::VERTEX), Some(vk::ShaderStageFlags::VERTEX));
    assert_eq!(shader_stage_to_vk(ShaderStages::FRAGMENT), Some(vk::ShaderStageFlags::FRAGMENT));
    assert_eq!(shader_stage_to_vk(ShaderStages::COMPUTE), Some(vk::ShaderStageFlags::COMPUTE));
    assert_eq!(shader_stage_to_vk(ShaderStages::ALL_GRAPHICS), None);
    assert_eq!(shader_stage_to_vk(ShaderStages::empty()), None);
}

#[test]
fn test_vk_result_to_error() {
    assert_eq!(vk_result_to_error(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY, "x"), Error::OutOfMemory);
    assert_eq!(vk_result_to_error(vk::Result::ERROR_OUT_OF_HOST_MEMORY, "x"), Error::OutOfMemory);
    assert_eq!(vk_result_to_error(vk::Result::ERROR_DEVICE_LOST, "x"), Error::DeviceLost);
    assert!(matches!(
        vk_result_to_error(vk::Result::ERROR_INCOMPATIBLE_DRIVER, "create instance"),
        Error::BackendNotSupported(message) if message.starts_with("create instance")
    ));
    assert!(matches!(
        vk_result_to_error(vk::Result::ERROR_INITIALIZATION_FAILED, "x"),
        Error::ResourceCreationFailed(_)
    ));
}
