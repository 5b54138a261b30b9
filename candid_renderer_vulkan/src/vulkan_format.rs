/// Conversions from candid descriptor types to their Vulkan equivalents

use ash::vk;
use candid_core::candid::shader::ShaderStages;
use candid_core::candid::{
    BufferMemory, BufferUsage, Color, Error, SamplerAddressMode, SamplerFilter, TextureFormat,
    TextureUsage,
};
use gpu_allocator::MemoryLocation;

// ===== TEXTURES =====

pub(crate) fn texture_format_to_vk(format: TextureFormat) -> vk::Format {
    match format {
        TextureFormat::RGBA8_UNORM => vk::Format::R8G8B8A8_UNORM,
        TextureFormat::RGBA8_SRGB => vk::Format::R8G8B8A8_SRGB,
        TextureFormat::BGRA8_UNORM => vk::Format::B8G8R8A8_UNORM,
        TextureFormat::BGRA8_SRGB => vk::Format::B8G8R8A8_SRGB,
        TextureFormat::R8_UNORM => vk::Format::R8_UNORM,
        TextureFormat::RG8_UNORM => vk::Format::R8G8_UNORM,
        TextureFormat::RGBA16_FLOAT => vk::Format::R16G16B16A16_SFLOAT,
        TextureFormat::RGBA32_FLOAT => vk::Format::R32G32B32A32_SFLOAT,
        TextureFormat::DEPTH32_FLOAT => vk::Format::D32_SFLOAT,
        TextureFormat::DEPTH24_STENCIL8 => vk::Format::D24_UNORM_S8_UINT,
    }
}

pub(crate) fn texture_usage_to_vk(usage: TextureUsage) -> vk::ImageUsageFlags {
    let mut flags = vk::ImageUsageFlags::empty();
    if usage.contains(TextureUsage::SAMPLED) {
        flags |= vk::ImageUsageFlags::SAMPLED;
    }
    if usage.contains(TextureUsage::STORAGE) {
        flags |= vk::ImageUsageFlags::STORAGE;
    }
    if usage.contains(TextureUsage::RENDER_TARGET) {
        flags |= vk::ImageUsageFlags::COLOR_ATTACHMENT;
    }
    if usage.contains(TextureUsage::DEPTH_STENCIL) {
        flags |= vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT;
    }
    if usage.contains(TextureUsage::TRANSFER_SRC) {
        flags |= vk::ImageUsageFlags::TRANSFER_SRC;
    }
    if usage.contains(TextureUsage::TRANSFER_DST) {
        flags |= vk::ImageUsageFlags::TRANSFER_DST;
    }
    flags
}

/// Image aspect a view of this format covers
pub(crate) fn texture_aspect(format: TextureFormat) -> vk::ImageAspectFlags {
    if format.has_stencil() {
        vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
    } else if format.is_depth() {
        vk::ImageAspectFlags::DEPTH
    } else {
        vk::ImageAspectFlags::COLOR
    }
}

// ===== BUFFERS =====

pub(crate) fn buffer_usage_to_vk(usage: BufferUsage) -> vk::BufferUsageFlags {
    let mut flags = vk::BufferUsageFlags::empty();
    if usage.contains(BufferUsage::VERTEX) {
        flags |= vk::BufferUsageFlags::VERTEX_BUFFER;
    }
    if usage.contains(BufferUsage::INDEX) {
        flags |= vk::BufferUsageFlags::INDEX_BUFFER;
    }
    if usage.contains(BufferUsage::UNIFORM) {
        flags |= vk::BufferUsageFlags::UNIFORM_BUFFER;
    }
    if usage.contains(BufferUsage::STORAGE) {
        flags |= vk::BufferUsageFlags::STORAGE_BUFFER;
    }
    if usage.contains(BufferUsage::TRANSFER_SRC) {
        flags |= vk::BufferUsageFlags::TRANSFER_SRC;
    }
    if usage.contains(BufferUsage::TRANSFER_DST) {
        flags |= vk::BufferUsageFlags::TRANSFER_DST;
    }
    flags
}

pub(crate) fn memory_location(memory: BufferMemory) -> MemoryLocation {
    match memory {
        BufferMemory::GpuOnly => MemoryLocation::GpuOnly,
        BufferMemory::CpuToGpu => MemoryLocation::CpuToGpu,
        BufferMemory::GpuToCpu => MemoryLocation::GpuToCpu,
    }
}

// ===== SAMPLERS =====

pub(crate) fn filter_to_vk(filter: SamplerFilter) -> vk::Filter {
    match filter {
        SamplerFilter::Nearest => vk::Filter::NEAREST,
        SamplerFilter::Linear => vk::Filter::LINEAR,
    }
}

pub(crate) fn mipmap_mode_to_vk(filter: SamplerFilter) -> vk::SamplerMipmapMode {
    match filter {
        SamplerFilter::Nearest => vk::SamplerMipmapMode::NEAREST,
        SamplerFilter::Linear => vk::SamplerMipmapMode::LINEAR,
    }
}

pub(crate) fn address_mode_to_vk(mode: SamplerAddressMode) -> vk::SamplerAddressMode {
    match mode {
        SamplerAddressMode::Repeat => vk::SamplerAddressMode::REPEAT,
        SamplerAddressMode::MirroredRepeat => vk::SamplerAddressMode::MIRRORED_REPEAT,
        SamplerAddressMode::ClampToEdge => vk::SamplerAddressMode::CLAMP_TO_EDGE,
        SamplerAddressMode::ClampToBorder => vk::SamplerAddressMode::CLAMP_TO_BORDER,
    }
}

/// Vulkan only offers three fixed border colors; pick the closest one
pub(crate) fn border_color_to_vk(color: Color) -> vk::BorderColor {
    if color.a < 0.5 {
        vk::BorderColor::FLOAT_TRANSPARENT_BLACK
    } else if color.r + color.g + color.b > 1.5 {
        vk::BorderColor::FLOAT_OPAQUE_WHITE
    } else {
        vk::BorderColor::FLOAT_OPAQUE_BLACK
    }
}

// ===== SHADERS =====

/// Single stage flag; `None` for combinations
pub(crate) fn shader_stage_to_vk(stage: ShaderStages) -> Option<vk::ShaderStageFlags> {
    if stage == ShaderStages::VERTEX {
        Some(vk::ShaderStageFlags::VERTEX)
    } else if stage == ShaderStages::FRAGMENT {
        Some(vk::ShaderStageFlags::FRAGMENT)
    } else if stage == ShaderStages::COMPUTE {
        Some(vk::ShaderStageFlags::COMPUTE)
    } else if stage == ShaderStages::GEOMETRY {
        Some(vk::ShaderStageFlags::GEOMETRY)
    } else if stage == ShaderStages::TESSELLATION {
        Some(vk::ShaderStageFlags::TESSELLATION_CONTROL)
    } else {
        None
    }
}

// ===== ERRORS =====

/// Map a failed Vulkan call to the candid error taxonomy
pub(crate) fn vk_result_to_error(result: vk::Result, what: &str) -> Error {
    match result {
        vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => Error::OutOfMemory,
        vk::Result::ERROR_DEVICE_LOST => Error::DeviceLost,
        vk::Result::ERROR_INCOMPATIBLE_DRIVER
        | vk::Result::ERROR_EXTENSION_NOT_PRESENT
        | vk::Result::ERROR_LAYER_NOT_PRESENT
        | vk::Result::ERROR_FEATURE_NOT_PRESENT => {
            Error::BackendNotSupported(format!("{}: {:?}", what, result))
        }
        vk::Result::ERROR_INVALID_SHADER_NV => Error::ShaderCompilationFailed(format!("{}: {:?}", what, result)),
        _ => Error::ResourceCreationFailed(format!("{}: {:?}", what, result)),
    }
}

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;
