/// Plain data shared by the mesh engine, the backend contract and the renderer:
/// colors, formats, usage flags, sampler and pipeline state enums, resource descriptors.

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

// ===== COLOR =====

/// Linear RGBA color, 4 floats
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

// ===== BUFFERS =====

bitflags! {
    /// Allowed usages of a GPU buffer
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        const VERTEX = 1 << 0;
        const INDEX = 1 << 1;
        const UNIFORM = 1 << 2;
        const STORAGE = 1 << 3;
        const TRANSFER_SRC = 1 << 4;
        const TRANSFER_DST = 1 << 5;
    }
}

/// Where buffer memory lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferMemory {
    /// Device local, not mappable
    GpuOnly,
    /// Host visible, written by the CPU and read by the GPU
    #[default]
    CpuToGpu,
    /// Host visible, written by the GPU and read back by the CPU
    GpuToCpu,
}

impl BufferMemory {
    /// True when the memory can be mapped by the CPU
    pub fn is_host_visible(&self) -> bool {
        !matches!(self, BufferMemory::GpuOnly)
    }
}

/// Buffer creation descriptor
#[derive(Debug, Clone, Default)]
pub struct BufferDesc<'a> {
    /// Size in bytes (must be > 0)
    pub size: u64,
    pub usage: BufferUsage,
    pub memory: BufferMemory,
    /// Optional contents copied at creation (at most `size` bytes)
    pub initial_data: Option<&'a [u8]>,
    pub label: Option<&'a str>,
}

impl Default for BufferUsage {
    fn default() -> Self {
        BufferUsage::empty()
    }
}

// ===== TEXTURES =====

/// Texture pixel formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    #[default]
    RGBA8_UNORM,
    RGBA8_SRGB,
    BGRA8_UNORM,
    BGRA8_SRGB,
    R8_UNORM,
    RG8_UNORM,
    RGBA16_FLOAT,
    RGBA32_FLOAT,
    DEPTH32_FLOAT,
    DEPTH24_STENCIL8,
}

impl TextureFormat {
    /// Bytes per texel
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::R8_UNORM => 1,
            TextureFormat::RG8_UNORM => 2,
            TextureFormat::RGBA8_UNORM
            | TextureFormat::RGBA8_SRGB
            | TextureFormat::BGRA8_UNORM
            | TextureFormat::BGRA8_SRGB
            | TextureFormat::DEPTH32_FLOAT
            | TextureFormat::DEPTH24_STENCIL8 => 4,
            TextureFormat::RGBA16_FLOAT => 8,
            TextureFormat::RGBA32_FLOAT => 16,
        }
    }

    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::DEPTH32_FLOAT | TextureFormat::DEPTH24_STENCIL8)
    }

    pub fn has_stencil(&self) -> bool {
        matches!(self, TextureFormat::DEPTH24_STENCIL8)
    }
}

bitflags! {
    /// Allowed usages of a texture
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        const SAMPLED = 1 << 0;
        const STORAGE = 1 << 1;
        const RENDER_TARGET = 1 << 2;
        const DEPTH_STENCIL = 1 << 3;
        const TRANSFER_SRC = 1 << 4;
        const TRANSFER_DST = 1 << 5;
    }
}

impl Default for TextureUsage {
    fn default() -> Self {
        TextureUsage::SAMPLED | TextureUsage::TRANSFER_DST
    }
}

/// Texture creation descriptor
#[derive(Debug, Clone)]
pub struct TextureDesc<'a> {
    pub width: u32,
    pub height: u32,
    /// 1 for 2D textures
    pub depth: u32,
    /// 0 means the full mip chain
    pub mip_levels: u32,
    pub array_layers: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
    pub label: Option<&'a str>,
}

impl Default for TextureDesc<'_> {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
            depth: 1,
            mip_levels: 1,
            array_layers: 1,
            format: TextureFormat::default(),
            usage: TextureUsage::default(),
            label: None,
        }
    }
}

impl TextureDesc<'_> {
    /// Number of mip levels actually allocated (resolves `mip_levels == 0`)
    pub fn mip_level_count(&self) -> u32 {
        if self.mip_levels > 0 {
            return self.mip_levels;
        }
        let largest = self.width.max(self.height).max(self.depth).max(1);
        32 - largest.leading_zeros()
    }
}

// ===== SAMPLERS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SamplerFilter {
    Nearest,
    #[default]
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SamplerAddressMode {
    #[default]
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
}

/// Sampler creation descriptor
#[derive(Debug, Clone)]
pub struct SamplerDesc<'a> {
    pub min_filter: SamplerFilter,
    pub mag_filter: SamplerFilter,
    pub mip_filter: SamplerFilter,
    pub address_u: SamplerAddressMode,
    pub address_v: SamplerAddressMode,
    pub address_w: SamplerAddressMode,
    /// 1.0 disables anisotropic filtering
    pub max_anisotropy: f32,
    pub border_color: Color,
    pub label: Option<&'a str>,
}

impl Default for SamplerDesc<'_> {
    fn default() -> Self {
        Self {
            min_filter: SamplerFilter::Linear,
            mag_filter: SamplerFilter::Linear,
            mip_filter: SamplerFilter::Linear,
            address_u: SamplerAddressMode::Repeat,
            address_v: SamplerAddressMode::Repeat,
            address_w: SamplerAddressMode::Repeat,
            max_anisotropy: 1.0,
            border_color: Color::BLACK,
            label: None,
        }
    }
}

// ===== PIPELINE STATE =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunc {
    Never,
    #[default]
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendOp {
    #[default]
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    #[default]
    TriangleList,
    TriangleStrip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    #[default]
    U16,
    U32,
}

impl IndexFormat {
    pub fn size_bytes(&self) -> u32 {
        match self {
            IndexFormat::U16 => 2,
            IndexFormat::U32 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    None,
    Front,
    #[default]
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrontFace {
    #[default]
    CounterClockwise,
    Clockwise,
}

// ===== VIEWPORT / SCISSOR =====

/// Viewport rectangle in pixels with depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Viewport covering a whole surface
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Integer rectangle (scissor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect2D {
    pub fn full(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
