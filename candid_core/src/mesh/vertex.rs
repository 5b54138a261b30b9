/// Standard interleaved vertex and vertex layout description.

use bytemuck::{Pod, Zeroable};
use crate::types::Color;

/// Maximum attributes in one layout
pub const MAX_VERTEX_ATTRIBUTES: usize = 16;

/// Maximum vertex buffer bindings in one layout
pub const MAX_VERTEX_BUFFERS: usize = 8;

// ===== FORMATS =====

/// Per-attribute data format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Float,
    Float2,
    Float3,
    Float4,
    Int,
    Int2,
    Int3,
    Int4,
    UInt,
    UInt2,
    UInt3,
    UInt4,
    /// 4 bytes normalized to [0, 1]
    Byte4Norm,
    /// 4 bytes normalized to [-1, 1]
    Byte4SNorm,
    Short2,
    Short4,
    Short2Norm,
    Short4Norm,
}

impl VertexFormat {
    /// Size in bytes
    pub fn size_bytes(&self) -> u32 {
        match self {
            VertexFormat::Float | VertexFormat::Int | VertexFormat::UInt => 4,
            VertexFormat::Float2 | VertexFormat::Int2 | VertexFormat::UInt2 => 8,
            VertexFormat::Float3 | VertexFormat::Int3 | VertexFormat::UInt3 => 12,
            VertexFormat::Float4 | VertexFormat::Int4 | VertexFormat::UInt4 => 16,
            VertexFormat::Byte4Norm | VertexFormat::Byte4SNorm => 4,
            VertexFormat::Short2 | VertexFormat::Short2Norm => 4,
            VertexFormat::Short4 | VertexFormat::Short4Norm => 8,
        }
    }
}

/// What an attribute means to the shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexSemantic {
    Position,
    Normal,
    Tangent,
    Bitangent,
    TexCoord0,
    TexCoord1,
    Color0,
    Color1,
    Joints,
    Weights,
    Custom,
}

// ===== LAYOUT =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub semantic: VertexSemantic,
    pub format: VertexFormat,
    /// Byte offset inside one vertex of the source buffer
    pub offset: u32,
    pub buffer_index: u32,
}

/// Attribute list plus one stride per vertex buffer binding
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VertexLayout {
    pub attributes: Vec<VertexAttribute>,
    pub strides: Vec<u32>,
}

impl VertexLayout {
    /// Layout of [`Vertex`] in a single buffer
    pub fn standard() -> Self {
        let attribute = |semantic, format, offset| VertexAttribute {
            semantic,
            format,
            offset,
            buffer_index: 0,
        };
        Self {
            attributes: vec![
                attribute(VertexSemantic::Position, VertexFormat::Float3, 0),
                attribute(VertexSemantic::Normal, VertexFormat::Float3, 12),
                attribute(VertexSemantic::Tangent, VertexFormat::Float4, 24),
                attribute(VertexSemantic::TexCoord0, VertexFormat::Float2, 40),
                attribute(VertexSemantic::TexCoord1, VertexFormat::Float2, 48),
                attribute(VertexSemantic::Color0, VertexFormat::Float4, 56),
            ],
            strides: vec![Vertex::STRIDE],
        }
    }

    /// First attribute with the given semantic
    pub fn find(&self, semantic: VertexSemantic) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|attr| attr.semantic == semantic)
    }

    /// Check attribute/buffer counts and that every attribute fits in its stride
    pub fn is_valid(&self) -> bool {
        if self.attributes.len() > MAX_VERTEX_ATTRIBUTES
            || self.strides.is_empty()
            || self.strides.len() > MAX_VERTEX_BUFFERS
        {
            return false;
        }
        self.attributes.iter().all(|attr| {
            self.strides
                .get(attr.buffer_index as usize)
                .is_some_and(|&stride| attr.offset + attr.format.size_bytes() <= stride)
        })
    }
}

// ===== VERTEX =====

/// Standard vertex: position, normal, tangent (w = handedness), two UV sets, color
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 4],
    pub texcoord0: [f32; 2],
    pub texcoord1: [f32; 2],
    pub color: Color,
}

impl Vertex {
    /// Size in bytes of one interleaved vertex
    pub const STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;

    /// White vertex with no tangent and a single UV set
    pub fn new(position: [f32; 3], normal: [f32; 3], texcoord0: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tangent: [0.0; 4],
            texcoord0,
            texcoord1: [0.0; 2],
            color: Color::WHITE,
        }
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self::new([0.0; 3], [0.0; 3], [0.0; 2])
    }
}

#[cfg(test)]
#[path = "vertex_tests.rs"]
mod tests;
