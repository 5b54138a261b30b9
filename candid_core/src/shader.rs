/// Shader module and program descriptors.
///
/// Sources are passed in memory; loading files from disk is left to the caller.

use bitflags::bitflags;
use crate::backend::ShaderModuleHandle;

bitflags! {
    /// Pipeline stages a shader or push-constant range applies to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStages: u32 {
        const VERTEX = 1 << 0;
        const FRAGMENT = 1 << 1;
        const COMPUTE = 1 << 2;
        const GEOMETRY = 1 << 3;
        const TESSELLATION = 1 << 4;
        const ALL_GRAPHICS = Self::VERTEX.bits() | Self::FRAGMENT.bits()
            | Self::GEOMETRY.bits() | Self::TESSELLATION.bits();
    }
}

/// Shader code, tagged with the language or bytecode family it is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderSource<'a> {
    Hlsl(&'a str),
    Msl(&'a str),
    Glsl(&'a str),
    /// SPIR-V words
    SpirV(&'a [u32]),
    /// Compiled Metal library
    MetalLib(&'a [u8]),
    Dxil(&'a [u8]),
}

/// Payload-free tag of a [`ShaderSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderSourceType {
    Hlsl,
    Msl,
    Glsl,
    SpirV,
    MetalLib,
    Dxil,
}

impl ShaderSource<'_> {
    pub fn source_type(&self) -> ShaderSourceType {
        match self {
            ShaderSource::Hlsl(_) => ShaderSourceType::Hlsl,
            ShaderSource::Msl(_) => ShaderSourceType::Msl,
            ShaderSource::Glsl(_) => ShaderSourceType::Glsl,
            ShaderSource::SpirV(_) => ShaderSourceType::SpirV,
            ShaderSource::MetalLib(_) => ShaderSourceType::MetalLib,
            ShaderSource::Dxil(_) => ShaderSourceType::Dxil,
        }
    }

    /// True for precompiled bytecode, false for text sources
    pub fn is_bytecode(&self) -> bool {
        matches!(
            self,
            ShaderSource::SpirV(_) | ShaderSource::MetalLib(_) | ShaderSource::Dxil(_)
        )
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ShaderSource::Hlsl(s) | ShaderSource::Msl(s) | ShaderSource::Glsl(s) => s.is_empty(),
            ShaderSource::SpirV(words) => words.is_empty(),
            ShaderSource::MetalLib(bytes) | ShaderSource::Dxil(bytes) => bytes.is_empty(),
        }
    }
}

/// Single shader stage creation descriptor
#[derive(Debug, Clone)]
pub struct ShaderModuleDesc<'a> {
    /// Exactly one stage
    pub stage: ShaderStages,
    pub source: ShaderSource<'a>,
    pub entry_point: &'a str,
    pub label: Option<&'a str>,
}

impl ShaderModuleDesc<'_> {
    /// A module targets exactly one stage and carries code and an entry point
    pub fn is_valid(&self) -> bool {
        self.stage.bits().count_ones() == 1
            && !self.source.is_empty()
            && !self.entry_point.is_empty()
    }
}

/// Shader program creation descriptor
///
/// Either a vertex (+ optional fragment) pair, or a compute module alone.
#[derive(Debug, Clone, Default)]
pub struct ShaderProgramDesc<'a> {
    pub vertex: Option<ShaderModuleHandle>,
    pub fragment: Option<ShaderModuleHandle>,
    pub compute: Option<ShaderModuleHandle>,
    pub label: Option<&'a str>,
}

impl ShaderProgramDesc<'_> {
    /// Check the stage combination
    pub fn is_valid(&self) -> bool {
        match (self.vertex, self.fragment, self.compute) {
            (Some(_), _, None) => true,
            (None, None, Some(_)) => true,
            _ => false,
        }
    }

    pub fn is_compute(&self) -> bool {
        self.compute.is_some()
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
