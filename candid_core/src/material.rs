/// Material description: PBR parameters, texture slots, alpha handling and the
/// fixed-function render state (blend, depth/stencil, rasterizer) the backend
/// applies when a mesh is drawn with it.

use glam::Vec3;
use bitflags::bitflags;
use crate::backend::{BufferHandle, ShaderProgramHandle, TextureHandle};
use crate::types::{BlendFactor, BlendOp, Color, CompareFunc, CullMode, FrontFace};

// ===== ALPHA =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    /// Fragments below `alpha_cutoff` are discarded
    Mask,
    Blend,
}

// ===== PBR =====

/// Metallic-roughness workflow parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetallicRoughness {
    pub base_color_factor: Color,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub base_color_texture: Option<TextureHandle>,
    pub metallic_roughness_texture: Option<TextureHandle>,
}

impl Default for MetallicRoughness {
    fn default() -> Self {
        Self {
            base_color_factor: Color::WHITE,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            base_color_texture: None,
            metallic_roughness_texture: None,
        }
    }
}

/// Specular-glossiness workflow parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecularGlossiness {
    pub diffuse_factor: Color,
    pub specular_factor: Vec3,
    pub glossiness_factor: f32,
    pub diffuse_texture: Option<TextureHandle>,
    pub specular_glossiness_texture: Option<TextureHandle>,
}

impl Default for SpecularGlossiness {
    fn default() -> Self {
        Self {
            diffuse_factor: Color::WHITE,
            specular_factor: Vec3::ONE,
            glossiness_factor: 1.0,
            diffuse_texture: None,
            specular_glossiness_texture: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pbr {
    MetallicRoughness(MetallicRoughness),
    SpecularGlossiness(SpecularGlossiness),
}

impl Default for Pbr {
    fn default() -> Self {
        Pbr::MetallicRoughness(MetallicRoughness::default())
    }
}

// ===== RENDER STATE =====

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorWriteMask: u8 {
        const R = 1 << 0;
        const G = 1 << 1;
        const B = 1 << 2;
        const A = 1 << 3;
        const ALL = Self::R.bits() | Self::G.bits() | Self::B.bits() | Self::A.bits();
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendState {
    pub enabled: bool,
    pub src_color: BlendFactor,
    pub dst_color: BlendFactor,
    pub color_op: BlendOp,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
    pub alpha_op: BlendOp,
    pub write_mask: ColorWriteMask,
}

impl Default for BlendState {
    fn default() -> Self {
        Self {
            enabled: false,
            src_color: BlendFactor::One,
            dst_color: BlendFactor::Zero,
            color_op: BlendOp::Add,
            src_alpha: BlendFactor::One,
            dst_alpha: BlendFactor::Zero,
            alpha_op: BlendOp::Add,
            write_mask: ColorWriteMask::ALL,
        }
    }
}

impl BlendState {
    /// Classic `src * a + dst * (1 - a)` blending
    pub fn alpha_blending() -> Self {
        Self {
            enabled: true,
            src_color: BlendFactor::SrcAlpha,
            dst_color: BlendFactor::OneMinusSrcAlpha,
            src_alpha: BlendFactor::One,
            dst_alpha: BlendFactor::OneMinusSrcAlpha,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilState {
    pub depth_test: bool,
    pub depth_write: bool,
    pub depth_compare: CompareFunc,
    pub stencil_enabled: bool,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_test: true,
            depth_write: true,
            depth_compare: CompareFunc::Less,
            stencil_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizerState {
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub wireframe: bool,
    pub depth_bias: f32,
    pub depth_bias_slope_scale: f32,
    pub depth_clip_enabled: bool,
    pub scissor_enabled: bool,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::Back,
            front_face: FrontFace::CounterClockwise,
            wireframe: false,
            depth_bias: 0.0,
            depth_bias_slope_scale: 0.0,
            depth_clip_enabled: true,
            scissor_enabled: false,
        }
    }
}

/// Full fixed-function state bound with a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderState {
    pub rasterizer: RasterizerState,
    pub depth_stencil: DepthStencilState,
    pub blend: BlendState,
}

// ===== MATERIAL DESC =====

/// Material creation descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDesc<'a> {
    pub name: Option<&'a str>,
    pub shader: Option<ShaderProgramHandle>,
    pub pbr: Pbr,

    pub normal_texture: Option<TextureHandle>,
    pub normal_scale: f32,
    pub occlusion_texture: Option<TextureHandle>,
    pub occlusion_strength: f32,
    pub emissive_texture: Option<TextureHandle>,
    pub emissive_factor: Vec3,

    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
    pub unlit: bool,

    /// Extra per-material uniform data, bound next to the built-in parameters
    pub custom_uniforms: Option<BufferHandle>,
    pub render_state: RenderState,
}

impl Default for MaterialDesc<'_> {
    fn default() -> Self {
        Self {
            name: None,
            shader: None,
            pbr: Pbr::default(),
            normal_texture: None,
            normal_scale: 1.0,
            occlusion_texture: None,
            occlusion_strength: 1.0,
            emissive_texture: None,
            emissive_factor: Vec3::ZERO,
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
            unlit: false,
            custom_uniforms: None,
            render_state: RenderState::default(),
        }
    }
}

impl MaterialDesc<'_> {
    /// Every texture the material references, PBR slots first
    pub fn textures(&self) -> impl Iterator<Item = TextureHandle> {
        let (base, packed) = match &self.pbr {
            Pbr::MetallicRoughness(mr) => (mr.base_color_texture, mr.metallic_roughness_texture),
            Pbr::SpecularGlossiness(sg) => (sg.diffuse_texture, sg.specular_glossiness_texture),
        };
        [base, packed, self.normal_texture, self.occlusion_texture, self.emissive_texture]
            .into_iter()
            .flatten()
    }

    /// Render state with the alpha mode and double-sidedness folded in
    pub fn effective_render_state(&self) -> RenderState {
        let mut state = self.render_state;
        if self.double_sided {
            state.rasterizer.cull_mode = CullMode::None;
        }
        if self.alpha_mode == AlphaMode::Blend {
            state.blend = BlendState {
                write_mask: state.blend.write_mask,
                ..BlendState::alpha_blending()
            };
            state.depth_stencil.depth_write = false;
        }
        state
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
