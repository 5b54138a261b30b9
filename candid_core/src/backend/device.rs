/// Device trait - the per-backend interface the renderer drives
///
/// Every operation takes plain descriptors and returns opaque handles. Fallible
/// operations return `Result`; state setters and destroy calls return nothing
/// and must ignore null or stale handles.

use glam::Mat4;
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

use crate::backend::{
    BackendKind, BufferHandle, CommandBufferHandle, MaterialHandle, MeshHandle, SamplerHandle,
    ShaderModuleHandle, ShaderProgramHandle, TextureHandle,
};
use crate::error::Result;
use crate::material::{BlendState, DepthStencilState, MaterialDesc, RasterizerState};
use crate::mesh::MeshDesc;
use crate::shader::{ShaderModuleDesc, ShaderProgramDesc, ShaderStages};
use crate::types::{BufferDesc, Color, IndexFormat, Rect2D, SamplerDesc, TextureDesc, Viewport};

// ===== DEVICE DESCRIPTION =====

/// Device creation parameters
#[derive(Debug, Clone)]
pub struct DeviceDesc {
    /// Backend the device is created for (informational for the backend)
    pub backend: BackendKind,
    /// Native window to present to; `None` creates a headless device
    pub native_window: Option<RawWindowHandle>,
    /// Native display connection matching `native_window`
    pub native_display: Option<RawDisplayHandle>,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// Enable validation layers and debug messages
    pub debug_mode: bool,
    pub max_frames_in_flight: u32,
    pub app_name: String,
}

/// Hardware limits and optional features of a device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceLimits {
    pub max_texture_size_1d: u32,
    pub max_texture_size_2d: u32,
    pub max_texture_size_3d: u32,
    pub max_texture_size_cube: u32,
    pub max_texture_array_layers: u32,
    pub max_vertex_attributes: u32,
    pub max_vertex_buffers: u32,
    pub max_uniform_buffer_size: u64,
    pub max_storage_buffer_size: u64,
    pub max_compute_workgroup_size: [u32; 3],
    pub max_compute_workgroup_count: [u32; 3],
    pub max_sampler_anisotropy: f32,
    pub supports_geometry_shaders: bool,
    pub supports_tessellation: bool,
    pub supports_compute: bool,
    pub supports_ray_tracing: bool,
}

impl Default for DeviceLimits {
    /// Conservative baseline every supported API guarantees
    fn default() -> Self {
        Self {
            max_texture_size_1d: 4096,
            max_texture_size_2d: 4096,
            max_texture_size_3d: 256,
            max_texture_size_cube: 4096,
            max_texture_array_layers: 256,
            max_vertex_attributes: 16,
            max_vertex_buffers: 8,
            max_uniform_buffer_size: 16 * 1024,
            max_storage_buffer_size: 128 * 1024 * 1024,
            max_compute_workgroup_size: [128, 128, 64],
            max_compute_workgroup_count: [65535, 65535, 65535],
            max_sampler_anisotropy: 1.0,
            supports_geometry_shaders: false,
            supports_tessellation: false,
            supports_compute: true,
            supports_ray_tracing: false,
        }
    }
}

// ===== DEVICE TRAIT =====

/// Backend device
///
/// Owns every GPU resource created through it. Dropping the device releases
/// them; `Backend::device_destroy` waits for idle first.
pub trait Device: Send {
    // ===== DEVICE =====

    fn limits(&self) -> DeviceLimits;

    /// Block until the GPU has finished all submitted work
    fn wait_idle(&mut self) -> Result<()>;

    // ===== SWAPCHAIN =====

    fn swapchain_resize(&mut self, width: u32, height: u32) -> Result<()>;

    fn swapchain_present(&mut self) -> Result<()>;

    // ===== BUFFERS =====

    fn buffer_create(&mut self, desc: &BufferDesc) -> Result<BufferHandle>;

    fn buffer_destroy(&mut self, buffer: BufferHandle);

    /// Write `data` at `offset`; the range must fit in the buffer
    fn buffer_update(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> Result<()>;

    /// Host view of a host-visible buffer
    fn buffer_map(&mut self, buffer: BufferHandle) -> Result<&mut [u8]>;

    fn buffer_unmap(&mut self, buffer: BufferHandle);

    // ===== TEXTURES =====

    fn texture_create(&mut self, desc: &TextureDesc) -> Result<TextureHandle>;

    fn texture_destroy(&mut self, texture: TextureHandle);

    /// Upload the pixels of one mip level of one array layer
    fn texture_upload(
        &mut self,
        texture: TextureHandle,
        mip_level: u32,
        array_layer: u32,
        data: &[u8],
    ) -> Result<()>;

    // ===== SAMPLERS =====

    fn sampler_create(&mut self, desc: &SamplerDesc) -> Result<SamplerHandle>;

    fn sampler_destroy(&mut self, sampler: SamplerHandle);

    // ===== SHADERS =====

    fn shader_module_create(&mut self, desc: &ShaderModuleDesc) -> Result<ShaderModuleHandle>;

    fn shader_module_destroy(&mut self, module: ShaderModuleHandle);

    fn shader_program_create(&mut self, desc: &ShaderProgramDesc) -> Result<ShaderProgramHandle>;

    fn shader_program_destroy(&mut self, program: ShaderProgramHandle);

    // ===== MESHES =====

    /// Upload vertex and index data; the submesh table is kept with the mesh
    fn mesh_create(&mut self, desc: &MeshDesc) -> Result<MeshHandle>;

    fn mesh_destroy(&mut self, mesh: MeshHandle);

    // ===== MATERIALS =====

    fn material_create(&mut self, desc: &MaterialDesc) -> Result<MaterialHandle>;

    fn material_destroy(&mut self, material: MaterialHandle);

    // ===== COMMAND BUFFERS =====

    fn cmd_begin(&mut self) -> Result<CommandBufferHandle>;

    fn cmd_end(&mut self, cmd: CommandBufferHandle) -> Result<()>;

    fn cmd_submit(&mut self, cmd: CommandBufferHandle) -> Result<()>;

    // ===== RENDER PASS =====

    fn cmd_begin_render_pass(
        &mut self,
        cmd: CommandBufferHandle,
        clear_color: Color,
        clear_depth: f32,
        clear_stencil: u32,
    );

    fn cmd_end_render_pass(&mut self, cmd: CommandBufferHandle);

    fn cmd_set_viewport(&mut self, cmd: CommandBufferHandle, viewport: &Viewport);

    fn cmd_set_scissor(&mut self, cmd: CommandBufferHandle, scissor: &Rect2D);

    // ===== STATE BINDING =====

    fn cmd_bind_pipeline(
        &mut self,
        cmd: CommandBufferHandle,
        program: ShaderProgramHandle,
        rasterizer: &RasterizerState,
        depth_stencil: &DepthStencilState,
        blend: &BlendState,
    );

    fn cmd_bind_vertex_buffer(&mut self, cmd: CommandBufferHandle, slot: u32, buffer: BufferHandle, offset: u64);

    fn cmd_bind_index_buffer(
        &mut self,
        cmd: CommandBufferHandle,
        buffer: BufferHandle,
        offset: u64,
        format: IndexFormat,
    );

    fn cmd_bind_uniform_buffer(
        &mut self,
        cmd: CommandBufferHandle,
        slot: u32,
        buffer: BufferHandle,
        offset: u64,
        size: u64,
    );

    fn cmd_bind_texture(
        &mut self,
        cmd: CommandBufferHandle,
        slot: u32,
        texture: TextureHandle,
        sampler: SamplerHandle,
    );

    fn cmd_push_constants(&mut self, cmd: CommandBufferHandle, stages: ShaderStages, offset: u32, data: &[u8]);

    // ===== DRAW =====

    fn cmd_draw(
        &mut self,
        cmd: CommandBufferHandle,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    );

    fn cmd_draw_indexed(
        &mut self,
        cmd: CommandBufferHandle,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    );

    /// Draw a whole mesh with a material and a model transform
    fn cmd_draw_mesh(
        &mut self,
        cmd: CommandBufferHandle,
        mesh: MeshHandle,
        material: MaterialHandle,
        transform: &Mat4,
    );

    /// Draw one entry of the mesh's submesh table
    fn cmd_draw_submesh(
        &mut self,
        cmd: CommandBufferHandle,
        mesh: MeshHandle,
        submesh_index: u32,
        material: MaterialHandle,
        transform: &Mat4,
    );

    // ===== COMPUTE =====

    fn cmd_dispatch(&mut self, cmd: CommandBufferHandle, group_count_x: u32, group_count_y: u32, group_count_z: u32);
}
