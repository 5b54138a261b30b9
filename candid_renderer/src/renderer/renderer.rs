/// Renderer - the façade combining a backend and its device into one session
///
/// Every resource call is forwarded to the device unchanged. Draw calls are
/// queued between `begin_frame` and `end_frame` and recorded into a single
/// command buffer when the frame ends.

use std::time::Instant;

use glam::Mat4;
use slotmap::SecondaryMap;

use candid_core::candid::backend::{
    Backend, BackendKind, BufferHandle, Device, DeviceLimits, MaterialHandle, MeshHandle, SamplerHandle,
    ShaderModuleHandle, ShaderProgramHandle, TextureHandle, BACKEND_INTERFACE_VERSION,
};
use candid_core::candid::material::MaterialDesc;
use candid_core::candid::mesh::MeshDesc;
use candid_core::candid::shader::{ShaderModuleDesc, ShaderProgramDesc, ShaderStages};
use candid_core::candid::{
    BufferDesc, Color, Error, PrimitiveTopology, Rect2D, Result, SamplerDesc, TextureDesc, Viewport,
};
use candid_core::{candid_bail, candid_debug, candid_info, candid_warn};

use super::camera::Camera;
use super::config::RendererConfig;
use crate::registry;

const SOURCE: &str = "candid::Renderer";

/// Statistics of the last presented frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStats {
    /// Number of mesh / submesh draws recorded
    pub draw_calls: u32,
    /// Triangles covered by those draws
    pub triangles: u64,
}

#[derive(Debug, Clone, Copy)]
enum DrawCommand {
    Mesh {
        mesh: MeshHandle,
        material: MaterialHandle,
        transform: Mat4,
    },
    Submesh {
        mesh: MeshHandle,
        submesh_index: u32,
        material: MaterialHandle,
        transform: Mat4,
    },
}

/// What the renderer remembers about an uploaded mesh
struct MeshRecord {
    triangles: u64,
    submesh_triangles: Vec<u64>,
}

impl MeshRecord {
    fn new(desc: &MeshDesc) -> Self {
        let topology = desc.data.topology;
        Self {
            triangles: triangle_count(topology, desc.data.index_count() as u64),
            submesh_triangles: desc
                .submeshes
                .iter()
                .map(|submesh| triangle_count(topology, submesh.index_count as u64))
                .collect(),
        }
    }

    /// A mesh without submeshes draws as a single implicit one
    fn submesh_count(&self) -> usize {
        self.submesh_triangles.len().max(1)
    }

    fn submesh_triangles(&self, index: usize) -> u64 {
        self.submesh_triangles.get(index).copied().unwrap_or(self.triangles)
    }
}

fn triangle_count(topology: PrimitiveTopology, index_count: u64) -> u64 {
    match topology {
        PrimitiveTopology::TriangleList => index_count / 3,
        PrimitiveTopology::TriangleStrip => index_count.saturating_sub(2),
        _ => 0,
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Rendering session on one backend device
///
/// # Example
///
/// ```no_run
/// use candid_renderer::candid::{Renderer, RendererConfig, Camera};
/// use candid_renderer::candid::mesh::{create_cube, MeshDesc};
/// use candid_renderer::candid::material::MaterialDesc;
/// use candid_renderer::glam::Mat4;
///
/// let mut renderer = Renderer::create(&RendererConfig::default())?;
/// let cube = renderer.create_mesh(&MeshDesc::new(create_cube(1.0)?)?)?;
/// let material = renderer.create_material(&MaterialDesc::default())?;
/// renderer.set_camera(&Camera::default());
///
/// renderer.begin_frame()?;
/// renderer.draw_mesh(cube, material, &Mat4::IDENTITY);
/// renderer.end_frame()?;
/// # Ok::<(), candid_renderer::candid::Error>(())
/// ```
pub struct Renderer {
    backend: &'static dyn Backend,
    /// `None` once destroyed
    device: Option<Box<dyn Device>>,
    width: u32,
    height: u32,
    max_frames_in_flight: u32,
    meshes: SecondaryMap<MeshHandle, MeshRecord>,

    // Frame state
    recording: bool,
    draws: Vec<DrawCommand>,
    clear_color: Color,
    viewport: Option<Viewport>,
    scissor: Option<Rect2D>,
    view: Mat4,
    projection: Mat4,
    stats: RendererStats,

    // Timing
    start: Instant,
    last_frame: Option<Instant>,
    time: f32,
    delta_time: f32,
    frame_count: u64,
}

impl Renderer {
    // ===== LIFECYCLE =====

    /// Create a renderer on the backend selected by `config.backend`
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the configuration is rejected (no backend call is made)
    /// - `BackendNotSupported` if no backend resolves
    /// - any error of the backend's device creation
    pub fn create(config: &RendererConfig) -> Result<Self> {
        config.validate()?;
        let Some(backend) = registry::get(config.backend) else {
            candid_bail!(Error::BackendNotSupported, SOURCE, "No available backend for '{}'", config.backend);
        };
        Self::create_on(config, backend)
    }

    /// Create a renderer on an explicit backend
    pub fn create_with_backend(config: &RendererConfig, backend: &'static dyn Backend) -> Result<Self> {
        config.validate()?;
        if backend.interface_version() != BACKEND_INTERFACE_VERSION {
            candid_bail!(Error::BackendNotSupported, SOURCE,
                "Backend '{}' implements interface version {} (expected {})",
                backend.name(), backend.interface_version(), BACKEND_INTERFACE_VERSION);
        }
        if !backend.is_supported() {
            candid_bail!(Error::BackendNotSupported, SOURCE, "Backend '{}' is not supported on this machine", backend.name());
        }
        Self::create_on(config, backend)
    }

    fn create_on(config: &RendererConfig, backend: &'static dyn Backend) -> Result<Self> {
        let device = backend.device_create(&config.device_desc(backend.kind()))?;

        let camera = Camera::default();
        let aspect = config.width as f32 / config.height as f32;
        let now = Instant::now();

        candid_info!(SOURCE, "Renderer created on {} ({}x{}, vsync {}, {} frames in flight)",
            backend.name(), config.width, config.height, config.vsync, config.max_frames_in_flight);

        Ok(Self {
            backend,
            device: Some(device),
            width: config.width,
            height: config.height,
            max_frames_in_flight: config.max_frames_in_flight,
            meshes: SecondaryMap::new(),
            recording: false,
            draws: Vec::new(),
            clear_color: Color::BLACK,
            viewport: None,
            scissor: None,
            view: camera.view_matrix().unwrap_or(Mat4::IDENTITY),
            projection: camera.projection_matrix(aspect).unwrap_or(Mat4::IDENTITY),
            stats: RendererStats::default(),
            start: now,
            last_frame: None,
            time: 0.0,
            delta_time: 0.0,
            frame_count: 0,
        })
    }

    /// Wait for the device and release it through the backend
    ///
    /// Idempotent; also run on drop. Afterwards every fallible call returns
    /// `InvalidArgument` and setters do nothing.
    pub fn destroy(&mut self) {
        let Some(device) = self.device.take() else {
            return;
        };
        if self.recording {
            candid_warn!(SOURCE, "Renderer destroyed inside a frame, {} queued draws dropped", self.draws.len());
        }
        self.recording = false;
        self.draws.clear();
        self.meshes.clear();
        self.backend.device_destroy(device);
        candid_info!(SOURCE, "Renderer destroyed after {} frames", self.frame_count);
    }

    pub fn is_destroyed(&self) -> bool {
        self.device.is_none()
    }

    /// Resize the output surface
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let device = self.device()?;
        if width == 0 || height == 0 {
            candid_bail!(Error::InvalidArgument, SOURCE, "Surface size must be non-zero (got {}x{})", width, height);
        }
        device.swapchain_resize(width, height)?;
        self.width = width;
        self.height = height;
        candid_debug!(SOURCE, "Resized to {}x{}", width, height);
        Ok(())
    }

    /// Block until the device finished all submitted work
    pub fn wait_idle(&mut self) -> Result<()> {
        self.device()?.wait_idle()
    }

    fn device(&mut self) -> Result<&mut (dyn Device + 'static)> {
        match self.device.as_deref_mut() {
            Some(device) => Ok(device),
            None => candid_bail!(Error::InvalidArgument, SOURCE, "Renderer has been destroyed"),
        }
    }

    // ===== BACKEND INFO =====

    pub fn backend(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn limits(&mut self) -> Result<DeviceLimits> {
        Ok(self.device()?.limits())
    }

    // ===== BUFFERS =====

    pub fn create_buffer(&mut self, desc: &BufferDesc) -> Result<BufferHandle> {
        self.device()?.buffer_create(desc)
    }

    pub fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if let Some(device) = self.device.as_deref_mut() {
            device.buffer_destroy(buffer);
        }
    }

    pub fn update_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> Result<()> {
        self.device()?.buffer_update(buffer, offset, data)
    }

    /// CPU view of a host-visible buffer, valid until `unmap_buffer`
    pub fn map_buffer(&mut self, buffer: BufferHandle) -> Result<&mut [u8]> {
        self.device()?.buffer_map(buffer)
    }

    pub fn unmap_buffer(&mut self, buffer: BufferHandle) {
        if let Some(device) = self.device.as_deref_mut() {
            device.buffer_unmap(buffer);
        }
    }

    // ===== TEXTURES / SAMPLERS =====

    pub fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureHandle> {
        self.device()?.texture_create(desc)
    }

    pub fn destroy_texture(&mut self, texture: TextureHandle) {
        if let Some(device) = self.device.as_deref_mut() {
            device.texture_destroy(texture);
        }
    }

    pub fn upload_texture(&mut self, texture: TextureHandle, mip_level: u32, array_layer: u32, data: &[u8]) -> Result<()> {
        self.device()?.texture_upload(texture, mip_level, array_layer, data)
    }

    pub fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<SamplerHandle> {
        self.device()?.sampler_create(desc)
    }

    pub fn destroy_sampler(&mut self, sampler: SamplerHandle) {
        if let Some(device) = self.device.as_deref_mut() {
            device.sampler_destroy(sampler);
        }
    }

    // ===== SHADERS =====

    pub fn create_shader_module(&mut self, desc: &ShaderModuleDesc) -> Result<ShaderModuleHandle> {
        self.device()?.shader_module_create(desc)
    }

    pub fn destroy_shader_module(&mut self, module: ShaderModuleHandle) {
        if let Some(device) = self.device.as_deref_mut() {
            device.shader_module_destroy(module);
        }
    }

    pub fn create_shader_program(&mut self, desc: &ShaderProgramDesc) -> Result<ShaderProgramHandle> {
        self.device()?.shader_program_create(desc)
    }

    pub fn destroy_shader_program(&mut self, program: ShaderProgramHandle) {
        if let Some(device) = self.device.as_deref_mut() {
            device.shader_program_destroy(program);
        }
    }

    // ===== MESHES / MATERIALS =====

    /// Upload a mesh; the descriptor is validated before the device sees it
    pub fn create_mesh(&mut self, desc: &MeshDesc) -> Result<MeshHandle> {
        let device = self.device()?;
        desc.validate()?;
        let mesh = device.mesh_create(desc)?;
        self.meshes.insert(mesh, MeshRecord::new(desc));
        Ok(mesh)
    }

    pub fn destroy_mesh(&mut self, mesh: MeshHandle) {
        if let Some(device) = self.device.as_deref_mut() {
            device.mesh_destroy(mesh);
            self.meshes.remove(mesh);
        }
    }

    pub fn create_material(&mut self, desc: &MaterialDesc) -> Result<MaterialHandle> {
        self.device()?.material_create(desc)
    }

    pub fn destroy_material(&mut self, material: MaterialHandle) {
        if let Some(device) = self.device.as_deref_mut() {
            device.material_destroy(material);
        }
    }

    // ===== FRAME =====

    /// Start recording a frame
    pub fn begin_frame(&mut self) -> Result<()> {
        self.device()?;
        if self.recording {
            candid_bail!(Error::InvalidArgument, SOURCE, "begin_frame called inside a frame (nesting is not supported)");
        }

        let now = Instant::now();
        self.time = now.duration_since(self.start).as_secs_f32();
        self.delta_time = self.last_frame.map_or(0.0, |last| now.duration_since(last).as_secs_f32());
        self.last_frame = Some(now);

        self.draws.clear();
        self.recording = true;
        Ok(())
    }

    /// Record the queued draws, submit them and present
    ///
    /// The frame is over even when recording or presentation fails; the queued
    /// draws are dropped and the error is returned.
    pub fn end_frame(&mut self) -> Result<()> {
        self.device()?;
        if !self.recording {
            candid_bail!(Error::InvalidArgument, SOURCE, "end_frame called without begin_frame");
        }
        self.recording = false;

        let draws = std::mem::take(&mut self.draws);
        let stats = self.frame_stats(&draws);
        let viewport = self.viewport();
        let scissor = self.scissor();
        let clear_color = self.clear_color;
        let matrices = [self.view, self.projection];

        let device = self.device()?;
        if !draws.is_empty() {
            record_draws(device, &draws, clear_color, &viewport, &scissor, &matrices)?;
        }
        device.swapchain_present()?;

        self.frame_count += 1;
        self.stats = stats;
        Ok(())
    }

    fn frame_stats(&self, draws: &[DrawCommand]) -> RendererStats {
        let triangles = draws
            .iter()
            .map(|draw| match *draw {
                DrawCommand::Mesh { mesh, .. } => self.meshes.get(mesh).map_or(0, |record| record.triangles),
                DrawCommand::Submesh { mesh, submesh_index, .. } => self
                    .meshes
                    .get(mesh)
                    .map_or(0, |record| record.submesh_triangles(submesh_index as usize)),
            })
            .sum();
        RendererStats {
            draw_calls: draws.len() as u32,
            triangles,
        }
    }

    pub fn set_clear_color(&mut self, color: Color) {
        if !self.is_destroyed() {
            self.clear_color = color;
        }
    }

    /// Override the viewport; the default covers the whole surface
    pub fn set_viewport(&mut self, x: f32, y: f32, width: f32, height: f32) {
        if self.is_destroyed() {
            return;
        }
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite() && x.is_finite() && y.is_finite()) {
            candid_warn!(SOURCE, "Ignoring invalid viewport ({}, {}, {}x{})", x, y, width, height);
            return;
        }
        self.viewport = Some(Viewport { x, y, width, height, min_depth: 0.0, max_depth: 1.0 });
    }

    /// Override the scissor rectangle; the default covers the whole surface
    pub fn set_scissor(&mut self, x: i32, y: i32, width: u32, height: u32) {
        if !self.is_destroyed() {
            self.scissor = Some(Rect2D { x, y, width, height });
        }
    }

    /// Effective viewport for the next frame
    pub fn viewport(&self) -> Viewport {
        self.viewport.unwrap_or_else(|| Viewport::full(self.width, self.height))
    }

    /// Effective scissor rectangle for the next frame
    pub fn scissor(&self) -> Rect2D {
        self.scissor.unwrap_or_else(|| Rect2D::full(self.width, self.height))
    }

    // ===== CAMERA =====

    /// Derive view and projection from a look-at camera
    ///
    /// A camera that cannot produce valid matrices is ignored with a warning.
    pub fn set_camera(&mut self, camera: &Camera) {
        if self.is_destroyed() {
            return;
        }
        let surface_aspect = self.width as f32 / self.height as f32;
        match (camera.view_matrix(), camera.projection_matrix(surface_aspect)) {
            (Ok(view), Ok(projection)) => {
                self.view = view;
                self.projection = projection;
            }
            (Err(e), _) | (_, Err(e)) => candid_warn!(SOURCE, "Ignoring camera: {}", e),
        }
    }

    /// Replace either matrix directly; `None` keeps the current one
    pub fn set_view_projection(&mut self, view: Option<&Mat4>, projection: Option<&Mat4>) {
        if self.is_destroyed() {
            return;
        }
        if let Some(view) = view {
            self.view = *view;
        }
        if let Some(projection) = projection {
            self.projection = *projection;
        }
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }

    // ===== DRAW =====

    /// Queue a draw of the whole mesh
    pub fn draw_mesh(&mut self, mesh: MeshHandle, material: MaterialHandle, transform: &Mat4) {
        if !self.accepts_draw("draw_mesh", mesh) {
            return;
        }
        self.draws.push(DrawCommand::Mesh { mesh, material, transform: *transform });
    }

    /// Queue a draw of one submesh
    pub fn draw_submesh(&mut self, mesh: MeshHandle, submesh_index: u32, material: MaterialHandle, transform: &Mat4) {
        if !self.accepts_draw("draw_submesh", mesh) {
            return;
        }
        let count = self.meshes.get(mesh).map_or(0, |record| record.submesh_count());
        if submesh_index as usize >= count {
            candid_warn!(SOURCE, "draw_submesh: index {} out of range ({} submeshes), ignored", submesh_index, count);
            return;
        }
        self.draws.push(DrawCommand::Submesh { mesh, submesh_index, material, transform: *transform });
    }

    /// Queue one draw of the mesh per transform
    pub fn draw_mesh_instanced(&mut self, mesh: MeshHandle, material: MaterialHandle, transforms: &[Mat4]) {
        if !self.accepts_draw("draw_mesh_instanced", mesh) {
            return;
        }
        self.draws.extend(
            transforms
                .iter()
                .map(|transform| DrawCommand::Mesh { mesh, material, transform: *transform }),
        );
    }

    fn accepts_draw(&self, operation: &str, mesh: MeshHandle) -> bool {
        if !self.recording {
            candid_warn!(SOURCE, "{} outside begin_frame/end_frame, ignored", operation);
            return false;
        }
        if !self.meshes.contains_key(mesh) {
            candid_warn!(SOURCE, "{}: unknown mesh handle, ignored", operation);
            return false;
        }
        true
    }

    // ===== STATE QUERIES =====

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Seconds since creation, sampled at the last `begin_frame`
    pub fn get_time(&self) -> f32 {
        self.time
    }

    /// Seconds between the last two `begin_frame` calls (0 on the first frame)
    pub fn get_delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Number of frames presented
    pub fn get_frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn stats(&self) -> RendererStats {
        self.stats
    }

    pub fn max_frames_in_flight(&self) -> u32 {
        self.max_frames_in_flight
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Record one render pass drawing every queued command, then submit it
fn record_draws(
    device: &mut dyn Device,
    draws: &[DrawCommand],
    clear_color: Color,
    viewport: &Viewport,
    scissor: &Rect2D,
    matrices: &[Mat4; 2],
) -> Result<()> {
    let cmd = device.cmd_begin()?;
    device.cmd_begin_render_pass(cmd, clear_color, 1.0, 0);
    device.cmd_set_viewport(cmd, viewport);
    device.cmd_set_scissor(cmd, scissor);
    // View then projection, column-major
    device.cmd_push_constants(cmd, ShaderStages::VERTEX, 0, bytemuck::cast_slice(&matrices[..]));

    for draw in draws {
        match draw {
            DrawCommand::Mesh { mesh, material, transform } => {
                device.cmd_draw_mesh(cmd, *mesh, *material, transform);
            }
            DrawCommand::Submesh { mesh, submesh_index, material, transform } => {
                device.cmd_draw_submesh(cmd, *mesh, *submesh_index, *material, transform);
            }
        }
    }

    device.cmd_end_render_pass(cmd);
    device.cmd_end(cmd)?;
    device.cmd_submit(cmd)
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
