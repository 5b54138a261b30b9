/// Mock backend for unit tests (no GPU required)
///
/// The mock device keeps real slotmap handles for every resource and records
/// each contract call by name, so façade and registry tests can assert on the
/// exact call sequence.

use std::sync::{Arc, Mutex};

use candid_core::candid::backend::{
    Backend, BackendKind, BufferHandle, CommandBufferHandle, Device, DeviceDesc, DeviceLimits,
    MaterialHandle, MeshHandle, SamplerHandle, ShaderModuleHandle, ShaderProgramHandle, TextureHandle,
    BACKEND_INTERFACE_VERSION,
};
use candid_core::candid::material::{BlendState, DepthStencilState, MaterialDesc, RasterizerState};
use candid_core::candid::mesh::MeshDesc;
use candid_core::candid::shader::{ShaderModuleDesc, ShaderProgramDesc, ShaderStages};
use candid_core::candid::{
    BufferDesc, Color, Error, IndexFormat, Rect2D, Result, SamplerDesc, TextureDesc, Viewport,
};
use candid_core::candid_bail;
use glam::Mat4;
use slotmap::SlotMap;

/// Shared, ordered record of contract calls
pub type CallLog = Arc<Mutex<Vec<String>>>;

// ============================================================================
// Mock Backend
// ============================================================================

pub struct MockBackend {
    pub kind: BackendKind,
    pub supported: bool,
    pub version: u32,
    pub fail_device_create: Option<Error>,
    pub calls: CallLog,
}

impl MockBackend {
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            supported: true,
            version: BACKEND_INTERFACE_VERSION,
            fail_device_create: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Leak the backend to get the `'static` reference the registry and renderer hold
    pub fn leak(self) -> &'static MockBackend {
        Box::leak(Box::new(self))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

impl Backend for MockBackend {
    fn name(&self) -> &'static str {
        "Mock"
    }

    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn interface_version(&self) -> u32 {
        self.version
    }

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn device_create(&self, desc: &DeviceDesc) -> Result<Box<dyn Device>> {
        self.record("device_create");
        if let Some(error) = &self.fail_device_create {
            return Err(error.clone());
        }
        Ok(Box::new(MockDevice::new(desc, self.calls.clone())))
    }

    fn device_destroy(&self, mut device: Box<dyn Device>) {
        device.wait_idle().ok();
        drop(device);
        self.record("device_destroy");
    }
}

// ============================================================================
// Mock Device
// ============================================================================

pub struct MockDevice {
    calls: CallLog,
    pub width: u32,
    pub height: u32,
    buffers: SlotMap<BufferHandle, Vec<u8>>,
    textures: SlotMap<TextureHandle, ()>,
    samplers: SlotMap<SamplerHandle, ()>,
    shader_modules: SlotMap<ShaderModuleHandle, ()>,
    shader_programs: SlotMap<ShaderProgramHandle, ()>,
    meshes: SlotMap<MeshHandle, ()>,
    materials: SlotMap<MaterialHandle, ()>,
    commands: SlotMap<CommandBufferHandle, ()>,
}

impl MockDevice {
    pub fn new(desc: &DeviceDesc, calls: CallLog) -> Self {
        Self {
            calls,
            width: desc.width,
            height: desc.height,
            buffers: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            samplers: SlotMap::with_key(),
            shader_modules: SlotMap::with_key(),
            shader_programs: SlotMap::with_key(),
            meshes: SlotMap::with_key(),
            materials: SlotMap::with_key(),
            commands: SlotMap::with_key(),
        }
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

impl Device for MockDevice {
    fn limits(&self) -> DeviceLimits {
        DeviceLimits::default()
    }

    fn wait_idle(&mut self) -> Result<()> {
        self.record("wait_idle");
        Ok(())
    }

    fn swapchain_resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.record("swapchain_resize");
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn swapchain_present(&mut self) -> Result<()> {
        self.record("swapchain_present");
        Ok(())
    }

    fn buffer_create(&mut self, desc: &BufferDesc) -> Result<BufferHandle> {
        self.record("buffer_create");
        if desc.size == 0 {
            candid_bail!(Error::InvalidArgument, "candid::Mock", "zero-sized buffer");
        }
        let mut data = vec![0u8; desc.size as usize];
        if let Some(initial) = desc.initial_data {
            data[..initial.len()].copy_from_slice(initial);
        }
        Ok(self.buffers.insert(data))
    }

    fn buffer_destroy(&mut self, buffer: BufferHandle) {
        self.record("buffer_destroy");
        self.buffers.remove(buffer);
    }

    fn buffer_update(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> Result<()> {
        self.record("buffer_update");
        let Some(storage) = self.buffers.get_mut(buffer) else {
            candid_bail!(Error::InvalidArgument, "candid::Mock", "unknown buffer");
        };
        let start = offset as usize;
        if start + data.len() > storage.len() {
            candid_bail!(Error::InvalidArgument, "candid::Mock", "update out of range");
        }
        storage[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn buffer_map(&mut self, buffer: BufferHandle) -> Result<&mut [u8]> {
        self.record("buffer_map");
        match self.buffers.get_mut(buffer) {
            Some(storage) => Ok(storage.as_mut_slice()),
            None => candid_bail!(Error::InvalidArgument, "candid::Mock", "unknown buffer"),
        }
    }

    fn buffer_unmap(&mut self, _buffer: BufferHandle) {
        self.record("buffer_unmap");
    }

    fn texture_create(&mut self, _desc: &TextureDesc) -> Result<TextureHandle> {
        self.record("texture_create");
        Ok(self.textures.insert(()))
    }

    fn texture_destroy(&mut self, texture: TextureHandle) {
        self.record("texture_destroy");
        self.textures.remove(texture);
    }

    fn texture_upload(&mut self, texture: TextureHandle, _mip_level: u32, _array_layer: u32, _data: &[u8]) -> Result<()> {
        self.record("texture_upload");
        if !self.textures.contains_key(texture) {
            candid_bail!(Error::InvalidArgument, "candid::Mock", "unknown texture");
        }
        Ok(())
    }

    fn sampler_create(&mut self, _desc: &SamplerDesc) -> Result<SamplerHandle> {
        self.record("sampler_create");
        Ok(self.samplers.insert(()))
    }

    fn sampler_destroy(&mut self, sampler: SamplerHandle) {
        self.record("sampler_destroy");
        self.samplers.remove(sampler);
    }

    fn shader_module_create(&mut self, _desc: &ShaderModuleDesc) -> Result<ShaderModuleHandle> {
        self.record("shader_module_create");
        Ok(self.shader_modules.insert(()))
    }

    fn shader_module_destroy(&mut self, module: ShaderModuleHandle) {
        self.record("shader_module_destroy");
        self.shader_modules.remove(module);
    }

    fn shader_program_create(&mut self, _desc: &ShaderProgramDesc) -> Result<ShaderProgramHandle> {
        self.record("shader_program_create");
        Ok(self.shader_programs.insert(()))
    }

    fn shader_program_destroy(&mut self, program: ShaderProgramHandle) {
        self.record("shader_program_destroy");
        self.shader_programs.remove(program);
    }

    fn mesh_create(&mut self, _desc: &MeshDesc) -> Result<MeshHandle> {
        self.record("mesh_create");
        Ok(self.meshes.insert(()))
    }

    fn mesh_destroy(&mut self, mesh: MeshHandle) {
        self.record("mesh_destroy");
        self.meshes.remove(mesh);
    }

    fn material_create(&mut self, _desc: &MaterialDesc) -> Result<MaterialHandle> {
        self.record("material_create");
        Ok(self.materials.insert(()))
    }

    fn material_destroy(&mut self, material: MaterialHandle) {
        self.record("material_destroy");
        self.materials.remove(material);
    }

    fn cmd_begin(&mut self) -> Result<CommandBufferHandle> {
        self.record("cmd_begin");
        Ok(self.commands.insert(()))
    }

    fn cmd_end(&mut self, cmd: CommandBufferHandle) -> Result<()> {
        self.record("cmd_end");
        if !self.commands.contains_key(cmd) {
            candid_bail!(Error::InvalidArgument, "candid::Mock", "unknown command buffer");
        }
        Ok(())
    }

    fn cmd_submit(&mut self, cmd: CommandBufferHandle) -> Result<()> {
        self.record("cmd_submit");
        match self.commands.remove(cmd) {
            Some(()) => Ok(()),
            None => candid_bail!(Error::InvalidArgument, "candid::Mock", "unknown command buffer"),
        }
    }

    fn cmd_begin_render_pass(&mut self, _cmd: CommandBufferHandle, _clear_color: Color, _clear_depth: f32, _clear_stencil: u32) {
        self.record("cmd_begin_render_pass");
    }

    fn cmd_end_render_pass(&mut self, _cmd: CommandBufferHandle) {
        self.record("cmd_end_render_pass");
    }

    fn cmd_set_viewport(&mut self, _cmd: CommandBufferHandle, _viewport: &Viewport) {
        self.record("cmd_set_viewport");
    }

    fn cmd_set_scissor(&mut self, _cmd: CommandBufferHandle, _scissor: &Rect2D) {
        self.record("cmd_set_scissor");
    }

    fn cmd_bind_pipeline(
        &mut self,
        _cmd: CommandBufferHandle,
        _program: ShaderProgramHandle,
        _rasterizer: &RasterizerState,
        _depth_stencil: &DepthStencilState,
        _blend: &BlendState,
    ) {
        self.record("cmd_bind_pipeline");
    }

    fn cmd_bind_vertex_buffer(&mut self, _cmd: CommandBufferHandle, _slot: u32, _buffer: BufferHandle, _offset: u64) {
        self.record("cmd_bind_vertex_buffer");
    }

    fn cmd_bind_index_buffer(&mut self, _cmd: CommandBufferHandle, _buffer: BufferHandle, _offset: u64, _format: IndexFormat) {
        self.record("cmd_bind_index_buffer");
    }

    fn cmd_bind_uniform_buffer(&mut self, _cmd: CommandBufferHandle, _slot: u32, _buffer: BufferHandle, _offset: u64, _size: u64) {
        self.record("cmd_bind_uniform_buffer");
    }

    fn cmd_bind_texture(&mut self, _cmd: CommandBufferHandle, _slot: u32, _texture: TextureHandle, _sampler: SamplerHandle) {
        self.record("cmd_bind_texture");
    }

    fn cmd_push_constants(&mut self, _cmd: CommandBufferHandle, _stages: ShaderStages, _offset: u32, data: &[u8]) {
        self.record(&format!("cmd_push_constants({})", data.len()));
    }

    fn cmd_draw(&mut self, _cmd: CommandBufferHandle, _vertex_count: u32, _instance_count: u32, _first_vertex: u32, _first_instance: u32) {
        self.record("cmd_draw");
    }

    fn cmd_draw_indexed(
        &mut self,
        _cmd: CommandBufferHandle,
        _index_count: u32,
        _instance_count: u32,
        _first_index: u32,
        _vertex_offset: i32,
        _first_instance: u32,
    ) {
        self.record("cmd_draw_indexed");
    }

    fn cmd_draw_mesh(&mut self, _cmd: CommandBufferHandle, _mesh: MeshHandle, _material: MaterialHandle, _transform: &Mat4) {
        self.record("cmd_draw_mesh");
    }

    fn cmd_draw_submesh(
        &mut self,
        _cmd: CommandBufferHandle,
        _mesh: MeshHandle,
        submesh_index: u32,
        _material: MaterialHandle,
        _transform: &Mat4,
    ) {
        self.record(&format!("cmd_draw_submesh({})", submesh_index));
    }

    fn cmd_dispatch(&mut self, _cmd: CommandBufferHandle, _x: u32, _y: u32, _z: u32) {
        self.record("cmd_dispatch");
    }
}
