/// Opaque resource handles handed out by a backend device.
///
/// Handles are generational slotmap keys: the device stores its resources in a
/// `SlotMap` and a handle whose resource was destroyed no longer resolves,
/// so a stale or null handle is detected instead of reaching freed memory.
/// `Default` and `Key::null()` both give the null handle.

use slotmap::new_key_type;

pub use slotmap::Key;

new_key_type! {
    /// GPU buffer
    pub struct BufferHandle;
    /// Texture (1D/2D/3D/array)
    pub struct TextureHandle;
    /// Sampler state object
    pub struct SamplerHandle;
    /// Single compiled shader stage
    pub struct ShaderModuleHandle;
    /// Linked set of shader stages
    pub struct ShaderProgramHandle;
    /// GPU-resident mesh (vertex + index buffers and submesh table)
    pub struct MeshHandle;
    /// Material (program, textures, render state)
    pub struct MaterialHandle;
    /// Command buffer being recorded or submitted
    pub struct CommandBufferHandle;
}
