/// VulkanDevice - Vulkan implementation of the Device trait
///
/// Owns the instance, the optional presentation surface, the logical device and
/// a gpu-allocator `Allocator`. Resources live in slotmaps keyed by the handles
/// handed out to the caller.

use ash::vk;
use candid_core::candid::backend::{
    BufferHandle, CommandBufferHandle, Device, DeviceDesc, DeviceLimits, MaterialHandle, MeshHandle,
    SamplerHandle, ShaderModuleHandle, ShaderProgramHandle, TextureHandle,
};
use candid_core::candid::material::{BlendState, DepthStencilState, MaterialDesc, RasterizerState, RenderState};
use candid_core::candid::mesh::MeshDesc;
use candid_core::candid::shader::{ShaderModuleDesc, ShaderProgramDesc, ShaderSource, ShaderStages};
use candid_core::candid::{
    BufferDesc, BufferMemory, BufferUsage, Color, Error, IndexFormat, Rect2D, Result, SamplerDesc,
    TextureDesc, Viewport,
};
use candid_core::{candid_bail, candid_debug, candid_err, candid_error, candid_info, candid_warn};
use candid_core::glam::Mat4;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme, Allocator, AllocatorCreateDesc};
use gpu_allocator::MemoryLocation;
use slotmap::SlotMap;
use std::ffi::{c_char, CString};
use std::mem::ManuallyDrop;

use crate::vulkan_format::{
    address_mode_to_vk, border_color_to_vk, buffer_usage_to_vk, filter_to_vk, memory_location,
    mipmap_mode_to_vk, shader_stage_to_vk, texture_aspect, texture_format_to_vk, texture_usage_to_vk,
    vk_result_to_error,
};

const SOURCE: &str = "candid::vulkan";

/// Log a failed Vulkan call and convert it
fn vk_failure(result: vk::Result, what: &str) -> Error {
    let error = vk_result_to_error(result, what);
    candid_error!(SOURCE, "{}", error);
    error
}

// ===== RESOURCES =====

struct BufferResource {
    buffer: vk::Buffer,
    allocation: Option<Allocation>,
    size: u64,
}

struct TextureResource {
    image: vk::Image,
    view: vk::ImageView,
    allocation: Option<Allocation>,
    mip_levels: u32,
    array_layers: u32,
}

struct ShaderModuleResource {
    module: vk::ShaderModule,
    stage: vk::ShaderStageFlags,
}

// TODO: build VkPipelines from programs and material render state once
// command recording against a swapchain is implemented.
#[allow(dead_code)]
struct ShaderProgramResource {
    stages: vk::ShaderStageFlags,
    modules: Vec<ShaderModuleHandle>,
}

#[allow(dead_code)]
struct MaterialResource {
    program: Option<ShaderProgramHandle>,
    render_state: RenderState,
}

struct MeshResource {
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
}

struct DebugMessenger {
    loader: ash::ext::debug_utils::Instance,
    messenger: vk::DebugUtilsMessengerEXT,
}

struct Surface {
    loader: ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
}

/// Instance-level objects created so far; destroyed in reverse order if a
/// later creation step fails
struct InstanceGuard {
    instance: Option<ash::Instance>,
    debug: Option<DebugMessenger>,
    surface: Option<Surface>,
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        unsafe {
            if let Some(surface) = self.surface.take() {
                surface.loader.destroy_surface(surface.surface, None);
            }
            if let Some(debug) = self.debug.take() {
                debug.loader.destroy_debug_utils_messenger(debug.messenger, None);
            }
            if let Some(instance) = self.instance.take() {
                instance.destroy_instance(None);
            }
        }
    }
}

// ===== DEVICE =====

/// Vulkan device
///
/// Created headless when `DeviceDesc::native_window` is `None`. Command
/// recording and presentation need a swapchain, which this device does not
/// build: `cmd_begin` fails and recording calls are ignored.
pub struct VulkanDevice {
    /// Keeps the Vulkan library loaded
    _entry: ash::Entry,
    instance: ash::Instance,
    debug: Option<DebugMessenger>,
    surface: Option<Surface>,
    device: ash::Device,
    graphics_queue: vk::Queue,
    /// Dropped explicitly before the logical device is destroyed
    allocator: ManuallyDrop<Allocator>,
    limits: DeviceLimits,
    anisotropy_enabled: bool,
    extent: vk::Extent2D,

    buffers: SlotMap<BufferHandle, BufferResource>,
    textures: SlotMap<TextureHandle, TextureResource>,
    samplers: SlotMap<SamplerHandle, vk::Sampler>,
    shader_modules: SlotMap<ShaderModuleHandle, ShaderModuleResource>,
    shader_programs: SlotMap<ShaderProgramHandle, ShaderProgramResource>,
    meshes: SlotMap<MeshHandle, MeshResource>,
    materials: SlotMap<MaterialHandle, MaterialResource>,
}

impl VulkanDevice {
    /// Create a Vulkan device
    ///
    /// # Arguments
    ///
    /// * `desc` - Window/display handles (both or neither), surface size, debug mode
    pub fn new(desc: &DeviceDesc) -> Result<Self> {
        if desc.native_window.is_some() != desc.native_display.is_some() {
            candid_bail!(Error::InvalidArgument, SOURCE,
                "native_window and native_display must be given together");
        }

        unsafe {
            let entry = ash::Entry::load()
                .map_err(|e| candid_err!(Error::BackendNotSupported, SOURCE, "Failed to load Vulkan library: {}", e))?;

            let instance = Self::create_instance(&entry, desc)?;
            let mut guard = InstanceGuard {
                instance: Some(instance.clone()),
                debug: None,
                surface: None,
            };

            if desc.debug_mode {
                guard.debug = Self::create_debug_messenger(&entry, &instance);
            }

            if let (Some(window), Some(display)) = (desc.native_window, desc.native_display) {
                let surface = ash_window::create_surface(&entry, &instance, display, window, None)
                    .map_err(|e| vk_failure(e, "Failed to create surface"))?;
                guard.surface = Some(Surface {
                    loader: ash::khr::surface::Instance::new(&entry, &instance),
                    surface,
                });
            }

            let (physical_device, queue_family) = Self::pick_physical_device(&instance, guard.surface.as_ref())?;
            let properties = instance.get_physical_device_properties(physical_device);
            let features = instance.get_physical_device_features(physical_device);
            let anisotropy_enabled = features.sampler_anisotropy == vk::TRUE;

            // Logical device
            let queue_priorities = [1.0];
            let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
                .queue_family_index(queue_family)
                .queue_priorities(&queue_priorities)];

            let mut device_extension_names: Vec<*const c_char> = Vec::new();
            if guard.surface.is_some() {
                device_extension_names.push(ash::khr::swapchain::NAME.as_ptr());
            }
            #[cfg(any(target_os = "macos", target_os = "ios"))]
            device_extension_names.push(ash::khr::portability_subset::NAME.as_ptr());

            let device_features = vk::PhysicalDeviceFeatures::default()
                .sampler_anisotropy(anisotropy_enabled);

            let device_create_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_create_infos)
                .enabled_extension_names(&device_extension_names)
                .enabled_features(&device_features);

            let device = instance
                .create_device(physical_device, &device_create_info, None)
                .map_err(|e| vk_failure(e, "Failed to create logical device"))?;

            let graphics_queue = device.get_device_queue(queue_family, 0);

            let allocator = match Allocator::new(&AllocatorCreateDesc {
                instance: instance.clone(),
                device: device.clone(),
                physical_device,
                debug_settings: Default::default(),
                buffer_device_address: false,
                allocation_sizes: Default::default(),
            }) {
                Ok(allocator) => allocator,
                Err(e) => {
                    device.destroy_device(None);
                    candid_bail!(Error::ResourceCreationFailed, SOURCE, "Failed to create GPU allocator: {:?}", e);
                }
            };

            let limits = Self::query_limits(&instance, physical_device, &properties, &features);

            candid_info!(SOURCE, "Vulkan device created on {} ({}x{}, vsync {}, {})",
                properties.device_name_as_c_str().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
                desc.width, desc.height, desc.vsync,
                if guard.surface.is_some() { "windowed" } else { "headless" });

            // Ownership of the instance-level objects moves into the device
            let debug = guard.debug.take();
            let surface = guard.surface.take();
            guard.instance = None;

            Ok(Self {
                _entry: entry,
                instance,
                debug,
                surface,
                device,
                graphics_queue,
                allocator: ManuallyDrop::new(allocator),
                limits,
                anisotropy_enabled,
                extent: vk::Extent2D { width: desc.width, height: desc.height },
                buffers: SlotMap::with_key(),
                textures: SlotMap::with_key(),
                samplers: SlotMap::with_key(),
                shader_modules: SlotMap::with_key(),
                shader_programs: SlotMap::with_key(),
                meshes: SlotMap::with_key(),
                materials: SlotMap::with_key(),
            })
        }
    }

    /// Current surface extent as last set by creation or `swapchain_resize`
    pub fn extent(&self) -> (u32, u32) {
        (self.extent.width, self.extent.height)
    }

    /// True when the device was created with a window
    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    unsafe fn create_instance(entry: &ash::Entry, desc: &DeviceDesc) -> Result<ash::Instance> {
        let app_name = CString::new(desc.app_name.as_str())
            .map_err(|_| candid_err!(Error::InvalidArgument, SOURCE, "Application name contains a NUL byte"))?;

        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, 1, 0, 0))
            .engine_name(c"Candid Engine")
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(vk::API_VERSION_1_2);

        let mut extension_names: Vec<*const c_char> = match desc.native_display {
            Some(display) => ash_window::enumerate_required_extensions(display)
                .map_err(|e| vk_failure(e, "Failed to get required surface extensions"))?
                .to_vec(),
            None => Vec::new(),
        };

        let mut flags = vk::InstanceCreateFlags::empty();
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            extension_names.push(ash::khr::portability_enumeration::NAME.as_ptr());
            flags |= vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR;
        }

        let mut layer_names: Vec<*const c_char> = Vec::new();
        if desc.debug_mode {
            extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
            if Self::validation_layer_available(entry) {
                layer_names.push(c"VK_LAYER_KHRONOS_validation".as_ptr());
            } else {
                candid_warn!(SOURCE, "VK_LAYER_KHRONOS_validation not installed, running without validation");
            }
        }

        let create_info = vk::InstanceCreateInfo::default()
            .flags(flags)
            .application_info(&app_info)
            .enabled_layer_names(&layer_names)
            .enabled_extension_names(&extension_names);

        entry
            .create_instance(&create_info, None)
            .map_err(|e| vk_failure(e, "Failed to create Vulkan instance"))
    }

    unsafe fn validation_layer_available(entry: &ash::Entry) -> bool {
        entry
            .enumerate_instance_layer_properties()
            .map(|layers| {
                layers.iter().any(|layer| {
                    layer.layer_name_as_c_str().map_or(false, |name| name == c"VK_LAYER_KHRONOS_validation")
                })
            })
            .unwrap_or(false)
    }

    /// Debug messenger failure is not fatal: the device works without it
    unsafe fn create_debug_messenger(entry: &ash::Entry, instance: &ash::Instance) -> Option<DebugMessenger> {
        let loader = ash::ext::debug_utils::Instance::new(entry, instance);
        let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(crate::debug::messenger_severity_flags())
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(crate::debug::vulkan_debug_callback));

        match loader.create_debug_utils_messenger(&debug_info, None) {
            Ok(messenger) => Some(DebugMessenger { loader, messenger }),
            Err(e) => {
                candid_warn!(SOURCE, "Failed to create debug messenger: {:?}", e);
                None
            }
        }
    }

    /// First physical device with a graphics queue (that can present, when a surface exists)
    unsafe fn pick_physical_device(
        instance: &ash::Instance,
        surface: Option<&Surface>,
    ) -> Result<(vk::PhysicalDevice, u32)> {
        let physical_devices = instance
            .enumerate_physical_devices()
            .map_err(|e| vk_failure(e, "Failed to enumerate physical devices"))?;

        physical_devices
            .iter()
            .find_map(|&physical_device| {
                let families = instance.get_physical_device_queue_family_properties(physical_device);
                families
                    .iter()
                    .enumerate()
                    .find(|(index, family)| {
                        family.queue_flags.contains(vk::QueueFlags::GRAPHICS)
                            && surface.map_or(true, |s| {
                                s.loader
                                    .get_physical_device_surface_support(physical_device, *index as u32, s.surface)
                                    .unwrap_or(false)
                            })
                    })
                    .map(|(index, _)| (physical_device, index as u32))
            })
            .ok_or_else(|| candid_err!(Error::BackendNotSupported, SOURCE,
                "No Vulkan device with a graphics queue found ({} devices)", physical_devices.len()))
    }

    unsafe fn query_limits(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        properties: &vk::PhysicalDeviceProperties,
        features: &vk::PhysicalDeviceFeatures,
    ) -> DeviceLimits {
        let limits = &properties.limits;
        let supports_ray_tracing = instance
            .enumerate_device_extension_properties(physical_device)
            .map(|extensions| {
                extensions.iter().any(|ext| {
                    ext.extension_name_as_c_str().map_or(false, |name| name == ash::khr::ray_tracing_pipeline::NAME)
                })
            })
            .unwrap_or(false);

        DeviceLimits {
            max_texture_size_1d: limits.max_image_dimension1_d,
            max_texture_size_2d: limits.max_image_dimension2_d,
            max_texture_size_3d: limits.max_image_dimension3_d,
            max_texture_size_cube: limits.max_image_dimension_cube,
            max_texture_array_layers: limits.max_image_array_layers,
            max_vertex_attributes: limits.max_vertex_input_attributes,
            max_vertex_buffers: limits.max_vertex_input_bindings,
            max_uniform_buffer_size: limits.max_uniform_buffer_range as u64,
            max_storage_buffer_size: limits.max_storage_buffer_range as u64,
            max_compute_workgroup_size: limits.max_compute_work_group_size,
            max_compute_workgroup_count: limits.max_compute_work_group_count,
            max_sampler_anisotropy: if features.sampler_anisotropy == vk::TRUE {
                limits.max_sampler_anisotropy
            } else {
                1.0
            },
            supports_geometry_shaders: features.geometry_shader == vk::TRUE,
            supports_tessellation: features.tessellation_shader == vk::TRUE,
            supports_compute: true,
            supports_ray_tracing,
        }
    }

    // ===== INTERNAL RESOURCE HELPERS =====

    fn create_buffer_resource(&mut self, desc: &BufferDesc) -> Result<BufferResource> {
        if desc.size == 0 {
            candid_bail!(Error::InvalidArgument, SOURCE, "Buffer size must be > 0");
        }
        if desc.usage.is_empty() {
            candid_bail!(Error::InvalidArgument, SOURCE, "Buffer usage must not be empty");
        }
        if let Some(data) = desc.initial_data {
            if data.len() as u64 > desc.size {
                candid_bail!(Error::InvalidArgument, SOURCE,
                    "Initial data ({} bytes) exceeds buffer size ({} bytes)", data.len(), desc.size);
            }
            if !desc.memory.is_host_visible() {
                candid_bail!(Error::ResourceCreationFailed, SOURCE,
                    "Initial data on GPU-only buffers needs a staging upload, which is not supported");
            }
        }

        unsafe {
            let buffer_create_info = vk::BufferCreateInfo::default()
                .size(desc.size)
                .usage(buffer_usage_to_vk(desc.usage))
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = self.device.create_buffer(&buffer_create_info, None)
                .map_err(|e| vk_failure(e, "Failed to create buffer"))?;

            let requirements = self.device.get_buffer_memory_requirements(buffer);
            let mut allocation = match self.allocator.allocate(&AllocationCreateDesc {
                name: desc.label.unwrap_or("buffer"),
                requirements,
                location: memory_location(desc.memory),
                linear: true,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            }) {
                Ok(allocation) => allocation,
                Err(_) => {
                    self.device.destroy_buffer(buffer, None);
                    let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                    candid_error!(SOURCE, "Out of GPU memory for buffer (required: {:.2} MB)", size_mb);
                    return Err(Error::OutOfMemory);
                }
            };

            if let Err(e) = self.device.bind_buffer_memory(buffer, allocation.memory(), allocation.offset()) {
                self.allocator.free(allocation).ok();
                self.device.destroy_buffer(buffer, None);
                return Err(vk_failure(e, "Failed to bind buffer memory"));
            }

            if let (Some(data), Some(mapped)) = (desc.initial_data, allocation.mapped_slice_mut()) {
                mapped[..data.len()].copy_from_slice(data);
            }

            Ok(BufferResource {
                buffer,
                allocation: Some(allocation),
                size: desc.size,
            })
        }
    }

    fn release_buffer(&mut self, mut resource: BufferResource) {
        unsafe {
            if let Some(allocation) = resource.allocation.take() {
                self.allocator.free(allocation).ok();
            }
            self.device.destroy_buffer(resource.buffer, None);
        }
    }

    fn release_texture(&mut self, mut resource: TextureResource) {
        unsafe {
            self.device.destroy_image_view(resource.view, None);
            if let Some(allocation) = resource.allocation.take() {
                self.allocator.free(allocation).ok();
            }
            self.device.destroy_image(resource.image, None);
        }
    }
}

impl Device for VulkanDevice {
    // ===== DEVICE =====

    fn limits(&self) -> DeviceLimits {
        self.limits
    }

    fn wait_idle(&mut self) -> Result<()> {
        unsafe {
            self.device
                .queue_wait_idle(self.graphics_queue)
                .map_err(|e| vk_failure(e, "Failed to wait idle"))
        }
    }

    // ===== SWAPCHAIN =====

    fn swapchain_resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            candid_bail!(Error::InvalidArgument, SOURCE, "Surface size must be non-zero (got {}x{})", width, height);
        }
        self.extent = vk::Extent2D { width, height };
        candid_debug!(SOURCE, "Surface extent set to {}x{}", width, height);
        Ok(())
    }

    fn swapchain_present(&mut self) -> Result<()> {
        Ok(())
    }

    // ===== BUFFERS =====

    fn buffer_create(&mut self, desc: &BufferDesc) -> Result<BufferHandle> {
        let resource = self.create_buffer_resource(desc)?;
        Ok(self.buffers.insert(resource))
    }

    fn buffer_destroy(&mut self, buffer: BufferHandle) {
        if let Some(resource) = self.buffers.remove(buffer) {
            self.release_buffer(resource);
        }
    }

    fn buffer_update(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> Result<()> {
        let Some(resource) = self.buffers.get_mut(buffer) else {
            candid_bail!(Error::InvalidArgument, SOURCE, "buffer_update: unknown buffer handle");
        };
        let end = offset.checked_add(data.len() as u64);
        if end.map_or(true, |end| end > resource.size) {
            candid_bail!(Error::InvalidArgument, SOURCE,
                "buffer_update: {} bytes at offset {} exceed buffer size {}", data.len(), offset, resource.size);
        }
        match resource.allocation.as_mut().and_then(|a| a.mapped_slice_mut()) {
            Some(mapped) => {
                let start = offset as usize;
                mapped[start..start + data.len()].copy_from_slice(data);
                Ok(())
            }
            None => candid_bail!(Error::InvalidArgument, SOURCE, "buffer_update: buffer is not host-visible"),
        }
    }

    fn buffer_map(&mut self, buffer: BufferHandle) -> Result<&mut [u8]> {
        let Some(resource) = self.buffers.get_mut(buffer) else {
            candid_bail!(Error::InvalidArgument, SOURCE, "buffer_map: unknown buffer handle");
        };
        let size = resource.size as usize;
        match resource.allocation.as_mut().and_then(|a| a.mapped_slice_mut()) {
            Some(mapped) if mapped.len() >= size => Ok(&mut mapped[..size]),
            _ => candid_bail!(Error::InvalidArgument, SOURCE, "buffer_map: buffer is not host-visible"),
        }
    }

    /// Host-visible allocations stay persistently mapped
    fn buffer_unmap(&mut self, _buffer: BufferHandle) {}

    // ===== TEXTURES =====

    fn texture_create(&mut self, desc: &TextureDesc) -> Result<TextureHandle> {
        if desc.width == 0 || desc.height == 0 || desc.depth == 0 || desc.array_layers == 0 {
            candid_bail!(Error::InvalidArgument, SOURCE,
                "Texture dimensions must be non-zero (got {}x{}x{}, {} layers)",
                desc.width, desc.height, desc.depth, desc.array_layers);
        }
        if desc.depth > 1 && desc.array_layers > 1 {
            candid_bail!(Error::InvalidArgument, SOURCE, "3D textures cannot have array layers");
        }
        let max_size = if desc.depth > 1 { self.limits.max_texture_size_3d } else { self.limits.max_texture_size_2d };
        if desc.width.max(desc.height).max(desc.depth) > max_size {
            candid_bail!(Error::InvalidArgument, SOURCE,
                "Texture {}x{}x{} exceeds the device limit of {}", desc.width, desc.height, desc.depth, max_size);
        }
        if desc.array_layers > self.limits.max_texture_array_layers {
            candid_bail!(Error::InvalidArgument, SOURCE,
                "{} array layers exceed the device limit of {}", desc.array_layers, self.limits.max_texture_array_layers);
        }

        let format = texture_format_to_vk(desc.format);
        let mip_levels = desc.mip_level_count();
        let (image_type, view_type) = if desc.depth > 1 {
            (vk::ImageType::TYPE_3D, vk::ImageViewType::TYPE_3D)
        } else if desc.array_layers > 1 {
            (vk::ImageType::TYPE_2D, vk::ImageViewType::TYPE_2D_ARRAY)
        } else {
            (vk::ImageType::TYPE_2D, vk::ImageViewType::TYPE_2D)
        };

        unsafe {
            let image_create_info = vk::ImageCreateInfo::default()
                .image_type(image_type)
                .format(format)
                .extent(vk::Extent3D { width: desc.width, height: desc.height, depth: desc.depth })
                .mip_levels(mip_levels)
                .array_layers(desc.array_layers)
                .samples(vk::SampleCountFlags::TYPE_1)
                .tiling(vk::ImageTiling::OPTIMAL)
                .usage(texture_usage_to_vk(desc.usage))
                .sharing_mode(vk::SharingMode::EXCLUSIVE)
                .initial_layout(vk::ImageLayout::UNDEFINED);

            let image = self.device.create_image(&image_create_info, None)
                .map_err(|e| vk_failure(e, "Failed to create texture image"))?;

            let requirements = self.device.get_image_memory_requirements(image);
            let allocation = match self.allocator.allocate(&AllocationCreateDesc {
                name: desc.label.unwrap_or("texture"),
                requirements,
                location: MemoryLocation::GpuOnly,
                linear: false,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            }) {
                Ok(allocation) => allocation,
                Err(_) => {
                    self.device.destroy_image(image, None);
                    let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                    candid_error!(SOURCE, "Out of GPU memory for texture ({}x{}, {:.2} MB)", desc.width, desc.height, size_mb);
                    return Err(Error::OutOfMemory);
                }
            };

            if let Err(e) = self.device.bind_image_memory(image, allocation.memory(), allocation.offset()) {
                self.allocator.free(allocation).ok();
                self.device.destroy_image(image, None);
                return Err(vk_failure(e, "Failed to bind texture image memory"));
            }

            let view_create_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(view_type)
                .format(format)
                .components(vk::ComponentMapping::default())
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: texture_aspect(desc.format),
                    base_mip_level: 0,
                    level_count: mip_levels,
                    base_array_layer: 0,
                    layer_count: desc.array_layers,
                });

            let view = match self.device.create_image_view(&view_create_info, None) {
                Ok(view) => view,
                Err(e) => {
                    self.allocator.free(allocation).ok();
                    self.device.destroy_image(image, None);
                    return Err(vk_failure(e, "Failed to create texture image view"));
                }
            };

            Ok(self.textures.insert(TextureResource {
                image,
                view,
                allocation: Some(allocation),
                mip_levels,
                array_layers: desc.array_layers,
            }))
        }
    }

    fn texture_destroy(&mut self, texture: TextureHandle) {
        if let Some(resource) = self.textures.remove(texture) {
            self.release_texture(resource);
        }
    }

    fn texture_upload(&mut self, texture: TextureHandle, mip_level: u32, array_layer: u32, data: &[u8]) -> Result<()> {
        let Some(resource) = self.textures.get(texture) else {
            candid_bail!(Error::InvalidArgument, SOURCE, "texture_upload: unknown texture handle");
        };
        if mip_level >= resource.mip_levels || array_layer >= resource.array_layers {
            candid_bail!(Error::InvalidArgument, SOURCE,
                "texture_upload: mip {} / layer {} out of range ({} mips, {} layers)",
                mip_level, array_layer, resource.mip_levels, resource.array_layers);
        }
        if data.is_empty() {
            candid_bail!(Error::InvalidArgument, SOURCE, "texture_upload: no pixel data");
        }
        candid_bail!(Error::ResourceCreationFailed, SOURCE,
            "texture_upload: staging transfers are not supported by the Vulkan backend")
    }

    // ===== SAMPLERS =====

    fn sampler_create(&mut self, desc: &SamplerDesc) -> Result<SamplerHandle> {
        if !desc.max_anisotropy.is_finite() || desc.max_anisotropy < 1.0 {
            candid_bail!(Error::InvalidArgument, SOURCE,
                "Sampler max_anisotropy must be >= 1.0 (got {})", desc.max_anisotropy);
        }
        let anisotropy = desc.max_anisotropy.min(self.limits.max_sampler_anisotropy);
        let anisotropy_enable = self.anisotropy_enabled && anisotropy > 1.0;

        let create_info = vk::SamplerCreateInfo::default()
            .mag_filter(filter_to_vk(desc.mag_filter))
            .min_filter(filter_to_vk(desc.min_filter))
            .mipmap_mode(mipmap_mode_to_vk(desc.mip_filter))
            .address_mode_u(address_mode_to_vk(desc.address_u))
            .address_mode_v(address_mode_to_vk(desc.address_v))
            .address_mode_w(address_mode_to_vk(desc.address_w))
            .mip_lod_bias(0.0)
            .min_lod(0.0)
            .max_lod(vk::LOD_CLAMP_NONE)
            .anisotropy_enable(anisotropy_enable)
            .max_anisotropy(if anisotropy_enable { anisotropy } else { 1.0 })
            .compare_enable(false)
            .compare_op(vk::CompareOp::ALWAYS)
            .border_color(border_color_to_vk(desc.border_color))
            .unnormalized_coordinates(false);

        let sampler = unsafe {
            self.device.create_sampler(&create_info, None)
                .map_err(|e| vk_failure(e, "Failed to create sampler"))?
        };
        Ok(self.samplers.insert(sampler))
    }

    fn sampler_destroy(&mut self, sampler: SamplerHandle) {
        if let Some(sampler) = self.samplers.remove(sampler) {
            unsafe { self.device.destroy_sampler(sampler, None); }
        }
    }

    // ===== SHADERS =====

    fn shader_module_create(&mut self, desc: &ShaderModuleDesc) -> Result<ShaderModuleHandle> {
        if !desc.is_valid() {
            candid_bail!(Error::InvalidArgument, SOURCE,
                "Shader module needs exactly one stage, code and an entry point");
        }
        let Some(stage) = shader_stage_to_vk(desc.stage) else {
            candid_bail!(Error::InvalidArgument, SOURCE, "Unsupported shader stage {:?}", desc.stage);
        };
        if desc.entry_point.contains('\0') {
            candid_bail!(Error::InvalidArgument, SOURCE, "Shader entry point contains a NUL byte");
        }
        let ShaderSource::SpirV(code) = desc.source else {
            candid_bail!(Error::ShaderCompilationFailed, SOURCE,
                "The Vulkan backend only accepts SPIR-V (got {:?})", desc.source.source_type());
        };

        let create_info = vk::ShaderModuleCreateInfo::default().code(code);
        let module = unsafe {
            self.device.create_shader_module(&create_info, None).map_err(|e| {
                candid_err!(Error::ShaderCompilationFailed, SOURCE, "Failed to create shader module: {:?}", e)
            })?
        };
        Ok(self.shader_modules.insert(ShaderModuleResource { module, stage }))
    }

    fn shader_module_destroy(&mut self, module: ShaderModuleHandle) {
        if let Some(resource) = self.shader_modules.remove(module) {
            unsafe { self.device.destroy_shader_module(resource.module, None); }
        }
    }

    fn shader_program_create(&mut self, desc: &ShaderProgramDesc) -> Result<ShaderProgramHandle> {
        if !desc.is_valid() {
            candid_bail!(Error::InvalidArgument, SOURCE,
                "Shader program needs a vertex module (optionally with a fragment module) or a compute module alone");
        }
        let slots = [
            (desc.vertex, vk::ShaderStageFlags::VERTEX),
            (desc.fragment, vk::ShaderStageFlags::FRAGMENT),
            (desc.compute, vk::ShaderStageFlags::COMPUTE),
        ];
        let mut stages = vk::ShaderStageFlags::empty();
        let mut modules = Vec::new();
        for (handle, expected) in slots {
            let Some(handle) = handle else { continue };
            match self.shader_modules.get(handle) {
                Some(module) if module.stage == expected => {
                    stages |= expected;
                    modules.push(handle);
                }
                Some(module) => candid_bail!(Error::InvalidArgument, SOURCE,
                    "Shader module bound as {:?} was compiled for {:?}", expected, module.stage),
                None => candid_bail!(Error::InvalidArgument, SOURCE, "Unknown shader module handle"),
            }
        }
        Ok(self.shader_programs.insert(ShaderProgramResource { stages, modules }))
    }

    fn shader_program_destroy(&mut self, program: ShaderProgramHandle) {
        self.shader_programs.remove(program);
    }

    // ===== MESHES =====

    fn mesh_create(&mut self, desc: &MeshDesc) -> Result<MeshHandle> {
        desc.validate()?;

        let vertex_resource = self.create_buffer_resource(&BufferDesc {
            size: desc.data.vertex_bytes().len() as u64,
            usage: BufferUsage::VERTEX,
            memory: BufferMemory::CpuToGpu,
            initial_data: Some(desc.data.vertex_bytes()),
            label: desc.label.as_deref(),
        })?;
        let index_resource = match self.create_buffer_resource(&BufferDesc {
            size: desc.data.index_bytes().len() as u64,
            usage: BufferUsage::INDEX,
            memory: BufferMemory::CpuToGpu,
            initial_data: Some(desc.data.index_bytes()),
            label: desc.label.as_deref(),
        }) {
            Ok(resource) => resource,
            Err(e) => {
                self.release_buffer(vertex_resource);
                return Err(e);
            }
        };

        let vertex_buffer = self.buffers.insert(vertex_resource);
        let index_buffer = self.buffers.insert(index_resource);
        Ok(self.meshes.insert(MeshResource { vertex_buffer, index_buffer }))
    }

    fn mesh_destroy(&mut self, mesh: MeshHandle) {
        if let Some(resource) = self.meshes.remove(mesh) {
            self.buffer_destroy(resource.vertex_buffer);
            self.buffer_destroy(resource.index_buffer);
        }
    }

    // ===== MATERIALS =====

    fn material_create(&mut self, desc: &MaterialDesc) -> Result<MaterialHandle> {
        if let Some(program) = desc.shader {
            if !self.shader_programs.contains_key(program) {
                candid_bail!(Error::InvalidArgument, SOURCE, "Material references an unknown shader program");
            }
        }
        if desc.textures().any(|texture| !self.textures.contains_key(texture)) {
            candid_bail!(Error::InvalidArgument, SOURCE, "Material references an unknown texture");
        }
        if let Some(uniforms) = desc.custom_uniforms {
            if !self.buffers.contains_key(uniforms) {
                candid_bail!(Error::InvalidArgument, SOURCE, "Material references an unknown uniform buffer");
            }
        }
        Ok(self.materials.insert(MaterialResource {
            program: desc.shader,
            render_state: desc.effective_render_state(),
        }))
    }

    fn material_destroy(&mut self, material: MaterialHandle) {
        self.materials.remove(material);
    }

    // ===== COMMAND BUFFERS =====

    fn cmd_begin(&mut self) -> Result<CommandBufferHandle> {
        candid_bail!(Error::ResourceCreationFailed, SOURCE,
            "Command recording needs a swapchain, which the Vulkan backend does not create")
    }

    fn cmd_end(&mut self, _cmd: CommandBufferHandle) -> Result<()> {
        candid_bail!(Error::InvalidArgument, SOURCE, "cmd_end: unknown command buffer")
    }

    fn cmd_submit(&mut self, _cmd: CommandBufferHandle) -> Result<()> {
        candid_bail!(Error::InvalidArgument, SOURCE, "cmd_submit: unknown command buffer")
    }

    // Recording calls below can only receive handles this device never issued

    fn cmd_begin_render_pass(&mut self, _cmd: CommandBufferHandle, _clear_color: Color, _clear_depth: f32, _clear_stencil: u32) {}

    fn cmd_end_render_pass(&mut self, _cmd: CommandBufferHandle) {}

    fn cmd_set_viewport(&mut self, _cmd: CommandBufferHandle, _viewport: &Viewport) {}

    fn cmd_set_scissor(&mut self, _cmd: CommandBufferHandle, _scissor: &Rect2D) {}

    fn cmd_bind_pipeline(
        &mut self,
        _cmd: CommandBufferHandle,
        _program: ShaderProgramHandle,
        _rasterizer: &RasterizerState,
        _depth_stencil: &DepthStencilState,
        _blend: &BlendState,
    ) {
    }

    fn cmd_bind_vertex_buffer(&mut self, _cmd: CommandBufferHandle, _slot: u32, _buffer: BufferHandle, _offset: u64) {}

    fn cmd_bind_index_buffer(&mut self, _cmd: CommandBufferHandle, _buffer: BufferHandle, _offset: u64, _format: IndexFormat) {}

    fn cmd_bind_uniform_buffer(&mut self, _cmd: CommandBufferHandle, _slot: u32, _buffer: BufferHandle, _offset: u64, _size: u64) {}

    fn cmd_bind_texture(&mut self, _cmd: CommandBufferHandle, _slot: u32, _texture: TextureHandle, _sampler: SamplerHandle) {}

    fn cmd_push_constants(&mut self, _cmd: CommandBufferHandle, _stages: ShaderStages, _offset: u32, _data: &[u8]) {}

    fn cmd_draw(&mut self, _cmd: CommandBufferHandle, _vertex_count: u32, _instance_count: u32, _first_vertex: u32, _first_instance: u32) {}

    fn cmd_draw_indexed(
        &mut self,
        _cmd: CommandBufferHandle,
        _index_count: u32,
        _instance_count: u32,
        _first_index: u32,
        _vertex_offset: i32,
        _first_instance: u32,
    ) {
    }

    fn cmd_draw_mesh(&mut self, _cmd: CommandBufferHandle, _mesh: MeshHandle, _material: MaterialHandle, _transform: &Mat4) {}

    fn cmd_draw_submesh(
        &mut self,
        _cmd: CommandBufferHandle,
        _mesh: MeshHandle,
        _submesh_index: u32,
        _material: MaterialHandle,
        _transform: &Mat4,
    ) {
    }

    fn cmd_dispatch(&mut self, _cmd: CommandBufferHandle, _x: u32, _y: u32, _z: u32) {}
}

impl Drop for VulkanDevice {
    fn drop(&mut self) {
        unsafe {
            // 1. Wait for the GPU
            self.device.device_wait_idle().ok();

            // 2. Resources (meshes own buffers, so they go first)
            let meshes: Vec<MeshHandle> = self.meshes.keys().collect();
            for mesh in meshes {
                self.mesh_destroy(mesh);
            }
            for (_, resource) in std::mem::take(&mut self.buffers) {
                self.release_buffer(resource);
            }
            for (_, resource) in std::mem::take(&mut self.textures) {
                self.release_texture(resource);
            }
            for (_, sampler) in self.samplers.drain() {
                self.device.destroy_sampler(sampler, None);
            }
            for (_, resource) in self.shader_modules.drain() {
                self.device.destroy_shader_module(resource.module, None);
            }
            self.shader_programs.clear();
            self.materials.clear();

            // 3. Allocator: frees its VkDeviceMemory blocks while the device is alive
            ManuallyDrop::drop(&mut self.allocator);

            // 4. Device, surface, messenger, instance
            self.device.destroy_device(None);
            if let Some(surface) = self.surface.take() {
                surface.loader.destroy_surface(surface.surface, None);
            }
            if let Some(debug) = self.debug.take() {
                debug.loader.destroy_debug_utils_messenger(debug.messenger, None);
                crate::debug::log_validation_summary();
            }
            self.instance.destroy_instance(None);
        }
    }
}
