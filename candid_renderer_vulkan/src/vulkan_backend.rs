/// VulkanBackend - Backend entry point registered with the backend registry

use candid_core::candid::backend::{Backend, BackendKind, Device, DeviceDesc};
use candid_core::candid::Result;
use candid_core::{candid_debug, candid_info};
use std::sync::OnceLock;

use crate::vulkan_device::VulkanDevice;

/// Vulkan backend; the only state is the cached result of the loader check
pub struct VulkanBackend {
    supported: OnceLock<bool>,
}

/// The Vulkan backend instance handed to the registry
pub static VULKAN_BACKEND: VulkanBackend = VulkanBackend::new();

impl VulkanBackend {
    pub const fn new() -> Self {
        Self { supported: OnceLock::new() }
    }
}

impl Default for VulkanBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for VulkanBackend {
    fn name(&self) -> &'static str {
        "Vulkan"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Vulkan
    }

    /// True when a Vulkan loader can be found on this machine (checked once)
    fn is_supported(&self) -> bool {
        *self.supported.get_or_init(|| {
            let supported = unsafe { ash::Entry::load() }.is_ok();
            candid_debug!("candid::vulkan", "Vulkan loader {}", if supported { "found" } else { "not found" });
            supported
        })
    }

    fn device_create(&self, desc: &DeviceDesc) -> Result<Box<dyn Device>> {
        let device = VulkanDevice::new(desc)?;
        Ok(Box::new(device))
    }

    fn device_destroy(&self, mut device: Box<dyn Device>) {
        device.wait_idle().ok();
        drop(device);
        candid_info!("candid::vulkan", "Vulkan device destroyed");
    }
}

#[cfg(test)]
#[path = "vulkan_backend_tests.rs"]
mod tests;
