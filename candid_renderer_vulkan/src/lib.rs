/*!
# Candid - Vulkan Backend

Vulkan implementation of the Candid backend contract.

This crate provides a `Backend` and a `Device` built on the Ash bindings, with
gpu-allocator for memory management. The backend registry of `candid_renderer`
picks it up through [`VULKAN_BACKEND`].
*/

mod vulkan_backend;
mod vulkan_device;
mod vulkan_format;
mod debug;

pub use vulkan_backend::{VulkanBackend, VULKAN_BACKEND};
pub use vulkan_device::VulkanDevice;

// Re-export debug utilities
pub use debug::{get_validation_stats, log_validation_summary, reset_validation_stats, ValidationStats};
