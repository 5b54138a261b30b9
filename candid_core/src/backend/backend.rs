/// Backend factory trait and backend identification

use std::fmt;

use crate::backend::{Device, DeviceDesc};
use crate::error::Result;

/// Version of the `Backend`/`Device` contract.
///
/// Bumped whenever a trait method is added, removed or changes meaning. The
/// registry refuses backends reporting a different version.
pub const BACKEND_INTERFACE_VERSION: u32 = 1;

// ===== BACKEND KIND =====

/// Native GPU API a backend drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum BackendKind {
    /// Resolve to the preferred backend of the platform
    #[default]
    Auto,
    Metal,
    Vulkan,
    D3D12,
    WebGpu,
}

impl BackendKind {
    /// Number of variants, `Auto` included
    pub const COUNT: usize = 5;

    /// Every concrete backend, in ascending enum order
    pub const ALL_CONCRETE: [BackendKind; 4] = [
        BackendKind::Metal,
        BackendKind::Vulkan,
        BackendKind::D3D12,
        BackendKind::WebGpu,
    ];

    /// Slot of this kind in a `[_; BackendKind::COUNT]` table
    pub fn index(self) -> usize {
        match self {
            BackendKind::Auto => 0,
            BackendKind::Metal => 1,
            BackendKind::Vulkan => 2,
            BackendKind::D3D12 => 3,
            BackendKind::WebGpu => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Auto => "Auto",
            BackendKind::Metal => "Metal",
            BackendKind::Vulkan => "Vulkan",
            BackendKind::D3D12 => "Direct3D 12",
            BackendKind::WebGpu => "WebGPU",
        }
    }

    pub fn is_concrete(self) -> bool {
        self != BackendKind::Auto
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ===== BACKEND TRAIT =====

/// Backend factory
///
/// One static instance exists per compiled-in backend. It reports whether the
/// native API can be used on this machine and creates devices.
pub trait Backend: Send + Sync {
    /// Human readable backend name
    fn name(&self) -> &'static str;

    /// Native API this backend drives (never `Auto`)
    fn kind(&self) -> BackendKind;

    /// Contract version this backend was written against
    fn interface_version(&self) -> u32 {
        BACKEND_INTERFACE_VERSION
    }

    /// Runtime availability (driver / loader present)
    fn is_supported(&self) -> bool;

    /// Create a device (and its surface when a window is given)
    ///
    /// # Arguments
    ///
    /// * `desc` - Window, surface size and debug settings
    fn device_create(&self, desc: &DeviceDesc) -> Result<Box<dyn Device>>;

    /// Destroy a device
    ///
    /// Waits for the GPU to go idle before the device and every resource it
    /// still owns are released.
    fn device_destroy(&self, mut device: Box<dyn Device>) {
        if let Err(e) = device.wait_idle() {
            crate::candid_warn!("candid::Backend", "wait_idle failed before device destruction: {}", e);
        }
        drop(device);
    }
}
