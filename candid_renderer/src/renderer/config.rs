/// RendererConfig - everything needed to create a renderer

use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle};

use candid_core::candid::backend::{BackendKind, DeviceDesc};
use candid_core::candid::{Error, Result};
use candid_core::candid_bail;

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Backend to use (`Auto` picks the platform's preferred one)
    pub backend: BackendKind,
    /// Platform window; `None` creates a headless device
    pub native_window: Option<RawWindowHandle>,
    /// Platform display connection, required together with `native_window`
    pub native_display: Option<RawDisplayHandle>,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// Enable validation / debug layers
    pub debug_mode: bool,
    /// 2 or 3 recommended; stored and forwarded, pacing is up to the backend
    pub max_frames_in_flight: u32,
    pub app_name: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Auto,
            native_window: None,
            native_display: None,
            width: 800,
            height: 600,
            vsync: true,
            debug_mode: cfg!(debug_assertions),
            max_frames_in_flight: 2,
            app_name: "Candid Application".to_string(),
        }
    }
}

impl RendererConfig {
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Use raw platform handles
    pub fn with_raw_handles(mut self, window: RawWindowHandle, display: RawDisplayHandle) -> Self {
        self.native_window = Some(window);
        self.native_display = Some(display);
        self
    }

    /// Take the window and display handles from a windowing library's window
    ///
    /// The window must outlive the renderer.
    pub fn with_window<W: HasWindowHandle + HasDisplayHandle>(self, window: &W) -> Result<Self> {
        let window_handle = window
            .window_handle()
            .map_err(|e| Error::InvalidArgument(format!("window handle unavailable: {}", e)))?
            .as_raw();
        let display_handle = window
            .display_handle()
            .map_err(|e| Error::InvalidArgument(format!("display handle unavailable: {}", e)))?
            .as_raw();
        Ok(self.with_raw_handles(window_handle, display_handle))
    }

    /// Reject configurations no backend could satisfy
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            candid_bail!(Error::InvalidArgument, "candid::Renderer",
                "Surface size must be non-zero (got {}x{})", self.width, self.height);
        }
        if self.max_frames_in_flight == 0 {
            candid_bail!(Error::InvalidArgument, "candid::Renderer", "max_frames_in_flight must be at least 1");
        }
        if self.app_name.is_empty() {
            candid_bail!(Error::InvalidArgument, "candid::Renderer", "app_name must not be empty");
        }
        if self.native_window.is_some() != self.native_display.is_some() {
            candid_bail!(Error::InvalidArgument, "candid::Renderer",
                "native_window and native_display must be given together");
        }
        Ok(())
    }

    /// Device description for the resolved backend
    pub(crate) fn device_desc(&self, backend: BackendKind) -> DeviceDesc {
        DeviceDesc {
            backend,
            native_window: self.native_window,
            native_display: self.native_display,
            width: self.width,
            height: self.height,
            vsync: self.vsync,
            debug_mode: self.debug_mode,
            max_frames_in_flight: self.max_frames_in_flight,
            app_name: self.app_name.clone(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
