/// Renderer façade - configuration, camera and the frame loop

mod camera;
mod config;
mod renderer;

#[cfg(test)]
pub(crate) mod mock_backend;

pub use camera::Camera;
pub use config::RendererConfig;
pub use renderer::{Renderer, RendererStats};
