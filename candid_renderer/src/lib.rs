/*!
# Candid Renderer

Application-facing half of Candid: a registry of the native backends compiled
into this build and a renderer façade driving one of them.

## Architecture

- **Registry**: Static table of backends, one slot per `BackendKind`, built
  on first use from the backends that report themselves supported
- **Renderer**: Owns one device; forwards resource calls, queues draws between
  `begin_frame` / `end_frame` and records them into a single render pass
- **Camera**: Look-at camera turned into view and projection matrices

Backends are selected at build time with cargo features (`vulkan` is on by
default). Everything shared with backends is re-exported from `candid_core`.

```no_run
use candid_renderer::candid::{Renderer, RendererConfig};

let mut renderer = Renderer::create(&RendererConfig::default())?;
renderer.begin_frame()?;
renderer.end_frame()?;
# Ok::<(), candid_renderer::candid::Error>(())
```
*/

pub mod registry;
pub mod renderer;

// Main candid namespace module: core types plus the façade
pub mod candid {
    pub use candid_core::candid::*;

    pub use crate::registry;
    pub use crate::renderer::{Camera, Renderer, RendererConfig, RendererStats};
}

// Re-export the core crate and math library at crate root
pub use candid_core;
pub use candid_core::glam;
