/*!
# Candid Core

Platform-agnostic half of the Candid renderer.

This crate holds everything a backend and the renderer façade share: the error
taxonomy, the logging layer, descriptor types and the backend contract. It also
carries the mesh geometry engine, which runs entirely on the CPU.

## Architecture

- **Backend**: Factory trait, one static instance per native API
- **Device**: Resource and command interface implemented by each backend
- **MeshData**: Interleaved vertices + indices, produced by the primitive
  generators and refined by the normal/tangent/bounds passes
- **MaterialDesc / ShaderProgramDesc**: Plain descriptors handed to a device

Backend implementations (e.g. `candid_renderer_vulkan`) depend on this crate;
the `candid_renderer` crate ties them together behind a registry.
*/

// Internal modules
mod error;
pub mod log;
pub mod types;
pub mod shader;
pub mod material;
pub mod mesh;
pub mod backend;

// Main candid namespace module
pub mod candid {
    // Error types
    pub use crate::error::{Error, ErrorKind, Result};

    // Plain data types shared by every layer
    pub use crate::types::*;

    // Logging sub-module (types and functions; macros live at the crate root)
    pub mod log {
        pub use crate::log::{
            log, log_detailed, min_severity, reset_logger, set_logger, set_min_severity,
            DefaultLogger, LogEntry, LogSeverity, Logger,
        };
    }

    // Shader descriptors
    pub mod shader {
        pub use crate::shader::*;
    }

    // Material descriptors and render state
    pub mod material {
        pub use crate::material::*;
    }

    // Mesh geometry engine
    pub mod mesh {
        pub use crate::mesh::*;
    }

    // Backend contract
    pub mod backend {
        pub use crate::backend::*;
    }
}

// Re-export math library at crate root
pub use glam;
