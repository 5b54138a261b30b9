//! Error types for the Candid renderer
//!
//! Every fallible operation of the mesh engine, the backend contract and the
//! renderer returns one of these variants. `Ok(..)` stands for success.

use std::fmt;

/// Result type for Candid operations
pub type Result<T> = std::result::Result<T, Error>;

/// Candid errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A parameter, handle or configuration value was rejected
    InvalidArgument(String),

    /// CPU or GPU allocation failed
    OutOfMemory,

    /// The requested backend is not compiled in or not usable at runtime
    BackendNotSupported(String),

    /// The device was lost; the whole renderer session must be rebuilt
    DeviceLost,

    /// Shader source or bytecode could not be turned into a module
    ShaderCompilationFailed(String),

    /// A backend resource (buffer, texture, command buffer, ...) could not be created
    ResourceCreationFailed(String),

    /// Anything the other variants do not describe
    Unknown(String),
}

/// Payload-free error code, matching the closed result taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    OutOfMemory,
    BackendNotSupported,
    DeviceLost,
    ShaderCompilationFailed,
    ResourceCreationFailed,
    Unknown,
}

impl Error {
    /// Error code without the message
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::OutOfMemory => ErrorKind::OutOfMemory,
            Error::BackendNotSupported(_) => ErrorKind::BackendNotSupported,
            Error::DeviceLost => ErrorKind::DeviceLost,
            Error::ShaderCompilationFailed(_) => ErrorKind::ShaderCompilationFailed,
            Error::ResourceCreationFailed(_) => ErrorKind::ResourceCreationFailed,
            Error::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// True when the caller has to rebuild the device and every resource
    pub fn is_device_lost(&self) -> bool {
        matches!(self, Error::DeviceLost)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::OutOfMemory => write!(f, "Out of memory"),
            Error::BackendNotSupported(msg) => write!(f, "Backend not supported: {}", msg),
            Error::DeviceLost => write!(f, "Device lost"),
            Error::ShaderCompilationFailed(msg) => write!(f, "Shader compilation failed: {}", msg),
            Error::ResourceCreationFailed(msg) => write!(f, "Resource creation failed: {}", msg),
            Error::Unknown(msg) => write!(f, "Unknown error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
