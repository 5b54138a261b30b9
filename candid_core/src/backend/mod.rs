/// Backend contract - factory trait, device trait and resource handles

pub mod backend;
pub mod device;
pub mod handle;

pub use backend::*;
pub use device::*;
pub use handle::*;

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
