/// Mesh geometry engine - vertex layout, mesh data, primitive generators, normal/tangent/bounds processing

pub mod vertex;
pub mod mesh_data;
pub mod primitives;
pub mod processing;
pub mod legacy;

pub use vertex::*;
pub use mesh_data::*;
pub use primitives::*;
pub use processing::*;
