//! Physical models and geometry
//!
//! - Interference: thin-film reflectance
//! - Geometry: torus knot and skybox meshes

pub mod geometry;
pub mod interference;

pub use geometry::{Mesh, Vertex};
pub use interference::{InterferenceModel, RgbAiry, SpectralAiry};
