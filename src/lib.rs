//! Thin-Film Iridescence Library
//!
//! Real-time thin-film interference shading:
//! - Spectral lookup table of film reflectance
//! - Iridescent and skybox materials over cube-map probes
//! - GPU rendering with a CPU reference of the shaders

pub mod config;
pub mod export;
pub mod physics;
pub mod render;

pub use config::DemoConfig;
