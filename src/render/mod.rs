//! GPU rendering modules
//!
//! - Lookup: thin-film lookup table and its texture
//! - Environment: cube-map probes
//! - Material: iridescent and skybox materials (CPU reference shading)
//! - Scene: torus knot and skybox with their GPU resources
//! - Pipeline: windowed renderer with the parameter panel
//! - Headless: offscreen renderer for automated testing

pub mod camera;
pub mod context;
pub mod environment;
pub mod headless;
pub mod lookup;
pub mod material;
pub mod pipeline;
pub mod scene;

pub use camera::Camera;
pub use headless::HeadlessRenderPipeline;
pub use lookup::IridescenceLookUp;
pub use material::{IridescentMaterial, SkyboxMaterial};
pub use pipeline::RenderPipeline;
pub use scene::Scene;
