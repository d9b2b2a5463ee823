//! Materials for the iridescent surface and the skybox
//!
//! Each material is a typed set of shader inputs. The `shade` methods are the
//! CPU reference of `shaders/iridescent.wgsl` and `shaders/skybox.wgsl` and
//! follow them step for step.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4, Vec4Swizzles};
use std::sync::Arc;

use crate::render::environment::CubeMap;
use crate::render::lookup::IridescenceLookUp;

/// Lookup coordinates are scaled by this so normal incidence never lands on
/// the clamped last texel.
pub const LOOK_UP_GRAZING_SCALE: f32 = 0.99;

/// Normalize `v`, or return `fallback` when `v` has no usable length.
pub fn safe_normalize(v: Vec3, fallback: Vec3) -> Vec3 {
    let length_squared = v.length_squared();
    if length_squared > 1e-12 && length_squared.is_finite() {
        v / length_squared.sqrt()
    } else {
        fallback
    }
}

/// Interpolated inputs of one surface fragment, world space
#[derive(Debug, Clone, Copy)]
pub struct Fragment {
    pub world_position: Vec3,
    pub world_normal: Vec3,
    pub camera_position: Vec3,
}

/// Result of shading one fragment, with the intermediate terms
#[derive(Debug, Clone, Copy)]
pub struct IridescentShading {
    /// Cosine between the view direction and the normal, clamped at 0
    pub n_dot_v: f32,
    /// Squared lookup sample
    pub airy: Vec3,
    /// Iridescent reflection of the radiance probe
    pub specular: Vec3,
    /// Squared irradiance sample
    pub diffuse: Vec3,
    /// Output color (square root of the combined light), alpha 1
    pub color: Vec4,
}

/// Uniform block of the iridescent shader (group 1, binding 0)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct IridescentUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 3],
    pub boost: f32,
}

/// Thin-film surface lit by two environment probes
#[derive(Debug, Clone)]
pub struct IridescentMaterial {
    irradiance_probe: Arc<CubeMap>,
    radiance_probe: Arc<CubeMap>,
    iridescence_look_up: IridescenceLookUp,
    color: Vec3,
    boost: f32,
}

impl IridescentMaterial {
    /// Create a material with white base color and a boost of 1.
    pub fn new(
        irradiance_probe: Arc<CubeMap>,
        radiance_probe: Arc<CubeMap>,
        iridescence_look_up: IridescenceLookUp,
    ) -> Self {
        Self {
            irradiance_probe,
            radiance_probe,
            iridescence_look_up,
            color: Vec3::ONE,
            boost: 1.0,
        }
    }

    pub fn irradiance_probe(&self) -> &Arc<CubeMap> {
        &self.irradiance_probe
    }

    pub fn set_irradiance_probe(&mut self, probe: Arc<CubeMap>) {
        self.irradiance_probe = probe;
    }

    pub fn radiance_probe(&self) -> &Arc<CubeMap> {
        &self.radiance_probe
    }

    pub fn set_radiance_probe(&mut self, probe: Arc<CubeMap>) {
        self.radiance_probe = probe;
    }

    pub fn iridescence_look_up(&self) -> &IridescenceLookUp {
        &self.iridescence_look_up
    }

    /// Mutable access; parameter changes are picked up by the scene on the
    /// next update through the lookup revision.
    pub fn iridescence_look_up_mut(&mut self) -> &mut IridescenceLookUp {
        &mut self.iridescence_look_up
    }

    pub fn set_iridescence_look_up(&mut self, look_up: IridescenceLookUp) {
        self.iridescence_look_up = look_up;
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.color = color;
    }

    pub fn boost(&self) -> f32 {
        self.boost
    }

    pub fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    /// Uniform block for drawing with `model` as the object transform.
    pub fn uniform(&self, model: Mat4) -> IridescentUniform {
        IridescentUniform {
            model: model.to_cols_array_2d(),
            color: self.color.to_array(),
            boost: self.boost,
        }
    }

    /// Shade one fragment.
    ///
    /// The lookup is read through its 8-bit texels so the result matches the
    /// GPU shader up to filtering precision.
    pub fn shade(&self, fragment: &Fragment) -> IridescentShading {
        let view_dir = safe_normalize(fragment.world_position - fragment.camera_position, Vec3::Z);
        let normal = safe_normalize(fragment.world_normal, -view_dir);
        let n_dot_v = (-view_dir.dot(normal)).max(0.0);

        let airy = Vec3::from_array(
            self.iridescence_look_up
                .sample_texels(n_dot_v * LOOK_UP_GRAZING_SCALE),
        );
        let airy = airy * airy;

        let reflected_dir = reflect(view_dir, normal);
        let s = self.radiance_probe.sample(reflected_dir).xyz();
        let specular = s * s * airy * self.boost;

        let d = self.irradiance_probe.sample(normal).xyz();
        let diffuse = d * d;

        let combined = (self.color * diffuse + specular).max(Vec3::ZERO);
        let color = Vec4::new(
            combined.x.sqrt(),
            combined.y.sqrt(),
            combined.z.sqrt(),
            1.0,
        );

        IridescentShading {
            n_dot_v,
            airy,
            specular,
            diffuse,
            color,
        }
    }
}

/// Background lit directly by one cube map
#[derive(Debug, Clone)]
pub struct SkyboxMaterial {
    env_map: Arc<CubeMap>,
}

impl SkyboxMaterial {
    pub fn new(env_map: Arc<CubeMap>) -> Self {
        Self { env_map }
    }

    pub fn env_map(&self) -> &Arc<CubeMap> {
        &self.env_map
    }

    pub fn set_env_map(&mut self, env_map: Arc<CubeMap>) {
        self.env_map = env_map;
    }

    /// Color seen through the skybox surface at `world_position`.
    pub fn shade(&self, world_position: Vec3, camera_position: Vec3) -> Vec4 {
        let view_dir = safe_normalize(world_position - camera_position, Vec3::Z);
        self.env_map.sample(view_dir)
    }
}

fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}
