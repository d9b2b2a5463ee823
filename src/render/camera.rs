//! Orbit camera around the torus knot

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::f32::consts::PI;

/// Camera uniform block shared by both shaders (group 0, binding 0)
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub _padding: f32,
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            camera_pos: [0.0, 0.0, 1.0],
            _padding: 0.0,
        }
    }
}

/// Radians of orbit per pixel of drag
const ORBIT_SENSITIVITY: f32 = 0.01;

/// Fraction of the skybox half-edge the camera may zoom out to
const CUBE_MARGIN: f32 = 0.95;

/// Highest pitch before the view flips over the pole
const MAX_PITCH: f32 = PI / 2.0 - 0.01;

/// Camera orbiting a target point at a bounded distance
#[derive(Debug, Clone)]
pub struct Camera {
    /// Point the camera looks at
    pub target: Vec3,
    /// Distance from target
    pub distance: f32,
    /// Closest allowed distance
    pub min_distance: f32,
    /// Farthest allowed distance
    pub max_distance: f32,
    /// Horizontal angle (radians)
    pub yaw: f32,
    /// Vertical angle (radians, clamped)
    pub pitch: f32,
    /// Vertical field of view (radians)
    pub fov: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Camera at 50 units on +Z with a 50 degree field of view.
    ///
    /// The far plane sits at 2000 so the whole skybox cube stays visible from
    /// any orbit position.
    pub fn new(aspect: f32) -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 50.0,
            min_distance: 15.0,
            max_distance: 400.0,
            yaw: 0.0,
            pitch: 0.0,
            fov: 50.0_f32.to_radians(),
            aspect,
            near: 0.1,
            far: 2000.0,
        }
    }

    /// Start at `distance` instead of the default, raising the zoom bounds
    /// if needed.
    pub fn with_distance(mut self, distance: f32) -> Self {
        if distance.is_finite() && distance > 0.0 {
            self.distance = distance;
            self.min_distance = self.min_distance.min(distance);
            self.max_distance = self.max_distance.max(distance);
        }
        self
    }

    /// Keep every zoom level inside a skybox cube of edge `size` centered on
    /// the target, and push the far plane out far enough to contain it.
    pub fn confined_to_cube(mut self, size: f32) -> Self {
        if !(size.is_finite() && size > 0.0) {
            return self;
        }
        let limit = size * 0.5 * CUBE_MARGIN;
        if self.distance > limit {
            log::warn!(
                "Camera distance {} is outside the skybox, using {}",
                self.distance,
                limit
            );
        }
        self.max_distance = self.max_distance.min(limit);
        self.min_distance = self.min_distance.min(self.max_distance);
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
        self.far = self.far.max(limit + size * 0.5 * 3.0_f32.sqrt() + 1.0);
        self
    }

    /// World position derived from the orbit angles
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Rotate around the target by a drag of `delta_x`, `delta_y` pixels.
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        self.yaw -= delta_x * ORBIT_SENSITIVITY;
        self.pitch = (self.pitch + delta_y * ORBIT_SENSITIVITY).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Zoom by wheel `delta`; positive moves closer.
    pub fn zoom(&mut self, delta: f32) {
        self.distance *= 1.0 - delta * 0.1;
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
    }

    /// Call on resize
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Whether a cube of edge `size` centered on the target fits inside the
    /// far plane from the current position.
    pub fn contains_cube(&self, size: f32) -> bool {
        let half_diagonal = size * 0.5 * 3.0_f32.sqrt();
        self.distance + half_diagonal <= self.far
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            camera_pos: self.position().to_array(),
            _padding: 0.0,
        }
    }
}
