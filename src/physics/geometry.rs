//! Mesh generation for the demo scene
//!
//! Generates the torus knot carrying the iridescent material and the cube
//! enclosing the scene for the skybox.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::f32::consts::PI;

use crate::config::TorusKnotParameters;

/// Vertex data for GPU rendering
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    /// 3D position of the vertex
    pub position: [f32; 3],
    /// Surface normal (normalized, pointing outward)
    pub normal: [f32; 3],
    /// Texture coordinates
    pub uv: [f32; 2],
}

impl Vertex {
    /// Create a new vertex with position, normal, and UV coordinates
    pub fn new(position: Vec3, normal: Vec3, uv: [f32; 2]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.normalize_or_zero().to_array(),
            uv,
        }
    }

    /// Returns the vertex buffer layout for wgpu
    pub fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Normal
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // UV
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Indexed triangle mesh
pub struct Mesh {
    /// Vertex data for the mesh
    pub vertices: Vec<Vertex>,
    /// Triangle indices (3 per triangle, counter-clockwise seen from outside)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Generate a (p, q) torus knot
    ///
    /// The knot curve is swept by a circle of radius `tube`; the frame along
    /// the curve is built from the tangent and the curve point itself.
    pub fn torus_knot(parameters: &TorusKnotParameters) -> Self {
        let tubular_segments = parameters.tubular_segments.max(3);
        let radial_segments = parameters.radial_segments.max(3);
        let p = parameters.p.max(1) as f32;
        let q = parameters.q as f32;
        let radius = parameters.radius;
        let tube = parameters.tube;

        let curve = |u: f32| -> Vec3 {
            let q_over_p = q / p * u;
            let cs = q_over_p.cos();
            Vec3::new(
                radius * (2.0 + cs) * 0.5 * u.cos(),
                radius * (2.0 + cs) * 0.5 * u.sin(),
                radius * q_over_p.sin() * 0.5,
            )
        };

        let mut vertices =
            Vec::with_capacity(((tubular_segments + 1) * (radial_segments + 1)) as usize);
        let mut indices = Vec::with_capacity((tubular_segments * radial_segments * 6) as usize);

        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * p * 2.0 * PI;
            let p1 = curve(u);
            let p2 = curve(u + 0.01);

            let tangent = p2 - p1;
            let mut frame_normal = p2 + p1;
            let binormal = tangent.cross(frame_normal).normalize();
            frame_normal = binormal.cross(tangent).normalize();

            for j in 0..=radial_segments {
                let v = j as f32 / radial_segments as f32 * 2.0 * PI;
                let cx = -tube * v.cos();
                let cy = tube * v.sin();

                let position = p1 + frame_normal * cx + binormal * cy;
                let normal = position - p1;
                let uv = [
                    i as f32 / tubular_segments as f32,
                    j as f32 / radial_segments as f32,
                ];
                vertices.push(Vertex::new(position, normal, uv));
            }
        }

        let ring = radial_segments + 1;
        for j in 1..=tubular_segments {
            for i in 1..=radial_segments {
                let a = ring * (j - 1) + (i - 1);
                let b = ring * j + (i - 1);
                let c = ring * j + i;
                let d = ring * (j - 1) + i;

                indices.extend_from_slice(&[a, b, d]);
                indices.extend_from_slice(&[b, c, d]);
            }
        }

        Self { vertices, indices }
    }

    /// Generate an axis-aligned cube of edge `size` centered on the origin
    ///
    /// Faces wind counter-clockwise seen from outside, so the skybox pipeline
    /// culls front faces to show the inside.
    pub fn skybox_cube(size: f32) -> Self {
        let half = size * 0.5;
        // (outward normal, u axis, v axis) per face; u x v = normal
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, u_axis, v_axis) in faces {
            let base = vertices.len() as u32;
            let center = normal * half;
            for (u, v) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let position = center + u_axis * (u * half) + v_axis * (v * half);
                vertices.push(Vertex::new(
                    position,
                    normal,
                    [(u + 1.0) * 0.5, (1.0 - v) * 0.5],
                ));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self { vertices, indices }
    }

    /// Get the number of triangles in the mesh
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get vertex data as bytes for GPU buffer creation
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Get index data as bytes for GPU buffer creation
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
