//! Demo scene: an iridescent torus knot inside a skybox
//!
//! Owns both materials together with the GPU resources derived from them.
//! Material changes are mirrored to the GPU in [`Scene::update`]: a new lookup
//! revision is re-uploaded, a resized table or a swapped probe rebuilds the
//! affected texture and bind group.

use glam::{EulerRot, Mat4, Vec2};
use std::sync::Arc;
use wgpu::util::DeviceExt;

use crate::config::DemoConfig;
use crate::physics::geometry::{Mesh, Vertex};
use crate::render::camera::Camera;
use crate::render::context::DEPTH_FORMAT;
use crate::render::environment::{CubeMap, CubeTexture};
use crate::render::lookup::LookUpTexture;
use crate::render::material::{IridescentMaterial, SkyboxMaterial};

/// Vertex and index buffers of one mesh
struct MeshBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: u32,
}

impl MeshBuffers {
    fn new(device: &wgpu::Device, mesh: &Mesh, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: mesh.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: mesh.index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            num_indices: mesh.indices.len() as u32,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.num_indices, 0, 0..1);
    }
}

/// A cube texture with the probe it was uploaded from
struct ProbeTexture {
    source: Arc<CubeMap>,
    texture: CubeTexture,
}

impl ProbeTexture {
    fn new(device: &wgpu::Device, queue: &wgpu::Queue, source: &Arc<CubeMap>, label: &str) -> Self {
        Self {
            source: Arc::clone(source),
            texture: CubeTexture::new(device, queue, source, label),
        }
    }

    /// Re-upload when the material points at a different probe. Returns
    /// whether the texture was replaced.
    fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, source: &Arc<CubeMap>, label: &str) -> bool {
        if Arc::ptr_eq(&self.source, source) {
            return false;
        }
        *self = Self::new(device, queue, source, label);
        true
    }
}

/// Torus knot plus skybox with their materials and GPU state
pub struct Scene {
    iridescent: IridescentMaterial,
    skybox: SkyboxMaterial,

    /// Current torus knot rotation around X and Y (radians)
    pub rotation: Vec2,
    /// Rotation speed around X and Y (radians per second)
    pub rotation_speed: Vec2,
    pub rotation_playing: bool,
    pub torus_visible: bool,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,

    material_buffer: wgpu::Buffer,
    irradiance_texture: ProbeTexture,
    radiance_texture: ProbeTexture,
    env_texture: ProbeTexture,
    look_up_texture: LookUpTexture,
    sampler: wgpu::Sampler,

    iridescent_layout: wgpu::BindGroupLayout,
    iridescent_bind_group: wgpu::BindGroup,
    skybox_layout: wgpu::BindGroupLayout,
    skybox_bind_group: wgpu::BindGroup,

    iridescent_pipeline: wgpu::RenderPipeline,
    skybox_pipeline: wgpu::RenderPipeline,

    torus_knot: MeshBuffers,
    skybox_cube: MeshBuffers,
    triangle_count: usize,
}

impl Scene {
    /// Build all GPU resources for drawing into `color_format` targets.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        config: &DemoConfig,
        iridescent: IridescentMaterial,
        skybox: SkyboxMaterial,
    ) -> Self {
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[Camera::new(1.0).uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera_bind_group_layout"),
            entries: &[uniform_entry(0)],
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Iridescent Material Buffer"),
            contents: bytemuck::cast_slice(&[iridescent.uniform(Mat4::IDENTITY)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let irradiance_texture =
            ProbeTexture::new(device, queue, iridescent.irradiance_probe(), "Irradiance Probe");
        let radiance_texture =
            ProbeTexture::new(device, queue, iridescent.radiance_probe(), "Radiance Probe");
        let env_texture = ProbeTexture::new(device, queue, skybox.env_map(), "Skybox Env Map");
        let look_up_texture = LookUpTexture::new(device, queue, iridescent.iridescence_look_up());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Linear Clamp Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let iridescent_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("iridescent_bind_group_layout"),
            entries: &[
                uniform_entry(0),
                texture_entry(1, wgpu::TextureViewDimension::Cube),
                texture_entry(2, wgpu::TextureViewDimension::Cube),
                texture_entry(3, wgpu::TextureViewDimension::D2),
                sampler_entry(4),
            ],
        });
        let skybox_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("skybox_bind_group_layout"),
            entries: &[texture_entry(0, wgpu::TextureViewDimension::Cube), sampler_entry(1)],
        });

        let iridescent_bind_group = create_iridescent_bind_group(
            device,
            &iridescent_layout,
            &material_buffer,
            &irradiance_texture,
            &radiance_texture,
            &look_up_texture,
            &sampler,
        );
        let skybox_bind_group = create_skybox_bind_group(device, &skybox_layout, &env_texture, &sampler);

        let iridescent_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Iridescent Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/iridescent.wgsl").into()),
        });
        let skybox_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Skybox Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/skybox.wgsl").into()),
        });

        let iridescent_pipeline = create_pipeline(
            device,
            "Iridescent Pipeline",
            &iridescent_shader,
            &[&camera_layout, &iridescent_layout],
            color_format,
            None,
            true,
        );
        // The cube winds outward; culling its front faces leaves the inside
        let skybox_pipeline = create_pipeline(
            device,
            "Skybox Pipeline",
            &skybox_shader,
            &[&camera_layout, &skybox_layout],
            color_format,
            Some(wgpu::Face::Front),
            false,
        );

        let torus_mesh = Mesh::torus_knot(&config.scene.torus_knot);
        let skybox_mesh = Mesh::skybox_cube(config.scene.skybox_size);
        let triangle_count = torus_mesh.triangle_count() + skybox_mesh.triangle_count();
        log::info!(
            "Scene: torus knot {} vertices / {} triangles, skybox edge {}",
            torus_mesh.vertex_count(),
            torus_mesh.triangle_count(),
            config.scene.skybox_size
        );

        Self {
            iridescent,
            skybox,
            rotation: Vec2::ZERO,
            rotation_speed: Vec2::from_array(config.scene.rotation_speed),
            rotation_playing: true,
            torus_visible: true,
            camera_buffer,
            camera_bind_group,
            material_buffer,
            irradiance_texture,
            radiance_texture,
            env_texture,
            look_up_texture,
            sampler,
            iridescent_layout,
            iridescent_bind_group,
            skybox_layout,
            skybox_bind_group,
            iridescent_pipeline,
            skybox_pipeline,
            torus_knot: MeshBuffers::new(device, &torus_mesh, "Torus Knot"),
            skybox_cube: MeshBuffers::new(device, &skybox_mesh, "Skybox"),
            triangle_count,
        }
    }

    pub fn iridescent_material(&self) -> &IridescentMaterial {
        &self.iridescent
    }

    pub fn iridescent_material_mut(&mut self) -> &mut IridescentMaterial {
        &mut self.iridescent
    }

    pub fn skybox_material(&self) -> &SkyboxMaterial {
        &self.skybox
    }

    pub fn skybox_material_mut(&mut self) -> &mut SkyboxMaterial {
        &mut self.skybox
    }

    /// Triangles submitted per frame
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Torus knot object transform
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, 0.0)
    }

    /// Advance the animation by `dt` seconds and push camera, material and
    /// texture changes to the GPU.
    pub fn update(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, camera: &Camera, dt: f32) {
        if self.rotation_playing && dt.is_finite() && dt > 0.0 {
            self.rotation += self.rotation_speed * dt;
            self.rotation.x %= std::f32::consts::TAU;
            self.rotation.y %= std::f32::consts::TAU;
        }

        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[camera.uniform()]));
        queue.write_buffer(
            &self.material_buffer,
            0,
            bytemuck::cast_slice(&[self.iridescent.uniform(self.model_matrix())]),
        );

        self.sync_textures(device, queue);
    }

    fn sync_textures(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        let look_up = self.iridescent.iridescence_look_up();
        let mut rebind = false;
        if self.look_up_texture.needs_resize(look_up) {
            log::debug!("Lookup table resized to {}, recreating texture", look_up.size());
            self.look_up_texture = LookUpTexture::new(device, queue, look_up);
            rebind = true;
        } else if self.look_up_texture.is_stale(look_up) {
            self.look_up_texture.write(queue, look_up);
        }

        rebind |= self.irradiance_texture.sync(
            device,
            queue,
            self.iridescent.irradiance_probe(),
            "Irradiance Probe",
        );
        rebind |= self.radiance_texture.sync(
            device,
            queue,
            self.iridescent.radiance_probe(),
            "Radiance Probe",
        );
        if rebind {
            self.iridescent_bind_group = create_iridescent_bind_group(
                device,
                &self.iridescent_layout,
                &self.material_buffer,
                &self.irradiance_texture,
                &self.radiance_texture,
                &self.look_up_texture,
                &self.sampler,
            );
        }

        if self
            .env_texture
            .sync(device, queue, self.skybox.env_map(), "Skybox Env Map")
        {
            self.skybox_bind_group =
                create_skybox_bind_group(device, &self.skybox_layout, &self.env_texture, &self.sampler);
        }
    }

    /// Record the skybox and (when visible) the torus knot into `pass`.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(0, &self.camera_bind_group, &[]);

        pass.set_pipeline(&self.skybox_pipeline);
        pass.set_bind_group(1, &self.skybox_bind_group, &[]);
        self.skybox_cube.draw(pass);

        if self.torus_visible {
            pass.set_pipeline(&self.iridescent_pipeline);
            pass.set_bind_group(1, &self.iridescent_bind_group, &[]);
            self.torus_knot.draw(pass);
        }
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32, view_dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn create_iridescent_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    material_buffer: &wgpu::Buffer,
    irradiance: &ProbeTexture,
    radiance: &ProbeTexture,
    look_up: &LookUpTexture,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("iridescent_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: material_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(irradiance.texture.view()),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(radiance.texture.view()),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(look_up.view()),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn create_skybox_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    env_map: &ProbeTexture,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("skybox_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(env_map.texture.view()),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    color_format: wgpu::TextureFormat,
    cull_mode: Option<wgpu::Face>,
    depth_write_enabled: bool,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::buffer_layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}
