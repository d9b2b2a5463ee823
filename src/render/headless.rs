//! Headless rendering for automated testing
//!
//! Renders the demo scene into an offscreen texture so integration tests can
//! inspect pixels without a window or display.

use std::sync::Arc;

use crate::config::DemoConfig;
use crate::export::image_export::{self, ExportError};
use crate::render::camera::Camera;
use crate::render::context::{GpuContext, create_depth_texture, create_instance};
use crate::render::environment::CubeMap;
use crate::render::lookup::IridescenceLookUp;
use crate::render::material::{IridescentMaterial, SkyboxMaterial};
use crate::render::scene::Scene;

/// The shaders already encode their output, so the target is not sRGB.
pub const HEADLESS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Offscreen renderer of the torus knot scene
pub struct HeadlessRenderPipeline {
    context: GpuContext,
    render_texture: wgpu::Texture,
    render_texture_view: wgpu::TextureView,
    depth_texture_view: wgpu::TextureView,
    scene: Scene,
    width: u32,
    height: u32,
    pub camera: Camera,
}

impl HeadlessRenderPipeline {
    /// Create a `width` x `height` renderer lit by the given probes.
    ///
    /// The radiance probe doubles as the skybox environment. Returns `None`
    /// when no GPU adapter or device is available.
    pub async fn new(
        width: u32,
        height: u32,
        config: &DemoConfig,
        irradiance: Arc<CubeMap>,
        radiance: Arc<CubeMap>,
    ) -> Option<Self> {
        let width = width.max(1);
        let height = height.max(1);

        let instance = create_instance();
        let context = match GpuContext::new(&instance, None, "Headless Device").await {
            Ok(context) => context,
            Err(e) => {
                log::warn!("Headless renderer unavailable: {}", e);
                return None;
            }
        };

        let render_texture = context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Headless Render Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: HEADLESS_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let render_texture_view = render_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_texture_view = create_depth_texture(&context.device, width, height);

        let look_up = IridescenceLookUp::new(config.film.clamped(), config.look_up.size);
        let mut iridescent = IridescentMaterial::new(irradiance, Arc::clone(&radiance), look_up);
        iridescent.set_color(config.material.color.into());
        iridescent.set_boost(config.material.boost);
        let skybox = SkyboxMaterial::new(radiance);

        let mut scene = Scene::new(
            &context.device,
            &context.queue,
            HEADLESS_FORMAT,
            config,
            iridescent,
            skybox,
        );
        // Still frames unless a test advances time explicitly
        scene.rotation_playing = false;

        let camera = Camera::new(width as f32 / height as f32)
            .with_distance(config.scene.camera_distance)
            .confined_to_cube(config.scene.skybox_size);

        Some(Self {
            context,
            render_texture,
            render_texture_view,
            depth_texture_view,
            scene,
            width,
            height,
            camera,
        })
    }

    /// Render a frame to the offscreen texture
    pub fn render(&mut self) {
        self.scene
            .update(&self.context.device, &self.context.queue, &self.camera, 0.0);

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Headless Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Headless Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.render_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.scene.draw(&mut render_pass);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Render a frame and return tightly packed RGBA bytes
    /// (`width * height * 4` long).
    pub fn render_to_buffer(&mut self) -> Result<Vec<u8>, ExportError> {
        self.render();
        image_export::read_texture_rgba(
            &self.context.device,
            &self.context.queue,
            &self.render_texture,
            self.width,
            self.height,
        )
    }

    /// Render a frame and save it as PNG.
    pub fn render_to_file<P: AsRef<std::path::Path>>(&mut self, path: P) -> Result<(), ExportError> {
        let pixels = self.render_to_buffer()?;
        image_export::export_frame(path, self.width, self.height, &pixels)
    }

    /// Render dimensions
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Film thickness in nanometers
    pub fn set_film_thickness(&mut self, thickness_nm: f64) {
        self.scene
            .iridescent_material_mut()
            .iridescence_look_up_mut()
            .set_film_thickness(thickness_nm);
    }

    pub fn set_refractive_index_film(&mut self, index: f64) {
        self.scene
            .iridescent_material_mut()
            .iridescence_look_up_mut()
            .set_refractive_index_film(index);
    }

    pub fn set_refractive_index_base(&mut self, index: f64) {
        self.scene
            .iridescent_material_mut()
            .iridescence_look_up_mut()
            .set_refractive_index_base(index);
    }

    pub fn set_boost(&mut self, boost: f32) {
        self.scene.iridescent_material_mut().set_boost(boost);
    }

    pub fn orbit_camera(&mut self, delta_x: f32, delta_y: f32) {
        self.camera.orbit(delta_x, delta_y);
    }

    pub fn zoom_camera(&mut self, delta: f32) {
        self.camera.zoom(delta);
    }

    /// Advance the torus knot rotation by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        let playing = self.scene.rotation_playing;
        self.scene.rotation_playing = true;
        self.scene
            .update(&self.context.device, &self.context.queue, &self.camera, dt);
        self.scene.rotation_playing = playing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_pipeline_creation() {
        let probe = Arc::new(CubeMap::solid(4, [128, 128, 128, 255]));
        let result = pollster::block_on(HeadlessRenderPipeline::new(
            64,
            48,
            &DemoConfig::default(),
            Arc::clone(&probe),
            probe,
        ));
        // No GPU on this machine is acceptable
        if let Some(pipeline) = result {
            assert_eq!(pipeline.size(), (64, 48));
            assert_eq!(pipeline.camera.distance, 50.0);
            assert!(!pipeline.scene().rotation_playing);
        }
    }
}
