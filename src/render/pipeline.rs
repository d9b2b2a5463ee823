//! Windowed renderer with the parameter panel

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{
    DemoConfig, FILM_THICKNESS_RANGE_NM, REFRACTIVE_INDEX_BASE_RANGE, REFRACTIVE_INDEX_FILM_RANGE,
    ThinFilmParameters,
};
use crate::export::image_export;
use crate::render::camera::Camera;
use crate::render::context::{DEPTH_FORMAT, GpuContext, RenderError, create_depth_texture, create_instance};
use crate::render::environment::CubeMap;
use crate::render::lookup::IridescenceLookUp;
use crate::render::material::{IridescentMaterial, SkyboxMaterial};
use crate::render::scene::Scene;

/// Boost slider range. Values set from the CLI or config may lie outside it.
pub const BOOST_RANGE: std::ops::RangeInclusive<f32> = 0.0..=50.0;

/// Named film stacks offered by the panel
pub const FILM_PRESETS: [(&str, ThinFilmParameters); 4] = [
    (
        "Default",
        ThinFilmParameters {
            film_thickness_nm: 380.0,
            refractive_index_film: 2.0,
            refractive_index_base: 3.0,
        },
    ),
    (
        "Soap",
        ThinFilmParameters {
            film_thickness_nm: 500.0,
            refractive_index_film: 1.33,
            refractive_index_base: 1.0,
        },
    ),
    (
        "Oil",
        ThinFilmParameters {
            film_thickness_nm: 300.0,
            refractive_index_film: 1.47,
            refractive_index_base: 1.33,
        },
    ),
    (
        "Titania",
        ThinFilmParameters {
            film_thickness_nm: 250.0,
            refractive_index_film: 2.4,
            refractive_index_base: 1.5,
        },
    ),
];

/// Values edited by the panel in one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelState {
    pub film: ThinFilmParameters,
    pub color: [f32; 3],
    pub boost: f32,
    pub rotation_playing: bool,
    pub torus_visible: bool,
    pub screenshot_requested: bool,
    pub save_requested: bool,
    pub reset_requested: bool,
}

impl PanelState {
    /// Snapshot of the current material and scene flags
    pub fn capture(material: &IridescentMaterial, rotation_playing: bool, torus_visible: bool) -> Self {
        Self {
            film: material.iridescence_look_up().parameters(),
            color: material.color().to_array(),
            boost: material.boost(),
            rotation_playing,
            torus_visible,
            screenshot_requested: false,
            save_requested: false,
            reset_requested: false,
        }
    }

    /// Replace the edited values with those of `config`.
    pub fn reset_to(&mut self, config: &DemoConfig) {
        self.film = config.film.clamped();
        self.color = config.material.color;
        self.boost = config.material.boost;
        self.rotation_playing = true;
        self.torus_visible = true;
    }

    /// Push material values into `material`. The lookup table only
    /// regenerates when a film parameter actually changed. Boost passes
    /// through unclamped.
    pub fn apply_to_material(&self, material: &mut IridescentMaterial) {
        material
            .iridescence_look_up_mut()
            .set_parameters(self.film.clamped());
        material.set_color(self.color.into());
        material.set_boost(self.boost);
    }
}

/// Read-only values shown in the performance section
#[derive(Debug, Clone, Copy)]
struct FrameStats {
    fps: f32,
    width: u32,
    height: u32,
    triangles: usize,
    look_up_size: u32,
    look_up_revision: u64,
    camera_distance: f32,
}

/// Rolling frame-time average over the last 60 frames
#[derive(Debug, Default)]
pub struct FrameTimer {
    frame_times: VecDeque<f32>,
}

impl FrameTimer {
    const WINDOW: usize = 60;

    pub fn push(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.frame_times.push_back(dt);
        if self.frame_times.len() > Self::WINDOW {
            self.frame_times.pop_front();
        }
    }

    pub fn fps(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        let average = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        1.0 / average
    }
}

/// Window renderer: scene pass followed by the egui overlay
pub struct RenderPipeline {
    surface: wgpu::Surface<'static>,
    context: GpuContext,
    surface_config: wgpu::SurfaceConfiguration,
    depth_texture: wgpu::TextureView,
    scene: Scene,
    pub camera: Camera,
    /// Values restored by "Reset"
    defaults: DemoConfig,
    /// Where "Save" writes the current settings
    config_path: PathBuf,
    screenshot_dir: PathBuf,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    frame_timer: FrameTimer,
    pub screenshot_requested: bool,
}

impl RenderPipeline {
    /// Create the surface, device and scene for `window`.
    pub async fn new(
        window: Arc<winit::window::Window>,
        config: &DemoConfig,
        config_path: PathBuf,
        irradiance: Arc<CubeMap>,
        radiance: Arc<CubeMap>,
    ) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = create_instance();
        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(RenderError::CreateSurface)?;
        let context = GpuContext::new(&instance, Some(&surface), "Thin Film Device").await?;

        let surface_caps = surface.get_capabilities(&context.adapter);
        let surface_format =
            choose_surface_format(&surface_caps.formats).ok_or(RenderError::UnsupportedSurface)?;
        if surface_format.is_srgb() {
            log::warn!("No linear surface format available, colors will look washed out");
        }
        if !image_export::is_rgba8_readable(surface_format) {
            log::warn!("Surface format {:?} cannot be saved, screenshots are disabled", surface_format);
        }
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&context.device, &surface_config);
        let depth_texture =
            create_depth_texture(&context.device, surface_config.width, surface_config.height);

        let look_up = IridescenceLookUp::new(config.film.clamped(), config.look_up.size);
        let mut iridescent = IridescentMaterial::new(irradiance, Arc::clone(&radiance), look_up);
        iridescent.set_color(config.material.color.into());
        iridescent.set_boost(config.material.boost);
        let skybox = SkyboxMaterial::new(radiance);
        let scene = Scene::new(
            &context.device,
            &context.queue,
            surface_format,
            config,
            iridescent,
            skybox,
        );

        let camera = Camera::new(surface_config.width as f32 / surface_config.height as f32)
            .with_distance(config.scene.camera_distance)
            .confined_to_cube(config.scene.skybox_size);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(&context.device, surface_format, Some(DEPTH_FORMAT), 1, false);

        log::info!(
            "Surface {}x{} ({:?})",
            surface_config.width,
            surface_config.height,
            surface_format
        );

        Ok(Self {
            surface,
            context,
            surface_config,
            depth_texture,
            scene,
            camera,
            defaults: config.clone(),
            config_path,
            screenshot_dir: PathBuf::from("screenshots"),
            egui_ctx,
            egui_state,
            egui_renderer,
            frame_timer: FrameTimer::default(),
            screenshot_requested: false,
        })
    }

    /// Handle window resize
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.surface.configure(&self.context.device, &self.surface_config);
            self.depth_texture =
                create_depth_texture(&self.context.device, new_size.width, new_size.height);
            self.camera
                .set_aspect(new_size.width as f32 / new_size.height as f32);
        }
    }

    /// Forward a window event to egui; returns whether egui consumed it.
    pub fn handle_event(&mut self, window: &winit::window::Window, event: &winit::event::WindowEvent) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }

    /// Advance animation and upload per-frame data
    pub fn update(&mut self, dt: f32) {
        self.frame_timer.push(dt);
        self.scene
            .update(&self.context.device, &self.context.queue, &self.camera, dt);
    }

    /// Render the scene with the panel on top.
    pub fn render(&mut self, window: &winit::window::Window) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut panel = PanelState::capture(
            self.scene.iridescent_material(),
            self.scene.rotation_playing,
            self.scene.torus_visible,
        );
        let stats = FrameStats {
            fps: self.frame_timer.fps(),
            width: self.surface_config.width,
            height: self.surface_config.height,
            triangles: self.scene.triangle_count(),
            look_up_size: self.scene.iridescent_material().iridescence_look_up().size(),
            look_up_revision: self.scene.iridescent_material().iridescence_look_up().revision(),
            camera_distance: self.camera.distance,
        };

        let raw_input = self.egui_state.take_egui_input(window);
        let egui_output = self.egui_ctx.run(raw_input, |ctx| {
            build_panel(ctx, &mut panel, &stats);
        });
        self.apply_panel(panel);

        self.egui_state
            .handle_platform_output(window, egui_output.platform_output);
        let clipped_primitives = self
            .egui_ctx
            .tessellate(egui_output.shapes, egui_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.surface_config.width, self.surface_config.height],
            pixels_per_point: egui_output.pixels_per_point,
        };
        for (id, image_delta) in &egui_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.context.device, &self.context.queue, *id, image_delta);
        }

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.context.device,
            &self.context.queue,
            &mut encoder,
            &clipped_primitives,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
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

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &self.depth_texture,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut render_pass, &clipped_primitives, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if self.screenshot_requested {
            self.screenshot_requested = false;
            self.save_screenshot();
        }

        Ok(())
    }

    fn apply_panel(&mut self, mut panel: PanelState) {
        if panel.reset_requested {
            panel.reset_to(&self.defaults);
            self.camera = Camera::new(self.camera.aspect)
                .with_distance(self.defaults.scene.camera_distance)
                .confined_to_cube(self.defaults.scene.skybox_size);
            self.scene.rotation = glam::Vec2::ZERO;
            log::info!("Parameters reset to defaults");
        }

        panel.apply_to_material(self.scene.iridescent_material_mut());
        self.scene.rotation_playing = panel.rotation_playing;
        self.scene.torus_visible = panel.torus_visible;
        self.screenshot_requested |= panel.screenshot_requested;

        if panel.save_requested {
            self.save_settings();
        }
    }

    /// Current settings as a config, for saving
    pub fn current_config(&self) -> DemoConfig {
        let material = self.scene.iridescent_material();
        let mut config = self.defaults.clone();
        config.film = material.iridescence_look_up().parameters();
        config.material.color = material.color().to_array();
        config.material.boost = material.boost();
        config.scene.camera_distance = self.camera.distance;
        config
    }

    fn save_settings(&self) {
        match self.current_config().to_file(&self.config_path) {
            Ok(()) => log::info!("Saved settings to {}", self.config_path.display()),
            Err(e) => log::error!("{}", e),
        }
    }

    /// Render the scene (without the panel) offscreen and save it as PNG.
    pub fn save_screenshot(&mut self) {
        if !image_export::is_rgba8_readable(self.surface_config.format) {
            log::warn!(
                "Screenshot skipped: {:?} is not an 8-bit RGBA format",
                self.surface_config.format
            );
            return;
        }
        if let Err(e) = std::fs::create_dir_all(&self.screenshot_dir) {
            log::error!(
                "Failed to create screenshot directory {}: {}",
                self.screenshot_dir.display(),
                e
            );
            return;
        }
        let path = image_export::next_screenshot_path(&self.screenshot_dir);
        let (width, height) = self.size();

        let target = self.context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Screenshot Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.surface_config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Screenshot Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Screenshot Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
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

        let result = image_export::read_texture_rgba(
            &self.context.device,
            &self.context.queue,
            &target,
            width,
            height,
        )
        .and_then(|pixels| image_export::export_frame(&path, width, height, &pixels));
        match result {
            Ok(()) => log::info!("Saved: {}", path.display()),
            Err(e) => log::error!("Screenshot failed: {}", e),
        }
    }

    /// Request a screenshot after the next frame
    pub fn request_screenshot(&mut self) {
        self.screenshot_requested = true;
    }

    /// Surface size in pixels
    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }
}

/// Pick the surface format. The shaders write display-encoded values
/// themselves, so 8-bit linear formats come first, then any linear format,
/// then whatever the surface offers.
pub fn choose_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| matches!(f, wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Rgba8Unorm))
        .or_else(|| formats.iter().copied().find(|f| !f.is_srgb()))
        .or_else(|| formats.first().copied())
}

fn build_panel(ctx: &egui::Context, panel: &mut PanelState, stats: &FrameStats) {
    egui::Window::new("Thin Film")
        .default_pos([10.0, 10.0])
        .default_width(280.0)
        .resizable(false)
        .show(ctx, |ui| {
            ui.heading("Film");
            ui.separator();

            ui.add(
                egui::Slider::new(&mut panel.film.film_thickness_nm, FILM_THICKNESS_RANGE_NM)
                    .text("Film thickness")
                    .suffix(" nm"),
            );
            ui.add(
                egui::Slider::new(&mut panel.film.refractive_index_film, REFRACTIVE_INDEX_FILM_RANGE)
                    .text("Film index")
                    .fixed_decimals(2),
            );
            ui.add(
                egui::Slider::new(&mut panel.film.refractive_index_base, REFRACTIVE_INDEX_BASE_RANGE)
                    .text("Base index")
                    .fixed_decimals(2),
            );

            ui.horizontal(|ui| {
                for (name, preset) in FILM_PRESETS {
                    if ui.button(name).clicked() {
                        panel.film = preset;
                    }
                }
            });

            ui.separator();
            ui.heading("Material");
            ui.separator();

            ui.add(
                egui::Slider::new(&mut panel.boost, BOOST_RANGE)
                    .text("Boost")
                    .fixed_decimals(1),
            );
            ui.horizontal(|ui| {
                ui.label("Base color:");
                ui.color_edit_button_rgb(&mut panel.color);
            });

            ui.separator();
            ui.horizontal(|ui| {
                let play_text = if panel.rotation_playing {
                    "\u{23F8} Pause"
                } else {
                    "\u{25B6} Spin"
                };
                if ui.button(play_text).clicked() {
                    panel.rotation_playing = !panel.rotation_playing;
                }
                ui.checkbox(&mut panel.torus_visible, "Show knot");
            });

            ui.collapsing("Performance", |ui| {
                egui::Grid::new("perf_grid")
                    .num_columns(2)
                    .spacing([20.0, 4.0])
                    .show(ui, |ui| {
                        ui.label("FPS:");
                        ui.label(format!("{:.0}", stats.fps));
                        ui.end_row();

                        ui.label("Resolution:");
                        ui.label(format!("{}x{}", stats.width, stats.height));
                        ui.end_row();

                        ui.label("Triangles:");
                        ui.label(format!("{}", stats.triangles));
                        ui.end_row();

                        ui.label("Lookup:");
                        ui.label(format!(
                            "{} entries, rev {}",
                            stats.look_up_size, stats.look_up_revision
                        ));
                        ui.end_row();

                        ui.label("Distance:");
                        ui.label(format!("{:.1}", stats.camera_distance));
                        ui.end_row();
                    });
            });

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Reset").clicked() {
                    panel.reset_requested = true;
                }
                if ui.button("Save").clicked() {
                    panel.save_requested = true;
                }
                if ui.button("\u{1F4F7} Screenshot").clicked() {
                    panel.screenshot_requested = true;
                }
            });

            ui.small("F12: Screenshot");
            ui.small("Drag to rotate | Scroll to zoom | ESC to exit");
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn material() -> IridescentMaterial {
        let probe = Arc::new(CubeMap::solid(2, [255; 4]));
        IridescentMaterial::new(Arc::clone(&probe), probe, IridescenceLookUp::default())
    }

    #[test]
    fn test_presets_are_in_range() {
        for (name, preset) in FILM_PRESETS {
            assert_eq!(preset, preset.clamped(), "Preset {} out of range", name);
        }
        assert_eq!(FILM_PRESETS[0].1, ThinFilmParameters::default());
    }

    #[test]
    fn test_capture_reflects_material() {
        let mut material = material();
        material.set_boost(20.0);
        material.set_color(Vec3::new(0.5, 0.25, 1.0));
        let panel = PanelState::capture(&material, true, false);
        assert_eq!(panel.boost, 20.0);
        assert_eq!(panel.color, [0.5, 0.25, 1.0]);
        assert_eq!(panel.film, ThinFilmParameters::default());
        assert!(panel.rotation_playing && !panel.torus_visible);
    }

    #[test]
    fn test_unchanged_panel_keeps_table() {
        let mut material = material();
        let revision = material.iridescence_look_up().revision();
        PanelState::capture(&material, true, true).apply_to_material(&mut material);
        assert_eq!(material.iridescence_look_up().revision(), revision);
    }

    #[test]
    fn test_edited_panel_updates_material() {
        let mut material = material();
        let revision = material.iridescence_look_up().revision();
        let mut panel = PanelState::capture(&material, true, true);
        panel.film = FILM_PRESETS[1].1;
        panel.boost = 35.0;
        panel.apply_to_material(&mut material);

        assert_eq!(material.iridescence_look_up().parameters(), FILM_PRESETS[1].1);
        assert!(material.iridescence_look_up().revision() > revision);
        assert_eq!(material.boost(), 35.0);
    }

    #[test]
    fn test_boost_beyond_slider_range_survives_panel() {
        let mut material = material();
        material.set_boost(100.0);
        for _ in 0..3 {
            PanelState::capture(&material, true, true).apply_to_material(&mut material);
        }
        assert_eq!(material.boost(), 100.0);
        assert!(!BOOST_RANGE.contains(&material.boost()));
    }

    #[test]
    fn test_surface_format_prefers_8bit_linear() {
        use wgpu::TextureFormat as F;
        assert_eq!(
            choose_surface_format(&[F::Rgba16Float, F::Bgra8UnormSrgb, F::Bgra8Unorm]),
            Some(F::Bgra8Unorm)
        );
        assert_eq!(
            choose_surface_format(&[F::Rgb10a2Unorm, F::Rgba8Unorm]),
            Some(F::Rgba8Unorm)
        );
        assert_eq!(
            choose_surface_format(&[F::Bgra8UnormSrgb, F::Rgba16Float]),
            Some(F::Rgba16Float)
        );
        assert_eq!(choose_surface_format(&[F::Bgra8UnormSrgb]), Some(F::Bgra8UnormSrgb));
        assert_eq!(choose_surface_format(&[]), None);
    }

    #[test]
    fn test_reset_restores_config() {
        let mut config = DemoConfig::default();
        config.material.boost = 12.0;
        let mut panel = PanelState::capture(&material(), false, false);
        panel.film.film_thickness_nm = 900.0;
        panel.reset_to(&config);
        assert_eq!(panel.film, ThinFilmParameters::default());
        assert_eq!(panel.boost, 12.0);
        assert!(panel.rotation_playing && panel.torus_visible);
    }

    #[test]
    fn test_frame_timer() {
        let mut timer = FrameTimer::default();
        assert_eq!(timer.fps(), 0.0);
        for _ in 0..100 {
            timer.push(1.0 / 50.0);
        }
        timer.push(f32::NAN);
        assert!((timer.fps() - 50.0).abs() < 0.1);
    }
}
