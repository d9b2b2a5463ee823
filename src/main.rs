//! Thin-film iridescence demo
//!
//! An iridescent torus knot inside a skybox, with live film parameters.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use thin_film_iridescence::config::{AssetParameters, DemoConfig};
use thin_film_iridescence::render::RenderPipeline;
use thin_film_iridescence::render::environment::CubeMap;

/// Default file written by the panel's "Save" button
const DEFAULT_CONFIG_PATH: &str = "thin_film.json";

/// Thin-film iridescence on a torus knot
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override film thickness (nanometers)
    #[arg(long)]
    thickness: Option<f64>,

    /// Override film refractive index
    #[arg(long)]
    film_index: Option<f64>,

    /// Override base refractive index
    #[arg(long)]
    base_index: Option<f64>,

    /// Override iridescence boost
    #[arg(long)]
    boost: Option<f32>,

    /// Directory holding the `irradiance` and `radiance` cube maps
    #[arg(long)]
    assets: Option<PathBuf>,
}

impl Args {
    fn apply_overrides(&self, config: &mut DemoConfig) {
        if let Some(thickness) = self.thickness {
            config.film.film_thickness_nm = thickness;
        }
        if let Some(index) = self.film_index {
            config.film.refractive_index_film = index;
        }
        if let Some(index) = self.base_index {
            config.film.refractive_index_base = index;
        }
        if let Some(boost) = self.boost {
            config.material.boost = boost;
        }
        if let Some(ref root) = self.assets {
            config.assets = AssetParameters::with_root(root);
        }
        config.film = config.film.clamped();
    }
}

/// Environment probes shared by both materials
struct Probes {
    irradiance: Arc<CubeMap>,
    radiance: Arc<CubeMap>,
}

/// Application state
struct App {
    window: Option<Arc<Window>>,
    pipeline: Option<RenderPipeline>,
    config: DemoConfig,
    config_path: PathBuf,
    probes: Probes,
    last_frame: Instant,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    failed: bool,
}

impl App {
    fn new(config: DemoConfig, config_path: PathBuf, probes: Probes) -> Self {
        Self {
            window: None,
            pipeline: None,
            config,
            config_path,
            probes,
            last_frame: Instant::now(),
            mouse_pressed: false,
            last_mouse_pos: None,
            failed: false,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop) {
        self.failed = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("Thin-Film Iridescence")
            .with_inner_size(LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                self.fail(event_loop);
                return;
            }
        };
        self.window = Some(Arc::clone(&window));

        let pipeline = pollster::block_on(RenderPipeline::new(
            window,
            &self.config,
            self.config_path.clone(),
            Arc::clone(&self.probes.irradiance),
            Arc::clone(&self.probes.radiance),
        ));
        match pipeline {
            Ok(pipeline) => {
                self.pipeline = Some(pipeline);
                self.last_frame = Instant::now();
                log::info!("Window created, rendering started");
            }
            Err(e) => {
                log::error!("{}", e);
                self.fail(event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let egui_consumed = if let (Some(pipeline), Some(window)) = (&mut self.pipeline, &self.window) {
            pipeline.handle_event(window, &event)
        } else {
            false
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(ref mut pipeline) = self.pipeline {
                    pipeline.resize(new_size);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.mouse_pressed = orbit_drag_active(state, egui_consumed);
            }
            WindowEvent::CursorMoved { position, .. } if !egui_consumed => {
                if self.mouse_pressed
                    && let Some((last_x, last_y)) = self.last_mouse_pos
                    && let Some(ref mut pipeline) = self.pipeline
                {
                    pipeline
                        .camera
                        .orbit((position.x - last_x) as f32, (position.y - last_y) as f32);
                }
                self.last_mouse_pos = Some((position.x, position.y));
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.last_mouse_pos = Some((position.x, position.y));
            }
            WindowEvent::MouseWheel { delta, .. } if !egui_consumed => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(ref mut pipeline) = self.pipeline {
                    pipeline.camera.zoom(scroll);
                }
            }
            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if event.state == ElementState::Pressed {
                    use winit::keyboard::{Key, NamedKey};
                    match event.logical_key {
                        Key::Named(NamedKey::Escape) => event_loop.exit(),
                        Key::Named(NamedKey::F12) => {
                            if let Some(ref mut pipeline) = self.pipeline {
                                pipeline.request_screenshot();
                            }
                        }
                        _ => {}
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now.duration_since(self.last_frame).as_secs_f32();
                self.last_frame = now;

                if let (Some(pipeline), Some(window)) = (&mut self.pipeline, &self.window) {
                    pipeline.update(dt);

                    match pipeline.render(window) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            let (width, height) = pipeline.size();
                            pipeline.resize(winit::dpi::PhysicalSize::new(width, height));
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("Out of GPU memory, exiting");
                            self.failed = true;
                            event_loop.exit();
                        }
                        Err(e) => log::warn!("Render error: {:?}", e),
                    }
                }

                if let Some(ref window) = self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Orbit drag state after a left-button event. A press over the panel does
/// not start a drag, and a release always ends one.
fn orbit_drag_active(state: ElementState, egui_consumed: bool) -> bool {
    state == ElementState::Pressed && !egui_consumed
}

fn load_config(args: &Args) -> DemoConfig {
    let mut config = match args.config {
        Some(ref path) => match DemoConfig::from_file(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{}, using defaults", e);
                DemoConfig::default()
            }
        },
        None => DemoConfig::default(),
    };
    args.apply_overrides(&mut config);
    config
}

fn load_probes(config: &DemoConfig) -> Result<Probes, thin_film_iridescence::render::environment::EnvironmentError> {
    let irradiance = CubeMap::load(&config.assets.irradiance_dir)?;
    let radiance = CubeMap::load(&config.assets.radiance_dir)?;
    Ok(Probes {
        irradiance: Arc::new(irradiance),
        radiance: Arc::new(radiance),
    })
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args);
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    log::info!(
        "Film: {} nm, n_film {}, n_base {}, boost {}",
        config.film.film_thickness_nm,
        config.film.refractive_index_film,
        config.film.refractive_index_base,
        config.material.boost
    );

    let probes = match load_probes(&config) {
        Ok(probes) => probes,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            return ExitCode::FAILURE;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, config_path, probes);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop failed: {}", e);
        return ExitCode::FAILURE;
    }

    if app.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
