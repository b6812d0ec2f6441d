//! Orrery: interactive 3D solar system
//!
//! Click a body to fly the camera to it; the camera then follows the body
//! along its orbit until you go back to the overview or drag far away.
//!
//! Controls:
//! - Left mouse drag: Orbit camera
//! - Left click: Fly to the body under the cursor
//! - Scroll: Zoom in/out
//! - Esc: Back to overview
//! - 0-8: Fly to the sun or a planet
//! - Space: Pause/resume orbits
//! - +/-: Adjust time scale
//! - O: Toggle orbit paths

mod overlay;
mod renderer;

use clap::Parser;
use common::{Camera3D, GraphicsContext, GraphicsError};
use glam::Vec2;
use orrery::config::{CliArgs, ConfigError, OrreryConfig, SimulationConfig};
use orrery::picking::{pick, ClickTracker};
use orrery::registry::{primaries, BodyId};
use orrery::{CameraCommand, CameraController, Orrery, SelectionChannel};
use overlay::{draw_overlay, OverlayAction, OverlayView};
use renderer::OrreryRenderer;
use winit::{
    event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
};

#[derive(Debug, thiserror::Error)]
enum OrreryError {
    #[error(transparent)]
    Graphics(#[from] GraphicsError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

struct EguiState {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

struct App {
    ctx: GraphicsContext,
    renderer: OrreryRenderer,
    orrery: Orrery,
    camera: Camera3D,
    controller: CameraController,
    selection: SelectionChannel,
    simulation: SimulationConfig,
    paused: bool,
    show_orbits: bool,
    show_fps: bool,
    fps: f32,
    notice: Option<String>,
    mouse_pressed: bool,
    last_mouse_pos: Option<Vec2>,
    clicks: ClickTracker,
    egui: EguiState,
}

impl App {
    fn new(ctx: GraphicsContext, config: OrreryConfig, notice: Option<String>) -> Self {
        let orrery = Orrery::new(&config.scene);
        let controller = CameraController::new(config.camera);

        let mut camera = Camera3D::new(ctx.aspect_ratio());
        controller.place_at_home(&mut camera);

        let max_instances =
            config.scene.star_count + config.scene.asteroid_count + orrery.bodies().len();
        let renderer = OrreryRenderer::new(&ctx, &camera, max_instances);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &ctx.window,
            Some(ctx.window.scale_factor() as f32),
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&ctx.device, ctx.config.format, None, 1);

        Self {
            ctx,
            renderer,
            orrery,
            camera,
            controller,
            selection: SelectionChannel::new(),
            paused: config.simulation.start_paused,
            simulation: config.simulation,
            show_orbits: config.scene.show_orbits,
            show_fps: config.debug.show_fps,
            fps: 60.0,
            notice,
            mouse_pressed: false,
            last_mouse_pos: None,
            clicks: ClickTracker::default(),
            egui: EguiState {
                ctx: egui_ctx,
                state: egui_state,
                renderer: egui_renderer,
            },
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
        self.camera.update_aspect_ratio(self.ctx.aspect_ratio());
        self.renderer
            .resize(&self.ctx.device, new_size.width, new_size.height);
    }

    /// Orbits first, then the camera, so the controller reads this frame's
    /// positions.
    fn update(&mut self, dt: f32) {
        if dt > 0.0 {
            self.fps = self.fps * 0.95 + (1.0 / dt) * 0.05;
        }
        self.orrery
            .advance(dt * self.simulation.time_scale, self.paused);
        self.controller
            .update(&mut self.camera, &mut self.selection, &self.orrery);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let selected = self.selection.current().map(|s| s.body);
        let render_data = self.renderer.update(
            &self.ctx.queue,
            &self.camera,
            &self.orrery,
            selected,
            self.show_orbits,
        );

        let raw_input = self.egui.state.take_egui_input(&self.ctx.window);
        let overlay_view = OverlayView {
            orrery: &self.orrery,
            selection: self.selection.current(),
            flight: self.controller.state(),
            paused: self.paused,
            time_scale: self.simulation.time_scale,
            max_time_scale: self.simulation.max_time_scale,
            show_orbits: self.show_orbits,
            fps: self.show_fps.then_some(self.fps),
            notice: self.notice.as_deref(),
        };
        let mut actions = Vec::new();
        let full_output = self.egui.ctx.run(raw_input, |ctx| {
            actions = draw_overlay(ctx, &overlay_view);
        });

        self.egui.state.handle_platform_output(&self.ctx.window, full_output.platform_output);
        let tris = self.egui.ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui.renderer.update_texture(&self.ctx.device, &self.ctx.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.ctx.size.width, self.ctx.size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.renderer.render(&mut encoder, &view, &render_data);

        self.egui.renderer.update_buffers(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui.renderer.render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui.renderer.free_texture(id);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        for action in actions {
            self.apply(action);
        }

        Ok(())
    }

    fn apply(&mut self, action: OverlayAction) {
        match action {
            OverlayAction::Select(body, visual_radius) => self.selection.select(body, visual_radius),
            OverlayAction::ReturnToOverview => self.return_to_overview(),
            OverlayAction::SetPaused(paused) => self.paused = paused,
            OverlayAction::SetTimeScale(scale) => {
                self.simulation.time_scale = scale.clamp(0.0, self.simulation.max_time_scale);
            }
            OverlayAction::SetShowOrbits(show) => self.show_orbits = show,
            OverlayAction::DismissNotice => self.notice = None,
        }
    }

    fn return_to_overview(&mut self) {
        self.controller
            .command(CameraCommand::ReturnToOverview, &mut self.selection);
    }

    fn select(&mut self, body: BodyId) {
        if let Some(node) = self.orrery.body(body) {
            self.selection.select(body, node.config.visual_radius);
        }
    }

    fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        if state != ElementState::Pressed {
            return;
        }

        let digit = match key {
            KeyCode::Digit0 => Some(0),
            KeyCode::Digit1 => Some(1),
            KeyCode::Digit2 => Some(2),
            KeyCode::Digit3 => Some(3),
            KeyCode::Digit4 => Some(4),
            KeyCode::Digit5 => Some(5),
            KeyCode::Digit6 => Some(6),
            KeyCode::Digit7 => Some(7),
            KeyCode::Digit8 => Some(8),
            _ => None,
        };
        if let Some(body) = digit.and_then(|n| primaries().nth(n)) {
            self.select(body.id);
            return;
        }

        match key {
            KeyCode::Space => self.paused = !self.paused,
            KeyCode::Escape => self.return_to_overview(),
            KeyCode::KeyO => self.show_orbits = !self.show_orbits,
            KeyCode::Equal | KeyCode::NumpadAdd => {
                self.simulation.time_scale =
                    (self.simulation.time_scale * 1.5).min(self.simulation.max_time_scale);
            }
            KeyCode::Minus | KeyCode::NumpadSubtract => {
                self.simulation.time_scale /= 1.5;
            }
            _ => {}
        }
    }

    fn handle_mouse_button(&mut self, state: ElementState) {
        self.mouse_pressed = state == ElementState::Pressed;
        if self.mouse_pressed {
            if let Some(cursor) = self.last_mouse_pos {
                self.clicks.press(cursor);
            }
            return;
        }

        if let Some(cursor) = self.clicks.release() {
            self.handle_click(cursor);
        }
    }

    fn handle_click(&mut self, cursor: Vec2) {
        let viewport = Vec2::new(self.ctx.size.width as f32, self.ctx.size.height as f32);
        let ray = self.camera.screen_ray(cursor, viewport);
        if let Some((body, distance)) = pick(&ray, &self.orrery) {
            log::debug!("Picked {body} at distance {distance:.1}");
            self.select(body);
        }
    }

    fn handle_mouse_move(&mut self, x: f64, y: f64) {
        let cursor = Vec2::new(x as f32, y as f32);
        if self.mouse_pressed {
            if let Some(last) = self.last_mouse_pos {
                let delta = cursor - last;
                self.clicks.moved(delta);
                if self.clicks.is_dragging() {
                    let sensitivity = self.simulation.orbit_sensitivity;
                    self.camera.orbit(delta.x * sensitivity, delta.y * sensitivity);
                }
            }
        }
        self.last_mouse_pos = Some(cursor);
    }

    fn handle_scroll(&mut self, delta: f32) {
        let step = delta * self.camera.distance * self.simulation.zoom_sensitivity;
        self.camera.zoom(step);
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui.state.on_window_event(&self.ctx.window, event).consumed
    }
}

fn init_logging(filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .init();
}

fn run() -> Result<(), OrreryError> {
    let args = CliArgs::parse();

    let (mut config, notice) = OrreryConfig::load_or_default(&args.config);
    config.apply_cli_overrides(&args);

    if args.write_default_config {
        config.save(&args.config)?;
        println!("Wrote config to {}", args.config.display());
        return Ok(());
    }

    init_logging(&config.debug.log_level);
    if let Some(notice) = &notice {
        log::warn!("Using default configuration: {notice}");
    }

    println!("Orrery - Interactive Solar System");
    println!("=================================");
    println!("Click a planet to fly to it, Esc to return");
    println!("Drag to orbit, scroll to zoom, Space to pause, 0-8 to jump");
    println!();

    let (ctx, event_loop) = pollster::block_on(GraphicsContext::new(
        &config.window.title,
        config.window.width,
        config.window.height,
        config.window.vsync,
    ))?;

    let mut app = App::new(ctx, config, notice);
    let mut last_time = std::time::Instant::now();

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { ref event, .. } => {
                // A release over the overlay must still end a drag.
                if let WindowEvent::MouseInput {
                    state: ElementState::Released,
                    button: MouseButton::Left,
                    ..
                } = event
                {
                    app.mouse_pressed = false;
                }

                let consumed = app.handle_window_event(event);

                if !consumed {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(size) => app.resize(*size),
                        WindowEvent::MouseInput { state, button, .. } => {
                            if *button == MouseButton::Left {
                                app.handle_mouse_button(*state);
                            }
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            app.handle_mouse_move(position.x, position.y);
                        }
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    physical_key: PhysicalKey::Code(key),
                                    state,
                                    ..
                                },
                            ..
                        } => app.handle_key(*key, *state),
                        WindowEvent::MouseWheel { delta, .. } => {
                            let scroll = match delta {
                                MouseScrollDelta::LineDelta(_, y) => *y,
                                MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                            };
                            app.handle_scroll(scroll);
                        }
                        WindowEvent::RedrawRequested => {
                            let now = std::time::Instant::now();
                            let dt = (now - last_time).as_secs_f32().min(0.1);
                            last_time = now;

                            app.update(dt);
                            match app.render() {
                                Ok(_) => {}
                                Err(wgpu::SurfaceError::Lost) => app.resize(app.ctx.size),
                                Err(wgpu::SurfaceError::OutOfMemory) => {
                                    log::error!("GPU out of memory, exiting");
                                    elwt.exit();
                                }
                                Err(e) => log::warn!("Render error: {e:?}"),
                            }
                        }
                        _ => {}
                    }
                } else if matches!(event, WindowEvent::CloseRequested) {
                    elwt.exit();
                }
            }
            Event::AboutToWait => {
                app.ctx.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        log::error!("{err}");
        eprintln!("orrery: {err}");
        std::process::exit(1);
    }
}
