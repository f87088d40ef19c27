use std::sync::Arc;

use glam::Vec2;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId, WindowLevel};

use crate::audio::{AudioController, RodioBackend};
use crate::config::Config;
use crate::ecs::systems;
use crate::panel::ui::PanelUi;
use crate::panel::{ControlPanel, PanelAction, PanelEffect, VOLUME_STEP};
use crate::peep::animator::Millis;
use crate::peep::spawn_peeps;
use crate::render::atlas::Atlas;
use crate::render::instance::SpriteInstance;
use crate::render::scene::Scene;
use crate::render::GpuState;
use crate::sprite::frames::FrameStore;
use crate::sprite::sheet::FsAssets;
use crate::sprite::SpriteLibrary;

#[cfg(windows)]
use crate::platform;

/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;
/// How often to log frame statistics (seconds).
const FPS_LOG_INTERVAL: f64 = 5.0;
/// Widest row the atlas packer may use; well inside wgpu's default limits.
const ATLAS_MAX_WIDTH: u32 = 4096;

type FatalError = Box<dyn std::error::Error>;

// ---------------------------------------------------------------------------
// Frame timing
// ---------------------------------------------------------------------------

struct FrameStats {
    frame_count: u64,
    last_log_time: Instant,
    frame_time_sum: f64,
    frame_time_min: f64,
    frame_time_max: f64,
    frames_since_log: u32,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frame_count: 0,
            last_log_time: Instant::now(),
            frame_time_sum: 0.0,
            frame_time_min: f64::MAX,
            frame_time_max: 0.0,
            frames_since_log: 0,
        }
    }

    fn record_frame(&mut self, dt: f64) {
        self.frame_count += 1;
        self.frames_since_log += 1;
        self.frame_time_sum += dt;
        self.frame_time_min = self.frame_time_min.min(dt);
        self.frame_time_max = self.frame_time_max.max(dt);

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed >= FPS_LOG_INTERVAL {
            let avg_ms = (self.frame_time_sum / self.frames_since_log as f64) * 1000.0;
            let fps = self.frames_since_log as f64 / elapsed;
            log::debug!(
                "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | total frames: {}",
                fps,
                avg_ms,
                self.frame_time_min * 1000.0,
                self.frame_time_max * 1000.0,
                self.frame_count,
            );
            self.last_log_time = Instant::now();
            self.frame_time_sum = 0.0;
            self.frame_time_min = f64::MAX;
            self.frame_time_max = 0.0;
            self.frames_since_log = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level application state.
struct App {
    config: Config,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    panel_ui: Option<PanelUi>,
    atlas: Option<Atlas>,

    // ECS + the scene every peep is drawn through
    world: hecs::World,
    scene: Scene,

    rng: fastrand::Rng,
    audio: AudioController<RodioBackend>,
    panel: ControlPanel,

    // Fixed timestep; `clock_ms` is the simulation time handed to systems.
    last_frame_time: Option<Instant>,
    accumulator: f64,
    tick_count: u64,
    clock_ms: Millis,

    frame_stats: FrameStats,

    screen_w: u32,
    screen_h: u32,

    // Whether the overlay currently accepts mouse input.
    #[cfg_attr(not(windows), allow(dead_code))]
    hittest: bool,

    // Reusable instance buffer (avoid per-frame allocation)
    instance_buf: Vec<SpriteInstance>,

    fatal: Option<FatalError>,
}

impl App {
    fn new(config: Config) -> Self {
        let audio = AudioController::new(RodioBackend::default(), config.audio.volume);
        let instance_cap = config.peep_count;
        let panel = ControlPanel::new(config.audio.start_muted);
        Self {
            config,
            window: None,
            gpu: None,
            panel_ui: None,
            atlas: None,
            world: hecs::World::new(),
            scene: Scene::new(),
            rng: fastrand::Rng::new(),
            audio,
            panel,
            last_frame_time: None,
            accumulator: 0.0,
            tick_count: 0,
            clock_ms: 0,
            frame_stats: FrameStats::new(),
            screen_w: 0,
            screen_h: 0,
            hittest: false,
            instance_buf: Vec::with_capacity(instance_cap),
            fatal: None,
        }
    }

    fn screen(&self) -> Vec2 {
        Vec2::new(self.screen_w as f32, self.screen_h as f32)
    }

    /// Record an unrecoverable startup error and leave the event loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: FatalError) {
        self.fatal = Some(err);
        event_loop.exit();
    }

    /// Load sprites, spawn every peep and pack their frames into an atlas.
    fn spawn_world(&mut self) -> Atlas {
        let assets = FsAssets::new(&self.config.assets.sprite_dir);
        let library = match SpriteLibrary::load(&self.config.assets.metadata, &assets) {
            Ok(library) => Some(library),
            Err(e) => {
                log::warn!("{e}; every peep falls back to a square");
                None
            }
        };

        let mut store = FrameStore::new(self.config.scale_factor);
        let screen = self.screen();
        let report = spawn_peeps(
            &mut self.world,
            &mut self.scene,
            &mut store,
            library.as_ref(),
            &self.config.peep_settings(),
            screen,
            self.clock_ms,
            &mut self.rng,
        );
        log::info!(
            "Spawned {} peeps ({} animated, {} fallback)",
            report.animated + report.fallback,
            report.animated,
            report.fallback
        );

        Atlas::pack(&store, ATLAS_MAX_WIDTH)
    }

    fn start_music(&mut self) {
        if self.config.audio.start_muted {
            self.audio.toggle_mute();
        }
        self.panel.sync_muted(self.audio.is_muted());

        if !self.config.audio.enabled {
            return;
        }
        let music = self.config.assets.music.clone();
        if let Err(e) = self.audio.play_music(&music) {
            log::warn!("{e}; continuing without music");
        }
    }

    /// Run fixed-timestep simulation ticks.
    fn run_fixed_update(&mut self, dt: f64) {
        let tick_ms = self.config.animation.tick_ms;
        let tick_rate = tick_ms as f64 / 1000.0;

        self.accumulator = (self.accumulator + dt).min(MAX_ACCUMULATOR);
        let screen = self.screen();

        while self.accumulator >= tick_rate {
            self.clock_ms += tick_ms;
            systems::tick(
                &mut self.world,
                self.clock_ms,
                screen,
                &mut self.rng,
                &mut self.scene,
            );

            self.accumulator -= tick_rate;
            self.tick_count += 1;
        }
    }

    /// Turn hit-testing on only while the global cursor is over the panel.
    #[cfg(windows)]
    fn update_hittest(&mut self) {
        let Some(window) = &self.window else {
            return;
        };
        let scale = window.scale_factor() as f32;
        let (mx, my) = platform::win32::get_mouse_pos();
        let cursor = Vec2::new(mx, my) / scale;
        let inside = self.panel.contains(self.screen() / scale, cursor);

        if inside != self.hittest {
            match window.set_cursor_hittest(inside) {
                Ok(()) => self.hittest = inside,
                Err(e) => log::warn!("Could not change cursor hit-testing: {e}"),
            }
        }
    }

    fn render(&mut self) -> Vec<PanelAction> {
        let (Some(window), Some(gpu), Some(ui), Some(atlas)) =
            (&self.window, &mut self.gpu, &mut self.panel_ui, &self.atlas)
        else {
            return Vec::new();
        };

        self.scene.build_instances(atlas, &mut self.instance_buf);
        gpu.update_instances(&self.instance_buf);

        let panel_frame = ui.run_frame(
            window,
            &self.panel,
            gpu.surface_config.width,
            gpu.surface_config.height,
        );

        if let Some(mut frame) = gpu.begin_frame() {
            gpu.draw_sprites(&mut frame.encoder, &frame.view);
            let extra = ui.prepare(&gpu.device, &gpu.queue, &mut frame.encoder, &panel_frame);
            {
                let mut pass = GpuState::begin_egui_pass(&mut frame.encoder, &frame.view);
                ui.render(&mut pass, &panel_frame);
            }
            gpu.finish_frame(frame.encoder, frame.output, extra);
        }
        ui.free_textures(&panel_frame);

        panel_frame.actions
    }

    fn handle_panel_action(&mut self, event_loop: &ActiveEventLoop, action: PanelAction) {
        match self.panel.apply(action) {
            PanelEffect::None => {}
            PanelEffect::ToggleMute => {
                let muted = self.audio.toggle_mute();
                self.panel.sync_muted(muted);
            }
            PanelEffect::AdjustVolume(steps) => {
                let volume = self.audio.volume() + steps as f32 * VOLUME_STEP;
                self.audio.set_volume(volume);
                log::debug!("Music volume {:.1}", self.audio.volume());
            }
            PanelEffect::Shutdown => self.shutdown(event_loop, "close button"),
        }
    }

    /// Stop audio, despawn every peep and leave the event loop.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop, reason: &str) {
        log::info!("Shutting down ({reason}) after {} ticks", self.tick_count);
        self.audio.stop();
        self.world.clear();
        self.scene.clear();
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let Some(monitor) = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
        else {
            self.fail(event_loop, "no monitor found".into());
            return;
        };
        let screen_size = monitor.size();

        // On Windows, transparency comes from wgpu's DxgiFromVisual + PreMultiplied
        // alpha; with_transparent would add WS_EX_LAYERED. Start hidden so DWM
        // doesn't cache stale frame state before the overlay styles apply.
        let attrs = WindowAttributes::default()
            .with_title("Desktop Peeps")
            .with_decorations(false)
            .with_visible(false)
            .with_resizable(false)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_inner_size(screen_size)
            .with_position(winit::dpi::PhysicalPosition::new(0, 0));
        #[cfg(not(windows))]
        let attrs = attrs.with_transparent(true);

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, e.into());
                return;
            }
        };

        #[cfg(windows)]
        platform::win32::setup_overlay(&window);

        let size = window.inner_size();
        self.screen_w = size.width;
        self.screen_h = size.height;

        log::info!(
            "Overlay window created: {}x{} on {:?}",
            size.width,
            size.height,
            monitor.name().unwrap_or_default()
        );

        let atlas = self.spawn_world();

        let gpu = match GpuState::new(window.clone(), &atlas) {
            Ok(gpu) => gpu,
            Err(e) => {
                self.fail(event_loop, e.into());
                return;
            }
        };
        log::info!("wgpu + sprite pipeline initialized");

        self.panel_ui = Some(PanelUi::new(&window, &gpu));
        self.gpu = Some(gpu);
        self.atlas = Some(atlas);

        self.start_music();

        // Continuous game loop
        event_loop.set_control_flow(ControlFlow::Poll);

        // Show window now that all styles and GPU resources are ready.
        window.set_visible(true);

        self.window = Some(window);
    }

    #[cfg_attr(not(windows), allow(unused_variables))]
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // The overlay is click-through, so it never has keyboard focus on Windows.
        #[cfg(windows)]
        {
            if platform::win32::is_escape_pressed() {
                self.shutdown(event_loop, "ESC");
                return;
            }
            self.update_hittest();
        }

        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(window), Some(ui)) = (&self.window, &mut self.panel_ui) {
            ui.on_window_event(window, &event);
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop, "window closed"),
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape) =>
            {
                self.shutdown(event_loop, "ESC");
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                    self.screen_w = new_size.width;
                    self.screen_h = new_size.height;
                }
            }
            WindowEvent::RedrawRequested => {
                // --- Timing ---
                let now = Instant::now();
                if let Some(last) = self.last_frame_time {
                    let dt = now.duration_since(last).as_secs_f64();
                    self.frame_stats.record_frame(dt);
                    self.run_fixed_update(dt);
                }
                self.last_frame_time = Some(now);

                // --- Render, then act on panel clicks ---
                for action in self.render() {
                    self.handle_panel_action(event_loop, action);
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.audio.stop();
    }
}

/// Entry point: create the event loop and run until shutdown.
pub fn run(config: Config) -> Result<(), FatalError> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
