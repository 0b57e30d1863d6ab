//! Spectrum - live audio spectrum viewer
//!
//! Captures an input device, keeps a growing history of the first channel and
//! draws its Hartley spectrum once per frame. Drag to pan, scroll to zoom,
//! `1` cycles the normalizer, `-`/`=` change the width, `9` resets the width,
//! `0` resets pan and zoom.

use clap::Parser;
use glam::Vec2;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use spectrum::audio::{list_input_devices, AudioCapture, SharedHistory};
use spectrum::cli::Args;
use spectrum::params::{AnalysisParams, RenderConfig, ViewParams};
use spectrum::rendering::{build_frame, LineVertex, RenderSystem};
use spectrum::session::{Session, StandaloneSession};
use spectrum::spectrum::SpectrumAnalyzer;
use spectrum::view::{InputState, ViewKey, ViewState};
use spectrum::{Error, Result};

const APP_NAME: &str = "spectrum";

/// Logs frame rate at debug level once per second
struct FpsTracker {
    frames: u32,
    last_print: Instant,
}

impl FpsTracker {
    fn new() -> Self {
        Self {
            frames: 0,
            last_print: Instant::now(),
        }
    }

    fn record_frame(&mut self) {
        self.frames += 1;
        let elapsed = self.last_print.elapsed();
        if elapsed > Duration::from_secs(1) {
            log::debug!("FPS: {:.1}", self.frames as f32 / elapsed.as_secs_f32());
            self.frames = 0;
            self.last_print = Instant::now();
        }
    }
}

fn view_key(code: KeyCode) -> Option<ViewKey> {
    match code {
        KeyCode::Digit1 => Some(ViewKey::CycleNormalizer),
        KeyCode::Minus => Some(ViewKey::NarrowWidth),
        KeyCode::Equal => Some(ViewKey::WidenWidth),
        KeyCode::Digit9 => Some(ViewKey::ResetWidth),
        KeyCode::Digit0 => Some(ViewKey::ResetView),
        _ => None,
    }
}

/// Main application state
struct App {
    // Rendering (surface released before the window)
    render_system: Option<RenderSystem>,
    window: Option<Arc<Window>>,
    gui_visible: bool,

    // Capture and analysis
    audio: AudioCapture,
    history: SharedHistory,
    analyzer: SpectrumAnalyzer,

    // Interaction
    view: ViewState,
    input: InputState,
    session: StandaloneSession,

    // Configuration
    params: AnalysisParams,
    render_config: RenderConfig,

    vertices: Vec<LineVertex>,
    fps: FpsTracker,
    fatal: Option<Error>,
}

impl App {
    fn new(params: AnalysisParams, render_config: RenderConfig) -> Result<Self> {
        params.validate().map_err(Error::Config)?;

        let history = SharedHistory::new(params.initial_capacity_bytes())?;
        let audio = AudioCapture::start(
            history.clone(),
            params.device.as_deref(),
            params.initial_period_frames,
        )?;

        let session = StandaloneSession::new(APP_NAME);
        log::info!(
            "Session: {}, storage {}",
            session.info().unwrap_or("none"),
            session.storage_path().display()
        );

        Ok(Self {
            render_system: None,
            window: None,
            gui_visible: true,
            audio,
            history,
            analyzer: SpectrumAnalyzer::new(),
            view: ViewState::new(ViewParams::default(), params.normalizer),
            input: InputState::default(),
            session,
            params,
            render_config,
            vertices: Vec::new(),
            fps: FpsTracker::new(),
            fatal: None,
        })
    }

    /// Stop the event loop on an unrecoverable error
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Error) {
        log::error!("{}", error);
        self.fatal = Some(error);
        event_loop.exit();
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title(format!("{} - {}", self.render_config.title, self.audio.device_name()))
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .map_err(|e| Error::Window(e.to_string()))?,
        );
        let render_system =
            pollster::block_on(RenderSystem::new(Arc::clone(&window), &self.render_config))?;

        self.window = Some(window);
        self.render_system = Some(render_system);
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        if code == KeyCode::Escape && event.state.is_pressed() {
            event_loop.exit();
            return;
        }
        if let Some(key) = view_key(code) {
            self.input.set_key(key, event.state.is_pressed());
        }
    }

    /// Show or hide the window as the session asks
    fn sync_visibility(&mut self) {
        let need_gui = self.session.need_gui();
        if need_gui != self.gui_visible {
            if let Some(window) = &self.window {
                window.set_visible(need_gui);
            }
            self.gui_visible = need_gui;
        }
    }

    /// Render a single frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        if !self.audio.is_online() || !self.session.is_online() {
            log::info!("Audio or session went offline, closing");
            event_loop.exit();
            return;
        }
        self.session.poll_events();
        self.sync_visibility();

        if self.audio.take_overrun() {
            log::warn!("Audio block longer than history, growing buffer");
        }
        match self
            .history
            .ensure_window(self.audio.period_frames(), self.params.quality_factor)
        {
            Ok(true) => log::debug!("History resized to {} samples", self.history.capacity_samples()),
            Ok(false) => {}
            Err(e) => {
                self.fail(event_loop, e.into());
                return;
            }
        }

        if !self.gui_visible {
            return;
        }
        let Some(render_system) = self.render_system.as_mut() else {
            return;
        };

        let bins = match self.analyzer.process(&self.history, self.view.normalizer) {
            Ok(bins) => bins,
            Err(e) => {
                log::debug!("Skipping frame: {}", e);
                return;
            }
        };

        self.view.update(&mut self.input);

        let (width, height) = render_system.size();
        let window_size = Vec2::new(width as f32, height as f32);
        build_frame(&mut self.vertices, bins, &self.view, window_size, &self.render_config);

        match render_system.render(&self.vertices, self.view.transform(window_size.x, window_size.y)) {
            Ok(()) => self.fps.record_frame(),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                render_system.resize(width, height);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, Error::Render("GPU out of memory".to_string()));
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }
        if let Err(e) = self.init_window(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(render_system) = self.render_system.as_mut() {
                    render_system.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::CursorMoved { position, .. } => {
                self.input.cursor = Vec2::new(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.input.drag_button = state.is_pressed();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => {
                        position.y as f32 / self.view.params().scroll_pixels_per_line
                    }
                };
                self.input.add_scroll(lines);
            }
            WindowEvent::Focused(false) => self.input.release_all(),
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}

fn list_devices() -> ExitCode {
    match list_input_devices() {
        Ok(devices) => {
            for device in devices {
                println!(
                    "{}{} ({} ch @ {}Hz)",
                    if device.is_default { "* " } else { "  " },
                    device.name,
                    device.channels,
                    device.sample_rate
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.list_devices {
        return list_devices();
    }

    let mut app = match App::new(args.analysis_params(), args.render_config()) {
        Ok(app) => app,
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
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
        return ExitCode::FAILURE;
    }

    if app.fatal.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
