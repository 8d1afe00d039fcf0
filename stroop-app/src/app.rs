use anyhow::{Context, Result, anyhow};
use pixels::{Pixels, SurfaceTexture};
use std::sync::Arc;
use std::time::Duration;
use stroop_core::Key;
use stroop_experiment::Experiment;
use stroop_render::{FontVec, SkiaRenderer};
use stroop_timing::{FramePacer, HighPrecisionTimer, Timer};
use tracing::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key as WinitKey, NamedKey},
    window::{Fullscreen, Window, WindowId},
};

pub struct DisplayOptions {
    pub title: String,
    pub windowed: bool,
}

/// Owns the window and drives one `Experiment` from redraws and key events.
pub struct App<E: Experiment> {
    experiment: E,
    options: DisplayOptions,
    font: Option<FontVec>,

    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,

    timer: HighPrecisionTimer,
    pacer: FramePacer,
    last_frame: Option<u64>,
    error: Option<anyhow::Error>,
}

impl<E: Experiment> App<E> {
    pub fn new(experiment: E, font: FontVec, options: DisplayOptions) -> Self {
        Self {
            experiment,
            options,
            font: Some(font),
            window: None,
            pixels: None,
            renderer: None,
            timer: HighPrecisionTimer::new(),
            pacer: FramePacer::from_refresh_hz(60.0),
            last_frame: None,
            error: None,
        }
    }

    /// Runs until the experiment finishes or the window closes, then hands
    /// the experiment back.
    pub fn run(mut self) -> Result<E> {
        let event_loop = EventLoop::new()?;
        info!(
            os = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "starting display loop"
        );

        event_loop.run_app(&mut self)?;

        let stats = self.timer.frame_stats();
        if stats.frames > 0 {
            info!(
                frames = stats.frames,
                avg_ms = stats.average_frame_time_ns / 1e6,
                jitter_ms = stats.jitter_ns / 1e6,
                max_ms = stats.max_frame_time_ns / 1e6,
                fps = stats.effective_fps,
                "frame timing"
            );
        }

        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(self.experiment),
        }
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut attributes = Window::default_attributes().with_title(self.options.title.clone());

        if self.options.windowed {
            attributes = attributes.with_inner_size(LogicalSize::new(1280.0, 720.0));
        } else {
            let monitor = event_loop
                .primary_monitor()
                .or_else(|| event_loop.available_monitors().next())
                .ok_or_else(|| anyhow!("no monitor available"))?;
            attributes = attributes
                .with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))))
                .with_resizable(false);
        }

        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        let refresh_hz = window
            .current_monitor()
            .and_then(|m| m.refresh_rate_millihertz())
            .map_or(60.0, |mhz| mhz as f64 / 1000.0);
        self.pacer = FramePacer::from_refresh_hz(refresh_hz);
        info!(
            width = size.width,
            height = size.height,
            scale = window.scale_factor(),
            refresh_hz,
            "window created"
        );

        let surface = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(Pixels::new(size.width, size.height, surface)?);

        let font = self.font.take().context("font already consumed")?;
        self.renderer = Some(SkiaRenderer::new(size.width, size.height, font)?);

        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    /// Draws the current stimulus, then lets the experiment advance.
    fn frame(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };
        self.pacer.wait(&self.timer);
        renderer.render_frame(
            self.experiment.stimulus(),
            self.experiment.background(),
            pixels.frame_mut(),
        )?;
        pixels.render()?;

        // frame timing covers the timed steps, not screens waiting on a key
        let now = self.timer.now();
        if self.experiment.is_awaiting_key() {
            self.last_frame = None;
        } else if let Some(prev) = self.last_frame.replace(now) {
            self.timer.record_frame(Duration::from_nanos(now - prev));
        }

        self.experiment.presented();
        self.experiment.update()?;
        Ok(())
    }

    fn handle_key(&mut self, key: &WinitKey) -> Result<()> {
        let Some(key) = map_key(key) else {
            return Ok(());
        };
        self.experiment.handle_key(key)?;
        Ok(())
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) -> Result<()> {
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        if let Some(pixels) = &mut self.pixels {
            pixels.resize_surface(size.width, size.height)?;
            pixels.resize_buffer(size.width, size.height)?;
        }
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(size.width, size.height)?;
        }
        info!(width = size.width, height = size.height, "display resized");
        Ok(())
    }

    /// Redraws every frame so timed steps and response timeouts advance.
    fn schedule(&mut self, event_loop: &ActiveEventLoop) {
        if self.experiment.is_finished() {
            info!("experiment finished");
            self.exit(event_loop);
        } else if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!(error = %err, "stopping");
        self.error = Some(err);
        self.exit(event_loop);
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        event_loop.exit();
    }
}

impl<E: Experiment> ApplicationHandler for App<E> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.create_window_and_surface(event_loop) {
                self.fail(event_loop, err.context("creating window"));
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                warn!(phase = %self.experiment.phase(), "window closed");
                self.exit(event_loop);
            }
            WindowEvent::RedrawRequested => match self.frame() {
                Ok(()) => self.schedule(event_loop),
                Err(err) => self.fail(event_loop, err),
            },
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() && !event.repeat => {
                match self.handle_key(&event.logical_key) {
                    Ok(()) => self.schedule(event_loop),
                    Err(err) => self.fail(event_loop, err),
                }
            }
            WindowEvent::Resized(size) => {
                if let Err(err) = self.handle_resize(size) {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }
}

/// Escape, space and single characters; everything else is ignored.
pub fn map_key(key: &WinitKey) -> Option<Key> {
    match key {
        WinitKey::Named(NamedKey::Escape) => Some(Key::Escape),
        WinitKey::Named(NamedKey::Space) => Some(Key::Space),
        WinitKey::Character(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(' '), None) => Some(Key::Space),
                (Some(c), None) => Some(Key::char(c)),
                _ => None,
            }
        }
        _ => None,
    }
}
