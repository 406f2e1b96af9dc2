// =============================================================================
// GLES TRIANGLE RENDERER - Surface lifecycle core with a winit host
// =============================================================================
//
// The host event loop below is a thin collaborator: it delivers window
// lifecycle and frame-tick signals to the rendering core and nothing else.
//
// LIFECYCLE FLOW:
// 1. resumed          -> attach_window + ensure_geometry
// 2. RedrawRequested  -> render_frame (once per tick, no pacing)
// 3. suspended        -> surface_lost (display connection survives)
// 4. exiting / Drop   -> detach_window (full release on every exit path)
//
// =============================================================================

mod backend;
mod config;
mod graphics;

use anyhow::Result;
use backend::GlDriver;
use config::Config;
use graphics::Graphics;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes},
};

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() -> Result<()> {
    let config = Config::load();

    init_logging();
    log::info!("Starting GLES renderer");
    log::info!("Window: {}x{}", config.window.width, config.window.height);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}

fn init_logging() {
    use env_logger::Builder;
    use log::LevelFilter;

    let mut builder = Builder::from_default_env();
    builder.filter_level(LevelFilter::Info);
    builder.init();
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// Host-side state: the window and the rendering core it drives.
///
/// The core is owned here and passed lifecycle signals by reference;
/// its Drop releases all GPU resources on any exit path.
struct App {
    config: Config,
    window: Option<Arc<Window>>,
    graphics: Option<Graphics<GlDriver>>,

    // FPS tracking for the window title
    frame_count: u32,
    last_fps_update: Instant,
}

impl App {
    fn new(config: Config) -> Self {
        Self {
            config,
            window: None,
            graphics: None,
            frame_count: 0,
            last_fps_update: Instant::now(),
        }
    }

    fn update_fps(&mut self) {
        if !self.config.debug.show_fps {
            return;
        }

        self.frame_count += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_update).as_secs_f32();

        // Update title every second
        if elapsed >= 1.0 {
            let fps = self.frame_count as f32 / elapsed;
            if let Some(ref window) = self.window {
                window.set_title(&format!("{} - {:.0} FPS", self.config.window.title, fps));
            }
            self.frame_count = 0;
            self.last_fps_update = now;
        }
    }
}

// =============================================================================
// EVENT HANDLING
// =============================================================================

impl ApplicationHandler for App {
    /// Window available: create the window once, then (re-)attach the
    /// rendering surface and build geometry.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window = match &self.window {
            Some(window) => window.clone(),
            None => {
                let attributes = WindowAttributes::default()
                    .with_title(&self.config.window.title)
                    .with_inner_size(PhysicalSize::new(
                        self.config.window.width,
                        self.config.window.height,
                    ));

                match event_loop.create_window(attributes) {
                    Ok(window) => {
                        let window = Arc::new(window);
                        self.window = Some(window.clone());
                        window
                    }
                    Err(e) => {
                        log::error!("Failed to create window: {e:?}");
                        event_loop.exit();
                        return;
                    }
                }
            }
        };

        let clear_color = self.config.graphics.clear_color;
        let graphics = self
            .graphics
            .get_or_insert_with(|| Graphics::new(GlDriver::new(), clear_color));

        if let Err(e) = graphics.attach_window(&window) {
            // Failure is reported, not retried; the next resume attempts
            // a ground-up re-creation.
            log::error!("Failed to attach rendering surface: {e}");
            return;
        }

        let dims = graphics.dimensions();
        log::info!("Surface ready: {}x{}", dims.width, dims.height);

        graphics.ensure_geometry();
        if !graphics.is_geometry_ready() {
            log::warn!("Triangle geometry unavailable; frames will clear only");
        }
    }

    /// Window gone (platform reclaimed it): drop surface-level state but
    /// keep the display connection for the next resume.
    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        log::info!("Window surface lost, keeping display connection");
        if let Some(graphics) = &mut self.graphics {
            graphics.surface_lost();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down...");
                event_loop.exit();
            }

            WindowEvent::RedrawRequested => {
                if let Some(graphics) = &mut self.graphics {
                    graphics.render_frame();
                    if graphics.is_ready() {
                        self.update_fps();
                    }
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                use winit::keyboard::{KeyCode, PhysicalKey};

                if event.state.is_pressed() {
                    if let PhysicalKey::Code(KeyCode::Escape) = event.physical_key {
                        log::info!("ESC pressed, exiting...");
                        event_loop.exit();
                    }
                }
            }

            _ => {}
        }
    }

    /// Continuous redraw: request the next frame as soon as we go idle.
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    /// Guaranteed release on the destroy-requested exit path. Drop on
    /// `Graphics` covers the remaining paths.
    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(graphics) = &mut self.graphics {
            graphics.detach_window();
        }
        log::info!("Cleanup complete");
    }
}
