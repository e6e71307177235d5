use anyhow::{Context, Result};
use ouroboros::self_referencing;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{AppControl, FrameCtx, Handler};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::gfx::WgpuGraphics;
use crate::input::platform::translate_window_event;
use crate::input::{Gesture, InputState};
use crate::render::RenderTarget;
use crate::time::FrameTicker;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Target frame rate for redraw scheduling.
    pub fps: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "GLView".to_string(),
            initial_size: LogicalSize::new(400.0, 400.0),
            fps: FrameTicker::DEFAULT_FPS,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window, drives `handler` until Escape or close, then returns.
    ///
    /// `on_dispose` runs exactly once on the way out. An `on_init` failure is
    /// returned as the error.
    pub fn run<H>(config: RuntimeConfig, gpu_init: GpuInit, handler: H) -> Result<()>
    where
        H: Handler + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, handler);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    ticker: FrameTicker,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<H>
where
    H: Handler + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    handler: H,

    // Declared before `window` so backend resources drop before the device owner.
    graphics: Option<WgpuGraphics>,
    window: Option<WindowEntry>,

    disposed: bool,
    failure: Option<anyhow::Error>,
}

impl<H> AppState<H>
where
    H: Handler + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, handler: H) -> Self {
        Self {
            config,
            gpu_init,
            handler,
            graphics: None,
            window: None,
            disposed: false,
            failure: None,
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        let entry = WindowEntryTryBuilder {
            input_state: InputState::default(),
            ticker: FrameTicker::new(self.config.fps),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let mut graphics =
            entry.with_gpu(|gpu| WgpuGraphics::new(gpu.device(), gpu.surface_format()));
        let size = entry.with_window(|w| w.inner_size());

        log::info!(
            "window '{}' opened at {}x{} px, {} fps",
            self.config.title,
            size.width,
            size.height,
            self.config.fps
        );

        // Registered before on_init so a failed init is still disposed.
        self.window = Some(entry);
        let init = self
            .handler
            .on_init(&mut graphics, size.width as f32, size.height as f32);
        self.graphics = Some(graphics);

        init.context("application initialization failed")
    }

    /// Runs `on_dispose` once, releases GPU state and stops the loop.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.dispose();
        self.graphics = None;
        self.window = None;
        event_loop.exit();
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        if let Some(graphics) = self.graphics.as_mut() {
            self.handler.on_dispose(graphics);
        }
        log::debug!("handler disposed");
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let Some(entry) = self.window.as_mut() else {
            return;
        };
        entry.with_gpu_mut(|gpu| gpu.resize(size));
        self.handler.on_resize(size.width as f32, size.height as f32);
        entry.with_window(|w| w.request_redraw());
    }

    fn dispatch(&mut self, gesture: Gesture, event_loop: &ActiveEventLoop) {
        match gesture {
            Gesture::Press { x, y } => self.handler.on_press(x, y),
            Gesture::Drag { x, y } => self.handler.on_drag(x, y),
            Gesture::Wheel {
                rotation,
                modifier,
                x,
                y,
            } => self.handler.on_wheel(rotation, modifier, x, y),
            Gesture::Quit => self.shutdown(event_loop),
        }
    }

    /// Drives one frame: acquire, let the handler record, flush, present.
    fn draw_frame(&mut self) -> AppControl {
        let (handler, graphics) = (&mut self.handler, &mut self.graphics);
        let (Some(entry), Some(graphics)) = (self.window.as_mut(), graphics.as_mut()) else {
            return AppControl::Continue;
        };

        entry.with_mut(|fields| {
            let size = fields.gpu.size();
            if size.width == 0 || size.height == 0 {
                return AppControl::Continue;
            }

            let mut frame = match fields.gpu.begin_frame() {
                Ok(f) => f,
                Err(err) => {
                    log::debug!("skipping frame: {err}");
                    return match fields.gpu.handle_surface_error(err) {
                        SurfaceErrorAction::Fatal => AppControl::Exit,
                        _ => AppControl::Continue,
                    };
                }
            };

            let time = fields.ticker.tick();
            let control = {
                let size = (size.width as f32, size.height as f32);
                let mut ctx = FrameCtx::new(&mut *graphics, time, size);
                handler.on_frame(&mut ctx)
            };

            // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
            {
                let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
                graphics.flush(&mut target);
            }

            fields.window.pre_present_notify();
            fields.gpu.submit(frame);

            control
        })
    }
}

impl<H> ApplicationHandler for AppState<H>
where
    H: Handler + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.disposed {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            log::error!("{e:#}");
            self.failure = Some(e);
            self.shutdown(event_loop);
            return;
        }

        if let Some(entry) = self.window.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.window.as_ref() else {
            return;
        };

        let deadline = entry.with_ticker(|t| t.next_deadline());
        if deadline <= Instant::now() {
            entry.with_window(|w| w.request_redraw());
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.window.as_mut() else {
            return;
        };
        if entry.with_window(|w| w.id()) != window_id {
            return;
        }

        let gesture = entry.with_input_state_mut(|state| {
            let ev = translate_window_event(state, &event)?;
            state.apply_event(&ev);
            Gesture::classify(state, &ev)
        });

        if let Some(gesture) = gesture {
            self.dispatch(gesture, event_loop);
        }

        match &event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::Resized(new_size) => self.resize(*new_size),

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.window.as_ref().map(|e| e.with_window(|w| w.inner_size())) {
                    self.resize(size);
                }
            }

            WindowEvent::RedrawRequested => {
                if self.draw_frame() == AppControl::Exit {
                    self.shutdown(event_loop);
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.dispose();
    }
}
