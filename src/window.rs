//! Native window runner.
//!
//! Plays one intro in a winit window, rendering through [`GpuSurface`]. The
//! window closes once the intro reports completion. If the GPU cannot be
//! initialized the intro is mounted without a surface, which skips straight
//! to the fade like any other host without a drawing context.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::IntroConfig;
use crate::error::{ConfigError, IntroError};
use crate::gpu::GpuSurface;
use crate::host::{FrameHandle, Host, ListenerId, TimerHandle};
use crate::input::{EventKind, WindowInput};
use crate::intro::{IntroAnimator, MountOptions};
use crate::seed::SessionSeed;
use crate::viewport::Viewport;

/// Settings for [`run`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: IntroConfig,
    pub seed: Option<SessionSeed>,
    pub reduced_motion: bool,
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            config: IntroConfig::default(),
            seed: None,
            reduced_motion: false,
            title: "Horizon".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Open a window and play the intro until it is dismissed or the window is
/// closed.
pub fn run(options: RunOptions) -> Result<(), IntroError> {
    options.config.validate()?;
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = IntroApp::new(options);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// [`Host`] backed by a winit window and the wall clock.
///
/// Frames map onto redraw requests; timers and listeners are bookkeeping
/// that the event loop consults.
#[derive(Debug)]
pub struct WindowHost {
    origin: Instant,
    window: Option<Arc<Window>>,
    next_id: u64,
    frames: Vec<FrameHandle>,
    timers: BTreeMap<TimerHandle, f64>,
    listeners: BTreeMap<ListenerId, EventKind>,
}

impl WindowHost {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            window: None,
            next_id: 1,
            frames: Vec::new(),
            timers: BTreeMap::new(),
            listeners: BTreeMap::new(),
        }
    }

    /// Attach the window that redraw requests go to.
    pub fn attach(&mut self, window: Arc<Window>) {
        self.window = Some(window);
    }

    /// Take the pending frame handle, if any.
    pub fn take_frame(&mut self) -> Option<FrameHandle> {
        if self.frames.is_empty() {
            None
        } else {
            Some(self.frames.remove(0))
        }
    }

    /// Remove and return every timer whose deadline has passed.
    pub fn take_expired(&mut self) -> Vec<TimerHandle> {
        let now = self.now();
        let expired: Vec<_> = self
            .timers
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(handle, _)| *handle)
            .collect();
        for handle in &expired {
            self.timers.remove(handle);
        }
        expired
    }

    /// Wall-clock instant of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers
            .values()
            .copied()
            .min_by(f64::total_cmp)
            .map(|ms| self.origin + Duration::from_secs_f64(ms.max(0.0) / 1000.0))
    }

    /// Whether any listener is registered for `kind`.
    pub fn listens_to(&self, kind: EventKind) -> bool {
        self.listeners.values().any(|k| *k == kind)
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for WindowHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for WindowHost {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn request_frame(&mut self) -> Option<FrameHandle> {
        let window = self.window.clone()?;
        let handle = FrameHandle(self.next_id());
        self.frames.push(handle);
        window.request_redraw();
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.frames.retain(|h| *h != handle);
    }

    fn set_timeout(&mut self, delay_ms: f64) -> TimerHandle {
        let handle = TimerHandle(self.next_id());
        let deadline = self.now() + delay_ms.max(0.0);
        self.timers.insert(handle, deadline);
        handle
    }

    fn clear_timeout(&mut self, handle: TimerHandle) {
        self.timers.remove(&handle);
    }

    fn add_listener(&mut self, kind: EventKind) -> ListenerId {
        let id = ListenerId(self.next_id());
        self.listeners.insert(id, kind);
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }
}

struct IntroApp {
    options: RunOptions,
    window: Option<Arc<Window>>,
    host: WindowHost,
    input: WindowInput,
    intro: Option<IntroAnimator<GpuSurface>>,
    error: Option<IntroError>,
}

impl IntroApp {
    fn new(options: RunOptions) -> Self {
        Self {
            options,
            window: None,
            host: WindowHost::new(),
            input: WindowInput::new(),
            intro: None,
            error: None,
        }
    }

    fn mount(&mut self, window: Arc<Window>) -> Result<(), ConfigError> {
        let size = window.inner_size();
        self.host.attach(window.clone());

        let surface = match pollster::block_on(GpuSurface::new(window)) {
            Ok(surface) => Some(surface),
            Err(err) => {
                log::warn!("GPU unavailable, intro will fade without animating: {}", err);
                None
            }
        };

        let options = MountOptions {
            viewport: Viewport::from(size),
            reduced_motion: self.options.reduced_motion,
            seed: self.options.seed,
        };
        self.intro = Some(IntroAnimator::mount(
            self.options.config.clone(),
            options,
            surface,
            || log::info!("intro complete"),
            &mut self.host,
        )?);
        Ok(())
    }

    fn redraw(&mut self) {
        let Some(intro) = self.intro.as_mut() else {
            return;
        };
        let result = if intro.controller().is_presenting() {
            match self.host.take_frame() {
                Some(handle) => {
                    let now = self.host.now();
                    intro.on_frame(handle, now, &mut self.host)
                }
                None => Ok(()),
            }
        } else {
            intro.present(self.host.now())
        };
        if let Err(err) = result {
            log::warn!("frame presentation failed: {}", err);
        }
    }
}

impl ApplicationHandler for IntroApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window_attrs = Window::default_attributes()
            .with_title(self.options.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.options.width,
                self.options.height,
            ));

        match event_loop.create_window(window_attrs) {
            Ok(window) => {
                let window = Arc::new(window);
                self.window = Some(window.clone());
                if let Err(err) = self.mount(window) {
                    log::error!("invalid intro config: {}", err);
                    self.error = Some(err.into());
                    event_loop.exit();
                }
            }
            Err(err) => {
                log::error!("failed to create window: {}", err);
                self.error = Some(err.into());
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(intro) = self.intro.as_mut() {
                    intro.dispose(&mut self.host);
                }
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {
                for input in self.input.translate(&event) {
                    if !self.host.listens_to(input.kind()) {
                        continue;
                    }
                    if let Some(intro) = self.intro.as_mut() {
                        intro.handle_event(&input, &mut self.host);
                    }
                }
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(intro) = self.intro.as_mut() else {
            return;
        };

        for handle in self.host.take_expired() {
            intro.on_timer(handle, &mut self.host);
        }

        if intro.controller().is_dismissed() {
            intro.dispose(&mut self.host);
            event_loop.exit();
            return;
        }

        if intro.controller().is_fading() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }

        match self.host.next_deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}
