//! The intro component.
//!
//! [`IntroAnimator`] owns everything one presentation needs: the particle
//! field, its clock, the dismissal controller, the pending frame, its timers
//! and its listeners. It is driven entirely by host callbacks:
//!
//! * [`on_frame`](IntroAnimator::on_frame) for animation frames,
//! * [`on_timer`](IntroAnimator::on_timer) for timers it scheduled,
//! * [`handle_event`](IntroAnimator::handle_event) for listener deliveries.
//!
//! Nothing is global, so two animators never share state.

use std::fmt;

use crate::config::IntroConfig;
use crate::dismissal::{DismissalController, Phase, Trigger};
use crate::error::{ConfigError, SurfaceError};
use crate::host::{FrameHandle, Host, ListenerSet, TimerHandle};
use crate::input::{EventKind, InputEvent};
use crate::particle::ParticleField;
use crate::render::{compose_frame, DisplayList};
use crate::seed::SessionSeed;
use crate::surface::Surface;
use crate::time::AnimationClock;
use crate::viewport::Viewport;

/// Environment captured at mount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MountOptions {
    pub viewport: Viewport,
    /// The platform asked for reduced motion.
    pub reduced_motion: bool,
    /// Fixed session seed; a random one is drawn when `None`.
    pub seed: Option<SessionSeed>,
}

impl MountOptions {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            reduced_motion: false,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: impl Into<SessionSeed>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    pub fn with_reduced_motion(mut self, reduced_motion: bool) -> Self {
        self.reduced_motion = reduced_motion;
        self
    }
}

/// One mounted intro.
pub struct IntroAnimator<S: Surface> {
    config: IntroConfig,
    surface: Option<S>,
    field: ParticleField,
    viewport: Viewport,
    clock: AnimationClock,
    controller: DismissalController,
    frame: Option<FrameHandle>,
    /// Kept until dispose so the surface follows the window during the fade.
    resize_listener: ListenerSet,
    /// Dismissal inputs, dropped as soon as the fade starts.
    listeners: ListenerSet,
    /// Deferred fade for reduced motion or missing capabilities.
    deferred: Option<(TimerHandle, Trigger)>,
    timeout: Option<TimerHandle>,
    fade_timer: Option<TimerHandle>,
    last_frame: Option<DisplayList>,
    disposed: bool,
}

impl<S: Surface> IntroAnimator<S> {
    /// Mount the intro.
    ///
    /// With reduced motion, or when the host has no drawing surface or frame
    /// scheduler, no field is generated, no frame is requested and no
    /// listener is registered; the fade simply starts after the configured
    /// delay.
    ///
    /// Fails without touching the host if `config` does not validate.
    pub fn mount(
        config: IntroConfig,
        options: MountOptions,
        surface: Option<S>,
        on_complete: impl FnOnce() + 'static,
        host: &mut dyn Host,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let now = host.now();
        let seed = options.seed.unwrap_or_else(SessionSeed::random);
        let viewport = options.viewport;
        let controller = DismissalController::new(config.dismissal.clone(), on_complete);

        let mut intro = Self {
            surface,
            field: ParticleField::empty(seed, viewport),
            viewport,
            clock: AnimationClock::new(now),
            controller,
            frame: None,
            resize_listener: ListenerSet::default(),
            listeners: ListenerSet::default(),
            deferred: None,
            timeout: None,
            fade_timer: None,
            last_frame: None,
            disposed: false,
            config,
        };

        if options.reduced_motion {
            log::debug!("reduced motion requested, skipping animation");
            intro.defer_fade(Trigger::ReducedMotion, host);
            return Ok(intro);
        }

        let Some(surface) = intro.surface.as_mut() else {
            log::warn!("no drawing surface, skipping animation");
            intro.defer_fade(Trigger::Unavailable, host);
            return Ok(intro);
        };
        let (width, height) = viewport.pixel_size();
        if surface.size() != (width, height) {
            surface.resize(width, height);
        }

        let Some(frame) = host.request_frame() else {
            log::warn!("host cannot schedule animation frames, skipping animation");
            intro.defer_fade(Trigger::Unavailable, host);
            return Ok(intro);
        };
        intro.frame = Some(frame);
        intro.field = ParticleField::generate(seed, viewport, &intro.config.field);

        let triggers = &intro.config.dismissal.triggers;
        intro.resize_listener = ListenerSet::register(host, [EventKind::Resize]);
        let kinds = EventKind::ALL.into_iter().filter(|kind| match kind {
            EventKind::Resize => false,
            EventKind::Scroll => triggers.scroll,
            EventKind::Wheel => triggers.wheel,
            EventKind::KeyDown => triggers.keys,
            EventKind::Click => triggers.click,
        });
        intro.listeners = ListenerSet::register(host, kinds);

        if let Some(timeout_ms) = triggers.timeout_ms {
            intro.timeout = Some(host.set_timeout(timeout_ms));
        }

        log::debug!(
            "intro mounted at {:.1}ms: seed {:.3}, {} particles, {} listeners",
            now,
            seed.value(),
            intro.field.len(),
            intro.listeners.len() + intro.resize_listener.len()
        );
        Ok(intro)
    }

    /// Animation frame callback. Draws one frame, then requests the next.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        timestamp: f64,
        host: &mut dyn Host,
    ) -> Result<(), SurfaceError> {
        if self.frame != Some(handle) {
            return Ok(());
        }
        self.frame = None;
        if self.disposed || !self.controller.is_presenting() {
            return Ok(());
        }

        let t = self.clock.tick(timestamp);
        let list = compose_frame(&self.field, t, self.viewport, &self.config);
        let drawn = match self.surface.as_mut() {
            Some(surface) => surface.draw(&list, 1.0),
            None => Ok(()),
        };
        self.last_frame = Some(list);

        self.frame = host.request_frame();
        if self.frame.is_none() {
            log::warn!("frame scheduler went away, animation stopped");
        }
        drawn
    }

    /// Timer callback for timers this intro scheduled.
    pub fn on_timer(&mut self, handle: TimerHandle, host: &mut dyn Host) {
        let now = host.now();

        if let Some((deferred, trigger)) = self.deferred {
            if deferred == handle {
                self.deferred = None;
                self.start_fade(trigger, host);
                return;
            }
        }

        if self.timeout == Some(handle) {
            self.timeout = None;
            self.start_fade(Trigger::Timeout, host);
            return;
        }

        if self.fade_timer == Some(handle) {
            self.fade_timer = None;
            self.controller.complete(now);
        }
    }

    /// Listener delivery.
    ///
    /// Resizes are honored until dispose; a resize during the fade recomposes
    /// the frozen frame at the new size.
    pub fn handle_event(&mut self, event: &InputEvent, host: &mut dyn Host) {
        if self.disposed {
            return;
        }

        if let InputEvent::Resize { width, height } = *event {
            self.viewport = Viewport::new(width as f32, height as f32);
            if let Some(surface) = self.surface.as_mut() {
                surface.resize(width, height);
            }
            if self.controller.is_fading() && self.last_frame.is_some() {
                let t = self.clock.elapsed();
                self.last_frame = Some(compose_frame(&self.field, t, self.viewport, &self.config));
            }
            log::trace!("viewport resized to {}x{}", width, height);
            return;
        }

        if !self.controller.is_presenting() {
            return;
        }
        if let Some(trigger) = Trigger::from_event(event) {
            self.start_fade(trigger, host);
        }
    }

    /// Redraw the last frame at the current fade opacity.
    pub fn present(&mut self, now: f64) -> Result<(), SurfaceError> {
        if !self.controller.is_fading() || self.disposed {
            return Ok(());
        }
        let opacity = self.controller.opacity(now);
        match (self.surface.as_mut(), self.last_frame.as_ref()) {
            (Some(surface), Some(list)) => surface.draw(list, opacity),
            _ => Ok(()),
        }
    }

    /// Release every host resource. Safe to call more than once.
    pub fn dispose(&mut self, host: &mut dyn Host) {
        if let Some(frame) = self.frame.take() {
            host.cancel_frame(frame);
        }
        self.listeners.teardown(host);
        self.resize_listener.teardown(host);
        let timers = [
            self.deferred.take().map(|(handle, _)| handle),
            self.timeout.take(),
            self.fade_timer.take(),
        ];
        for handle in timers.into_iter().flatten() {
            host.clear_timeout(handle);
        }
        if !self.disposed {
            log::debug!("intro disposed after {} frames", self.clock.frame());
        }
        self.disposed = true;
    }

    fn defer_fade(&mut self, trigger: Trigger, host: &mut dyn Host) {
        let delay = self.config.dismissal.reduced_motion_delay_ms;
        self.deferred = Some((host.set_timeout(delay), trigger));
    }

    /// Enter `FadingOut` through the controller's latch, then stop the loop,
    /// drop the trigger listeners and schedule completion.
    fn start_fade(&mut self, trigger: Trigger, host: &mut dyn Host) {
        if !self.controller.trigger(trigger, host.now()) {
            return;
        }
        if let Some(frame) = self.frame.take() {
            host.cancel_frame(frame);
        }
        self.listeners.teardown(host);
        if let Some(timeout) = self.timeout.take() {
            host.clear_timeout(timeout);
        }
        self.fade_timer = Some(host.set_timeout(self.config.dismissal.fade_ms));
    }

    pub fn config(&self) -> &IntroConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    pub fn controller(&self) -> &DismissalController {
        &self.controller
    }

    /// Container opacity at host time `now`.
    pub fn opacity(&self, now: f64) -> f32 {
        self.controller.opacity(now)
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn seed(&self) -> SessionSeed {
        self.field.seed()
    }

    /// Frames drawn so far.
    pub fn frames_rendered(&self) -> u64 {
        self.clock.frame()
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.frame
    }

    /// The most recently composed frame.
    pub fn last_frame(&self) -> Option<&DisplayList> {
        self.last_frame.as_ref()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl<S: Surface> fmt::Debug for IntroAnimator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntroAnimator")
            .field("phase", &self.controller.phase())
            .field("particles", &self.field.len())
            .field("viewport", &self.viewport)
            .field("frames", &self.clock.frame())
            .field("listeners", &(self.listeners.len() + self.resize_listener.len()))
            .field("disposed", &self.disposed)
            .finish()
    }
}
