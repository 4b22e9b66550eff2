//! Parent page driver.
//!
//! [`Page`] plays the role of the page that embeds the intro: it mounts the
//! component once, pumps frames and timers on a [`VirtualHost`], dispatches
//! input to whatever listeners are registered at that moment, and unmounts
//! the intro when it reports completion. It never mounts a second intro.
//!
//! ```
//! use horizon::prelude::*;
//!
//! let mut page = Page::new(VirtualHost::new(0.0));
//! let options = MountOptions::new(Viewport::new(1280.0, 720.0)).with_seed(3.0);
//! page.mount(IntroConfig::default(), options, Some(RecordingSurface::new(1280, 720)))?;
//!
//! page.advance(160.0);
//! page.dispatch(InputEvent::Wheel { delta_y: 120.0 });
//! page.advance(2000.0);
//!
//! assert_eq!(page.completions(), 1);
//! assert!(!page.is_mounted());
//! # Ok::<(), horizon::ConfigError>(())
//! ```

use std::cell::Cell;
use std::rc::Rc;

use crate::config::IntroConfig;
use crate::error::ConfigError;
use crate::host::{Due, Host, VirtualHost};
use crate::input::InputEvent;
use crate::intro::{IntroAnimator, MountOptions};
use crate::surface::Surface;

/// A page hosting at most one intro over its lifetime.
#[derive(Debug)]
pub struct Page<S: Surface> {
    host: VirtualHost,
    intro: Option<IntroAnimator<S>>,
    completions: Rc<Cell<u32>>,
    has_mounted: bool,
    handler_invocations: usize,
    surface_errors: usize,
}

impl<S: Surface> Page<S> {
    pub fn new(host: VirtualHost) -> Self {
        Self {
            host,
            intro: None,
            completions: Rc::new(Cell::new(0)),
            has_mounted: false,
            handler_invocations: 0,
            surface_errors: 0,
        }
    }

    /// Mount the intro. Returns `Ok(false)` if one was ever mounted before.
    ///
    /// An invalid config is an error and does not use up the page's mount.
    pub fn mount(
        &mut self,
        config: IntroConfig,
        options: MountOptions,
        surface: Option<S>,
    ) -> Result<bool, ConfigError> {
        if self.has_mounted {
            log::warn!("intro already shown on this page, not mounting again");
            return Ok(false);
        }

        let completions = self.completions.clone();
        let intro = IntroAnimator::mount(
            config,
            options,
            surface,
            move || completions.set(completions.get() + 1),
            &mut self.host,
        )?;
        self.has_mounted = true;
        self.intro = Some(intro);
        Ok(true)
    }

    /// Run every frame and timer due within the next `ms` milliseconds and
    /// leave the clock at the end of that span.
    pub fn advance(&mut self, ms: f64) {
        let until = self.host.now() + ms;
        while let Some(due) = self.host.take_due(until) {
            let Some(intro) = self.intro.as_mut() else {
                continue;
            };
            match due {
                Due::Frame { handle, timestamp } => {
                    if let Err(err) = intro.on_frame(handle, timestamp, &mut self.host) {
                        log::warn!("frame draw failed: {}", err);
                        self.surface_errors += 1;
                    }
                }
                Due::Timer { handle, .. } => intro.on_timer(handle, &mut self.host),
            }
            self.unmount_if_complete();
        }
        self.host.advance_to(until);
    }

    /// Deliver an event to every listener currently registered for its kind.
    pub fn dispatch(&mut self, event: InputEvent) {
        let listeners = self.host.listeners_for(event.kind());
        for _ in &listeners {
            self.handler_invocations += 1;
            if let Some(intro) = self.intro.as_mut() {
                intro.handle_event(&event, &mut self.host);
            }
        }
        self.unmount_if_complete();
    }

    /// Redraw the intro at its current fade opacity.
    pub fn present(&mut self) {
        let now = self.host.now();
        if let Some(intro) = self.intro.as_mut() {
            if let Err(err) = intro.present(now) {
                log::warn!("fade redraw failed: {}", err);
                self.surface_errors += 1;
            }
        }
    }

    /// Remove the intro from the page, releasing its host resources.
    pub fn unmount(&mut self) {
        if let Some(mut intro) = self.intro.take() {
            intro.dispose(&mut self.host);
        }
    }

    fn unmount_if_complete(&mut self) {
        let done = self
            .intro
            .as_ref()
            .is_some_and(|intro| intro.controller().is_dismissed());
        if done {
            log::debug!("intro completed, unmounting");
            self.unmount();
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.intro.is_some()
    }

    pub fn intro(&self) -> Option<&IntroAnimator<S>> {
        self.intro.as_ref()
    }

    pub fn host(&self) -> &VirtualHost {
        &self.host
    }

    pub fn now(&self) -> f64 {
        self.host.now()
    }

    /// Completion callbacks received so far.
    pub fn completions(&self) -> u32 {
        self.completions.get()
    }

    /// Listener deliveries made by [`dispatch`](Self::dispatch).
    pub fn handler_invocations(&self) -> usize {
        self.handler_invocations
    }

    /// Draw failures reported by the intro.
    pub fn surface_errors(&self) -> usize {
        self.surface_errors
    }
}
