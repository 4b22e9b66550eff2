//! Dismissal state machine.
//!
//! ```text
//!            first qualifying trigger           fade elapsed
//! Presenting ────────────────────────▶ FadingOut ───────────▶ Dismissed
//!     │                                    ▲
//!     └── reduced motion: after a short delay
//! ```
//!
//! The `has_started_fade_out` latch is checked and set synchronously inside
//! [`DismissalController::begin_fade`], before the caller schedules anything,
//! so repeated or simultaneous triggers can never start a second fade. The
//! completion callback is an `FnOnce` taken out of the controller when it
//! fires, so it cannot run twice either.

use std::fmt;

use crate::config::DismissalConfig;
use crate::input::{InputEvent, KeyCode};

/// Lifecycle phase of the intro.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// The animation is playing and triggers are accepted.
    Presenting,
    /// The one-shot fade is running; input is ignored.
    FadingOut { started_at: f64 },
    /// Terminal: faded out and the parent has been notified.
    Dismissed,
}

/// Something that may end the intro.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    Scroll { offset_y: f32 },
    Wheel { delta_y: f32 },
    Key(KeyCode),
    Click,
    /// The configured presentation timeout elapsed.
    Timeout,
    /// The platform asked for reduced motion.
    ReducedMotion,
    /// No drawing surface or frame scheduler is available.
    Unavailable,
}

impl Trigger {
    /// The trigger an input event represents, if any.
    pub fn from_event(event: &InputEvent) -> Option<Self> {
        match *event {
            InputEvent::Scroll { offset_y } => Some(Trigger::Scroll { offset_y }),
            InputEvent::Wheel { delta_y } => Some(Trigger::Wheel { delta_y }),
            InputEvent::Key(key) => Some(Trigger::Key(key)),
            InputEvent::Click { .. } => Some(Trigger::Click),
            InputEvent::Resize { .. } => None,
        }
    }
}

/// Drives exactly one fade-out and one completion notification.
pub struct DismissalController {
    config: DismissalConfig,
    phase: Phase,
    has_started_fade_out: bool,
    on_complete: Option<Box<dyn FnOnce()>>,
}

impl DismissalController {
    pub fn new(config: DismissalConfig, on_complete: impl FnOnce() + 'static) -> Self {
        Self {
            config,
            phase: Phase::Presenting,
            has_started_fade_out: false,
            on_complete: Some(Box::new(on_complete)),
        }
    }

    pub fn config(&self) -> &DismissalConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_presenting(&self) -> bool {
        self.phase == Phase::Presenting
    }

    pub fn is_fading(&self) -> bool {
        matches!(self.phase, Phase::FadingOut { .. })
    }

    pub fn is_dismissed(&self) -> bool {
        self.phase == Phase::Dismissed
    }

    /// Whether a fade has ever been started.
    pub fn has_started_fade_out(&self) -> bool {
        self.has_started_fade_out
    }

    /// Whether `trigger` qualifies under the configured trigger set.
    pub fn accepts(&self, trigger: &Trigger) -> bool {
        let triggers = &self.config.triggers;
        match *trigger {
            Trigger::Scroll { offset_y } => triggers.scroll && offset_y > self.config.scroll_threshold,
            Trigger::Wheel { delta_y } => triggers.wheel && delta_y > 0.0,
            Trigger::Key(key) => triggers.keys && key.is_dismiss_key(),
            Trigger::Click => triggers.click,
            Trigger::Timeout | Trigger::ReducedMotion | Trigger::Unavailable => true,
        }
    }

    /// Offer a trigger. Returns `true` only if this call started the fade.
    pub fn trigger(&mut self, trigger: Trigger, now: f64) -> bool {
        if !self.accepts(&trigger) {
            return false;
        }
        let started = self.begin_fade(now);
        if started {
            log::debug!("intro dismissed by {:?} at {:.1}ms", trigger, now);
        }
        started
    }

    /// Enter `FadingOut` if no fade has started yet. Returns `true` if it did.
    pub fn begin_fade(&mut self, now: f64) -> bool {
        if self.has_started_fade_out {
            return false;
        }
        self.has_started_fade_out = true;
        self.phase = Phase::FadingOut { started_at: now };
        true
    }

    /// Host timestamp at which the running fade ends.
    pub fn fade_end(&self) -> Option<f64> {
        match self.phase {
            Phase::FadingOut { started_at } => Some(started_at + self.config.fade_ms),
            _ => None,
        }
    }

    /// Linear fade progress in `[0, 1]`.
    pub fn fade_progress(&self, now: f64) -> f32 {
        match self.phase {
            Phase::Presenting => 0.0,
            Phase::FadingOut { started_at } => {
                ((now - started_at) / self.config.fade_ms).clamp(0.0, 1.0) as f32
            }
            Phase::Dismissed => 1.0,
        }
    }

    /// Container opacity: 1 while presenting, eased towards 0 while fading.
    pub fn opacity(&self, now: f64) -> f32 {
        1.0 - self.config.easing.apply(self.fade_progress(now))
    }

    /// Finish the fade if it has run its course, invoking the completion
    /// callback. Returns `true` only for the call that completed it.
    pub fn complete(&mut self, now: f64) -> bool {
        match self.fade_end() {
            Some(end) if now >= end => {
                self.phase = Phase::Dismissed;
                if let Some(on_complete) = self.on_complete.take() {
                    log::debug!("intro fade finished at {:.1}ms", now);
                    on_complete();
                }
                true
            }
            _ => false,
        }
    }
}

impl fmt::Debug for DismissalController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DismissalController")
            .field("phase", &self.phase)
            .field("has_started_fade_out", &self.has_started_fade_out)
            .field("callback_pending", &self.on_complete.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TriggerSet;
    use std::cell::Cell;
    use std::rc::Rc;

    fn controller(triggers: TriggerSet) -> (DismissalController, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let config = DismissalConfig {
            triggers,
            ..Default::default()
        };
        let c = DismissalController::new(config, move || counter.set(counter.get() + 1));
        (c, calls)
    }

    #[test]
    fn test_scroll_threshold() {
        let (mut c, _) = controller(TriggerSet::scroll_to_enter());
        assert!(!c.trigger(Trigger::Scroll { offset_y: 50.0 }, 0.0));
        assert!(c.is_presenting());
        assert!(c.trigger(Trigger::Scroll { offset_y: 51.0 }, 0.0));
        assert!(c.is_fading());
    }

    #[test]
    fn test_wheel_direction() {
        let (mut c, _) = controller(TriggerSet::scroll_to_enter());
        assert!(!c.trigger(Trigger::Wheel { delta_y: -120.0 }, 0.0));
        assert!(!c.trigger(Trigger::Wheel { delta_y: 0.0 }, 0.0));
        assert!(c.trigger(Trigger::Wheel { delta_y: 3.0 }, 0.0));
    }

    #[test]
    fn test_only_dismiss_keys() {
        let (mut c, _) = controller(TriggerSet::scroll_to_enter());
        assert!(!c.trigger(Trigger::Key(KeyCode::Down), 0.0));
        assert!(c.trigger(Trigger::Key(KeyCode::Enter), 0.0));
    }

    #[test]
    fn test_trigger_sets() {
        let (scroll, _) = controller(TriggerSet::scroll_to_enter());
        assert!(!scroll.accepts(&Trigger::Click));

        let (click, _) = controller(TriggerSet::click_or_timeout(5000.0));
        assert!(click.accepts(&Trigger::Click));
        assert!(!click.accepts(&Trigger::Wheel { delta_y: 10.0 }));
        assert!(!click.accepts(&Trigger::Scroll { offset_y: 500.0 }));
        assert!(click.accepts(&Trigger::Key(KeyCode::Escape)));
    }

    #[test]
    fn test_latch_is_one_shot() {
        let (mut c, _) = controller(TriggerSet::scroll_to_enter());
        assert!(c.trigger(Trigger::Key(KeyCode::Space), 100.0));
        assert!(!c.trigger(Trigger::Key(KeyCode::Space), 101.0));
        assert!(!c.trigger(Trigger::Wheel { delta_y: 5.0 }, 102.0));
        assert!(!c.begin_fade(103.0));
        assert_eq!(c.phase(), Phase::FadingOut { started_at: 100.0 });
    }

    #[test]
    fn test_fade_opacity_curve() {
        let (mut c, _) = controller(TriggerSet::scroll_to_enter());
        assert_eq!(c.opacity(0.0), 1.0);
        c.begin_fade(1000.0);
        assert_eq!(c.opacity(1000.0), 1.0);
        assert!((c.opacity(1600.0) - 0.5).abs() < 1e-5);
        assert!(c.opacity(1300.0) > 0.9, "eased start is slow");
        assert_eq!(c.opacity(2200.0), 0.0);
        assert_eq!(c.fade_end(), Some(2200.0));
    }

    #[test]
    fn test_completion_exactly_once() {
        let (mut c, calls) = controller(TriggerSet::scroll_to_enter());
        assert!(!c.complete(0.0), "nothing to complete while presenting");

        c.begin_fade(0.0);
        assert!(!c.complete(1199.0));
        assert_eq!(calls.get(), 0);

        assert!(c.complete(1200.0));
        assert!(c.is_dismissed());
        assert_eq!(calls.get(), 1);

        assert!(!c.complete(5000.0));
        assert!(!c.trigger(Trigger::Timeout, 5000.0));
        assert_eq!(calls.get(), 1);
        assert_eq!(c.opacity(5000.0), 0.0);
    }

    #[test]
    fn test_internal_triggers_always_accepted() {
        let (c, _) = controller(TriggerSet {
            scroll: false,
            wheel: false,
            keys: false,
            click: false,
            timeout_ms: None,
        });
        assert!(c.accepts(&Trigger::ReducedMotion));
        assert!(c.accepts(&Trigger::Unavailable));
        assert!(c.accepts(&Trigger::Timeout));
        assert!(!c.accepts(&Trigger::Key(KeyCode::Escape)));
    }

    #[test]
    fn test_from_event() {
        assert_eq!(
            Trigger::from_event(&InputEvent::Wheel { delta_y: 2.0 }),
            Some(Trigger::Wheel { delta_y: 2.0 })
        );
        assert_eq!(
            Trigger::from_event(&InputEvent::Resize { width: 1, height: 1 }),
            None
        );
    }
}
