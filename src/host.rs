//! Host environment.
//!
//! The intro never talks to a window system directly. Everything it needs
//! from its environment (a clock, animation frames, one-shot timers and event
//! registration) goes through [`Host`]. [`VirtualHost`] is a deterministic
//! implementation with a virtual clock and a fixed refresh interval; the
//! native runner has its own in [`crate::window`].
//!
//! ```
//! use horizon::host::{Due, Host, VirtualHost};
//!
//! let mut host = VirtualHost::new(0.0);
//! let frame = host.request_frame().unwrap();
//! let timer = host.set_timeout(40.0);
//!
//! assert_eq!(host.take_due(100.0), Some(Due::Frame { handle: frame, timestamp: 16.0 }));
//! assert_eq!(host.take_due(100.0), Some(Due::Timer { handle: timer, at: 40.0 }));
//! assert_eq!(host.take_due(100.0), None);
//! ```

use std::collections::BTreeMap;

use crate::input::EventKind;

/// Default refresh interval of [`VirtualHost`] (ms).
pub const DEFAULT_REFRESH_MS: f64 = 16.0;

/// A pending animation-frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// A pending one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// A registered event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// What the intro needs from its environment.
pub trait Host {
    /// Monotonic high-resolution time in milliseconds.
    fn now(&self) -> f64;

    /// Ask for one animation frame. `None` means the host cannot schedule
    /// frames at all.
    fn request_frame(&mut self) -> Option<FrameHandle>;

    /// Cancel a pending frame. Unknown handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Schedule a one-shot timer `delay_ms` from now.
    fn set_timeout(&mut self, delay_ms: f64) -> TimerHandle;

    /// Cancel a pending timer. Unknown handles are ignored.
    fn clear_timeout(&mut self, handle: TimerHandle);

    /// Start delivering events of `kind`.
    fn add_listener(&mut self, kind: EventKind) -> ListenerId;

    /// Stop delivering to a listener. Unknown ids are ignored.
    fn remove_listener(&mut self, id: ListenerId);
}

/// Listeners registered together and removed together.
#[derive(Debug, Default)]
pub struct ListenerSet {
    ids: Vec<ListenerId>,
}

impl ListenerSet {
    /// Register one listener per kind.
    pub fn register(host: &mut dyn Host, kinds: impl IntoIterator<Item = EventKind>) -> Self {
        let ids = kinds.into_iter().map(|kind| host.add_listener(kind)).collect();
        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Remove every listener in the set. Safe to call more than once.
    pub fn teardown(&mut self, host: &mut dyn Host) {
        for id in self.ids.drain(..) {
            host.remove_listener(id);
        }
    }
}

/// Work that has come due on a [`VirtualHost`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Due {
    /// An animation frame, with the vsync timestamp passed to the callback.
    Frame { handle: FrameHandle, timestamp: f64 },
    /// A timer whose deadline has been reached.
    Timer { handle: TimerHandle, at: f64 },
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    deadline: f64,
    seq: u64,
}

/// Deterministic host with a virtual clock.
///
/// Frames fire on refresh boundaries: a frame requested at time `t` runs at
/// the first multiple of the refresh interval strictly after `t`. When a
/// timer and a frame fall on the same instant the timer runs first.
#[derive(Debug)]
pub struct VirtualHost {
    now: f64,
    refresh_ms: f64,
    frames_supported: bool,
    next_id: u64,
    frames: Vec<FrameHandle>,
    timers: BTreeMap<TimerHandle, PendingTimer>,
    listeners: BTreeMap<ListenerId, EventKind>,
    frames_requested: usize,
    timers_set: usize,
}

impl VirtualHost {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: start_ms,
            refresh_ms: DEFAULT_REFRESH_MS,
            frames_supported: true,
            next_id: 1,
            frames: Vec::new(),
            timers: BTreeMap::new(),
            listeners: BTreeMap::new(),
            frames_requested: 0,
            timers_set: 0,
        }
    }

    /// Use a different refresh interval.
    pub fn with_refresh(mut self, refresh_ms: f64) -> Self {
        self.refresh_ms = refresh_ms.max(1.0);
        self
    }

    /// A host whose `request_frame` always returns `None`.
    pub fn without_frame_scheduler(mut self) -> Self {
        self.frames_supported = false;
        self
    }

    pub fn refresh_ms(&self) -> f64 {
        self.refresh_ms
    }

    /// Move the clock forward without running anything.
    pub fn advance_to(&mut self, time: f64) {
        self.now = self.now.max(time);
    }

    /// Number of frames currently pending.
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of timers currently pending.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Total `request_frame` calls that were granted.
    pub fn frames_requested(&self) -> usize {
        self.frames_requested
    }

    /// Total `set_timeout` calls.
    pub fn timers_set(&self) -> usize {
        self.timers_set
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Listeners registered for `kind`, in registration order.
    pub fn listeners_for(&self, kind: EventKind) -> Vec<ListenerId> {
        self.listeners
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Timestamp of the next refresh boundary after now.
    pub fn next_vsync(&self) -> f64 {
        ((self.now / self.refresh_ms).floor() + 1.0) * self.refresh_ms
    }

    /// The earliest piece of work due at or before `until`, without running it.
    pub fn next_due(&self, until: f64) -> Option<Due> {
        let timer = self
            .timers
            .iter()
            .min_by(|a, b| {
                a.1.deadline
                    .total_cmp(&b.1.deadline)
                    .then(a.1.seq.cmp(&b.1.seq))
            })
            .map(|(handle, t)| Due::Timer {
                handle: *handle,
                at: t.deadline.max(self.now),
            });
        let frame = self.frames.first().map(|handle| Due::Frame {
            handle: *handle,
            timestamp: self.next_vsync(),
        });

        let due = match (timer, frame) {
            (Some(Due::Timer { at, .. }), Some(Due::Frame { timestamp, .. })) if timestamp < at => frame,
            (Some(t), _) => Some(t),
            (None, f) => f,
        }?;

        let when = match due {
            Due::Frame { timestamp, .. } => timestamp,
            Due::Timer { at, .. } => at,
        };
        (when <= until).then_some(due)
    }

    /// Pop the earliest due work at or before `until` and move the clock to it.
    pub fn take_due(&mut self, until: f64) -> Option<Due> {
        let due = self.next_due(until)?;
        match due {
            Due::Frame { handle, timestamp } => {
                self.frames.retain(|h| *h != handle);
                self.now = timestamp;
            }
            Due::Timer { handle, at } => {
                self.timers.remove(&handle);
                self.now = at;
            }
        }
        Some(due)
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for VirtualHost {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Host for VirtualHost {
    fn now(&self) -> f64 {
        self.now
    }

    fn request_frame(&mut self) -> Option<FrameHandle> {
        if !self.frames_supported {
            return None;
        }
        let handle = FrameHandle(self.next_id());
        self.frames.push(handle);
        self.frames_requested += 1;
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.frames.retain(|h| *h != handle);
    }

    fn set_timeout(&mut self, delay_ms: f64) -> TimerHandle {
        let seq = self.next_id();
        let handle = TimerHandle(seq);
        self.timers.insert(
            handle,
            PendingTimer {
                deadline: self.now + delay_ms.max(0.0),
                seq,
            },
        );
        self.timers_set += 1;
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
