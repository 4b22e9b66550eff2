//! # Horizon - black-hole intro animation
//!
//! A full-viewport intro: a few hundred particles orbit a dark focal point,
//! drift inwards, fade out near the event horizon, and the whole thing fades
//! away once the visitor scrolls, spins the wheel or presses a key.
//!
//! ## Quick Start
//!
//! ```
//! use horizon::prelude::*;
//!
//! let mut page = Page::new(VirtualHost::new(0.0));
//! let options = MountOptions::new(Viewport::new(1920.0, 1080.0)).with_seed(42.0);
//! page.mount(IntroConfig::default(), options, Some(RecordingSurface::new(1920, 1080)))?;
//!
//! page.advance(1000.0);
//! page.dispatch(InputEvent::Key(KeyCode::Escape));
//! page.advance(1200.0);
//!
//! assert_eq!(page.completions(), 1);
//! # Ok::<(), horizon::ConfigError>(())
//! ```
//!
//! ## Core Concepts
//!
//! ### Particle field
//!
//! [`ParticleField::generate`] derives every particle from one session seed
//! through a trigonometric hash, so the same seed and viewport always give
//! the same field. Narrow viewports get the low particle tier.
//!
//! ### Frames
//!
//! [`compose_frame`] turns the field and the elapsed time into a
//! [`DisplayList`]: opaque background, particles sorted back to front, then
//! the event-horizon overlay. A [`Surface`] draws the list:
//!
//! | Surface | Use |
//! |---------|-----|
//! | [`RecordingSurface`] | tests and inspection |
//! | [`PixelSurface`] | CPU rasterizer, PNG snapshots |
//! | [`GpuSurface`] | wgpu, native window |
//!
//! ### Dismissal
//!
//! [`DismissalController`] moves `Presenting -> FadingOut -> Dismissed`
//! exactly once and calls the completion callback exactly once. Reduced
//! motion skips the animation and fades after a short delay.
//!
//! ### Hosts
//!
//! The [`IntroAnimator`] reaches its environment only through [`Host`]:
//! [`VirtualHost`] for deterministic runs and tests, the window runner's
//! [`WindowHost`](window::WindowHost) for real time.
//!
//! ## Configuration
//!
//! Everything tunable lives in [`IntroConfig`], which loads from TOML:
//!
//! ```
//! use horizon::IntroConfig;
//!
//! let config = IntroConfig::from_toml_str(r#"
//!     palette = "ember"
//!
//!     [dismissal]
//!     fade_ms = 800.0
//! "#).unwrap();
//! assert_eq!(config.dismissal.fade_ms, 800.0);
//! ```

pub mod config;
pub mod dismissal;
pub mod easing;
pub mod error;
pub mod gpu;
pub mod host;
pub mod input;
pub mod intro;
pub mod orbit;
pub mod page;
pub mod palette;
pub mod particle;
pub mod raster;
pub mod render;
pub mod seed;
pub mod surface;
pub mod time;
pub mod viewport;
pub mod window;

pub use config::{DismissalConfig, FieldConfig, HorizonConfig, IntroConfig, MotionConfig, TriggerSet};
pub use dismissal::{DismissalController, Phase, Trigger};
pub use easing::Easing;
pub use error::{ConfigError, GpuError, IntroError, SurfaceError};
pub use glam::{Vec2, Vec3, Vec4};
pub use gpu::GpuSurface;
pub use host::{Host, ListenerSet, VirtualHost};
pub use input::{EventKind, InputEvent, KeyCode};
pub use intro::{IntroAnimator, MountOptions};
pub use page::Page;
pub use palette::Palette;
pub use particle::{Particle, ParticleField, ShapeKind, ShapeSet};
pub use raster::PixelSurface;
pub use render::{compose_frame, DisplayList, DrawCommand};
pub use seed::SessionSeed;
pub use surface::{RecordingSurface, Surface};
pub use viewport::Viewport;
pub use window::{run, RunOptions};

/// Convenient re-exports for common usage.
///
/// ```
/// use horizon::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{IntroConfig, TriggerSet};
    pub use crate::dismissal::Phase;
    pub use crate::host::{Host, VirtualHost};
    pub use crate::input::{InputEvent, KeyCode};
    pub use crate::intro::{IntroAnimator, MountOptions};
    pub use crate::page::Page;
    pub use crate::palette::Palette;
    pub use crate::particle::{ParticleField, ShapeSet};
    pub use crate::raster::PixelSurface;
    pub use crate::render::compose_frame;
    pub use crate::seed::SessionSeed;
    pub use crate::surface::{RecordingSurface, Surface};
    pub use crate::viewport::Viewport;
    pub use crate::{Vec2, Vec3, Vec4};
}
