//! Particle field generation.
//!
//! A [`ParticleField`] is the complete, immutable set of orbit definitions for
//! one intro presentation. It is generated once at mount from the session seed
//! and the viewport size, and is never regenerated afterwards - not even on
//! resize.
//!
//! Every scalar is produced by [`SessionSeed::unit`] with the input
//! `seed + index * offset`, using a distinct offset per parameter, then mapped
//! onto its range. The generator is a pure function: the same seed and
//! viewport always produce the same field.
//!
//! ```
//! use horizon::{FieldConfig, ParticleField, SessionSeed, Viewport};
//!
//! let config = FieldConfig::default();
//! let a = ParticleField::generate(SessionSeed::new(1234.0), Viewport::new(1024.0, 768.0), &config);
//! let b = ParticleField::generate(SessionSeed::new(1234.0), Viewport::new(1024.0, 768.0), &config);
//! assert_eq!(a, b);
//! assert_eq!(a.len(), config.high_tier_count);
//! ```

use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::FieldConfig;
use crate::seed::SessionSeed;
use crate::viewport::Viewport;

// Per-parameter offsets. Each particle samples `seed + index * OFFSET`.
const OFFSET_R1: f64 = 0.2;
const OFFSET_R2: f64 = 0.3;
const OFFSET_R3: f64 = 0.4;
const OFFSET_THETA1: f64 = 0.5;
const OFFSET_THETA2: f64 = 0.6;
const OFFSET_THETA3: f64 = 0.7;
const OFFSET_RHO1: f64 = 0.8;
const OFFSET_RHO2: f64 = 0.9;
const OFFSET_RHO3: f64 = 1.0;
const OFFSET_SPEED: f64 = 1.1;
const OFFSET_SIZE: f64 = 1.2;
const OFFSET_OPACITY: f64 = 1.3;
const OFFSET_HUE: f64 = 1.4;
const OFFSET_SHAPE: f64 = 1.5;

/// How a particle is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Filled disc.
    Circle,
    /// Short rotating stroke.
    Line,
    /// Rotating stroked regular polygon (3-5 sides).
    Polygon,
}

/// The shape taxonomy particles are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeSet {
    /// Circles, lines and polygons in equal proportion.
    #[default]
    Mixed,
    /// Circles only.
    Circles,
}

impl ShapeSet {
    /// Shapes in this set, in selection order.
    pub fn kinds(&self) -> &'static [ShapeKind] {
        match self {
            ShapeSet::Mixed => &[ShapeKind::Circle, ShapeKind::Line, ShapeKind::Polygon],
            ShapeSet::Circles => &[ShapeKind::Circle],
        }
    }

    /// Pick a shape from a unit random value.
    pub fn pick(&self, unit: f32) -> ShapeKind {
        let kinds = self.kinds();
        let idx = ((unit * kinds.len() as f32) as usize).min(kinds.len() - 1);
        kinds[idx]
    }
}

/// One particle's orbit definition.
///
/// The three components of `radii`, `phases` and `offsets` belong to the x, y
/// and depth axes respectively.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Generation index, stable for the session.
    pub seed_index: u32,
    /// Orbital radii `(r1, r2, r3)`, all positive.
    pub radii: Vec3,
    /// Phase angles `(theta1, theta2, theta3)` in `[0, 2π)`.
    pub phases: Vec3,
    /// Rotational offsets `(rho1, rho2, rho3)` in `[0, 2π)`.
    pub offsets: Vec3,
    /// Angular progression per ms of animation time.
    pub angular_speed: f32,
    /// Base size in pixels.
    pub size: f32,
    /// Base opacity in `(0, 1]`.
    pub base_opacity: f32,
    /// Palette selector in `[0, 1)`.
    pub hue_seed: f32,
    pub shape: ShapeKind,
}

impl Particle {
    /// Build particle `index` of a field.
    pub fn generate(seed: SessionSeed, index: u32, viewport: Viewport, config: &FieldConfig) -> Self {
        let i = index as f64;
        let orbit_span = viewport.max_side() * config.orbit_span_factor;
        let angle = |offset: f64| {
            let a = seed.unit(i * offset) * TAU;
            // Keep the half-open range after f32 rounding.
            if a >= TAU {
                0.0
            } else {
                a
            }
        };

        Self {
            seed_index: index,
            radii: Vec3::new(
                seed.range(i * OFFSET_R1, config.min_orbit_radius, orbit_span),
                seed.range(i * OFFSET_R2, config.min_orbit_radius, orbit_span),
                seed.range(i * OFFSET_R3, config.min_depth_radius, config.depth_radius_span),
            ),
            phases: Vec3::new(angle(OFFSET_THETA1), angle(OFFSET_THETA2), angle(OFFSET_THETA3)),
            offsets: Vec3::new(angle(OFFSET_RHO1), angle(OFFSET_RHO2), angle(OFFSET_RHO3)),
            angular_speed: seed.range(
                i * OFFSET_SPEED,
                config.min_angular_speed,
                config.angular_speed_span,
            ),
            size: seed.range(i * OFFSET_SIZE, config.min_size, config.size_span),
            base_opacity: seed.range(i * OFFSET_OPACITY, config.min_opacity, config.opacity_span),
            hue_seed: seed.unit(i * OFFSET_HUE),
            shape: config.shapes.pick(seed.unit(i * OFFSET_SHAPE)),
        }
    }

    /// Number of polygon sides, derived from the hue seed.
    #[inline]
    pub fn polygon_sides(&self) -> u32 {
        3 + (self.hue_seed * 3.0) as u32
    }
}

/// Two-tier particle budget: below the threshold width the low tier applies,
/// at or above it the high tier.
pub fn particle_budget(viewport_width: f32, config: &FieldConfig) -> usize {
    if viewport_width < config.tier_threshold {
        config.low_tier_count
    } else {
        config.high_tier_count
    }
}

/// The particle set of one intro presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleField {
    seed: SessionSeed,
    viewport: Viewport,
    particles: Vec<Particle>,
}

impl ParticleField {
    /// Generate the field for a seed and the viewport at mount time.
    pub fn generate(seed: SessionSeed, viewport: Viewport, config: &FieldConfig) -> Self {
        let count = particle_budget(viewport.width, config);
        let particles = (0..count as u32)
            .map(|i| Particle::generate(seed, i, viewport, config))
            .collect();

        log::debug!(
            "generated particle field: seed={:.3} viewport={}x{} count={}",
            seed.value(),
            viewport.width,
            viewport.height,
            count
        );

        Self {
            seed,
            viewport,
            particles,
        }
    }

    /// An empty field.
    pub fn empty(seed: SessionSeed, viewport: Viewport) -> Self {
        Self {
            seed,
            viewport,
            particles: Vec::new(),
        }
    }

    pub fn seed(&self) -> SessionSeed {
        self.seed
    }

    /// Viewport the field was generated for.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Particles in generation order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}
