//! Frame composition.
//!
//! A frame is built as a [`DisplayList`]: a backend-neutral sequence of draw
//! commands in painter's order. Composition is pure - it depends only on the
//! field, the elapsed time, the viewport and the configuration - and every
//! [`Surface`](crate::surface::Surface) backend consumes the same list.
//!
//! Painter's order for one frame:
//!
//! 1. Opaque background fill (no trails).
//! 2. Particles, sorted back to front by computed depth.
//! 3. Event horizon: gradient halo, solid core, breathing glow ring.

use std::f32::consts::TAU;

use glam::{Vec2, Vec4};

use crate::config::IntroConfig;
use crate::orbit::{project_field, Projected};
use crate::palette::rgba;
use crate::particle::{Particle, ParticleField, ShapeKind};
use crate::viewport::Viewport;

/// Stops of the halo gradient: `(offset, rgb, alpha)`.
const HALO_STOPS: [(f32, [u8; 3], f32); 7] = [
    (0.0, [0, 0, 0], 1.0),
    (0.15, [0, 0, 0], 0.98),
    (0.3, [10, 10, 15], 0.9),
    (0.5, [20, 15, 25], 0.6),
    (0.7, [30, 25, 35], 0.3),
    (0.85, [20, 20, 25], 0.1),
    (1.0, [0, 0, 0], 0.0),
];

/// Inner radius of the glow gradient relative to the core radius.
const GLOW_INNER: f32 = 0.9;

/// A color stop of a radial gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position between the inner (0.0) and outer (1.0) radius.
    pub offset: f32,
    pub color: Vec4,
}

impl GradientStop {
    pub fn new(offset: f32, color: Vec4) -> Self {
        Self { offset, color }
    }
}

/// Color of a gradient at normalized position `t`. Stops must be sorted by
/// offset; positions outside the stop range take the nearest end color.
pub fn sample_gradient(stops: &[GradientStop], t: f32) -> Vec4 {
    let Some(first) = stops.first() else {
        return Vec4::ZERO;
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = (b.offset - a.offset).max(f32::EPSILON);
            return a.color.lerp(b.color, (t - a.offset) / span);
        }
    }
    stops[stops.len() - 1].color
}

/// A single drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole surface with an opaque color.
    Fill { color: Vec4 },
    /// Filled disc.
    Circle { center: Vec2, radius: f32, color: Vec4 },
    /// Stroked line segment.
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Vec4,
    },
    /// Stroked closed polygon.
    Polygon {
        points: Vec<Vec2>,
        width: f32,
        color: Vec4,
    },
    /// Disc of `outer_radius` filled with a concentric radial gradient.
    RadialGradient {
        center: Vec2,
        inner_radius: f32,
        outer_radius: f32,
        stops: Vec<GradientStop>,
    },
}

/// Draw commands of one frame in painter's order.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    viewport: Viewport,
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            commands: Vec::new(),
        }
    }

    pub fn with_capacity(viewport: Viewport, capacity: usize) -> Self {
        Self {
            viewport,
            commands: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawCommand> {
        self.commands.iter()
    }
}

impl<'a> IntoIterator for &'a DisplayList {
    type Item = &'a DrawCommand;
    type IntoIter = std::slice::Iter<'a, DrawCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

/// Compose the frame at elapsed animation time `t` (ms).
pub fn compose_frame(field: &ParticleField, t: f32, viewport: Viewport, config: &IntroConfig) -> DisplayList {
    let projected = project_field(field, t, viewport.center(), &config.motion);
    let mut list = DisplayList::with_capacity(viewport, projected.len() + 4);

    list.push(DrawCommand::Fill {
        color: rgba(config.horizon.background, 1.0),
    });

    let particles = field.particles();
    for p in &projected {
        let particle = &particles[p.seed_index as usize];
        list.push(particle_command(particle, p, t, config));
    }

    for command in horizon_overlay(viewport, t, config) {
        list.push(command);
    }

    log::trace!(
        "composed frame t={:.1}ms: {} of {} particles visible",
        t,
        projected.len(),
        field.len()
    );
    list
}

/// Draw command for one projected particle.
pub fn particle_command(particle: &Particle, p: &Projected, t: f32, config: &IntroConfig) -> DrawCommand {
    let color = config.palette.color(particle.hue_seed, p.opacity);
    let size = particle.size * p.scale;
    let spin = t * particle.angular_speed;

    match particle.shape {
        ShapeKind::Circle => DrawCommand::Circle {
            center: p.position,
            radius: size,
            color,
        },
        ShapeKind::Line => {
            let angle = particle.phases.x + spin * 2.0;
            let half = Vec2::from_angle(angle) * (size * 2.0);
            DrawCommand::Line {
                from: p.position - half,
                to: p.position + half,
                width: p.scale,
                color,
            }
        }
        ShapeKind::Polygon => {
            let sides = particle.polygon_sides();
            let radius = size * 1.5;
            let points = (0..sides)
                .map(|i| {
                    let a = i as f32 / sides as f32 * TAU + spin;
                    p.position + Vec2::from_angle(a) * radius
                })
                .collect();
            DrawCommand::Polygon {
                points,
                width: p.scale * 0.8,
                color,
            }
        }
    }
}

/// Opacity of the breathing glow ring at time `t` (ms).
pub fn glow_opacity(t: f32, config: &IntroConfig) -> f32 {
    let h = &config.horizon;
    h.glow_opacity + (t * h.breath_rate).sin() * h.glow_amplitude
}

/// The focal overlay: gradient halo, solid core and breathing glow.
pub fn horizon_overlay(viewport: Viewport, t: f32, config: &IntroConfig) -> [DrawCommand; 3] {
    let h = &config.horizon;
    let center = viewport.center();

    let halo = DrawCommand::RadialGradient {
        center,
        inner_radius: 0.0,
        outer_radius: viewport.min_side() * h.halo_fraction,
        stops: HALO_STOPS
            .iter()
            .map(|&(offset, rgb, alpha)| GradientStop::new(offset, rgba(rgb, alpha)))
            .collect(),
    };

    let core = DrawCommand::Circle {
        center,
        radius: h.core_radius,
        color: Vec4::new(0.0, 0.0, 0.0, 1.0),
    };

    let glow_color = rgba(h.glow_color, glow_opacity(t, config));
    let glow = DrawCommand::RadialGradient {
        center,
        inner_radius: h.core_radius * GLOW_INNER,
        outer_radius: h.core_radius * h.glow_ratio,
        stops: vec![
            GradientStop::new(0.0, glow_color.truncate().extend(0.0)),
            GradientStop::new(0.5, glow_color),
            GradientStop::new(1.0, glow_color.truncate().extend(0.0)),
        ],
    };

    [halo, core, glow]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::SessionSeed;

    fn frame(t: f32) -> DisplayList {
        let config = IntroConfig::default();
        let viewport = Viewport::new(1280.0, 720.0);
        let field = ParticleField::generate(SessionSeed::new(42.0), viewport, &config.field);
        compose_frame(&field, t, viewport, &config)
    }

    #[test]
    fn test_frame_structure() {
        let list = frame(250.0);
        let commands = list.commands();
        assert!(matches!(commands[0], DrawCommand::Fill { .. }));

        let n = commands.len();
        assert!(matches!(commands[n - 3], DrawCommand::RadialGradient { inner_radius, .. } if inner_radius == 0.0));
        assert!(matches!(commands[n - 2], DrawCommand::Circle { radius, .. } if radius == 30.0));
        assert!(matches!(commands[n - 1], DrawCommand::RadialGradient { .. }));
    }

    #[test]
    fn test_background_is_opaque_near_black() {
        let list = frame(0.0);
        match &list.commands()[0] {
            DrawCommand::Fill { color } => {
                assert_eq!(color.w, 1.0);
                assert!(color.truncate().max_element() < 0.05);
            }
            other => panic!("unexpected first command {:?}", other),
        }
    }

    #[test]
    fn test_polygon_side_counts() {
        let list = frame(100.0);
        for command in list.iter() {
            if let DrawCommand::Polygon { points, .. } = command {
                assert!((3..=5).contains(&points.len()));
            }
        }
    }

    #[test]
    fn test_glow_breathes_within_bounds() {
        let config = IntroConfig::default();
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for i in 0..2_000 {
            let o = glow_opacity(i as f32 * 20.0, &config);
            min = min.min(o);
            max = max.max(o);
        }
        assert!(min >= 0.05 - 1e-4 && max <= 0.11 + 1e-4);
        assert!(max - min > 0.05);
    }

    #[test]
    fn test_sample_gradient() {
        let stops = [
            GradientStop::new(0.0, Vec4::new(0.0, 0.0, 0.0, 1.0)),
            GradientStop::new(1.0, Vec4::new(1.0, 1.0, 1.0, 0.0)),
        ];
        assert_eq!(sample_gradient(&stops, -1.0), stops[0].color);
        assert_eq!(sample_gradient(&stops, 2.0), stops[1].color);
        let mid = sample_gradient(&stops, 0.5);
        assert!((mid.x - 0.5).abs() < 1e-6 && (mid.w - 0.5).abs() < 1e-6);
        assert_eq!(sample_gradient(&[], 0.5), Vec4::ZERO);
    }

    #[test]
    fn test_collapsed_frame_has_only_background_and_overlay() {
        let list = frame(1.0e6);
        assert_eq!(list.len(), 4);
    }
}
