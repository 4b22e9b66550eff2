//! Parametric orbit model.
//!
//! Positions are a pure function of elapsed animation time: nothing is
//! integrated or stored between frames, so a frame at `t` always looks the same
//! no matter how many frames preceded it.
//!
//! For a particle with radii `R`, phases `θ`, offsets `ρ` and angular speed `s`:
//!
//! ```text
//! pull = max(0, 1 - t·s·k)
//! x    = cx + pull·R1·cos(θ1 + ρ1 + t·s)
//! y    = cy + pull·R2·sin(θ2 + ρ2 + t·s·φ)
//! z    =      pull·R3·cos(θ3 + ρ3 + t·s·½)
//! ```
//!
//! Depth convention: larger `z` is nearer the viewer. Near particles are drawn
//! larger, brighter and later.

use glam::{Vec2, Vec3};

use crate::config::MotionConfig;
use crate::particle::{Particle, ParticleField};

/// Floor of the depth-derived size and opacity multipliers.
const DEPTH_FLOOR: f32 = 0.3;

/// Gravitational pull factor at elapsed time `t` (ms).
///
/// Starts at 1 and decreases linearly to 0, never below. Faster particles
/// collapse sooner because the angular speed is part of the decay term.
#[inline]
pub fn pull_factor(t: f32, angular_speed: f32, coefficient: f32) -> f32 {
    (1.0 - t * angular_speed * coefficient).max(0.0)
}

/// Map a normalized depth in `[0, 1]` to a size/opacity multiplier.
#[inline]
pub fn depth_multiplier(depth01: f32) -> f32 {
    DEPTH_FLOOR + depth01 * (1.0 - DEPTH_FLOOR)
}

/// Orbit position relative to the focal point, `z` carrying depth.
pub fn orbit_offset(particle: &Particle, t: f32, motion: &MotionConfig) -> Vec3 {
    let pull = pull_factor(t, particle.angular_speed, motion.pull_coefficient);
    let radii = particle.radii * pull;
    let base = particle.phases + particle.offsets;
    let progress = t * particle.angular_speed;

    Vec3::new(
        radii.x * (base.x + progress).cos(),
        radii.y * (base.y + progress * motion.y_rate).sin(),
        radii.z * (base.z + progress * motion.depth_rate).cos(),
    )
}

/// A particle's screen-space state for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// Generation index of the source particle.
    pub seed_index: u32,
    /// Screen position in pixels.
    pub position: Vec2,
    /// Raw depth value.
    pub depth: f32,
    /// Depth normalized to `[0, 1]`, 1 being nearest.
    pub depth01: f32,
    /// Size and stroke multiplier derived from depth.
    pub scale: f32,
    /// Final opacity: base, depth and proximity combined.
    pub opacity: f32,
    /// Distance from the focal point in pixels.
    pub distance: f32,
}

/// Project one particle. Returns `None` when it has fallen inside the cutoff.
pub fn project(particle: &Particle, t: f32, center: Vec2, motion: &MotionConfig) -> Option<Projected> {
    let offset = orbit_offset(particle, t, motion);
    let position = center + offset.truncate();
    let distance = offset.truncate().length();

    if distance < motion.horizon_cutoff {
        return None;
    }

    let proximity = ((distance - motion.horizon_cutoff) / motion.fade_band).min(1.0);
    let depth01 = ((offset.z + motion.depth_extent) / (2.0 * motion.depth_extent)).clamp(0.0, 1.0);
    let multiplier = depth_multiplier(depth01);

    Some(Projected {
        seed_index: particle.seed_index,
        position,
        depth: offset.z,
        depth01,
        scale: multiplier,
        opacity: particle.base_opacity * multiplier * proximity,
        distance,
    })
}

/// Project a whole field and sort it back to front (ascending depth).
///
/// The sort is stable, so particles at equal depth keep generation order.
pub fn project_field(field: &ParticleField, t: f32, center: Vec2, motion: &MotionConfig) -> Vec<Projected> {
    let mut projected: Vec<Projected> = field
        .iter()
        .filter_map(|p| project(p, t, center, motion))
        .collect();
    projected.sort_by(|a, b| a.depth.total_cmp(&b.depth));
    projected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldConfig;
    use crate::seed::SessionSeed;
    use crate::viewport::Viewport;
    use rand::Rng;

    fn sample_field() -> ParticleField {
        ParticleField::generate(
            SessionSeed::new(42.0),
            Viewport::new(1920.0, 1080.0),
            &FieldConfig::default(),
        )
    }

    #[test]
    fn test_pull_starts_at_one() {
        assert_eq!(pull_factor(0.0, 0.0005, 0.5), 1.0);
    }

    #[test]
    fn test_pull_is_monotonic_and_non_negative() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let speed = rng.gen_range(0.0002..0.001);
            let t1: f32 = rng.gen_range(0.0..20_000.0);
            let t2 = t1 + rng.gen_range(0.0..20_000.0);
            let p1 = pull_factor(t1, speed, 0.5);
            let p2 = pull_factor(t2, speed, 0.5);
            assert!(p2 <= p1);
            assert!(p2 >= 0.0);
        }
        assert_eq!(pull_factor(1.0e9, 0.001, 0.5), 0.0);
    }

    #[test]
    fn test_pull_couples_speed_to_collapse() {
        let slow = pull_factor(1000.0, 0.0002, 0.5);
        let fast = pull_factor(1000.0, 0.001, 0.5);
        assert!(fast < slow);
    }

    #[test]
    fn test_depth_multiplier_range() {
        assert!((depth_multiplier(0.0) - 0.3).abs() < 1e-6);
        assert!((depth_multiplier(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_collapsed_particles_are_culled() {
        let field = sample_field();
        let motion = MotionConfig::default();
        // Slowest particle collapses fully by t = 1 / (0.0002 * 0.5).
        let projected = project_field(&field, 10_001.0, Vec2::new(960.0, 540.0), &motion);
        assert!(projected.is_empty());
    }

    #[test]
    fn test_projection_sorted_by_depth() {
        let field = sample_field();
        let motion = MotionConfig::default();
        let projected = project_field(&field, 500.0, Vec2::new(960.0, 540.0), &motion);
        assert!(!projected.is_empty());
        for pair in projected.windows(2) {
            assert!(pair[0].depth <= pair[1].depth);
        }
    }

    #[test]
    fn test_proximity_fade() {
        let motion = MotionConfig::default();
        let mut particle = sample_field().particles()[3];
        particle.radii = Vec3::new(60.0, 60.0, 0.0);
        particle.phases = Vec3::ZERO;
        particle.offsets = Vec3::ZERO;
        particle.base_opacity = 1.0;

        // t = 0: x offset = 60, y offset = 0, depth 0 -> depth01 = 0.5.
        let p = project(&particle, 0.0, Vec2::ZERO, &motion).unwrap();
        assert!((p.distance - 60.0).abs() < 1e-3);
        let proximity = (60.0 - 35.0) / 100.0;
        assert!((p.opacity - depth_multiplier(0.5) * proximity).abs() < 1e-4);

        particle.radii = Vec3::new(20.0, 20.0, 0.0);
        assert!(project(&particle, 0.0, Vec2::ZERO, &motion).is_none());
    }

    #[test]
    fn test_nearer_is_larger_and_brighter() {
        let motion = MotionConfig::default();
        let mut particle = sample_field().particles()[7];
        particle.radii = Vec3::new(400.0, 400.0, 400.0);
        particle.base_opacity = 1.0;

        particle.phases = Vec3::ZERO;
        particle.offsets = Vec3::ZERO;
        let near = project(&particle, 0.0, Vec2::ZERO, &motion).unwrap();

        particle.phases.z = std::f32::consts::PI;
        let far = project(&particle, 0.0, Vec2::ZERO, &motion).unwrap();

        assert!(near.depth > far.depth);
        assert!(near.scale > far.scale);
        assert!(near.opacity > far.opacity);
    }

    #[test]
    fn test_positions_are_pure_functions_of_time() {
        let field = sample_field();
        let motion = MotionConfig::default();
        let center = Vec2::new(960.0, 540.0);
        let a = project_field(&field, 1234.0, center, &motion);
        let _ = project_field(&field, 99.0, center, &motion);
        let b = project_field(&field, 1234.0, center, &motion);
        assert_eq!(a, b);
    }
}
