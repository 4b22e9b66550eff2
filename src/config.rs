//! Intro configuration.
//!
//! All tunables of the animator live here, grouped the way the animator
//! consumes them. Every group implements `Default` with the values of the
//! production intro, deserializes from TOML with missing keys falling back to
//! those defaults, and can be adjusted with `with_*` builder methods.
//!
//! ```
//! use horizon::{IntroConfig, TriggerSet};
//!
//! let config = IntroConfig::default()
//!     .with_particle_budget(200, 600)
//!     .with_triggers(TriggerSet::click_or_timeout(8_000.0));
//! assert!(config.validate().is_ok());
//! ```
//!
//! TOML form:
//!
//! ```toml
//! palette = "ember"
//!
//! [field]
//! low_tier_count = 300
//!
//! [dismissal]
//! fade_ms = 900.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::error::ConfigError;
use crate::palette::Palette;
use crate::particle::ShapeSet;

/// Golden ratio, used as the irrational y-axis rate multiplier.
pub const GOLDEN_RATIO: f32 = 1.618_034;

/// Particle field generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Particle count below the tier threshold.
    pub low_tier_count: usize,
    /// Particle count at or above the tier threshold.
    pub high_tier_count: usize,
    /// Viewport width (px) separating the two tiers.
    pub tier_threshold: f32,
    /// Minimum x/y orbit radius (px).
    pub min_orbit_radius: f32,
    /// Span of x/y orbit radii as a fraction of the larger viewport side.
    pub orbit_span_factor: f32,
    /// Minimum depth-axis radius.
    pub min_depth_radius: f32,
    /// Span of depth-axis radii.
    pub depth_radius_span: f32,
    /// Slowest angular speed (radians per ms).
    pub min_angular_speed: f32,
    /// Span of angular speeds.
    pub angular_speed_span: f32,
    /// Smallest particle size (px).
    pub min_size: f32,
    /// Span of particle sizes.
    pub size_span: f32,
    /// Dimmest base opacity.
    pub min_opacity: f32,
    /// Span of base opacities.
    pub opacity_span: f32,
    /// Shapes particles are drawn from.
    pub shapes: ShapeSet,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            low_tier_count: 400,
            high_tier_count: 800,
            tier_threshold: 768.0,
            min_orbit_radius: 150.0,
            orbit_span_factor: 0.8,
            min_depth_radius: 100.0,
            depth_radius_span: 500.0,
            min_angular_speed: 0.0002,
            angular_speed_span: 0.0008,
            min_size: 1.0,
            size_span: 3.0,
            min_opacity: 0.3,
            opacity_span: 0.7,
            shapes: ShapeSet::Mixed,
        }
    }
}

/// Per-frame motion model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Multiplier on `t * angular_speed` in the pull factor.
    pub pull_coefficient: f32,
    /// Angular rate multiplier of the y axis.
    pub y_rate: f32,
    /// Angular rate multiplier of the depth axis.
    pub depth_rate: f32,
    /// Half-range of the depth axis used for normalization.
    pub depth_extent: f32,
    /// Particles closer than this to the focal point are not drawn (px).
    pub horizon_cutoff: f32,
    /// Distance beyond the cutoff over which opacity ramps up (px).
    pub fade_band: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            pull_coefficient: 0.5,
            y_rate: GOLDEN_RATIO,
            depth_rate: 0.5,
            depth_extent: 500.0,
            horizon_cutoff: 35.0,
            fade_band: 100.0,
        }
    }
}

/// Focal overlay parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizonConfig {
    /// Radius of the solid core (px).
    pub core_radius: f32,
    /// Halo radius as a fraction of the smaller viewport side.
    pub halo_fraction: f32,
    /// Glow ring radius as a multiple of the core radius.
    pub glow_ratio: f32,
    /// Angular rate of the breathing glow (radians per ms).
    pub breath_rate: f32,
    /// Mean glow opacity.
    pub glow_opacity: f32,
    /// Amplitude of the glow opacity oscillation.
    pub glow_amplitude: f32,
    /// Glow color (RGB, 0-255).
    pub glow_color: [u8; 3],
    /// Background fill (RGB, 0-255).
    pub background: [u8; 3],
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            core_radius: 30.0,
            halo_fraction: 0.35,
            glow_ratio: 1.8,
            breath_rate: 0.0003,
            glow_opacity: 0.08,
            glow_amplitude: 0.03,
            glow_color: [180, 140, 80],
            background: [5, 5, 8],
        }
    }
}

/// Which inputs may dismiss the intro.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerSet {
    /// Vertical scroll past [`DismissalConfig::scroll_threshold`].
    pub scroll: bool,
    /// Downward wheel movement.
    pub wheel: bool,
    /// Escape, Space or Enter.
    pub keys: bool,
    /// Pointer click anywhere on the intro.
    pub click: bool,
    /// Unconditional dismissal after this many ms of presentation.
    pub timeout_ms: Option<f64>,
}

impl TriggerSet {
    /// Scroll, wheel or key press.
    pub fn scroll_to_enter() -> Self {
        Self {
            scroll: true,
            wheel: true,
            keys: true,
            click: false,
            timeout_ms: None,
        }
    }

    /// Click or key press, or automatically after `timeout_ms`.
    pub fn click_or_timeout(timeout_ms: f64) -> Self {
        Self {
            scroll: false,
            wheel: false,
            keys: true,
            click: true,
            timeout_ms: Some(timeout_ms),
        }
    }
}

impl Default for TriggerSet {
    fn default() -> Self {
        Self::scroll_to_enter()
    }
}

/// Dismissal and fade-out parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DismissalConfig {
    /// Fade-out duration (ms).
    pub fade_ms: f64,
    /// Easing curve of the fade.
    pub easing: Easing,
    /// Scroll offset (px) that counts as a dismissal.
    pub scroll_threshold: f32,
    /// Delay before fading when the animation is skipped (ms).
    pub reduced_motion_delay_ms: f64,
    /// Accepted triggers.
    pub triggers: TriggerSet,
}

impl Default for DismissalConfig {
    fn default() -> Self {
        Self {
            fade_ms: 1200.0,
            easing: Easing::EaseInOutCubic,
            scroll_threshold: 50.0,
            reduced_motion_delay_ms: 500.0,
            triggers: TriggerSet::default(),
        }
    }
}

/// Complete intro configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroConfig {
    pub field: FieldConfig,
    pub motion: MotionConfig,
    pub horizon: HorizonConfig,
    pub dismissal: DismissalConfig,
    pub palette: Palette,
}

impl IntroConfig {
    /// Parse a TOML document. Missing keys take their default values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded intro config from {}", path.display());
        Self::from_toml_str(&source)
    }

    /// Check that every value is usable by the animator.
    ///
    /// Non-finite numbers (`nan`, `inf`) are rejected everywhere.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let field = &self.field;
        if field.low_tier_count == 0 || field.high_tier_count == 0 {
            return Err(invalid("particle counts must be non-zero"));
        }
        if !positive(field.tier_threshold) {
            return Err(invalid("tier_threshold must be positive"));
        }
        if !positive(field.min_orbit_radius) || !positive(field.min_depth_radius) {
            return Err(invalid("orbit radii must be positive"));
        }
        if !positive(field.min_angular_speed) {
            return Err(invalid("min_angular_speed must be positive"));
        }
        if !positive(field.min_size) {
            return Err(invalid("min_size must be positive"));
        }
        if !positive(field.min_opacity) || field.min_opacity + field.opacity_span > 1.0 {
            return Err(invalid("base opacity must stay within (0, 1]"));
        }
        if !non_negative(field.orbit_span_factor)
            || !non_negative(field.depth_radius_span)
            || !non_negative(field.angular_speed_span)
            || !non_negative(field.size_span)
            || !non_negative(field.opacity_span)
        {
            return Err(invalid("spans must not be negative"));
        }

        let motion = &self.motion;
        if !non_negative(motion.pull_coefficient) {
            return Err(invalid("pull_coefficient must not be negative"));
        }
        if !motion.y_rate.is_finite() || !motion.depth_rate.is_finite() {
            return Err(invalid("y_rate and depth_rate must be finite"));
        }
        if !positive(motion.depth_extent) {
            return Err(invalid("depth_extent must be positive"));
        }
        if !non_negative(motion.horizon_cutoff) || !positive(motion.fade_band) {
            return Err(invalid("horizon_cutoff must be >= 0 and fade_band > 0"));
        }

        let dismissal = &self.dismissal;
        if !(dismissal.fade_ms.is_finite() && dismissal.fade_ms > 0.0) {
            return Err(invalid("fade_ms must be positive"));
        }
        if !(dismissal.reduced_motion_delay_ms.is_finite() && dismissal.reduced_motion_delay_ms >= 0.0) {
            return Err(invalid("reduced_motion_delay_ms must not be negative"));
        }
        if !non_negative(dismissal.scroll_threshold) {
            return Err(invalid("scroll_threshold must not be negative"));
        }
        if let Some(timeout) = dismissal.triggers.timeout_ms {
            if !(timeout.is_finite() && timeout >= 0.0) {
                return Err(invalid("timeout_ms must not be negative"));
            }
        }

        let horizon = &self.horizon;
        if !positive(horizon.core_radius) {
            return Err(invalid("core_radius must be positive"));
        }
        if !non_negative(horizon.halo_fraction)
            || !non_negative(horizon.glow_ratio)
            || !horizon.breath_rate.is_finite()
            || !horizon.glow_opacity.is_finite()
            || !horizon.glow_amplitude.is_finite()
        {
            return Err(invalid("glow parameters must be finite"));
        }
        Ok(())
    }

    /// Set the low and high tier particle counts.
    pub fn with_particle_budget(mut self, low: usize, high: usize) -> Self {
        self.field.low_tier_count = low;
        self.field.high_tier_count = high;
        self
    }

    /// Set the viewport width separating the two tiers.
    pub fn with_tier_threshold(mut self, width: f32) -> Self {
        self.field.tier_threshold = width;
        self
    }

    /// Set the shapes particles are drawn from.
    pub fn with_shapes(mut self, shapes: ShapeSet) -> Self {
        self.field.shapes = shapes;
        self
    }

    /// Set the color palette.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Set the accepted dismissal triggers.
    pub fn with_triggers(mut self, triggers: TriggerSet) -> Self {
        self.dismissal.triggers = triggers;
        self
    }

    /// Set the fade-out duration in ms.
    pub fn with_fade_duration(mut self, fade_ms: f64) -> Self {
        self.dismissal.fade_ms = fade_ms;
        self
    }

    /// Set the pull coefficient.
    pub fn with_pull_coefficient(mut self, coefficient: f32) -> Self {
        self.motion.pull_coefficient = coefficient;
        self
    }
}

fn positive(x: f32) -> bool {
    x.is_finite() && x > 0.0
}

fn non_negative(x: f32) -> bool {
    x.is_finite() && x >= 0.0
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::Invalid(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(IntroConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = IntroConfig::from_toml_str(
            r#"
            palette = "ember"

            [field]
            low_tier_count = 300

            [dismissal]
            fade_ms = 900.0
            "#,
        )
        .unwrap();

        assert_eq!(config.field.low_tier_count, 300);
        assert_eq!(config.field.high_tier_count, 800);
        assert_eq!(config.dismissal.fade_ms, 900.0);
        assert_eq!(config.dismissal.scroll_threshold, 50.0);
        assert_eq!(config.palette, Palette::Ember);
    }

    #[test]
    fn test_trigger_set_from_toml() {
        let config = IntroConfig::from_toml_str(
            r#"
            [dismissal.triggers]
            scroll = false
            click = true
            timeout_ms = 6000.0
            "#,
        )
        .unwrap();

        let triggers = &config.dismissal.triggers;
        assert!(!triggers.scroll);
        assert!(triggers.wheel);
        assert!(triggers.click);
        assert_eq!(triggers.timeout_ms, Some(6000.0));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = IntroConfig::default().with_particle_budget(0, 10);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = IntroConfig::default().with_fade_duration(0.0);
        assert!(config.validate().is_err());

        let err = IntroConfig::from_toml_str("[motion]\ndepth_extent = -1.0").unwrap_err();
        assert!(err.to_string().contains("depth_extent"));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        for source in [
            "[dismissal]\nfade_ms = nan",
            "[dismissal]\nfade_ms = inf",
            "[dismissal]\nreduced_motion_delay_ms = nan",
            "[dismissal.triggers]\ntimeout_ms = inf",
            "[field]\ntier_threshold = nan",
            "[field]\nmin_opacity = nan",
            "[motion]\ndepth_extent = inf",
            "[motion]\nfade_band = nan",
            "[motion]\npull_coefficient = nan",
            "[horizon]\ncore_radius = inf",
        ] {
            let err = IntroConfig::from_toml_str(source).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{source}: {err}");
        }

        let config = IntroConfig::default().with_fade_duration(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let err = IntroConfig::from_toml_str("field = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = IntroConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let config = IntroConfig::default()
            .with_palette(Palette::Ember)
            .with_triggers(TriggerSet::click_or_timeout(5000.0));
        let text = toml::to_string(&config).unwrap();
        assert_eq!(IntroConfig::from_toml_str(&text).unwrap(), config);
    }
}
