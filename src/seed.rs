//! Deterministic per-session randomness.
//!
//! Particle parameters are never drawn from a stateful generator. Each value is a
//! pure function of the session seed and an offset, so the same seed always
//! reproduces the same field and parameters can be evaluated in any order.
//!
//! ```
//! use horizon::seed::SessionSeed;
//!
//! let seed = SessionSeed::new(1234.0);
//! let a = seed.unit(0.2);
//! assert_eq!(a, seed.unit(0.2));
//! assert!((0.0..1.0).contains(&a));
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Upper bound (exclusive) for freshly drawn session seeds.
pub const SEED_RANGE: f64 = 10_000.0;

/// Scale applied to `sin` before taking the fractional part.
const HASH_SCALE: f64 = 10_000.0;

/// The single float drawn once per mount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionSeed(f64);

impl SessionSeed {
    /// Wrap an explicit seed value.
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Draw a new seed in `[0, SEED_RANGE)` from the thread-local RNG.
    pub fn random() -> Self {
        Self(rand::thread_rng().gen_range(0.0..SEED_RANGE))
    }

    /// Raw seed value.
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Pseudo-random value in `[0, 1)` for `seed + offset`.
    #[inline]
    pub fn unit(self, offset: f64) -> f32 {
        seeded_random(self.0 + offset)
    }

    /// Pseudo-random value mapped affinely onto `[min, min + span)`.
    #[inline]
    pub fn range(self, offset: f64, min: f32, span: f32) -> f32 {
        min + self.unit(offset) * span
    }
}

impl From<f64> for SessionSeed {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

/// Trigonometric hash: `fract(sin(x) * 10000)`.
///
/// Evaluated in `f64`; the product reaches ~1e4 so single precision would
/// leave almost no fractional bits.
pub fn seeded_random(x: f64) -> f32 {
    let v = x.sin() * HASH_SCALE;
    let fract = (v - v.floor()) as f32;
    // Rounding to f32 can land exactly on 1.0.
    if fract >= 1.0 {
        0.0
    } else {
        fract
    }
}
