//! Per-channel particle configuration
//!
//! A profile is built once and never mutated afterwards; pools copy it at
//! construction. Everything is serde-friendly so scenes can be described as
//! JSON data instead of bespoke per-effect code. The preset constants here
//! are cosmetic tuning values, free to adjust per game.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_GRAVITY;
use crate::polar_to_cartesian;

/// RGBA color, straight alpha, components in [0, 1]
pub type Color = [f32; 4];

/// Numeric range sampled uniformly at spawn time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Degenerate range that always yields `value`
    pub const fn fixed(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn sample(&self, rng: &mut impl Rng) -> f32 {
        if self.max <= self.min {
            self.min
        } else {
            rng.random_range(self.min..self.max)
        }
    }
}

/// Spawn-velocity distribution, sampled once per particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnVelocity {
    /// Independent per-axis ranges (px/s)
    Cartesian { x: Span, y: Span },
    /// Launch angle (radians) and speed (px/s) ranges
    Polar { angle: Span, speed: Span },
}

impl SpawnVelocity {
    pub fn sample(&self, rng: &mut impl Rng) -> Vec2 {
        match self {
            SpawnVelocity::Cartesian { x, y } => Vec2::new(x.sample(rng), y.sample(rng)),
            SpawnVelocity::Polar { angle, speed } => {
                polar_to_cartesian(speed.sample(rng), angle.sample(rng))
            }
        }
    }
}

/// Where a particle's color comes from. Caller-supplied colors go through
/// the spawn-override path instead of a dedicated variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSet {
    Fixed(Color),
    /// Uniformly sampled palette
    Palette(Vec<Color>),
}

impl ColorSet {
    pub fn sample(&self, rng: &mut impl Rng) -> Color {
        match self {
            ColorSet::Fixed(c) => *c,
            ColorSet::Palette(colors) => {
                if colors.is_empty() {
                    [1.0, 1.0, 1.0, 1.0]
                } else {
                    colors[rng.random_range(0..colors.len())]
                }
            }
        }
    }
}

/// Maps elapsed lifetime fraction to opacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeCurve {
    /// `alpha = remaining_life / lifetime`
    Linear,
    /// Fractions of total lifetime spent ramping up, holding at full, and
    /// ramping down. Fractions summing below 1 leave a fully transparent
    /// tail; the particle is culled when it enters it.
    Windows { fade_in: f32, hold: f32, fade_out: f32 },
}

impl FadeCurve {
    /// Alpha for a particle `elapsed` of the way through its life, clamped
    /// to [0, 1]. `elapsed` itself is expected in [0, 1].
    pub fn alpha(&self, elapsed: f32) -> f32 {
        let elapsed = elapsed.clamp(0.0, 1.0);
        match *self {
            FadeCurve::Linear => 1.0 - elapsed,
            FadeCurve::Windows {
                fade_in,
                hold,
                fade_out,
            } => {
                let in_end = fade_in.max(0.0);
                let hold_end = in_end + hold.max(0.0);
                let out_end = hold_end + fade_out.max(0.0);
                if elapsed < in_end {
                    elapsed / in_end
                } else if elapsed <= hold_end {
                    1.0
                } else if elapsed < out_end {
                    1.0 - (elapsed - hold_end) / (out_end - hold_end)
                } else {
                    0.0
                }
            }
        }
        .clamp(0.0, 1.0)
    }

    /// True once the curve has permanently reached zero. A fading-in
    /// particle also has alpha 0 but is not spent.
    pub fn spent(&self, elapsed: f32) -> bool {
        match *self {
            FadeCurve::Linear => elapsed >= 1.0,
            FadeCurve::Windows {
                fade_in,
                hold,
                fade_out,
            } => elapsed >= fade_in.max(0.0) + hold.max(0.0) + fade_out.max(0.0),
        }
    }
}

/// Immutable configuration for one particle channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleProfile {
    /// Live-particle cap; spawn requests beyond it are silently dropped
    pub capacity: usize,
    pub spawn_velocity: SpawnVelocity,
    /// Constant acceleration, e.g. gravity (px/s²)
    pub acceleration: Vec2,
    /// Fraction of velocity lost per second, in [0, 1). 0 = none.
    pub drag: f32,
    /// Lifetime range in seconds
    pub lifetime: Span,
    /// Render size range in pixels
    pub size: Span,
    pub colors: ColorSet,
    pub fade: FadeCurve,
}

impl ParticleProfile {
    /// Coins fountaining up and falling under gravity
    pub fn coins() -> Self {
        Self {
            capacity: 128,
            spawn_velocity: SpawnVelocity::Polar {
                angle: Span::new(-2.4, -0.75), // upward arc
                speed: Span::new(180.0, 320.0),
            },
            acceleration: Vec2::new(0.0, DEFAULT_GRAVITY * 2.0),
            drag: 0.0,
            lifetime: Span::new(1.2, 2.0),
            size: Span::new(10.0, 14.0),
            colors: ColorSet::Palette(vec![
                [1.0, 0.84, 0.0, 1.0],
                [1.0, 0.72, 0.1, 1.0],
                [0.95, 0.9, 0.35, 1.0],
            ]),
            fade: FadeCurve::Windows {
                fade_in: 0.0,
                hold: 0.7,
                fade_out: 0.3,
            },
        }
    }

    /// Fast, short-lived sparks flying in every direction
    pub fn sparks() -> Self {
        Self {
            capacity: 256,
            spawn_velocity: SpawnVelocity::Polar {
                angle: Span::new(-std::f32::consts::PI, std::f32::consts::PI),
                speed: Span::new(120.0, 420.0),
            },
            acceleration: Vec2::new(0.0, DEFAULT_GRAVITY * 0.5),
            drag: 0.6,
            lifetime: Span::new(0.25, 0.6),
            size: Span::new(2.0, 4.0),
            colors: ColorSet::Palette(vec![
                [1.0, 0.95, 0.6, 1.0],
                [1.0, 0.7, 0.25, 1.0],
                [1.0, 1.0, 1.0, 1.0],
            ]),
            fade: FadeCurve::Linear,
        }
    }

    /// Slow-drifting dust motes
    pub fn dust() -> Self {
        Self {
            capacity: 64,
            spawn_velocity: SpawnVelocity::Cartesian {
                x: Span::new(-18.0, 18.0),
                y: Span::new(-30.0, -8.0),
            },
            acceleration: Vec2::ZERO,
            drag: 0.3,
            lifetime: Span::new(2.0, 3.5),
            size: Span::new(3.0, 7.0),
            colors: ColorSet::Fixed([0.62, 0.56, 0.48, 0.5]),
            fade: FadeCurve::Windows {
                fade_in: 0.2,
                hold: 0.4,
                fade_out: 0.4,
            },
        }
    }

    /// Fluttering confetti with heavy drag
    pub fn confetti() -> Self {
        Self {
            capacity: 300,
            spawn_velocity: SpawnVelocity::Polar {
                angle: Span::new(-2.6, -0.55),
                speed: Span::new(220.0, 460.0),
            },
            acceleration: Vec2::new(0.0, DEFAULT_GRAVITY),
            drag: 0.75,
            lifetime: Span::new(1.5, 2.8),
            size: Span::new(4.0, 8.0),
            colors: ColorSet::Palette(vec![
                [0.95, 0.26, 0.21, 1.0],
                [0.3, 0.69, 0.31, 1.0],
                [0.13, 0.59, 0.95, 1.0],
                [1.0, 0.92, 0.23, 1.0],
                [0.61, 0.15, 0.69, 1.0],
            ]),
            fade: FadeCurve::Windows {
                fade_in: 0.0,
                hold: 0.8,
                fade_out: 0.2,
            },
        }
    }

    /// Rising steam puffs that fade in before fading out
    pub fn steam() -> Self {
        Self {
            capacity: 48,
            spawn_velocity: SpawnVelocity::Cartesian {
                x: Span::new(-12.0, 12.0),
                y: Span::new(-55.0, -30.0),
            },
            acceleration: Vec2::new(0.0, -20.0),
            drag: 0.2,
            lifetime: Span::new(1.0, 1.8),
            size: Span::new(8.0, 16.0),
            colors: ColorSet::Fixed([0.9, 0.9, 0.92, 0.45]),
            fade: FadeCurve::Windows {
                fade_in: 0.25,
                hold: 0.25,
                fade_out: 0.5,
            },
        }
    }

    /// Paint splatter: a burst that sticks, then dries away
    pub fn splatter() -> Self {
        Self {
            capacity: 96,
            spawn_velocity: SpawnVelocity::Polar {
                angle: Span::new(-std::f32::consts::PI, std::f32::consts::PI),
                speed: Span::new(40.0, 160.0),
            },
            acceleration: Vec2::ZERO,
            drag: 0.97,
            lifetime: Span::new(0.8, 1.4),
            size: Span::new(3.0, 9.0),
            colors: ColorSet::Palette(vec![
                [0.86, 0.2, 0.18, 1.0],
                [0.2, 0.45, 0.85, 1.0],
                [0.98, 0.76, 0.1, 1.0],
            ]),
            fade: FadeCurve::Windows {
                fade_in: 0.0,
                hold: 0.6,
                fade_out: 0.4,
            },
        }
    }
}
