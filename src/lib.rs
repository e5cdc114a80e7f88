//! Glimmer - deterministic 2D particle and animation simulation
//!
//! Core modules:
//! - `clock`: Monotonic animation clock with cyclic wave helpers
//! - `profile`: Immutable per-channel particle configuration
//! - `pool`: Bounded particle pools (spawn, physics step, expiry)
//! - `emitter`: Phase-driven emission scheduling (burst, trickle, cycle puff)
//! - `scene`: Scene composition, locking, snapshots, event hooks
//!
//! The crate simulates only; drawing, layout and UI binding live in the host.
//! Everything here must stay pure and deterministic:
//! - Seeded RNG only, consumed at spawn time, never during update
//! - No wall-clock reads; all cyclic values derive from accumulated phase
//! - Stable channel order for snapshots

pub mod clock;
pub mod emitter;
pub mod pool;
pub mod profile;
pub mod scene;

pub use clock::AnimationClock;
pub use emitter::{EmissionMode, EmissionScheduler};
pub use pool::{Particle, ParticlePool, ParticleView, SpawnOverrides};
pub use profile::{Color, ColorSet, FadeCurve, ParticleProfile, Span, SpawnVelocity};
pub use scene::{ChannelConfig, ChannelId, SceneAnimator, SceneEvent};

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Reference fixed timestep used by hosts and tests (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// Hard ceiling on any single channel's capacity, applied after
    /// quality scaling. Keeps a bad config from ballooning a frame.
    pub const MAX_CHANNEL_CAPACITY: usize = 4096;

    /// Default downward gravity for falling effects (pixels/s²)
    pub const DEFAULT_GRAVITY: f32 = 240.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}
