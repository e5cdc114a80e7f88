//! Phase-driven emission scheduling
//!
//! Decides when a pool receives new spawns. Both continuous and one-shot
//! emission are gated on accumulated time, never on frame count, so the
//! expected spawn count is identical at any frame rate. A naive
//! `if random() < p` per frame would not be; neither would firing whenever
//! `phase % cycle` lands in a small window, which can double-fire or skip
//! depending on step size. The trickle accumulator and the per-cycle latch
//! avoid both failure modes.

use serde::{Deserialize, Serialize};

use crate::clock::AnimationClock;

/// How a channel emits between explicit burst calls.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionMode {
    /// Spawns only on explicit `burst`/`try_spawn` calls
    #[default]
    Manual,
    /// Continuous rate-limited emission, in particles per second
    Trickle { rate: f32 },
    /// One burst of `count` particles at the start of every clock cycle of
    /// `cycle_len` seconds: re-triggerable puff effects
    CyclePuff { cycle_len: f32, count: usize },
}

/// Per-channel emission state.
#[derive(Debug, Clone)]
pub struct EmissionScheduler {
    mode: EmissionMode,
    /// Trickle: accumulated time since the last emitted particle
    since_last: f32,
    /// CyclePuff: index of the last cycle that fired. This is the per-cycle
    /// latch; several updates landing inside one cycle fire at most once.
    last_cycle: Option<u64>,
}

impl EmissionScheduler {
    pub fn new(mode: EmissionMode) -> Self {
        Self {
            mode,
            since_last: 0.0,
            last_cycle: None,
        }
    }

    pub fn mode(&self) -> EmissionMode {
        self.mode
    }

    /// Number of spawns due this tick. `dt` is the same wall-dt handed to
    /// the owning clock's `advance` for this frame; the clock's speed
    /// multiplier applies to emission exactly as it does to phase.
    pub fn due(&mut self, clock: &AnimationClock, dt: f32) -> usize {
        let dt = dt.max(0.0) * clock.speed();
        match self.mode {
            EmissionMode::Manual => 0,
            EmissionMode::Trickle { rate } => {
                if rate <= 0.0 {
                    return 0;
                }
                let interval = 1.0 / rate;
                self.since_last += dt;
                // Small tolerance so an update of exactly one interval still
                // emits despite f32 rounding in the reciprocal.
                let n = (self.since_last / interval + 1e-4) as usize;
                self.since_last -= n as f32 * interval;
                n
            }
            EmissionMode::CyclePuff { cycle_len, count } => {
                if cycle_len <= 0.0 {
                    return 0;
                }
                let cycle = (clock.phase() / cycle_len) as u64;
                match self.last_cycle {
                    Some(last) if last == cycle => 0,
                    _ => {
                        self.last_cycle = Some(cycle);
                        count
                    }
                }
            }
        }
    }

    /// Forget accumulated time and the cycle latch, e.g. after a scene
    /// reset, so the next cycle fires fresh.
    pub fn reset(&mut self) {
        self.since_last = 0.0;
        self.last_cycle = None;
    }
}
