//! Monotonic animation clock
//!
//! One clock per scene. `phase` only ever grows; every cyclic helper is a
//! pure function of the accumulated phase, so two clocks fed the same dt
//! sequence agree exactly and nothing here reads wall-clock time.

use serde::{Deserialize, Serialize};

/// Per-scene phase accumulator with a speed multiplier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnimationClock {
    phase: f32,
    speed: f32,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationClock {
    /// Clock at phase 0 running at normal speed
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            speed: 1.0,
        }
    }

    /// Clock at phase 0 with a custom speed multiplier
    pub fn with_speed(speed: f32) -> Self {
        Self {
            phase: 0.0,
            speed: speed.max(0.0),
        }
    }

    /// Advance by one tick. Negative dt is a caller-contract violation and
    /// clamps to a no-op tick rather than failing the frame.
    pub fn advance(&mut self, dt: f32) {
        self.phase += dt.max(0.0) * self.speed;
    }

    /// Accumulated phase in seconds (scaled by speed). Never resets.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Speed < 0 would break phase monotonicity, so it clamps to 0 (frozen).
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    /// `phase mod period`, in `[0, period)`. For discrete, re-triggerable
    /// one-shot effects (e.g. a puff of steam). Full-range jump at the wrap.
    pub fn sawtooth(&self, period: f32) -> f32 {
        if period <= 0.0 {
            return 0.0;
        }
        self.phase.rem_euclid(period)
    }

    /// Triangle wave in `[0, 1]`; one full up-down sweep every `2/rate`
    /// seconds of phase. Used wherever a hard modulo reset would create a
    /// visible jump, e.g. a board sliding continuously back and forth
    /// through a saw blade.
    pub fn ping_pong(&self, rate: f32) -> f32 {
        let t = (self.phase * rate).rem_euclid(2.0);
        if t <= 1.0 { t } else { 2.0 - t }
    }

    /// `0.5 + 0.5·sin(phase·freq)`, in `[0, 1]`. For glow and pulsing
    /// borders.
    pub fn pulse(&self, freq: f32) -> f32 {
        0.5 + 0.5 * (self.phase * freq).sin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates() {
        let mut clock = AnimationClock::new();
        clock.advance(0.5);
        clock.advance(0.25);
        assert!((clock.phase() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_negative_dt_is_noop() {
        let mut clock = AnimationClock::new();
        clock.advance(1.0);
        clock.advance(-5.0);
        assert!((clock.phase() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_speed_scales_phase() {
        let mut clock = AnimationClock::with_speed(2.0);
        clock.advance(0.5);
        assert!((clock.phase() - 1.0).abs() < 1e-6);

        clock.set_speed(0.0);
        clock.advance(10.0);
        assert!((clock.phase() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sawtooth_range() {
        let mut clock = AnimationClock::new();
        for _ in 0..1000 {
            clock.advance(0.037);
            let v = clock.sawtooth(0.5);
            assert!((0.0..0.5).contains(&v), "sawtooth out of range: {v}");
        }
        // Degenerate period is absorbed, not a panic
        assert_eq!(clock.sawtooth(0.0), 0.0);
    }

    #[test]
    fn test_ping_pong_continuity() {
        // No discontinuity larger than rate*dt between adjacent samples
        let rate = 3.0;
        let dt = 0.016;
        let mut clock = AnimationClock::new();
        let mut prev = clock.ping_pong(rate);
        for _ in 0..2000 {
            clock.advance(dt);
            let cur = clock.ping_pong(rate);
            assert!((0.0..=1.0).contains(&cur));
            assert!(
                (cur - prev).abs() <= rate * dt + 1e-4,
                "ping_pong jumped from {prev} to {cur}"
            );
            prev = cur;
        }
    }

    #[test]
    fn test_pulse_bounds() {
        let mut clock = AnimationClock::new();
        for _ in 0..500 {
            clock.advance(0.021);
            let v = clock.pulse(7.3);
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
