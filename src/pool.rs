//! Bounded particle pool
//!
//! One pool per visual channel. The pool exclusively owns its particles;
//! the only way state leaves is through `snapshot`. Spawn requests beyond
//! capacity are dropped, never queued: a missing cosmetic effect must never
//! disrupt gameplay or rendering.
//!
//! RNG is consumed in `try_spawn` only. `update` is a pure function of the
//! current particles and dt, which is what makes trajectories replayable
//! from a seed.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::profile::{Color, ParticleProfile};

/// A live particle. Mutated only by its owning pool.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds left; strictly decreases every update
    pub remaining_life: f32,
    /// Total lifetime assigned at spawn
    pub lifetime: f32,
    pub size: f32,
    pub color: Color,
    /// Derived from the fade curve each update, always in [0, 1]
    pub alpha: f32,
}

/// Read-only particle record handed to the drawing collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleView {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Color,
    pub alpha: f32,
    /// Channel tag, for batching draws by effect kind
    pub tag: u32,
}

/// Optional per-spawn deviations from the profile (e.g. a caller-supplied
/// color, or velocity aimed at a target).
#[derive(Debug, Clone, Copy, Default)]
pub struct SpawnOverrides {
    pub velocity: Option<Vec2>,
    pub color: Option<Color>,
    pub size: Option<f32>,
}

/// Bounded collection of live particles sharing one profile.
#[derive(Debug)]
pub struct ParticlePool {
    profile: ParticleProfile,
    tag: u32,
    particles: Vec<Particle>,
    rng: Pcg32,
}

impl ParticlePool {
    pub fn new(profile: ParticleProfile, tag: u32, seed: u64) -> Self {
        let cap = profile.capacity;
        Self {
            profile,
            tag,
            particles: Vec::with_capacity(cap),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn profile(&self) -> &ParticleProfile {
        &self.profile
    }

    pub fn tag(&self) -> u32 {
        self.tag
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn has_active(&self) -> bool {
        !self.particles.is_empty()
    }

    /// Remaining spawn headroom
    pub fn free(&self) -> usize {
        self.profile.capacity.saturating_sub(self.particles.len())
    }

    /// Spawn one particle at `origin` with profile jitter. Returns false and
    /// mutates nothing when the pool is full.
    pub fn try_spawn(&mut self, origin: Vec2, overrides: &SpawnOverrides) -> bool {
        if self.particles.len() >= self.profile.capacity {
            log::trace!("pool {}: spawn dropped at capacity", self.tag);
            return false;
        }

        let vel = overrides
            .velocity
            .unwrap_or_else(|| self.profile.spawn_velocity.sample(&mut self.rng));
        let lifetime = self.profile.lifetime.sample(&mut self.rng).max(f32::EPSILON);
        let size = overrides
            .size
            .unwrap_or_else(|| self.profile.size.sample(&mut self.rng));
        let color = overrides
            .color
            .unwrap_or_else(|| self.profile.colors.sample(&mut self.rng));

        self.particles.push(Particle {
            pos: origin,
            vel,
            remaining_life: lifetime,
            lifetime,
            size,
            color,
            alpha: self.profile.fade.alpha(0.0),
        });
        true
    }

    /// Advance every live particle by the same dt: integrate position, apply
    /// acceleration and drag, decay life, recompute alpha, cull the expired.
    /// O(n), no allocation. Negative dt clamps to a no-op tick.
    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        let accel = self.profile.acceleration;
        // Frame-rate independent drag: `drag` is the velocity fraction lost
        // per second, so the per-tick keep factor is (1-drag)^dt.
        let keep = (1.0 - self.profile.drag).clamp(0.0, 1.0).powf(dt);
        let fade = self.profile.fade;

        let mut i = 0;
        while i < self.particles.len() {
            let p = &mut self.particles[i];
            p.pos += p.vel * dt;
            p.vel += accel * dt;
            p.vel *= keep;
            p.remaining_life -= dt;

            let elapsed = 1.0 - (p.remaining_life / p.lifetime).clamp(0.0, 1.0);
            p.alpha = fade.alpha(elapsed);

            if p.remaining_life <= 0.0 || fade.spent(elapsed) {
                // Removal order is not significant
                self.particles.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }

    /// Drop every particle immediately
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Read-only view of every live particle, in internal order. The sole
    /// surface exposed to the drawing collaborator.
    pub fn snapshot(&self) -> impl Iterator<Item = ParticleView> + '_ {
        let tag = self.tag;
        self.particles.iter().map(move |p| ParticleView {
            x: p.pos.x,
            y: p.pos.y,
            size: p.size,
            color: p.color,
            alpha: p.alpha,
            tag,
        })
    }

    #[cfg(test)]
    pub(crate) fn particles(&self) -> &[Particle] {
        &self.particles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{ColorSet, FadeCurve, Span, SpawnVelocity};
    use proptest::prelude::*;

    fn test_profile(capacity: usize) -> ParticleProfile {
        ParticleProfile {
            capacity,
            spawn_velocity: SpawnVelocity::Cartesian {
                x: Span::new(-50.0, 50.0),
                y: Span::new(-100.0, -20.0),
            },
            acceleration: Vec2::new(0.0, 200.0),
            drag: 0.1,
            lifetime: Span::new(2.5, 3.5),
            size: Span::new(2.0, 6.0),
            colors: ColorSet::Fixed([1.0, 1.0, 1.0, 1.0]),
            fade: FadeCurve::Linear,
        }
    }

    #[test]
    fn test_burst_then_expire() {
        // capacity 100, burst 40 => count 40; after >= max lifetime => 0
        let mut pool = ParticlePool::new(test_profile(100), 0, 1234);
        for _ in 0..40 {
            assert!(pool.try_spawn(Vec2::ZERO, &SpawnOverrides::default()));
        }
        assert_eq!(pool.len(), 40);

        let dt = 1.0 / 60.0;
        let mut elapsed = 0.0;
        while elapsed < 3.6 {
            pool.update(dt);
            elapsed += dt;
        }
        assert_eq!(pool.len(), 0);
        assert!(!pool.has_active());
    }

    #[test]
    fn test_spawn_on_full_pool_fails_silently() {
        let mut pool = ParticlePool::new(test_profile(8), 0, 5);
        for _ in 0..8 {
            assert!(pool.try_spawn(Vec2::ZERO, &SpawnOverrides::default()));
        }
        assert!(!pool.try_spawn(Vec2::ZERO, &SpawnOverrides::default()));
        assert_eq!(pool.len(), 8);
    }

    #[test]
    fn test_determinism_same_seed_same_trajectories() {
        let run = || {
            let mut pool = ParticlePool::new(test_profile(64), 0, 999);
            let mut trace = Vec::new();
            for step in 0..240 {
                if step % 10 == 0 {
                    pool.try_spawn(Vec2::new(5.0, 5.0), &SpawnOverrides::default());
                }
                pool.update(1.0 / 120.0);
                for v in pool.snapshot() {
                    trace.push((v.x, v.y, v.alpha));
                }
            }
            trace
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_remaining_life_strictly_decreases() {
        let mut pool = ParticlePool::new(test_profile(4), 0, 77);
        pool.try_spawn(Vec2::ZERO, &SpawnOverrides::default());
        let mut prev = pool.particles()[0].remaining_life;
        for _ in 0..50 {
            pool.update(0.01);
            if pool.is_empty() {
                break;
            }
            let cur = pool.particles()[0].remaining_life;
            assert!(cur < prev);
            prev = cur;
        }
    }

    #[test]
    fn test_expired_absent_from_snapshot_same_tick() {
        let mut profile = test_profile(4);
        profile.lifetime = Span::fixed(0.1);
        let mut pool = ParticlePool::new(profile, 0, 3);
        pool.try_spawn(Vec2::ZERO, &SpawnOverrides::default());
        // First update that drives remaining_life <= 0 must also remove it
        pool.update(0.1);
        assert_eq!(pool.snapshot().count(), 0);
    }

    #[test]
    fn test_overrides_applied() {
        let mut pool = ParticlePool::new(test_profile(4), 0, 11);
        let overrides = SpawnOverrides {
            velocity: Some(Vec2::new(1.0, 2.0)),
            color: Some([0.5, 0.0, 0.0, 1.0]),
            size: Some(9.5),
        };
        assert!(pool.try_spawn(Vec2::new(3.0, 4.0), &overrides));
        let p = pool.particles()[0];
        assert_eq!(p.vel, Vec2::new(1.0, 2.0));
        assert_eq!(p.color, [0.5, 0.0, 0.0, 1.0]);
        assert_eq!(p.size, 9.5);
        assert_eq!(p.pos, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_negative_dt_is_noop() {
        let mut pool = ParticlePool::new(test_profile(4), 0, 21);
        pool.try_spawn(Vec2::ZERO, &SpawnOverrides::default());
        let before = pool.particles()[0];
        pool.update(-0.5);
        let after = pool.particles()[0];
        assert_eq!(before.pos, after.pos);
        assert_eq!(before.remaining_life, after.remaining_life);
    }

    #[test]
    fn test_clear() {
        let mut pool = ParticlePool::new(test_profile(16), 0, 8);
        for _ in 0..10 {
            pool.try_spawn(Vec2::ZERO, &SpawnOverrides::default());
        }
        pool.clear();
        assert!(pool.is_empty());
        // Pool is reusable after clear
        assert!(pool.try_spawn(Vec2::ZERO, &SpawnOverrides::default()));
    }

    proptest! {
        #[test]
        fn prop_count_never_exceeds_capacity(
            capacity in 1usize..64,
            steps in proptest::collection::vec((0usize..8, 0.0f32..0.2), 0..100),
        ) {
            let mut pool = ParticlePool::new(test_profile(capacity), 0, 42);
            for (spawns, dt) in steps {
                for _ in 0..spawns {
                    pool.try_spawn(Vec2::ZERO, &SpawnOverrides::default());
                    prop_assert!(pool.len() <= capacity);
                }
                pool.update(dt);
                prop_assert!(pool.len() <= capacity);
            }
        }

        #[test]
        fn prop_alpha_always_in_bounds(
            dts in proptest::collection::vec(-0.05f32..0.3, 1..80),
        ) {
            let mut profile = test_profile(32);
            profile.fade = FadeCurve::Windows { fade_in: 0.2, hold: 0.3, fade_out: 0.3 };
            let mut pool = ParticlePool::new(profile, 0, 17);
            for _ in 0..20 {
                pool.try_spawn(Vec2::ZERO, &SpawnOverrides::default());
            }
            for dt in dts {
                pool.update(dt);
                for v in pool.snapshot() {
                    prop_assert!((0.0..=1.0).contains(&v.alpha));
                }
            }
        }
    }
}
