//! Scene composition
//!
//! A `SceneAnimator` owns one clock plus every pool/scheduler channel a
//! visual scene needs (a workshop scene may run "sparks", "steam" and
//! "coins" at once). All channel state sits behind one coarse mutex: update
//! and draw happen back to back on the render thread, while spawn requests
//! may arrive from the game-logic thread. Nothing blocking runs under the
//! lock, and event hooks run after it is released so a hook may reach into
//! any scene, including a different one.

use std::sync::{Mutex, PoisonError};

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Deserialize;

use crate::clock::AnimationClock;
use crate::consts::MAX_CHANNEL_CAPACITY;
use crate::emitter::{EmissionMode, EmissionScheduler};
use crate::pool::{ParticlePool, ParticleView, SpawnOverrides};
use crate::profile::{ParticleProfile, Span};

/// Handle to one channel of a scene. Channels are never removed, so a
/// handle stays valid for the scene's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(usize);

impl ChannelId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Data-driven description of one channel. Deserializable so a host can
/// describe a whole scene as JSON instead of bespoke code.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    pub name: String,
    pub profile: ParticleProfile,
    #[serde(default)]
    pub mode: EmissionMode,
    /// Where scheduler-driven spawns originate
    #[serde(default)]
    pub origin: Vec2,
    /// Per-axis uniform jitter applied around `origin`
    #[serde(default)]
    pub origin_jitter: Vec2,
}

impl ChannelConfig {
    pub fn new(name: &str, profile: ParticleProfile) -> Self {
        Self {
            name: name.to_string(),
            profile,
            mode: EmissionMode::Manual,
            origin: Vec2::ZERO,
            origin_jitter: Vec2::ZERO,
        }
    }

    pub fn with_mode(mut self, mode: EmissionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn at(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_jitter(mut self, jitter: Vec2) -> Self {
        self.origin_jitter = jitter;
        self
    }
}

/// A business event fed through `update_with_events`, e.g. "award_coins"
/// with the payout position and amount.
#[derive(Debug, Clone)]
pub struct SceneEvent {
    pub name: String,
    pub origin: Vec2,
    pub magnitude: f32,
}

impl SceneEvent {
    pub fn new(name: &str, origin: Vec2, magnitude: f32) -> Self {
        Self {
            name: name.to_string(),
            origin,
            magnitude,
        }
    }
}

type EventHook = Box<dyn FnMut(&SceneEvent) + Send>;

struct Channel {
    name: String,
    pool: ParticlePool,
    scheduler: EmissionScheduler,
    origin: Vec2,
    origin_jitter: Vec2,
}

struct SceneState {
    clock: AnimationClock,
    channels: Vec<Channel>,
    /// Origin jitter for scheduler-driven spawns; pools carry their own
    /// streams for everything else
    rng: Pcg32,
    /// Host-driven scale on continuous emission (busier shop, faster rate)
    emit_scale: f32,
}

/// One clock plus N channels behind a single coarse lock.
pub struct SceneAnimator {
    state: Mutex<SceneState>,
    hooks: Mutex<Vec<EventHook>>,
    seed: u64,
    capacity_scale: f32,
}

impl SceneAnimator {
    pub fn new(seed: u64) -> Self {
        Self::with_capacity_scale(seed, 1.0)
    }

    /// `capacity_scale` shrinks or grows every channel's particle cap, for
    /// quality presets (0.25 on low-end devices, 1.0 default).
    pub fn with_capacity_scale(seed: u64, capacity_scale: f32) -> Self {
        Self {
            state: Mutex::new(SceneState {
                clock: AnimationClock::new(),
                channels: Vec::new(),
                rng: Pcg32::seed_from_u64(seed),
                emit_scale: 1.0,
            }),
            hooks: Mutex::new(Vec::new()),
            seed,
            capacity_scale: capacity_scale.max(0.0),
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SceneState> {
        // A panicked render frame must not take particle effects down with
        // it; poisoning is absorbed.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a channel. Pools get independent RNG streams derived from
    /// the scene seed, so adding a channel never perturbs existing ones.
    pub fn add_channel(&self, config: ChannelConfig) -> ChannelId {
        let mut state = self.lock_state();
        let index = state.channels.len();

        let mut profile = config.profile;
        profile.capacity = ((profile.capacity as f32 * self.capacity_scale) as usize)
            .min(MAX_CHANNEL_CAPACITY);

        let pool_seed = self
            .seed
            .wrapping_add((index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));

        log::debug!(
            "scene: channel '{}' ({}) capacity {}",
            config.name,
            index,
            profile.capacity
        );

        state.channels.push(Channel {
            name: config.name,
            pool: ParticlePool::new(profile, index as u32, pool_seed),
            scheduler: EmissionScheduler::new(config.mode),
            origin: config.origin,
            origin_jitter: config.origin_jitter,
        });
        ChannelId(index)
    }

    /// Register every channel described by a JSON array of `ChannelConfig`.
    pub fn add_channels_json(&self, json: &str) -> Result<Vec<ChannelId>, serde_json::Error> {
        let configs: Vec<ChannelConfig> = serde_json::from_str(json)?;
        Ok(configs.into_iter().map(|c| self.add_channel(c)).collect())
    }

    /// Hooks run once per event passed to `update_with_events`, after the
    /// scene lock is released. A hook may spawn into this scene or any
    /// other one (cross-scene effects such as "award coins").
    pub fn add_hook(&self, hook: impl FnMut(&SceneEvent) + Send + 'static) {
        self.hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(hook));
    }

    /// Advance the scene one tick: clock, schedulers, pools, then hooks.
    pub fn update(&self, dt: f32) {
        self.update_with_events(dt, &[]);
    }

    pub fn update_with_events(&self, dt: f32, events: &[SceneEvent]) {
        let dt = dt.max(0.0);
        {
            let mut guard = self.lock_state();
            let state = &mut *guard;
            state.clock.advance(dt);
            // Pools run in scene time: the clock's speed multiplier slows or
            // hurries physics together with phase.
            let scene_dt = dt * state.clock.speed();
            let sched_dt = dt * state.emit_scale;

            for channel in &mut state.channels {
                let due = channel.scheduler.due(&state.clock, sched_dt);
                for _ in 0..due {
                    let origin = channel.origin + jitter(&mut state.rng, channel.origin_jitter);
                    if !channel.pool.try_spawn(origin, &SpawnOverrides::default()) {
                        break; // at capacity, the rest of this tick's due spawns drop too
                    }
                }
                channel.pool.update(scene_dt);
            }
        }

        if events.is_empty() {
            return;
        }
        let mut hooks = self.hooks.lock().unwrap_or_else(PoisonError::into_inner);
        for event in events {
            for hook in hooks.iter_mut() {
                hook(event);
            }
        }
    }

    /// Spawn up to `count` particles at the channel origin. Returns how many
    /// actually spawned (capacity caps the rest).
    pub fn burst(&self, id: ChannelId, count: usize) -> usize {
        let mut state = self.lock_state();
        let state = &mut *state;
        let Some(channel) = state.channels.get_mut(id.0) else {
            log::debug!("scene: burst on unknown channel {}", id.0);
            return 0;
        };
        let mut spawned = 0;
        for _ in 0..count {
            let origin = channel.origin + jitter(&mut state.rng, channel.origin_jitter);
            if !channel.pool.try_spawn(origin, &SpawnOverrides::default()) {
                break;
            }
            spawned += 1;
        }
        spawned
    }

    /// Spawn up to `count` particles at an explicit origin (e.g. where a
    /// block broke), with the channel's jitter applied around it.
    pub fn burst_at(&self, id: ChannelId, count: usize, origin: Vec2) -> usize {
        let mut state = self.lock_state();
        let state = &mut *state;
        let Some(channel) = state.channels.get_mut(id.0) else {
            return 0;
        };
        let mut spawned = 0;
        for _ in 0..count {
            let jittered = origin + jitter(&mut state.rng, channel.origin_jitter);
            if !channel.pool.try_spawn(jittered, &SpawnOverrides::default()) {
                break;
            }
            spawned += 1;
        }
        spawned
    }

    /// Spawn one particle with explicit overrides. False when the channel is
    /// full or unknown.
    pub fn try_spawn(&self, id: ChannelId, origin: Vec2, overrides: &SpawnOverrides) -> bool {
        let mut state = self.lock_state();
        match state.channels.get_mut(id.0) {
            Some(channel) => channel.pool.try_spawn(origin, overrides),
            None => false,
        }
    }

    /// Copy of every live particle across all channels, in stable channel
    /// order. The drawing collaborator's sole input; may be empty.
    pub fn snapshot(&self) -> Vec<ParticleView> {
        let mut out = Vec::new();
        self.snapshot_into(&mut out);
        out
    }

    /// Like `snapshot` but reuses the caller's buffer, for hosts that draw
    /// every frame and want steady-state zero allocation.
    pub fn snapshot_into(&self, out: &mut Vec<ParticleView>) {
        out.clear();
        let state = self.lock_state();
        for channel in &state.channels {
            out.extend(channel.pool.snapshot());
        }
    }

    /// Total live particles across all channels
    pub fn live_count(&self) -> usize {
        self.lock_state().channels.iter().map(|c| c.pool.len()).sum()
    }

    pub fn has_active(&self) -> bool {
        self.lock_state().channels.iter().any(|c| c.pool.has_active())
    }

    /// Drop every particle in every channel and reset emission latches
    pub fn clear(&self) {
        let mut state = self.lock_state();
        for channel in &mut state.channels {
            channel.pool.clear();
            channel.scheduler.reset();
        }
    }

    pub fn clear_channel(&self, id: ChannelId) {
        let mut state = self.lock_state();
        if let Some(channel) = state.channels.get_mut(id.0) {
            channel.pool.clear();
            channel.scheduler.reset();
        }
    }

    /// Copy of the scene clock, for deriving pulse/ping-pong values at draw
    /// time without holding the lock open.
    pub fn clock(&self) -> AnimationClock {
        self.lock_state().clock
    }

    pub fn set_speed(&self, speed: f32) {
        self.lock_state().clock.set_speed(speed);
    }

    /// Host-state input scaling continuous emission rates (e.g. more active
    /// workers, busier steam). Bursts are parametrized per call instead.
    pub fn set_emit_scale(&self, scale: f32) {
        self.lock_state().emit_scale = scale.max(0.0);
    }

    /// Channel name lookup, mostly for debug overlays
    pub fn channel_name(&self, id: ChannelId) -> Option<String> {
        self.lock_state().channels.get(id.0).map(|c| c.name.clone())
    }
}

fn jitter(rng: &mut Pcg32, amount: Vec2) -> Vec2 {
    if amount == Vec2::ZERO {
        return Vec2::ZERO;
    }
    Vec2::new(
        Span::new(-amount.x, amount.x).sample(rng),
        Span::new(-amount.y, amount.y).sample(rng),
    )
}
