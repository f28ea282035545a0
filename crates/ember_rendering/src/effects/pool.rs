//! Fixed-capacity effect pool
//!
//! Storage is reserved once at construction. Spawning never allocates and
//! never evicts: a full pool rejects the request. Expired effects are removed
//! by a single compacting pass in [`EffectPool::update`], which also fills the
//! frame buffer the renderer reads.

use super::instance::{EffectFrame, EffectId, EffectInstance, SpawnRequest};
use crate::config::EffectConfig;

/// Effect pool statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Live effects after the last update.
    pub active: usize,
    /// Effects removed by the last update.
    pub expired_last_update: usize,
    /// Effects spawned since construction.
    pub spawned_total: u64,
    /// Spawn requests rejected because the pool was full.
    pub rejected_total: u64,
}

/// Bounded set of live effects.
#[derive(Debug)]
pub struct EffectPool {
    /// Live effects in spawn order
    active: Vec<EffectInstance>,
    /// Frames produced by the last update
    frames: Vec<EffectFrame>,
    capacity: usize,
    next_id: u64,
    stats: PoolStats,
}

impl EffectPool {
    /// Creates a pool holding at most `capacity` effects.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            active: Vec::with_capacity(capacity),
            frames: Vec::with_capacity(capacity),
            capacity,
            next_id: 1,
            stats: PoolStats::default(),
        }
    }

    /// Creates a pool sized from config.
    #[must_use]
    pub fn from_config(config: &EffectConfig) -> Self {
        Self::new(config.capacity)
    }

    /// Admits an effect spawned at `now_ms`.
    ///
    /// Returns `None` when the pool is full. Nothing already live is displaced.
    pub fn try_spawn(&mut self, request: &SpawnRequest, now_ms: f64) -> Option<EffectId> {
        if self.active.len() >= self.capacity {
            self.stats.rejected_total += 1;
            return None;
        }

        let id = EffectId(self.next_id);
        self.next_id += 1;
        self.active.push(EffectInstance::from_request(id, request, now_ms));
        self.stats.spawned_total += 1;
        self.stats.active = self.active.len();
        Some(id)
    }

    /// Samples every effect at `now_ms` and drops the expired ones.
    ///
    /// Survivors keep their relative order. Returns the frames of survivors.
    pub fn update(&mut self, now_ms: f64) -> &[EffectFrame] {
        self.frames.clear();
        let before = self.active.len();

        let frames = &mut self.frames;
        self.active.retain(|effect| match effect.sample(now_ms) {
            Some(frame) => {
                frames.push(frame);
                true
            }
            None => false,
        });

        self.stats.expired_last_update = before - self.active.len();
        self.stats.active = self.active.len();

        &self.frames
    }

    /// Frames produced by the last update.
    #[must_use]
    pub fn frames(&self) -> &[EffectFrame] {
        &self.frames
    }

    /// Live effects in spawn order.
    #[must_use]
    pub fn active(&self) -> &[EffectInstance] {
        &self.active
    }

    /// Looks up a live effect.
    #[must_use]
    pub fn get(&self, id: EffectId) -> Option<&EffectInstance> {
        self.active.iter().find(|effect| effect.id == id)
    }

    /// Number of live effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// True when no effect is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Maximum number of live effects.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots still available.
    #[must_use]
    pub fn free(&self) -> usize {
        self.capacity.saturating_sub(self.active.len())
    }

    /// Returns statistics.
    #[must_use]
    pub const fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Drops every live effect.
    pub fn clear(&mut self) {
        self.active.clear();
        self.frames.clear();
        self.stats.active = 0;
    }
}
