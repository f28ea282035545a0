//! Fixed-capacity instanced batch for one homogeneous entity group.
//!
//! Slots are re-packed densely every rewrite: the first `active_count` slots
//! of every part buffer hold live entities, all slots from `active_count` to
//! `capacity` hold [`InstanceTransform::HIDDEN`]. Every part buffer uses the
//! same slot index for the same entity.

use super::animation::EntityAnimState;
use super::instance_data::{BodyPart, InstanceTransform};
use super::renderer::{EntityState, GroupKey, LiveEntity};
use crate::config::BatchConfig;
use ember_core::{EntityId, PositionOracle, Vec2};
use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

/// Tint of a live avatar.
const LIVE_TINT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
/// Tint of a dead avatar.
const DEAD_TINT: [f32; 4] = [0.35, 0.35, 0.35, 1.0];
/// Forward tilt of a dead body.
const DEAD_TILT: f32 = FRAC_PI_2 * 0.9;
/// Arm swing amplitude while walking.
const ARM_SWING: f32 = 0.6;
/// Leg swing amplitude while walking.
const LEG_SWING: f32 = 0.5;
/// Peak pitch of the attacking arm.
const ATTACK_SWING: f32 = 2.0;

/// Per-rewrite statistics for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Entities holding a slot.
    pub active: usize,
    /// Entities that did not fit.
    pub overflow: usize,
    /// Entities skipped because the oracle could not place them.
    pub unresolved: usize,
    /// Smoothing states discarded because their entity left the live set.
    pub purged: usize,
}

impl BatchStats {
    /// Adds another batch's numbers to these.
    pub fn accumulate(&mut self, other: Self) {
        self.active += other.active;
        self.overflow += other.overflow;
        self.unresolved += other.unresolved;
        self.purged += other.purged;
    }
}

/// One group's part buffers plus the smoothing state of its entities.
#[derive(Debug)]
pub struct InstancedBatch {
    key: GroupKey,
    capacity: usize,
    parts: [Vec<InstanceTransform>; BodyPart::COUNT],
    /// Slot -> entity, `len() == active_count`
    slots: Vec<EntityId>,
    tracked: HashMap<EntityId, EntityAnimState>,
    overflow: Vec<EntityId>,
    rewrite: u64,
    stats: BatchStats,
}

impl InstancedBatch {
    /// Creates a batch with every slot hidden.
    #[must_use]
    pub fn new(key: GroupKey, capacity: usize) -> Self {
        Self {
            key,
            capacity,
            parts: std::array::from_fn(|_| vec![InstanceTransform::HIDDEN; capacity]),
            slots: Vec::with_capacity(capacity),
            tracked: HashMap::with_capacity(capacity),
            overflow: Vec::new(),
            rewrite: 0,
            stats: BatchStats::default(),
        }
    }

    /// Starts a rewrite. Follow with [`push`](Self::push) per entity and
    /// finish with [`finish`](Self::finish).
    pub fn begin(&mut self) {
        self.rewrite += 1;
        self.slots.clear();
        self.overflow.clear();
        self.stats = BatchStats::default();
    }

    /// Places one live entity in the next free slot.
    pub fn push<O>(
        &mut self,
        entity: &LiveEntity,
        oracle: &O,
        now_ms: f64,
        delta_ms: f32,
        config: &BatchConfig,
    ) where
        O: PositionOracle + ?Sized,
    {
        let Some(position) = oracle.resolve(entity.id, now_ms) else {
            self.stats.unresolved += 1;
            // Still live: keep its smoothing state for when it resolves again
            if let Some(anim) = self.tracked.get_mut(&entity.id) {
                anim.seen_tick = self.rewrite;
            }
            return;
        };
        let facing = entity
            .state
            .attack_target
            .and_then(|target| oracle.resolve(target, now_ms));

        let rewrite = self.rewrite;
        let anim = self
            .tracked
            .entry(entity.id)
            .or_insert_with(|| EntityAnimState::first_sighting(position, &entity.state, now_ms, config));
        if anim.seen_tick == rewrite {
            // Listed twice in one live set
            return;
        }
        let fresh = anim.seen_tick == 0;
        anim.seen_tick = rewrite;
        if !fresh {
            anim.advance(position, facing, &entity.state, now_ms, delta_ms, config);
        }

        if self.slots.len() >= self.capacity {
            self.overflow.push(entity.id);
            return;
        }

        let slot = self.slots.len();
        self.slots.push(entity.id);
        let anim = &self.tracked[&entity.id];
        for part in BodyPart::ALL {
            self.parts[part.index()][slot] = pose(part, position, anim, &entity.state, now_ms, config);
        }
    }

    /// Hides the unused tail and drops state of entities not listed this rewrite.
    pub fn finish(&mut self) -> BatchStats {
        let active = self.slots.len();
        for buffer in &mut self.parts {
            buffer[active..].fill(InstanceTransform::HIDDEN);
        }

        let before = self.tracked.len();
        let rewrite = self.rewrite;
        self.tracked.retain(|_, anim| anim.seen_tick == rewrite);

        self.stats.active = active;
        self.stats.overflow = self.overflow.len();
        self.stats.purged = before - self.tracked.len();

        if !self.overflow.is_empty() {
            tracing::debug!(
                group = self.key.0,
                capacity = self.capacity,
                overflow = self.overflow.len(),
                "batch full, entities not drawn"
            );
        }
        self.stats
    }

    /// Group this batch draws.
    #[must_use]
    pub const fn key(&self) -> GroupKey {
        self.key
    }

    /// Slot count.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots holding live entities. Draw this many instances.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.len()
    }

    /// Entities that did not fit in the last rewrite.
    #[must_use]
    pub fn overflow(&self) -> &[EntityId] {
        &self.overflow
    }

    /// Entity in `slot`, if the slot is active.
    #[must_use]
    pub fn entity_at(&self, slot: usize) -> Option<EntityId> {
        self.slots.get(slot).copied()
    }

    /// Every slot of one part buffer, hidden tail included.
    #[must_use]
    pub fn instances(&self, part: BodyPart) -> &[InstanceTransform] {
        &self.parts[part.index()]
    }

    /// One part buffer as bytes for upload.
    #[must_use]
    pub fn part_bytes(&self, part: BodyPart) -> &[u8] {
        bytemuck::cast_slice(&self.parts[part.index()])
    }

    /// Smoothing state of a tracked entity.
    #[must_use]
    pub fn anim_state(&self, id: EntityId) -> Option<&EntityAnimState> {
        self.tracked.get(&id)
    }

    /// Number of entities with smoothing state.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Statistics of the last rewrite.
    #[must_use]
    pub const fn stats(&self) -> BatchStats {
        self.stats
    }
}

/// World transform of one part.
fn pose(
    part: BodyPart,
    origin: Vec2,
    anim: &EntityAnimState,
    state: &EntityState,
    now_ms: f64,
    config: &BatchConfig,
) -> InstanceTransform {
    let heading = anim.heading();
    let (side, up) = part.mount();
    let right = Vec2::from_heading(heading + FRAC_PI_2);
    let ground = origin + right * side;

    if state.dead {
        let pitch = if part == BodyPart::Body { DEAD_TILT } else { 0.0 };
        return InstanceTransform::new([ground.x, up * 0.3, ground.z], 1.0, heading, pitch, DEAD_TINT);
    }

    let swing = anim.walk_phase().sin();
    let mut pitch = match part {
        BodyPart::LeftArm => swing * ARM_SWING,
        BodyPart::RightArm => -swing * ARM_SWING,
        BodyPart::LeftLeg => -swing * LEG_SWING,
        BodyPart::RightLeg => swing * LEG_SWING,
        BodyPart::Body | BodyPart::Head => 0.0,
    };
    if part == BodyPart::RightArm {
        if let Some(progress) = anim.swing_progress(now_ms, config.attack_duration_ms) {
            pitch = -ATTACK_SWING * (progress * std::f32::consts::PI).sin();
        }
    }

    InstanceTransform::new([ground.x, up, ground.z], 1.0, heading, pitch, LIVE_TINT)
}
