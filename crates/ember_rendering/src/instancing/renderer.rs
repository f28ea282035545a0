//! Group router over the instanced batches.

use super::batch::{BatchStats, InstancedBatch};
use crate::config::BatchConfig;
use ember_core::{EntityId, PositionOracle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifies a homogeneous group drawn by one batch (same model, same shader).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(pub u32);

/// Animation-relevant state of a live entity, as reported by the game layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityState {
    /// Walking or running.
    pub moving: bool,
    /// Timestamp of the most recent attack.
    pub last_attack_ms: Option<f64>,
    /// Entity being attacked, faced while set.
    pub attack_target: Option<EntityId>,
    /// Dead entities are drawn darkened and tilted.
    pub dead: bool,
}

/// One entry of the live set handed to the renderer each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveEntity {
    /// Entity id, resolved through the position oracle.
    pub id: EntityId,
    /// Batch this entity is drawn by.
    pub group: GroupKey,
    /// Animation state.
    #[serde(default)]
    pub state: EntityState,
}

/// Owns one batch per group and routes the live set into them.
///
/// Batches are kept for every group ever seen, even after the group leaves
/// the live set, so memory is bounded by the number of distinct groups:
/// each costs `BodyPart::COUNT * capacity * InstanceTransform::SIZE` bytes
/// (48 bytes per part per slot). Suits a fixed set of factions or teams.
#[derive(Debug)]
pub struct BatchRenderer {
    batches: BTreeMap<GroupKey, InstancedBatch>,
    config: BatchConfig,
    stats: BatchStats,
}

impl BatchRenderer {
    /// Creates a renderer with no groups.
    #[must_use]
    pub fn new(config: BatchConfig) -> Self {
        Self {
            batches: BTreeMap::new(),
            config,
            stats: BatchStats::default(),
        }
    }

    /// Creates the batch for `key` up front, at the configured capacity.
    pub fn ensure_group(&mut self, key: GroupKey) -> &mut InstancedBatch {
        let capacity = self.config.capacity;
        self.batches
            .entry(key)
            .or_insert_with(|| InstancedBatch::new(key, capacity))
    }

    /// Rewrites every batch from the live set.
    ///
    /// A group seen for the first time gets its batch allocated here; after
    /// that the steady state allocates nothing. Groups absent from `live` are
    /// emptied, not removed.
    pub fn rewrite<O>(
        &mut self,
        live: &[LiveEntity],
        oracle: &O,
        now_ms: f64,
        delta_ms: f32,
    ) -> BatchStats
    where
        O: PositionOracle + ?Sized,
    {
        for batch in self.batches.values_mut() {
            batch.begin();
        }

        for entity in live {
            if !self.batches.contains_key(&entity.group) {
                tracing::debug!(group = entity.group.0, "allocating batch for new group");
                self.ensure_group(entity.group).begin();
            }
            if let Some(batch) = self.batches.get_mut(&entity.group) {
                batch.push(entity, oracle, now_ms, delta_ms, &self.config);
            }
        }

        let mut stats = BatchStats::default();
        for batch in self.batches.values_mut() {
            stats.accumulate(batch.finish());
        }
        self.stats = stats;
        stats
    }

    /// Batch for a group.
    #[must_use]
    pub fn batch(&self, key: GroupKey) -> Option<&InstancedBatch> {
        self.batches.get(&key)
    }

    /// All batches, ordered by group.
    pub fn batches(&self) -> impl Iterator<Item = &InstancedBatch> {
        self.batches.values()
    }

    /// Totals of the last rewrite.
    #[must_use]
    pub const fn stats(&self) -> BatchStats {
        self.stats
    }
}
