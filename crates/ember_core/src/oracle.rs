//! # Position Oracle
//!
//! "Where is entity X right now?" is answered outside the presentation
//! core. Everything here only ever calls [`PositionOracle::resolve`].
//!
//! [`SnapshotOracle`] is the reference implementation: it keeps the last two
//! authoritative snapshots per entity and renders one snapshot interval
//! behind, gliding from the previous position to the current one.

use crate::error::{CoreError, CoreResult};
use crate::ids::EntityId;
use crate::math::Vec2;
use std::collections::HashMap;

/// Read-only query for an entity's interpolated ground position.
///
/// Implementations must be idempotent for a given `now_ms` and cheap enough
/// to call once per entity per tick.
pub trait PositionOracle {
    /// Best-effort position of `entity` at `now_ms`, or `None` if unknown.
    fn resolve(&self, entity: EntityId, now_ms: f64) -> Option<Vec2>;
}

impl<T: PositionOracle + ?Sized> PositionOracle for &T {
    fn resolve(&self, entity: EntityId, now_ms: f64) -> Option<Vec2> {
        (**self).resolve(entity, now_ms)
    }
}

/// Last two snapshots of one entity.
#[derive(Clone, Copy, Debug)]
struct SnapshotTrack {
    prev: Vec2,
    curr: Vec2,
    /// Time the current snapshot arrived.
    curr_ms: f64,
}

/// Snapshot-interpolating oracle fed by the network layer.
#[derive(Clone, Debug)]
pub struct SnapshotOracle {
    tracks: HashMap<EntityId, SnapshotTrack>,
    interval_ms: f64,
}

impl SnapshotOracle {
    /// Creates an oracle expecting snapshots every `interval_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSnapshotInterval`] for a zero interval.
    pub fn new(interval_ms: u64) -> CoreResult<Self> {
        if interval_ms == 0 {
            return Err(CoreError::InvalidSnapshotInterval(interval_ms));
        }
        #[allow(clippy::cast_precision_loss)]
        let interval_ms = interval_ms as f64;
        Ok(Self {
            tracks: HashMap::new(),
            interval_ms,
        })
    }

    /// Records an authoritative position received at `received_ms`.
    ///
    /// The first snapshot of an entity seeds both ends, so it renders in
    /// place instead of sliding in from the origin.
    pub fn push_snapshot(&mut self, entity: EntityId, position: Vec2, received_ms: f64) {
        self.tracks
            .entry(entity)
            .and_modify(|track| {
                track.prev = track.curr;
                track.curr = position;
                track.curr_ms = received_ms;
            })
            .or_insert(SnapshotTrack {
                prev: position,
                curr: position,
                curr_ms: received_ms,
            });
    }

    /// Forgets an entity (despawned).
    pub fn remove(&mut self, entity: EntityId) {
        self.tracks.remove(&entity);
    }

    /// Number of tracked entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// True if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl PositionOracle for SnapshotOracle {
    fn resolve(&self, entity: EntityId, now_ms: f64) -> Option<Vec2> {
        let track = self.tracks.get(&entity)?;
        #[allow(clippy::cast_possible_truncation)]
        let t = ((now_ms - track.curr_ms) / self.interval_ms).clamp(0.0, 1.0) as f32;
        Some(track.prev.lerp(track.curr, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_entity() {
        let oracle = SnapshotOracle::new(50).unwrap();
        assert_eq!(oracle.resolve(EntityId(9), 0.0), None);
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert_eq!(
            SnapshotOracle::new(0).unwrap_err(),
            CoreError::InvalidSnapshotInterval(0)
        );
    }

    #[test]
    fn test_first_snapshot_renders_in_place() {
        let mut oracle = SnapshotOracle::new(50).unwrap();
        oracle.push_snapshot(EntityId(1), Vec2::new(4.0, 2.0), 100.0);
        assert_eq!(oracle.resolve(EntityId(1), 100.0), Some(Vec2::new(4.0, 2.0)));
    }

    #[test]
    fn test_glides_between_snapshots() {
        let mut oracle = SnapshotOracle::new(50).unwrap();
        let id = EntityId(1);
        oracle.push_snapshot(id, Vec2::new(0.0, 0.0), 0.0);
        oracle.push_snapshot(id, Vec2::new(10.0, 0.0), 50.0);

        let start = oracle.resolve(id, 50.0).unwrap();
        let mid = oracle.resolve(id, 75.0).unwrap();
        let end = oracle.resolve(id, 500.0).unwrap();

        assert!((start.x - 0.0).abs() < 1e-5);
        assert!((mid.x - 5.0).abs() < 1e-4);
        assert!((end.x - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut oracle = SnapshotOracle::new(50).unwrap();
        let id = EntityId(3);
        oracle.push_snapshot(id, Vec2::new(1.0, 1.0), 0.0);
        oracle.push_snapshot(id, Vec2::new(3.0, 5.0), 50.0);
        assert_eq!(oracle.resolve(id, 61.0), oracle.resolve(id, 61.0));
    }

    #[test]
    fn test_remove() {
        let mut oracle = SnapshotOracle::new(50).unwrap();
        oracle.push_snapshot(EntityId(1), Vec2::ZERO, 0.0);
        oracle.remove(EntityId(1));
        assert!(oracle.is_empty());
        assert_eq!(oracle.resolve(EntityId(1), 0.0), None);
    }
}
