//! Bounded record of processed event ids.
//!
//! The event log is re-scanned every frame, so the spawner has to remember
//! what it already handled. Memory stays bounded: past `capacity` the oldest
//! ids are forgotten, keeping only the most recent fraction. Forgotten ids must
//! not come back to life, so the registry keeps a watermark of the highest
//! arrival order it ever evicted and treats any stamped event at or below it
//! as done.
//!
//! Only stamps assigned by [`ember_core::EventLog::poll`] take part. The log
//! stamps in receipt order, so an event arriving late (even one the producer
//! sent out of order) always lands above the watermark. Unstamped events are
//! deduplicated by id alone.

use ember_core::{DomainEvent, EventId};
use std::collections::{HashSet, VecDeque};

/// Processed-id registry with keep-fraction truncation.
#[derive(Debug)]
pub struct ProcessedEventRegistry {
    seen: HashSet<EventId>,
    /// Insertion order, paired with each event's arrival stamp
    order: VecDeque<(EventId, Option<u64>)>,
    capacity: usize,
    keep: usize,
    watermark: Option<u64>,
    truncations: u64,
}

impl ProcessedEventRegistry {
    /// Creates a registry that truncates past `capacity`, keeping the most
    /// recent `keep_fraction` of it (at least one id).
    #[must_use]
    pub fn new(capacity: usize, keep_fraction: f32) -> Self {
        let capacity = capacity.max(1);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let keep = ((capacity as f64 * f64::from(keep_fraction.clamp(0.0, 1.0))).floor() as usize)
            .clamp(1, capacity);

        Self {
            seen: HashSet::with_capacity(capacity + 1),
            order: VecDeque::with_capacity(capacity + 1),
            capacity,
            keep,
            watermark: None,
            truncations: 0,
        }
    }

    /// True if the event was handled before, or carries a stamp no newer
    /// than anything forgotten.
    #[must_use]
    pub fn is_processed(&self, event: &DomainEvent) -> bool {
        if self.seen.contains(&event.id) {
            return true;
        }
        match (event.arrival_order(), self.watermark) {
            (Some(stamp), Some(mark)) => stamp <= mark,
            _ => false,
        }
    }

    /// Records the event. Returns `false` if it was already processed.
    pub fn mark(&mut self, event: &DomainEvent) -> bool {
        if self.is_processed(event) {
            return false;
        }

        self.seen.insert(event.id.clone());
        self.order.push_back((event.id.clone(), event.arrival_order()));
        if self.order.len() > self.capacity {
            self.truncate();
        }
        true
    }

    fn truncate(&mut self) {
        while self.order.len() > self.keep {
            let Some((id, arrival)) = self.order.pop_front() else {
                break;
            };
            self.seen.remove(&id);
            if let Some(stamp) = arrival {
                self.watermark = Some(self.watermark.map_or(stamp, |mark| mark.max(stamp)));
            }
        }
        self.truncations += 1;
        tracing::debug!(
            kept = self.order.len(),
            watermark = ?self.watermark,
            "processed-event registry truncated"
        );
    }

    /// Ids currently remembered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when nothing is remembered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Highest arrival order ever evicted.
    #[must_use]
    pub const fn watermark(&self) -> Option<u64> {
        self.watermark
    }

    /// Number of truncations so far.
    #[must_use]
    pub const fn truncations(&self) -> u64 {
        self.truncations
    }
}
