//! # Domain Events
//!
//! Events arrive from the network layer through an [`EventFeed`] and are
//! appended to an [`EventLog`]. The log is append-only and re-scanned every
//! tick, so the same event id is expected to be observed many times.
//!
//! ```text
//! Network layer ──► EventFeed ──► channel ──► EventLog::poll (once per tick)
//!                                                  │
//!                                                  ▼
//!                                      snapshot() ──► EffectSpawner
//! ```

use crate::error::{CoreError, CoreResult};
use crate::ids::{EntityId, EventId};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use serde::{Deserialize, Serialize};

/// Default number of events the log retains.
pub const DEFAULT_LOG_RETENTION: usize = 1024;

/// Default capacity of the producer channel.
pub const DEFAULT_FEED_CAPACITY: usize = 2048;

/// What happened in the authoritative simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A regular hit landed.
    Damage,
    /// A critical hit landed.
    Critical,
    /// An attack missed.
    Miss,
    /// Experience or gold was awarded.
    Reward,
    /// An entity gained a level.
    LevelUp,
    /// An entity re-entered the world.
    Respawn,
    /// An entity was healed.
    Heal,
    /// An entity died.
    Death,
}

/// Which currency a reward event pays out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    /// Experience points
    #[default]
    Exp,
    /// Gold coins
    Gold,
}

/// Kind-specific numeric fields. Unused fields stay at their defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventPayload {
    /// Damage dealt or reward paid.
    pub amount: i64,
    /// Currency of a reward.
    pub reward: RewardKind,
    /// New level for level-up events.
    pub level: u32,
    /// The hit was delivered at range (spawns a projectile).
    pub ranged: bool,
}

/// One immutable record from the authoritative event stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Producer-assigned unique id.
    pub id: EventId,
    /// What happened.
    pub kind: EventKind,
    /// Entity that caused the event (attacker, rewarded player).
    pub subject: EntityId,
    /// Entity the effect is shown on.
    pub target: EntityId,
    /// Kind-specific numbers.
    #[serde(default)]
    pub payload: EventPayload,
    /// Position in this client's arrival sequence. Only [`EventLog::poll`]
    /// sets it; producer-side values never cross the wire.
    #[serde(skip)]
    arrival_order: Option<u64>,
}

impl DomainEvent {
    /// Creates an event with an empty payload.
    #[must_use]
    pub fn new(id: impl Into<EventId>, kind: EventKind, subject: EntityId, target: EntityId) -> Self {
        Self {
            id: id.into(),
            kind,
            subject,
            target,
            payload: EventPayload::default(),
            arrival_order: None,
        }
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: EventPayload) -> Self {
        self.payload = payload;
        self
    }

    /// Arrival order stamped by the [`EventLog`] that received this event,
    /// or `None` for an event that never went through one.
    #[must_use]
    pub const fn arrival_order(&self) -> Option<u64> {
        self.arrival_order
    }
}

/// Producer half of the event boundary. Cheap to clone.
#[derive(Clone, Debug)]
pub struct EventFeed {
    sender: Sender<DomainEvent>,
}

impl EventFeed {
    /// Publishes an event without blocking.
    ///
    /// Returns false if the channel is full or the log was dropped.
    pub fn publish(&self, event: DomainEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!(event_id = %event.id, "event feed full, event dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Append-only, bounded history of domain events.
#[derive(Debug)]
pub struct EventLog {
    events: Vec<DomainEvent>,
    receiver: Receiver<DomainEvent>,
    retention: usize,
    next_arrival: u64,
    disconnected: bool,
}

/// Creates a connected feed/log pair.
#[must_use]
pub fn event_channel(feed_capacity: usize, retention: usize) -> (EventFeed, EventLog) {
    let (sender, receiver) = bounded(feed_capacity.max(1));
    let log = EventLog {
        events: Vec::with_capacity(retention.max(1)),
        receiver,
        retention: retention.max(1),
        next_arrival: 0,
        disconnected: false,
    };
    (EventFeed { sender }, log)
}

impl EventLog {
    /// Drains everything the producer has sent since the last poll.
    ///
    /// Never blocks. Each received event is stamped with the next arrival
    /// order. When the log exceeds its retention the oldest entries go.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::FeedDisconnected`] once, on the first poll after
    /// every feed was dropped. The retained snapshot remains readable.
    pub fn poll(&mut self) -> CoreResult<usize> {
        let mut received = 0;
        let mut newly_disconnected = false;

        loop {
            match self.receiver.try_recv() {
                Ok(mut event) => {
                    event.arrival_order = Some(self.next_arrival);
                    self.next_arrival += 1;
                    self.events.push(event);
                    received += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    newly_disconnected = !self.disconnected;
                    self.disconnected = true;
                    break;
                }
            }
        }

        if self.events.len() > self.retention {
            let excess = self.events.len() - self.retention;
            self.events.drain(..excess);
            tracing::trace!(excess, retention = self.retention, "event log trimmed");
        }

        if newly_disconnected {
            return Err(CoreError::FeedDisconnected {
                retained: self.events.len(),
            });
        }
        Ok(received)
    }

    /// The retained events, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> &[DomainEvent] {
        &self.events
    }

    /// Number of retained events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// True once every feed has been dropped and observed by `poll`.
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}
