//! # EMBER Core
//!
//! Shared vocabulary for the EMBER presentation core:
//! - Ground-plane math with wrap-safe angle easing
//! - Domain events and the append-only, bounded event log
//! - The Position Oracle seam and a snapshot-interpolating reference oracle
//! - Scratch pools that keep the tick path allocation-free once warm
//!
//! ## Architecture Rules
//!
//! 1. **Single tick thread** - nothing here locks
//! 2. **Events are immutable** - the core reads the log, it never edits it
//! 3. **Positions are queried, not owned** - see [`PositionOracle`]

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod events;
pub mod ids;
pub mod math;
pub mod memory;
pub mod oracle;

pub use error::{CoreError, CoreResult};
pub use events::{
    event_channel, DomainEvent, EventFeed, EventKind, EventLog, EventPayload, RewardKind,
    DEFAULT_FEED_CAPACITY, DEFAULT_LOG_RETENTION,
};
pub use ids::{EntityId, EventId};
pub use math::{ease_in, ease_out, lerp_angle, shortest_angle_delta, wrap_angle, Vec2};
pub use memory::{Recycle, ScratchPool, ScratchStats};
pub use oracle::{PositionOracle, SnapshotOracle};
