//! # EMBER Rendering
//!
//! Client-side presentation core. Keeps hundreds of animated entities and
//! transient combat effects on screen under a fixed per-frame budget, fed by
//! an unbounded, possibly duplicated event stream.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      PER-FRAME PIPELINE                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Event log → EffectSpawner → EffectPool ──┐                 │
//! │                                           ↓                 │
//! │  FrameScheduler (shared tick, distance bands)               │
//! │       ├── effects playback → EffectFrame[]                  │
//! │       ├── batch rewrite    → part buffers (bytemuck)        │
//! │       └── animation tasks                                   │
//! │                    ↑                                        │
//! │            PositionOracle (external)                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Budget Rules
//!
//! - One tick counter, no per-object timers
//! - Pools and batches are fixed-capacity; overflow is dropped, never grown
//! - No allocations in the tick path once warm

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod effects;
pub mod error;
pub mod instancing;
pub mod integration;
pub mod scheduler;

pub use config::{BatchConfig, EffectConfig, EngineConfig, SchedulerConfig, SpawnConfig};
pub use effects::{
    EffectFrame, EffectId, EffectInstance, EffectKind, EffectParams, EffectPool, EffectSpawner,
    PoolStats, ProcessedEventRegistry, SpawnReport, SpawnRequest,
};
pub use error::{ConfigError, ConfigResult, DriverError, DriverResult, TaskFault};
pub use instancing::{
    BatchRenderer, BatchStats, BodyPart, EntityAnimState, EntityState, GroupKey, InstanceTransform,
    InstancedBatch, LiveEntity,
};
pub use integration::{FrameDriver, FrameInput, FrameResult, FrameStage};
pub use scheduler::{
    FrameScheduler, Priority, SchedulerStats, TaskContext, TaskId, ThrottleBand, ThrottleBands,
};
