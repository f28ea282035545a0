//! # Combat and Reward Effects
//!
//! Events become short-lived visual records that expire on their own.
//!
//! ```text
//! event log ──► EffectSpawner ──► EffectPool ──► EffectFrame[]
//!               (dedup, map)      (bounded)      (per tick)
//! ```
//!
//! - Every effect is a pure function of `now - spawn_ms`
//! - The pool is fixed-capacity; when full, the lowest-value kinds are dropped
//! - Re-scanning the same log never duplicates an effect

mod instance;
mod pool;
mod registry;
mod spawner;

pub use instance::{
    EffectFrame, EffectId, EffectInstance, EffectKind, EffectParams, SpawnRequest,
};
pub use pool::{EffectPool, PoolStats};
pub use registry::ProcessedEventRegistry;
pub use spawner::{EffectSpawner, SpawnReport};
