//! Instanced batches for homogeneous entity groups.
//!
//! ## Key Concepts
//!
//! - **Part buffers**: one fixed-size instance buffer per body part, shared slot index
//! - **Dense packing**: live entities fill slots `0..active_count`, the tail is zero-scale
//! - **Smoothing state**: per entity, purged the rewrite its entity disappears

mod animation;
mod batch;
mod instance_data;
mod renderer;

pub use animation::EntityAnimState;
pub use batch::{BatchStats, InstancedBatch};
pub use instance_data::{BodyPart, InstanceTransform};
pub use renderer::{BatchRenderer, EntityState, GroupKey, LiveEntity};
