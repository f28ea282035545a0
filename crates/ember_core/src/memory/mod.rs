//! # Memory Management
//!
//! Reuse pools for the per-tick path.
//!
//! ## Design Philosophy
//!
//! Buffers are allocated while the game warms up. After that a tick:
//! - takes a buffer from the pool,
//! - fills it,
//! - hands it back cleared but with its capacity intact.

mod scratch;

pub use scratch::{Recycle, ScratchPool, ScratchStats};
