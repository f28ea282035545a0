//! # Frame Scheduler
//!
//! One dispatcher owns every per-object animation callback. Instead of N
//! independent timers there is one shared tick counter; each task is gated
//! by how far its anchor sits from the viewpoint.
//!
//! ```text
//! distance      band       runs when
//! ─────────────────────────────────────────────
//! < near        Near       every tick
//! < medium      Medium     tick % 2 == 0
//! < far         Far        tick % 4 == 0
//! beyond        VeryFar    tick % 8 == 0
//! priority High            every tick, any distance
//! ```

mod frame_scheduler;
mod throttle;

pub use frame_scheduler::{FrameScheduler, SchedulerStats, TaskCallback, TaskContext, TaskId};
pub use throttle::{Priority, ThrottleBand, ThrottleBands};
