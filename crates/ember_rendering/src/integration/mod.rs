//! Integration layer: the per-frame pipeline that ties the scheduler, the
//! effect spawner and the instanced batches together.

mod frame_driver;

pub use frame_driver::{
    FrameDriver, FrameInput, FrameResult, FrameStage, BATCH_TASK, EFFECTS_TASK, RESERVED_TASK_BASE,
};
