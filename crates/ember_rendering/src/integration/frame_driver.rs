//! Frame Driver - one call per display frame
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        FRAME TIMELINE                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  1. Scan event log   → EffectSpawner → EffectPool            │
//! │  2. Advance shared tick counter                              │
//! │     ├── effects playback  (High)  sample + compact pool      │
//! │     ├── batch rewrite     (High)  live set → part buffers    │
//! │     └── registered tasks  (by band and priority)             │
//! │  3. Return FrameResult                                       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Spawning happens before dispatch, so an effect created from an event is
//! already in the frames of the tick that saw the event.

use crate::config::EngineConfig;
use crate::effects::{EffectFrame, EffectPool, EffectSpawner, SpawnReport};
use crate::error::{DriverError, DriverResult, TaskFault};
use crate::instancing::{BatchRenderer, BatchStats, LiveEntity};
use crate::scheduler::{FrameScheduler, Priority, SchedulerStats, TaskContext, TaskId};
use ember_core::{DomainEvent, PositionOracle, Vec2};

/// Task ids at or above this value belong to built-in stages.
pub const RESERVED_TASK_BASE: u64 = u64::MAX - 15;
/// Samples the effect pool every tick.
pub const EFFECTS_TASK: TaskId = TaskId(u64::MAX);
/// Rewrites the instanced batches every tick.
pub const BATCH_TASK: TaskId = TaskId(u64::MAX - 1);

/// Everything the scheduled tasks may touch during one tick.
pub struct FrameStage<O> {
    oracle: O,
    effects: EffectPool,
    batches: BatchRenderer,
    live: Vec<LiveEntity>,
    now_ms: f64,
    batch_stats: BatchStats,
}

impl<O: PositionOracle> FrameStage<O> {
    /// Position source.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Live effects and the frames of the last playback.
    pub fn effects(&self) -> &EffectPool {
        &self.effects
    }

    /// Instanced batches.
    pub fn batches(&self) -> &BatchRenderer {
        &self.batches
    }

    /// Live set of the current tick.
    pub fn live(&self) -> &[LiveEntity] {
        &self.live
    }

    /// Clock time of the current tick.
    pub const fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn play_effects(&mut self, _: &TaskContext) -> Result<(), TaskFault> {
        if !self.now_ms.is_finite() {
            return Err(TaskFault::NonFinite("frame clock"));
        }
        self.effects.update(self.now_ms);
        Ok(())
    }

    fn rewrite_batches(&mut self, context: &TaskContext) -> Result<(), TaskFault> {
        if !self.now_ms.is_finite() {
            return Err(TaskFault::NonFinite("frame clock"));
        }
        self.batch_stats = self
            .batches
            .rewrite(&self.live, &self.oracle, self.now_ms, context.delta_ms);
        Ok(())
    }
}

/// Input of one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    /// Clock time of this frame.
    pub now_ms: f64,
    /// Time since the previous frame.
    pub delta_ms: f32,
    /// Camera or local player position, drives throttling.
    pub viewpoint: Vec2,
    /// The full event log, resends and all.
    pub events: &'a [DomainEvent],
    /// Entities to draw this frame.
    pub live: &'a [LiveEntity],
}

/// Result of a single frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameResult {
    /// Frame number, starting at 1
    pub frame_number: u64,
    /// Shared tick counter after this frame
    pub tick: u64,
    /// Event scan outcome
    pub spawn: SpawnReport,
    /// Task dispatch outcome
    pub scheduler: SchedulerStats,
    /// Effects visible this frame
    pub effects_visible: usize,
    /// Batch rewrite outcome
    pub batches: BatchStats,
}

/// Owns the presentation pipeline and runs it once per frame.
pub struct FrameDriver<O> {
    spawner: EffectSpawner,
    scheduler: FrameScheduler<FrameStage<O>>,
    stage: FrameStage<O>,
    frame_number: u64,
}

impl<O: PositionOracle + 'static> FrameDriver<O> {
    /// Validates `config` and builds the pipeline around `oracle`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Config`] if the config is invalid.
    pub fn new(config: &EngineConfig, oracle: O) -> DriverResult<Self> {
        config.validate()?;

        let mut scheduler: FrameScheduler<FrameStage<O>> = FrameScheduler::new(&config.scheduler);
        scheduler.register(EFFECTS_TASK, Vec2::ZERO, Priority::High, FrameStage::play_effects);
        scheduler.register(BATCH_TASK, Vec2::ZERO, Priority::High, FrameStage::rewrite_batches);

        tracing::info!(
            effect_capacity = config.effects.capacity,
            batch_capacity = config.batches.capacity,
            "frame driver ready"
        );

        Ok(Self {
            spawner: EffectSpawner::new(config.spawn.clone(), config.effects.clone()),
            scheduler,
            stage: FrameStage {
                oracle,
                effects: EffectPool::from_config(&config.effects),
                batches: BatchRenderer::new(config.batches.clone()),
                live: Vec::with_capacity(config.batches.capacity),
                now_ms: 0.0,
                batch_stats: BatchStats::default(),
            },
            frame_number: 0,
        })
    }

    /// Registers an animation task anchored at `anchor`.
    ///
    /// Returns whether a task with the same id was replaced.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::ReservedTask`] for ids of built-in stages.
    pub fn register_task<F>(
        &mut self,
        id: TaskId,
        anchor: Vec2,
        priority: Priority,
        callback: F,
    ) -> DriverResult<bool>
    where
        F: FnMut(&mut FrameStage<O>, &TaskContext) -> Result<(), TaskFault> + 'static,
    {
        if id.0 >= RESERVED_TASK_BASE {
            return Err(DriverError::ReservedTask(id.0));
        }
        Ok(self.scheduler.register(id, anchor, priority, callback))
    }

    /// Removes a registered task. Built-in stages cannot be removed.
    pub fn unregister_task(&mut self, id: TaskId) -> bool {
        id.0 < RESERVED_TASK_BASE && self.scheduler.unregister(id)
    }

    /// Moves a task's anchor.
    pub fn set_task_anchor(&mut self, id: TaskId, anchor: Vec2) -> bool {
        self.scheduler.set_anchor(id, anchor)
    }

    /// Runs one frame.
    pub fn tick(&mut self, input: &FrameInput<'_>) -> FrameResult {
        self.frame_number += 1;

        let stage = &mut self.stage;
        let spawn = self
            .spawner
            .ingest(input.events, &stage.oracle, input.now_ms, &mut stage.effects);

        stage.now_ms = input.now_ms;
        stage.live.clear();
        stage.live.extend_from_slice(input.live);

        let scheduler = self.scheduler.tick(stage, input.delta_ms, input.viewpoint);

        if scheduler.faulted > 0 {
            tracing::debug!(frame = self.frame_number, faulted = scheduler.faulted, "frame had task faults");
        }

        FrameResult {
            frame_number: self.frame_number,
            tick: self.scheduler.current_tick(),
            spawn,
            scheduler,
            effects_visible: self.stage.effects.frames().len(),
            batches: self.stage.batch_stats,
        }
    }

    /// Effect frames of the last tick.
    #[must_use]
    pub fn effect_frames(&self) -> &[EffectFrame] {
        self.stage.effects.frames()
    }

    /// The stage lent to tasks.
    #[must_use]
    pub const fn stage(&self) -> &FrameStage<O> {
        &self.stage
    }

    /// Mutable access to the position source, e.g. to push snapshots.
    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.stage.oracle
    }

    /// The event spawner.
    #[must_use]
    pub const fn spawner(&self) -> &EffectSpawner {
        &self.spawner
    }

    /// The task scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &FrameScheduler<FrameStage<O>> {
        &self.scheduler
    }
}
