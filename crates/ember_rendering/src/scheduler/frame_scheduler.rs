//! The per-tick dispatcher.

use super::throttle::{Priority, ThrottleBand, ThrottleBands};
use crate::config::SchedulerConfig;
use crate::error::TaskFault;
use ember_core::Vec2;
use std::collections::HashMap;

/// Identifier of a scheduled task. Registering an existing id replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

/// What a callback learns about the tick it runs in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskContext {
    /// Milliseconds since this task last ran (the frame delta on its first run).
    pub delta_ms: f32,
    /// Milliseconds since the scheduler started.
    pub elapsed_ms: f64,
    /// Distance from the viewpoint to the task's anchor.
    pub distance: f32,
    /// Current value of the shared tick counter.
    pub tick: u64,
}

/// Boxed animation callback. `C` is the state the scheduler's owner lends
/// to every task for the duration of one tick.
pub type TaskCallback<C> = Box<dyn FnMut(&mut C, &TaskContext) -> Result<(), TaskFault>>;

struct TaskEntry<C> {
    id: TaskId,
    anchor: Vec2,
    priority: Priority,
    last_run_ms: Option<f64>,
    callback: TaskCallback<C>,
}

/// Statistics from the last tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Tasks whose callback ran successfully.
    pub executed: u32,
    /// Tasks skipped because their band was not due.
    pub throttled: u32,
    /// Tasks whose callback returned a fault.
    pub faulted: u32,
}

/// Arena of `(callback, anchor, priority)` tuples keyed by [`TaskId`].
///
/// Registration allocates the boxed callback once; a tick only walks a flat
/// `Vec` and compares one shared counter per task.
pub struct FrameScheduler<C> {
    tasks: Vec<TaskEntry<C>>,
    index: HashMap<TaskId, usize>,
    bands: ThrottleBands,
    tick: u64,
    tick_wrap: u64,
    elapsed_ms: f64,
    stats: SchedulerStats,
    total_faults: u64,
}

impl<C> FrameScheduler<C> {
    /// Creates an empty scheduler.
    ///
    /// A `tick_wrap` that is not a multiple of the longest band period is
    /// rounded down to one (at least one period), so every band keeps its
    /// cadence across the wrap.
    #[must_use]
    pub fn new(config: &SchedulerConfig) -> Self {
        let period = ThrottleBand::MAX_PERIOD;
        Self {
            tasks: Vec::with_capacity(256),
            index: HashMap::with_capacity(256),
            bands: ThrottleBands::from_config(config),
            tick: 0,
            tick_wrap: (config.tick_wrap / period).max(1) * period,
            elapsed_ms: 0.0,
            stats: SchedulerStats::default(),
            total_faults: 0,
        }
    }

    /// Registers a task, replacing any live task with the same id.
    ///
    /// Returns true if an existing task was replaced.
    pub fn register<F>(&mut self, id: TaskId, anchor: Vec2, priority: Priority, callback: F) -> bool
    where
        F: FnMut(&mut C, &TaskContext) -> Result<(), TaskFault> + 'static,
    {
        let entry = TaskEntry {
            id,
            anchor,
            priority,
            last_run_ms: None,
            callback: Box::new(callback),
        };

        if let Some(&slot) = self.index.get(&id) {
            self.tasks[slot] = entry;
            true
        } else {
            self.index.insert(id, self.tasks.len());
            self.tasks.push(entry);
            false
        }
    }

    /// Removes a task in O(1). It will not run again.
    ///
    /// Returns false if the id was not registered.
    pub fn unregister(&mut self, id: TaskId) -> bool {
        let Some(slot) = self.index.remove(&id) else {
            return false;
        };
        self.tasks.swap_remove(slot);
        if let Some(moved) = self.tasks.get(slot) {
            self.index.insert(moved.id, slot);
        }
        true
    }

    /// Moves a task's anchor (e.g. its entity walked). Returns false if unknown.
    pub fn set_anchor(&mut self, id: TaskId, anchor: Vec2) -> bool {
        match self.index.get(&id) {
            Some(&slot) => {
                self.tasks[slot].anchor = anchor;
                true
            }
            None => false,
        }
    }

    /// True if `id` is registered.
    #[must_use]
    pub fn contains(&self, id: TaskId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of registered tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True if no task is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Advances the shared counter and runs every task that is due.
    ///
    /// A callback that returns a [`TaskFault`] is logged and skipped for this
    /// tick; the remaining tasks still run.
    pub fn tick(&mut self, state: &mut C, delta_ms: f32, viewpoint: Vec2) -> SchedulerStats {
        self.tick = (self.tick + 1) % self.tick_wrap;
        self.elapsed_ms += f64::from(delta_ms);
        let mut stats = SchedulerStats::default();

        for entry in &mut self.tasks {
            let distance = viewpoint.distance(entry.anchor);
            if let Some(band) = self.bands.gate(distance, entry.priority) {
                if !band.is_due(self.tick) {
                    stats.throttled += 1;
                    continue;
                }
            }

            #[allow(clippy::cast_possible_truncation)]
            let since_last = entry
                .last_run_ms
                .map_or(delta_ms, |last| (self.elapsed_ms - last) as f32);
            entry.last_run_ms = Some(self.elapsed_ms);

            let context = TaskContext {
                delta_ms: since_last,
                elapsed_ms: self.elapsed_ms,
                distance,
                tick: self.tick,
            };

            match (entry.callback)(state, &context) {
                Ok(()) => stats.executed += 1,
                Err(fault) => {
                    stats.faulted += 1;
                    tracing::warn!(task = entry.id.0, error = %fault, "scheduled task faulted, skipped this tick");
                }
            }
        }

        self.total_faults += u64::from(stats.faulted);
        self.stats = stats;
        tracing::trace!(
            tick = self.tick,
            executed = stats.executed,
            throttled = stats.throttled,
            faulted = stats.faulted,
            "scheduler tick"
        );
        stats
    }

    /// Current value of the shared tick counter.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Milliseconds accumulated across all ticks.
    #[must_use]
    pub const fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Statistics from the last tick.
    #[must_use]
    pub const fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// Faults observed since creation.
    #[must_use]
    pub const fn total_faults(&self) -> u64 {
        self.total_faults
    }
}
