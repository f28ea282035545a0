//! Distance bands and task priorities.

use crate::config::SchedulerConfig;

/// Execution priority of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    /// Runs every tick regardless of distance.
    High,
    /// Gated by its distance band.
    #[default]
    Normal,
    /// Gated one band coarser than its distance implies.
    Low,
}

/// Distance-derived execution frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ThrottleBand {
    /// Every tick.
    Near,
    /// Every 2nd tick.
    Medium,
    /// Every 4th tick.
    Far,
    /// Every 8th tick.
    VeryFar,
}

impl ThrottleBand {
    /// Slowest period of any band. The tick counter wraps at a multiple of it.
    pub const MAX_PERIOD: u64 = 8;

    /// Ticks between executions.
    #[must_use]
    pub const fn period(self) -> u64 {
        match self {
            Self::Near => 1,
            Self::Medium => 2,
            Self::Far => 4,
            Self::VeryFar => 8,
        }
    }

    /// The next slower band, saturating at [`ThrottleBand::VeryFar`].
    #[must_use]
    pub const fn coarser(self) -> Self {
        match self {
            Self::Near => Self::Medium,
            Self::Medium => Self::Far,
            Self::Far | Self::VeryFar => Self::VeryFar,
        }
    }

    /// True if a task in this band runs on `tick`.
    #[inline]
    #[must_use]
    pub const fn is_due(self, tick: u64) -> bool {
        tick % self.period() == 0
    }
}

/// Distance thresholds separating the four bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottleBands {
    near: f32,
    medium: f32,
    far: f32,
}

impl ThrottleBands {
    /// Creates bands from validated config.
    #[must_use]
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self {
            near: config.near_distance,
            medium: config.medium_distance,
            far: config.far_distance,
        }
    }

    /// Band for a task at `distance` from the viewpoint.
    #[must_use]
    pub fn classify(&self, distance: f32) -> ThrottleBand {
        if distance < self.near {
            ThrottleBand::Near
        } else if distance < self.medium {
            ThrottleBand::Medium
        } else if distance < self.far {
            ThrottleBand::Far
        } else {
            ThrottleBand::VeryFar
        }
    }

    /// Band after applying `priority`, or `None` for high priority.
    #[must_use]
    pub fn gate(&self, distance: f32, priority: Priority) -> Option<ThrottleBand> {
        match priority {
            Priority::High => None,
            Priority::Normal => Some(self.classify(distance)),
            Priority::Low => Some(self.classify(distance).coarser()),
        }
    }
}

impl Default for ThrottleBands {
    fn default() -> Self {
        Self::from_config(&SchedulerConfig::default())
    }
}
