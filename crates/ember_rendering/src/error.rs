//! # Rendering Error Types
//!
//! Configuration and driver setup errors surface at startup. Task faults are the only error
//! the tick path produces, and the scheduler swallows them after logging.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or validating an [`EngineConfig`](crate::EngineConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML text could not be parsed.
    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A capacity that must hold at least one element is zero.
    #[error("{0} must be greater than zero")]
    ZeroCapacity(&'static str),

    /// A duration, speed or rate is zero, negative or not finite.
    #[error("{field} must be positive and finite, got {value}")]
    NonPositive {
        /// Offending field.
        field: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Distance bands must satisfy `0 < near < medium < far`.
    #[error("distance bands must increase: near {near}, medium {medium}, far {far}")]
    BandsNotIncreasing {
        /// Near band upper bound.
        near: f32,
        /// Medium band upper bound.
        medium: f32,
        /// Far band upper bound.
        far: f32,
    },

    /// The tick counter must wrap at a multiple of the slowest throttle period.
    #[error("tick wrap {0} is not a positive multiple of 8")]
    TickWrap(u64),

    /// The registry keep fraction must be strictly between 0 and 1.
    #[error("registry keep fraction {0} outside (0, 1)")]
    KeepFraction(f32),

    /// Projectile clamp bounds are inverted.
    #[error("projectile clamp inverted: min {min_ms} ms > max {max_ms} ms")]
    ProjectileClamp {
        /// Lower bound.
        min_ms: f64,
        /// Upper bound.
        max_ms: f64,
    },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from building or extending a [`FrameDriver`](crate::FrameDriver).
#[derive(Error, Debug)]
pub enum DriverError {
    /// The engine config failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The task id belongs to a built-in stage.
    #[error("task id {0} is reserved for built-in stages")]
    ReservedTask(u64),
}

/// Result type for frame driver setup.
pub type DriverResult<T> = Result<T, DriverError>;

/// Error a scheduled callback reports instead of aborting the tick.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskFault {
    /// A value the callback depends on was NaN or infinite.
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    /// Any other callback-specific failure.
    #[error("{0}")]
    Failed(String),
}

impl TaskFault {
    /// Creates a [`TaskFault::Failed`] from a message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
