//! # Engine Configuration
//!
//! Every tuning value of the presentation core, loaded once at startup from
//! TOML. All fields default, so an empty document is a valid config:
//!
//! ```toml
//! [scheduler]
//! near_distance = 20.0
//! medium_distance = 40.0
//! far_distance = 80.0
//!
//! [effects]
//! capacity = 1024
//! projectile_min_ms = 100.0
//! projectile_max_ms = 2000.0
//!
//! [batches]
//! capacity = 500
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Distance bands and counter wrap for the frame scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Below this distance tasks run every tick.
    pub near_distance: f32,
    /// Below this distance tasks run every 2nd tick.
    pub medium_distance: f32,
    /// Below this distance tasks run every 4th tick; beyond, every 8th.
    pub far_distance: f32,
    /// The tick counter wraps to zero at this value. Must be a multiple of 8.
    pub tick_wrap: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            near_distance: 20.0,
            medium_distance: 40.0,
            far_distance: 80.0,
            tick_wrap: 1 << 20,
        }
    }
}

/// Pool capacity and per-kind lifetimes of effect instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Maximum live effect instances.
    pub capacity: usize,
    /// Spark lifetime.
    pub spark_duration_ms: f64,
    /// Explosion particle lifetime.
    pub explosion_duration_ms: f64,
    /// Respawn flash lifetime.
    pub flash_duration_ms: f64,
    /// Converging ring particle lifetime.
    pub converge_duration_ms: f64,
    /// Floating label rise time.
    pub label_duration_ms: f64,
    /// Floating label fade-out tail.
    pub label_fade_ms: f64,
    /// Level-up banner hold time.
    pub banner_duration_ms: f64,
    /// Level-up banner fade-out tail.
    pub banner_fade_ms: f64,
    /// Nominal projectile speed in world units per second.
    pub projectile_speed: f32,
    /// Shortest projectile flight.
    pub projectile_min_ms: f64,
    /// Longest projectile flight.
    pub projectile_max_ms: f64,
    /// Downward acceleration for thrown particles, units per second squared.
    pub gravity: f32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            spark_duration_ms: 450.0,
            explosion_duration_ms: 700.0,
            flash_duration_ms: 350.0,
            converge_duration_ms: 800.0,
            label_duration_ms: 1200.0,
            label_fade_ms: 300.0,
            banner_duration_ms: 2000.0,
            banner_fade_ms: 500.0,
            projectile_speed: 30.0,
            projectile_min_ms: 100.0,
            projectile_max_ms: 2000.0,
            gravity: 9.8,
        }
    }
}

impl EffectConfig {
    /// Flight time for a projectile covering `distance`, clamped to the window.
    #[must_use]
    pub fn projectile_duration_ms(&self, distance: f32) -> f64 {
        let raw = f64::from(distance / self.projectile_speed) * 1000.0;
        if raw.is_finite() {
            // clamp() panics on a NaN bound
            raw.max(self.projectile_min_ms).min(self.projectile_max_ms)
        } else {
            self.projectile_max_ms
        }
    }
}

/// Dedup registry bounds and burst sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Processed ids remembered before truncation.
    pub registry_capacity: usize,
    /// Fraction of most-recent ids kept when truncating.
    pub registry_keep_fraction: f32,
    /// Sparks per damage burst.
    pub spark_count: u32,
    /// Particles per critical explosion.
    pub explosion_count: u32,
    /// Particles in a respawn ring.
    pub converge_count: u32,
    /// Sparks around a level-up banner.
    pub banner_spark_count: u32,
    /// Radius of the respawn ring.
    pub converge_radius: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            registry_capacity: 2000,
            registry_keep_fraction: 0.5,
            spark_count: 6,
            explosion_count: 12,
            converge_count: 10,
            banner_spark_count: 8,
            converge_radius: 2.5,
        }
    }
}

/// Instanced batch capacity and avatar animation tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Slots per grouping key.
    pub capacity: usize,
    /// Heading smoothing rate per second. Higher turns faster.
    pub turn_rate: f32,
    /// Walk cycles per second while moving.
    pub walk_cycle_hz: f32,
    /// Length of one attack swing.
    pub attack_duration_ms: f64,
    /// Minimum per-tick displacement that counts as movement.
    pub move_epsilon: f32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            capacity: 500,
            turn_rate: 10.0,
            walk_cycle_hz: 2.0,
            attack_duration_ms: 400.0,
            move_epsilon: 0.001,
        }
    }
}

/// Complete configuration of the presentation core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Frame scheduler.
    pub scheduler: SchedulerConfig,
    /// Effect pool.
    pub effects: EffectConfig,
    /// Event deduplicator and spawner.
    pub spawn: SpawnConfig,
    /// Instanced batch renderer.
    pub batches: BatchConfig,
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and a validation
    /// variant for semantically invalid values.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`EngineConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks every cross-field and range constraint.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> ConfigResult<()> {
        let s = &self.scheduler;
        if !(s.near_distance > 0.0 && s.near_distance < s.medium_distance && s.medium_distance < s.far_distance)
        {
            return Err(ConfigError::BandsNotIncreasing {
                near: s.near_distance,
                medium: s.medium_distance,
                far: s.far_distance,
            });
        }
        if s.tick_wrap == 0 || s.tick_wrap % 8 != 0 {
            return Err(ConfigError::TickWrap(s.tick_wrap));
        }

        let e = &self.effects;
        if e.capacity == 0 {
            return Err(ConfigError::ZeroCapacity("effects.capacity"));
        }
        for (field, value) in [
            ("effects.spark_duration_ms", e.spark_duration_ms),
            ("effects.explosion_duration_ms", e.explosion_duration_ms),
            ("effects.flash_duration_ms", e.flash_duration_ms),
            ("effects.converge_duration_ms", e.converge_duration_ms),
            ("effects.label_duration_ms", e.label_duration_ms),
            ("effects.banner_duration_ms", e.banner_duration_ms),
            ("effects.projectile_speed", f64::from(e.projectile_speed)),
            ("effects.projectile_min_ms", e.projectile_min_ms),
            ("effects.projectile_max_ms", e.projectile_max_ms),
        ] {
            positive(field, value)?;
        }
        for (field, value) in [
            ("effects.label_fade_ms", e.label_fade_ms),
            ("effects.banner_fade_ms", e.banner_fade_ms),
            ("effects.gravity", f64::from(e.gravity)),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if e.projectile_min_ms > e.projectile_max_ms {
            return Err(ConfigError::ProjectileClamp {
                min_ms: e.projectile_min_ms,
                max_ms: e.projectile_max_ms,
            });
        }

        let sp = &self.spawn;
        if sp.registry_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("spawn.registry_capacity"));
        }
        if !(sp.registry_keep_fraction > 0.0 && sp.registry_keep_fraction < 1.0) {
            return Err(ConfigError::KeepFraction(sp.registry_keep_fraction));
        }
        positive("spawn.converge_radius", f64::from(sp.converge_radius))?;

        let b = &self.batches;
        if b.capacity == 0 {
            return Err(ConfigError::ZeroCapacity("batches.capacity"));
        }
        positive("batches.turn_rate", f64::from(b.turn_rate))?;
        positive("batches.walk_cycle_hz", f64::from(b.walk_cycle_hz))?;
        positive("batches.attack_duration_ms", b.attack_duration_ms)?;

        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_toml_str(
            r"
            [batches]
            capacity = 64

            [spawn]
            registry_capacity = 10
            ",
        )
        .unwrap();

        assert_eq!(config.batches.capacity, 64);
        assert_eq!(config.spawn.registry_capacity, 10);
        assert_eq!(config.effects.capacity, EffectConfig::default().capacity);
    }

    #[test]
    fn test_bands_must_increase() {
        let err = EngineConfig::from_toml_str(
            r"
            [scheduler]
            near_distance = 50.0
            medium_distance = 40.0
            ",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::BandsNotIncreasing { .. }));
    }

    #[test]
    fn test_tick_wrap_multiple_of_eight() {
        let err = EngineConfig::from_toml_str("[scheduler]\ntick_wrap = 12").unwrap_err();
        assert!(matches!(err, ConfigError::TickWrap(12)));
    }

    #[test]
    fn test_keep_fraction_bounds() {
        let err = EngineConfig::from_toml_str("[spawn]\nregistry_keep_fraction = 1.0").unwrap_err();
        assert!(matches!(err, ConfigError::KeepFraction(_)));
    }

    #[test]
    fn test_inverted_projectile_clamp() {
        let err = EngineConfig::from_toml_str(
            "[effects]\nprojectile_min_ms = 500.0\nprojectile_max_ms = 200.0",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ProjectileClamp { .. }));
    }

    #[test]
    fn test_nan_projectile_max_rejected() {
        let err = EngineConfig::from_toml_str("[effects]\nprojectile_max_ms = nan").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NonPositive {
                field: "effects.projectile_max_ms",
                ..
            }
        ));
    }

    #[test]
    fn test_projectile_duration_with_nan_bound() {
        let effects = EffectConfig {
            projectile_max_ms: f64::NAN,
            ..EffectConfig::default()
        };
        assert_eq!(effects.projectile_duration_ms(15.0), 500.0);
    }

    #[test]
    fn test_zero_capacity() {
        let err = EngineConfig::from_toml_str("[effects]\ncapacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroCapacity("effects.capacity")));
    }

    #[test]
    fn test_syntax_error() {
        let err = EngineConfig::from_toml_str("[effects\ncapacity = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::load("/definitely/not/here/ember.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_projectile_duration_clamped() {
        let effects = EffectConfig::default();
        assert_eq!(effects.projectile_duration_ms(0.0), 100.0);
        assert_eq!(effects.projectile_duration_ms(10_000.0), 2000.0);
        let mid = effects.projectile_duration_ms(15.0);
        assert!((mid - 500.0).abs() < 1e-6);
    }
}
