//! Per-entity animation smoothing.
//!
//! Holds only what cannot be recomputed from the live set: the eased heading,
//! the walk phase, and which attack timestamp has already been played.

use super::renderer::EntityState;
use crate::config::BatchConfig;
use ember_core::{lerp_angle, Vec2};
use std::f32::consts::TAU;

/// Smoothing state of one tracked entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityAnimState {
    heading: f32,
    walk_phase: f32,
    last_position: Vec2,
    /// Last attack timestamp observed, played or not
    seen_attack_ms: Option<f64>,
    /// Clock time the current swing started
    swing_started_ms: Option<f64>,
    pub(crate) seen_tick: u64,
}

impl EntityAnimState {
    /// State for an entity seen for the first time.
    ///
    /// An attack already in the state only plays if it is still within one
    /// swing duration of `now_ms`, otherwise it is considered history.
    #[must_use]
    pub fn first_sighting(
        position: Vec2,
        state: &EntityState,
        now_ms: f64,
        config: &BatchConfig,
    ) -> Self {
        let swing_started_ms = state
            .last_attack_ms
            .filter(|ts| now_ms - ts < config.attack_duration_ms);
        Self {
            heading: 0.0,
            walk_phase: 0.0,
            last_position: position,
            seen_attack_ms: state.last_attack_ms,
            swing_started_ms,
            seen_tick: 0,
        }
    }

    /// State with a known heading and nothing else going on.
    #[must_use]
    pub const fn with_heading(position: Vec2, heading: f32) -> Self {
        Self {
            heading,
            walk_phase: 0.0,
            last_position: position,
            seen_attack_ms: None,
            swing_started_ms: None,
            seen_tick: 0,
        }
    }

    /// Advances by one rewrite.
    ///
    /// `facing` is the position of the current attack target, if any.
    pub fn advance(
        &mut self,
        position: Vec2,
        facing: Option<Vec2>,
        state: &EntityState,
        now_ms: f64,
        delta_ms: f32,
        config: &BatchConfig,
    ) {
        let dt = (delta_ms / 1000.0).max(0.0);
        let displacement = position - self.last_position;
        self.last_position = position;

        let target_heading = match facing {
            Some(target) if (target - position).length() > config.move_epsilon => {
                Some((target - position).heading())
            }
            _ if displacement.length() > config.move_epsilon => Some(displacement.heading()),
            _ => None,
        };
        if let Some(target) = target_heading {
            self.steer(target, dt, config.turn_rate);
        }

        if state.moving && !state.dead {
            self.walk_phase = (self.walk_phase + dt * config.walk_cycle_hz * TAU) % TAU;
        }

        // Compare timestamps, not flags: the same attack seen twice is one swing
        if state.last_attack_ms != self.seen_attack_ms {
            self.seen_attack_ms = state.last_attack_ms;
            if state.last_attack_ms.is_some() {
                self.swing_started_ms = Some(now_ms);
            }
        }
    }

    /// Eases the heading toward `target` along the shorter arc.
    pub fn steer(&mut self, target: f32, dt: f32, turn_rate: f32) {
        let blend = 1.0 - (-turn_rate * dt).exp();
        self.heading = lerp_angle(self.heading, target, blend);
    }

    /// Current heading in radians.
    #[must_use]
    pub const fn heading(&self) -> f32 {
        self.heading
    }

    /// Walk cycle phase in `[0, TAU)`.
    #[must_use]
    pub const fn walk_phase(&self) -> f32 {
        self.walk_phase
    }

    /// Swing progress in `[0, 1]`, or `None` when no swing is playing.
    #[must_use]
    pub fn swing_progress(&self, now_ms: f64, duration_ms: f64) -> Option<f32> {
        let started = self.swing_started_ms?;
        let elapsed = now_ms - started;
        #[allow(clippy::cast_possible_truncation)]
        let progress = (elapsed.max(0.0) / duration_ms) as f32;
        (elapsed <= duration_ms).then_some(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn config() -> BatchConfig {
        BatchConfig::default()
    }

    fn attacking(ts: f64) -> EntityState {
        EntityState {
            last_attack_ms: Some(ts),
            ..EntityState::default()
        }
    }

    #[test]
    fn test_steer_takes_short_arc_across_pi() {
        let mut anim = EntityAnimState::with_heading(Vec2::ZERO, 3.0);
        anim.steer(-3.0, 0.016, 10.0);
        let heading = anim.heading();
        // Moved through +PI (possibly wrapped to the negative side), never back toward 0
        assert!(heading > 3.0 || heading < -3.0, "heading went the long way: {heading}");
        assert!(heading.abs() <= PI);
    }

    #[test]
    fn test_walk_phase_only_advances_while_moving() {
        let cfg = config();
        let mut anim = EntityAnimState::with_heading(Vec2::ZERO, 0.0);
        let idle = EntityState::default();
        anim.advance(Vec2::ZERO, None, &idle, 16.0, 16.0, &cfg);
        assert_eq!(anim.walk_phase(), 0.0);

        let walking = EntityState {
            moving: true,
            ..EntityState::default()
        };
        anim.advance(Vec2::new(0.0, 0.1), None, &walking, 32.0, 16.0, &cfg);
        assert!(anim.walk_phase() > 0.0);
    }

    #[test]
    fn test_heading_follows_movement() {
        let cfg = config();
        let mut anim = EntityAnimState::with_heading(Vec2::ZERO, 0.0);
        let walking = EntityState {
            moving: true,
            ..EntityState::default()
        };
        for step in 1..=60 {
            anim.advance(Vec2::new(step as f32 * 0.1, 0.0), None, &walking, 0.0, 16.0, &cfg);
        }
        assert!((anim.heading() - PI / 2.0).abs() < 0.01);
    }

    #[test]
    fn test_same_timestamp_swings_once() {
        let cfg = config();
        let mut anim = EntityAnimState::with_heading(Vec2::ZERO, 0.0);
        anim.advance(Vec2::ZERO, None, &attacking(1_000.0), 1_000.0, 16.0, &cfg);
        assert!(anim.swing_progress(1_000.0, cfg.attack_duration_ms).is_some());

        // Swing ends; the unchanged timestamp must not re-arm it
        anim.advance(Vec2::ZERO, None, &attacking(1_000.0), 1_500.0, 16.0, &cfg);
        assert!(anim.swing_progress(1_500.0, cfg.attack_duration_ms).is_none());

        anim.advance(Vec2::ZERO, None, &attacking(1_600.0), 1_600.0, 16.0, &cfg);
        assert_eq!(anim.swing_progress(1_600.0, cfg.attack_duration_ms), Some(0.0));
    }

    #[test]
    fn test_first_sighting_ignores_stale_attack() {
        let cfg = config();
        let stale = EntityAnimState::first_sighting(Vec2::ZERO, &attacking(0.0), 5_000.0, &cfg);
        assert!(stale.swing_progress(5_000.0, cfg.attack_duration_ms).is_none());

        let fresh = EntityAnimState::first_sighting(Vec2::ZERO, &attacking(4_900.0), 5_000.0, &cfg);
        assert!(fresh.swing_progress(5_000.0, cfg.attack_duration_ms).is_some());
    }

    #[test]
    fn test_faces_attack_target() {
        let cfg = config();
        let mut anim = EntityAnimState::with_heading(Vec2::ZERO, 0.0);
        for _ in 0..120 {
            anim.advance(Vec2::ZERO, Some(Vec2::new(-5.0, 0.0)), &attacking(0.0), 0.0, 16.0, &cfg);
        }
        assert!((anim.heading() + PI / 2.0).abs() < 0.01);
    }
}
