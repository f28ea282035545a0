//! Integration tests for effect lifetimes and animation smoothing boundaries.

use ember_core::{RewardKind, Vec2};
use ember_rendering::{EffectConfig, EffectParams, EffectPool, EntityAnimState, SpawnRequest};
use std::f32::consts::PI;

const T: f64 = 10_000.0;

fn spark(duration_ms: f64) -> SpawnRequest {
    SpawnRequest::new(
        Vec2::new(3.0, -2.0),
        duration_ms,
        EffectParams::Spark {
            velocity: Vec2::new(1.0, 1.0),
            lift: 2.0,
            gravity: 9.8,
        },
    )
}

#[test]
fn test_spark_expires_exactly_after_duration() {
    let mut pool = EffectPool::new(16);
    let id = pool.try_spawn(&spark(200.0), T).unwrap();

    let frames = pool.update(T + 199.0);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].id, id);

    assert!(pool.update(T + 201.0).is_empty());
    assert!(pool.get(id).is_none());
    assert_eq!(pool.stats().expired_last_update, 1);
}

#[test]
fn test_effect_position_depends_only_on_elapsed_time() {
    let mut smooth = EffectPool::new(4);
    let mut choppy = EffectPool::new(4);
    smooth.try_spawn(&spark(500.0), T).unwrap();
    choppy.try_spawn(&spark(500.0), T).unwrap();

    // One pool sampled every frame, the other only once
    for step in 1..=15 {
        smooth.update(T + f64::from(step) * 16.0);
    }
    choppy.update(T + 240.0);

    assert_eq!(smooth.frames()[0].position, choppy.frames()[0].position);
    assert_eq!(smooth.frames()[0].color, choppy.frames()[0].color);
}

#[test]
fn test_label_fade_tail_keeps_it_alive() {
    let fx = EffectConfig::default();
    let mut pool = EffectPool::new(4);
    let label = SpawnRequest::new(
        Vec2::ZERO,
        fx.label_duration_ms,
        EffectParams::FloatingText {
            amount: 120,
            reward: RewardKind::Gold,
            rise: 1.5,
        },
    )
    .with_fade(fx.label_fade_ms);
    pool.try_spawn(&label, T).unwrap();

    let fading = pool.update(T + fx.label_duration_ms + fx.label_fade_ms / 2.0)[0];
    assert!(fading.color[3] > 0.0 && fading.color[3] < 1.0);
    assert!(pool.update(T + fx.label_duration_ms + fx.label_fade_ms + 1.0).is_empty());
}

#[test]
fn test_projectile_duration_is_clamped() {
    let fx = EffectConfig::default();
    assert_eq!(fx.projectile_duration_ms(0.0), fx.projectile_min_ms);
    assert_eq!(fx.projectile_duration_ms(1.0e6), fx.projectile_max_ms);
    assert_eq!(fx.projectile_duration_ms(f32::INFINITY), fx.projectile_max_ms);
}

#[test]
fn test_heading_crosses_pi_boundary_the_short_way() {
    let mut anim = EntityAnimState::with_heading(Vec2::ZERO, 3.0);
    anim.steer(-3.0, 0.016, 10.0);

    let heading = anim.heading();
    // The short arc runs through +PI/-PI; the long one would pass through 0
    assert!(heading > 3.0 || heading < -3.0, "heading {heading} took the long arc");

    // Converges onto the target without ever sweeping back through 0
    for _ in 0..200 {
        anim.steer(-3.0, 0.016, 10.0);
        assert!(anim.heading().abs() > 2.9);
    }
    assert!((anim.heading() + 3.0).abs() < 1e-3);
    assert!(anim.heading().abs() <= PI);
}
