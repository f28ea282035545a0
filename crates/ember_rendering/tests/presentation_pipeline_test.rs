//! Integration tests for the per-frame presentation pipeline.

use ember_core::{event_channel, DomainEvent, EntityId, EventKind, EventPayload, SnapshotOracle, Vec2};
use ember_rendering::{
    BodyPart, EffectKind, EngineConfig, EntityState, FrameDriver, FrameInput, FrameResult,
    GroupKey, LiveEntity, Priority, TaskId,
};
use std::cell::Cell;
use std::rc::Rc;

const HERO: EntityId = EntityId(1);
const SLIME: EntityId = EntityId(2);
const FRAME_MS: f64 = 16.0;

fn oracle() -> SnapshotOracle {
    let mut oracle = SnapshotOracle::new(100).unwrap();
    oracle.push_snapshot(HERO, Vec2::new(0.0, 0.0), 0.0);
    oracle.push_snapshot(SLIME, Vec2::new(4.0, 3.0), 0.0);
    oracle
}

fn driver_with(config: &EngineConfig) -> FrameDriver<SnapshotOracle> {
    FrameDriver::new(config, oracle()).unwrap()
}

fn frame(driver: &mut FrameDriver<SnapshotOracle>, n: u32, events: &[DomainEvent], live: &[LiveEntity]) -> FrameResult {
    driver.tick(&FrameInput {
        now_ms: f64::from(n) * FRAME_MS,
        delta_ms: 16.0,
        viewpoint: Vec2::ZERO,
        events,
        live,
    })
}

fn combat_log() -> Vec<DomainEvent> {
    vec![
        DomainEvent::new("dmg-1", EventKind::Damage, HERO, SLIME),
        DomainEvent::new("exp-1", EventKind::Reward, SLIME, HERO)
            .with_payload(EventPayload {
                amount: 40,
                ..EventPayload::default()
            }),
        DomainEvent::new("lvl-1", EventKind::LevelUp, HERO, HERO)
            .with_payload(EventPayload {
                level: 7,
                ..EventPayload::default()
            }),
    ]
}

#[test]
fn test_rescanning_log_never_duplicates_effects() {
    let mut driver = driver_with(&EngineConfig::default());
    let log = combat_log();

    let first = frame(&mut driver, 1, &log, &[]);
    assert_eq!(first.spawn.new_events, 3);
    let spawned_once = first.spawn.spawned;

    // Same log, then resent and reordered
    let mut resent = log.clone();
    resent.reverse();
    resent.extend(log.iter().cloned());

    let mut total = spawned_once;
    for n in 2..=50 {
        let events = if n % 2 == 0 { &log } else { &resent };
        let result = frame(&mut driver, n, events, &[]);
        assert_eq!(result.spawn.new_events, 0);
        total += result.spawn.spawned;
    }
    assert_eq!(total, spawned_once);
}

#[test]
fn test_new_effect_visible_in_same_tick() {
    let mut driver = driver_with(&EngineConfig::default());
    frame(&mut driver, 1, &[], &[]);

    let log = [DomainEvent::new("gold-1", EventKind::Reward, SLIME, HERO)];
    let result = frame(&mut driver, 2, &log, &[]);

    assert_eq!(result.effects_visible, 1);
    assert_eq!(driver.effect_frames()[0].kind, EffectKind::FloatingText);
}

#[test]
fn test_full_pool_drops_lowest_value_kinds() {
    let config = EngineConfig::from_toml_str("[effects]\ncapacity = 4\n").unwrap();
    let mut driver = driver_with(&config);

    let result = frame(&mut driver, 1, &combat_log(), &[]);
    // 6 damage sparks + 1 label + 1 banner + 8 banner sparks
    assert_eq!(result.spawn.spawned, 4);
    assert_eq!(result.spawn.dropped_capacity, 12);

    let kinds: Vec<_> = driver.effect_frames().iter().map(|fx| fx.kind).collect();
    assert!(kinds.contains(&EffectKind::Banner));
    assert!(kinds.contains(&EffectKind::FloatingText));
    assert_eq!(kinds.iter().filter(|kind| **kind == EffectKind::Spark).count(), 2);

    for n in 2..20 {
        let burst = [DomainEvent::new(format!("crit-{n}").as_str(), EventKind::Critical, HERO, SLIME)];
        frame(&mut driver, n, &burst, &[]);
        assert!(driver.stage().effects().len() <= 4);
    }
}

#[test]
fn test_unresolvable_target_is_dropped_for_good() {
    let mut driver = driver_with(&EngineConfig::default());
    let ghost = EntityId(404);
    let log = [DomainEvent::new("ghost-hit", EventKind::Damage, HERO, ghost)];

    let result = frame(&mut driver, 1, &log, &[]);
    assert_eq!(result.spawn.unresolved, 1);
    assert_eq!(result.effects_visible, 0);

    driver.oracle_mut().push_snapshot(ghost, Vec2::new(1.0, 1.0), 20.0);
    let retry = frame(&mut driver, 2, &log, &[]);
    assert_eq!(retry.spawn.duplicates, 1);
    assert_eq!(retry.effects_visible, 0);
}

#[test]
fn test_truncated_registry_does_not_resurrect_events() {
    let config = EngineConfig::from_toml_str("[spawn]\nregistry_capacity = 8\n").unwrap();
    let mut driver = driver_with(&config);
    let (feed, mut log) = event_channel(64, 64);

    for n in 0..20 {
        assert!(feed.publish(DomainEvent::new(format!("r-{n}").as_str(), EventKind::Reward, SLIME, HERO)));
    }
    assert_eq!(log.poll().unwrap(), 20);

    let first = frame(&mut driver, 1, log.snapshot(), &[]);
    assert_eq!(first.spawn.new_events, 20);
    assert!(driver.spawner().registry().len() <= 8);

    let second = frame(&mut driver, 2, log.snapshot(), &[]);
    assert_eq!(second.spawn.new_events, 0);
    assert_eq!(second.spawn.duplicates, 20);
}

#[test]
fn test_unpolled_events_survive_registry_truncation() {
    let config = EngineConfig::from_toml_str("[spawn]\nregistry_capacity = 8\n").unwrap();
    let mut driver = driver_with(&config);

    for n in 1..=9 {
        let log = [DomainEvent::new(format!("gold-{n}").as_str(), EventKind::Reward, SLIME, HERO)];
        let result = frame(&mut driver, n, &log, &[]);
        assert_eq!(result.spawn.new_events, 1);
    }
    assert!(driver.spawner().registry().len() < 8);

    let fresh = [DomainEvent::new("gold-fresh", EventKind::Reward, SLIME, HERO)];
    let result = frame(&mut driver, 10, &fresh, &[]);
    assert_eq!(result.spawn.new_events, 1);
    assert_eq!(result.spawn.duplicates, 0);
    assert_eq!(result.spawn.spawned, 1);
}

#[test]
fn test_late_arrival_after_truncation_is_spawned() {
    let config = EngineConfig::from_toml_str("[spawn]\nregistry_capacity = 8\n").unwrap();
    let mut driver = driver_with(&config);
    let (feed, mut log) = event_channel(64, 64);

    for n in 1..=20 {
        feed.publish(DomainEvent::new(format!("r-{n}").as_str(), EventKind::Reward, SLIME, HERO));
    }
    log.poll().unwrap();
    frame(&mut driver, 1, log.snapshot(), &[]);
    assert!(driver.spawner().registry().watermark().is_some());

    // Produced before r-1 but delivered only now
    feed.publish(DomainEvent::new("r-0", EventKind::Reward, SLIME, HERO));
    log.poll().unwrap();

    let mut reordered = log.snapshot().to_vec();
    reordered.reverse();
    let result = frame(&mut driver, 2, &reordered, &[]);
    assert_eq!(result.spawn.new_events, 1);
    assert_eq!(result.spawn.duplicates, 20);
    assert_eq!(result.spawn.spawned, 1);

    let again = frame(&mut driver, 3, log.snapshot(), &[]);
    assert_eq!(again.spawn.new_events, 0);
}

#[test]
fn test_far_task_runs_once_every_four_ticks() {
    let mut driver = driver_with(&EngineConfig::default());
    let runs = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&runs);

    // 60 units away: beyond medium (40), inside far (80)
    driver
        .register_task(TaskId(1), Vec2::new(60.0, 0.0), Priority::Normal, move |_, _| {
            counter.set(counter.get() + 1);
            Ok(())
        })
        .unwrap();

    for n in 1..=100 {
        frame(&mut driver, n, &[], &[]);
    }
    assert_eq!(runs.get(), 25);
}

#[test]
fn test_removed_entity_slot_is_reclaimed() {
    let mut driver = driver_with(&EngineConfig::default());
    let mut live: Vec<LiveEntity> = (100..600u64)
        .map(|id| LiveEntity {
            id: EntityId(id),
            group: GroupKey(0),
            state: EntityState::default(),
        })
        .collect();
    for entity in &live {
        #[allow(clippy::cast_precision_loss)]
        let x = entity.id.0 as f32;
        driver.oracle_mut().push_snapshot(entity.id, Vec2::new(x, 0.0), 0.0);
    }

    let full = frame(&mut driver, 1, &[], &live);
    assert_eq!(full.batches.active, 500);
    assert_eq!(full.batches.overflow, 0);

    live.remove(123);
    let result = frame(&mut driver, 2, &[], &live);
    assert_eq!(result.batches.active, 499);
    assert_eq!(result.batches.purged, 1);

    let batch = driver.stage().batches().batch(GroupKey(0)).unwrap();
    assert_eq!(batch.active_count(), 499);
    for part in BodyPart::ALL {
        let slot = batch.instances(part)[499];
        assert_eq!(slot.scale(), 0.0);
        assert!(!batch.instances(part)[498].is_hidden());
    }
}

#[test]
fn test_batch_overflow_is_reported() {
    let config = EngineConfig::from_toml_str("[batches]\ncapacity = 2\n").unwrap();
    let mut driver = driver_with(&config);
    // HERO is listed twice and must take one slot
    let live: Vec<LiveEntity> = [HERO, SLIME, HERO, EntityId(3)]
        .iter()
        .map(|&id| LiveEntity {
            id,
            group: GroupKey(9),
            state: EntityState::default(),
        })
        .collect();
    driver.oracle_mut().push_snapshot(EntityId(3), Vec2::new(9.0, 9.0), 0.0);

    let result = frame(&mut driver, 1, &[], &live);
    assert_eq!(result.batches.active, 2);
    assert_eq!(result.batches.overflow, 1);
    assert_eq!(driver.stage().batches().batch(GroupKey(9)).unwrap().overflow(), &[EntityId(3)]);
}

#[test]
fn test_attack_rearms_only_on_new_timestamp() {
    let mut driver = driver_with(&EngineConfig::default());
    let attack_duration = EngineConfig::default().batches.attack_duration_ms;
    let attacker = |ts: f64| {
        [LiveEntity {
            id: HERO,
            group: GroupKey(0),
            state: EntityState {
                last_attack_ms: Some(ts),
                attack_target: Some(SLIME),
                ..EntityState::default()
            },
        }]
    };
    let swing = |driver: &FrameDriver<SnapshotOracle>, now: f64| {
        driver
            .stage()
            .batches()
            .batch(GroupKey(0))
            .and_then(|batch| batch.anim_state(HERO))
            .and_then(|anim| anim.swing_progress(now, attack_duration))
    };

    // Frame 10 is t = 160 ms
    frame(&mut driver, 10, &[], &attacker(160.0));
    assert_eq!(swing(&driver, 160.0), Some(0.0));

    // Swing finished; same timestamp again does not replay it
    frame(&mut driver, 50, &[], &attacker(160.0));
    assert_eq!(swing(&driver, 800.0), None);
    frame(&mut driver, 51, &[], &attacker(160.0));
    assert_eq!(swing(&driver, 816.0), None);

    // A genuinely new attack always plays
    frame(&mut driver, 52, &[], &attacker(830.0));
    assert_eq!(swing(&driver, 832.0), Some(0.0));
}
