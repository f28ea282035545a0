//! # Presentation Demo - two seconds of a busy skirmish
//!
//! ```text
//! producer ──► EventFeed ──► EventLog (resends included)
//!                                │
//!                                ▼
//!            FrameDriver::tick (spawn → schedule → batches)
//! ```
//!
//! 300 avatars circle the camera while a single-threaded producer publishes
//! hits, crits, rewards and a level-up, resending some of them on purpose.

use ember_core::{event_channel, DomainEvent, EntityId, EventKind, EventPayload, RewardKind, SnapshotOracle, Vec2};
use ember_rendering::{
    EngineConfig, EntityState, FrameDriver, FrameInput, FrameResult, GroupKey, LiveEntity, Priority,
    TaskFault, TaskId,
};
use std::time::Instant;

const CONFIG: &str = r#"
[scheduler]
near_distance = 15.0
medium_distance = 30.0
far_distance = 60.0

[effects]
capacity = 256

[batches]
capacity = 128
"#;

const AVATARS: u64 = 300;
const FRAME_MS: f64 = 1000.0 / 60.0;

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("═══════════════════════════════════════════════════════════════");
    println!("   EMBER - Presentation Core Demo");
    println!("═══════════════════════════════════════════════════════════════");
    println!();

    let config = EngineConfig::from_toml_str(CONFIG)?;
    let mut driver = FrameDriver::new(&config, SnapshotOracle::new(100)?)?;
    let (feed, mut log) = event_channel(1024, 4096);

    // One nameplate task per avatar; far ones are throttled
    for id in 0..AVATARS {
        driver.register_task(TaskId(id), Vec2::ZERO, Priority::Normal, |stage, ctx| {
            if ctx.delta_ms.is_finite() && stage.now_ms() >= 0.0 {
                Ok(())
            } else {
                Err(TaskFault::NonFinite("nameplate delta"))
            }
        })?;
    }

    let mut live: Vec<LiveEntity> = (0..AVATARS)
        .map(|id| LiveEntity {
            id: EntityId(id),
            group: GroupKey((id % 2) as u32),
            state: EntityState {
                moving: true,
                ..EntityState::default()
            },
        })
        .collect();

    let mut totals = FrameResult {
        frame_number: 0,
        tick: 0,
        spawn: Default::default(),
        scheduler: Default::default(),
        effects_visible: 0,
        batches: Default::default(),
    };
    let start = Instant::now();

    for frame in 1..=120u32 {
        let now = f64::from(frame) * FRAME_MS;

        // Avatars walk in rings of growing radius around the camera
        for entity in &live {
            let ring = 5.0 + (entity.id.0 % 6) as f32 * 12.0;
            let angle = entity.id.0 as f32 * 0.7 + now as f32 * 0.0005;
            let position = Vec2::from_heading(angle) * ring;
            driver.oracle_mut().push_snapshot(entity.id, position, now);
            driver.set_task_anchor(TaskId(entity.id.0), position);
        }

        // Producer: a hit every frame, a crit every 10th, resend every 3rd
        let attacker = EntityId(u64::from(frame) % AVATARS);
        let victim = EntityId((u64::from(frame) * 7) % AVATARS);
        feed.publish(DomainEvent::new(format!("hit-{frame}").as_str(), EventKind::Damage, attacker, victim));
        if frame % 10 == 0 {
            feed.publish(
                DomainEvent::new(format!("crit-{frame}").as_str(), EventKind::Critical, attacker, victim)
                    .with_payload(EventPayload { amount: 90, ranged: true, ..EventPayload::default() }),
            );
            feed.publish(
                DomainEvent::new(format!("gold-{frame}").as_str(), EventKind::Reward, victim, attacker)
                    .with_payload(EventPayload { amount: 15, reward: RewardKind::Gold, ..EventPayload::default() }),
            );
        }
        if frame % 3 == 0 && frame > 1 {
            feed.publish(DomainEvent::new(format!("hit-{}", frame - 1).as_str(), EventKind::Damage, attacker, victim));
        }
        if frame == 60 {
            feed.publish(
                DomainEvent::new("level-up-hero", EventKind::LevelUp, EntityId(0), EntityId(0))
                    .with_payload(EventPayload { level: 12, ..EventPayload::default() }),
            );
        }
        log.poll()?;

        // Avatar 0 swings every half second
        if frame % 30 == 0 {
            live[0].state.last_attack_ms = Some(now);
            live[0].state.attack_target = Some(EntityId(1));
        }

        let result = driver.tick(&FrameInput {
            now_ms: now,
            delta_ms: FRAME_MS as f32,
            viewpoint: Vec2::ZERO,
            events: log.snapshot(),
            live: &live,
        });

        totals.spawn.new_events += result.spawn.new_events;
        totals.spawn.duplicates += result.spawn.duplicates;
        totals.spawn.spawned += result.spawn.spawned;
        totals.spawn.dropped_capacity += result.spawn.dropped_capacity;
        totals.scheduler.executed += result.scheduler.executed;
        totals.scheduler.throttled += result.scheduler.throttled;

        if frame % 30 == 0 {
            print_frame_result(&result);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("   120 frames in {:.2} ms ({:.1} µs/frame)", elapsed.as_secs_f64() * 1000.0, elapsed.as_secs_f64() * 1e6 / 120.0);
    println!("   Events: {} new, {} resent/rescanned", totals.spawn.new_events, totals.spawn.duplicates);
    println!("   Effects: {} spawned, {} dropped (pool full)", totals.spawn.spawned, totals.spawn.dropped_capacity);
    println!("   Tasks: {} executed, {} throttled", totals.scheduler.executed, totals.scheduler.throttled);
    println!("═══════════════════════════════════════════════════════════════");

    Ok(())
}

fn print_frame_result(result: &FrameResult) {
    println!(
        "FRAME {:>3} | tick {:>3} | new events {:>2} | effects {:>3} | drawn {:>3} (+{} overflow) | tasks run {:>3} / throttled {:>3}",
        result.frame_number,
        result.tick,
        result.spawn.new_events,
        result.effects_visible,
        result.batches.active,
        result.batches.overflow,
        result.scheduler.executed,
        result.scheduler.throttled,
    );
}
