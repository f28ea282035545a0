//! Event -> visual effect spawner
//!
//! Scans the full event log every tick, spawns effects for events it has
//! never seen and ignores the rest. The mapping is a fixed table:
//!
//! | event      | visual                                   |
//! |------------|------------------------------------------|
//! | `damage`   | spark burst (+ projectile when ranged)   |
//! | `critical` | explosion burst (+ projectile when ranged)|
//! | `respawn`  | light flash + converging ring            |
//! | `reward`   | floating label                           |
//! | `level_up` | banner + spark burst                     |
//! | others     | nothing                                  |
//!
//! Burst shapes come from a ChaCha8 stream seeded by the event id, so the
//! same event always looks the same. Requests are staged per tick and
//! admitted most valuable kind first; whatever does not fit is dropped.

use super::instance::{EffectKind, EffectParams, SpawnRequest};
use super::pool::EffectPool;
use super::registry::ProcessedEventRegistry;
use crate::config::{EffectConfig, SpawnConfig};
use ember_core::{DomainEvent, EventId, EventKind, PositionOracle, ScratchPool, Vec2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f32::consts::TAU;

/// Staging buffers retained between ticks.
const STAGING_RETAINED: usize = 2;
/// Total rise of a reward label.
const LABEL_RISE: f32 = 1.5;
/// Total rise of a level-up banner.
const BANNER_RISE: f32 = 2.0;
/// Final radius of a respawn flash.
const FLASH_RADIUS: f32 = 3.0;
/// Drag applied to explosion particles, per second.
const EXPLOSION_DRAG: f32 = 3.0;
/// Projectile arc height per unit of distance travelled.
const ARC_PER_UNIT: f32 = 0.08;

/// Outcome of one ingest pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    /// Events seen for the first time.
    pub new_events: usize,
    /// Events skipped because they were processed earlier.
    pub duplicates: usize,
    /// New events whose kind has no visual.
    pub inert: usize,
    /// New events whose target position could not be resolved.
    pub unresolved: usize,
    /// Effects admitted into the pool.
    pub spawned: usize,
    /// Effects dropped because the pool was full.
    pub dropped_capacity: usize,
}

/// Idempotent event-to-effect spawner.
#[derive(Debug)]
pub struct EffectSpawner {
    registry: ProcessedEventRegistry,
    spawn: SpawnConfig,
    effects: EffectConfig,
    staging: ScratchPool<Vec<SpawnRequest>>,
}

impl EffectSpawner {
    /// Creates a spawner with an empty registry.
    #[must_use]
    pub fn new(spawn: SpawnConfig, effects: EffectConfig) -> Self {
        Self {
            registry: ProcessedEventRegistry::new(
                spawn.registry_capacity,
                spawn.registry_keep_fraction,
            ),
            spawn,
            effects,
            staging: ScratchPool::with_prewarmed(STAGING_RETAINED),
        }
    }

    /// Processes the whole log, spawning effects for unseen events.
    ///
    /// Every unseen event is marked processed, including inert ones and ones
    /// whose target the oracle cannot place. Spawned effects are live in
    /// `pool` immediately, so an update later in the same tick shows them.
    ///
    /// `log` may be any slice. Events that came through
    /// [`ember_core::EventLog::poll`] also get the registry watermark.
    pub fn ingest<O>(
        &mut self,
        log: &[DomainEvent],
        oracle: &O,
        now_ms: f64,
        pool: &mut EffectPool,
    ) -> SpawnReport
    where
        O: PositionOracle + ?Sized,
    {
        let mut report = SpawnReport::default();
        let mut staged = self.staging.acquire();

        for event in log {
            if !self.registry.mark(event) {
                report.duplicates += 1;
                continue;
            }
            report.new_events += 1;

            if !has_visual(event.kind) {
                report.inert += 1;
                continue;
            }

            let Some(target) = oracle.resolve(event.target, now_ms) else {
                report.unresolved += 1;
                tracing::debug!(event = %event.id, target = %event.target, "target unresolved, event dropped");
                continue;
            };

            self.stage(event, target, oracle, now_ms, &mut staged);
        }

        // Most valuable kind first; arrival order within a kind
        for kind in EffectKind::BY_VALUE_DESC {
            for request in staged.iter().filter(|request| request.kind() == kind) {
                if pool.try_spawn(request, now_ms).is_some() {
                    report.spawned += 1;
                } else {
                    report.dropped_capacity += 1;
                }
            }
        }

        if report.dropped_capacity > 0 {
            tracing::debug!(
                dropped = report.dropped_capacity,
                capacity = pool.capacity(),
                "effect pool full, low-value effects dropped"
            );
        }

        self.staging.release(staged);
        report
    }

    /// The processed-id registry.
    #[must_use]
    pub const fn registry(&self) -> &ProcessedEventRegistry {
        &self.registry
    }

    fn stage<O>(
        &self,
        event: &DomainEvent,
        target: Vec2,
        oracle: &O,
        now_ms: f64,
        out: &mut Vec<SpawnRequest>,
    ) where
        O: PositionOracle + ?Sized,
    {
        let mut rng = ChaCha8Rng::seed_from_u64(event_seed(&event.id));
        let fx = &self.effects;

        match event.kind {
            EventKind::Damage => {
                let punch = 1.0 + damage_scale(event.payload.amount);
                self.burst(&mut rng, target, self.spawn.spark_count, punch, out);
                if event.payload.ranged {
                    stage_projectile(fx, event, target, oracle, now_ms, out);
                }
            }
            EventKind::Critical => {
                for _ in 0..self.spawn.explosion_count {
                    let heading = rng.gen_range(0.0..TAU);
                    let speed = rng.gen_range(4.0_f32..8.0);
                    out.push(SpawnRequest::new(
                        target,
                        fx.explosion_duration_ms,
                        EffectParams::Explosion {
                            velocity: Vec2::from_heading(heading) * speed,
                            lift: rng.gen_range(3.0..6.0),
                            gravity: fx.gravity,
                            drag: EXPLOSION_DRAG,
                        },
                    ));
                }
                if event.payload.ranged {
                    stage_projectile(fx, event, target, oracle, now_ms, out);
                }
            }
            EventKind::Respawn => {
                out.push(SpawnRequest::new(
                    target,
                    fx.flash_duration_ms,
                    EffectParams::Flash { radius: FLASH_RADIUS },
                ));
                let count = self.spawn.converge_count.max(1);
                let offset = rng.gen_range(0.0..TAU);
                for i in 0..count {
                    #[allow(clippy::cast_precision_loss)]
                    let angle = offset + TAU * i as f32 / count as f32;
                    out.push(SpawnRequest::new(
                        target,
                        fx.converge_duration_ms,
                        EffectParams::Converge {
                            angle,
                            radius: self.spawn.converge_radius,
                        },
                    ));
                }
            }
            EventKind::Reward => {
                out.push(
                    SpawnRequest::new(
                        target,
                        fx.label_duration_ms,
                        EffectParams::FloatingText {
                            amount: event.payload.amount,
                            reward: event.payload.reward,
                            rise: LABEL_RISE,
                        },
                    )
                    .with_fade(fx.label_fade_ms),
                );
            }
            EventKind::LevelUp => {
                out.push(
                    SpawnRequest::new(
                        target,
                        fx.banner_duration_ms,
                        EffectParams::Banner {
                            level: event.payload.level,
                            rise: BANNER_RISE,
                        },
                    )
                    .with_fade(fx.banner_fade_ms),
                );
                self.burst(&mut rng, target, self.spawn.banner_spark_count, 1.0, out);
            }
            EventKind::Miss | EventKind::Heal | EventKind::Death => {}
        }
    }

    fn burst(
        &self,
        rng: &mut ChaCha8Rng,
        origin: Vec2,
        count: u32,
        punch: f32,
        out: &mut Vec<SpawnRequest>,
    ) {
        for _ in 0..count {
            let heading = rng.gen_range(0.0..TAU);
            let speed = rng.gen_range(2.5_f32..4.5) * punch;
            out.push(SpawnRequest::new(
                origin,
                self.effects.spark_duration_ms,
                EffectParams::Spark {
                    velocity: Vec2::from_heading(heading) * speed,
                    lift: rng.gen_range(2.0..4.0),
                    gravity: self.effects.gravity,
                },
            ));
        }
    }
}

/// Whether an event kind maps to any visual.
const fn has_visual(kind: EventKind) -> bool {
    matches!(
        kind,
        EventKind::Damage
            | EventKind::Critical
            | EventKind::Respawn
            | EventKind::Reward
            | EventKind::LevelUp
    )
}

/// Projectile from the attacker to the impact point. Skipped when the
/// attacker cannot be placed; the hit burst still plays.
fn stage_projectile<O>(
    fx: &EffectConfig,
    event: &DomainEvent,
    target: Vec2,
    oracle: &O,
    now_ms: f64,
    out: &mut Vec<SpawnRequest>,
) where
    O: PositionOracle + ?Sized,
{
    let Some(source) = oracle.resolve(event.subject, now_ms) else {
        return;
    };
    let distance = source.distance(target);
    out.push(SpawnRequest::new(
        source,
        fx.projectile_duration_ms(distance),
        EffectParams::Projectile {
            target,
            arc_height: distance * ARC_PER_UNIT,
        },
    ));
}

/// Bigger hits throw sparks harder, up to double speed.
#[allow(clippy::cast_precision_loss)]
fn damage_scale(amount: i64) -> f32 {
    amount.clamp(0, 200) as f32 / 200.0
}

/// FNV-1a over the id bytes. Stable across runs and platforms.
fn event_seed(id: &EventId) -> u64 {
    id.as_str()
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
        })
}
