//! Effect records and their motion curves.
//!
//! An effect never stores animation state. Every query recomputes its
//! transform from `now - spawn_ms`, so a dropped frame cannot desynchronize it.

use ember_core::{ease_in, ease_out, RewardKind, Vec2};

/// Height at which hit effects appear above the ground.
const HIT_HEIGHT: f32 = 1.0;
/// Height at which floating labels start.
const LABEL_HEIGHT: f32 = 2.2;
/// Height at which level-up banners start.
const BANNER_HEIGHT: f32 = 3.0;

/// Identifier assigned by the pool on spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EffectId(pub u64);

/// Visual category of an effect, ordered by how much it matters to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum EffectKind {
    /// Small hit spark (lowest value, dropped first).
    Spark = 0,
    /// Respawn ring particle converging on the entity.
    Converge = 1,
    /// Critical-hit explosion particle.
    Explosion = 2,
    /// Ranged attack travelling from attacker to target.
    Projectile = 3,
    /// Respawn light flash.
    Flash = 4,
    /// Floating reward number.
    FloatingText = 5,
    /// Level-up banner (highest value).
    Banner = 6,
}

impl EffectKind {
    /// Every kind, most valuable first. Admission order under pool pressure.
    pub const BY_VALUE_DESC: [Self; 7] = [
        Self::Banner,
        Self::FloatingText,
        Self::Flash,
        Self::Projectile,
        Self::Explosion,
        Self::Converge,
        Self::Spark,
    ];

    /// Base color (RGB)
    #[must_use]
    pub const fn base_color(self) -> [f32; 3] {
        match self {
            Self::Spark => [1.0, 0.55, 0.1],      // Orange
            Self::Converge => [0.6, 0.9, 1.0],    // Pale cyan
            Self::Explosion => [1.0, 0.9, 0.2],   // Yellow
            Self::Projectile => [0.9, 0.9, 1.0],  // White-blue
            Self::Flash => [1.0, 1.0, 0.95],      // White
            Self::FloatingText => [0.4, 1.0, 0.4], // Green
            Self::Banner => [1.0, 0.8, 0.2],      // Gold
        }
    }
}

/// Kind-specific motion parameters, fixed at spawn time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectParams {
    /// Thrown spark with a gravity arc.
    Spark {
        /// Ground velocity, units per second.
        velocity: Vec2,
        /// Initial upward speed, units per second.
        lift: f32,
        /// Downward acceleration.
        gravity: f32,
    },
    /// Explosion particle slowed by drag.
    Explosion {
        /// Initial ground velocity.
        velocity: Vec2,
        /// Initial upward speed.
        lift: f32,
        /// Downward acceleration.
        gravity: f32,
        /// Exponential drag coefficient per second.
        drag: f32,
    },
    /// Expanding light flash.
    Flash {
        /// Final radius.
        radius: f32,
    },
    /// Particle travelling from a ring point into the origin.
    Converge {
        /// Angle of the starting ring point.
        angle: f32,
        /// Ring radius.
        radius: f32,
    },
    /// Rising reward number.
    FloatingText {
        /// Amount shown.
        amount: i64,
        /// Currency, decides the color.
        reward: RewardKind,
        /// Total rise over the effect's duration.
        rise: f32,
    },
    /// Rising level-up banner.
    Banner {
        /// Level reached.
        level: u32,
        /// Total rise over the effect's duration.
        rise: f32,
    },
    /// Projectile flying to a fixed impact point.
    Projectile {
        /// Impact point.
        target: Vec2,
        /// Peak height of the flight arc above the launch height.
        arc_height: f32,
    },
}

impl EffectParams {
    /// The visual kind these parameters describe.
    #[must_use]
    pub const fn kind(&self) -> EffectKind {
        match self {
            Self::Spark { .. } => EffectKind::Spark,
            Self::Explosion { .. } => EffectKind::Explosion,
            Self::Flash { .. } => EffectKind::Flash,
            Self::Converge { .. } => EffectKind::Converge,
            Self::FloatingText { .. } => EffectKind::FloatingText,
            Self::Banner { .. } => EffectKind::Banner,
            Self::Projectile { .. } => EffectKind::Projectile,
        }
    }
}

/// Everything needed to spawn an effect except its id and spawn time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    /// Ground position the effect starts from.
    pub origin: Vec2,
    /// Main animation time.
    pub duration_ms: f64,
    /// Fade-out tail after the main animation.
    pub fade_ms: f64,
    /// Motion parameters.
    pub params: EffectParams,
}

impl SpawnRequest {
    /// Creates a request without a fade tail.
    #[must_use]
    pub const fn new(origin: Vec2, duration_ms: f64, params: EffectParams) -> Self {
        Self {
            origin,
            duration_ms,
            fade_ms: 0.0,
            params,
        }
    }

    /// Adds a fade-out tail.
    #[must_use]
    pub const fn with_fade(mut self, fade_ms: f64) -> Self {
        self.fade_ms = fade_ms;
        self
    }

    /// Visual kind of the requested effect.
    #[must_use]
    pub const fn kind(&self) -> EffectKind {
        self.params.kind()
    }
}

/// A live, self-expiring effect record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectInstance {
    /// Pool-assigned id.
    pub id: EffectId,
    /// Ground position the effect starts from.
    pub origin: Vec2,
    /// Clock time of the spawn.
    pub spawn_ms: f64,
    /// Main animation time.
    pub duration_ms: f64,
    /// Fade-out tail after the main animation.
    pub fade_ms: f64,
    /// Motion parameters.
    pub params: EffectParams,
}

/// Renderable state of one effect at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectFrame {
    /// Effect this frame belongs to.
    pub id: EffectId,
    /// Visual kind.
    pub kind: EffectKind,
    /// World position (x, height, z).
    pub position: [f32; 3],
    /// Uniform scale.
    pub scale: f32,
    /// RGBA, alpha carries the opacity.
    pub color: [f32; 4],
}

impl EffectInstance {
    /// Binds a request to an id and spawn time.
    #[must_use]
    pub const fn from_request(id: EffectId, request: &SpawnRequest, spawn_ms: f64) -> Self {
        Self {
            id,
            origin: request.origin,
            spawn_ms,
            duration_ms: request.duration_ms,
            fade_ms: request.fade_ms,
            params: request.params,
        }
    }

    /// Visual kind.
    #[must_use]
    pub const fn kind(&self) -> EffectKind {
        self.params.kind()
    }

    /// True while `now_ms` is within duration plus fade tail.
    #[must_use]
    pub fn is_alive(&self, now_ms: f64) -> bool {
        now_ms - self.spawn_ms <= self.duration_ms + self.fade_ms
    }

    /// Transform at `now_ms`, or `None` once expired.
    #[must_use]
    pub fn sample(&self, now_ms: f64) -> Option<EffectFrame> {
        if !self.is_alive(now_ms) {
            return None;
        }

        let age_ms = (now_ms - self.spawn_ms).max(0.0);
        #[allow(clippy::cast_possible_truncation)]
        let (t, progress, fade) = (
            (age_ms / 1000.0) as f32,
            (age_ms / self.duration_ms).min(1.0) as f32,
            self.fade_alpha(age_ms) as f32,
        );

        let (ground, height, scale, opacity) = match self.params {
            EffectParams::Spark { velocity, lift, gravity } => {
                let ground = self.origin + velocity * t;
                let height = (HIT_HEIGHT + lift * t - 0.5 * gravity * t * t).max(0.0);
                (ground, height, 0.15 * (1.0 - 0.5 * progress), 1.0 - progress)
            }
            EffectParams::Explosion { velocity, lift, gravity, drag } => {
                let travel = if drag > 0.0 { (1.0 - (-drag * t).exp()) / drag } else { t };
                let ground = self.origin + velocity * travel;
                let height = (HIT_HEIGHT + lift * travel - 0.5 * gravity * t * t).max(0.0);
                (ground, height, 0.3 * (1.0 + progress), 1.0 - progress * progress)
            }
            EffectParams::Flash { radius } => {
                (self.origin, HIT_HEIGHT, radius * ease_out(progress), 1.0 - progress)
            }
            EffectParams::Converge { angle, radius } => {
                let start = self.origin + Vec2::from_heading(angle) * radius;
                let ground = start.lerp(self.origin, ease_in(progress));
                (ground, 0.2 + 1.5 * progress, 0.12, progress.max(0.2))
            }
            EffectParams::FloatingText { rise, .. } => {
                (self.origin, LABEL_HEIGHT + rise * ease_out(progress), 1.0, fade)
            }
            EffectParams::Banner { rise, .. } => {
                let pop = 1.0 + 0.5 * (1.0 - ease_out(progress));
                (self.origin, BANNER_HEIGHT + rise * ease_out(progress), pop, fade)
            }
            EffectParams::Projectile { target, arc_height } => {
                let ground = self.origin.lerp(target, progress);
                let height = HIT_HEIGHT + 4.0 * arc_height * progress * (1.0 - progress);
                (ground, height, 0.25, 1.0)
            }
        };

        let rgb = self.color();
        Some(EffectFrame {
            id: self.id,
            kind: self.kind(),
            position: [ground.x, height, ground.z],
            scale,
            color: [rgb[0], rgb[1], rgb[2], opacity.clamp(0.0, 1.0)],
        })
    }

    /// Opacity from the fade tail: 1 during the main animation, then linear to 0.
    fn fade_alpha(&self, age_ms: f64) -> f64 {
        if age_ms <= self.duration_ms || self.fade_ms <= 0.0 {
            1.0
        } else {
            (1.0 - (age_ms - self.duration_ms) / self.fade_ms).max(0.0)
        }
    }

    fn color(&self) -> [f32; 3] {
        match self.params {
            EffectParams::FloatingText { reward: RewardKind::Gold, .. } => [1.0, 0.85, 0.1],
            _ => self.kind().base_color(),
        }
    }
}
