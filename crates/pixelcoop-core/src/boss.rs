use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::projectile::{Projectile, ProjectileKind};

pub const BOSS_SIZE: f32 = 128.0;
pub const BOSS_MAX_HEALTH: u32 = 100;
/// Horizontal speed of each half of a shockwave pair.
pub const SHOCKWAVE_SPEED: f32 = 150.0;
/// Vertical spacing between barrage shots.
const BARRAGE_SPACING: f32 = 40.0;
/// Barrage shots leave this far below the boss's top edge.
const BARRAGE_DROP: f32 = 50.0;

/// Phase for a health value: above 70 is phase 1, above 40 is phase 2, else phase 3.
pub fn phase_for_health(health: u32) -> u8 {
    if health > 70 {
        1
    } else if health > 40 {
        2
    } else {
        3
    }
}

/// How the boss attacks when its timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackPattern {
    /// Ring of orbs from the centre plus ground shockwaves from phase 2.
    Radial,
    /// A vertical fan of `phase + 2` shots handed to the caller.
    Barrage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossConfig {
    /// Seconds between attacks for phases 1, 2 and 3.
    pub attack_intervals: [f32; 3],
    pub pattern: AttackPattern,
    /// Projectiles leaving this area (plus their size) are destroyed.
    pub arena: Rect,
    /// Spawn point of shockwave pairs (x centre, y top of the wave).
    pub shockwave_origin: (f32, f32),
}

impl BossConfig {
    /// Arena boss: attacks every 3s, 1.5s in phase 3.
    pub fn radial(arena: Rect, shockwave_origin: (f32, f32)) -> Self {
        Self {
            attack_intervals: [3.0, 3.0, 1.5],
            pattern: AttackPattern::Radial,
            arena,
            shockwave_origin,
        }
    }

    /// Runner finale boss: interval is `max(1.5, 3 - phase * 0.5)`.
    pub fn barrage(arena: Rect) -> Self {
        let interval = |phase: f32| (3.0 - phase * 0.5).max(1.5);
        Self {
            attack_intervals: [interval(1.0), interval(2.0), interval(3.0)],
            pattern: AttackPattern::Barrage,
            arena,
            shockwave_origin: (arena.center().0, arena.bottom()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    pub x: f32,
    pub y: f32,
    health: u32,
    phase: u8,
    defeated: bool,
    attack_timer: f32,
    /// Simulated seconds since spawn, used to space shockwaves.
    clock: f32,
    last_shockwave_at: Option<f32>,
    pub animation_time: f32,
    pub defeat_timer: f32,
    projectiles: Vec<Projectile>,
    config: BossConfig,
}

impl Boss {
    pub fn new(x: f32, y: f32, config: BossConfig) -> Self {
        Self {
            x,
            y,
            health: BOSS_MAX_HEALTH,
            phase: 1,
            defeated: false,
            attack_timer: 0.0,
            clock: 0.0,
            last_shockwave_at: None,
            animation_time: 0.0,
            defeat_timer: 0.0,
            projectiles: Vec::new(),
            config,
        }
    }

    /// Full health, phase 1, no projectiles.
    pub fn reset(&mut self) {
        *self = Self::new(self.x, self.y, self.config.clone());
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn health_percentage(&self) -> f32 {
        self.health as f32 / BOSS_MAX_HEALTH as f32 * 100.0
    }

    pub fn phase(&self) -> u8 {
        self.phase
    }

    pub fn is_defeated(&self) -> bool {
        self.defeated
    }

    pub fn attack_interval(&self) -> f32 {
        self.config.attack_intervals[usize::from(self.phase.clamp(1, 3)) - 1]
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, BOSS_SIZE, BOSS_SIZE)
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn remove_projectile(&mut self, index: usize) -> Option<Projectile> {
        (index < self.projectiles.len()).then(|| self.projectiles.remove(index))
    }

    /// Hand over every pending shot. Barrage callers turn these into their
    /// own scrolling hazards.
    pub fn drain_projectiles(&mut self) -> Vec<Projectile> {
        std::mem::take(&mut self.projectiles)
    }

    pub fn take_damage(&mut self, amount: u32) {
        if self.defeated {
            return;
        }
        self.health = self.health.saturating_sub(amount);
        self.animation_time = 0.0;
        self.phase = phase_for_health(self.health);
        if self.health == 0 {
            self.defeated = true;
            tracing::info!("Boss defeated");
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.defeated {
            self.defeat_timer += dt;
            return;
        }

        self.clock += dt;
        self.animation_time += dt;
        self.phase = phase_for_health(self.health);

        self.attack_timer += dt;
        if self.attack_timer >= self.attack_interval() {
            self.perform_attack();
            self.attack_timer = 0.0;
        }

        let arena = self.config.arena;
        self.projectiles.retain_mut(|p| {
            p.update(dt);
            !p.should_destroy(&arena)
        });
    }

    fn perform_attack(&mut self) {
        match self.config.pattern {
            AttackPattern::Radial => {
                let (speed, count) = match self.phase {
                    1 => (80.0, 3),
                    2 => (120.0, 5),
                    _ => (160.0, 7),
                };
                self.shoot_ring(speed, count);

                let gap = match self.phase {
                    1 => None,
                    2 => Some(6.0),
                    _ => Some(3.0),
                };
                if let Some(gap) = gap
                    && self.last_shockwave_at.is_none_or(|t| self.clock - t > gap)
                {
                    self.spawn_shockwaves();
                    self.last_shockwave_at = Some(self.clock);
                }
            },
            AttackPattern::Barrage => {
                let count = u32::from(self.phase) + 2;
                let mid = (count - 1) as f32 / 2.0;
                for i in 0..count {
                    let offset = (i as f32 - mid) * BARRAGE_SPACING;
                    self.projectiles.push(Projectile::new(
                        self.x,
                        self.y + BARRAGE_DROP + offset,
                        0.0,
                        0.0,
                        ProjectileKind::Orb,
                    ));
                }
            },
        }
    }

    fn shoot_ring(&mut self, speed: f32, count: u32) {
        let (cx, cy) = self.bounds().center();
        let (w, h) = ProjectileKind::Orb.size();
        for i in 0..count {
            let angle = TAU * i as f32 / count as f32;
            self.projectiles.push(Projectile::new(
                cx - w / 2.0,
                cy - h / 2.0,
                angle.cos() * speed,
                angle.sin() * speed,
                ProjectileKind::Orb,
            ));
        }
    }

    fn spawn_shockwaves(&mut self) {
        let (x, y) = self.config.shockwave_origin;
        for vx in [-SHOCKWAVE_SPEED, SHOCKWAVE_SPEED] {
            self.projectiles
                .push(Projectile::new(x, y, vx, 0.0, ProjectileKind::Shockwave));
        }
    }
}
