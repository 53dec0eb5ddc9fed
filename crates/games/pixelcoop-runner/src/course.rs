use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use pixelcoop_core::boss::{BOSS_MAX_HEALTH, Boss, BossConfig};
use pixelcoop_core::geometry::Rect;
use pixelcoop_core::render::RUNNER_CANVAS;

use crate::obstacle::{Obstacle, Pickup, PickupKind};
use crate::spawner::{self, Theme, Wave};

/// Seconds each boss-rush theme lasts.
pub const THEME_SECS: f32 = 8.0;
/// Boss-rush pickups appear with this chance per second.
const BOSS_PICKUP_RATE: f32 = 0.3;
/// Damage an attack-boss pickup deals.
pub const ATTACK_BOSS_DAMAGE: u32 = 10;
const BOSS_POSITION: (f32, f32) = (700.0, 80.0);

/// The five runner courses, numbered 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseKind {
    Forest,
    Pipes,
    Bombs,
    Rainbow,
    BossRush,
}

impl CourseKind {
    pub const ALL: [CourseKind; 5] = [
        CourseKind::Forest,
        CourseKind::Pipes,
        CourseKind::Bombs,
        CourseKind::Rainbow,
        CourseKind::BossRush,
    ];

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }

    pub fn number(self) -> u8 {
        match self {
            CourseKind::Forest => 1,
            CourseKind::Pipes => 2,
            CourseKind::Bombs => 3,
            CourseKind::Rainbow => 4,
            CourseKind::BossRush => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CourseKind::Forest => "Forest Run",
            CourseKind::Pipes => "Pipe Dash",
            CourseKind::Bombs => "Bomb Alley",
            CourseKind::Rainbow => "Rainbow Road",
            CourseKind::BossRush => "Boss Rush",
        }
    }

    /// Metres to cover. The boss rush ends on the boss instead.
    pub fn target_distance(self) -> Option<f32> {
        match self {
            CourseKind::Forest => Some(500.0),
            CourseKind::Pipes => Some(800.0),
            CourseKind::Bombs | CourseKind::Rainbow => Some(1300.0),
            CourseKind::BossRush => None,
        }
    }
}

/// Speed curve of the distance-ramped courses: speed and spawn interval move
/// one step per 50 m.
struct Ramp {
    base_speed: f32,
    start_interval: f32,
    interval_step: f32,
    min_interval: f32,
}

fn ramp(kind: CourseKind) -> Option<Ramp> {
    let (base_speed, start_interval, interval_step, min_interval) = match kind {
        CourseKind::Pipes => (280.0, 2.0, 0.04, 1.2),
        CourseKind::Bombs => (260.0, 1.8, 0.04, 1.0),
        CourseKind::Rainbow => (270.0, 1.6, 0.03, 1.0),
        CourseKind::Forest | CourseKind::BossRush => return None,
    };
    Some(Ramp {
        base_speed,
        start_interval,
        interval_step,
        min_interval,
    })
}

/// One scrolling course: its hazards, pickups, counters and, for the boss
/// rush, the boss.
#[derive(Debug, Clone)]
pub struct RunnerCourse {
    kind: CourseKind,
    seed: u64,
    rng: StdRng,
    scroll_speed: f32,
    distance: f32,
    difficulty: f32,
    spawn_timer: f32,
    spawn_interval: f32,
    obstacles: Vec<Obstacle>,
    pickups: Vec<Pickup>,
    coins: u32,
    items: u32,
    theme: Theme,
    theme_timer: f32,
    boss: Option<Boss>,
}

impl RunnerCourse {
    pub fn new(kind: CourseKind, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let opening = match kind {
            CourseKind::Forest => spawner::forest_opening(&mut rng),
            _ => Wave::default(),
        };
        let boss = (kind == CourseKind::BossRush).then(|| {
            let arena = Rect::new(0.0, 0.0, RUNNER_CANVAS.0, RUNNER_CANVAS.1);
            Boss::new(BOSS_POSITION.0, BOSS_POSITION.1, BossConfig::barrage(arena))
        });
        let mut course = Self {
            kind,
            seed,
            rng,
            scroll_speed: 0.0,
            distance: 0.0,
            difficulty: 1.0,
            spawn_timer: 0.0,
            spawn_interval: 2.0,
            obstacles: opening.obstacles,
            pickups: opening.pickups,
            coins: 0,
            items: 0,
            theme: Theme::Forest,
            theme_timer: 0.0,
            boss,
        };
        course.retune();
        tracing::debug!(course = kind.name(), seed, "Course started");
        course
    }

    /// Start over with the same seed, replaying the same obstacles.
    pub fn reset(&mut self) {
        *self = Self::new(self.kind, self.seed);
    }

    pub fn kind(&self) -> CourseKind {
        self.kind
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn scroll_speed(&self) -> f32 {
        self.scroll_speed
    }

    pub fn spawn_interval(&self) -> f32 {
        self.spawn_interval
    }

    pub fn difficulty(&self) -> f32 {
        self.difficulty
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn obstacles_mut(&mut self) -> &mut Vec<Obstacle> {
        &mut self.obstacles
    }

    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    pub fn pickups_mut(&mut self) -> &mut Vec<Pickup> {
        &mut self.pickups
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    /// Non-coin pickups collected so far.
    pub fn items(&self) -> u32 {
        self.items
    }

    pub fn record_pickup(&mut self, kind: PickupKind) {
        if kind == PickupKind::Coin {
            self.coins += 1;
        } else {
            self.items += 1;
        }
    }

    /// Current boss-rush theme. Other courses report `None`.
    pub fn theme(&self) -> Option<Theme> {
        (self.kind == CourseKind::BossRush).then_some(self.theme)
    }

    pub fn boss(&self) -> Option<&Boss> {
        self.boss.as_ref()
    }

    pub fn boss_mut(&mut self) -> Option<&mut Boss> {
        self.boss.as_mut()
    }

    /// Progress toward the finish, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        match (self.kind.target_distance(), self.boss.as_ref()) {
            (Some(target), _) => (self.distance / target).min(1.0),
            (None, Some(boss)) => 1.0 - boss.health() as f32 / BOSS_MAX_HEALTH as f32,
            (None, None) => 0.0,
        }
    }

    pub fn is_complete(&self) -> bool {
        match self.kind.target_distance() {
            Some(target) => self.distance >= target,
            None => self.boss.as_ref().is_some_and(|b| b.is_defeated()),
        }
    }

    fn boss_phase(&self) -> u8 {
        self.boss.as_ref().map_or(1, |b| b.phase())
    }

    /// Recompute speed, spawn interval and difficulty from distance (or boss
    /// phase).
    fn retune(&mut self) {
        match self.kind {
            CourseKind::Forest => {
                self.difficulty = 1.0 + self.distance / 100.0;
                self.scroll_speed = 150.0 + self.difficulty * 20.0;
                self.spawn_interval = (2.0 - self.difficulty * 0.1).max(1.0);
            },
            CourseKind::BossRush => {
                let phase = f32::from(self.boss_phase());
                self.difficulty = phase;
                self.scroll_speed = 280.0 + (3.0 - phase) * -20.0 + phase * 30.0;
                self.spawn_interval = (1.8 - phase * 0.2).max(1.0);
            },
            kind => {
                if let Some(ramp) = ramp(kind) {
                    let steps = (self.distance / 50.0).floor();
                    self.difficulty = 1.0 + steps;
                    self.scroll_speed = ramp.base_speed + steps * 1.5;
                    self.spawn_interval =
                        (ramp.start_interval - steps * ramp.interval_step).max(ramp.min_interval);
                }
            },
        }
    }

    /// Advance the course. Returns how many bombs detonated.
    pub fn update(&mut self, dt: f32) -> usize {
        let metres_per_px = if self.kind == CourseKind::Forest { 100.0 } else { 10.0 };
        self.distance += self.scroll_speed * dt / metres_per_px;
        if self.kind == CourseKind::BossRush {
            self.theme_timer += dt;
            if self.theme_timer >= THEME_SECS {
                self.theme_timer = 0.0;
                self.theme = self.theme.next();
                tracing::debug!(theme = ?self.theme, "Boss rush theme changed");
            }
        }
        self.retune();

        let scroll = self.scroll_speed;
        let mut detonations = 0;
        for obstacle in &mut self.obstacles {
            if obstacle.update(dt, scroll) {
                detonations += 1;
            }
        }
        let forest = self.kind == CourseKind::Forest;
        self.obstacles.retain(|o| {
            let gone = if forest { o.x + o.width < -50.0 } else { o.x < -100.0 };
            !gone && !o.is_spent()
        });

        for pickup in &mut self.pickups {
            pickup.x -= scroll * dt;
        }
        self.pickups.retain(|p| !p.collected && p.x >= -50.0);

        self.spawn_timer += dt;
        if self.spawn_timer >= self.spawn_interval {
            self.spawn_timer = 0.0;
            let wave = self.next_wave();
            self.obstacles.extend(wave.obstacles);
            self.pickups.extend(wave.pickups);
        }

        self.update_boss(dt);
        detonations
    }

    fn next_wave(&mut self) -> Wave {
        let rng = &mut self.rng;
        match self.kind {
            CourseKind::Forest => spawner::forest(rng, self.difficulty),
            CourseKind::Pipes => spawner::pipes(rng),
            CourseKind::Bombs => spawner::bombs(rng),
            CourseKind::Rainbow => spawner::rainbow(rng),
            CourseKind::BossRush => spawner::boss_rush(rng, self.theme),
        }
    }

    fn update_boss(&mut self, dt: f32) {
        let Some(boss) = self.boss.as_mut() else {
            return;
        };
        boss.update(dt);
        for shot in boss.drain_projectiles() {
            self.obstacles.push(spawner::boss_shot(&mut self.rng, &shot));
        }
        if !boss.is_defeated() && self.rng.random::<f32>() < dt * BOSS_PICKUP_RATE {
            self.pickups.push(spawner::boss_pickup(&mut self.rng));
        }
    }
}
