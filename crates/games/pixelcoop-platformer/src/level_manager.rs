use serde::{Deserialize, Serialize};

use pixelcoop_core::boss::{BOSS_SIZE, Boss, BossConfig};
use pixelcoop_core::config::LEVEL_COUNT;
use pixelcoop_core::enemy::Enemy;
use pixelcoop_core::geometry::Rect;
use pixelcoop_core::patrol::Axis;
use pixelcoop_core::render::PLATFORMER_CANVAS;

use crate::layouts::build_level;
use crate::level::Level;

/// Level-2 play time between difficulty steps.
pub const DIFFICULTY_INTERVAL_SECS: f32 = 25.0;
/// Speed added to every enemy per difficulty step, as a fraction of base speed.
pub const SPEED_STEP: f32 = 0.25;

/// Boss hovers over the middle of the arena, clear of the spawn point.
const BOSS_POSITION: (f32, f32) = (400.0 - BOSS_SIZE / 2.0, 48.0);
/// Shockwaves start at the centre and slide along the arena floor.
const SHOCKWAVE_ORIGIN: (f32, f32) = (400.0, 336.0);

/// Level-2 patrol roster: two horizontal, two vertical.
const LEVEL_TWO_ENEMIES: [(f32, f32, Axis, f32, f32); 4] = [
    (200.0, 320.0, Axis::Horizontal, 160.0, 400.0),
    (500.0, 256.0, Axis::Horizontal, 450.0, 650.0),
    (320.0, 200.0, Axis::Vertical, 150.0, 350.0),
    (600.0, 100.0, Axis::Vertical, 80.0, 280.0),
];

/// Extra enemies that join one per difficulty step.
const RESERVE_ENEMIES: [(f32, f32, Axis, f32, f32); 3] = [
    (100.0, 160.0, Axis::Horizontal, 60.0, 300.0),
    (700.0, 220.0, Axis::Vertical, 160.0, 380.0),
    (420.0, 60.0, Axis::Horizontal, 300.0, 560.0),
];

fn spawn((x, y, axis, min, max): (f32, f32, Axis, f32, f32)) -> Enemy {
    Enemy::new(x, y, axis, min, max)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyInfo {
    pub difficulty: u32,
    pub enemy_count: usize,
    pub speed_multiplier: f32,
}

/// Owns the active level and everything that lives in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelManager {
    current: u8,
    level: Level,
    enemies: Vec<Enemy>,
    boss: Option<Boss>,
    difficulty: u32,
    difficulty_timer: f32,
}

impl LevelManager {
    pub fn new() -> Self {
        let mut manager = Self {
            current: 1,
            level: level_or_first(1),
            enemies: Vec::new(),
            boss: None,
            difficulty: 0,
            difficulty_timer: 0.0,
        };
        manager.enter();
        manager
    }

    pub fn current_level(&self) -> u8 {
        self.current
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.level
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn boss(&self) -> Option<&Boss> {
        self.boss.as_ref()
    }

    pub fn boss_mut(&mut self) -> Option<&mut Boss> {
        self.boss.as_mut()
    }

    pub fn is_last_level(&self) -> bool {
        self.current >= LEVEL_COUNT
    }

    /// Advance one level. Returns false on the last level.
    pub fn next_level(&mut self) -> bool {
        if self.is_last_level() {
            return false;
        }
        self.current += 1;
        self.enter();
        true
    }

    /// Rebuild the current level's geometry, enemies and boss.
    pub fn restart_current_level(&mut self) {
        self.enter();
    }

    pub fn reset(&mut self) {
        self.current = 1;
        self.enter();
    }

    /// Jump straight to level `n`. Unknown levels are rejected.
    pub fn set_level(&mut self, n: u8) -> bool {
        if !(1..=LEVEL_COUNT).contains(&n) {
            tracing::warn!(level = n, "Ignoring unknown level");
            return false;
        }
        self.current = n;
        self.enter();
        true
    }

    fn enter(&mut self) {
        self.level = level_or_first(self.current);
        self.difficulty = 0;
        self.difficulty_timer = 0.0;
        self.enemies = if self.current == 2 {
            LEVEL_TWO_ENEMIES.into_iter().map(spawn).collect()
        } else {
            Vec::new()
        };
        self.boss = self.level.has_boss().then(|| {
            let arena = Rect::new(0.0, 0.0, PLATFORMER_CANVAS.0, PLATFORMER_CANVAS.1);
            Boss::new(
                BOSS_POSITION.0,
                BOSS_POSITION.1,
                BossConfig::radial(arena, SHOCKWAVE_ORIGIN),
            )
        });
        tracing::debug!(level = self.current, enemies = self.enemies.len(), "Entered level");
    }

    pub fn update(&mut self, dt: f32) {
        self.level.update(dt);
        for enemy in &mut self.enemies {
            enemy.update(dt);
        }
        if self.current == 2 {
            self.difficulty_timer += dt;
            while self.difficulty_timer >= DIFFICULTY_INTERVAL_SECS {
                self.difficulty_timer -= DIFFICULTY_INTERVAL_SECS;
                self.escalate();
            }
        }
        if let Some(boss) = self.boss.as_mut() {
            boss.update(dt);
        }
    }

    fn escalate(&mut self) {
        self.difficulty += 1;
        let reserves_used = self.enemies.len().saturating_sub(LEVEL_TWO_ENEMIES.len());
        if let Some(&reserve) = RESERVE_ENEMIES.get(reserves_used) {
            self.enemies.push(spawn(reserve));
        }
        let multiplier = self.speed_multiplier();
        for enemy in &mut self.enemies {
            enemy.set_speed_multiplier(multiplier);
        }
        tracing::debug!(
            difficulty = self.difficulty,
            enemies = self.enemies.len(),
            multiplier,
            "Difficulty increased"
        );
    }

    fn speed_multiplier(&self) -> f32 {
        1.0 + SPEED_STEP * self.difficulty as f32
    }

    pub fn difficulty_info(&self) -> DifficultyInfo {
        DifficultyInfo {
            difficulty: self.difficulty,
            enemy_count: self.enemies.len(),
            speed_multiplier: self.speed_multiplier(),
        }
    }
}

impl Default for LevelManager {
    fn default() -> Self {
        Self::new()
    }
}

fn level_or_first(id: u8) -> Level {
    match build_level(id).or_else(|| build_level(1)) {
        Some(level) => level,
        None => Level::from_rects(id, (0.0, 0.0), &[], &[], &[]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelcoop_core::enemy::ENEMY_SPEED;

    #[test]
    fn progression_stops_at_the_arena() {
        let mut manager = LevelManager::new();
        assert_eq!(manager.current_level(), 1);
        assert!(manager.enemies().is_empty());
        assert!(manager.next_level());
        assert_eq!(manager.enemies().len(), 4, "Level 2 spawns its patrol");
        assert!(manager.next_level());
        assert!(manager.enemies().is_empty());
        assert!(manager.next_level());
        assert!(manager.boss().is_some());
        assert!(!manager.next_level(), "No level after the arena");
        assert_eq!(manager.current_level(), 4);

        manager.reset();
        assert_eq!(manager.current_level(), 1);
        assert!(manager.boss().is_none());
    }

    #[test]
    fn set_level_validates() {
        let mut manager = LevelManager::new();
        assert!(!manager.set_level(0));
        assert!(!manager.set_level(5));
        assert_eq!(manager.current_level(), 1);
        assert!(manager.set_level(3));
        assert_eq!(manager.level().id, 3);
    }

    #[test]
    fn difficulty_steps_every_25_seconds_on_level_two() {
        let mut manager = LevelManager::new();
        manager.set_level(2);
        for _ in 0..(24 * 60) {
            manager.update(1.0 / 60.0);
        }
        assert_eq!(manager.difficulty_info().difficulty, 0);

        for _ in 0..(2 * 60) {
            manager.update(1.0 / 60.0);
        }
        let info = manager.difficulty_info();
        assert_eq!(info.difficulty, 1);
        assert_eq!(info.enemy_count, 5);
        assert_eq!(info.speed_multiplier, 1.25);
        for enemy in manager.enemies() {
            assert_eq!(enemy.patrol.velocity.abs(), ENEMY_SPEED * 1.25);
        }
    }

    #[test]
    fn reserves_cap_at_three() {
        let mut manager = LevelManager::new();
        manager.set_level(2);
        manager.update(DIFFICULTY_INTERVAL_SECS * 5.0);
        let info = manager.difficulty_info();
        assert_eq!(info.difficulty, 5);
        assert_eq!(info.enemy_count, 7, "Four base enemies plus three reserves");
        assert_eq!(info.speed_multiplier, 2.25);
    }

    #[test]
    fn difficulty_only_escalates_on_level_two() {
        let mut manager = LevelManager::new();
        manager.update(100.0);
        assert_eq!(manager.difficulty_info().difficulty, 0);
    }

    #[test]
    fn restart_resets_difficulty_and_boss() {
        let mut manager = LevelManager::new();
        manager.set_level(2);
        manager.update(DIFFICULTY_INTERVAL_SECS);
        manager.restart_current_level();
        assert_eq!(manager.difficulty_info().difficulty, 0);
        assert_eq!(manager.enemies().len(), 4);

        manager.set_level(4);
        if let Some(boss) = manager.boss_mut() {
            boss.take_damage(30);
        }
        manager.restart_current_level();
        assert_eq!(manager.boss().map(|b| b.health()), Some(100));
    }
}
