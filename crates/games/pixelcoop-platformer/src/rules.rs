use serde::{Deserialize, Serialize};

use pixelcoop_core::boss::Boss;
use pixelcoop_core::config::MAX_PLAYERS;
use pixelcoop_core::enemy::Enemy;
use pixelcoop_core::events::GameEvent;
use pixelcoop_core::game_trait::{ModeMetadata, ModeRules, TickOutcome};
use pixelcoop_core::geometry::{Rect, is_colliding};
use pixelcoop_core::input::{JumpType, PlayerInput};
use pixelcoop_core::player::Player;
use pixelcoop_core::powerup::PowerUp;
use pixelcoop_core::projectile::ProjectileKind;
use pixelcoop_core::render::{Color, DrawSurface, PLATFORMER_CANVAS};
use pixelcoop_core::sound::SoundCue;

use crate::level::{Button, ButtonId, TileKind};
use crate::level_manager::{DifficultyInfo, LevelManager};

/// Horizontal gap between neighbouring spawn slots.
const SPAWN_SPACING: f32 = 32.0;
/// Extra depth below the feet used to detect standing contact.
const GROUND_PROBE: f32 = 1.0;
/// Boss damage per completed hold interval while both buttons are pressed.
pub const BUTTON_DAMAGE: u32 = 5;
pub const BUTTON_INTERVAL_SECS: f32 = 0.5;
/// Boss damage from a player touching its body.
pub const CONTACT_DAMAGE: u32 = 1;
pub const CONTACT_COOLDOWN_SECS: f32 = 0.5;

/// What a hazard contact did to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HazardResult {
    Ignored,
    Absorbed,
    Fatal,
}

fn hit_by_hazard(player: &mut Player) -> HazardResult {
    if player.is_in_grace() {
        HazardResult::Ignored
    } else if player.use_shield() {
        HazardResult::Absorbed
    } else {
        HazardResult::Fatal
    }
}

/// Observer view of the platformer world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformerSnapshot {
    pub level: u8,
    pub enemies: Vec<Enemy>,
    pub power_ups: Vec<PowerUp>,
    pub buttons: Vec<Button>,
    pub boss: Option<Boss>,
    pub difficulty: DifficultyInfo,
}

/// Platformer mode: tile collisions, shared goal, boss arena buttons.
#[derive(Debug, Clone)]
pub struct PlatformerRules {
    levels: LevelManager,
    /// Buttons touched by any player during the current tick.
    pressed: Vec<ButtonId>,
    button_hold: f32,
    contact_cooldown: f32,
}

impl PlatformerRules {
    pub fn new() -> Self {
        Self {
            levels: LevelManager::new(),
            pressed: Vec::new(),
            button_hold: 0.0,
            contact_cooldown: 0.0,
        }
    }

    /// Start on level `n`. Unknown levels keep level 1.
    pub fn starting_at(n: u8) -> Self {
        let mut rules = Self::new();
        rules.levels.set_level(n);
        rules
    }

    pub fn levels(&self) -> &LevelManager {
        &self.levels
    }

    pub fn levels_mut(&mut self) -> &mut LevelManager {
        &mut self.levels
    }

    fn clear_timers(&mut self) {
        self.pressed.clear();
        self.button_hold = 0.0;
        self.contact_cooldown = 0.0;
    }

    fn resolve_tiles(&mut self, index: usize, player: &mut Player, dt: f32, out: &mut TickOutcome) {
        let level = self.levels.level();
        let bounds = player.bounds();
        let hits = level.collisions(&bounds);

        if !hits.deaths.is_empty() {
            out.end(GameEvent::PlayerDeath { player: index });
        }
        player.in_goal = !hits.goals.is_empty();
        for id in hits.buttons {
            if !self.pressed.contains(&id) {
                self.pressed.push(id);
            }
        }

        let probe = Rect {
            height: bounds.height + GROUND_PROBE,
            ..bounds
        };
        for platform in level.collisions(&probe).platforms {
            if player.vy >= 0.0 && player.y < platform.y {
                player.land_on(platform.y);
            }
        }

        let ride = level
            .moving_platform_hits(&player.bounds())
            .into_iter()
            .filter_map(|i| level.moving_platforms().get(i))
            .find(|p| player.vy >= 0.0 && player.y < p.y)
            .map(|p| (p.y, p.velocity().0));
        if let Some((top, vx)) = ride {
            player.land_on(top);
            player.x += vx * dt;
        }
    }

    fn resolve_hazards(&mut self, index: usize, player: &mut Player, out: &mut TickOutcome) {
        let bounds = player.bounds();
        let report = |result: HazardResult, out: &mut TickOutcome| match result {
            HazardResult::Ignored => {},
            HazardResult::Absorbed => out.cue(SoundCue::Hit),
            HazardResult::Fatal => {
                out.cue(SoundCue::Hit);
                out.end(GameEvent::PlayerDeath { player: index });
            },
        };

        if self
            .levels
            .enemies()
            .iter()
            .any(|e| is_colliding(&bounds, &e.bounds()))
        {
            report(hit_by_hazard(player), out);
        }

        let contact_ready = self.contact_cooldown <= 0.0;
        let Some(boss) = self.levels.boss_mut() else {
            return;
        };
        if boss.is_defeated() {
            return;
        }
        if is_colliding(&bounds, &boss.bounds()) {
            if contact_ready {
                boss.take_damage(CONTACT_DAMAGE);
                self.contact_cooldown = CONTACT_COOLDOWN_SECS;
            }
            report(hit_by_hazard(player), out);
        }

        if player.is_in_grace() {
            return;
        }
        let struck = boss
            .projectiles()
            .iter()
            .position(|p| is_colliding(&bounds, &p.bounds()));
        if let Some(i) = struck {
            boss.remove_projectile(i);
            report(hit_by_hazard(player), out);
        }
    }

    fn collect_power_ups(&mut self, player: &mut Player, out: &mut TickOutcome) {
        let bounds = player.bounds();
        for power_up in self.levels.level_mut().power_ups_mut() {
            if power_up.is_active() && is_colliding(&bounds, &power_up.bounds()) {
                power_up.collect();
                player.apply_power_up(power_up.kind);
                out.cue(SoundCue::PowerUp);
            }
        }
    }

    fn apply_button_damage(&mut self, dt: f32) {
        let level = self.levels.level_mut();
        level.set_pressed_buttons(&self.pressed);
        self.pressed.clear();
        if !level.both_buttons_active() {
            self.button_hold = 0.0;
            return;
        }
        self.button_hold += dt;
        while self.button_hold >= BUTTON_INTERVAL_SECS {
            self.button_hold -= BUTTON_INTERVAL_SECS;
            if let Some(boss) = self.levels.boss_mut() {
                boss.take_damage(BUTTON_DAMAGE);
                tracing::debug!(health = boss.health(), "Button damage dealt");
            }
        }
    }
}

impl Default for PlatformerRules {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeRules for PlatformerRules {
    type Snapshot = PlatformerSnapshot;

    fn metadata(&self) -> ModeMetadata {
        ModeMetadata {
            name: "Platformer".to_string(),
            canvas_width: PLATFORMER_CANVAS.0,
            canvas_height: PLATFORMER_CANVAS.1,
            max_players: MAX_PLAYERS,
        }
    }

    fn spawn_point(&self, index: usize, _count: usize) -> (f32, f32) {
        let (x, y) = self.levels.level().start_position();
        // Player one stands left of the start, everyone else steps right.
        let offset = match index {
            0 => -SPAWN_SPACING,
            i => i as f32 * SPAWN_SPACING,
        };
        (x + offset, y)
    }

    fn control_player(
        &mut self,
        _index: usize,
        player: &mut Player,
        input: &PlayerInput,
        dt: f32,
        out: &mut TickOutcome,
    ) {
        if input.left && !input.right {
            player.move_left(dt);
        } else if input.right && !input.left {
            player.move_right(dt);
        } else {
            player.stop_moving(dt);
        }

        let jumps_before = player.jumps_used;
        if self.levels.current_level() == 2 {
            if input.jump_type != JumpType::None {
                player.variable_jump(input.jump_type);
            }
        } else if input.jump && player.can_jump() {
            player.jump();
        } else if input.double_jump && player.can_double_jump() {
            player.double_jump();
        }
        if player.jumps_used > jumps_before {
            out.cue(if player.jumps_used == 2 {
                SoundCue::DoubleJump
            } else {
                SoundCue::Jump
            });
        }
    }

    fn resolve_player(&mut self, index: usize, player: &mut Player, dt: f32, out: &mut TickOutcome) {
        self.resolve_tiles(index, player, dt, out);

        let max_x = PLATFORMER_CANVAS.0 - player.width;
        if player.x < 0.0 {
            player.x = 0.0;
            player.vx = 0.0;
        } else if player.x > max_x {
            player.x = max_x;
            player.vx = 0.0;
        }
        if player.y > PLATFORMER_CANVAS.1 {
            out.end(GameEvent::PlayerDeath { player: index });
        }

        self.resolve_hazards(index, player, out);
        self.collect_power_ups(player, out);
    }

    fn update_world(&mut self, dt: f32, _players: &mut [Player], out: &mut TickOutcome) {
        let was_defeated = self.levels.boss().is_some_and(|b| b.is_defeated());
        self.levels.update(dt);
        if self.contact_cooldown > 0.0 {
            self.contact_cooldown -= dt;
        }
        self.apply_button_damage(dt);
        if !was_defeated && self.levels.boss().is_some_and(|b| b.is_defeated()) {
            out.cue(SoundCue::Explosion);
        }
    }

    fn check_win(&self, players: &[Player]) -> Option<GameEvent> {
        if let Some(boss) = self.levels.boss() {
            return boss.is_defeated().then_some(GameEvent::Victory);
        }
        let done = match players {
            [] => false,
            [only] => only.in_goal,
            all => all.iter().all(|p| p.in_goal),
        };
        done.then(|| GameEvent::LevelComplete {
            level: self.levels.current_level(),
        })
    }

    fn restart_level(&mut self) {
        self.levels.restart_current_level();
        self.clear_timers();
    }

    fn next_level(&mut self) -> bool {
        let advanced = self.levels.next_level();
        if advanced {
            self.clear_timers();
        }
        advanced
    }

    fn reset_to_first_level(&mut self) {
        self.levels.reset();
        self.clear_timers();
    }

    fn level_number(&self) -> u8 {
        self.levels.current_level()
    }

    fn render_world(&self, surface: &mut dyn DrawSurface) {
        render_level(&self.levels, surface);
    }

    fn render_hud(&self, _players: &[Player], surface: &mut dyn DrawSurface) {
        let level = self.levels.current_level();
        surface.fill_text(&format!("Level {level}"), 16.0, 24.0, 16.0, Color::WHITE);
        if level == 2 {
            let info = self.levels.difficulty_info();
            surface.fill_text(
                &format!("Difficulty {} ({} enemies)", info.difficulty, info.enemy_count),
                16.0,
                44.0,
                12.0,
                Color::WHITE,
            );
        }
        if let Some(boss) = self.levels.boss() {
            let bar = Rect::new(200.0, 12.0, 400.0, 12.0);
            surface.fill_rect(bar, Color::rgb(0x2c, 0x3e, 0x50));
            surface.fill_rect(
                Rect {
                    width: bar.width * boss.health_percentage() / 100.0,
                    ..bar
                },
                Color::rgb(0xe7, 0x4c, 0x3c),
            );
            surface.fill_text(
                &format!("Boss phase {}", boss.phase()),
                200.0,
                40.0,
                12.0,
                Color::WHITE,
            );
        }
    }

    fn snapshot(&self) -> PlatformerSnapshot {
        let level = self.levels.level();
        PlatformerSnapshot {
            level: self.levels.current_level(),
            enemies: self.levels.enemies().to_vec(),
            power_ups: level.power_ups().to_vec(),
            buttons: level.buttons().to_vec(),
            boss: self.levels.boss().cloned(),
            difficulty: self.levels.difficulty_info(),
        }
    }
}

fn render_level(levels: &LevelManager, surface: &mut dyn DrawSurface) {
    let level = levels.level();
    for tile in level.tiles() {
        let rect = tile.rect;
        match tile.kind {
            TileKind::Platform => {
                surface.fill_rect(rect, Color::rgb(0x34, 0x49, 0x5e));
                surface.fill_rect(Rect { height: 4.0, ..rect }, Color::rgb(0x2c, 0x3e, 0x50));
            },
            TileKind::Death => surface.fill_rect(rect, Color::rgb(0xe7, 0x4c, 0x3c)),
            TileKind::Goal => surface.fill_rect(rect, Color::rgb(0xf1, 0xc4, 0x0f)),
            TileKind::Button(_) => {},
        }
    }
    for button in level.buttons() {
        let color = if button.active {
            Color::rgb(0x2e, 0xcc, 0x71)
        } else {
            Color::rgb(0x95, 0xa5, 0xa6)
        };
        surface.fill_rect(
            Rect::new(button.rect.x + 4.0, button.rect.bottom() - 8.0, button.rect.width - 8.0, 8.0),
            color,
        );
    }
    for platform in level.moving_platforms() {
        surface.fill_rect(platform.bounds(), Color::rgb(0x8e, 0x44, 0xad));
    }
    for power_up in level.power_ups().iter().filter(|p| p.is_active()) {
        let (cx, cy) = power_up.bounds().center();
        surface.fill_circle(cx, cy, 10.0, Color::rgb(0xf3, 0x9c, 0x12));
    }
    for enemy in levels.enemies() {
        surface.fill_rect(enemy.bounds(), Color::rgb(0xc0, 0x39, 0x2b));
    }
    if let Some(boss) = levels.boss() {
        let body = if boss.is_defeated() {
            Color::rgb(0x7f, 0x8c, 0x8d)
        } else {
            Color::rgb(0x8e, 0x24, 0x4a)
        };
        surface.fill_rect(boss.bounds(), body);
        for projectile in boss.projectiles() {
            let color = match projectile.kind {
                ProjectileKind::Orb => Color::rgb(0xe6, 0x7e, 0x22),
                ProjectileKind::Shockwave => Color::rgb(0x9b, 0x59, 0xb6),
            };
            surface.fill_rect(projectile.bounds(), color);
        }
    }
}
