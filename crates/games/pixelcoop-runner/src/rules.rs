use serde::{Deserialize, Serialize};

use pixelcoop_core::boss::Boss;
use pixelcoop_core::config::MAX_PLAYERS;
use pixelcoop_core::events::GameEvent;
use pixelcoop_core::game_trait::{ModeMetadata, ModeRules, TickOutcome};
use pixelcoop_core::geometry::{Rect, is_colliding};
use pixelcoop_core::input::PlayerInput;
use pixelcoop_core::player::{PLAYER_HEIGHT, Player};
use pixelcoop_core::powerup::{ActivePowerUp, PowerUpKind};
use pixelcoop_core::render::{Color, DrawSurface, RUNNER_CANVAS};
use pixelcoop_core::sound::SoundCue;

use crate::course::{ATTACK_BOSS_DAMAGE, CourseKind, RunnerCourse};
use crate::obstacle::{Obstacle, ObstacleKind, Pickup, PickupKind};
use crate::spawner::Theme;
use crate::{GROUND_Y, RUNNER_X};

/// Extra depth below the feet used to detect standing on the ground.
const GROUND_PROBE: f32 = 1.0;
/// Players whose top edge passes this are lost.
const FALL_LIMIT: f32 = 400.0;
pub const RAINBOW_START_HEALTH: u8 = 3;
pub const RAINBOW_MAX_HEALTH: u8 = 5;
const PROGRESS_TRACK: Rect = Rect {
    x: 16.0,
    y: 50.0,
    width: 200.0,
    height: 4.0,
};
const PROGRESS_FILL: Color = Color::rgb(0x1a, 0xbc, 0x9c);

/// Observer view of a runner course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerSnapshot {
    pub course: CourseKind,
    pub distance: f32,
    pub target: Option<f32>,
    pub scroll_speed: f32,
    pub obstacles: Vec<Obstacle>,
    pub pickups: Vec<Pickup>,
    pub coins: u32,
    pub items: u32,
    pub health: Vec<u8>,
    pub theme: Option<Theme>,
    pub boss: Option<Boss>,
}

/// Runner mode: players pinned in place while the course scrolls at them.
#[derive(Debug, Clone)]
pub struct RunnerRules {
    course: RunnerCourse,
    /// Per-player hit points. Only the rainbow course spends them.
    health: Vec<u8>,
    effects: Vec<Vec<ActivePowerUp<PickupKind>>>,
}

impl RunnerRules {
    pub fn new(kind: CourseKind, seed: u64) -> Self {
        Self {
            course: RunnerCourse::new(kind, seed),
            health: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn course(&self) -> &RunnerCourse {
        &self.course
    }

    pub fn course_mut(&mut self) -> &mut RunnerCourse {
        &mut self.course
    }

    pub fn health(&self, player: usize) -> u8 {
        self.health.get(player).copied().unwrap_or(RAINBOW_START_HEALTH)
    }

    /// Timed pickup effects running on `player`.
    pub fn effects(&self, player: usize) -> &[ActivePowerUp<PickupKind>] {
        self.effects.get(player).map(Vec::as_slice).unwrap_or(&[])
    }

    fn ensure_slot(&mut self, player: usize) {
        if self.health.len() <= player {
            self.health.resize(player + 1, RAINBOW_START_HEALTH);
        }
        if self.effects.len() <= player {
            self.effects.resize_with(player + 1, Vec::new);
        }
    }

    fn switch_course(&mut self, kind: CourseKind) {
        self.course = RunnerCourse::new(kind, self.course.seed());
        self.clear_players();
    }

    fn clear_players(&mut self) {
        self.health.clear();
        self.effects.clear();
    }

    fn strike(&mut self, index: usize, player: &mut Player, out: &mut TickOutcome) {
        let rainbow = self.course.kind() == CourseKind::Rainbow;
        let bounds = player.bounds();
        for obstacle in self.course.obstacles_mut() {
            if obstacle.has_struck(index) || !is_colliding(&bounds, &obstacle.bounds()) {
                continue;
            }
            if player.is_in_grace() {
                return;
            }
            obstacle.mark_struck(index);
            out.cue(SoundCue::Hit);
            if player.use_shield() {
                continue;
            }
            if !rainbow {
                out.end(GameEvent::PlayerDeath { player: index });
                return;
            }
            let health = &mut self.health[index];
            *health = health.saturating_sub(1);
            tracing::debug!(player = index, health = *health, kind = ?obstacle.kind, "Runner hit");
            if *health == 0 {
                out.end(GameEvent::PlayerDeath { player: index });
                return;
            }
            player.start_grace();
        }
    }

    fn collect(&mut self, index: usize, player: &mut Player, out: &mut TickOutcome) {
        let bounds = player.bounds();
        let mut taken = Vec::new();
        for pickup in self.course.pickups_mut() {
            if !pickup.collected && is_colliding(&bounds, &pickup.bounds()) {
                pickup.collected = true;
                taken.push(pickup.kind);
            }
        }
        for kind in taken {
            self.apply_pickup(index, player, kind, out);
        }
    }

    fn apply_pickup(&mut self, index: usize, player: &mut Player, kind: PickupKind, out: &mut TickOutcome) {
        self.course.record_pickup(kind);
        match kind {
            PickupKind::Coin => {
                out.cue(SoundCue::Collect);
                return;
            },
            PickupKind::Heart => {
                let health = &mut self.health[index];
                *health = (*health + 1).min(RAINBOW_MAX_HEALTH);
            },
            PickupKind::AttackBoss => {
                if let Some(boss) = self.course.boss_mut() {
                    boss.take_damage(ATTACK_BOSS_DAMAGE);
                }
            },
            PickupKind::Star | PickupKind::Shield => player.has_shield = true,
            _ if kind.is_speed_boost() => player.apply_speed_boost(kind.duration()),
            _ => {},
        }
        if kind.duration() > 0.0 {
            let effects = &mut self.effects[index];
            effects.retain(|e| e.kind != kind);
            effects.push(ActivePowerUp::new(kind));
        }
        out.cue(SoundCue::PowerUp);
    }

    /// Run effect timers. A lapsed star takes its shield with it; a consumed
    /// shield ends its effect early.
    fn tick_effects(&mut self, index: usize, player: &mut Player, dt: f32) {
        let Some(effects) = self.effects.get_mut(index) else {
            return;
        };
        for effect in effects.iter_mut() {
            effect.tick(dt);
        }
        if effects
            .iter()
            .any(|e| e.kind == PickupKind::Star && e.is_expired())
        {
            player.has_shield = false;
        }
        let shielded = player.has_shield;
        effects.retain(|e| {
            let shield = matches!(e.kind, PickupKind::Star | PickupKind::Shield);
            !e.is_expired() && (shielded || !shield)
        });
    }
}

impl ModeRules for RunnerRules {
    type Snapshot = RunnerSnapshot;

    fn metadata(&self) -> ModeMetadata {
        ModeMetadata {
            name: "Runner".to_string(),
            canvas_width: RUNNER_CANVAS.0,
            canvas_height: RUNNER_CANVAS.1,
            max_players: MAX_PLAYERS,
        }
    }

    fn spawn_point(&self, _index: usize, _count: usize) -> (f32, f32) {
        (RUNNER_X, GROUND_Y - PLAYER_HEIGHT)
    }

    fn control_player(
        &mut self,
        _index: usize,
        player: &mut Player,
        input: &PlayerInput,
        _dt: f32,
        out: &mut TickOutcome,
    ) {
        player.x = RUNNER_X;
        player.vx = 0.0;
        player.set_crouching(input.crouch);
        if input.jump && player.can_jump() {
            player.jump();
            out.cue(SoundCue::Jump);
        } else if input.double_jump && player.can_double_jump() {
            player.double_jump();
            out.cue(SoundCue::DoubleJump);
        }
    }

    fn resolve_player(&mut self, index: usize, player: &mut Player, _dt: f32, out: &mut TickOutcome) {
        player.x = RUNNER_X;
        player.vx = 0.0;
        if player.y > FALL_LIMIT {
            out.end(GameEvent::PlayerDeath { player: index });
            return;
        }
        if player.vy >= 0.0 && player.bounds().bottom() + GROUND_PROBE >= GROUND_Y {
            player.land_on(GROUND_Y);
        }
    }

    fn update_world(&mut self, dt: f32, players: &mut [Player], out: &mut TickOutcome) {
        let boss_was_down = self.course.boss().is_some_and(|b| b.is_defeated());
        for _ in 0..self.course.update(dt) {
            out.cue(SoundCue::Explosion);
        }
        for (i, player) in players.iter_mut().enumerate() {
            self.ensure_slot(i);
            self.strike(i, player, out);
            self.collect(i, player, out);
            self.tick_effects(i, player, dt);
        }
        if !boss_was_down && self.course.boss().is_some_and(|b| b.is_defeated()) {
            out.cue(SoundCue::Explosion);
        }
    }

    fn check_win(&self, _players: &[Player]) -> Option<GameEvent> {
        self.course.is_complete().then_some(GameEvent::Victory)
    }

    fn restart_level(&mut self) {
        self.course.reset();
        self.clear_players();
    }

    fn next_level(&mut self) -> bool {
        match CourseKind::from_number(self.course.kind().number() + 1) {
            Some(kind) => {
                self.switch_course(kind);
                true
            },
            None => false,
        }
    }

    fn reset_to_first_level(&mut self) {
        self.switch_course(CourseKind::Forest);
    }

    fn level_number(&self) -> u8 {
        self.course.kind().number()
    }

    fn render_world(&self, surface: &mut dyn DrawSurface) {
        render_course(&self.course, surface);
    }

    fn render_hud(&self, players: &[Player], surface: &mut dyn DrawSurface) {
        let course = &self.course;
        let kind = course.kind();
        surface.fill_text(kind.name(), 16.0, 24.0, 16.0, Color::WHITE);
        match kind.target_distance() {
            Some(target) => {
                surface.fill_text(
                    &format!("{:.0}m / {target:.0}m", course.distance()),
                    16.0,
                    44.0,
                    12.0,
                    Color::WHITE,
                );
                surface.fill_rect(PROGRESS_TRACK, Color::rgb(0x2c, 0x3e, 0x50));
                if course.progress() > 0.0 {
                    surface.fill_rect(
                        Rect {
                            width: PROGRESS_TRACK.width * course.progress(),
                            ..PROGRESS_TRACK
                        },
                        PROGRESS_FILL,
                    );
                }
            },
            None => {
                if let Some(boss) = course.boss() {
                    let bar = Rect::new(300.0, 12.0, 400.0, 12.0);
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
                        300.0,
                        40.0,
                        12.0,
                        Color::WHITE,
                    );
                }
            },
        }
        let tally = if kind == CourseKind::Pipes {
            format!("Coins {}", course.coins())
        } else {
            format!("Items {}", course.items())
        };
        surface.fill_text(&tally, 16.0, 62.0, 12.0, Color::WHITE);

        if kind == CourseKind::Rainbow {
            for i in 0..players.len() {
                surface.fill_text(
                    &format!("P{} HP {}", i + 1, self.health(i)),
                    860.0,
                    24.0 + i as f32 * 18.0,
                    12.0,
                    Color::WHITE,
                );
            }
        }
    }

    fn snapshot(&self) -> RunnerSnapshot {
        let course = &self.course;
        RunnerSnapshot {
            course: course.kind(),
            distance: course.distance(),
            target: course.kind().target_distance(),
            scroll_speed: course.scroll_speed(),
            obstacles: course.obstacles().to_vec(),
            pickups: course.pickups().to_vec(),
            coins: course.coins(),
            items: course.items(),
            health: self.health.clone(),
            theme: course.theme(),
            boss: course.boss().cloned(),
        }
    }
}

fn sky(kind: CourseKind) -> (Color, Color) {
    match kind {
        CourseKind::Forest => (Color::rgb(0x87, 0xce, 0xeb), Color::rgb(0xdc, 0x14, 0x3c)),
        CourseKind::Pipes => (Color::rgb(0x5c, 0x94, 0xfc), Color::rgb(0x9c, 0xd4, 0xff)),
        CourseKind::Bombs => (Color::rgb(0x1a, 0x1a, 0x1a), Color::rgb(0x8b, 0x45, 0x13)),
        CourseKind::Rainbow => (Color::rgb(0x0b, 0x0b, 0x2b), Color::rgb(0x4b, 0x00, 0x82)),
        CourseKind::BossRush => (Color::rgb(0x2c, 0x00, 0x1e), Color::rgb(0x8b, 0x00, 0x00)),
    }
}

fn obstacle_color(kind: ObstacleKind) -> Color {
    match kind {
        ObstacleKind::Log | ObstacleKind::Crate => Color::rgb(0x8b, 0x45, 0x13),
        ObstacleKind::Hole | ObstacleKind::Gap => Color::BLACK,
        ObstacleKind::Spike | ObstacleKind::Lightning => Color::rgb(0xbd, 0xc3, 0xc7),
        ObstacleKind::Pipe | ObstacleKind::GreenShell => Color::rgb(0x2e, 0xcc, 0x40),
        ObstacleKind::QuestionBlock => Color::rgb(0xf1, 0xc4, 0x0f),
        ObstacleKind::Goomba | ObstacleKind::Brick => Color::rgb(0xa0, 0x52, 0x2d),
        ObstacleKind::BulletBill | ObstacleKind::Bomb => Color::rgb(0x2c, 0x3e, 0x50),
        ObstacleKind::Boo => Color::WHITE,
        ObstacleKind::Fire | ObstacleKind::Explosion => Color::rgb(0xff, 0x45, 0x00),
        ObstacleKind::BlueShell => Color::rgb(0x34, 0x98, 0xdb),
        ObstacleKind::Banana => Color::rgb(0xff, 0xe1, 0x35),
        ObstacleKind::Enemy | ObstacleKind::RedShell | ObstacleKind::BrokenHeart => {
            Color::rgb(0xe7, 0x4c, 0x3c)
        },
        ObstacleKind::FakeCube => Color::rgb(0xe6, 0x7e, 0x22),
        ObstacleKind::BossShot => Color::rgb(0x9b, 0x59, 0xb6),
    }
}

fn pickup_color(kind: PickupKind) -> Color {
    match kind {
        PickupKind::Coin | PickupKind::Star => Color::rgb(0xf1, 0xc4, 0x0f),
        PickupKind::Heart | PickupKind::Mushroom => Color::rgb(0xe7, 0x4c, 0x3c),
        PickupKind::AttackBoss | PickupKind::FireUp => Color::rgb(0xff, 0x45, 0x00),
        PickupKind::Shield | PickupKind::BombUp => Color::rgb(0x34, 0x98, 0xdb),
        PickupKind::Speed | PickupKind::SpeedUp => Color::rgb(0x2e, 0xcc, 0x71),
    }
}

fn render_course(course: &RunnerCourse, surface: &mut dyn DrawSurface) {
    let (top, bottom) = sky(course.kind());
    surface.fill_vertical_gradient(Rect::new(0.0, 0.0, RUNNER_CANVAS.0, GROUND_Y), top, bottom);
    surface.fill_rect(
        Rect::new(0.0, GROUND_Y, RUNNER_CANVAS.0, RUNNER_CANVAS.1 - GROUND_Y),
        Color::rgb(0x3e, 0x27, 0x23),
    );
    for obstacle in course.obstacles() {
        surface.fill_rect(obstacle.bounds(), obstacle_color(obstacle.kind));
    }
    for pickup in course.pickups().iter().filter(|p| !p.collected) {
        let (cx, cy) = pickup.bounds().center();
        surface.fill_circle(cx, cy, pickup.size / 2.0, pickup_color(pickup.kind));
    }
    if let Some(boss) = course.boss().filter(|b| !b.is_defeated()) {
        surface.fill_rect(boss.bounds(), Color::rgb(0x8e, 0x44, 0xad));
    }
}
