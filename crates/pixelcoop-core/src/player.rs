use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::input::JumpType;
use crate::powerup::PowerUpType;

/// Player hitbox width in pixels.
pub const PLAYER_WIDTH: f32 = 24.0;
/// Standing hitbox height in pixels.
pub const PLAYER_HEIGHT: f32 = 32.0;
/// Crouching hitbox height in pixels.
pub const CROUCH_HEIGHT: f32 = 16.0;
/// Horizontal acceleration toward the input direction (px/s^2).
pub const ACCELERATION: f32 = 800.0;
/// Horizontal speed cap without boosts (px/s).
pub const MAX_SPEED: f32 = 200.0;
/// Ground friction when no direction is held (px/s^2).
pub const FRICTION: f32 = 600.0;
/// Downward acceleration while airborne (px/s^2).
pub const GRAVITY: f32 = 1200.0;
/// Upward launch speed of the first jump (px/s).
pub const JUMP_POWER: f32 = 320.0;
/// Double jump launch speed as a fraction of `JUMP_POWER`.
pub const DOUBLE_JUMP_FACTOR: f32 = 0.8;
/// Short hop launch speed as a fraction of `JUMP_POWER`.
pub const SHORT_JUMP_FACTOR: f32 = 0.7;
/// Max speed multiplier while a speed boost is running.
pub const SPEED_BOOST_MULTIPLIER: f32 = 1.2;
/// Speed boost length granted by a speed pickup (seconds).
pub const SPEED_BOOST_SECS: f32 = 5.0;
/// Hazards are ignored for this long after a shield absorbs a hit (seconds).
pub const SHIELD_GRACE_SECS: f32 = 1.0;

/// Tunable movement constants, loadable from TOML.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub acceleration: f32,
    pub max_speed: f32,
    pub friction: f32,
    pub gravity: f32,
    pub jump_power: f32,
    pub double_jump_factor: f32,
    pub short_jump_factor: f32,
    pub speed_boost_multiplier: f32,
    pub speed_boost_secs: f32,
    pub shield_grace_secs: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            acceleration: ACCELERATION,
            max_speed: MAX_SPEED,
            friction: FRICTION,
            gravity: GRAVITY,
            jump_power: JUMP_POWER,
            double_jump_factor: DOUBLE_JUMP_FACTOR,
            short_jump_factor: SHORT_JUMP_FACTOR,
            speed_boost_multiplier: SPEED_BOOST_MULTIPLIER,
            speed_boost_secs: SPEED_BOOST_SECS,
            shield_grace_secs: SHIELD_GRACE_SECS,
        }
    }
}

/// Player body colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for PlayerColor {
    fn default() -> Self {
        Self::PALETTE[0]
    }
}

impl PlayerColor {
    /// Default colour per player slot.
    pub const PALETTE: &[PlayerColor] = &[
        PlayerColor {
            r: 0x2e,
            g: 0xcc,
            b: 0x71,
        }, // Green
        PlayerColor {
            r: 0x34,
            g: 0x98,
            b: 0xdb,
        }, // Blue
        PlayerColor {
            r: 0xe6,
            g: 0x7e,
            b: 0x22,
        }, // Orange
        PlayerColor {
            r: 0x9b,
            g: 0x59,
            b: 0xb6,
        }, // Purple
    ];

    /// Palette colour for a slot, wrapping past the end.
    pub fn for_slot(slot: usize) -> Self {
        Self::PALETTE[slot % Self::PALETTE.len()]
    }

    /// Parse `#rrggbb` or `#rgb`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        let channel = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();
        match hex.len() {
            6 => Some(Self {
                r: channel(0, 2)?,
                g: channel(2, 2)?,
                b: channel(4, 2)?,
            }),
            3 => Some(Self {
                r: channel(0, 1)? * 17,
                g: channel(1, 1)? * 17,
                b: channel(2, 1)? * 17,
            }),
            _ => None,
        }
    }
}

/// A controllable player body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    pub color: PlayerColor,
    pub grounded: bool,
    pub was_grounded_last_frame: bool,
    /// Jumps spent since the last landing (0, 1 or 2).
    pub jumps_used: u8,
    pub double_jump_ready: bool,
    pub speed_boost_timer: f32,
    pub has_shield: bool,
    pub in_goal: bool,
    pub crouching: bool,
    pub grace_timer: f32,
    /// Rising from a short hop that a long press may still extend.
    short_hop: bool,
    pub physics: PhysicsConfig,
}

impl Player {
    pub fn new(x: f32, y: f32, color: PlayerColor) -> Self {
        Self::with_physics(x, y, color, PhysicsConfig::default())
    }

    pub fn with_physics(x: f32, y: f32, color: PlayerColor, physics: PhysicsConfig) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            color,
            grounded: false,
            was_grounded_last_frame: false,
            jumps_used: 0,
            double_jump_ready: false,
            speed_boost_timer: 0.0,
            has_shield: false,
            in_goal: false,
            crouching: false,
            grace_timer: 0.0,
            short_hop: false,
            physics,
        }
    }

    /// Restore spawn state at `(x, y)`. Colour and physics survive.
    pub fn reset(&mut self, x: f32, y: f32) {
        *self = Self::with_physics(x, y, self.color, self.physics);
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn effective_max_speed(&self) -> f32 {
        if self.speed_boost_timer > 0.0 {
            self.physics.max_speed * self.physics.speed_boost_multiplier
        } else {
            self.physics.max_speed
        }
    }

    pub fn move_left(&mut self, dt: f32) {
        let max = self.effective_max_speed();
        self.vx = (self.vx - self.physics.acceleration * dt).max(-max);
    }

    pub fn move_right(&mut self, dt: f32) {
        let max = self.effective_max_speed();
        self.vx = (self.vx + self.physics.acceleration * dt).min(max);
    }

    /// Bleed horizontal speed through friction. Only acts on the ground.
    pub fn stop_moving(&mut self, dt: f32) {
        if !self.grounded {
            return;
        }
        let step = self.physics.friction * dt;
        if self.vx > 0.0 {
            self.vx = (self.vx - step).max(0.0);
        } else if self.vx < 0.0 {
            self.vx = (self.vx + step).min(0.0);
        }
    }

    pub fn can_jump(&self) -> bool {
        self.grounded && self.jumps_used == 0
    }

    pub fn can_double_jump(&self) -> bool {
        self.double_jump_ready && self.jumps_used == 1
    }

    fn launch(&mut self, factor: f32) {
        self.vy = -self.physics.jump_power * factor;
        self.jumps_used = 1;
        self.double_jump_ready = true;
        self.grounded = false;
    }

    /// Full-height first jump. Returns whether the jump happened.
    pub fn jump(&mut self) -> bool {
        if !self.can_jump() {
            return false;
        }
        self.launch(1.0);
        self.short_hop = false;
        true
    }

    pub fn double_jump(&mut self) -> bool {
        if !self.can_double_jump() {
            return false;
        }
        self.vy = -self.physics.jump_power * self.physics.double_jump_factor;
        self.jumps_used = 2;
        self.double_jump_ready = false;
        self.short_hop = false;
        true
    }

    /// Jump scaled by how long the key was held.
    pub fn variable_jump(&mut self, kind: JumpType) -> bool {
        match kind {
            JumpType::None => false,
            JumpType::Short => {
                if !self.can_jump() {
                    return false;
                }
                self.launch(self.physics.short_jump_factor);
                self.short_hop = true;
                true
            },
            JumpType::Long => {
                if self.can_jump() {
                    return self.jump();
                }
                if self.short_hop && self.vy < 0.0 {
                    self.vy -= self.physics.jump_power * (1.0 - self.physics.short_jump_factor);
                    self.short_hop = false;
                }
                false
            },
            JumpType::Double => self.double_jump() || self.jump(),
        }
    }

    /// Advance one step. Collision resolution runs afterward and may set
    /// `grounded` and `in_goal` again.
    pub fn update(&mut self, dt: f32) {
        if !self.was_grounded_last_frame && self.grounded {
            self.jumps_used = 0;
            self.double_jump_ready = false;
            self.short_hop = false;
        }
        self.was_grounded_last_frame = self.grounded;

        if self.speed_boost_timer > 0.0 {
            self.speed_boost_timer = (self.speed_boost_timer - dt).max(0.0);
        }
        if self.grace_timer > 0.0 {
            self.grace_timer = (self.grace_timer - dt).max(0.0);
        }

        if !self.grounded {
            self.vy += self.physics.gravity * dt;
        }

        self.grounded = false;
        self.in_goal = false;

        self.x += self.vx * dt;
        self.y += self.vy * dt;
    }

    /// Snap the feet onto a surface at `top`.
    pub fn land_on(&mut self, top: f32) {
        self.y = top - self.height;
        self.vy = 0.0;
        self.grounded = true;
    }

    pub fn apply_power_up(&mut self, kind: PowerUpType) {
        match kind {
            PowerUpType::Speed => self.apply_speed_boost(self.physics.speed_boost_secs),
            PowerUpType::Shield => self.has_shield = true,
        }
    }

    pub fn apply_speed_boost(&mut self, secs: f32) {
        self.speed_boost_timer = self.speed_boost_timer.max(secs);
    }

    /// Consume the shield if present and start the post-hit grace window.
    pub fn use_shield(&mut self) -> bool {
        if !self.has_shield {
            return false;
        }
        self.has_shield = false;
        self.grace_timer = self.physics.shield_grace_secs;
        true
    }

    pub fn is_in_grace(&self) -> bool {
        self.grace_timer > 0.0
    }

    pub fn start_grace(&mut self) {
        self.grace_timer = self.physics.shield_grace_secs;
    }

    /// Shrink to crouch height keeping the feet where they are.
    pub fn set_crouching(&mut self, crouching: bool) {
        if crouching == self.crouching {
            return;
        }
        let delta = PLAYER_HEIGHT - CROUCH_HEIGHT;
        if crouching {
            self.y += delta;
            self.height = CROUCH_HEIGHT;
        } else {
            self.y -= delta;
            self.height = PLAYER_HEIGHT;
        }
        self.crouching = crouching;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn grounded_player() -> Player {
        let mut p = Player::new(100.0, 100.0, PlayerColor::default());
        p.grounded = true;
        p.was_grounded_last_frame = true;
        p
    }

    /// Emulate a floor at `floor_y` the way collision policies do.
    fn step_on_floor(p: &mut Player, floor_y: f32) {
        p.update(DT);
        if p.vy >= 0.0 && p.y + p.height >= floor_y {
            p.land_on(floor_y);
        }
    }

    #[test]
    fn hex_colour_parsing() {
        assert_eq!(
            PlayerColor::from_hex("#2ECC71"),
            Some(PlayerColor {
                r: 0x2e,
                g: 0xcc,
                b: 0x71
            })
        );
        assert_eq!(
            PlayerColor::from_hex("#fff"),
            Some(PlayerColor {
                r: 255,
                g: 255,
                b: 255
            })
        );
        assert_eq!(PlayerColor::from_hex("2ECC71"), None);
        assert_eq!(PlayerColor::from_hex("#zzzzzz"), None);
        assert_eq!(PlayerColor::for_slot(5), PlayerColor::PALETTE[1]);
    }

    #[test]
    fn acceleration_is_capped() {
        let mut p = grounded_player();
        for _ in 0..120 {
            p.move_right(DT);
        }
        assert_eq!(p.vx, MAX_SPEED);
        for _ in 0..240 {
            p.move_left(DT);
        }
        assert_eq!(p.vx, -MAX_SPEED);
    }

    #[test]
    fn speed_boost_raises_cap_while_timer_runs() {
        let mut p = grounded_player();
        p.apply_power_up(PowerUpType::Speed);
        assert_eq!(p.speed_boost_timer, SPEED_BOOST_SECS);
        for _ in 0..120 {
            p.move_right(DT);
        }
        assert!((p.vx - MAX_SPEED * SPEED_BOOST_MULTIPLIER).abs() < 1e-3);

        p.speed_boost_timer = 0.0;
        p.move_right(DT);
        assert_eq!(p.vx, MAX_SPEED, "Cap must drop back once the timer expires");
    }

    #[test]
    fn friction_only_on_ground() {
        let mut p = grounded_player();
        p.vx = 100.0;
        p.stop_moving(0.1);
        assert_eq!(p.vx, 40.0);
        p.stop_moving(0.1);
        assert_eq!(p.vx, 0.0, "Friction must not overshoot zero");

        let mut air = Player::new(0.0, 0.0, PlayerColor::default());
        air.vx = 100.0;
        air.stop_moving(0.1);
        assert_eq!(air.vx, 100.0, "Friction must not apply in the air");
    }

    #[test]
    fn jump_requires_ground() {
        let mut p = Player::new(0.0, 0.0, PlayerColor::default());
        assert!(!p.jump(), "Airborne player cannot start a jump");

        let mut p = grounded_player();
        assert!(p.jump());
        assert_eq!(p.vy, -JUMP_POWER);
        assert_eq!(p.jumps_used, 1);
        assert!(!p.grounded);
        assert!(p.can_double_jump());
    }

    #[test]
    fn double_jump_once_per_flight() {
        let mut p = grounded_player();
        p.jump();
        p.update(DT);
        assert!(p.double_jump());
        assert_eq!(p.vy, -JUMP_POWER * DOUBLE_JUMP_FACTOR);
        assert_eq!(p.jumps_used, 2);
        assert!(!p.double_jump(), "Only one double jump per flight");
    }

    #[test]
    fn landing_edge_resets_jumps() {
        let mut p = grounded_player();
        p.jump();
        for _ in 0..5 {
            step_on_floor(&mut p, 132.0);
        }
        p.double_jump();
        let mut landed = false;
        for _ in 0..120 {
            step_on_floor(&mut p, 132.0);
            if p.grounded {
                landed = true;
                break;
            }
        }
        assert!(landed, "Player should land on the floor");
        assert_eq!(p.jumps_used, 2, "Counter resets on the next update, not on contact");
        p.update(DT);
        assert_eq!(p.jumps_used, 0, "Landing edge must reset the jump counter");
        assert!(!p.can_double_jump());
    }

    #[test]
    fn gravity_skipped_when_grounded() {
        let mut p = grounded_player();
        p.update(DT);
        assert_eq!(p.vy, 0.0);
        assert!(!p.grounded, "update clears grounded for collision to re-assert");
        p.update(DT);
        assert!((p.vy - GRAVITY * DT).abs() < 1e-4);
    }

    #[test]
    fn short_hop_can_be_extended_once() {
        let mut p = grounded_player();
        assert!(p.variable_jump(JumpType::Short));
        assert!((p.vy + JUMP_POWER * SHORT_JUMP_FACTOR).abs() < 1e-4);
        p.variable_jump(JumpType::Long);
        let extended = p.vy;
        assert!((extended + JUMP_POWER).abs() < 1e-3);
        p.variable_jump(JumpType::Long);
        assert_eq!(p.vy, extended, "Extension applies only once");
    }

    #[test]
    fn double_class_falls_back_to_first_jump() {
        let mut p = grounded_player();
        assert!(p.variable_jump(JumpType::Double));
        assert_eq!(p.jumps_used, 1);
        assert!(p.variable_jump(JumpType::Double));
        assert_eq!(p.jumps_used, 2);
    }

    #[test]
    fn shield_is_one_shot() {
        let mut p = grounded_player();
        assert!(!p.use_shield());
        p.apply_power_up(PowerUpType::Shield);
        assert!(p.use_shield());
        assert!(p.is_in_grace());
        assert!(!p.use_shield(), "Shield must be consumed by the first hit");
    }

    #[test]
    fn crouch_keeps_feet_anchored() {
        let mut p = grounded_player();
        let feet = p.bounds().bottom();
        p.set_crouching(true);
        assert_eq!(p.height, CROUCH_HEIGHT);
        assert_eq!(p.bounds().bottom(), feet);
        p.set_crouching(true);
        assert_eq!(p.bounds().bottom(), feet, "Repeated crouch is a no-op");
        p.set_crouching(false);
        assert_eq!(p.height, PLAYER_HEIGHT);
        assert_eq!(p.bounds().bottom(), feet);
    }

    #[test]
    fn reset_keeps_colour() {
        let color = PlayerColor::for_slot(2);
        let mut p = Player::new(1.0, 2.0, color);
        p.vx = 50.0;
        p.has_shield = true;
        p.jumps_used = 2;
        p.reset(10.0, 20.0);
        assert_eq!((p.x, p.y, p.vx), (10.0, 20.0, 0.0));
        assert!(!p.has_shield);
        assert_eq!(p.jumps_used, 0);
        assert_eq!(p.color, color);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn jumps_used_stays_in_range(
                actions in proptest::collection::vec(0u8..5, 10..200)
            ) {
                let mut p = grounded_player();
                for a in actions {
                    match a {
                        0 => { p.jump(); },
                        1 => { p.double_jump(); },
                        2 => p.move_left(DT),
                        3 => p.move_right(DT),
                        _ => p.stop_moving(DT),
                    }
                    step_on_floor(&mut p, 132.0);
                    prop_assert!(p.jumps_used <= 2);
                    prop_assert!(p.vx.abs() <= p.effective_max_speed() + 1e-3);
                }
            }

            #[test]
            fn landing_edge_always_clears_counter(
                hold in 1usize..30
            ) {
                let mut p = grounded_player();
                p.jump();
                for _ in 0..hold {
                    p.update(DT);
                }
                p.land_on(p.y + p.height);
                p.update(DT);
                prop_assert_eq!(p.jumps_used, 0);
            }
        }
    }
}
