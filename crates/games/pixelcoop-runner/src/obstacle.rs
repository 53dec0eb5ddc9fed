use serde::{Deserialize, Serialize};

use pixelcoop_core::geometry::Rect;
use pixelcoop_core::player::SPEED_BOOST_SECS;
use pixelcoop_core::powerup::PowerUpKind;

/// Bomb blast size once the fuse runs out.
pub const DETONATION_SIZE: f32 = 80.0;
/// A detonated bomb grows upward by this much.
const DETONATION_RISE: f32 = 25.0;
pub const DETONATION_SECS: f32 = 0.5;

/// Every hazard any course can scroll past the players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Log,
    Hole,
    Spike,
    Enemy,
    Pipe,
    QuestionBlock,
    Goomba,
    BulletBill,
    Boo,
    Gap,
    Bomb,
    Brick,
    Fire,
    Explosion,
    Crate,
    BlueShell,
    Banana,
    RedShell,
    GreenShell,
    Lightning,
    FakeCube,
    BrokenHeart,
    BossShot,
}

/// A scrolling hazard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: ObstacleKind,
    /// Clears a crouching player but hits a standing one.
    pub requires_crouch: bool,
    /// Seconds until a bomb goes off.
    pub fuse: Option<f32>,
    /// Seconds an explosion keeps burning.
    pub blast: Option<f32>,
    pub vy: f32,
    /// Bit `i` is set once player `i` has been hit by this obstacle.
    struck: u8,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            kind,
            requires_crouch: false,
            fuse: None,
            blast: None,
            vy: 0.0,
            struck: 0,
        }
    }

    pub fn crouch(mut self) -> Self {
        self.requires_crouch = true;
        self
    }

    pub fn with_fuse(mut self, secs: f32) -> Self {
        self.fuse = Some(secs);
        self
    }

    pub fn with_blast(mut self, secs: f32) -> Self {
        self.blast = Some(secs);
        self
    }

    pub fn with_vy(mut self, vy: f32) -> Self {
        self.vy = vy;
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Scroll left by `scroll * dt` and run fuse and blast timers.
    /// Returns true when a bomb detonated this step.
    pub fn update(&mut self, dt: f32, scroll: f32) -> bool {
        self.x -= scroll * dt;
        self.y += self.vy * dt;

        if let Some(blast) = self.blast.as_mut() {
            *blast -= dt;
        }
        let mut detonated = false;
        if let Some(fuse) = self.fuse.as_mut() {
            *fuse -= dt;
            if *fuse <= 0.0 {
                self.detonate();
                detonated = true;
            }
        }
        detonated
    }

    fn detonate(&mut self) {
        self.kind = ObstacleKind::Explosion;
        self.fuse = None;
        self.blast = Some(DETONATION_SECS);
        self.width = DETONATION_SIZE;
        self.height = DETONATION_SIZE;
        self.y -= DETONATION_RISE;
    }

    /// An explosion whose blast has burned out.
    pub fn is_spent(&self) -> bool {
        self.blast.is_some_and(|b| b <= 0.0)
    }

    pub fn has_struck(&self, player: usize) -> bool {
        self.struck & player_bit(player) != 0
    }

    pub fn mark_struck(&mut self, player: usize) {
        self.struck |= player_bit(player);
    }
}

fn player_bit(player: usize) -> u8 {
    1 << player.min(7)
}

/// Collectibles across all courses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    Coin,
    BombUp,
    SpeedUp,
    FireUp,
    /// Shield for a few seconds.
    Star,
    Mushroom,
    Heart,
    AttackBoss,
    /// Shield until the next hit.
    Shield,
    Speed,
}

impl PickupKind {
    pub fn is_speed_boost(self) -> bool {
        matches!(self, PickupKind::SpeedUp | PickupKind::Mushroom | PickupKind::Speed)
    }
}

impl PowerUpKind for PickupKind {
    fn duration(&self) -> f32 {
        match self {
            PickupKind::Star => 5.0,
            PickupKind::Mushroom => 3.0,
            PickupKind::SpeedUp | PickupKind::Speed => SPEED_BOOST_SECS,
            PickupKind::Shield => f32::INFINITY,
            PickupKind::Coin
            | PickupKind::BombUp
            | PickupKind::FireUp
            | PickupKind::Heart
            | PickupKind::AttackBoss => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub kind: PickupKind,
    pub collected: bool,
}

impl Pickup {
    pub fn new(kind: PickupKind, x: f32, y: f32, size: f32) -> Self {
        Self {
            x,
            y,
            size,
            kind,
            collected: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }
}
