use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::geometry::Rect;

/// Pickup edge length in pixels.
pub const POWER_UP_SIZE: f32 = 20.0;
/// Uncollected pickups vanish after this many seconds.
pub const POWER_UP_LIFETIME: f32 = 10.0;

/// Trait for mode-specific pickup kind enums.
pub trait PowerUpKind: Clone + Copy + PartialEq + Serialize + DeserializeOwned {
    /// Effect length in seconds. Use `f32::INFINITY` for effects that last until consumed.
    fn duration(&self) -> f32;
}

/// Timed effect on a player, generic over the kind enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ActivePowerUp<K: PowerUpKind> {
    pub kind: K,
    pub remaining: f32,
}

impl<K: PowerUpKind> ActivePowerUp<K> {
    pub fn new(kind: K) -> Self {
        Self {
            remaining: kind.duration(),
            kind,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        if self.remaining.is_finite() {
            self.remaining -= dt;
        }
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }
}

/// Platformer pickup effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpType {
    Speed,
    Shield,
}

/// A pickup placed in a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub x: f32,
    pub y: f32,
    pub kind: PowerUpType,
    pub collected: bool,
    pub age: f32,
}

impl PowerUp {
    pub fn new(x: f32, y: f32, kind: PowerUpType) -> Self {
        Self {
            x,
            y,
            kind,
            collected: false,
            age: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if !self.collected {
            self.age += dt;
        }
    }

    pub fn is_expired(&self) -> bool {
        self.age >= POWER_UP_LIFETIME
    }

    /// Still on the field and collectable.
    pub fn is_active(&self) -> bool {
        !self.collected && !self.is_expired()
    }

    pub fn collect(&mut self) {
        self.collected = true;
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, POWER_UP_SIZE, POWER_UP_SIZE)
    }
}
