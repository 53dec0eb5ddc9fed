use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Projectiles older than this are removed (seconds).
pub const PROJECTILE_MAX_LIFETIME: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Round shot from a boss volley.
    Orb,
    /// Flat wave sliding along the ground.
    Shockwave,
}

impl ProjectileKind {
    pub fn size(self) -> (f32, f32) {
        match self {
            ProjectileKind::Orb => (16.0, 16.0),
            ProjectileKind::Shockwave => (32.0, 16.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub kind: ProjectileKind,
    pub lifetime: f32,
}

impl Projectile {
    pub fn new(x: f32, y: f32, vx: f32, vy: f32, kind: ProjectileKind) -> Self {
        Self {
            x,
            y,
            vx,
            vy,
            kind,
            lifetime: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.x += self.vx * dt;
        self.y += self.vy * dt;
        self.lifetime += dt;
    }

    pub fn bounds(&self) -> Rect {
        let (w, h) = self.kind.size();
        Rect::new(self.x, self.y, w, h)
    }

    /// True once the projectile has left `arena` by more than its own size,
    /// or has lived too long.
    pub fn should_destroy(&self, arena: &Rect) -> bool {
        let (w, h) = self.kind.size();
        let limits = arena.expand(w, h);
        self.lifetime > PROJECTILE_MAX_LIFETIME
            || self.x < limits.x
            || self.x > limits.right()
            || self.y < limits.y
            || self.y > limits.bottom()
    }
}
