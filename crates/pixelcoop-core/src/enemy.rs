use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::patrol::{Axis, Patrol};

pub const ENEMY_SIZE: f32 = 24.0;
pub const ENEMY_SPEED: f32 = 80.0;

/// A patrolling hazard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub patrol: Patrol,
    pub animation_time: f32,
}

impl Enemy {
    /// Patrol along `axis` between `min` and `max` at the default speed.
    pub fn new(x: f32, y: f32, axis: Axis, min: f32, max: f32) -> Self {
        Self::with_speed(x, y, axis, min, max, ENEMY_SPEED)
    }

    pub fn with_speed(x: f32, y: f32, axis: Axis, min: f32, max: f32, speed: f32) -> Self {
        Self {
            x,
            y,
            patrol: Patrol::new(axis, min, max, speed),
            animation_time: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.animation_time += dt;
        match self.patrol.axis {
            Axis::Horizontal => self.patrol.advance(&mut self.x, ENEMY_SIZE, dt),
            Axis::Vertical => self.patrol.advance(&mut self.y, ENEMY_SIZE, dt),
        }
    }

    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.patrol.set_speed_multiplier(multiplier);
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, ENEMY_SIZE, ENEMY_SIZE)
    }
}
