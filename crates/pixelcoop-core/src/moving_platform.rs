use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::patrol::{Axis, Patrol};

pub const PLATFORM_SPEED: f32 = 50.0;
/// Height of the landing sensor straddling the platform top.
const TOP_SENSOR_HEIGHT: f32 = 4.0;

/// An oscillating platform players can ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingPlatform {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub patrol: Patrol,
}

impl MovingPlatform {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        axis: Axis,
        min: f32,
        max: f32,
        speed: f32,
    ) -> Self {
        Self {
            x,
            y,
            width,
            height,
            patrol: Patrol::new(axis, min, max, speed),
        }
    }

    pub fn update(&mut self, dt: f32) {
        match self.patrol.axis {
            Axis::Horizontal => self.patrol.advance(&mut self.x, self.width, dt),
            Axis::Vertical => self.patrol.advance(&mut self.y, self.height, dt),
        }
    }

    /// Current (vx, vy), used to carry riders.
    pub fn velocity(&self) -> (f32, f32) {
        self.patrol.components()
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Thin sensor around the top surface used for landing checks.
    pub fn top_bounds(&self) -> Rect {
        Rect::new(
            self.x,
            self.y - TOP_SENSOR_HEIGHT / 2.0,
            self.width,
            TOP_SENSOR_HEIGHT,
        )
    }
}
