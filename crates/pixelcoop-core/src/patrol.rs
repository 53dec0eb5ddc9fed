use serde::{Deserialize, Serialize};

/// Axis an entity oscillates along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Back-and-forth motion between two bounds on one axis.
///
/// The entity's leading coordinate must stay in `[min, max - extent]`.
/// Reaching either bound flips the direction and clamps the position back
/// inside the range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Patrol {
    pub axis: Axis,
    pub min: f32,
    pub max: f32,
    pub base_speed: f32,
    /// Signed speed along `axis`.
    pub velocity: f32,
}

impl Patrol {
    pub fn new(axis: Axis, min: f32, max: f32, speed: f32) -> Self {
        Self {
            axis,
            min,
            max,
            base_speed: speed,
            velocity: speed,
        }
    }

    /// Move `pos` (the coordinate along `axis`) and bounce at the bounds.
    pub fn advance(&mut self, pos: &mut f32, extent: f32, dt: f32) {
        *pos += self.velocity * dt;
        if *pos <= self.min || *pos + extent >= self.max {
            self.velocity = -self.velocity;
            *pos = pos.min(self.max - extent).max(self.min);
        }
    }

    /// Velocity as an (x, y) pair.
    pub fn components(&self) -> (f32, f32) {
        match self.axis {
            Axis::Horizontal => (self.velocity, 0.0),
            Axis::Vertical => (0.0, self.velocity),
        }
    }

    /// Rescale to `base_speed * multiplier`, keeping the current direction.
    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        let speed = self.base_speed * multiplier;
        self.velocity = if self.velocity < 0.0 { -speed } else { speed };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounces_at_max_and_clamps() {
        let mut patrol = Patrol::new(Axis::Horizontal, 100.0, 200.0, 80.0);
        let mut x = 170.0;
        patrol.advance(&mut x, 24.0, 0.1);
        assert_eq!(x, 176.0, "Position clamps to max - extent");
        assert_eq!(patrol.velocity, -80.0);
    }

    #[test]
    fn bounces_at_min() {
        let mut patrol = Patrol::new(Axis::Vertical, 100.0, 200.0, 80.0);
        patrol.velocity = -80.0;
        let mut y = 104.0;
        patrol.advance(&mut y, 24.0, 0.1);
        assert_eq!(y, 100.0);
        assert_eq!(patrol.velocity, 80.0);
        assert_eq!(patrol.components(), (0.0, 80.0));
    }

    #[test]
    fn multiplier_keeps_direction() {
        let mut patrol = Patrol::new(Axis::Horizontal, 0.0, 500.0, 80.0);
        patrol.velocity = -80.0;
        patrol.set_speed_multiplier(1.5);
        assert_eq!(patrol.velocity, -120.0);
        patrol.set_speed_multiplier(1.0);
        assert_eq!(patrol.velocity, -80.0, "Multiplier applies to base speed, not current");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn position_stays_in_range(
                min in 0.0f32..300.0,
                span in 40.0f32..400.0,
                speed in 10.0f32..300.0,
                steps in 1usize..600,
            ) {
                let max = min + span;
                let extent = 24.0;
                let mut patrol = Patrol::new(Axis::Horizontal, min, max, speed);
                let mut pos = min + 1.0;
                for _ in 0..steps {
                    patrol.advance(&mut pos, extent, 1.0 / 60.0);
                    prop_assert!(pos >= min - 1e-3);
                    prop_assert!(pos + extent <= max + 1e-3);
                }
            }
        }
    }
}
