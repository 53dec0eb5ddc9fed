//! Per-course obstacle tables. Every draw goes through the caller's seeded
//! generator so a seed replays the same run.

use std::f32::consts::PI;

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use pixelcoop_core::projectile::Projectile;

use crate::GROUND_Y;
use crate::obstacle::{Obstacle, ObstacleKind, Pickup, PickupKind};

/// New obstacles appear at the right edge of the canvas.
pub const SPAWN_X: f32 = 1000.0;
/// Forest obstacles appear a little closer, with jitter.
pub const FOREST_SPAWN_X: f32 = 800.0;
/// Holes and gaps rise this far above the ground line so running into one
/// overlaps it.
pub const GROUND_LIP: f32 = 4.0;

pub const COIN_SIZE: f32 = 20.0;
pub const BOMB_PICKUP_SIZE: f32 = 25.0;
pub const ITEM_SIZE: f32 = 30.0;

/// What one spawn produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wave {
    pub obstacles: Vec<Obstacle>,
    pub pickups: Vec<Pickup>,
}

impl Wave {
    fn obstacle(mut self, obstacle: Obstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    fn pickup(mut self, pickup: Pickup) -> Self {
        self.pickups.push(pickup);
        self
    }

    pub fn extend(&mut self, other: Wave) {
        self.obstacles.extend(other.obstacles);
        self.pickups.extend(other.pickups);
    }
}

const FOREST_KINDS: [ObstacleKind; 4] = [
    ObstacleKind::Log,
    ObstacleKind::Hole,
    ObstacleKind::Spike,
    ObstacleKind::Enemy,
];

fn forest_obstacle(kind: ObstacleKind, x: f32) -> Obstacle {
    let y = GROUND_Y - 40.0;
    match kind {
        ObstacleKind::Hole => Obstacle::new(kind, x, GROUND_Y - GROUND_LIP, 60.0, 80.0),
        ObstacleKind::Spike => Obstacle::new(kind, x, y, 32.0, 20.0).crouch(),
        ObstacleKind::Enemy => Obstacle::new(kind, x, y, 32.0, 32.0),
        _ => Obstacle::new(ObstacleKind::Log, x, y, 40.0, 30.0),
    }
}

fn pick<T: Copy>(rng: &mut StdRng, items: &[T]) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.random_range(0..items.len())).copied()
}

/// Three obstacles waiting ahead when a forest run starts.
pub fn forest_opening(rng: &mut StdRng) -> Wave {
    (0..3).fold(Wave::default(), |wave, i| {
        let kind = pick(rng, &FOREST_KINDS).unwrap_or(ObstacleKind::Log);
        wave.obstacle(forest_obstacle(kind, FOREST_SPAWN_X + i as f32 * 200.0))
    })
}

pub fn forest(rng: &mut StdRng, difficulty: f32) -> Wave {
    if difficulty > 2.0 && rng.random::<f32>() < 0.3 {
        let x = FOREST_SPAWN_X;
        return Wave::default()
            .obstacle(forest_obstacle(ObstacleKind::Log, x))
            .obstacle(forest_obstacle(ObstacleKind::Spike, x + 80.0));
    }
    let kind = pick(rng, &FOREST_KINDS).unwrap_or(ObstacleKind::Log);
    let x = FOREST_SPAWN_X + rng.random::<f32>() * 100.0;
    Wave::default().obstacle(forest_obstacle(kind, x))
}

fn coin(x: f32, y: f32) -> Pickup {
    Pickup::new(PickupKind::Coin, x, y, COIN_SIZE)
}

pub fn pipes(rng: &mut StdRng) -> Wave {
    let x = SPAWN_X;
    let roll = rng.random::<f32>();
    if roll < 0.3 {
        let height = if rng.random_bool(0.5) { 50.0 } else { 70.0 };
        let top = GROUND_Y - height;
        (0..3).fold(
            Wave::default().obstacle(Obstacle::new(ObstacleKind::Pipe, x, top, 40.0, height)),
            |wave, i| wave.pickup(coin(x + 10.0 + i as f32 * 20.0, top - 40.0)),
        )
    } else if roll < 0.5 {
        let blocks = rng.random_range(1..=3);
        (0..blocks).fold(Wave::default(), |wave, i| {
            let bx = x + i as f32 * 40.0;
            wave.obstacle(Obstacle::new(ObstacleKind::QuestionBlock, bx, 250.0, 30.0, 30.0))
                .pickup(coin(bx + 5.0, 220.0))
        })
    } else if roll < 0.6 {
        Wave::default().obstacle(Obstacle::new(ObstacleKind::Goomba, x, 340.0, 30.0, 30.0))
    } else if roll < 0.72 {
        Wave::default().obstacle(Obstacle::new(ObstacleKind::BulletBill, x, 320.0, 50.0, 30.0).crouch())
    } else if roll < 0.84 {
        Wave::default().obstacle(Obstacle::new(ObstacleKind::Boo, x, 310.0, 40.0, 40.0).crouch())
    } else if roll < 0.92 {
        let width = 60.0 + rng.random::<f32>() * 30.0;
        Wave::default().obstacle(Obstacle::new(
            ObstacleKind::Gap,
            x,
            GROUND_Y - GROUND_LIP,
            width,
            200.0,
        ))
    } else {
        let height = 50.0;
        let wave = Wave::default()
            .obstacle(Obstacle::new(ObstacleKind::Pipe, x, GROUND_Y - height, 50.0, height))
            .obstacle(Obstacle::new(ObstacleKind::Goomba, x + 100.0, 340.0, 30.0, 30.0));
        (0..5).fold(wave, |wave, i| {
            let angle = i as f32 / 4.0 * PI;
            wave.pickup(coin(x + 75.0 + angle.cos() * 40.0, 300.0 - angle.sin() * 60.0))
        })
    }
}

const BOMB_PICKUPS: [PickupKind; 3] = [PickupKind::BombUp, PickupKind::SpeedUp, PickupKind::FireUp];

fn bomb(x: f32, fuse: f32) -> Obstacle {
    Obstacle::new(ObstacleKind::Bomb, x, 330.0, 40.0, 40.0).with_fuse(fuse)
}

fn fire(x: f32) -> Obstacle {
    Obstacle::new(ObstacleKind::Fire, x, 290.0, 60.0, 50.0).crouch()
}

/// A standing explosion: high ones are ducked under, low ones jumped.
fn explosion(rng: &mut StdRng, x: f32) -> Obstacle {
    let high = rng.random_bool(0.5);
    let obstacle = Obstacle::new(
        ObstacleKind::Explosion,
        x,
        if high { 280.0 } else { 320.0 },
        70.0,
        70.0,
    )
    .with_blast(3.0);
    if high { obstacle.crouch() } else { obstacle }
}

pub fn bombs(rng: &mut StdRng) -> Wave {
    let x = SPAWN_X;
    let roll = rng.random::<f32>();
    if roll < 0.25 {
        let wave = Wave::default().obstacle(bomb(x, 2.5));
        if rng.random::<f32>() > 0.6 {
            let kind = pick(rng, &BOMB_PICKUPS).unwrap_or(PickupKind::BombUp);
            wave.pickup(Pickup::new(kind, x + 60.0, 280.0, BOMB_PICKUP_SIZE))
        } else {
            wave
        }
    } else if roll < 0.45 {
        let bricks = rng.random_range(1..=2);
        (0..bricks).fold(Wave::default(), |wave, i| {
            wave.obstacle(Obstacle::new(ObstacleKind::Brick, x + i as f32 * 45.0, 330.0, 40.0, 40.0))
        })
    } else if roll < 0.58 {
        Wave::default().obstacle(fire(x))
    } else if roll < 0.70 {
        Wave::default().obstacle(explosion(rng, x))
    } else if roll < 0.82 {
        let stack = rng.random_range(2..=3);
        (0..stack).fold(Wave::default(), |wave, i| {
            wave.obstacle(Obstacle::new(ObstacleKind::Crate, x, 330.0 - i as f32 * 35.0, 35.0, 35.0))
        })
    } else if roll < 0.92 {
        Wave::default().obstacle(Obstacle::new(ObstacleKind::Spike, x, 350.0, 50.0, 20.0))
    } else {
        Wave::default()
            .obstacle(bomb(x, 2.0))
            .obstacle(fire(x + 100.0))
            .pickup(Pickup::new(PickupKind::FireUp, x + 50.0, 250.0, BOMB_PICKUP_SIZE))
    }
}

const RAINBOW_PICKUPS: [PickupKind; 3] = [PickupKind::Star, PickupKind::Mushroom, PickupKind::Heart];

fn rainbow_item(rng: &mut StdRng, x: f32) -> Pickup {
    let kind = pick(rng, &RAINBOW_PICKUPS).unwrap_or(PickupKind::Star);
    Pickup::new(kind, x, 270.0 + rng.random::<f32>() * 40.0, ITEM_SIZE)
}

fn blue_shell(x: f32) -> Obstacle {
    Obstacle::new(ObstacleKind::BlueShell, x, 315.0, 45.0, 35.0).crouch()
}

fn banana(x: f32) -> Obstacle {
    Obstacle::new(ObstacleKind::Banana, x, 345.0, 35.0, 25.0)
}

pub fn rainbow(rng: &mut StdRng) -> Wave {
    let x = SPAWN_X;
    let roll = rng.random::<f32>();
    if roll < 0.18 {
        Wave::default().obstacle(blue_shell(x))
    } else if roll < 0.35 {
        let count = rng.random_range(1..=3);
        let wave = (0..count).fold(Wave::default(), |wave, i| wave.obstacle(banana(x + i as f32 * 50.0)));
        if rng.random::<f32>() > 0.5 {
            wave.pickup(rainbow_item(rng, x + 25.0))
        } else {
            wave
        }
    } else if roll < 0.48 {
        Wave::default().obstacle(Obstacle::new(ObstacleKind::RedShell, x, 340.0, 40.0, 30.0))
    } else if roll < 0.58 {
        Wave::default().obstacle(Obstacle::new(ObstacleKind::GreenShell, x, 340.0, 40.0, 30.0))
    } else if roll < 0.68 {
        Wave::default().obstacle(Obstacle::new(ObstacleKind::Lightning, x, 230.0, 30.0, 120.0).crouch())
    } else if roll < 0.80 {
        Wave::default()
            .obstacle(Obstacle::new(ObstacleKind::FakeCube, x, 320.0, 40.0, 40.0))
            .pickup(rainbow_item(rng, x + 80.0))
    } else if roll < 0.90 {
        Wave::default().obstacle(Obstacle::new(ObstacleKind::BrokenHeart, x, 330.0, 50.0, 45.0))
    } else {
        Wave::default()
            .obstacle(banana(x))
            .obstacle(blue_shell(x + 80.0))
            .pickup(rainbow_item(rng, x + 40.0))
    }
}

/// Obstacle families the boss rush rotates through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Forest,
    Pipes,
    Bombs,
}

impl Theme {
    pub fn next(self) -> Self {
        match self {
            Theme::Forest => Theme::Pipes,
            Theme::Pipes => Theme::Bombs,
            Theme::Bombs => Theme::Forest,
        }
    }
}

pub fn boss_rush(rng: &mut StdRng, theme: Theme) -> Wave {
    let x = SPAWN_X;
    let roll = rng.random::<f32>();
    let obstacle = match theme {
        Theme::Forest if roll < 0.5 => Obstacle::new(ObstacleKind::Log, x, 330.0, 60.0, 40.0),
        Theme::Forest => Obstacle::new(ObstacleKind::Spike, x, 350.0, 40.0, 20.0),
        Theme::Pipes if roll < 0.4 => Obstacle::new(ObstacleKind::Pipe, x, 320.0, 40.0, 50.0),
        Theme::Pipes if roll < 0.7 => Obstacle::new(ObstacleKind::Goomba, x, 340.0, 30.0, 30.0),
        Theme::Pipes => Obstacle::new(ObstacleKind::BulletBill, x, 320.0, 50.0, 30.0).crouch(),
        Theme::Bombs if roll < 0.5 => bomb(x, 2.5),
        Theme::Bombs => explosion(rng, x),
    };
    Wave::default().obstacle(obstacle)
}

/// Attack-boss is twice as likely as the other two.
const BOSS_PICKUPS: [PickupKind; 4] = [
    PickupKind::AttackBoss,
    PickupKind::AttackBoss,
    PickupKind::Shield,
    PickupKind::Speed,
];

pub fn boss_pickup(rng: &mut StdRng) -> Pickup {
    let kind = pick(rng, &BOSS_PICKUPS).unwrap_or(PickupKind::AttackBoss);
    Pickup::new(kind, 900.0, 250.0 + rng.random::<f32>() * 80.0, ITEM_SIZE)
}

/// Turn a boss projectile into a scrolling shot with a random vertical drift.
pub fn boss_shot(rng: &mut StdRng, projectile: &Projectile) -> Obstacle {
    Obstacle::new(ObstacleKind::BossShot, projectile.x, projectile.y, 20.0, 20.0)
        .with_vy((rng.random::<f32>() - 0.5) * 100.0)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn forest_opening_spaces_three_obstacles() {
        let wave = forest_opening(&mut rng(1));
        let xs: Vec<f32> = wave.obstacles.iter().map(|o| o.x).collect();
        assert_eq!(xs, vec![800.0, 1000.0, 1200.0]);
        assert!(wave.pickups.is_empty());
    }

    #[test]
    fn holes_and_gaps_sit_on_the_ground_lip() {
        let hole = forest_obstacle(ObstacleKind::Hole, 0.0);
        assert_eq!(hole.y, GROUND_Y - GROUND_LIP);
        assert_eq!((hole.width, hole.height), (60.0, 80.0));

        let mut r = rng(3);
        for _ in 0..400 {
            for gap in pipes(&mut r).obstacles.iter().filter(|o| o.kind == ObstacleKind::Gap) {
                assert_eq!(gap.y, GROUND_Y - GROUND_LIP);
                assert!((60.0..=90.0).contains(&gap.width));
            }
        }
    }

    #[test]
    fn easy_forest_never_combos() {
        let mut r = rng(9);
        for _ in 0..200 {
            assert_eq!(forest(&mut r, 1.5).obstacles.len(), 1);
        }
    }

    #[test]
    fn crouch_obstacles_hit_standing_but_clear_crouching_runners() {
        use pixelcoop_core::player::{CROUCH_HEIGHT, PLAYER_HEIGHT};
        let crouched_top = GROUND_Y - CROUCH_HEIGHT;
        let standing_top = GROUND_Y - PLAYER_HEIGHT;
        let mut r = rng(5);
        let mut seen = 0;
        for _ in 0..300 {
            let mut wave = forest(&mut r, 3.0);
            wave.extend(pipes(&mut r));
            wave.extend(bombs(&mut r));
            wave.extend(rainbow(&mut r));
            for theme in [Theme::Forest, Theme::Pipes, Theme::Bombs] {
                wave.extend(boss_rush(&mut r, theme));
            }
            for o in wave.obstacles.iter().filter(|o| o.requires_crouch) {
                seen += 1;
                let bottom = o.bounds().bottom();
                assert!(
                    bottom <= crouched_top,
                    "{:?} at y {} reaches the crouch height",
                    o.kind,
                    o.y
                );
                assert!(
                    bottom > standing_top,
                    "{:?} at y {} passes over a standing runner",
                    o.kind,
                    o.y
                );
            }
        }
        assert!(seen > 0, "Tables produce crouch obstacles");
    }

    #[test]
    fn boss_rush_uses_the_theme_table() {
        let mut r = rng(11);
        for _ in 0..100 {
            for o in boss_rush(&mut r, Theme::Pipes).obstacles {
                assert!(matches!(
                    o.kind,
                    ObstacleKind::Pipe | ObstacleKind::Goomba | ObstacleKind::BulletBill
                ));
            }
            for o in boss_rush(&mut r, Theme::Bombs).obstacles {
                assert!(matches!(o.kind, ObstacleKind::Bomb | ObstacleKind::Explosion));
            }
        }
        assert_eq!(Theme::Bombs.next(), Theme::Forest);
    }

    #[test]
    fn boss_pickups_favour_attacks() {
        let mut r = rng(21);
        let attacks = (0..1000)
            .filter(|_| boss_pickup(&mut r).kind == PickupKind::AttackBoss)
            .count();
        assert!((400..600).contains(&attacks), "About half are attacks, got {attacks}");
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn same_seed_same_waves(seed in any::<u64>()) {
                let (mut a, mut b) = (rng(seed), rng(seed));
                for _ in 0..20 {
                    prop_assert_eq!(pipes(&mut a), pipes(&mut b));
                    prop_assert_eq!(bombs(&mut a), bombs(&mut b));
                    prop_assert_eq!(rainbow(&mut a), rainbow(&mut b));
                }
            }

            #[test]
            fn waves_spawn_off_the_visible_ground(seed in any::<u64>()) {
                let mut r = rng(seed);
                for _ in 0..20 {
                    let mut wave = pipes(&mut r);
                    wave.extend(bombs(&mut r));
                    wave.extend(rainbow(&mut r));
                    for o in &wave.obstacles {
                        prop_assert!(o.x >= SPAWN_X, "{:?} spawned at {}", o.kind, o.x);
                    }
                }
            }
        }
    }
}
