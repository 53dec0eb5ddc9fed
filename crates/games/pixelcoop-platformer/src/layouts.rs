use pixelcoop_core::geometry::Rect;
use pixelcoop_core::moving_platform::MovingPlatform;
use pixelcoop_core::patrol::Axis;
use pixelcoop_core::powerup::{PowerUp, PowerUpType};

use crate::level::Level;

/// Build level `id`, or `None` for an unknown id.
pub fn build_level(id: u8) -> Option<Level> {
    match id {
        1 => Some(level_one()),
        2 => Some(level_two()),
        3 => Some(level_three()),
        4 => Some(boss_arena()),
        _ => None,
    }
}

/// Tutorial climb: ledges up to the goal in the top right, a spike pit midway.
fn level_one() -> Level {
    Level::from_grid(
        1,
        &[
            ".........................",
            ".........................",
            ".........................",
            ".....................GGG.",
            "....................####.",
            ".................##......",
            "........###..............",
            "..............##.........",
            ".....##..................",
            "............^^...........",
            "............^^...........",
            "####........^^...........",
            "............^^...........",
            "#########################",
        ],
        (64.0, 320.0),
    )
}

/// Patrol level. Enemies come from the level manager.
fn level_two() -> Level {
    Level::from_grid(
        2,
        &[
            ".........................",
            ".........................",
            ".........................",
            ".....................GGG.",
            "....................####.",
            ".........................",
            "........###........##....",
            ".................##......",
            ".........................",
            "..............#######....",
            ".........................",
            "#############............",
            ".............^^.......^^.",
            "#########################",
        ],
        (32.0, 320.0),
    )
}

/// Gaps bridged by moving platforms, with power-ups on the risky route.
fn level_three() -> Level {
    let platforms = [
        Rect::new(0.0, 360.0, 160.0, 20.0),
        Rect::new(200.0, 320.0, 80.0, 20.0),
        Rect::new(330.0, 280.0, 60.0, 20.0),
        Rect::new(430.0, 340.0, 80.0, 20.0),
        Rect::new(550.0, 300.0, 60.0, 20.0),
        Rect::new(640.0, 260.0, 60.0, 20.0),
        Rect::new(720.0, 340.0, 70.0, 20.0),
    ];
    let deaths = [
        Rect::new(150.0, 380.0, 40.0, 20.0),
        Rect::new(290.0, 380.0, 30.0, 20.0),
        Rect::new(515.0, 380.0, 30.0, 20.0),
        Rect::new(0.0, 400.0, 800.0, 100.0),
    ];
    let goals = [Rect::new(725.0, 320.0, 60.0, 20.0)];

    Level::from_rects(3, (32.0, 330.0), &platforms, &deaths, &goals)
        .with_moving_platforms(vec![
            MovingPlatform::new(165.0, 340.0, 40.0, 16.0, Axis::Horizontal, 165.0, 290.0, 40.0),
            MovingPlatform::new(390.0, 240.0, 40.0, 16.0, Axis::Vertical, 240.0, 336.0, 50.0),
            MovingPlatform::new(600.0, 280.0, 40.0, 16.0, Axis::Horizontal, 600.0, 700.0, 45.0),
        ])
        .with_power_ups(vec![
            PowerUp::new(230.0, 290.0, PowerUpType::Speed),
            PowerUp::new(400.0, 200.0, PowerUpType::Shield),
            PowerUp::new(460.0, 310.0, PowerUpType::Speed),
        ])
}

/// Walled arena. The floor has a pit in the middle and a pressure plate on
/// each side.
fn boss_arena() -> Level {
    Level::from_grid(
        4,
        &[
            "#########################",
            "#.......................#",
            "#.......................#",
            "#.......................#",
            "#.......................#",
            "#.......................#",
            "#.......................#",
            "#.......................#",
            "#.......................#",
            "#.......................#",
            "#....1.............2....#",
            "########.........########",
            ".........................",
            "#########################",
        ],
        (400.0, 300.0),
    )
    .with_boss()
}
