use serde::{Deserialize, Serialize};

use pixelcoop_core::geometry::{Rect, is_colliding};
use pixelcoop_core::moving_platform::MovingPlatform;
use pixelcoop_core::powerup::PowerUp;

/// Tile edge length in pixels.
pub const TILE_SIZE: f32 = 32.0;
/// Grid columns (800px / 32px).
pub const GRID_WIDTH: usize = 25;
/// Grid rows (450px / 32px).
pub const GRID_HEIGHT: usize = 14;

/// Boss-arena pressure plate identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonId {
    One,
    Two,
}

/// Kinds of static level geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Platform,
    Death,
    Goal,
    Button(ButtonId),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub rect: Rect,
}

/// A pressure plate and whether a player is standing on it this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub id: ButtonId,
    pub rect: Rect,
    pub active: bool,
}

/// Tiles overlapping a query rectangle, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collisions {
    pub platforms: Vec<Rect>,
    pub deaths: Vec<Rect>,
    pub goals: Vec<Rect>,
    pub buttons: Vec<ButtonId>,
}

/// Static geometry plus the dynamic extras some levels carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: u8,
    tiles: Vec<Tile>,
    start: (f32, f32),
    moving_platforms: Vec<MovingPlatform>,
    power_ups: Vec<PowerUp>,
    buttons: Vec<Button>,
    has_boss: bool,
}

impl Level {
    /// Build a level from grid rows. `#` platform, `^` death, `G` goal,
    /// `1`/`2` buttons; anything else is empty.
    pub fn from_grid(id: u8, rows: &[&str], start: (f32, f32)) -> Self {
        let mut tiles = Vec::new();
        let mut buttons = Vec::new();
        for (row, line) in rows.iter().enumerate().take(GRID_HEIGHT) {
            for (col, ch) in line.chars().enumerate().take(GRID_WIDTH) {
                let kind = match ch {
                    '#' => TileKind::Platform,
                    '^' => TileKind::Death,
                    'G' => TileKind::Goal,
                    '1' => TileKind::Button(ButtonId::One),
                    '2' => TileKind::Button(ButtonId::Two),
                    _ => continue,
                };
                let rect = Rect::new(
                    col as f32 * TILE_SIZE,
                    row as f32 * TILE_SIZE,
                    TILE_SIZE,
                    TILE_SIZE,
                );
                if let TileKind::Button(id) = kind {
                    buttons.push(Button {
                        id,
                        rect,
                        active: false,
                    });
                }
                tiles.push(Tile { kind, rect });
            }
        }
        Self {
            id,
            tiles,
            start,
            moving_platforms: Vec::new(),
            power_ups: Vec::new(),
            buttons,
            has_boss: false,
        }
    }

    /// Build a level from free-form rectangles instead of a grid.
    pub fn from_rects(
        id: u8,
        start: (f32, f32),
        platforms: &[Rect],
        deaths: &[Rect],
        goals: &[Rect],
    ) -> Self {
        let tagged = |kind: TileKind, rects: &[Rect]| {
            rects
                .iter()
                .map(move |&rect| Tile { kind, rect })
                .collect::<Vec<_>>()
        };
        let mut tiles = tagged(TileKind::Platform, platforms);
        tiles.extend(tagged(TileKind::Death, deaths));
        tiles.extend(tagged(TileKind::Goal, goals));
        Self {
            id,
            tiles,
            start,
            moving_platforms: Vec::new(),
            power_ups: Vec::new(),
            buttons: Vec::new(),
            has_boss: false,
        }
    }

    pub fn with_moving_platforms(mut self, platforms: Vec<MovingPlatform>) -> Self {
        self.moving_platforms = platforms;
        self
    }

    pub fn with_power_ups(mut self, power_ups: Vec<PowerUp>) -> Self {
        self.power_ups = power_ups;
        self
    }

    pub fn with_boss(mut self) -> Self {
        self.has_boss = true;
        self
    }

    pub fn start_position(&self) -> (f32, f32) {
        self.start
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn moving_platforms(&self) -> &[MovingPlatform] {
        &self.moving_platforms
    }

    pub fn power_ups(&self) -> &[PowerUp] {
        &self.power_ups
    }

    pub fn power_ups_mut(&mut self) -> &mut [PowerUp] {
        &mut self.power_ups
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn has_boss(&self) -> bool {
        self.has_boss
    }

    pub fn collisions(&self, bounds: &Rect) -> Collisions {
        let mut hits = Collisions::default();
        for tile in self.tiles.iter().filter(|t| is_colliding(bounds, &t.rect)) {
            match tile.kind {
                TileKind::Platform => hits.platforms.push(tile.rect),
                TileKind::Death => hits.deaths.push(tile.rect),
                TileKind::Goal => hits.goals.push(tile.rect),
                TileKind::Button(id) => hits.buttons.push(id),
            }
        }
        hits
    }

    /// Indices of moving platforms whose top sensor overlaps `bounds`.
    pub fn moving_platform_hits(&self, bounds: &Rect) -> Vec<usize> {
        self.moving_platforms
            .iter()
            .enumerate()
            .filter(|(_, p)| is_colliding(bounds, &p.top_bounds()))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn update(&mut self, dt: f32) {
        for platform in &mut self.moving_platforms {
            platform.update(dt);
        }
        for power_up in &mut self.power_ups {
            power_up.update(dt);
        }
    }

    /// Mark exactly the buttons in `pressed` as active.
    pub fn set_pressed_buttons(&mut self, pressed: &[ButtonId]) {
        for button in &mut self.buttons {
            button.active = pressed.contains(&button.id);
        }
    }

    pub fn both_buttons_active(&self) -> bool {
        !self.buttons.is_empty() && self.buttons.iter().all(|b| b.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelcoop_core::patrol::Axis;
    use pixelcoop_core::powerup::PowerUpType;

    fn small() -> Level {
        Level::from_grid(
            9,
            &[
                ".........................",
                "..G......................",
                "...............1.....2...",
                "####^^###################",
            ],
            (0.0, 0.0),
        )
    }

    #[test]
    fn grid_parsing_places_tiles_on_32px_cells() {
        let level = small();
        let deaths: Vec<_> = level
            .tiles()
            .iter()
            .filter(|t| t.kind == TileKind::Death)
            .collect();
        assert_eq!(deaths.len(), 2);
        assert_eq!(deaths[0].rect, Rect::new(128.0, 96.0, 32.0, 32.0));
        assert_eq!(level.buttons().len(), 2);
        assert_eq!(level.buttons()[1].rect.x, 21.0 * TILE_SIZE);
    }

    #[test]
    fn collisions_group_by_kind() {
        let level = small();
        let feet = Rect::new(120.0, 80.0, 24.0, 32.0);
        let hits = level.collisions(&feet);
        assert_eq!(hits.platforms.len(), 1, "Touches the platform at col 3");
        assert_eq!(hits.deaths.len(), 1, "Touches the spike at col 4");
        assert!(hits.goals.is_empty());

        let goal = level.collisions(&Rect::new(70.0, 40.0, 24.0, 32.0));
        assert_eq!(goal.goals.len(), 1);
    }

    #[test]
    fn edge_contact_is_not_a_collision() {
        let level = small();
        let standing = Rect::new(0.0, 64.0, 24.0, 32.0);
        assert!(
            level.collisions(&standing).platforms.is_empty(),
            "Touching the top edge exactly does not overlap"
        );
    }

    #[test]
    fn buttons_follow_pressed_set() {
        let mut level = small();
        assert!(!level.both_buttons_active());
        level.set_pressed_buttons(&[ButtonId::One]);
        assert!(!level.both_buttons_active());
        level.set_pressed_buttons(&[ButtonId::Two, ButtonId::One]);
        assert!(level.both_buttons_active());
        level.set_pressed_buttons(&[]);
        assert!(level.buttons().iter().all(|b| !b.active));
    }

    #[test]
    fn update_moves_platforms_and_ages_power_ups() {
        let mut level = Level::from_rects(3, (0.0, 0.0), &[], &[], &[])
            .with_moving_platforms(vec![MovingPlatform::new(
                100.0,
                200.0,
                60.0,
                16.0,
                Axis::Horizontal,
                100.0,
                300.0,
                50.0,
            )])
            .with_power_ups(vec![PowerUp::new(10.0, 10.0, PowerUpType::Speed)]);
        level.update(1.0);
        assert_eq!(level.moving_platforms()[0].x, 150.0);
        assert_eq!(level.power_ups()[0].age, 1.0);
        assert_eq!(
            level.moving_platform_hits(&Rect::new(160.0, 170.0, 24.0, 32.0)),
            vec![0]
        );
    }

    #[test]
    fn capabilities_default_to_absent() {
        let level = Level::from_rects(1, (0.0, 0.0), &[], &[], &[]);
        assert!(level.moving_platforms().is_empty());
        assert!(level.power_ups().is_empty());
        assert!(level.buttons().is_empty());
        assert!(!level.has_boss());
        assert!(!level.both_buttons_active());
    }
}
