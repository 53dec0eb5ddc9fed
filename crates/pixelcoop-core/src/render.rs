use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::player::{Player, PlayerColor};

/// Platformer screen size in pixels.
pub const PLATFORMER_CANVAS: (f32, f32) = (800.0, 450.0);
/// Runner screen size in pixels.
pub const RUNNER_CANVAS: (f32, f32) = (1000.0, 400.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#rrggbb` or `#rgb` into an opaque colour.
    pub fn from_hex(s: &str) -> Option<Self> {
        PlayerColor::from_hex(s).map(Color::from)
    }
}

impl From<PlayerColor> for Color {
    fn from(c: PlayerColor) -> Self {
        Color::rgb(c.r, c.g, c.b)
    }
}

/// Drawing backend the simulation renders into.
pub trait DrawSurface {
    fn clear(&mut self, color: Color);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color);
    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color);
    fn fill_vertical_gradient(&mut self, rect: Rect, top: Color, bottom: Color);
}

/// Body, eyes and any shield bubble for one player.
pub fn draw_player(surface: &mut dyn DrawSurface, player: &Player) {
    let body = player.bounds();
    let color = Color::from(player.color);
    surface.fill_rect(body, color);

    let eye_y = body.y + (body.height * 0.25).min(8.0);
    for eye_x in [body.x + 5.0, body.right() - 9.0] {
        surface.fill_rect(Rect::new(eye_x, eye_y, 4.0, 4.0), Color::WHITE);
    }

    if player.has_shield {
        let (cx, cy) = body.center();
        let radius = body.width.max(body.height) * 0.75;
        surface.fill_circle(cx, cy, radius, Color::rgb(0x5d, 0xad, 0xe2).with_alpha(90));
    }
    if player.speed_boost_timer > 0.0 {
        surface.fill_rect(
            Rect::new(body.x - 6.0, body.bottom() - 4.0, 4.0, 4.0),
            Color::rgb(0xf1, 0xc4, 0x0f),
        );
    }
}
