use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen pixels. Origin is the top-left corner, y grows down.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Grow the rectangle by `mx` on the left and right and `my` on the top and bottom.
    pub fn expand(&self, mx: f32, my: f32) -> Self {
        Self {
            x: self.x - mx,
            y: self.y - my,
            width: self.width + 2.0 * mx,
            height: self.height + 2.0 * my,
        }
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        is_colliding(self, other)
    }
}

/// Strict AABB overlap. Rectangles that only share an edge do not collide.
pub fn is_colliding(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.height && a.y + a.height > b.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_rects_collide() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(is_colliding(&a, &b));
        assert!(is_colliding(&b, &a), "Overlap must be symmetric");
    }

    #[test]
    fn touching_edges_do_not_collide() {
        let floor = Rect::new(0.0, 352.0, 32.0, 32.0);
        let standing = Rect::new(4.0, 320.0, 24.0, 32.0);
        assert!(
            !is_colliding(&standing, &floor),
            "Feet resting exactly on a tile top are not an overlap"
        );
        let beside = Rect::new(32.0, 352.0, 32.0, 32.0);
        assert!(!is_colliding(&floor, &beside));
    }

    #[test]
    fn contained_rect_collides() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 2.0, 2.0);
        assert!(outer.overlaps(&inner));
    }

    #[test]
    fn expand_and_translate() {
        let r = Rect::new(10.0, 20.0, 16.0, 16.0);
        let e = r.expand(16.0, 16.0);
        assert_eq!(e, Rect::new(-6.0, 4.0, 48.0, 48.0));
        let t = r.translate(-5.0, 2.0);
        assert_eq!((t.x, t.y, t.width), (5.0, 22.0, 16.0));
        assert_eq!(r.center(), (18.0, 28.0));
        assert_eq!(r.right(), 26.0);
        assert_eq!(r.bottom(), 36.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn collision_is_symmetric(
                ax in -500.0f32..500.0, ay in -500.0f32..500.0,
                aw in 0.5f32..200.0, ah in 0.5f32..200.0,
                bx in -500.0f32..500.0, by in -500.0f32..500.0,
                bw in 0.5f32..200.0, bh in 0.5f32..200.0,
            ) {
                let a = Rect::new(ax, ay, aw, ah);
                let b = Rect::new(bx, by, bw, bh);
                prop_assert_eq!(is_colliding(&a, &b), is_colliding(&b, &a));
            }

            #[test]
            fn rect_collides_with_itself(
                x in -500.0f32..500.0, y in -500.0f32..500.0,
                w in 0.5f32..200.0, h in 0.5f32..200.0,
            ) {
                let r = Rect::new(x, y, w, h);
                prop_assert!(is_colliding(&r, &r));
            }
        }
    }
}
