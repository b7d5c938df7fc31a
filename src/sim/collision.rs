//! Axis-aligned rectangle overlap
//!
//! Speeds are small enough that one tick never skips over a paddle or wall,
//! so a discrete overlap test is all the simulation needs.

use glam::Vec2;

/// Axis-aligned rectangle (origin at top-left, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Scale both origin and size, e.g. from arena units to pixels
    pub fn scaled(&self, scale: Vec2) -> Self {
        Self {
            pos: self.pos * scale,
            size: self.size * scale,
        }
    }
}

/// True iff the two half-open rectangles overlap on both axes
#[inline]
pub fn collides(a: &Rect, b: &Rect) -> bool {
    a.pos.x < b.right() && a.right() > b.pos.x && a.pos.y < b.bottom() && a.bottom() > b.pos.y
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlapping_rects_collide() {
        let ball = Rect::new(30.0, 100.0, 15.0, 15.0);
        let paddle = Rect::new(30.0, 90.0, 15.0, 75.0);
        assert!(collides(&ball, &paddle));
    }

    #[test]
    fn test_touching_edges_do_not_collide() {
        // Ball sitting flush against the left paddle's outer edge
        let paddle = Rect::new(30.0, 90.0, 15.0, 75.0);
        let ball = Rect::new(45.0, 100.0, 15.0, 15.0);
        assert!(!collides(&ball, &paddle));
        assert!(!collides(&paddle, &ball));
    }

    #[test]
    fn test_contained_rect_collides() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(10.0, 10.0, 5.0, 5.0);
        assert!(collides(&outer, &inner));
    }

    fn rect_strategy() -> impl Strategy<Value = Rect> {
        (-800.0f32..800.0, -800.0f32..800.0, 0.5f32..200.0, 0.5f32..200.0)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn collides_is_symmetric(a in rect_strategy(), b in rect_strategy()) {
            prop_assert_eq!(collides(&a, &b), collides(&b, &a));
        }

        #[test]
        fn separated_on_x_never_collides(a in rect_strategy(), gap in 0.0f32..100.0, y in -800.0f32..800.0, w in 0.5f32..200.0, h in 0.5f32..200.0) {
            let b = Rect::new(a.right() + gap, y, w, h);
            prop_assert!(!collides(&a, &b));
        }

        #[test]
        fn separated_on_y_never_collides(a in rect_strategy(), gap in 0.0f32..100.0, x in -800.0f32..800.0, w in 0.5f32..200.0, h in 0.5f32..200.0) {
            let b = Rect::new(x, a.bottom() + gap, w, h);
            prop_assert!(!collides(&a, &b));
        }
    }
}
