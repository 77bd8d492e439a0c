//! Narrowphase data and logic module.

pub mod swept;

use crate::{Fp, Vec2};

// ---------- Aabb ---------- //

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}
impl Aabb {
    /// # Panics
    /// Panics if a minimum exceeds its maximum. Zero-extent boxes are permitted.
    #[inline]
    pub fn new(minx: Fp, miny: Fp, maxx: Fp, maxy: Fp) -> Aabb {
        assert!(minx <= maxx);
        assert!(miny <= maxy);

        Aabb {
            min: Vec2::new(minx, miny),
            max: Vec2::new(maxx, maxy),
        }
    }
    pub fn new_safe(ax: Fp, by: Fp, cx: Fp, dy: Fp) -> Aabb {
        //! Orders minimum and maximum values.
        Aabb {
            min: Vec2::new(Fp::min(ax, cx), Fp::min(by, dy)),
            max: Vec2::new(Fp::max(ax, cx), Fp::max(by, dy)),
        }
    }
    pub fn from_pivot(position: Vec2, size: Vec2, pivot: Pivot) -> Aabb {
        //! Builds the box of extent `size` whose `pivot` anchor sits at `position`.
        //! Negative size components are treated as their magnitude.
        let size = size.abs();
        let min = position - size * pivot.fraction();
        Aabb { min, max: min + size }
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
    #[inline]
    pub fn size(self) -> Vec2 {
        self.max - self.min
    }
    #[inline]
    pub fn half_extents(self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    #[inline]
    pub fn translate(self, offset: Vec2) -> Aabb {
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
    #[inline]
    pub fn broaden(&self, dir: Vec2) -> Aabb {
        //! Returns the box covering `self` at both ends of a move by `dir`.
        Aabb {
            min: Vec2::new(
                Fp::min(self.min.x, self.min.x + dir.x),
                Fp::min(self.min.y, self.min.y + dir.y),
            ),
            max: Vec2::new(
                Fp::max(self.max.x, self.max.x + dir.x),
                Fp::max(self.max.y, self.max.y + dir.y),
            ),
        }
    }

    #[inline]
    pub fn point_test(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
    #[inline]
    pub fn aabb_test(&self, other: &Aabb) -> bool {
        //! Inclusive test: boxes that merely share a face intersect.
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        //! Strict test: the interiors must overlap, touching faces do not count.
        self.overlaps_x(other) && self.overlaps_y(other)
    }
    #[inline]
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x
    }
    #[inline]
    pub fn overlaps_y(&self, other: &Aabb) -> bool {
        self.min.y < other.max.y && self.max.y > other.min.y
    }
}

// ---------- Pivot ---------- //

/// The point of a rectangle anchored at a collider's position. Y grows upward,
/// so `Bottom*` anchors sit on the minimum y edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pivot {
    BottomLeft,
    Bottom,
    BottomRight,
    Left,
    Center,
    Right,
    TopLeft,
    Top,
    TopRight,
    /// Fraction of the size along each axis, `(0, 0)` being the minimum corner.
    Custom(Vec2),
}
impl Pivot {
    pub fn fraction(self) -> Vec2 {
        match self {
            Pivot::BottomLeft => Vec2::new(0.0, 0.0),
            Pivot::Bottom => Vec2::new(0.5, 0.0),
            Pivot::BottomRight => Vec2::new(1.0, 0.0),
            Pivot::Left => Vec2::new(0.0, 0.5),
            Pivot::Center => Vec2::new(0.5, 0.5),
            Pivot::Right => Vec2::new(1.0, 0.5),
            Pivot::TopLeft => Vec2::new(0.0, 1.0),
            Pivot::Top => Vec2::new(0.5, 1.0),
            Pivot::TopRight => Vec2::new(1.0, 1.0),
            Pivot::Custom(f) => f,
        }
    }
}
impl Default for Pivot {
    fn default() -> Self {
        Pivot::Center
    }
}

// ---------- Color ---------- //

/// RGBA debug color, straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}
impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const RED: Color = Color::rgba(255, 0, 0, 255);

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color { r, g, b, a }
    }
}
impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn pivot_anchor_test() {
        let size = Vec2::new(2.0, 4.0);
        let p = Vec2::new(10.0, 10.0);

        assert_eq!(Aabb::from_pivot(p, size, Pivot::BottomLeft), Aabb::new(10.0, 10.0, 12.0, 14.0));
        assert_eq!(Aabb::from_pivot(p, size, Pivot::Center), Aabb::new(9.0, 8.0, 11.0, 12.0));
        assert_eq!(Aabb::from_pivot(p, size, Pivot::TopRight), Aabb::new(8.0, 6.0, 10.0, 10.0));
        assert_eq!(Aabb::from_pivot(p, size, Pivot::Bottom), Aabb::new(9.0, 10.0, 11.0, 14.0));
        assert_eq!(
            Aabb::from_pivot(p, size, Pivot::Custom(Vec2::new(0.25, 0.75))),
            Aabb::new(9.5, 7.0, 11.5, 11.0)
        );
        // negative extents are taken by magnitude
        assert_eq!(Aabb::from_pivot(p, -size, Pivot::BottomLeft), Aabb::new(10.0, 10.0, 12.0, 14.0));
    }

    #[test]
    fn zero_size_is_a_point() {
        let a = Aabb::from_pivot(Vec2::new(3.0, -1.0), Vec2::ZERO, Pivot::Center);
        assert_eq!(a.min, a.max);
        assert_eq!(a.size(), Vec2::ZERO);
        assert!(a.point_test(Vec2::new(3.0, -1.0)));
    }

    #[test]
    fn aabb_helpers() {
        let a = Aabb::new(-1.0, 0.0, 3.0, 2.0);
        assert_abs_diff_eq!(a.center(), Vec2::new(1.0, 1.0));
        assert_abs_diff_eq!(a.size(), Vec2::new(4.0, 2.0));
        assert_abs_diff_eq!(a.half_extents(), Vec2::new(2.0, 1.0));
        assert_eq!(a.translate(Vec2::new(1.0, -1.0)), Aabb::new(0.0, -1.0, 4.0, 1.0));
        assert_eq!(a.broaden(Vec2::new(-2.0, 5.0)), Aabb::new(-3.0, 0.0, 3.0, 7.0));
        assert_eq!(Aabb::new_safe(3.0, 2.0, -1.0, 0.0), a);
    }

    #[test]
    fn inclusive_and_strict_overlap() {
        let a = Aabb::new(0.0, 0.0, 1.0, 1.0);
        let touching = Aabb::new(1.0, 0.0, 2.0, 1.0);
        let inside = Aabb::new(0.5, 0.5, 2.0, 2.0);
        let apart = Aabb::new(1.5, 0.0, 2.0, 1.0);

        assert_eq!(a.aabb_test(&touching), true);
        assert_eq!(a.overlaps(&touching), false);
        assert_eq!(a.aabb_test(&inside), true);
        assert_eq!(a.overlaps(&inside), true);
        assert_eq!(a.aabb_test(&apart), false);
        assert_eq!(a.overlaps(&apart), false);

        // sharing the x span only
        let above = Aabb::new(0.25, 3.0, 0.75, 4.0);
        assert_eq!(a.overlaps_x(&above), true);
        assert_eq!(a.overlaps_y(&above), false);
        assert_eq!(a.overlaps_x(&touching), false);
        assert_eq!(a.overlaps_y(&touching), true);
    }
}
