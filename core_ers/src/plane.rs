//! Points and rectangles over the two-dimensional grid domain.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::errors::{CoreError, CoreResult};
use crate::wire::{bytes_to_object, object_to_bytes, Obj};

/// A point with non-negative integer coordinates in a two-dimensional
/// space.
#[derive(
    Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, std::hash::Hash, PartialOrd, Ord,
)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Point {
        Point { x, y }
    }

    /// True if this point lies in the closed box spanned by `bottom` and
    /// `top`.
    pub fn contained_by(&self, bottom: &Point, top: &Point) -> bool {
        self.x >= bottom.x && self.y >= bottom.y && self.x <= top.x && self.y <= top.y
    }

    /// The canonical wire form, a two element integer list.
    pub fn to_bytes(&self) -> Vec<u8> {
        object_to_bytes(&Obj::List(vec![Obj::from(self.x), Obj::from(self.y)]))
    }

    /// Inverse of [`Point::to_bytes`].
    pub fn from_bytes(b: &[u8]) -> CoreResult<Point> {
        match bytes_to_object(b)? {
            Obj::List(items) => match items.as_slice() {
                [Obj::Int(x), Obj::Int(y)] => Ok(Point {
                    x: coordinate(*x)?,
                    y: coordinate(*y)?,
                }),
                _ => Err(CoreError::WireDecode("expected a two element integer list")),
            },
            _ => Err(CoreError::WireDecode("expected a two element integer list")),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

pub(crate) fn coordinate(v: i64) -> CoreResult<u32> {
    u32::try_from(v).map_err(|_| CoreError::WireDecode("coordinate outside the grid domain"))
}

/// An axis-aligned rectangle between a `start` and an `end` corner, with
/// `start <= end` componentwise.
///
/// The one type backs both rectangle families of the library. The QDAG
/// schemes treat it as the half-open box `[start, end)` and use
/// [`Rect::contains_point`], [`Rect::contains_rect`] and
/// [`Rect::intersects`]; the quad-BRC schemes treat it as the inclusive
/// box `[start, end]` and use [`Rect::contains_rect_inclusive`] and
/// [`Rect::divide`]. The two conventions are never mixed on one tree.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, std::hash::Hash)]
pub struct Rect {
    start: Point,
    end: Point,
}

impl Rect {
    /// Width of [`Rect::packed`]: four signed 32-bit little-endian lanes.
    pub const PACKED_LEN: usize = 16;

    pub fn new(start: Point, end: Point) -> CoreResult<Rect> {
        if start.x > end.x || start.y > end.y {
            return Err(CoreError::InvalidRect);
        }
        Ok(Rect { start, end })
    }

    /// Creates a rectangle without the corner-order check.
    /// Requires `start <= end` componentwise.
    #[inline]
    pub fn new_unchecked(start: Point, end: Point) -> Rect {
        debug_assert!(start.x <= end.x && start.y <= end.y, "{} > {}", start, end);
        Rect { start, end }
    }

    #[inline]
    pub fn start(&self) -> Point {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Point {
        self.end
    }

    pub fn x_length(&self) -> u32 {
        self.end.x - self.start.x
    }

    pub fn y_length(&self) -> u32 {
        self.end.y - self.start.y
    }

    /// Half-open containment: `point` is inside `[start, end)`.
    pub fn contains_point(&self, point: &Point) -> bool {
        point.x >= self.start.x
            && point.x < self.end.x
            && point.y >= self.start.y
            && point.y < self.end.y
    }

    /// Half-open containment of a whole rectangle.
    pub fn contains_rect(&self, rect: &Rect) -> bool {
        rect.start.x >= self.start.x
            && rect.start.x < self.end.x
            && rect.start.y >= self.start.y
            && rect.start.y < self.end.y
            && rect.end.x > self.start.x
            && rect.end.x <= self.end.x
            && rect.end.y > self.start.y
            && rect.end.y <= self.end.y
    }

    /// Inclusive containment: both of `rect`'s corners lie in
    /// `[start, end]`.
    pub fn contains_rect_inclusive(&self, rect: &Rect) -> bool {
        rect.start.x >= self.start.x
            && rect.start.x <= self.end.x
            && rect.start.y >= self.start.y
            && rect.start.y <= self.end.y
            && rect.end.x >= self.start.x
            && rect.end.x <= self.end.x
            && rect.end.y >= self.start.y
            && rect.end.y <= self.end.y
    }

    /// True when the half-open boxes share positive area. Degenerate
    /// rectangles cannot overlap anything.
    pub fn intersects(&self, rect: &Rect) -> bool {
        self.start.x < rect.end.x
            && rect.start.x < self.end.x
            && self.start.y < rect.end.y
            && rect.start.y < self.end.y
    }

    /// Splits an inclusive rectangle into its four quadrants at the
    /// truncated midpoint. Unit cells return no children.
    pub fn divide(&self) -> SmallVec<[Rect; 4]> {
        let x_half = (self.start.x + self.end.x) / 2;
        let y_half = (self.start.y + self.end.y) / 2;

        let mut children = SmallVec::new();
        if self.end.x - self.start.x >= 1 || self.end.y - self.start.y >= 1 {
            children.push(Rect::new_unchecked(
                Point::new(self.start.x, self.start.y),
                Point::new(x_half, y_half),
            ));
            children.push(Rect::new_unchecked(
                Point::new(self.start.x, y_half + 1),
                Point::new(x_half, self.end.y),
            ));
            children.push(Rect::new_unchecked(
                Point::new(x_half + 1, self.start.y),
                Point::new(self.end.x, y_half),
            ));
            children.push(Rect::new_unchecked(
                Point::new(x_half + 1, y_half + 1),
                Point::new(self.end.x, self.end.y),
            ));
        }
        children
    }

    /// The packed wire form of the geometric schemes:
    /// `(start.x, start.y, end.x, end.y)` as signed 32-bit little-endian
    /// lanes.
    pub fn packed(&self) -> [u8; Self::PACKED_LEN] {
        let mut buf = [0u8; Self::PACKED_LEN];
        buf[0..4].copy_from_slice(&self.start.x.to_le_bytes());
        buf[4..8].copy_from_slice(&self.start.y.to_le_bytes());
        buf[8..12].copy_from_slice(&self.end.x.to_le_bytes());
        buf[12..16].copy_from_slice(&self.end.y.to_le_bytes());
        buf
    }

    /// Inverse of [`Rect::packed`].
    pub fn from_packed(bytes: &[u8]) -> CoreResult<Rect> {
        if bytes.len() != Self::PACKED_LEN {
            return Err(CoreError::WireDecode("packed rect must be 16 bytes"));
        }
        let lane = |i: usize| {
            let mut lane = [0u8; 4];
            lane.copy_from_slice(&bytes[4 * i..4 * i + 4]);
            u32::from_le_bytes(lane)
        };
        Rect::new(Point::new(lane(0), lane(1)), Point::new(lane(2), lane(3)))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Rect[{}, {}]", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_order_is_enforced() {
        assert!(Rect::new(Point::new(3, 0), Point::new(2, 5)).is_err());
        assert!(Rect::new(Point::new(0, 6), Point::new(2, 5)).is_err());
        assert!(Rect::new(Point::new(2, 2), Point::new(2, 2)).is_ok());
    }

    #[test]
    fn half_open_point_containment() {
        let r = Rect::new(Point::new(0, 0), Point::new(4, 4)).unwrap();
        assert!(r.contains_point(&Point::new(0, 0)));
        assert!(r.contains_point(&Point::new(3, 3)));
        assert!(!r.contains_point(&Point::new(4, 0)));
        assert!(!r.contains_point(&Point::new(0, 4)));
    }

    #[test]
    fn half_open_rect_containment() {
        let outer = Rect::new(Point::new(0, 0), Point::new(8, 8)).unwrap();
        let inner = Rect::new(Point::new(2, 2), Point::new(6, 6)).unwrap();
        assert!(outer.contains_rect(&inner));
        assert!(outer.contains_rect(&outer));
        assert!(!inner.contains_rect(&outer));
    }

    #[test]
    fn inclusive_rect_containment() {
        let query = Rect::new(Point::new(0, 0), Point::new(3, 3)).unwrap();
        let node = Rect::new(Point::new(2, 2), Point::new(3, 3)).unwrap();
        assert!(query.contains_rect_inclusive(&node));
        assert!(!node.contains_rect_inclusive(&query));
    }

    #[test]
    fn intersection_needs_positive_area() {
        let a = Rect::new(Point::new(0, 0), Point::new(4, 4)).unwrap();
        let b = Rect::new(Point::new(3, 3), Point::new(6, 6)).unwrap();
        let c = Rect::new(Point::new(4, 0), Point::new(8, 4)).unwrap();
        let line = Rect::new(Point::new(1, 0), Point::new(1, 4)).unwrap();
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(!a.intersects(&line));
    }

    #[test]
    fn divide_partitions_an_inclusive_square() {
        let r = Rect::new(Point::new(0, 0), Point::new(3, 3)).unwrap();
        let children = r.divide();
        assert_eq!(children.len(), 4);
        let mut cells = 0u32;
        for child in &children {
            cells += (child.end().x - child.start().x + 1) * (child.end().y - child.start().y + 1);
            assert!(r.contains_rect_inclusive(child));
        }
        assert_eq!(cells, 16);
        // Unit cells bottom out.
        assert!(Rect::new(Point::new(2, 2), Point::new(2, 2))
            .unwrap()
            .divide()
            .is_empty());
    }

    #[test]
    fn packed_round_trip() {
        let r = Rect::new(Point::new(1, 2), Point::new(300, 70_000)).unwrap();
        let packed = r.packed();
        assert_eq!(Rect::from_packed(&packed).unwrap(), r);
        assert!(Rect::from_packed(&packed[1..]).is_err());
    }

    #[test]
    fn point_wire_round_trip() {
        let p = Point::new(3, 5);
        assert_eq!(p.to_bytes(), b"[3,5]".to_vec());
        assert_eq!(Point::from_bytes(&p.to_bytes()).unwrap(), p);
        assert!(Point::from_bytes(b"[1,2,3]").is_err());
        assert!(Point::from_bytes(b"[-1,2]").is_err());
    }
}
