//! The three-dimensional siblings of [`crate::plane`].

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::errors::{CoreError, CoreResult};
use crate::plane::coordinate;
use crate::wire::{bytes_to_object, object_to_bytes, Obj};

/// A point with non-negative integer coordinates in a three-dimensional
/// space.
#[derive(
    Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, std::hash::Hash, PartialOrd, Ord,
)]
pub struct Point3 {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Point3 {
    pub fn new(x: u32, y: u32, z: u32) -> Point3 {
        Point3 { x, y, z }
    }

    /// True if this point lies in the closed box spanned by `bottom` and
    /// `top`.
    pub fn contained_by(&self, bottom: &Point3, top: &Point3) -> bool {
        self.x >= bottom.x
            && self.y >= bottom.y
            && self.z >= bottom.z
            && self.x <= top.x
            && self.y <= top.y
            && self.z <= top.z
    }

    /// The canonical wire form, a three element integer list.
    pub fn to_bytes(&self) -> Vec<u8> {
        object_to_bytes(&Obj::List(vec![
            Obj::from(self.x),
            Obj::from(self.y),
            Obj::from(self.z),
        ]))
    }

    /// Inverse of [`Point3::to_bytes`].
    pub fn from_bytes(b: &[u8]) -> CoreResult<Point3> {
        match bytes_to_object(b)? {
            Obj::List(items) => match items.as_slice() {
                [Obj::Int(x), Obj::Int(y), Obj::Int(z)] => Ok(Point3 {
                    x: coordinate(*x)?,
                    y: coordinate(*y)?,
                    z: coordinate(*z)?,
                }),
                _ => Err(CoreError::WireDecode("expected a three element integer list")),
            },
            _ => Err(CoreError::WireDecode("expected a three element integer list")),
        }
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// An axis-aligned box between a `start` and an `end` corner, with
/// `start <= end` componentwise. Carries the same two containment
/// conventions as [`crate::Rect`].
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, std::hash::Hash)]
pub struct Rect3 {
    start: Point3,
    end: Point3,
}

impl Rect3 {
    /// Width of [`Rect3::packed`]: six signed 32-bit little-endian lanes.
    pub const PACKED_LEN: usize = 24;

    pub fn new(start: Point3, end: Point3) -> CoreResult<Rect3> {
        if start.x > end.x || start.y > end.y || start.z > end.z {
            return Err(CoreError::InvalidRect);
        }
        Ok(Rect3 { start, end })
    }

    /// Creates a box without the corner-order check.
    /// Requires `start <= end` componentwise.
    #[inline]
    pub fn new_unchecked(start: Point3, end: Point3) -> Rect3 {
        debug_assert!(
            start.x <= end.x && start.y <= end.y && start.z <= end.z,
            "{} > {}",
            start,
            end
        );
        Rect3 { start, end }
    }

    #[inline]
    pub fn start(&self) -> Point3 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Point3 {
        self.end
    }

    pub fn x_length(&self) -> u32 {
        self.end.x - self.start.x
    }

    pub fn y_length(&self) -> u32 {
        self.end.y - self.start.y
    }

    pub fn z_length(&self) -> u32 {
        self.end.z - self.start.z
    }

    /// Half-open containment: `point` is inside `[start, end)`.
    pub fn contains_point(&self, point: &Point3) -> bool {
        point.x >= self.start.x
            && point.x < self.end.x
            && point.y >= self.start.y
            && point.y < self.end.y
            && point.z >= self.start.z
            && point.z < self.end.z
    }

    /// Half-open containment of a whole box.
    pub fn contains_rect(&self, rect: &Rect3) -> bool {
        rect.start.x >= self.start.x
            && rect.start.x < self.end.x
            && rect.start.y >= self.start.y
            && rect.start.y < self.end.y
            && rect.start.z >= self.start.z
            && rect.start.z < self.end.z
            && rect.end.x > self.start.x
            && rect.end.x <= self.end.x
            && rect.end.y > self.start.y
            && rect.end.y <= self.end.y
            && rect.end.z > self.start.z
            && rect.end.z <= self.end.z
    }

    /// Inclusive containment: both of `rect`'s corners lie in
    /// `[start, end]`.
    pub fn contains_rect_inclusive(&self, rect: &Rect3) -> bool {
        rect.start.x >= self.start.x
            && rect.start.x <= self.end.x
            && rect.start.y >= self.start.y
            && rect.start.y <= self.end.y
            && rect.start.z >= self.start.z
            && rect.start.z <= self.end.z
            && rect.end.x >= self.start.x
            && rect.end.x <= self.end.x
            && rect.end.y >= self.start.y
            && rect.end.y <= self.end.y
            && rect.end.z >= self.start.z
            && rect.end.z <= self.end.z
    }

    /// True when the half-open boxes share positive volume.
    pub fn intersects(&self, rect: &Rect3) -> bool {
        self.start.x < rect.end.x
            && rect.start.x < self.end.x
            && self.start.y < rect.end.y
            && rect.start.y < self.end.y
            && self.start.z < rect.end.z
            && rect.start.z < self.end.z
    }

    /// Splits an inclusive box into its eight octants at the truncated
    /// midpoint. Unit cells return no children.
    pub fn divide(&self) -> SmallVec<[Rect3; 8]> {
        let x_half = (self.start.x + self.end.x) / 2;
        let y_half = (self.start.y + self.end.y) / 2;
        let z_half = (self.start.z + self.end.z) / 2;

        let mut children = SmallVec::new();
        if self.end.x - self.start.x >= 1
            || self.end.y - self.start.y >= 1
            || self.end.z - self.start.z >= 1
        {
            let xs = [(self.start.x, x_half), (x_half + 1, self.end.x)];
            let ys = [(self.start.y, y_half), (y_half + 1, self.end.y)];
            let zs = [(self.start.z, z_half), (z_half + 1, self.end.z)];
            for (x0, x1) in xs {
                for (y0, y1) in ys {
                    for (z0, z1) in zs {
                        children.push(Rect3::new_unchecked(
                            Point3::new(x0, y0, z0),
                            Point3::new(x1, y1, z1),
                        ));
                    }
                }
            }
        }
        children
    }

    /// The packed wire form:
    /// `(start.x, start.y, start.z, end.x, end.y, end.z)` as signed 32-bit
    /// little-endian lanes.
    pub fn packed(&self) -> [u8; Self::PACKED_LEN] {
        let mut buf = [0u8; Self::PACKED_LEN];
        for (i, lane) in [
            self.start.x,
            self.start.y,
            self.start.z,
            self.end.x,
            self.end.y,
            self.end.z,
        ]
        .into_iter()
        .enumerate()
        {
            buf[4 * i..4 * i + 4].copy_from_slice(&lane.to_le_bytes());
        }
        buf
    }

    /// Inverse of [`Rect3::packed`].
    pub fn from_packed(bytes: &[u8]) -> CoreResult<Rect3> {
        if bytes.len() != Self::PACKED_LEN {
            return Err(CoreError::WireDecode("packed box must be 24 bytes"));
        }
        let lane = |i: usize| {
            let mut lane = [0u8; 4];
            lane.copy_from_slice(&bytes[4 * i..4 * i + 4]);
            u32::from_le_bytes(lane)
        };
        Rect3::new(
            Point3::new(lane(0), lane(1), lane(2)),
            Point3::new(lane(3), lane(4), lane(5)),
        )
    }
}

impl fmt::Display for Rect3 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Rect3[{}, {}]", self.start, self.end)
    }
}
