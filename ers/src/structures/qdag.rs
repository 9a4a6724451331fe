/*
* Licensed to Elasticsearch B.V. under one or more contributor
* license agreements. See the NOTICE file distributed with
* this work for additional information regarding copyright
* ownership. Elasticsearch B.V. licenses this file to you under
* the Apache License, Version 2.0 (the "License"); you may
* not use this file except in compliance with the License.
* You may obtain a copy of the License at
*
*  http://www.apache.org/licenses/LICENSE-2.0
*
* Unless required by applicable law or agreed to in writing,
* software distributed under the License is distributed on an
* "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
* KIND, either express or implied.  See the License for the
* specific language governing permissions and limitations
* under the License.
*/

//! # The QDAG
//! A quad tree over a half-open power-of-two square, augmented so that
//! every node wide enough has nine children instead of four: the quadrants
//! plus five overlapping intermediates (north, south, west, east, centre)
//! shifted by half a child. Together the children sit on a half-child
//! stride, which is what guarantees that *some* aligned square of side
//! `2L` contains any query of longest side `L`: the single-range-cover
//! property.
//!
//! Children are computed from a node's bounding box on demand. The DAG is
//! never materialized; with nine children per node a stored child map is
//! the dominant memory cost of the whole index, and the arithmetic is
//! cheaper than the hashing it replaces.

use core_ers::{Point, Rect};
use fxhash::FxHashSet;
use smallvec::SmallVec;

/// A QDAG over the half-open square `[0, 2^height)^2`.
pub struct Qdag {
    root: Rect,
    height: u32,
}

impl Qdag {
    pub fn new(height: u32) -> Qdag {
        let side = 1u32 << height;
        Qdag {
            root: Rect::new_unchecked(Point::new(0, 0), Point::new(side, side)),
            height,
        }
    }

    pub fn root(&self) -> Rect {
        self.root
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The children of a node, by arithmetic on its box. A node of side 2
    /// has just its four unit quadrants; anything wider has the full nine
    /// on a half-child stride. Unit cells are leaves.
    fn children(rect: &Rect) -> SmallVec<[Rect; 9]> {
        let width = rect.x_length();
        let mut children = SmallVec::new();
        if width < 2 {
            return children;
        }
        let start = rect.start();
        let child = width / 2;
        if child >= 2 {
            let stride = child / 2;
            for i in 0..3 {
                for j in 0..3 {
                    let corner = Point::new(start.x + i * stride, start.y + j * stride);
                    children.push(Rect::new_unchecked(
                        corner,
                        Point::new(corner.x + child, corner.y + child),
                    ));
                }
            }
        } else {
            for i in 0..2 {
                for j in 0..2 {
                    let corner = Point::new(start.x + i * child, start.y + j * child);
                    children.push(Rect::new_unchecked(
                        corner,
                        Point::new(corner.x + child, corner.y + child),
                    ));
                }
            }
        }
        children
    }

    /// Every DAG node containing `point`, the root included. This is the
    /// index-side expansion of QDAG-SRC: a point is tagged with each cover
    /// that could ever answer a query around it.
    pub fn find_containing_range_covers(&self, point: Point) -> Vec<Rect> {
        let mut seen: FxHashSet<Rect> = FxHashSet::default();
        seen.insert(self.root);
        self.collect_containing(self.root, point, &mut seen);
        seen.into_iter().collect()
    }

    // Overlapping children mean a node is reachable along several paths;
    // the seen set is both the result and the revisit guard.
    fn collect_containing(&self, rect: Rect, point: Point, seen: &mut FxHashSet<Rect>) {
        for child in Self::children(&rect) {
            if child.contains_point(&point) && seen.insert(child) {
                self.collect_containing(child, point, seen);
            }
        }
    }

    /// The single range cover of the *closed* query box `[p1, p2]`: the
    /// first aligned square, of side the next power of two at least the
    /// longest query side, that contains the query, doubling the side
    /// until one fits. The result is always a DAG node, so it is always
    /// tagged on every point it contains.
    pub fn get_single_range_cover(&self, query: &Rect) -> Rect {
        // closed to half-open
        let query = Rect::new_unchecked(
            query.start(),
            Point::new(query.end().x + 1, query.end().y + 1),
        );
        let longest = query.x_length().max(query.y_length());
        let mut side = longest.next_power_of_two();
        if side == 1 {
            return query;
        }
        let mut stride = side / 2;
        while side <= self.root.x_length() {
            if let Some(cover) = self.try_alignments(&query, side, stride) {
                return cover;
            }
            side *= 2;
            stride *= 2;
        }
        // Only reachable when the query escapes the domain; the root is
        // the best cover on offer and the probe will simply miss.
        self.root
    }

    fn try_alignments(&self, query: &Rect, side: u32, stride: u32) -> Option<Rect> {
        let xs = axis_alignments(query.start().x, query.end().x, side, stride);
        let ys = axis_alignments(query.start().y, query.end().y, side, stride);
        for &(x0, x1) in &xs {
            for &(y0, y1) in &ys {
                if x0 < 0 || y0 < 0 {
                    continue;
                }
                let candidate = Rect::new_unchecked(
                    Point::new(x0 as u32, y0 as u32),
                    Point::new(x1 as u32, y1 as u32),
                );
                if self.root.contains_rect(&candidate) && candidate.contains_rect(query) {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

/// The two candidate alignments of one axis: flooring the start to the
/// stride, or ceiling the end to it. Computed in i64 because the
/// ceil-based candidate can poke below zero.
pub(super) fn axis_alignments(start: u32, end: u32, side: u32, stride: u32) -> [(i64, i64); 2] {
    let (start, end) = (start as i64, end as i64);
    let (side, stride) = (side as i64, stride as i64);
    let floored = (start / stride) * stride;
    let ceiled = ((end + stride - 1) / stride) * stride;
    [(floored, floored + side), (ceiled - side, ceiled)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed(x0: u32, y0: u32, x1: u32, y1: u32) -> Rect {
        Rect::new_unchecked(Point::new(x0, y0), Point::new(x1, y1))
    }

    #[test]
    fn children_sit_on_the_half_child_stride() {
        let qdag = Qdag::new(3);
        let children = Qdag::children(&qdag.root());
        assert_eq!(children.len(), 9);
        for child in &children {
            assert_eq!(child.x_length(), 4);
            assert_eq!(child.y_length(), 4);
            assert_eq!(child.start().x % 2, 0);
            assert_eq!(child.start().y % 2, 0);
            assert!(qdag.root().contains_rect(child));
        }
        // side-2 nodes keep only their quadrants
        let narrow = Rect::new_unchecked(Point::new(0, 0), Point::new(2, 2));
        assert_eq!(Qdag::children(&narrow).len(), 4);
        // unit cells are leaves
        let unit = Rect::new_unchecked(Point::new(3, 3), Point::new(4, 4));
        assert!(Qdag::children(&unit).is_empty());
    }

    #[test]
    fn containing_covers_include_every_ancestor_shape() {
        let qdag = Qdag::new(3);
        let covers = qdag.find_containing_range_covers(Point::new(3, 3));
        assert!(covers.contains(&qdag.root()));
        // the unit leaf
        assert!(covers.contains(&Rect::new_unchecked(Point::new(3, 3), Point::new(4, 4))));
        // the centre intermediate of the root
        assert!(covers.contains(&Rect::new_unchecked(Point::new(2, 2), Point::new(6, 6))));
        for cover in &covers {
            assert!(cover.contains_point(&Point::new(3, 3)));
            assert!(cover.x_length().is_power_of_two());
        }
    }

    #[test]
    fn single_cover_contains_and_bounds_every_query() {
        let qdag = Qdag::new(3);
        for x0 in 0..8 {
            for y0 in 0..8 {
                for x1 in x0..8 {
                    for y1 in y0..8 {
                        let query = closed(x0, y0, x1, y1);
                        let cover = qdag.get_single_range_cover(&query);
                        let half_open = Rect::new_unchecked(
                            query.start(),
                            Point::new(query.end().x + 1, query.end().y + 1),
                        );
                        assert!(
                            cover.contains_rect(&half_open) || cover == half_open,
                            "{} does not contain {}",
                            cover,
                            half_open
                        );
                        // minimality: at most twice the longest side,
                        // rounded up to a power of two
                        let longest = half_open.x_length().max(half_open.y_length());
                        assert!(cover.x_length() <= (2 * longest).next_power_of_two());
                    }
                }
            }
        }
    }

    #[test]
    fn single_cover_of_a_cell_is_its_leaf() {
        let qdag = Qdag::new(3);
        let cover = qdag.get_single_range_cover(&closed(3, 3, 3, 3));
        assert_eq!(cover, Rect::new_unchecked(Point::new(3, 3), Point::new(4, 4)));
    }

    #[test]
    fn single_covers_are_always_tagged_at_build_time() {
        let qdag = Qdag::new(3);
        let mut tagged = Vec::new();
        for px in 0..8 {
            for py in 0..8 {
                tagged.push(qdag.find_containing_range_covers(Point::new(px, py)));
            }
        }
        for x0 in 0..8u32 {
            for y0 in 0..8u32 {
                for x1 in x0..8 {
                    for y1 in y0..8 {
                        let query = closed(x0, y0, x1, y1);
                        let cover = qdag.get_single_range_cover(&query);
                        for px in x0..=x1 {
                            for py in y0..=y1 {
                                assert!(
                                    tagged[(px * 8 + py) as usize].contains(&cover),
                                    "cover {} of query {} missing on ({}, {})",
                                    cover,
                                    query,
                                    px,
                                    py
                                );
                            }
                        }
                    }
                }
            }
        }
    }
}
