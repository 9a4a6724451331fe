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

//! The three-dimensional sibling of [`super::qdag`]. A node wide enough
//! carries all 27 children on the half-child stride (the octants are the
//! even-offset ones); a node of side 2 just its octants. With 27 children
//! per node, computing them from the bounding box instead of storing them
//! matters even more than in 2-D.

use core_ers::{Point3, Rect3};
use fxhash::FxHashSet;
use smallvec::SmallVec;

use super::qdag::axis_alignments;

/// An oct-QDAG over the half-open cube `[0, 2^height)^3`.
pub struct OctQdag {
    root: Rect3,
    height: u32,
}

impl OctQdag {
    pub fn new(height: u32) -> OctQdag {
        let side = 1u32 << height;
        OctQdag {
            root: Rect3::new_unchecked(Point3::new(0, 0, 0), Point3::new(side, side, side)),
            height,
        }
    }

    pub fn root(&self) -> Rect3 {
        self.root
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn children(rect: &Rect3) -> SmallVec<[Rect3; 27]> {
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
                    for k in 0..3 {
                        let corner = Point3::new(
                            start.x + i * stride,
                            start.y + j * stride,
                            start.z + k * stride,
                        );
                        children.push(Rect3::new_unchecked(
                            corner,
                            Point3::new(corner.x + child, corner.y + child, corner.z + child),
                        ));
                    }
                }
            }
        } else {
            for i in 0..2 {
                for j in 0..2 {
                    for k in 0..2 {
                        let corner = Point3::new(
                            start.x + i * child,
                            start.y + j * child,
                            start.z + k * child,
                        );
                        children.push(Rect3::new_unchecked(
                            corner,
                            Point3::new(corner.x + child, corner.y + child, corner.z + child),
                        ));
                    }
                }
            }
        }
        children
    }

    /// Every DAG node containing `point`, the root included.
    pub fn find_containing_range_covers(&self, point: Point3) -> Vec<Rect3> {
        let mut seen: FxHashSet<Rect3> = FxHashSet::default();
        seen.insert(self.root);
        self.collect_containing(self.root, point, &mut seen);
        seen.into_iter().collect()
    }

    fn collect_containing(&self, rect: Rect3, point: Point3, seen: &mut FxHashSet<Rect3>) {
        for child in Self::children(&rect) {
            if child.contains_point(&point) && seen.insert(child) {
                self.collect_containing(child, point, seen);
            }
        }
    }

    /// The single range cover of the *closed* query box `[p1, p2]`; see
    /// [`super::Qdag::get_single_range_cover`]. All eight floor/ceil
    /// alignment combinations are tried per side before doubling.
    pub fn get_single_range_cover(&self, query: &Rect3) -> Rect3 {
        let query = Rect3::new_unchecked(
            query.start(),
            Point3::new(query.end().x + 1, query.end().y + 1, query.end().z + 1),
        );
        let longest = query
            .x_length()
            .max(query.y_length())
            .max(query.z_length());
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
        self.root
    }

    fn try_alignments(&self, query: &Rect3, side: u32, stride: u32) -> Option<Rect3> {
        let xs = axis_alignments(query.start().x, query.end().x, side, stride);
        let ys = axis_alignments(query.start().y, query.end().y, side, stride);
        let zs = axis_alignments(query.start().z, query.end().z, side, stride);
        for &(x0, x1) in &xs {
            for &(y0, y1) in &ys {
                for &(z0, z1) in &zs {
                    if x0 < 0 || y0 < 0 || z0 < 0 {
                        continue;
                    }
                    let candidate = Rect3::new_unchecked(
                        Point3::new(x0 as u32, y0 as u32, z0 as u32),
                        Point3::new(x1 as u32, y1 as u32, z1 as u32),
                    );
                    if self.root.contains_rect(&candidate) && candidate.contains_rect(query) {
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_nodes_have_27_children_on_the_stride() {
        let oct = OctQdag::new(2);
        let children = OctQdag::children(&oct.root());
        assert_eq!(children.len(), 27);
        for child in &children {
            assert_eq!(child.x_length(), 2);
            assert!(oct.root().contains_rect(child));
        }
        let narrow = Rect3::new_unchecked(Point3::new(0, 0, 0), Point3::new(2, 2, 2));
        assert_eq!(OctQdag::children(&narrow).len(), 8);
    }

    #[test]
    fn containing_covers_hold_the_point() {
        let oct = OctQdag::new(2);
        let point = Point3::new(1, 2, 3);
        let covers = oct.find_containing_range_covers(point);
        assert!(covers.contains(&oct.root()));
        assert!(covers.contains(&Rect3::new_unchecked(
            Point3::new(1, 2, 3),
            Point3::new(2, 3, 4)
        )));
        for cover in &covers {
            assert!(cover.contains_point(&point));
        }
    }

    #[test]
    fn single_cover_contains_and_bounds_every_query() {
        let oct = OctQdag::new(2);
        for x0 in 0..4 {
            for y0 in 0..4 {
                for z0 in 0..4 {
                    for x1 in x0..4 {
                        for y1 in y0..4 {
                            for z1 in z0..4 {
                                let query = Rect3::new_unchecked(
                                    Point3::new(x0, y0, z0),
                                    Point3::new(x1, y1, z1),
                                );
                                let cover = oct.get_single_range_cover(&query);
                                let half_open = Rect3::new_unchecked(
                                    query.start(),
                                    Point3::new(x1 + 1, y1 + 1, z1 + 1),
                                );
                                assert!(
                                    cover.contains_rect(&half_open) || cover == half_open
                                );
                                let longest = half_open
                                    .x_length()
                                    .max(half_open.y_length())
                                    .max(half_open.z_length());
                                assert!(
                                    cover.x_length() <= (2 * longest).next_power_of_two()
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn single_covers_are_always_tagged_at_build_time() {
        let oct = OctQdag::new(2);
        let mut tagged = Vec::new();
        for px in 0..4 {
            for py in 0..4 {
                for pz in 0..4 {
                    tagged.push(oct.find_containing_range_covers(Point3::new(px, py, pz)));
                }
            }
        }
        for x0 in 0..4u32 {
            for y0 in 0..4u32 {
                for z0 in 0..4u32 {
                    for x1 in x0..4 {
                        for y1 in y0..4 {
                            for z1 in z0..4 {
                                let query = Rect3::new_unchecked(
                                    Point3::new(x0, y0, z0),
                                    Point3::new(x1, y1, z1),
                                );
                                let cover = oct.get_single_range_cover(&query);
                                for px in x0..=x1 {
                                    for py in y0..=y1 {
                                        for pz in z0..=z1 {
                                            assert!(
                                                tagged[(px * 16 + py * 4 + pz) as usize]
                                                    .contains(&cover),
                                                "cover {} of query {} untagged",
                                                cover,
                                                query
                                            );
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
