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

//! The three-dimensional sibling of [`super::quad_tree`]: the same
//! inclusive subdivision with eight octants per node.

use core_ers::{Point3, Rect3};

/// An oct tree over the inclusive cube `[0, 2^level - 1]^3`.
pub struct OctTree {
    bounding_box: Rect3,
    level: u32,
}

impl OctTree {
    pub fn new(bounding_box: Rect3, level: u32) -> OctTree {
        OctTree {
            bounding_box,
            level,
        }
    }

    pub fn bounding_box(&self) -> Rect3 {
        self.bounding_box
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// The best range cover of the inclusive `query`.
    pub fn get_brc_range_cover(&self, query: &Rect3) -> Vec<Rect3> {
        let mut cover = Vec::new();
        Self::brc_cover(query, self.bounding_box, &mut cover);
        cover
    }

    fn brc_cover(query: &Rect3, node: Rect3, cover: &mut Vec<Rect3>) {
        if query.contains_rect_inclusive(&node) {
            cover.push(node);
            return;
        }
        if node.end().x < query.start().x
            || node.end().y < query.start().y
            || node.end().z < query.start().z
            || query.end().x < node.start().x
            || query.end().y < node.start().y
            || query.end().z < node.start().z
        {
            return;
        }
        for child in node.divide() {
            Self::brc_cover(query, child, cover);
        }
    }

    /// Every aligned cube containing `point`, one per power of two.
    pub fn find_containing_range_covers(&self, point: Point3) -> impl Iterator<Item = Rect3> + '_ {
        (0..=self.level).map(move |power| {
            let size = 1u32 << power;
            let left_x = (point.x / size) * size;
            let left_y = (point.y / size) * size;
            let left_z = (point.z / size) * size;
            Rect3::new_unchecked(
                Point3::new(left_x, left_y, left_z),
                Point3::new(left_x + size - 1, left_y + size - 1, left_z + size - 1),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(level: u32) -> OctTree {
        let side = (1u32 << level) - 1;
        OctTree::new(
            Rect3::new_unchecked(Point3::new(0, 0, 0), Point3::new(side, side, side)),
            level,
        )
    }

    fn cells(rect: &Rect3) -> u64 {
        ((rect.end().x - rect.start().x + 1) as u64)
            * ((rect.end().y - rect.start().y + 1) as u64)
            * ((rect.end().z - rect.start().z + 1) as u64)
    }

    #[test]
    fn brc_cover_partitions_the_query() {
        let oct = tree(2);
        for (p1, p2) in [
            (Point3::new(0, 0, 0), Point3::new(3, 3, 3)),
            (Point3::new(1, 2, 3), Point3::new(1, 2, 3)),
            (Point3::new(1, 0, 1), Point3::new(2, 3, 2)),
        ] {
            let query = Rect3::new_unchecked(p1, p2);
            let cover = oct.get_brc_range_cover(&query);
            let mut covered = 0u64;
            for node in &cover {
                assert!(query.contains_rect_inclusive(node));
                covered += cells(node);
            }
            assert_eq!(covered, cells(&query));
        }
    }

    #[test]
    fn containing_covers_climb_to_the_root() {
        let oct = tree(2);
        let covers: Vec<Rect3> = oct
            .find_containing_range_covers(Point3::new(1, 2, 3))
            .collect();
        assert_eq!(covers.len(), 3);
        assert_eq!(
            covers[0],
            Rect3::new_unchecked(Point3::new(1, 2, 3), Point3::new(1, 2, 3))
        );
        assert_eq!(
            covers[1],
            Rect3::new_unchecked(Point3::new(0, 2, 2), Point3::new(1, 3, 3))
        );
        assert_eq!(covers[2], oct.bounding_box());
    }
}
