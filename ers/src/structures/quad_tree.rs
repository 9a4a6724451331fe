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

//! # The geometric quad tree
//! A recursive subdivision of an *inclusive* square domain. Nothing is
//! materialized: a node is just a rectangle, and `divide` produces its
//! quadrants on the fly. The BRC cover of a query is the set of maximal
//! nodes the query swallows whole; the index side tags a point with the
//! aligned square of every size that contains it, one per level.

use core_ers::{Point, Rect};

/// A quad tree over the inclusive square `[0, 2^level - 1]^2`.
pub struct QuadTree {
    bounding_box: Rect,
    level: u32,
}

impl QuadTree {
    pub fn new(bounding_box: Rect, level: u32) -> QuadTree {
        QuadTree {
            bounding_box,
            level,
        }
    }

    pub fn bounding_box(&self) -> Rect {
        self.bounding_box
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// The best range cover of the inclusive `query`: disjoint maximal
    /// nodes whose union is the query clipped to the domain.
    pub fn get_brc_range_cover(&self, query: &Rect) -> Vec<Rect> {
        let mut cover = Vec::new();
        Self::brc_cover(query, self.bounding_box, &mut cover);
        cover
    }

    fn brc_cover(query: &Rect, node: Rect, cover: &mut Vec<Rect>) {
        if query.contains_rect_inclusive(&node) {
            cover.push(node);
            return;
        }
        // Disjoint in the closed sense means no descendant can help.
        if node.end().x < query.start().x
            || node.end().y < query.start().y
            || query.end().x < node.start().x
            || query.end().y < node.start().y
        {
            return;
        }
        for child in node.divide() {
            Self::brc_cover(query, child, cover);
        }
    }

    /// Every aligned square containing `point`, one per power of two from
    /// a single cell up to the whole domain. These are exactly the nodes
    /// the BRC recursion can emit, so tagging a point with all of them at
    /// build time makes any query cover resolvable.
    pub fn find_containing_range_covers(&self, point: Point) -> impl Iterator<Item = Rect> + '_ {
        (0..=self.level).map(move |power| {
            let size = 1u32 << power;
            let left_x = (point.x / size) * size;
            let left_y = (point.y / size) * size;
            Rect::new_unchecked(
                Point::new(left_x, left_y),
                Point::new(left_x + size - 1, left_y + size - 1),
            )
        })
    }
}
