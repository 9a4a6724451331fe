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

//! # The 1-D range tree
//! A balanced binary tree over `[0, 2^h - 1]`. Every internal node splits
//! its range at the truncated midpoint; leaves are single values. The BRC
//! cover of a query is the minimum set of nodes whose disjoint union is
//! exactly the query, which is what keeps range-BRC indexes compact.

use super::{interval_contains, interval_overlaps, Interval};

struct RangeNode {
    range: Interval,
    height: u32,
    left: Option<Box<RangeNode>>,
    right: Option<Box<RangeNode>>,
}

/// A materialized range tree over `[0, 2^height - 1]`.
pub struct RangeTree {
    root: RangeNode,
    height: u32,
}

impl RangeTree {
    /// Builds the tree of the given height. Height 0 is the single leaf
    /// `(0, 0)`.
    pub fn new(height: u32) -> RangeTree {
        RangeTree {
            root: RangeNode::build(height, 0, (1u32 << height) - 1),
            height,
        }
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The whole domain, `(0, 2^height - 1)`.
    pub fn domain(&self) -> Interval {
        self.root.range
    }

    /// The best range cover: the minimum set of node ranges whose disjoint
    /// union equals the closed `query`. A single-value query covers as
    /// itself.
    pub fn get_brc_range_cover(&self, query: Interval) -> Vec<Interval> {
        let mut cover = Vec::new();
        self.root.brc_cover(query, &mut |_, range| cover.push(range));
        cover
    }

    /// The uniform range cover: the BRC, re-split until every level from 0
    /// up to the deepest emitted level appears in the cover. Coarser
    /// levels leak less about the query endpoints at the cost of more
    /// tokens.
    pub fn get_urc_range_cover(&self, query: Interval) -> Vec<Interval> {
        let mut cover: Vec<(u32, Interval)> = Vec::new();
        self.root
            .brc_cover(query, &mut |height, range| cover.push((height, range)));

        while !satisfies_urc_condition(&cover) {
            match cover.iter().rposition(|(_, (lo, hi))| hi > lo) {
                Some(pos) => {
                    let (height, (lo, hi)) = cover.remove(pos);
                    let mid = lo + (hi - lo) / 2;
                    cover.push((height - 1, (lo, mid)));
                    cover.push((height - 1, (mid + 1, hi)));
                }
                None => break,
            }
        }
        cover.into_iter().map(|(_, range)| range).collect()
    }

    /// The root-to-leaf path of node ranges containing `val`, starting
    /// from `range`. On a balanced tree this is every node whose range
    /// covers the value, which is exactly what the index side of
    /// range-BRC tags a point with. `val` must lie inside `range`.
    pub fn descend(val: u32, range: Interval) -> Vec<Interval> {
        debug_assert!(range.0 <= val && val <= range.1);
        let mut path = Vec::new();
        let (mut lo, mut hi) = range;
        while (lo, hi) != (val, val) {
            path.push((lo, hi));
            let mid = (lo + hi) / 2;
            if val <= mid {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        path.push((val, val));
        path
    }
}

impl RangeNode {
    fn build(height: u32, lo: u32, hi: u32) -> RangeNode {
        if height == 0 {
            RangeNode {
                range: (lo, hi),
                height,
                left: None,
                right: None,
            }
        } else {
            let mid = lo + (hi - lo) / 2;
            RangeNode {
                range: (lo, hi),
                height,
                left: Some(Box::new(RangeNode::build(height - 1, lo, mid))),
                right: Some(Box::new(RangeNode::build(height - 1, mid + 1, hi))),
            }
        }
    }

    // A node inside the query is emitted whole; otherwise only the
    // children overlapping the query are worth visiting.
    fn brc_cover(&self, query: Interval, emit: &mut impl FnMut(u32, Interval)) {
        if interval_contains(query, self.range) {
            emit(self.height, self.range);
            return;
        }
        if let Some(ref left) = self.left {
            if interval_overlaps(left.range, query) {
                left.brc_cover(query, emit);
            }
        }
        if let Some(ref right) = self.right {
            if interval_overlaps(right.range, query) {
                right.brc_cover(query, emit);
            }
        }
    }
}

fn satisfies_urc_condition(cover: &[(u32, Interval)]) -> bool {
    let mut seen = [false; 33];
    let mut max_level = 0;
    for &(level, _) in cover {
        seen[level as usize] = true;
        max_level = max_level.max(level);
    }
    (0..=max_level).all(|level| seen[level as usize])
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn assert_partitions(cover: &[Interval], query: Interval) {
        let mut sorted = cover.to_vec();
        sorted.sort();
        assert_eq!(sorted.first().unwrap().0, query.0);
        assert_eq!(sorted.last().unwrap().1, query.1);
        for pair in sorted.windows(2) {
            assert_eq!(pair[0].1 + 1, pair[1].0, "gap or overlap in {:?}", sorted);
        }
    }

    #[test]
    fn brc_partitions_every_query() {
        let tree = RangeTree::new(4);
        for lo in 0..16 {
            for hi in lo..16 {
                assert_partitions(&tree.get_brc_range_cover((lo, hi)), (lo, hi));
            }
        }
    }

    #[test]
    fn brc_is_minimal_on_known_queries() {
        let tree = RangeTree::new(3);
        assert_eq!(tree.get_brc_range_cover((0, 7)), vec![(0, 7)]);
        assert_eq!(tree.get_brc_range_cover((4, 4)), vec![(4, 4)]);
        assert_eq!(tree.get_brc_range_cover((2, 5)), vec![(2, 3), (4, 5)]);
        // 1..6 needs a leaf on each flank.
        assert_eq!(
            tree.get_brc_range_cover((1, 6)),
            vec![(1, 1), (2, 3), (4, 5), (6, 6)]
        );
    }

    #[test]
    fn urc_partitions_and_fills_every_level() {
        let tree = RangeTree::new(4);
        for query in [(0u32, 15u32), (2, 13), (5, 5), (1, 14)] {
            let cover = tree.get_urc_range_cover(query);
            assert_partitions(&cover, query);
            let mut widths: Vec<u32> = cover.iter().map(|(lo, hi)| hi - lo + 1).collect();
            widths.sort_unstable();
            widths.dedup();
            // every power of two up to the widest cover appears
            let mut expected = 1;
            for w in widths {
                assert_eq!(w, expected);
                expected *= 2;
            }
        }
    }

    #[test]
    fn descend_walks_root_to_leaf() {
        let path = RangeTree::descend(5, (0, 7));
        assert_eq!(path, vec![(0, 7), (4, 7), (4, 5), (5, 5)]);
        for pair in path.windows(2) {
            assert!(interval_contains(pair[0], pair[1]));
        }
        assert_eq!(RangeTree::descend(0, (0, 0)), vec![(0, 0)]);
    }

    #[test]
    fn descend_matches_the_tree_nodes_covering_the_value() {
        // The build side of range-BRC relies on path == covering nodes.
        let tree = RangeTree::new(4);
        for val in 0..16 {
            let path = RangeTree::descend(val, tree.domain());
            for range in &path {
                assert!(interval_contains(*range, (val, val)));
            }
            assert_eq!(path.len() as u32, tree.height() + 1);
        }
    }
}
