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

//! # The TDAG
//! A range tree where every sufficiently wide internal node grows a
//! *virtual middle* interval covering the central half of its range. The
//! middle is a cover candidate with no children of its own; it exists so
//! that a query straddling a node's midpoint can still be answered by one
//! interval instead of two, which is what makes single-range-cover
//! queries possible in 1-D.
//!
//! The middle of a node `(lo, hi)` is
//! `[mid - (lo + hi)/4, mid + (lo + hi)/4 + 1]` with truncating division.
//! The `+ 1` asymmetry is part of the wire format: the index and the query
//! sides both compute middles with this exact formula, and a middle may
//! overhang its node's own range (the middle of `(4, 7)` is `(3, 8)`).

use super::{interval_contains, Interval};

struct TdagNode {
    range: Interval,
    middle: Option<Interval>,
    left: Option<Box<TdagNode>>,
    right: Option<Box<TdagNode>>,
}

/// A TDAG over `[0, 2^height - 1]`.
pub struct Tdag {
    root: TdagNode,
    height: u32,
}

/// The middle interval of the node `(lo, hi)`.
#[inline]
fn middle_of(lo: u32, hi: u32) -> Interval {
    let mid = (lo + hi) / 2;
    let quarter = (lo + hi) / 4;
    (mid - quarter, mid + quarter + 1)
}

/// Middles are only real cover candidates on nodes spanning more than two
/// values; narrower nodes are answered by their own range. The index side
/// tags points under the same rule, so both sides must agree on it.
#[inline]
fn has_middle(lo: u32, hi: u32) -> bool {
    hi - lo > 1
}

impl Tdag {
    /// Builds the TDAG of the given height.
    pub fn new(height: u32) -> Tdag {
        Tdag {
            root: TdagNode::build(height, 0, (1u32 << height) - 1),
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

    /// The single range cover: one interval containing the closed `query`,
    /// minimal among the node ranges and middles that do. `None` when the
    /// query escapes the domain.
    pub fn get_single_range_cover(&self, query: Interval) -> Option<Interval> {
        self.root.single_cover(query)
    }

    /// Every cover candidate containing `val` on the way from `range` down
    /// to the leaf: the root-to-leaf path plus the middles of traversed
    /// nodes that contain the value. This is what the index side of
    /// TDAG-SRC tags a point with. `val` must lie inside `range`.
    pub fn descend_with_middles(val: u32, range: Interval) -> Vec<Interval> {
        debug_assert!(range.0 <= val && val <= range.1);
        let mut covers: Vec<Interval> = Vec::new();
        let (mut lo, mut hi) = range;
        while (lo, hi) != (val, val) {
            if !covers.contains(&(lo, hi)) {
                covers.push((lo, hi));
            }
            let (m0, m1) = middle_of(lo, hi);
            if has_middle(lo, hi) && val >= m0 && val <= m1 && !covers.contains(&(m0, m1)) {
                covers.push((m0, m1));
            }
            let mid = (lo + hi) / 2;
            if val <= mid {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        covers.push((val, val));
        covers
    }
}

impl TdagNode {
    fn build(height: u32, lo: u32, hi: u32) -> TdagNode {
        if height == 0 {
            TdagNode {
                range: (lo, hi),
                middle: None,
                left: None,
                right: None,
            }
        } else {
            let mid = lo + (hi - lo) / 2;
            TdagNode {
                range: (lo, hi),
                middle: Some(middle_of(lo, hi)),
                left: Some(Box::new(TdagNode::build(height - 1, lo, mid))),
                right: Some(Box::new(TdagNode::build(height - 1, mid + 1, hi))),
            }
        }
    }

    fn single_cover(&self, query: Interval) -> Option<Interval> {
        if !interval_contains(self.range, query) {
            return None;
        }
        if let (Some(middle), Some(left), Some(right)) =
            (self.middle, self.left.as_deref(), self.right.as_deref())
        {
            if has_middle(self.range.0, self.range.1)
                && interval_contains(middle, query)
                && !interval_contains(left.range, query)
                && !interval_contains(right.range, query)
            {
                return Some(middle);
            }
        }
        if let Some(ref left) = self.left {
            if let Some(cover) = left.single_cover(query) {
                return Some(cover);
            }
        }
        if let Some(ref right) = self.right {
            if let Some(cover) = right.single_cover(query) {
                return Some(cover);
            }
        }
        Some(self.range)
    }
}
