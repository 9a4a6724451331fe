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

//! # The cover trees
//! The range-cover machinery every scheme is assembled from: the 1-D range
//! tree and its TDAG augmentation, the geometric quad/oct trees, and the
//! QDAG/oct-QDAG augmentations. A *cover* is a tree node (an interval or a
//! rectangle) used as an index label; the trees differ in which covers they
//! hand a query and which covers they tag a point with.

mod oct_qdag;
mod oct_tree;
mod qdag;
mod quad_tree;
mod range_tree;
mod tdag;

pub use oct_qdag::OctQdag;
pub use oct_tree::OctTree;
pub use qdag::Qdag;
pub use quad_tree::QuadTree;
pub use range_tree::RangeTree;
pub use tdag::Tdag;

/// A closed 1-D interval `[lo, hi]`.
pub type Interval = (u32, u32);

/// True when `main` contains the whole of `secondary`.
#[inline]
pub fn interval_contains(main: Interval, secondary: Interval) -> bool {
    main.0 <= secondary.0 && main.1 >= secondary.1
}

/// True when the closed intervals share at least one value.
#[inline]
pub(crate) fn interval_overlaps(a: Interval, b: Interval) -> bool {
    a.0 <= b.1 && b.0 <= a.1
}

/// Height of the smallest power-of-two tree covering `[0, bound)`.
pub(crate) fn tree_height(bound: u32) -> u32 {
    bound.next_power_of_two().trailing_zeros()
}
